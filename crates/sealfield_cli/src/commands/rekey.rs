//! Rekey command implementation.

use super::maintenance::{finish, Maintenance};
use super::{BatchSettings, CliError, StoreSettings};
use sealfield_core::EncryptionKey;
use std::io::{self, IsTerminal, Read};

/// Runs the rekey command, moving values from `old_key` to the current key.
///
/// Without `old_key` the previous key is read from a hidden prompt, or
/// from stdin when it is not a terminal.
///
/// Returns `false` when the exit status should signal failure.
pub fn run(
    store: &StoreSettings,
    old_key: Option<&str>,
    settings: &BatchSettings,
) -> Result<bool, Box<dyn std::error::Error>> {
    let old_key = old_key_or_else(old_key, read_old_key)?;
    let old_key = EncryptionKey::parse(&old_key).map_err(|e| format!("--old-key: {e}"))?;
    let maintenance = Maintenance::open(store)?;
    maintenance.announce("Re-encrypting sensitive field values", settings);

    let report = maintenance.engine().rekey(&old_key, &settings.options())?;
    finish(&report, settings)
}

/// The given old key, or the answer from `ask`; blank answers are rejected.
fn old_key_or_else(
    given: Option<&str>,
    ask: impl FnOnce() -> io::Result<String>,
) -> Result<String, Box<dyn std::error::Error>> {
    let key = match given {
        Some(key) => key.to_string(),
        None => ask()?,
    };
    let key = key.trim();
    if key.is_empty() {
        return Err(CliError::NoKeyProvided.into());
    }
    Ok(key.to_string())
}

fn read_old_key() -> io::Result<String> {
    if io::stdin().is_terminal() {
        rpassword::prompt_password("Previous encryption key: ")
    } else {
        let mut input = String::new();
        io::stdin().read_to_string(&mut input)?;
        Ok(input)
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{contact_store, read_record, settings, TEST_KEY};
    use super::*;
    use sealfield_core::FieldEnvelope;

    const NEW_KEY: &str = "base64:AgICAgICAgICAgICAgICAgICAgICAgICAgICAgICAgI=";

    #[test]
    fn moves_values_to_the_new_key() {
        let dir = contact_store();
        super::super::encrypt_existing::run(&settings(dir.path()), &BatchSettings::default())
            .unwrap();

        let mut rotated = settings(dir.path());
        rotated.key = Some(NEW_KEY.to_string());
        assert!(run(&rotated, Some(TEST_KEY), &BatchSettings::default()).unwrap());

        let envelope = FieldEnvelope::new(&EncryptionKey::parse(NEW_KEY).unwrap());
        let email = read_record(dir.path(), "r1")
            .get_str("email")
            .unwrap()
            .to_string();
        assert_eq!(envelope.decrypt(&email).into_value(), "john@example.com");
    }

    #[test]
    fn invalid_old_key_fails_setup() {
        let dir = contact_store();
        let err = run(
            &settings(dir.path()),
            Some("base64:short"),
            &BatchSettings::default(),
        )
        .unwrap_err();
        assert!(err.to_string().starts_with("--old-key"));
    }

    #[test]
    fn blank_old_key_fails_setup() {
        let dir = contact_store();
        let err = run(&settings(dir.path()), Some("  "), &BatchSettings::default()).unwrap_err();
        assert_eq!(err.to_string(), "No key provided.");
        assert!(err.downcast_ref::<CliError>().is_some());
    }

    #[test]
    fn empty_prompt_answer_is_rejected() {
        let err = old_key_or_else(None, || Ok("\n".to_string())).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CliError>(),
            Some(CliError::NoKeyProvided)
        ));
    }

    #[test]
    fn prompt_is_only_used_without_flag() {
        let key = old_key_or_else(Some(TEST_KEY), || panic!("prompted")).unwrap();
        assert_eq!(key, TEST_KEY);

        let key = old_key_or_else(None, || Ok(format!("{TEST_KEY}\n"))).unwrap();
        assert_eq!(key, TEST_KEY);
    }
}
