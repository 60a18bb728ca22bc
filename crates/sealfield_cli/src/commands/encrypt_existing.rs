//! Encrypt-existing command implementation.

use super::maintenance::{finish, Maintenance};
use super::{BatchSettings, StoreSettings};

/// Runs the encrypt-existing command.
///
/// Returns `false` when the exit status should signal failure.
pub fn run(
    store: &StoreSettings,
    settings: &BatchSettings,
) -> Result<bool, Box<dyn std::error::Error>> {
    let maintenance = Maintenance::open(store)?;
    maintenance.announce("Encrypting existing sensitive field values", settings);

    let report = maintenance.engine().encrypt_existing(&settings.options())?;
    finish(&report, settings)
}

#[cfg(test)]
mod tests {
    use super::super::testing::{contact_store, read_record, settings};
    use super::super::CliError;
    use super::*;

    #[test]
    fn encrypts_plaintext_on_disk() {
        let dir = contact_store();

        let passed = run(&settings(dir.path()), &BatchSettings::default()).unwrap();

        assert!(passed);
        let record = read_record(dir.path(), "r1");
        assert!(record.get_str("email").unwrap().starts_with("enc:v1:"));
        assert_eq!(record.get_str("name"), Some("John Doe"));
    }

    #[test]
    fn dry_run_leaves_files_untouched() {
        let dir = contact_store();
        let path = dir.path().join("contact").join("r1.json");
        let before = std::fs::read(&path).unwrap();

        let batch = BatchSettings {
            dry_run: true,
            ..BatchSettings::default()
        };
        run(&settings(dir.path()), &batch).unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), before);
    }

    #[test]
    fn unknown_collection_fails_setup() {
        let dir = contact_store();
        let batch = BatchSettings {
            collection: Some("missing".into()),
            ..BatchSettings::default()
        };

        let err = run(&settings(dir.path()), &batch).unwrap_err();
        assert!(err.to_string().contains("collection not found"));
    }

    #[test]
    fn missing_key_fails_setup() {
        let dir = contact_store();
        let mut store = settings(dir.path());
        store.key = None;

        let err = run(&store, &BatchSettings::default()).unwrap_err();
        assert!(err.to_string().contains("encryption key required"));
    }

    #[test]
    fn missing_store_directory_fails_setup() {
        let dir = contact_store();
        let mut store = settings(dir.path());
        let typo = dir.path().join("no-such-store");
        store.store = Some(typo.clone());

        let err = run(&store, &BatchSettings::default()).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<CliError>(),
            Some(CliError::StoreNotFound(path)) if *path == typo
        ));
        assert!(!typo.exists());
    }
}
