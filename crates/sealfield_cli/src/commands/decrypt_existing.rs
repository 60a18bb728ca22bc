//! Decrypt-existing command implementation.

use super::maintenance::{finish, Maintenance};
use super::{BatchSettings, StoreSettings};

/// Runs the decrypt-existing command.
///
/// Returns `false` when the exit status should signal failure.
pub fn run(
    store: &StoreSettings,
    settings: &BatchSettings,
) -> Result<bool, Box<dyn std::error::Error>> {
    let maintenance = Maintenance::open(store)?;
    maintenance.announce("Decrypting sensitive field values", settings);

    let report = maintenance.engine().decrypt_existing(&settings.options())?;
    finish(&report, settings)
}

#[cfg(test)]
mod tests {
    use super::super::testing::{contact_store, read_record, settings, write_record};
    use super::*;
    use sealfield_core::{EncryptionKey, FieldEnvelope};
    use sealfield_storage::Record;

    #[test]
    fn round_trips_with_encrypt_existing() {
        let dir = contact_store();
        let store = settings(dir.path());
        super::super::encrypt_existing::run(&store, &BatchSettings::default()).unwrap();

        assert!(run(&store, &BatchSettings::default()).unwrap());

        let record = read_record(dir.path(), "r1");
        assert_eq!(record.get_str("email"), Some("john@example.com"));
    }

    #[test]
    fn undecryptable_values_fail_only_when_asked() {
        let dir = contact_store();
        let foreign = FieldEnvelope::new(&EncryptionKey::generate());
        write_record(
            dir.path(),
            &Record::with_id("r2", "contact").field("email", foreign.encrypt("x@y.z").unwrap()),
        );
        let store = settings(dir.path());

        assert!(run(&store, &BatchSettings::default()).unwrap());

        let strict = BatchSettings {
            fail_on_errors: true,
            ..BatchSettings::default()
        };
        assert!(!run(&store, &strict).unwrap());
    }
}
