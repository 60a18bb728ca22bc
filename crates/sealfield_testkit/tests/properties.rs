//! Property tests for the envelope and batch maintenance.

use proptest::prelude::*;
use sealfield_core::{BatchOptions, Decryption, FieldEnvelope};
use sealfield_storage::{RecordStore, Value};
use sealfield_testkit::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn envelope_round_trips_under_any_key(key in key_strategy(), text in plaintext_strategy()) {
        let envelope = FieldEnvelope::new(&key);
        let token = envelope.encrypt(&text).unwrap();

        prop_assert!(envelope.is_enveloped(&token));
        prop_assert_eq!(envelope.encrypt(&token).unwrap(), token.clone());
        prop_assert_eq!(envelope.decrypt(&token), Decryption::Decrypted(text));
    }

    #[test]
    fn foreign_tokens_never_decrypt(a in key_strategy(), b in key_strategy(), text in plaintext_strategy()) {
        prop_assume!(a != b);
        let token = FieldEnvelope::new(&a).encrypt(&text).unwrap();

        let result = FieldEnvelope::new(&b).decrypt(&token);
        prop_assert!(!result.is_ok());
        prop_assert_eq!(result.into_value(), token);
    }

    #[test]
    fn encrypt_existing_is_idempotent(records in contact_batch_strategy(8)) {
        let store = TestStore::memory();
        store.seed(records);

        store.batch().encrypt_existing(&BatchOptions::new()).unwrap();
        let once = store.raw().dump();
        let second = store.batch().encrypt_existing(&BatchOptions::new()).unwrap();

        prop_assert_eq!(second.updated, 0);
        prop_assert_eq!(second.errors, 0);
        prop_assert_eq!(store.raw().dump(), once);
    }

    #[test]
    fn dry_run_is_byte_identical(records in contact_batch_strategy(8)) {
        let store = TestStore::memory();
        store.seed(records);
        let before = store.raw().dump();

        let planned = store
            .batch()
            .encrypt_existing(&BatchOptions::new().dry_run(true))
            .unwrap();
        prop_assert_eq!(store.raw().dump(), before);

        let applied = store.batch().encrypt_existing(&BatchOptions::new()).unwrap();
        prop_assert_eq!(planned.updated, applied.updated);
        prop_assert_eq!(planned.skipped, applied.skipped);
    }

    #[test]
    fn encrypt_then_decrypt_existing_restores_records(records in contact_batch_strategy(8)) {
        let store = TestStore::memory();
        store.seed(records.clone());

        store.batch().encrypt_existing(&BatchOptions::new()).unwrap();
        let report = store.batch().decrypt_existing(&BatchOptions::new()).unwrap();
        prop_assert_eq!(report.errors, 0);

        for record in records {
            prop_assert_eq!(store.raw().fetch_one(&record.id).unwrap(), Some(record));
        }
    }

    #[test]
    fn non_text_values_are_never_enveloped(records in contact_batch_strategy(8)) {
        let store = TestStore::memory();
        store.seed(records.clone());
        store.batch().encrypt_existing(&BatchOptions::new()).unwrap();

        for original in records {
            let stored = store.raw().fetch_one(&original.id).unwrap().unwrap();
            for field in ["email", "message"] {
                match original.get(field) {
                    Some(Value::String(text)) if !text.is_empty() => {
                        prop_assert!(stored.get_str(field).unwrap().starts_with("enc:v1:"));
                    }
                    other => prop_assert_eq!(stored.get(field), other),
                }
            }
        }
    }
}
