//! Property-based test generators using proptest.

use proptest::prelude::*;
use sealfield_core::{EncryptionKey, MARKER};
use sealfield_storage::{Record, Value};

/// Strategy for arbitrary keys.
pub fn key_strategy() -> impl Strategy<Value = EncryptionKey> {
    prop::array::uniform32(any::<u8>())
        .prop_map(|bytes| EncryptionKey::from_bytes(&bytes).expect("32 bytes is a valid key"))
}

/// Strategy for strings that never carry the envelope marker.
pub fn plaintext_strategy() -> impl Strategy<Value = String> {
    any::<String>().prop_filter("must not look enveloped", |s| !s.starts_with(MARKER))
}

/// Strategy for the values a sensitive field may hold in legacy data:
/// text, empty text, null, numbers and nested structures.
pub fn field_value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        4 => plaintext_strategy().prop_map(Value::String),
        1 => Just(Value::String(String::new())),
        1 => Just(Value::Null),
        1 => any::<i64>().prop_map(Value::from),
        1 => prop::collection::vec("[a-z]{0,8}", 0..3)
            .prop_map(|items| Value::Array(items.into_iter().map(Value::String).collect())),
    ]
}

/// Strategy for contact records with arbitrary field contents.
///
/// Fields may be missing; IDs are unique within one generated batch only
/// when produced by [`contact_batch_strategy`].
pub fn contact_record_strategy(id: String) -> impl Strategy<Value = Record> {
    (
        "[A-Za-z ]{1,20}",
        prop::option::of(field_value_strategy()),
        prop::option::of(field_value_strategy()),
    )
        .prop_map(move |(name, email, message)| {
            let mut record = Record::with_id(id.clone(), "contact").field("name", name);
            if let Some(email) = email {
                record.set("email", email);
            }
            if let Some(message) = message {
                record.set("message", message);
            }
            record
        })
}

/// Strategy for a batch of contact records with distinct IDs.
pub fn contact_batch_strategy(max: usize) -> impl Strategy<Value = Vec<Record>> {
    (0..=max).prop_flat_map(|len| {
        (0..len)
            .map(|i| contact_record_strategy(format!("c{i:04}")))
            .collect::<Vec<_>>()
    })
}
