//! # sealfield testkit
//!
//! Test utilities for sealfield.
//!
//! This crate provides:
//! - Fixtures: schemas, records, deterministic keys and identities
//! - Ready-made sealed stores over memory or a temp directory
//! - Property-based test generators using proptest
//!
//! The end-to-end scenarios spanning storage, core and batch maintenance
//! live in this crate's `tests/` directory.
//!
//! ## Usage
//!
//! ```rust
//! use sealfield_testkit::prelude::*;
//!
//! let store = TestStore::memory();
//! store.save(&mut john_doe()).unwrap();
//! assert_eq!(store.raw().len(), 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
}

pub use fixtures::*;
pub use generators::*;
