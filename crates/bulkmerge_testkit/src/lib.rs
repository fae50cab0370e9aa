//! # Bulkmerge Testkit
//!
//! Test utilities for bulkmerge.
//!
//! This crate provides:
//! - Record fixtures covering keys, identity columns and navigations
//! - In-memory database helpers that create and seed fixture tables
//! - Property-based test generators using proptest
//! - A reference model of the synchronization modes
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bulkmerge_testkit::prelude::*;
//!
//! #[test]
//! fn test_upsert() {
//!     with_seeded_db(&scenarios::example_target(), |db| {
//!         SyncEngine::default()
//!             .sync(&mut db.connect(), &scenarios::example_records(), SyncMode::UpsertNoDelete)
//!             .unwrap();
//!     });
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod model;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use bulkmerge_core::{SyncConfig, SyncEngine, SyncMode, Value};
}

pub use fixtures::*;
pub use generators::*;
