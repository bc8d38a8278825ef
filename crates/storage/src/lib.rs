//! Storage abstraction and implementations for CivicSense.
//!
//! This crate provides a key-value storage trait with JSON-file and
//! in-memory implementations, and the report/session repositories built on
//! top of it.

#![warn(missing_docs)]

pub mod trait_;
pub mod json_storage;
pub mod memory;
pub mod reports;

pub use trait_::{KeyValueStore, StorageError, Result};
pub use json_storage::JsonStorage;
pub use memory::MemoryStorage;
pub use reports::{ReportStore, SessionStore, REPORTS_KEY, SESSION_KEY};
