//! Shared Module
//!
//! This module contains types and data structures that are shared between
//! the sync engine and its consumers: the change-envelope wire format, the
//! connection configuration and the crate-wide error type.

/// Change envelope wire format and batch grouping
pub mod envelope;

/// Shared error types
pub mod error;

/// Connection configuration
pub mod config;

/// Re-export commonly used types for convenience
pub use config::{Realm, SyncConfig, SyncConfigBuilder};
pub use envelope::{ChangeAction, ChangeEnvelope, CollectionBatch, CollectionKey};
pub use error::SyncError;
