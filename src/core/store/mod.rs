//! Partitioned key-value storage.
//!
//! The table schema is `name` (string partition key) plus `version`
//! (string sort key); the uniqueness of `(name, version)` is enforced here
//! by the conditional put, not by any in-process locking.
//!
//! ## Backends
//!
//! - **DynamoDB**: the production backend ([`DynamoStorage`]).
//! - **Memory**: in-process `BTreeMap` backend for tests and local
//!   development ([`MemoryStorage`]).
//!
//! ## Adding a New Backend
//!
//! 1. Implement the `Storage` trait
//! 2. Add the implementation in a new file (e.g., `sqlite.rs`)
//! 3. Re-export from this module

use crate::core::credential::Credential;
use crate::error::Result;

mod dynamo;
mod memory;

pub use dynamo::DynamoStorage;
pub use memory::MemoryStorage;

/// Lifecycle state of the backing table, as reported by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableStatus {
    Creating,
    Active,
    Other(String),
}

/// Storage capability consumed by the credential store.
///
/// All reads are strongly consistent. Implementations surface a condition
/// failure on `put_if_absent` as `Error::DuplicateVersion`; everything
/// else maps to `Error::Store`.
pub trait Storage {
    /// Write a credential only if no `(name, version)` item exists yet.
    fn put_if_absent(&self, cred: &Credential) -> Result<()>;

    /// Fetch the exact `(name, version)` item.
    fn get(&self, name: &str, version: &str) -> Result<Option<Credential>>;

    /// Fetch every version stored under `name`.
    fn query_name(&self, name: &str) -> Result<Vec<Credential>>;

    /// Scan name, version, and creation date of every item. The encrypted
    /// attributes come back empty.
    fn scan_metadata(&self) -> Result<Vec<Credential>>;

    /// Scan every attribute of every item.
    fn scan_all(&self) -> Result<Vec<Credential>>;

    /// Delete the exact `(name, version)` item.
    fn delete(&self, name: &str, version: &str) -> Result<()>;

    /// Issue the create-table request. Does not wait for readiness.
    fn create_table(&self) -> Result<()>;

    /// Report the table's lifecycle status.
    fn table_status(&self) -> Result<TableStatus>;
}
