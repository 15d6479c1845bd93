//! Storage layer for targetstore.
//!
//! This module provides the [`TargetRepository`] trait and two
//! implementations:
//!
//! - [`CsvStore`]: the durable flat-file store. Every mutation reads the whole
//!   collection, changes it in memory, and rewrites the whole file.
//! - [`MemoryStore`]: an in-process store with the same semantics, for tests
//!   and embedding.
//!
//! Neither store locks. Callers must serialize access to one backing file.

mod csv_store;
pub mod format;
mod memory;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::Result;
use crate::target::{NewTarget, Target, TargetPatch};

pub use csv_store::CsvStore;
pub use memory::MemoryStore;

/// A durable collection of target records.
///
/// `Ok(None)` from a lookup or mutation means "no record with that id"; it is
/// never used for a successful call that happened to change nothing.
pub trait TargetRepository: Send + Sync {
    /// Ensure the backing storage exists. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be created.
    fn initialize(&self) -> Result<()>;

    /// All records, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage is unreadable or corrupt.
    fn list_all(&self) -> Result<Vec<Target>>;

    /// The first record with the given id.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage is unreadable or corrupt.
    fn get_by_id(&self, id: &str) -> Result<Option<Target>> {
        Ok(self.list_all()?.into_iter().find(|t| t.id == id))
    }

    /// Assign a fresh id to a validated record and persist it.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be read or written.
    fn create(&self, new: NewTarget) -> Result<Target>;

    /// Merge a patch into the record with the given id.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be read or written.
    fn update(&self, id: &str, patch: &TargetPatch) -> Result<Option<Target>>;

    /// Remove the record with the given id, returning its prior values.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be read or written.
    fn delete(&self, id: &str) -> Result<Option<Target>>;

    /// Number of stored records.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage is unreadable or corrupt.
    fn count(&self) -> Result<usize> {
        Ok(self.list_all()?.len())
    }

    /// Storage statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage is unreadable or corrupt.
    fn stats(&self) -> Result<StoreStats>;
}

/// Statistics about a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    /// Total number of records stored.
    pub total_targets: usize,
    /// Size of the backing file in bytes (0 for in-memory stores).
    pub file_size_bytes: u64,
    /// When the collection was last written.
    pub modified: Option<DateTime<Utc>>,
}

/// Generate an id not used by any record in `existing`.
pub(crate) fn fresh_id(existing: &[Target]) -> String {
    loop {
        let id = uuid::Uuid::new_v4().to_string();
        if !existing.iter().any(|t| t.id == id) {
            return id;
        }
    }
}
