//! Persistence boundary for whole-registry snapshots.
//!
//! # Responsibility
//! - Define the save/load/list/delete contract external storage must honor.
//! - Provide the SQLite-backed implementation used by core callers.
//!
//! # Invariants
//! - A loaded snapshot reproduces every record field and audit entry order exactly.
//! - Read paths reject invalid persisted state instead of masking it.

mod snapshot_store;

pub use snapshot_store::{
    load_registry, RegistryStore, SnapshotId, SnapshotSummary, SqliteRegistryStore, StoreError,
    StoreResult,
};
