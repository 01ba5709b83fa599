//! Core domain logic for the doctrine registry.
//! This crate is the single source of truth for identifier and compliance invariants.

pub mod clock;
pub mod compliance;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod registry;
pub mod service;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use compliance::{
    generate_report, neon_compliance, percent, report_for, ComplianceReport, NeonCompliance,
};
pub use config::{ConfigError, RegistryConfig, DEFAULT_AGENT};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::audit::{AuditAction, AuditEntry, AuditLog, ChangeSet, ChangeValue};
pub use model::doctrine::{
    DoctrineCandidate, DoctrinePatch, DoctrineRecord, DoctrineStatus, Phase,
};
pub use model::identifier::{
    category_of, try_category_of, Category, IdentifierError, StructuredIdentifier,
};
pub use registry::{DoctrineRegistry, RegistryError, RegistryResult};
pub use service::registry_service::RegistryService;
pub use store::{
    load_registry, RegistryStore, SnapshotId, SnapshotSummary, SqliteRegistryStore, StoreError,
    StoreResult,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
