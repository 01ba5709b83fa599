//! Doctrine domain model.
//!
//! # Responsibility
//! - Define identifier, record, and audit structures used by the registry.
//! - Keep the identifier codec as the single owner of category bands.
//!
//! # Invariants
//! - Every doctrine is keyed by the canonical text of its `StructuredIdentifier`.
//! - Audit trails are append-only.

pub mod audit;
pub mod doctrine;
pub mod identifier;
