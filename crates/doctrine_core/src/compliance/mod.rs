//! Compliance engine.
//!
//! # Responsibility
//! - Derive per-record NEON compliance.
//! - Aggregate registry-wide counts and issue strings.
//!
//! # Invariants
//! - Read-only over registry state.
//! - Identifier validity is re-checked through the codec, never a copied band table.

pub mod neon;
pub mod report;

pub use neon::{neon_compliance, NeonCompliance};
pub use report::{generate_report, percent, report_for, ComplianceReport};
