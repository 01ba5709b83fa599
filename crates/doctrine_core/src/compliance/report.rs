//! Aggregate compliance report over a registry.
//!
//! # Invariants
//! - `neon_compliant + NEON failures == total_doctrines`.
//! - The engine only counts; it never divides.

use crate::compliance::neon::{identifier_is_valid, neon_compliance};
use crate::model::doctrine::DoctrineRecord;
use crate::registry::DoctrineRegistry;
use log::debug;
use serde::{Deserialize, Serialize};

/// Registry-wide compliance counts and issue descriptions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceReport {
    pub total_doctrines: usize,
    pub neon_compliant: usize,
    /// Externally supplied count of tracked STAMPED process entries.
    pub stamped_compliant: usize,
    pub barton_compliant: usize,
    pub issues: Vec<String>,
}

/// Builds the report for every record in `registry`.
///
/// `stamped_count` is reported unchanged.
pub fn generate_report(registry: &DoctrineRegistry, stamped_count: usize) -> ComplianceReport {
    report_for(registry.records(), stamped_count)
}

/// Builds the report for an arbitrary record sequence.
pub fn report_for<'a, I>(records: I, stamped_count: usize) -> ComplianceReport
where
    I: IntoIterator<Item = &'a DoctrineRecord>,
{
    let mut report = ComplianceReport {
        stamped_compliant: stamped_count,
        ..ComplianceReport::default()
    };

    for record in records {
        report.total_doctrines += 1;
        let key = record.key();

        let neon = neon_compliance(record);
        if neon.is_compliant() {
            report.neon_compliant += 1;
        } else {
            report.issues.push(format!(
                "{key}: failed NEON compliance ({})",
                neon.failed_checks().join(", ")
            ));
        }

        if identifier_is_valid(record) {
            report.barton_compliant += 1;
        } else {
            report.issues.push(format!("{key}: invalid Barton number"));
        }
    }

    debug!(
        "event=compliance_report module=compliance status=ok total={} neon={} barton={} issues={}",
        report.total_doctrines,
        report.neon_compliant,
        report.barton_compliant,
        report.issues.len()
    );
    report
}

/// Percentage of `part` in `total` for presentation callers; `0.0` when `total == 0`.
pub fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    part as f64 * 100.0 / total as f64
}
