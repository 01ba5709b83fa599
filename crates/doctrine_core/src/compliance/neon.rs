//! NEON compliance derivation for a single record.

use crate::model::audit::{ChangeSet, ChangeValue};
use crate::model::doctrine::DoctrineRecord;
use crate::model::identifier;
use serde::Serialize;

/// Four-part derived compliance check. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NeonCompliance {
    /// Identifier re-validates through the codec.
    pub nuclear_enforcement: bool,
    /// Owner is non-blank.
    pub explicit_ownership: bool,
    /// Category agrees with the identifier band.
    pub operational_normalization: bool,
    /// Audit trail has at least one entry.
    pub no_orphan_data: bool,
}

impl NeonCompliance {
    pub fn is_compliant(&self) -> bool {
        self.nuclear_enforcement
            && self.explicit_ownership
            && self.operational_normalization
            && self.no_orphan_data
    }

    /// Names of the checks that did not hold, in declaration order.
    pub fn failed_checks(&self) -> Vec<&'static str> {
        [
            ("nuclear_enforcement", self.nuclear_enforcement),
            ("explicit_ownership", self.explicit_ownership),
            ("operational_normalization", self.operational_normalization),
            ("no_orphan_data", self.no_orphan_data),
        ]
        .into_iter()
        .filter(|(_, passed)| !passed)
        .map(|(name, _)| name)
        .collect()
    }

    pub(crate) fn to_changes(self) -> ChangeSet {
        let mut changes = ChangeSet::new();
        changes.insert("neon".to_string(), ChangeValue::Bool(self.is_compliant()));
        changes.insert(
            "nuclear_enforcement".to_string(),
            ChangeValue::Bool(self.nuclear_enforcement),
        );
        changes.insert(
            "explicit_ownership".to_string(),
            ChangeValue::Bool(self.explicit_ownership),
        );
        changes.insert(
            "operational_normalization".to_string(),
            ChangeValue::Bool(self.operational_normalization),
        );
        changes.insert(
            "no_orphan_data".to_string(),
            ChangeValue::Bool(self.no_orphan_data),
        );
        changes
    }
}

/// Computes NEON compliance for one record.
pub fn neon_compliance(record: &DoctrineRecord) -> NeonCompliance {
    NeonCompliance {
        nuclear_enforcement: identifier_is_valid(record),
        explicit_ownership: !record.owner.trim().is_empty(),
        operational_normalization: identifier::try_category_of(record.identifier.nested)
            == Some(record.category),
        no_orphan_data: !record.audit.is_empty(),
    }
}

/// Re-validates the stored identifier by formatting and parsing it again.
pub(crate) fn identifier_is_valid(record: &DoctrineRecord) -> bool {
    identifier::is_valid(&identifier::format(&record.identifier))
}
