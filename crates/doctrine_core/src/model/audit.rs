//! Append-only audit trail attached to each doctrine record.
//!
//! # Responsibility
//! - Define the immutable audit entry shape and its change payload.
//! - Expose an append-only log without any removal or reorder path.
//!
//! # Invariants
//! - Entries are never mutated, removed, or reordered once appended.
//! - Timestamps are non-decreasing in append order.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Kind of action recorded by one audit entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    Validate,
}

impl AuditAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::Validate => "VALIDATE",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "CREATE" => Some(Self::Create),
            "UPDATE" => Some(Self::Update),
            "DELETE" => Some(Self::Delete),
            "VALIDATE" => Some(Self::Validate),
            _ => None,
        }
    }
}

/// JSON-like value recorded for one changed field.
///
/// Serialized untagged, so `{"created": true}` round-trips as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChangeValue {
    Null,
    Bool(bool),
    Integer(i64),
    /// Always finite; `From<f64>` maps NaN and infinities to `Null`.
    Float(f64),
    Text(String),
    List(Vec<ChangeValue>),
    Map(BTreeMap<String, ChangeValue>),
}

impl From<bool> for ChangeValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for ChangeValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for ChangeValue {
    // JSON has no encoding for non-finite numbers.
    fn from(value: f64) -> Self {
        if value.is_finite() {
            Self::Float(value)
        } else {
            Self::Null
        }
    }
}

impl From<&str> for ChangeValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ChangeValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Field name to new value mapping carried by an entry.
pub type ChangeSet = BTreeMap<String, ChangeValue>;

/// One immutable audit record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Unix epoch milliseconds.
    pub timestamp_ms: i64,
    pub action: AuditAction,
    /// Opaque caller identity.
    pub agent: String,
    pub changes: ChangeSet,
    /// Whether the record satisfied NEON compliance when the action was taken.
    pub compliant: bool,
}

impl AuditEntry {
    pub fn new(
        timestamp_ms: i64,
        action: AuditAction,
        agent: impl Into<String>,
        changes: ChangeSet,
        compliant: bool,
    ) -> Self {
        Self {
            timestamp_ms,
            action,
            agent: agent.into(),
            changes,
            compliant,
        }
    }
}

/// Rejection raised when restoring a log whose entries are out of order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditOrderError {
    pub position: usize,
    pub previous_ms: i64,
    pub timestamp_ms: i64,
}

impl Display for AuditOrderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "audit entry {} at {} precedes previous entry at {}",
            self.position, self.timestamp_ms, self.previous_ms
        )
    }
}

impl Error for AuditOrderError {}

/// Append-only sequence of audit entries for one record.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AuditLog {
    entries: Vec<AuditEntry>,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a log from persisted entries, keeping their order.
    ///
    /// # Errors
    /// Returns `AuditOrderError` when any timestamp precedes its predecessor.
    pub fn from_entries(entries: Vec<AuditEntry>) -> Result<Self, AuditOrderError> {
        for (position, pair) in entries.windows(2).enumerate() {
            if pair[1].timestamp_ms < pair[0].timestamp_ms {
                return Err(AuditOrderError {
                    position: position + 1,
                    previous_ms: pair[0].timestamp_ms,
                    timestamp_ms: pair[1].timestamp_ms,
                });
            }
        }
        Ok(Self { entries })
    }

    /// Appends one entry at the end of the trail.
    ///
    /// A timestamp earlier than the last entry is clamped forward so the
    /// trail stays chronological even when the clock steps backwards.
    ///
    /// Returns the timestamp actually stored.
    pub(crate) fn append(&mut self, mut entry: AuditEntry) -> i64 {
        if let Some(last) = self.entries.last() {
            entry.timestamp_ms = entry.timestamp_ms.max(last.timestamp_ms);
        }
        let stored_ms = entry.timestamp_ms;
        self.entries.push(entry);
        stored_ms
    }

    pub fn entries(&self) -> &[AuditEntry] {
        &self.entries
    }

    pub fn last(&self) -> Option<&AuditEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AuditEntry> {
        self.entries.iter()
    }
}

impl<'de> Deserialize<'de> for AuditLog {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = Vec::<AuditEntry>::deserialize(deserializer)?;
        Self::from_entries(entries).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::{AuditAction, AuditEntry, AuditLog, ChangeSet, ChangeValue};

    fn entry(timestamp_ms: i64, action: AuditAction) -> AuditEntry {
        AuditEntry::new(timestamp_ms, action, "system", ChangeSet::new(), true)
    }

    #[test]
    fn append_keeps_order_and_clamps_backwards_time() {
        let mut log = AuditLog::new();
        log.append(entry(100, AuditAction::Create));
        log.append(entry(50, AuditAction::Update));

        assert_eq!(log.len(), 2);
        assert_eq!(log.entries()[0].action, AuditAction::Create);
        assert_eq!(log.entries()[1].timestamp_ms, 100);
    }

    #[test]
    fn append_returns_the_stored_timestamp() {
        let mut log = AuditLog::new();
        assert_eq!(log.append(entry(300, AuditAction::Create)), 300);
        assert_eq!(log.append(entry(120, AuditAction::Validate)), 300);
        assert_eq!(log.append(entry(450, AuditAction::Update)), 450);
    }

    #[test]
    fn non_finite_floats_become_null() {
        assert_eq!(ChangeValue::from(f64::NAN), ChangeValue::Null);
        assert_eq!(ChangeValue::from(f64::INFINITY), ChangeValue::Null);
        assert_eq!(ChangeValue::from(f64::NEG_INFINITY), ChangeValue::Null);
        assert_eq!(ChangeValue::from(0.25), ChangeValue::Float(0.25));

        let mut changes = ChangeSet::new();
        changes.insert("ratio".to_string(), ChangeValue::from(f64::NAN));
        let json = serde_json::to_string(&changes).expect("changes should serialize");
        let decoded: ChangeSet = serde_json::from_str(&json).expect("changes should decode");
        assert_eq!(decoded, changes);
    }

    #[test]
    fn from_entries_rejects_out_of_order_trail() {
        let err = AuditLog::from_entries(vec![
            entry(200, AuditAction::Create),
            entry(100, AuditAction::Update),
        ])
        .unwrap_err();
        assert_eq!(err.position, 1);
    }

    #[test]
    fn change_values_serialize_untagged() {
        let mut changes = ChangeSet::new();
        changes.insert("created".to_string(), ChangeValue::from(true));
        changes.insert("title".to_string(), ChangeValue::from("Voice"));

        let json = serde_json::to_value(&changes).expect("changes should serialize");
        assert_eq!(json, serde_json::json!({"created": true, "title": "Voice"}));
    }
}
