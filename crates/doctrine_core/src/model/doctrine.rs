//! Doctrine record domain model.
//!
//! # Responsibility
//! - Define the canonical doctrine record owned by the registry.
//! - Define caller-facing create/update request shapes.
//!
//! # Invariants
//! - `category` equals `category_of(identifier.nested)` for registry-owned records.
//! - `audit` is non-empty for registry-owned records.
//! - Timestamps are stamped by the registry, never by callers.
//!
//! # See also
//! - `crate::registry` for the operations that enforce these rules.

use crate::model::audit::{AuditLog, ChangeSet, ChangeValue};
use crate::model::identifier::{Category, StructuredIdentifier};
use serde::{Deserialize, Serialize};

/// Lifecycle tag independent of the identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Frame,
    Blueprint,
    Process,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Frame => "FRAME",
            Self::Blueprint => "BLUEPRINT",
            Self::Process => "PROCESS",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "FRAME" => Some(Self::Frame),
            "BLUEPRINT" => Some(Self::Blueprint),
            "PROCESS" => Some(Self::Process),
            _ => None,
        }
    }
}

/// Publication state of a doctrine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DoctrineStatus {
    Draft,
    Active,
    Deprecated,
}

impl DoctrineStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Active => "ACTIVE",
            Self::Deprecated => "DEPRECATED",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "DRAFT" => Some(Self::Draft),
            "ACTIVE" => Some(Self::Active),
            "DEPRECATED" => Some(Self::Deprecated),
            _ => None,
        }
    }
}

/// One governed doctrine entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoctrineRecord {
    /// Primary key; serialized in canonical dotted form.
    pub identifier: StructuredIdentifier,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub phase: Phase,
    pub status: DoctrineStatus,
    /// Attribution for the doctrine; must be non-blank.
    pub owner: String,
    /// Unix epoch milliseconds.
    pub created_at_ms: i64,
    /// Unix epoch milliseconds.
    pub updated_at_ms: i64,
    pub audit: AuditLog,
}

impl DoctrineRecord {
    /// Canonical identifier text used as registry key.
    pub fn key(&self) -> String {
        self.identifier.to_string()
    }
}

/// Caller input for `DoctrineRegistry::create`.
///
/// `identifier` stays as raw text; the registry parses it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoctrineCandidate {
    pub identifier: String,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub phase: Phase,
    pub status: DoctrineStatus,
    pub owner: String,
    /// Acting identity for the audit entry; `None` uses the configured default.
    pub agent: Option<String>,
}

impl DoctrineCandidate {
    /// Builds a draft candidate with empty description and default agent.
    pub fn new(
        identifier: impl Into<String>,
        title: impl Into<String>,
        category: Category,
        phase: Phase,
        owner: impl Into<String>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            title: title.into(),
            description: String::new(),
            category,
            phase,
            status: DoctrineStatus::Draft,
            owner: owner.into(),
            agent: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_status(mut self, status: DoctrineStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_agent(mut self, agent: impl Into<String>) -> Self {
        self.agent = Some(agent.into());
        self
    }
}

/// Partial update; only `Some` fields are applied.
///
/// Identifier and category are not patchable: category is derived.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DoctrinePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub phase: Option<Phase>,
    pub status: Option<DoctrineStatus>,
    pub owner: Option<String>,
}

impl DoctrinePatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.phase.is_none()
            && self.status.is_none()
            && self.owner.is_none()
    }

    /// Field-name to new-value map recorded in the UPDATE audit entry.
    pub fn to_changes(&self) -> ChangeSet {
        let mut changes = ChangeSet::new();
        if let Some(title) = &self.title {
            changes.insert("title".to_string(), ChangeValue::from(title.as_str()));
        }
        if let Some(description) = &self.description {
            changes.insert(
                "description".to_string(),
                ChangeValue::from(description.as_str()),
            );
        }
        if let Some(phase) = self.phase {
            changes.insert("phase".to_string(), ChangeValue::from(phase.as_str()));
        }
        if let Some(status) = self.status {
            changes.insert("status".to_string(), ChangeValue::from(status.as_str()));
        }
        if let Some(owner) = &self.owner {
            changes.insert("owner".to_string(), ChangeValue::from(owner.as_str()));
        }
        changes
    }
}
