//! In-memory doctrine registry.
//!
//! # Responsibility
//! - Own every `DoctrineRecord` and gate all mutation through validated operations.
//! - Attach one audit entry to every successful mutation.
//!
//! # Invariants
//! - Stored category always equals `category_of(identifier.nested)`.
//! - Every stored record has a non-empty audit trail.
//! - Map keys equal the canonical identifier text of their record.
//! - Failed operations leave the registry untouched.

use crate::clock::{Clock, SystemClock};
use crate::compliance::neon::{neon_compliance, NeonCompliance};
use crate::config::RegistryConfig;
use crate::model::audit::{AuditAction, AuditEntry, AuditLog, ChangeSet, ChangeValue};
use crate::model::doctrine::{
    DoctrineCandidate, DoctrinePatch, DoctrineRecord, DoctrineStatus, Phase,
};
use crate::model::identifier::{self, category_of, Category, StructuredIdentifier};
use crate::registry::error::{RegistryError, RegistryResult};
use crate::registry::seed::starter_doctrines;
use indexmap::IndexMap;
use log::{debug, info, warn};
use std::sync::Arc;

/// Registry of doctrine records keyed by canonical identifier text.
///
/// Iteration follows insertion order.
#[derive(Debug)]
pub struct DoctrineRegistry {
    records: IndexMap<String, DoctrineRecord>,
    config: RegistryConfig,
    clock: Arc<dyn Clock>,
}

impl Default for DoctrineRegistry {
    fn default() -> Self {
        Self {
            records: IndexMap::new(),
            config: RegistryConfig::default(),
            clock: Arc::new(SystemClock),
        }
    }
}

impl DoctrineRegistry {
    /// Creates a registry, seeding starter doctrines when configured to.
    ///
    /// # Errors
    /// - `InvalidConfig` when `config` fails validation.
    pub fn new(config: RegistryConfig, clock: Arc<dyn Clock>) -> RegistryResult<Self> {
        config.validate()?;
        let seed = config.seed_on_init;
        let mut registry = Self {
            records: IndexMap::new(),
            config,
            clock,
        };
        if seed {
            registry.seed_defaults()?;
        }
        Ok(registry)
    }

    pub fn with_system_clock(config: RegistryConfig) -> RegistryResult<Self> {
        Self::new(config, Arc::new(SystemClock))
    }

    /// Rebuilds a registry from previously persisted records.
    ///
    /// Records keep their given order and audit trails; no new audit
    /// entries are appended.
    ///
    /// # Errors
    /// - `CorruptRecord` when a record has an invalid identifier, a category
    ///   that disagrees with its band, or an empty audit trail.
    /// - `DuplicateIdentifier` when two records share an identifier.
    pub fn restore(
        config: RegistryConfig,
        clock: Arc<dyn Clock>,
        records: Vec<DoctrineRecord>,
    ) -> RegistryResult<Self> {
        config.validate()?;
        let mut map = IndexMap::with_capacity(records.len());
        for record in records {
            let key = record.key();
            check_restored(&key, &record)?;
            if map.contains_key(&key) {
                return Err(RegistryError::DuplicateIdentifier(key));
            }
            map.insert(key, record);
        }

        debug!(
            "event=registry_restore module=registry status=ok records={}",
            map.len()
        );
        Ok(Self {
            records: map,
            config,
            clock,
        })
    }

    /// Inserts the starter doctrines that are not present yet.
    ///
    /// Returns the number of records inserted.
    pub fn seed_defaults(&mut self) -> RegistryResult<usize> {
        let mut inserted = 0;
        for candidate in starter_doctrines() {
            if self.contains(&candidate.identifier) {
                continue;
            }
            self.create(candidate)?;
            inserted += 1;
        }
        info!("event=registry_seed module=registry status=ok inserted={inserted}");
        Ok(inserted)
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Creates one doctrine record.
    ///
    /// Checks run in order: identifier syntax, category agreement,
    /// uniqueness, then non-blank title and owner.
    ///
    /// # Errors
    /// - `InvalidIdentifier`, `CategoryMismatch`, `DuplicateIdentifier`,
    ///   or `EmptyField`. The registry is unchanged on any error.
    pub fn create(&mut self, candidate: DoctrineCandidate) -> RegistryResult<StructuredIdentifier> {
        match self.try_create(candidate) {
            Ok(identifier) => {
                info!(
                    "event=doctrine_create module=registry status=ok identifier={identifier} total={}",
                    self.records.len()
                );
                Ok(identifier)
            }
            Err(err) => {
                warn!(
                    "event=doctrine_create module=registry status=error error_code={} error={}",
                    err.code(),
                    err
                );
                Err(err)
            }
        }
    }

    fn try_create(&mut self, candidate: DoctrineCandidate) -> RegistryResult<StructuredIdentifier> {
        let identifier = identifier::parse(&candidate.identifier).map_err(|source| {
            RegistryError::InvalidIdentifier {
                text: candidate.identifier.trim().to_string(),
                source,
            }
        })?;
        let key = identifier.to_string();

        let expected = category_of(identifier.nested);
        if candidate.category != expected {
            return Err(RegistryError::CategoryMismatch {
                identifier: key,
                expected,
                declared: candidate.category,
            });
        }

        if self.records.contains_key(&key) {
            return Err(RegistryError::DuplicateIdentifier(key));
        }

        require_non_blank(&key, "title", &candidate.title)?;
        require_non_blank(&key, "owner", &candidate.owner)?;

        let agent = self.resolve_agent(candidate.agent.as_deref());
        let now = self.clock.now_ms();
        let mut changes = ChangeSet::new();
        changes.insert("created".to_string(), ChangeValue::Bool(true));
        let mut audit = AuditLog::new();
        audit.append(AuditEntry::new(
            now,
            AuditAction::Create,
            agent,
            changes,
            true,
        ));

        let record = DoctrineRecord {
            identifier,
            title: candidate.title,
            description: candidate.description,
            category: expected,
            phase: candidate.phase,
            status: candidate.status,
            owner: candidate.owner,
            created_at_ms: now,
            updated_at_ms: now,
            audit,
        };
        self.records.insert(key, record);
        Ok(identifier)
    }

    /// Applies the supplied fields of `patch` to one record.
    ///
    /// An empty patch is accepted and changes nothing, audit trail included.
    ///
    /// # Errors
    /// - `NotFound` when no record has `identifier`.
    /// - `EmptyField` when the patch blanks `title` or `owner`.
    pub fn update(
        &mut self,
        identifier: &str,
        patch: DoctrinePatch,
        agent: Option<&str>,
    ) -> RegistryResult<()> {
        let key = identifier.trim();
        let agent = self.resolve_agent(agent);
        let now = self.clock.now_ms();

        let Some(record) = self.records.get_mut(key) else {
            let err = RegistryError::NotFound(key.to_string());
            warn!(
                "event=doctrine_update module=registry status=error error_code={} identifier={key}",
                err.code()
            );
            return Err(err);
        };

        if let Some(title) = &patch.title {
            require_non_blank(key, "title", title)?;
        }
        if let Some(owner) = &patch.owner {
            require_non_blank(key, "owner", owner)?;
        }
        if patch.is_empty() {
            return Ok(());
        }

        let changes = patch.to_changes();
        let DoctrinePatch {
            title,
            description,
            phase,
            status,
            owner,
        } = patch;
        if let Some(title) = title {
            record.title = title;
        }
        if let Some(description) = description {
            record.description = description;
        }
        if let Some(phase) = phase {
            record.phase = phase;
        }
        if let Some(status) = status {
            record.status = status;
        }
        if let Some(owner) = owner {
            record.owner = owner;
        }

        let compliant = neon_compliance(record).is_compliant();
        // Stored entry time, clamped past `now` when the clock stepped back.
        record.updated_at_ms = record.audit.append(AuditEntry::new(
            now,
            AuditAction::Update,
            agent,
            changes,
            compliant,
        ));

        info!(
            "event=doctrine_update module=registry status=ok identifier={key} compliant={compliant}"
        );
        Ok(())
    }

    /// Recomputes NEON compliance for one record and records a VALIDATE entry.
    ///
    /// # Errors
    /// - `NotFound` when no record has `identifier`.
    pub fn validate(
        &mut self,
        identifier: &str,
        agent: Option<&str>,
    ) -> RegistryResult<NeonCompliance> {
        let key = identifier.trim();
        let agent = self.resolve_agent(agent);
        let now = self.clock.now_ms();
        let Some(record) = self.records.get_mut(key) else {
            let err = RegistryError::NotFound(key.to_string());
            warn!(
                "event=doctrine_validate module=registry status=error error_code={} identifier={key}",
                err.code()
            );
            return Err(err);
        };

        let neon = neon_compliance(record);
        record.audit.append(AuditEntry::new(
            now,
            AuditAction::Validate,
            agent,
            neon.to_changes(),
            neon.is_compliant(),
        ));

        debug!(
            "event=doctrine_validate module=registry status=ok identifier={key} compliant={}",
            neon.is_compliant()
        );
        Ok(neon)
    }

    /// Exact-match lookup by identifier text.
    pub fn get(&self, identifier: &str) -> Option<&DoctrineRecord> {
        self.records.get(identifier.trim())
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.records.contains_key(identifier.trim())
    }

    pub fn list_by_phase(&self, phase: Phase) -> Vec<&DoctrineRecord> {
        self.records
            .values()
            .filter(|record| record.phase == phase)
            .collect()
    }

    pub fn list_by_category(&self, category: Category) -> Vec<&DoctrineRecord> {
        self.records
            .values()
            .filter(|record| record.category == category)
            .collect()
    }

    pub fn list_by_status(&self, status: DoctrineStatus) -> Vec<&DoctrineRecord> {
        self.records
            .values()
            .filter(|record| record.status == status)
            .collect()
    }

    /// All records in insertion order.
    pub fn records(&self) -> impl Iterator<Item = &DoctrineRecord> {
        self.records.values()
    }

    /// Canonical identifier texts in insertion order.
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn resolve_agent(&self, agent: Option<&str>) -> String {
        match agent.map(str::trim) {
            Some(agent) if !agent.is_empty() => agent.to_string(),
            _ => self.config.default_agent.clone(),
        }
    }
}

fn require_non_blank(identifier: &str, field: &'static str, value: &str) -> RegistryResult<()> {
    if value.trim().is_empty() {
        return Err(RegistryError::EmptyField {
            identifier: identifier.to_string(),
            field,
        });
    }
    Ok(())
}

fn check_restored(key: &str, record: &DoctrineRecord) -> RegistryResult<()> {
    let corrupt = |reason: String| RegistryError::CorruptRecord {
        identifier: key.to_string(),
        reason,
    };

    let Some(expected) = record.identifier.category() else {
        return Err(corrupt(format!(
            "nested value {} is outside the category bands",
            record.identifier.nested
        )));
    };
    if record.category != expected {
        return Err(corrupt(format!(
            "category `{}` disagrees with band category `{expected}`",
            record.category
        )));
    }
    if record.audit.is_empty() {
        return Err(corrupt("audit trail is empty".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::DoctrineRegistry;
    use crate::clock::ManualClock;
    use crate::config::RegistryConfig;
    use crate::model::doctrine::{DoctrineCandidate, Phase};
    use crate::model::identifier::Category;
    use std::sync::Arc;

    #[test]
    fn seeded_registry_holds_one_record_per_category() {
        let clock = Arc::new(ManualClock::new(1));
        let registry = DoctrineRegistry::new(RegistryConfig::seeded(), clock)
            .expect("seeded registry should build");
        for category in Category::ALL {
            assert_eq!(registry.list_by_category(category).len(), 1, "{category}");
        }
    }

    #[test]
    fn seeding_twice_inserts_nothing_new() {
        let mut registry = DoctrineRegistry::default();
        assert_eq!(registry.seed_defaults().expect("first seed"), 5);
        assert_eq!(registry.seed_defaults().expect("second seed"), 0);
        assert_eq!(registry.len(), 5);
    }

    #[test]
    fn blank_agent_falls_back_to_configured_default() {
        let config = RegistryConfig::default().with_default_agent("registrar");
        let mut registry = DoctrineRegistry::new(config, Arc::new(ManualClock::new(1)))
            .expect("registry should build");
        registry
            .create(
                DoctrineCandidate::new("1.2.3.4.5", "Tone", Category::Tone, Phase::Frame, "ops")
                    .with_agent("   "),
            )
            .expect("create should succeed");

        let record = registry.get("1.2.3.4.5").expect("record should exist");
        assert_eq!(record.audit.entries()[0].agent, "registrar");
    }
}
