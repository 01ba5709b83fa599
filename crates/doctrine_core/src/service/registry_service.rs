//! Thread-safe registry service.
//!
//! # Responsibility
//! - Serialize mutations so check-then-insert runs as one critical section.
//! - Serve concurrent reads from owned copies of registry state.
//!
//! # Invariants
//! - At most one mutation is in flight per service instance.
//! - Readers never observe a partially applied mutation.

use crate::compliance::{generate_report, ComplianceReport, NeonCompliance};
use crate::model::doctrine::{DoctrineCandidate, DoctrinePatch, DoctrineRecord, Phase};
use crate::model::identifier::{Category, StructuredIdentifier};
use crate::registry::{DoctrineRegistry, RegistryResult};
use parking_lot::RwLock;

/// Shared wrapper over one `DoctrineRegistry`.
#[derive(Debug, Default)]
pub struct RegistryService {
    registry: RwLock<DoctrineRegistry>,
}

impl RegistryService {
    pub fn new(registry: DoctrineRegistry) -> Self {
        Self {
            registry: RwLock::new(registry),
        }
    }

    pub fn create(&self, candidate: DoctrineCandidate) -> RegistryResult<StructuredIdentifier> {
        self.registry.write().create(candidate)
    }

    pub fn update(
        &self,
        identifier: &str,
        patch: DoctrinePatch,
        agent: Option<&str>,
    ) -> RegistryResult<()> {
        self.registry.write().update(identifier, patch, agent)
    }

    pub fn validate(
        &self,
        identifier: &str,
        agent: Option<&str>,
    ) -> RegistryResult<NeonCompliance> {
        self.registry.write().validate(identifier, agent)
    }

    /// Returns a copy of one record.
    pub fn get(&self, identifier: &str) -> Option<DoctrineRecord> {
        self.registry.read().get(identifier).cloned()
    }

    pub fn list_by_phase(&self, phase: Phase) -> Vec<DoctrineRecord> {
        self.registry
            .read()
            .list_by_phase(phase)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn list_by_category(&self, category: Category) -> Vec<DoctrineRecord> {
        self.registry
            .read()
            .list_by_category(category)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn generate_report(&self, stamped_count: usize) -> ComplianceReport {
        generate_report(&self.registry.read(), stamped_count)
    }

    /// Copy of every record in registry order, taken under one read lock.
    pub fn snapshot(&self) -> Vec<DoctrineRecord> {
        self.registry.read().records().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.registry.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.read().is_empty()
    }

    /// Runs `f` with shared access to the registry.
    pub fn with_registry<T>(&self, f: impl FnOnce(&DoctrineRegistry) -> T) -> T {
        f(&self.registry.read())
    }

    pub fn into_inner(self) -> DoctrineRegistry {
        self.registry.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::RegistryService;
    use crate::model::doctrine::{DoctrineCandidate, Phase};
    use crate::model::identifier::Category;
    use crate::registry::RegistryError;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn concurrent_creates_of_same_identifier_admit_exactly_one() {
        let service = Arc::new(RegistryService::default());
        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let service = Arc::clone(&service);
                thread::spawn(move || {
                    service.create(
                        DoctrineCandidate::new(
                            "1.1.1.20.1",
                            "Process",
                            Category::Process,
                            Phase::Frame,
                            "system",
                        )
                        .with_agent(format!("worker-{worker}")),
                    )
                })
            })
            .collect();

        let results: Vec<_> = handles
            .into_iter()
            .map(|handle| handle.join().expect("worker should not panic"))
            .collect();
        let created = results.iter().filter(|result| result.is_ok()).count();
        let duplicates = results
            .iter()
            .filter(|result| matches!(result, Err(RegistryError::DuplicateIdentifier(_))))
            .count();

        assert_eq!(created, 1);
        assert_eq!(duplicates, 7);
        assert_eq!(service.len(), 1);
    }
}
