//! Doctrine registry: validated ownership of all doctrine records.
//!
//! # Responsibility
//! - Enforce identifier uniqueness and category agreement at insertion.
//! - Expose lookup and filter reads over registry state.
//! - Attach audit entries to every mutation.
//!
//! # Invariants
//! - No operation mutates state before all of its checks pass.
//! - Records are never deleted.

mod doctrine_registry;
mod error;
mod seed;

pub use doctrine_registry::DoctrineRegistry;
pub use error::{RegistryError, RegistryResult};
pub use seed::starter_doctrines;
