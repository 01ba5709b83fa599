//! Registry configuration.
//!
//! # Responsibility
//! - Hold caller-tunable registry defaults.
//!
//! # Invariants
//! - `default_agent` is never blank once validated.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Agent identity used when a caller does not supply one.
pub const DEFAULT_AGENT: &str = "system";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    EmptyDefaultAgent,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyDefaultAgent => write!(f, "default_agent cannot be empty"),
        }
    }
}

impl Error for ConfigError {}

/// Construction options for `DoctrineRegistry`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Audit attribution for operations without an explicit agent.
    pub default_agent: String,
    /// Insert the starter doctrines during `DoctrineRegistry::new`.
    pub seed_on_init: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            default_agent: DEFAULT_AGENT.to_string(),
            seed_on_init: false,
        }
    }
}

impl RegistryConfig {
    pub fn seeded() -> Self {
        Self {
            seed_on_init: true,
            ..Self::default()
        }
    }

    pub fn with_default_agent(mut self, agent: impl Into<String>) -> Self {
        self.default_agent = agent.into();
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_agent.trim().is_empty() {
            return Err(ConfigError::EmptyDefaultAgent);
        }
        Ok(())
    }
}
