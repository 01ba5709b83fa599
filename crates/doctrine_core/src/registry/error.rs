use crate::config::ConfigError;
use crate::model::identifier::{Category, IdentifierError};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RegistryResult<T> = Result<T, RegistryError>;

/// Validation failure raised by registry operations.
///
/// Display output always carries the offending identifier text verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    InvalidIdentifier {
        text: String,
        source: IdentifierError,
    },
    CategoryMismatch {
        identifier: String,
        expected: Category,
        declared: Category,
    },
    DuplicateIdentifier(String),
    NotFound(String),
    /// A required attribution field was blank.
    EmptyField {
        identifier: String,
        field: &'static str,
    },
    /// Restored data breaks a registry invariant.
    CorruptRecord {
        identifier: String,
        reason: String,
    },
    InvalidConfig(ConfigError),
}

impl RegistryError {
    /// Stable machine-readable code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidIdentifier { .. } => "invalid_identifier",
            Self::CategoryMismatch { .. } => "category_mismatch",
            Self::DuplicateIdentifier(_) => "duplicate_identifier",
            Self::NotFound(_) => "not_found",
            Self::EmptyField { .. } => "empty_field",
            Self::CorruptRecord { .. } => "corrupt_record",
            Self::InvalidConfig(_) => "invalid_config",
        }
    }
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidIdentifier { text, source } => {
                write!(f, "invalid identifier `{text}`: {source}")
            }
            Self::CategoryMismatch {
                identifier,
                expected,
                declared,
            } => write!(
                f,
                "category mismatch for `{identifier}`: expected `{expected}`, got `{declared}`"
            ),
            Self::DuplicateIdentifier(identifier) => {
                write!(f, "doctrine already exists: {identifier}")
            }
            Self::NotFound(identifier) => write!(f, "doctrine not found: {identifier}"),
            Self::EmptyField { identifier, field } => {
                write!(f, "doctrine `{identifier}` requires non-empty {field}")
            }
            Self::CorruptRecord { identifier, reason } => {
                write!(f, "corrupt doctrine record `{identifier}`: {reason}")
            }
            Self::InvalidConfig(err) => write!(f, "invalid registry config: {err}"),
        }
    }
}

impl Error for RegistryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidIdentifier { source, .. } => Some(source),
            Self::InvalidConfig(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ConfigError> for RegistryError {
    fn from(value: ConfigError) -> Self {
        Self::InvalidConfig(value)
    }
}
