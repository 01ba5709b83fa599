//! Structured identifier ("Barton number") codec.
//!
//! # Responsibility
//! - Parse and format the five-part dotted identifier.
//! - Own the `nested` band table that derives a doctrine `Category`.
//!
//! # Invariants
//! - `parse(format(x)) == x` for every valid identifier.
//! - `format(parse(t)) == t.trim()` for every text that parses.
//! - `category_of` is the only place that knows the band boundaries.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Largest `nested` value that maps to a category.
pub const MAX_NESTED: u64 = 49;
/// Width of one category band inside `nested`.
const BAND_WIDTH: u64 = 10;

// Leading zeros are rejected so that formatting a parsed value reproduces the input.
static IDENTIFIER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(0|[1-9][0-9]*)(\.(0|[1-9][0-9]*)){4}$").expect("valid identifier regex")
});

/// Fixed doctrine classification derived from the identifier `nested` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Tone,
    Structure,
    Process,
    Compliance,
    Messaging,
}

impl Category {
    /// All categories in band order.
    pub const ALL: [Category; 5] = [
        Category::Tone,
        Category::Structure,
        Category::Process,
        Category::Compliance,
        Category::Messaging,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tone => "tone",
            Self::Structure => "structure",
            Self::Process => "process",
            Self::Compliance => "compliance",
            Self::Messaging => "messaging",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "tone" => Some(Self::Tone),
            "structure" => Some(Self::Structure),
            "process" => Some(Self::Process),
            "compliance" => Some(Self::Compliance),
            "messaging" => Some(Self::Messaging),
            _ => None,
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier parse failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentifierError {
    /// Text is not exactly five dot-separated canonical decimal integers.
    Malformed(String),
    /// `nested` lies outside `[0, 49]`.
    NestedOutOfRange { text: String, nested: u64 },
}

impl Display for IdentifierError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(text) => write!(
                f,
                "identifier `{text}` must be five dot-separated non-negative integers"
            ),
            Self::NestedOutOfRange { text, nested } => write!(
                f,
                "identifier `{text}` has nested value {nested} outside 0..={MAX_NESTED}"
            ),
        }
    }
}

impl Error for IdentifierError {}

/// Five-part hierarchical doctrine identifier.
///
/// Field order matches the canonical text form `database.hq.sub.nested.index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StructuredIdentifier {
    /// Top-level domain, `1` or `2` by convention.
    pub database: u64,
    pub hq: u64,
    pub sub: u64,
    /// Band selector for the doctrine category, `0..=49`.
    pub nested: u64,
    pub index: u64,
}

impl StructuredIdentifier {
    pub fn new(database: u64, hq: u64, sub: u64, nested: u64, index: u64) -> Self {
        Self {
            database,
            hq,
            sub,
            nested,
            index,
        }
    }

    /// Returns whether this value satisfies the identifier validity rule.
    ///
    /// Values built through [`parse`] always do; values assembled by hand may not.
    pub fn is_valid(&self) -> bool {
        self.nested <= MAX_NESTED
    }

    /// Category derived from `nested`, or `None` when out of range.
    pub fn category(&self) -> Option<Category> {
        try_category_of(self.nested)
    }
}

impl Display for StructuredIdentifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}.{}",
            self.database, self.hq, self.sub, self.nested, self.index
        )
    }
}

impl FromStr for StructuredIdentifier {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

impl Serialize for StructuredIdentifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for StructuredIdentifier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        parse(&text).map_err(serde::de::Error::custom)
    }
}

/// Parses identifier text into its five integer parts.
///
/// Only whitespace at the boundaries is ignored.
///
/// # Errors
/// - `Malformed` when the text is not five canonical dotted integers or a
///   part overflows `u64`.
/// - `NestedOutOfRange` when the fourth part exceeds 49.
pub fn parse(text: &str) -> Result<StructuredIdentifier, IdentifierError> {
    let trimmed = text.trim();
    if !IDENTIFIER_RE.is_match(trimmed) {
        return Err(IdentifierError::Malformed(trimmed.to_string()));
    }

    let mut parts = [0_u64; 5];
    for (slot, part) in parts.iter_mut().zip(trimmed.split('.')) {
        *slot = part
            .parse::<u64>()
            .map_err(|_| IdentifierError::Malformed(trimmed.to_string()))?;
    }

    let [database, hq, sub, nested, index] = parts;
    if nested > MAX_NESTED {
        return Err(IdentifierError::NestedOutOfRange {
            text: trimmed.to_string(),
            nested,
        });
    }

    Ok(StructuredIdentifier::new(database, hq, sub, nested, index))
}

/// Formats an identifier in canonical dotted form.
pub fn format(identifier: &StructuredIdentifier) -> String {
    identifier.to_string()
}

/// Returns whether `text` parses as a valid identifier.
pub fn is_valid(text: &str) -> bool {
    parse(text).is_ok()
}

/// Maps a `nested` value to its category band.
///
/// # Panics
/// Panics when `nested > 49`. Callers must validate the identifier first;
/// reaching this with an out-of-range value is a contract violation.
pub fn category_of(nested: u64) -> Category {
    match try_category_of(nested) {
        Some(category) => category,
        None => panic!("category_of called with nested value {nested} outside 0..={MAX_NESTED}"),
    }
}

/// Non-panicking variant of [`category_of`].
pub fn try_category_of(nested: u64) -> Option<Category> {
    if nested > MAX_NESTED {
        return None;
    }
    let band = usize::try_from(nested / BAND_WIDTH).ok()?;
    Category::ALL.get(band).copied()
}

#[cfg(test)]
mod tests {
    use super::{category_of, format, parse, try_category_of, Category, IdentifierError};

    #[test]
    fn parse_accepts_canonical_text_and_trims_boundaries() {
        let id = parse("  1.1.1.20.1\n").expect("identifier should parse");
        assert_eq!(id.database, 1);
        assert_eq!(id.nested, 20);
        assert_eq!(format(&id), "1.1.1.20.1");
    }

    #[test]
    fn parse_rejects_leading_zeros_and_inner_whitespace() {
        for text in ["01.1.1.1.1", "1.1.1.05.1", "1. 1.1.1.1", "1.1.1.1.1."] {
            assert!(
                matches!(parse(text), Err(IdentifierError::Malformed(_))),
                "`{text}` should be malformed"
            );
        }
    }

    #[test]
    fn parse_rejects_overflowing_part() {
        let err = parse("1.99999999999999999999.1.1.1").unwrap_err();
        assert!(matches!(err, IdentifierError::Malformed(_)));
    }

    #[test]
    fn band_boundaries_map_to_expected_categories() {
        assert_eq!(category_of(0), Category::Tone);
        assert_eq!(category_of(9), Category::Tone);
        assert_eq!(category_of(10), Category::Structure);
        assert_eq!(category_of(29), Category::Process);
        assert_eq!(category_of(30), Category::Compliance);
        assert_eq!(category_of(49), Category::Messaging);
        assert_eq!(try_category_of(50), None);
    }

    #[test]
    #[should_panic(expected = "outside 0..=49")]
    fn category_of_panics_out_of_range() {
        category_of(50);
    }
}
