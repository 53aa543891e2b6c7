use std::fmt;

use serde::{Deserialize, Serialize};

/// Quote-like marks removed outright from address input: straight and curly double
/// quotes, straight and curly single quotes, and the Hebrew geresh/gershayim.
const STRIPPED_MARKS: [char; 8] = [
    '"', '\u{201C}', '\u{201D}', '\'', '\u{2018}', '\u{2019}', '\u{05F3}', '\u{05F4}',
];

/// "Street" is abbreviated as resh-het followed by a geresh, though keyboards often
/// produce a straight or curly apostrophe in its place.
const STREET_PREFIX: &str = "\u{05E8}\u{05D7}";
const ABBREVIATION_MARKS: [char; 4] = ['\'', '\u{2018}', '\u{2019}', '\u{05F3}'];
const STREET_EXPANSION: &str = "\u{05E8}\u{05D7}\u{05D5}\u{05D1}";

/// Canonical address string used as the unique building lookup key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedAddress(String);

impl NormalizedAddress {
    /// Normalize raw input, rejecting addresses that are empty once canonicalized.
    pub fn parse(raw: &str) -> Result<Self, AddressError> {
        let normalized = normalize_address(raw);
        if normalized.is_empty() {
            return Err(AddressError::Empty);
        }
        Ok(Self(normalized))
    }

    /// Wrap a key that was already canonicalized, e.g. when read back from storage.
    pub fn from_stored(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for NormalizedAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    #[error("address required")]
    Empty,
}

/// Canonicalize free-text address input.
///
/// The street abbreviation is expanded before marks are stripped, otherwise its geresh
/// (or the apostrophe typed instead) would already be gone. Whitespace is trimmed and collapsed last so that removing a
/// mark never leaves a double or dangling space behind, which keeps the function
/// idempotent.
pub fn normalize_address(raw: &str) -> String {
    let expanded = expand_street_abbreviation(raw);
    let stripped: String = expanded
        .chars()
        .filter(|ch| !STRIPPED_MARKS.contains(ch))
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn expand_street_abbreviation(raw: &str) -> String {
    let mut expanded = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(start) = rest.find(STREET_PREFIX) {
        let (head, tail) = rest.split_at(start);
        expanded.push_str(head);
        let after = &tail[STREET_PREFIX.len()..];
        match after.chars().next() {
            Some(mark) if ABBREVIATION_MARKS.contains(&mark) => {
                expanded.push_str(STREET_EXPANSION);
                rest = &after[mark.len_utf8()..];
            }
            _ => {
                expanded.push_str(STREET_PREFIX);
                rest = after;
            }
        }
    }
    expanded.push_str(rest);
    expanded
}
