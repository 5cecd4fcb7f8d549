use serde::{Deserialize, Serialize};
use std::fmt;

/// Catalog manager's internal handle for a tag.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct TagId(pub u32);

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Catalog manager's internal identifier for a movie or series.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct CatalogId(pub u64);

impl fmt::Display for CatalogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A user-chosen label.
///
/// Labels are case-insensitive. They are written to the media server and
/// reported in their capitalized form ("kids" -> "Kids") and compared by
/// their lowercase key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Label {
    display: String,
    key: String,
}

impl Label {
    pub fn new(raw: &str) -> Self {
        let raw = raw.trim();
        Self {
            display: capitalize(raw),
            key: raw.to_lowercase(),
        }
    }

    /// Capitalized form, as written to the media server
    pub fn display(&self) -> &str {
        &self.display
    }

    /// Lowercase comparison key
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl From<String> for Label {
    fn from(raw: String) -> Self {
        Label::new(&raw)
    }
}

impl From<&str> for Label {
    fn from(raw: &str) -> Self {
        Label::new(raw)
    }
}

impl From<Label> for String {
    fn from(label: Label) -> Self {
        label.display
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display)
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
