//! Shared types for mdtrilium.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a note in the target service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(pub String);

impl NoteId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A name/optional-value attribute attached to a note.
///
/// Several labels may share a name; they are kept as separate entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Label {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl Label {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
        }
    }

    /// A label without a value.
    pub fn flag(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }

    /// The value as sent to the service (empty string for flags).
    pub fn value_or_empty(&self) -> &str {
        self.value.as_deref().unwrap_or("")
    }
}

/// Renders the label in its source form (`name/value` or `name`).
impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            Some(ref value) => write!(f, "{}/{}", self.name, value),
            None => f.write_str(&self.name),
        }
    }
}

/// A `[[target]]` or `[[target|display]]` reference found in a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WikiRef {
    /// The target as written, including any path prefix.
    pub target: String,

    /// Resolution key: the final path segment, without a `#heading` suffix.
    pub name: String,

    /// Display text (the part after `|`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,

    /// Path prefix before the final segment (`a/b` in `[[a/b/c]]`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl WikiRef {
    /// Build a reference from the raw target and optional display text.
    ///
    /// Returns `None` when the target has no usable name.
    pub fn parse(target: &str, display: Option<&str>) -> Option<Self> {
        let target = target.trim();
        let (path, last) = match target.rfind('/') {
            Some(idx) => (Some(target[..idx].trim()), &target[idx + 1..]),
            None => (None, target),
        };
        let name = last.split('#').next().unwrap_or(last).trim();
        if name.is_empty() {
            return None;
        }

        Some(Self {
            target: target.to_string(),
            name: name.to_string(),
            display: display
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
            path: path.filter(|p| !p.is_empty()).map(str::to_string),
        })
    }

    /// Text shown for the rendered link.
    pub fn display_text(&self) -> &str {
        self.display.as_deref().unwrap_or(&self.target)
    }
}

/// Kind of node in the source tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Container,
    Document,
}
