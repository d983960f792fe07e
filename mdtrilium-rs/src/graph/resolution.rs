//! Name-keyed resolution of reference targets to notes.
//!
//! Resolution is by exact, case-sensitive match on the final segment of the
//! reference target. When several source nodes share a name, a document wins
//! over a folder, and otherwise the first one in tree order wins.

use crate::types::{NodeKind, NoteId};
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;

/// Where a resolved note came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Origin {
    /// A folder or document imported in this run.
    Source { path: PathBuf, node: NodeKind },
    /// A placeholder under the orphans folder.
    Placeholder,
    /// A note already in the service, found by title.
    Existing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub note: NoteId,
    pub origin: Origin,
}

/// Outcome of trying to register a source note under its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    Inserted,
    /// The name was already taken by a note that keeps it.
    Shadowed { kept: PathBuf },
    /// This note displaced a folder of the same name.
    Replaced { displaced: PathBuf },
}

/// Map from reference name to the note it resolves to.
#[derive(Debug, Default)]
pub struct NameIndex {
    entries: HashMap<String, Resolved>,
}

impl NameIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a folder or document imported in this run.
    pub fn register_source(
        &mut self,
        name: &str,
        note: NoteId,
        path: PathBuf,
        node: NodeKind,
    ) -> Registration {
        let resolved = Resolved {
            note,
            origin: Origin::Source { path, node },
        };

        let Some(current) = self.entries.get(name) else {
            self.entries.insert(name.to_string(), resolved);
            return Registration::Inserted;
        };

        match &current.origin {
            Origin::Source {
                path: kept,
                node: NodeKind::Container,
            } if node == NodeKind::Document => {
                let displaced = kept.clone();
                self.entries.insert(name.to_string(), resolved);
                Registration::Replaced { displaced }
            }
            Origin::Source { path: kept, .. } => Registration::Shadowed { kept: kept.clone() },
            _ => {
                self.entries.insert(name.to_string(), resolved);
                Registration::Inserted
            }
        }
    }

    /// Register a note synthesized or found for a name with no source match.
    pub fn register(&mut self, name: &str, note: NoteId, origin: Origin) {
        self.entries
            .entry(name.to_string())
            .or_insert(Resolved { note, origin });
    }

    pub fn resolve(&self, name: &str) -> Option<&Resolved> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> NoteId {
        NoteId::new(s)
    }

    #[test]
    fn test_first_document_wins() {
        let mut index = NameIndex::new();
        index.register_source("a", id("1"), "x/a.md".into(), NodeKind::Document);
        let outcome = index.register_source("a", id("2"), "y/a.md".into(), NodeKind::Document);
        assert_eq!(outcome, Registration::Shadowed { kept: "x/a.md".into() });
        assert_eq!(index.resolve("a").unwrap().note, id("1"));
    }

    #[test]
    fn test_document_beats_folder() {
        let mut index = NameIndex::new();
        index.register_source("Greece", id("dir"), "Greece".into(), NodeKind::Container);
        let outcome = index.register_source(
            "Greece",
            id("doc"),
            "Greece/Greece.md".into(),
            NodeKind::Document,
        );
        assert_eq!(outcome, Registration::Replaced { displaced: "Greece".into() });
        assert_eq!(index.resolve("Greece").unwrap().note, id("doc"));

        let outcome =
            index.register_source("Greece", id("dir2"), "b/Greece".into(), NodeKind::Container);
        assert!(matches!(outcome, Registration::Shadowed { .. }));
    }

    #[test]
    fn test_case_sensitive() {
        let mut index = NameIndex::new();
        index.register_source("Plato", id("1"), "Plato.md".into(), NodeKind::Document);
        assert!(index.resolve("plato").is_none());
        assert!(index.contains("Plato"));
    }

    #[test]
    fn test_placeholder_registered_once() {
        let mut index = NameIndex::new();
        index.register("missing", id("p1"), Origin::Placeholder);
        index.register("missing", id("p2"), Origin::Placeholder);
        assert_eq!(index.resolve("missing").unwrap().note, id("p1"));
        assert_eq!(index.len(), 1);
    }
}
