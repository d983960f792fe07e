//! In-memory repository, used for preview runs and tests.

use super::{container_body, NoteRepository};
use crate::error::{ImportError, Result};
use crate::types::{Label, NoteId};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// A note held by [`MemoryRepository`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemoryNote {
    pub id: NoteId,
    pub parent: NoteId,
    pub title: String,
    pub body: String,
    pub labels: Vec<Label>,
    /// (relation name, target)
    pub relations: Vec<(String, NoteId)>,
}

/// A write the repository performed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum RecordedOp {
    Create { id: NoteId, parent: NoteId, title: String },
    SetBody { id: NoteId },
    AddLabel { id: NoteId, label: Label },
    AddRelation { source: NoteId, target: NoteId, name: String },
}

/// Repository that keeps every note in memory.
///
/// Handles are allocated sequentially (`mem0001`, `mem0002`, ...), so two runs
/// over the same input produce the same handles. Parents that were never
/// created here (such as `root`) are accepted as given.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    notes: BTreeMap<NoteId, MemoryNote>,
    ops: Vec<RecordedOp>,
    next_id: usize,
    failing_titles: HashSet<String>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every write touching a note with this title fail.
    pub fn fail_on(&mut self, title: impl Into<String>) {
        self.failing_titles.insert(title.into());
    }

    pub fn note(&self, id: &NoteId) -> Option<&MemoryNote> {
        self.notes.get(id)
    }

    pub fn notes(&self) -> impl Iterator<Item = &MemoryNote> {
        self.notes.values()
    }

    /// Children of `parent` with the given title.
    pub fn children_named(&self, parent: &NoteId, title: &str) -> Vec<&MemoryNote> {
        self.notes
            .values()
            .filter(|n| &n.parent == parent && n.title == title)
            .collect()
    }

    /// Writes performed so far, in order.
    pub fn operations(&self) -> &[RecordedOp] {
        &self.ops
    }

    fn check(&self, title: &str) -> Result<()> {
        if self.failing_titles.contains(title) {
            return Err(ImportError::Api {
                status: 500,
                message: format!("injected failure for '{}'", title),
            });
        }
        Ok(())
    }

    fn note_mut(&mut self, id: &NoteId) -> Result<&mut MemoryNote> {
        let title = self
            .notes
            .get(id)
            .map(|n| n.title.clone())
            .ok_or_else(|| ImportError::Api {
                status: 404,
                message: format!("note '{}' not found", id),
            })?;
        self.check(&title)?;
        self.notes.get_mut(id).ok_or_else(|| ImportError::Other(id.to_string()))
    }

    fn child(&self, parent: &NoteId, title: &str) -> Option<NoteId> {
        self.notes
            .values()
            .find(|n| &n.parent == parent && n.title == title)
            .map(|n| n.id.clone())
    }

    fn create(&mut self, parent: &NoteId, title: &str, body: &str) -> NoteId {
        self.next_id += 1;
        let id = NoteId(format!("mem{:04}", self.next_id));
        self.notes.insert(
            id.clone(),
            MemoryNote {
                id: id.clone(),
                parent: parent.clone(),
                title: title.to_string(),
                body: body.to_string(),
                labels: Vec::new(),
                relations: Vec::new(),
            },
        );
        self.ops.push(RecordedOp::Create {
            id: id.clone(),
            parent: parent.clone(),
            title: title.to_string(),
        });
        id
    }
}

impl NoteRepository for MemoryRepository {
    fn find_or_create_container(&mut self, parent: &NoteId, name: &str) -> Result<NoteId> {
        self.check(name)?;
        if let Some(id) = self.child(parent, name) {
            return Ok(id);
        }
        Ok(self.create(parent, name, &container_body(name)))
    }

    fn find_or_create_document(
        &mut self,
        parent: &NoteId,
        name: &str,
        body: &str,
        labels: &[Label],
    ) -> Result<NoteId> {
        self.check(name)?;
        let id = match self.child(parent, name) {
            Some(id) => {
                self.set_body(&id, body)?;
                id
            }
            None => self.create(parent, name, body),
        };
        for label in labels {
            self.add_label(&id, label)?;
        }
        Ok(id)
    }

    fn find_child(&mut self, parent: &NoteId, name: &str) -> Result<Option<NoteId>> {
        self.check(name)?;
        Ok(self.child(parent, name))
    }

    fn find_by_name(&mut self, name: &str) -> Result<Option<NoteId>> {
        Ok(self
            .notes
            .values()
            .find(|n| n.title == name)
            .map(|n| n.id.clone()))
    }

    fn set_body(&mut self, note: &NoteId, body: &str) -> Result<()> {
        let stored = self.note_mut(note)?;
        if stored.body != body {
            stored.body = body.to_string();
            self.ops.push(RecordedOp::SetBody { id: note.clone() });
        }
        Ok(())
    }

    fn add_label(&mut self, note: &NoteId, label: &Label) -> Result<()> {
        let stored = self.note_mut(note)?;
        if !stored.labels.contains(label) {
            stored.labels.push(label.clone());
            self.ops.push(RecordedOp::AddLabel {
                id: note.clone(),
                label: label.clone(),
            });
        }
        Ok(())
    }

    fn add_relation(&mut self, source: &NoteId, target: &NoteId, relation: &str) -> Result<()> {
        if !self.notes.contains_key(target) {
            return Err(ImportError::Api {
                status: 404,
                message: format!("relation target '{}' not found", target),
            });
        }
        let stored = self.note_mut(source)?;
        let edge = (relation.to_string(), target.clone());
        if !stored.relations.contains(&edge) {
            stored.relations.push(edge);
            self.ops.push(RecordedOp::AddRelation {
                source: source.clone(),
                target: target.clone(),
                name: relation.to_string(),
            });
        }
        Ok(())
    }
}
