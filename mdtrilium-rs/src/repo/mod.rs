//! The note repository boundary: every write to the target service goes
//! through [`NoteRepository`].

mod etapi;
mod memory;

pub use etapi::EtapiClient;
pub use memory::{MemoryNote, MemoryRepository, RecordedOp};

use crate::error::Result;
use crate::types::{Label, NoteId};

/// Operations the importer needs from the target service.
///
/// Creation is find-or-create keyed by (parent, title): implementations must
/// look for an existing child with that title before creating one. Label and
/// relation writes must not duplicate an identical attribute.
pub trait NoteRepository {
    /// Find or create a folder note named `name` under `parent`.
    fn find_or_create_container(&mut self, parent: &NoteId, name: &str) -> Result<NoteId>;

    /// Find or create a document note under `parent`.
    ///
    /// An existing note has its body replaced and missing labels added.
    fn find_or_create_document(
        &mut self,
        parent: &NoteId,
        name: &str,
        body: &str,
        labels: &[Label],
    ) -> Result<NoteId>;

    /// Look up a direct child of `parent` by title, without writing anything.
    fn find_child(&mut self, parent: &NoteId, name: &str) -> Result<Option<NoteId>>;

    /// Look up any note by title, anywhere in the service.
    fn find_by_name(&mut self, name: &str) -> Result<Option<NoteId>>;

    /// Replace a note's body.
    fn set_body(&mut self, note: &NoteId, body: &str) -> Result<()>;

    /// Attach a label unless an identical one is present.
    fn add_label(&mut self, note: &NoteId, label: &Label) -> Result<()>;

    /// Attach a relation unless an identical one is present.
    fn add_relation(&mut self, source: &NoteId, target: &NoteId, relation: &str) -> Result<()>;
}

/// Body for folder notes.
pub fn container_body(name: &str) -> String {
    format!(
        "<p>Notes from folder: {}</p>",
        crate::render::escape_html(name)
    )
}
