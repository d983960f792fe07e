//! Reference resolution and the three-phase import.

pub mod importer;
pub mod resolution;

pub use importer::{
    ImportFailure, ImportOptions, ImportReport, ImportSummary, ImportedNote, Importer,
    LinkRecord, LinkResolution, Phase, PlaceholderNote,
};
pub use resolution::{NameIndex, Origin, Registration, Resolved};
