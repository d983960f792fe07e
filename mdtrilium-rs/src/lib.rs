//! mdtrilium - import a directory of Markdown notes into a Trilium instance.
//!
//! # Overview
//!
//! A source directory becomes a note tree under a chosen parent note:
//! - Folders become read-only container notes
//! - Markdown files become HTML notes, with frontmatter tags turned into labels
//! - Obsidian callouts become styled `<aside>` blocks
//! - `[[wiki links]]` become reference links, with placeholder notes created
//!   under an `Orphans` folder for targets that don't exist
//!
//! # Example
//!
//! ```no_run
//! use mdtrilium::{DocumentTree, Importer, ImportOptions, MemoryRepository, NoteId, ScanOptions};
//!
//! let tree = DocumentTree::scan("/path/to/notes", &ScanOptions::default()).unwrap();
//! let mut repo = MemoryRepository::new();
//! let report = Importer::new(&mut repo, NoteId::new("root"), ImportOptions::default()).run(&tree);
//! println!("{} notes, {} placeholders", report.summary.notes, report.summary.placeholders);
//! ```

pub mod cli;
pub mod config;
pub mod convert;
pub mod error;
pub mod graph;
pub mod parser;
pub mod render;
pub mod repo;
pub mod tree;
pub mod types;

// Re-export main types at crate root
pub use config::Config;
pub use convert::{convert_document, ConvertOptions, Document};
pub use error::{ImportError, Result};
pub use graph::{ImportOptions, ImportReport, Importer};
pub use repo::{EtapiClient, MemoryRepository, NoteRepository};
pub use tree::{DocumentTree, ScanOptions};
pub use types::*;
