//! Import command.

use crate::cli::args::ImportArgs;
use crate::cli::output::Output;
use crate::config::Config;
use crate::error::{ExitCode, Result};
use crate::graph::{ImportReport, Importer};
use crate::repo::{EtapiClient, MemoryNote, MemoryRepository};
use crate::tree::DocumentTree;
use crate::types::NoteId;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};

/// Shown when a preview is asked to link existing notes.
pub const PREVIEW_LINK_EXISTING: &str = "--link-existing is not checked in preview: \
     the preview service holds only this run's notes, so names that would match \
     an existing note appear as placeholders";

#[derive(Debug, Serialize)]
pub struct ImportOutput {
    pub source: PathBuf,
    pub parent: NoteId,
    pub preview: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    /// Documents left out of the scan.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<PathBuf>,
    /// Writes the preview repository recorded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operations: Option<usize>,
    /// Every note the preview would leave behind, bodies included.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<Vec<MemoryNote>>,
    pub report: ImportReport,
}

/// Caveats about what a run with this config can show.
pub fn run_warnings(config: &Config, preview: bool) -> Vec<String> {
    let mut warnings = Vec::new();
    if preview && config.import.link_existing {
        warnings.push(PREVIEW_LINK_EXISTING.to_string());
    }
    warnings
}

/// Apply command-line overrides on top of the loaded config.
pub fn apply_args(config: &Config, args: &ImportArgs) -> Config {
    let mut config = config.clone();
    if let Some(server) = &args.server {
        config.server = Some(server.clone());
    }
    if let Some(token) = &args.token {
        config.token = Some(token.clone());
    }
    if let Some(parent) = &args.parent {
        config.parent = Some(parent.clone());
    }
    config.import.include_hidden |= args.scan.include_hidden;
    config.import.link_existing |= args.link_existing;
    config.import.exclude.extend(args.scan.exclude.iter().cloned());
    config
}

pub fn run(config: &Config, args: &ImportArgs, output: &Output) -> Result<ExitCode> {
    let config = apply_args(config, args);

    let tree = DocumentTree::scan(&args.source, &config.scan_options()?)?;
    info!(
        source = %tree.root_path.display(),
        nodes = tree.nodes().len(),
        documents = tree.document_count(),
        "scanned source"
    );

    let parent = config.parent_note();
    let options = config.import_options();
    let warnings = run_warnings(&config, args.preview);
    for warning in &warnings {
        warn!("{}", warning);
    }

    let (report, operations, notes) = if args.preview {
        let mut repo = MemoryRepository::new();
        let report = Importer::new(&mut repo, parent.clone(), options).run(&tree);
        let notes = repo.notes().cloned().collect();
        (report, Some(repo.operations().len()), Some(notes))
    } else {
        let mut client = EtapiClient::new(config.server_url(), config.require_token()?)?;
        let report = Importer::new(&mut client, parent.clone(), options).run(&tree);
        (report, None, None)
    };

    let code = if report.is_complete() {
        ExitCode::Success
    } else {
        ExitCode::PartialFailure
    };

    output.print(&ImportOutput {
        source: tree.root_path.clone(),
        parent,
        preview: args.preview,
        warnings,
        skipped: tree.skipped().to_vec(),
        operations,
        notes,
        report,
    })?;

    Ok(code)
}
