//! Inspect command: the converted form of a single document.

use crate::cli::args::InspectArgs;
use crate::cli::output::Output;
use crate::config::Config;
use crate::convert::{convert_document, ConvertOptions};
use crate::error::{ImportError, Result};
use crate::types::{Label, WikiRef};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Output for the inspect command.
#[derive(Debug, Serialize)]
pub struct InspectOutput {
    pub path: PathBuf,
    pub title: String,
    pub labels: Vec<Label>,
    pub references: Vec<WikiRef>,
    /// Tag of the reference placeholders left in `body`.
    pub token_tag: String,
    /// Rendered body; reference placeholders are left in place.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

pub fn inspect_file(
    path: &Path,
    options: &ConvertOptions,
    with_body: bool,
) -> Result<InspectOutput> {
    if !path.is_file() {
        return Err(ImportError::SourceNotFound(path.to_path_buf()));
    }
    let raw = std::fs::read_to_string(path)?;
    let document = convert_document(&raw, &path.to_string_lossy(), options);
    let title = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(InspectOutput {
        path: path.to_path_buf(),
        title,
        labels: document.labels,
        references: document.references,
        token_tag: document.token_tag,
        body: with_body.then_some(document.body),
    })
}

pub fn run(config: &Config, args: &InspectArgs, output: &Output) -> Result<()> {
    let options = config.scan_options()?.convert;
    output.print(&inspect_file(&args.file, &options, !args.no_body)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::label::READ_ONLY;
    use tempfile::TempDir;

    #[test]
    fn test_inspect_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Plato.md");
        let source = "---\ntags: [philosophy]\n---\nTeacher of [[Aristotle|A.]]\n";
        std::fs::write(&path, source).unwrap();

        let out = inspect_file(&path, &ConvertOptions::default(), true).unwrap();
        assert_eq!(out.title, "Plato");
        assert_eq!(out.labels, vec![Label::flag("philosophy"), Label::flag(READ_ONLY)]);
        assert_eq!(out.references.len(), 1);
        assert_eq!(out.references[0].name, "Aristotle");
        assert_eq!(out.token_tag, "wikiref");
        assert!(out.body.unwrap().contains("⟦wikiref:0⟧"));
    }

    #[test]
    fn test_inspect_missing_file() {
        let options = ConvertOptions::default();
        let result = inspect_file(Path::new("/nonexistent/a.md"), &options, false);
        assert!(matches!(result, Err(ImportError::SourceNotFound(_))));
    }
}
