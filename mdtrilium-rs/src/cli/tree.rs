//! Tree command: list what an import would create.

use crate::cli::args::TreeArgs;
use crate::cli::output::Output;
use crate::config::Config;
use crate::error::Result;
use crate::tree::DocumentTree;
use crate::types::NodeKind;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Serialize)]
pub struct TreeOutput {
    pub root: PathBuf,
    pub containers: usize,
    pub documents: usize,
    pub entries: Vec<TreeEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct TreeEntry {
    pub path: PathBuf,
    pub name: String,
    pub kind: NodeKind,
    pub labels: usize,
    pub references: usize,
}

pub fn build_output(tree: &DocumentTree) -> TreeOutput {
    let entries: Vec<TreeEntry> = tree
        .nodes()
        .iter()
        .map(|node| TreeEntry {
            path: node.path.clone(),
            name: node.name.clone(),
            kind: node.kind(),
            labels: node.document.as_ref().map_or(0, |d| d.labels.len()),
            references: node.document.as_ref().map_or(0, |d| d.references.len()),
        })
        .collect();
    let documents = tree.document_count();

    TreeOutput {
        root: tree.root_path.clone(),
        containers: entries.len() - documents,
        documents,
        entries,
        skipped: tree.skipped().to_vec(),
    }
}

/// The indented listing followed by a document count.
pub fn render_text(tree: &DocumentTree) -> String {
    let mut text = tree.render();
    text.push_str(&format!("{} documents\n", tree.document_count()));
    for path in tree.skipped() {
        text.push_str(&format!("skipped {} (not UTF-8)\n", path.display()));
    }
    text
}

/// Print the tree as indented text, or serialized when `structured` is set.
pub fn run(config: &Config, args: &TreeArgs, output: &Output, structured: bool) -> Result<()> {
    let mut config = config.clone();
    config.import.include_hidden |= args.scan.include_hidden;
    config.import.exclude.extend(args.scan.exclude.iter().cloned());

    let tree = DocumentTree::scan(&args.source, &config.scan_options()?)?;

    if structured {
        return output.print(&build_output(&tree));
    }
    output.print_raw(&render_text(&tree));
    Ok(())
}
