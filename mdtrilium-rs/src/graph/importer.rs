//! Tree import and reference resolution.
//!
//! A run has three global phases over the scanned tree:
//!
//! 1. **Materialize**: find-or-create a note for every folder and document,
//!    parents first. Document bodies still carry reference placeholders.
//! 2. **Placeholders**: resolve every reference name against the notes from
//!    phase 1. Names with no match get one placeholder note each, under the
//!    orphans folder (created on first need, then reused).
//! 3. **Rewrite**: swap each placeholder for a link to its resolved note,
//!    write the body back, and add one relation per distinct target.
//!
//! Every write is find-or-create or idempotent, so re-running against a
//! service that already holds a previous import creates nothing new.
//! Repository failures are recorded in the [`ImportReport`]; they stop the
//! affected document but never the run.

use crate::error::{ImportError, Result};
use crate::graph::resolution::{NameIndex, Origin, Registration};
use crate::parser::label::READ_ONLY;
use crate::parser::wikilink::replace_placeholders;
use crate::render::escape_html;
use crate::repo::NoteRepository;
use crate::tree::{DocumentTree, NodeId, TreeNode};
use crate::types::{Label, NodeKind, NoteId};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Body given to placeholder notes.
pub const PLACEHOLDER_BODY: &str =
    "<p><em>This note was automatically created as a placeholder for a wiki link reference.</em></p>";

/// Options for an import run.
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Relation name recorded for each reference.
    pub relation_name: String,
    /// Title of the folder that holds placeholder notes.
    pub orphans_title: String,
    /// Look unmatched names up across the whole service before creating a
    /// placeholder.
    pub link_existing: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            relation_name: "references".to_string(),
            orphans_title: "Orphans".to_string(),
            link_existing: false,
        }
    }
}

/// Phase in which a failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    Orphans,
    Materialize,
    Placeholders,
    Rewrite,
}

/// A repository failure, with enough context to retry the affected document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportFailure {
    pub path: PathBuf,
    pub phase: Phase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportedNote {
    pub path: PathBuf,
    pub title: String,
    pub kind: NodeKind,
    pub note_id: NoteId,
    pub labels: usize,
    pub references: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaceholderNote {
    pub name: String,
    pub note_id: NoteId,
    /// Documents referencing this name, in tree order.
    pub referenced_by: Vec<PathBuf>,
}

/// How a single reference was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkResolution {
    Source,
    Placeholder,
    Existing,
    Unresolved,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkRecord {
    pub source: PathBuf,
    pub target: String,
    pub resolution: LinkResolution,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note_id: Option<NoteId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub notes: usize,
    pub placeholders: usize,
    pub links: usize,
    pub unresolved: usize,
    pub failures: usize,
}

/// Outcome of an import run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub summary: ImportSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orphans: Option<NoteId>,
    pub notes: Vec<ImportedNote>,
    pub placeholders: Vec<PlaceholderNote>,
    pub links: Vec<LinkRecord>,
    pub failures: Vec<ImportFailure>,
}

impl ImportReport {
    /// True when no failure was recorded.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    fn summarize(&mut self) {
        self.summary = ImportSummary {
            notes: self.notes.len(),
            placeholders: self.placeholders.len(),
            links: self.links.len(),
            unresolved: self
                .links
                .iter()
                .filter(|l| l.resolution == LinkResolution::Unresolved)
                .count(),
            failures: self.failures.len(),
        };
    }
}

/// Markup for a resolved reference.
pub fn reference_link(note: &NoteId, display: &str) -> String {
    format!(
        "<a class=\"reference-link\" href=\"#root/{}\">{}</a>",
        note,
        escape_html(display)
    )
}

/// Markup for a reference whose target could not be created.
pub fn unresolved_link(display: &str) -> String {
    format!(
        "<span class=\"reference-unresolved\" title=\"Note not found\">{}</span>",
        escape_html(display)
    )
}

/// Drives one import run against a repository.
pub struct Importer<'r, R: NoteRepository> {
    repo: &'r mut R,
    options: ImportOptions,
    destination: NoteId,
    /// Memoized orphans folder; `Err` holds the message of a failed attempt.
    orphans: Option<std::result::Result<NoteId, String>>,
    index: NameIndex,
    handles: HashMap<NodeId, NoteId>,
    /// Names whose only candidate notes failed to materialize.
    unavailable: HashSet<String>,
    placeholder_pos: HashMap<String, usize>,
    report: ImportReport,
}

impl<'r, R: NoteRepository> Importer<'r, R> {
    /// Create an importer that places the tree under `destination`.
    pub fn new(repo: &'r mut R, destination: NoteId, options: ImportOptions) -> Self {
        Self {
            repo,
            options,
            destination,
            orphans: None,
            index: NameIndex::new(),
            handles: HashMap::new(),
            unavailable: HashSet::new(),
            placeholder_pos: HashMap::new(),
            report: ImportReport::default(),
        }
    }

    /// Run all phases over `tree` and return the report.
    pub fn run(mut self, tree: &DocumentTree) -> ImportReport {
        info!(nodes = tree.nodes().len(), destination = %self.destination, "materializing notes");
        self.materialize(tree);

        info!(names = self.index.len(), "resolving references");
        self.synthesize_placeholders(tree);

        info!("rewriting links");
        self.rewrite(tree);

        self.report.summarize();
        info!(
            notes = self.report.summary.notes,
            placeholders = self.report.summary.placeholders,
            links = self.report.summary.links,
            failures = self.report.summary.failures,
            "import finished"
        );
        self.report
    }

    fn fail(&mut self, path: PathBuf, phase: Phase, target: Option<&str>, err: &ImportError) {
        warn!(
            path = %path.display(),
            ?phase,
            reference = ?target,
            error = %err,
            "import step failed"
        );
        self.report.failures.push(ImportFailure {
            path,
            phase,
            target: target.map(str::to_string),
            message: err.to_string(),
        });
    }

    // ── Phase 1 ─────────────────────────────────────

    fn materialize(&mut self, tree: &DocumentTree) {
        for node in tree.nodes() {
            let parent = match node.parent {
                None => self.destination.clone(),
                Some(parent) => match self.handles.get(&parent) {
                    Some(handle) => handle.clone(),
                    None => {
                        let err = ImportError::Other("parent folder was not imported".to_string());
                        self.fail(node.path.clone(), Phase::Materialize, None, &err);
                        self.unavailable.insert(node.name.clone());
                        continue;
                    }
                },
            };

            match self.create_node(&parent, node) {
                Ok(note) => self.register_node(node, note),
                Err(err) => {
                    self.fail(node.path.clone(), Phase::Materialize, None, &err);
                    self.unavailable.insert(node.name.clone());
                }
            }
        }
    }

    fn create_node(&mut self, parent: &NoteId, node: &TreeNode) -> Result<NoteId> {
        match &node.document {
            Some(doc) => self
                .repo
                .find_or_create_document(parent, &node.name, &doc.body, &doc.labels),
            None => {
                let note = self.repo.find_or_create_container(parent, &node.name)?;
                self.repo.add_label(&note, &Label::flag(READ_ONLY))?;
                Ok(note)
            }
        }
    }

    fn register_node(&mut self, node: &TreeNode, note: NoteId) {
        debug!(path = %node.path.display(), note = %note, "materialized");
        self.handles.insert(node.id, note.clone());

        match self
            .index
            .register_source(&node.name, note.clone(), node.path.clone(), node.kind())
        {
            Registration::Inserted => {}
            Registration::Shadowed { kept } => warn!(
                name = %node.name,
                kept = %kept.display(),
                ignored = %node.path.display(),
                "duplicate note name, references resolve to the first"
            ),
            Registration::Replaced { displaced } => debug!(
                name = %node.name,
                folder = %displaced.display(),
                "document takes the name over its folder"
            ),
        }

        let (labels, references) = node
            .document
            .as_ref()
            .map(|d| (d.labels.len(), d.references.len()))
            .unwrap_or((1, 0));
        self.report.notes.push(ImportedNote {
            path: node.path.clone(),
            title: node.name.clone(),
            kind: node.kind(),
            note_id: note,
            labels,
            references,
        });
    }

    // ── Phase 2 ─────────────────────────────────────

    fn synthesize_placeholders(&mut self, tree: &DocumentTree) {
        for (node, doc) in tree.documents() {
            if !self.handles.contains_key(&node.id) {
                continue;
            }

            for reference in &doc.references {
                let name = reference.name.as_str();
                if !self.index.contains(name) && !self.unavailable.contains(name) {
                    match self.find_or_create_target(name) {
                        Ok((note, origin)) => self.index.register(name, note, origin),
                        Err(err) => {
                            self.fail(node.path.clone(), Phase::Placeholders, Some(name), &err);
                            self.unavailable.insert(name.to_string());
                        }
                    }
                }

                if let Some(resolved) = self.index.resolve(name) {
                    if resolved.origin == Origin::Placeholder {
                        let note = resolved.note.clone();
                        self.note_placeholder_referrer(name, note, &node.path);
                    }
                }
            }
        }
    }

    fn find_or_create_target(&mut self, name: &str) -> Result<(NoteId, Origin)> {
        if self.options.link_existing {
            if let Some(note) = self.repo.find_by_name(name)? {
                debug!(name, note = %note, "linked to existing note");
                return Ok((note, Origin::Existing));
            }
        }

        let orphans = self.ensure_orphans()?;
        // an existing placeholder keeps whatever body it has now
        if let Some(note) = self.repo.find_child(&orphans, name)? {
            debug!(name, note = %note, "reusing placeholder note");
            return Ok((note, Origin::Placeholder));
        }
        let note = self.repo.find_or_create_document(
            &orphans,
            name,
            PLACEHOLDER_BODY,
            &[Label::flag(READ_ONLY)],
        )?;
        info!(name, note = %note, "placeholder note ready");
        Ok((note, Origin::Placeholder))
    }

    /// Find or create the orphans folder once per run.
    fn ensure_orphans(&mut self) -> Result<NoteId> {
        match &self.orphans {
            Some(Ok(note)) => return Ok(note.clone()),
            Some(Err(message)) => {
                return Err(ImportError::Other(format!(
                    "orphans folder unavailable: {}",
                    message
                )));
            }
            None => {}
        }

        let title = self.options.orphans_title.clone();
        let result = self
            .repo
            .find_or_create_container(&self.destination, &title)
            .and_then(|note| {
                self.repo.add_label(&note, &Label::flag(READ_ONLY))?;
                Ok(note)
            });

        match result {
            Ok(note) => {
                info!(note = %note, "orphans folder ready");
                self.report.orphans = Some(note.clone());
                self.orphans = Some(Ok(note.clone()));
                Ok(note)
            }
            Err(err) => {
                self.fail(PathBuf::from(&title), Phase::Orphans, None, &err);
                self.orphans = Some(Err(err.to_string()));
                Err(err)
            }
        }
    }

    fn note_placeholder_referrer(&mut self, name: &str, note: NoteId, referrer: &Path) {
        let pos = match self.placeholder_pos.get(name) {
            Some(pos) => *pos,
            None => {
                self.report.placeholders.push(PlaceholderNote {
                    name: name.to_string(),
                    note_id: note,
                    referenced_by: Vec::new(),
                });
                let pos = self.report.placeholders.len() - 1;
                self.placeholder_pos.insert(name.to_string(), pos);
                pos
            }
        };
        let referrers = &mut self.report.placeholders[pos].referenced_by;
        if !referrers.iter().any(|p| p == referrer) {
            referrers.push(referrer.to_path_buf());
        }
    }

    // ── Phase 3 ─────────────────────────────────────

    fn rewrite(&mut self, tree: &DocumentTree) {
        for (node, doc) in tree.documents() {
            let Some(source) = self.handles.get(&node.id).cloned() else {
                continue;
            };
            if doc.references.is_empty() {
                continue;
            }

            let mut markup = Vec::with_capacity(doc.references.len());
            let mut targets: Vec<(String, NoteId)> = Vec::new();

            for reference in &doc.references {
                let display = reference.display_text();
                let (resolution, note) = match self.index.resolve(&reference.name) {
                    Some(resolved) => {
                        let resolution = match resolved.origin {
                            Origin::Source { .. } => LinkResolution::Source,
                            Origin::Placeholder => LinkResolution::Placeholder,
                            Origin::Existing => LinkResolution::Existing,
                        };
                        (resolution, Some(resolved.note.clone()))
                    }
                    None => (LinkResolution::Unresolved, None),
                };

                match note {
                    Some(ref note) => {
                        markup.push(reference_link(note, display));
                        if !targets.iter().any(|(_, t)| t == note) {
                            targets.push((reference.name.clone(), note.clone()));
                        }
                    }
                    None => markup.push(unresolved_link(display)),
                }

                self.report.links.push(LinkRecord {
                    source: node.path.clone(),
                    target: reference.target.clone(),
                    resolution,
                    note_id: note,
                });
            }

            let body = replace_placeholders(&doc.body, &doc.token_tag, |i| markup.get(i).cloned());

            if let Err((target, err)) = self.write_links(&source, &body, &targets) {
                self.fail(node.path.clone(), Phase::Rewrite, target.as_deref(), &err);
            }
        }
    }

    fn write_links(
        &mut self,
        source: &NoteId,
        body: &str,
        targets: &[(String, NoteId)],
    ) -> std::result::Result<(), (Option<String>, ImportError)> {
        self.repo.set_body(source, body).map_err(|e| (None, e))?;
        for (name, target) in targets {
            self.repo
                .add_relation(source, target, &self.options.relation_name)
                .map_err(|e| (Some(name.clone()), e))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::MemoryRepository;

    #[test]
    fn test_reference_link_escapes_display() {
        assert_eq!(
            reference_link(&NoteId::new("abc"), "a <b>"),
            "<a class=\"reference-link\" href=\"#root/abc\">a &lt;b&gt;</a>"
        );
    }

    #[test]
    fn test_orphans_memoized() {
        let mut repo = MemoryRepository::new();
        let mut importer = Importer::new(&mut repo, NoteId::new("root"), ImportOptions::default());
        let first = importer.ensure_orphans().unwrap();
        let second = importer.ensure_orphans().unwrap();
        assert_eq!(first, second);
        drop(importer);
        assert_eq!(repo.children_named(&NoteId::new("root"), "Orphans").len(), 1);
    }

    #[test]
    fn test_orphans_failure_memoized() {
        let mut repo = MemoryRepository::new();
        repo.fail_on("Orphans");
        let mut importer = Importer::new(&mut repo, NoteId::new("root"), ImportOptions::default());
        assert!(importer.ensure_orphans().is_err());
        assert!(importer.ensure_orphans().is_err());
        assert_eq!(importer.report.failures.len(), 1);
        assert_eq!(importer.report.failures[0].phase, Phase::Orphans);
    }
}
