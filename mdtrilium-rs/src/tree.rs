//! Source directory scanning into a tree of folders and documents.

use crate::convert::{convert_document, ConvertOptions, Document};
use crate::error::{ImportError, Result};
use crate::types::NodeKind;
use glob::Pattern;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Index of a node within a [`DocumentTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// A folder or document in the source tree.
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub id: NodeId,
    /// Display name: the folder name, or the file name without extension.
    pub name: String,
    /// Path relative to the scanned root (empty for the root itself).
    pub path: PathBuf,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Converted content; `None` for containers.
    pub document: Option<Document>,
}

impl TreeNode {
    pub fn kind(&self) -> NodeKind {
        if self.document.is_some() {
            NodeKind::Document
        } else {
            NodeKind::Container
        }
    }
}

/// Options controlling which entries become part of the tree.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Recognised document extensions, compared case-insensitively.
    pub extensions: Vec<String>,
    pub include_hidden: bool,
    /// Patterns matched against paths relative to the root.
    pub exclude: Vec<Pattern>,
    pub convert: ConvertOptions,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            extensions: vec!["md".to_string()],
            include_hidden: false,
            exclude: Vec::new(),
            convert: ConvertOptions::default(),
        }
    }
}

impl ScanOptions {
    /// Compile exclude patterns from strings.
    pub fn with_excludes(mut self, patterns: &[String]) -> Result<Self> {
        for pattern in patterns {
            self.exclude.push(Pattern::new(pattern)?);
        }
        Ok(self)
    }

    fn is_document(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| self.extensions.iter().any(|x| x.eq_ignore_ascii_case(ext)))
            .unwrap_or(false)
    }

    fn is_excluded(&self, relative: &Path) -> bool {
        self.exclude.iter().any(|p| p.matches_path(relative))
    }
}

/// The scanned source tree. Nodes are stored parents-before-children.
#[derive(Debug, Clone)]
pub struct DocumentTree {
    /// Absolute path of the scanned directory.
    pub root_path: PathBuf,
    nodes: Vec<TreeNode>,
    skipped: Vec<PathBuf>,
}

impl DocumentTree {
    /// Scan a directory, reading and converting every recognised document.
    ///
    /// Fails before returning anything if the directory is unreadable or two
    /// entries in one folder map to the same display name. Documents that are
    /// not valid UTF-8 are logged and left out; see [`DocumentTree::skipped`].
    pub fn scan(root: impl AsRef<Path>, options: &ScanOptions) -> Result<Self> {
        let root = root.as_ref();
        if !root.exists() {
            return Err(ImportError::SourceNotFound(root.to_path_buf()));
        }
        if !root.is_dir() {
            return Err(ImportError::NotADirectory(root.to_path_buf()));
        }
        let root_path = root.canonicalize()?;

        let name = root_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| root_path.to_string_lossy().into_owned());

        let mut tree = Self {
            root_path: root_path.clone(),
            nodes: Vec::new(),
            skipped: Vec::new(),
        };
        let root_id = tree.push(name, PathBuf::new(), None, None);
        tree.scan_dir(&root_path, root_id, options)?;
        Ok(tree)
    }

    fn push(
        &mut self,
        name: String,
        path: PathBuf,
        parent: Option<NodeId>,
        document: Option<Document>,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(TreeNode {
            id,
            name,
            path,
            parent,
            children: Vec::new(),
            document,
        });
        if let Some(parent) = parent {
            self.nodes[parent.0].children.push(id);
        }
        id
    }

    fn scan_dir(&mut self, dir: &Path, parent: NodeId, options: &ScanOptions) -> Result<()> {
        let mut entries = std::fs::read_dir(dir)?.collect::<std::io::Result<Vec<_>>>()?;
        entries.sort_by_key(|e| e.file_name());

        let mut seen: HashSet<String> = HashSet::new();
        let parent_path = self.nodes[parent.0].path.clone();

        for entry in entries {
            let file_name = entry.file_name().to_string_lossy().into_owned();
            if !options.include_hidden && file_name.starts_with('.') {
                continue;
            }

            let path = entry.path();
            let relative = parent_path.join(&file_name);
            if options.is_excluded(&relative) {
                debug!(path = %relative.display(), "excluded");
                continue;
            }

            let file_type = entry.file_type()?;
            if file_type.is_symlink() {
                debug!(path = %relative.display(), "skipping symlink");
                continue;
            }

            let (name, document) = if file_type.is_dir() {
                (file_name, None)
            } else if file_type.is_file() && options.is_document(&path) {
                let Ok(raw) = String::from_utf8(std::fs::read(&path)?) else {
                    warn!(path = %relative.display(), "not valid UTF-8, skipping");
                    self.skipped.push(relative);
                    continue;
                };
                let source = relative.to_string_lossy();
                let document = convert_document(&raw, &source, &options.convert);
                let stem = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or(file_name);
                (stem, Some(document))
            } else {
                continue;
            };

            if !seen.insert(name.clone()) {
                return Err(ImportError::DuplicateName {
                    container: if parent_path.as_os_str().is_empty() {
                        PathBuf::from(".")
                    } else {
                        parent_path.clone()
                    },
                    name,
                });
            }

            let is_dir = document.is_none();
            let id = self.push(name, relative, Some(parent), document);
            if is_dir {
                self.scan_dir(&path, id, options)?;
            }
        }

        Ok(())
    }

    pub fn root(&self) -> &TreeNode {
        &self.nodes[0]
    }

    pub fn get(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id.0]
    }

    /// All nodes, parents before children.
    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    /// Document nodes in tree order.
    pub fn documents(&self) -> impl Iterator<Item = (&TreeNode, &Document)> {
        self.nodes
            .iter()
            .filter_map(|n| n.document.as_ref().map(|d| (n, d)))
    }

    /// Documents left out because they could not be decoded, in scan order.
    pub fn skipped(&self) -> &[PathBuf] {
        &self.skipped
    }

    pub fn document_count(&self) -> usize {
        self.documents().count()
    }

    /// Render the tree as indented text, one entry per line.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_node(self.root().id, 0, &mut out);
        out
    }

    fn render_node(&self, id: NodeId, depth: usize, out: &mut String) {
        let node = self.get(id);
        let marker = match node.kind() {
            NodeKind::Container => "[dir]",
            NodeKind::Document => "[doc]",
        };
        out.push_str(&"  ".repeat(depth));
        out.push_str(marker);
        out.push(' ');
        out.push_str(&node.name);
        out.push('\n');
        for child in &node.children {
            self.render_node(*child, depth + 1, out);
        }
    }
}
