//! Per-document conversion: frontmatter labels, references and rendered body.

use crate::parser::frontmatter::{parse_frontmatter, split_frontmatter};
use crate::parser::label::{extract_labels, DEFAULT_LABEL_KEYS};
use crate::parser::token::{free_tag, tokens_unique};
use crate::parser::wikilink::{extract_references_tagged, REFERENCE_TAG};
use crate::render::{render_markdown, MAX_TAG_ATTEMPTS};
use crate::types::{Label, WikiRef};
use serde::Serialize;
use tracing::warn;

/// Options for converting a single document.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Frontmatter keys read as label sources.
    pub label_keys: Vec<String>,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            label_keys: DEFAULT_LABEL_KEYS.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// A converted document, ready for import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    pub labels: Vec<Label>,
    /// References in order; `references[i]` owns placeholder `i` in `body`.
    pub references: Vec<WikiRef>,
    /// Tag of the placeholders in `body`.
    pub token_tag: String,
    /// HTML body with reference placeholders still in place.
    pub body: String,
}

/// Convert raw Markdown source into a [`Document`].
///
/// `source` names the document in log messages.
pub fn convert_document(raw: &str, source: &str, options: &ConvertOptions) -> Document {
    let split = split_frontmatter(raw);
    let frontmatter = split.yaml.and_then(|yaml| parse_frontmatter(yaml, source));
    let labels = extract_labels(frontmatter.as_ref(), &options.label_keys);

    let mut start = 0;
    for attempt in 1..=MAX_TAG_ATTEMPTS {
        let (tag, k) = free_tag(REFERENCE_TAG, split.body, start);
        let extracted = extract_references_tagged(split.body, tag);
        let body = render_markdown(&extracted.body);
        let unique = tokens_unique(&extracted.tag, &body, extracted.references.len());
        if unique || attempt == MAX_TAG_ATTEMPTS {
            if !unique {
                warn!(source, tag = %extracted.tag, "reference placeholders still ambiguous");
            }
            return Document {
                labels,
                references: extracted.references,
                token_tag: extracted.tag,
                body,
            };
        }
        start = k + 1;
    }

    Document {
        labels,
        references: Vec::new(),
        token_tag: REFERENCE_TAG.to_string(),
        body: render_markdown(split.body),
    }
}
