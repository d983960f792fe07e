//! Callout blocks (`> [!type] title`).
//!
//! A callout is a maximal run of `>`-prefixed lines whose first line carries a
//! `[!type]` marker. Type spellings are looked up case-insensitively in
//! [`ALIASES`]; unknown spellings fall back to [`CalloutKind::Note`].

use crate::parser::code_block::{find_code_ranges, is_in_fenced_block};
use crate::parser::token;
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;
use tracing::warn;

/// Canonical style category of a callout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CalloutKind {
    Note,
    Abstract,
    Info,
    Todo,
    Tip,
    Success,
    Question,
    Warning,
    Failure,
    Danger,
    Bug,
    Example,
    Quote,
}

impl CalloutKind {
    /// CSS class name used for styling lookup.
    pub fn as_str(self) -> &'static str {
        match self {
            CalloutKind::Note => "note",
            CalloutKind::Abstract => "abstract",
            CalloutKind::Info => "info",
            CalloutKind::Todo => "todo",
            CalloutKind::Tip => "tip",
            CalloutKind::Success => "success",
            CalloutKind::Question => "question",
            CalloutKind::Warning => "warning",
            CalloutKind::Failure => "failure",
            CalloutKind::Danger => "danger",
            CalloutKind::Bug => "bug",
            CalloutKind::Example => "example",
            CalloutKind::Quote => "quote",
        }
    }

    /// Title used when the marker line has none.
    pub fn default_title(self) -> String {
        let name = self.as_str();
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

/// Recognised type spellings and their canonical category.
pub static ALIASES: &[(&str, CalloutKind)] = &[
    ("note", CalloutKind::Note),
    ("abstract", CalloutKind::Abstract),
    ("summary", CalloutKind::Abstract),
    ("tldr", CalloutKind::Abstract),
    ("info", CalloutKind::Info),
    ("todo", CalloutKind::Todo),
    ("tip", CalloutKind::Tip),
    ("hint", CalloutKind::Tip),
    ("important", CalloutKind::Tip),
    ("success", CalloutKind::Success),
    ("check", CalloutKind::Success),
    ("done", CalloutKind::Success),
    ("question", CalloutKind::Question),
    ("help", CalloutKind::Question),
    ("faq", CalloutKind::Question),
    ("warning", CalloutKind::Warning),
    ("caution", CalloutKind::Warning),
    ("attention", CalloutKind::Warning),
    ("failure", CalloutKind::Failure),
    ("fail", CalloutKind::Failure),
    ("missing", CalloutKind::Failure),
    ("danger", CalloutKind::Danger),
    ("error", CalloutKind::Danger),
    ("bug", CalloutKind::Bug),
    ("example", CalloutKind::Example),
    ("quote", CalloutKind::Quote),
    ("cite", CalloutKind::Quote),
];

/// Look up a type spelling, case-insensitively.
pub fn canonicalize(spelling: &str) -> Option<CalloutKind> {
    let lower = spelling.to_lowercase();
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == lower)
        .map(|(_, kind)| *kind)
}

// > [!type] optional title, with an optional +/- fold marker after the type
static MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ {0,3}>\s*\[!([\w-]+)\][+-]?(.*)$").unwrap());

static QUOTE_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^ {0,3}>").unwrap());

/// One parsed callout block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Callout {
    pub kind: CalloutKind,
    /// Title text as written, or the category's default title.
    pub title: String,
    /// Inner Markdown with one level of `>` removed.
    pub content: String,
}

/// Base tag for callout block tokens.
pub const CALLOUT_TAG: &str = "callout";

/// A body with each callout block replaced by a block token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalloutSplit {
    pub body: String,
    /// Tag of the block tokens in `body`.
    pub tag: String,
    /// `callouts[i]` owns `block_token(&tag, i)`.
    pub callouts: Vec<Callout>,
}

/// Block token standing in for the callout at `index`.
pub fn block_token(tag: &str, index: usize) -> String {
    token::token(tag, index)
}

/// Find callout blocks and swap each for a standalone token paragraph, using
/// the first free block tag.
pub fn split_callouts(markdown: &str) -> CalloutSplit {
    let (tag, _) = token::free_tag(CALLOUT_TAG, markdown, 0);
    split_callouts_tagged(markdown, tag)
}

/// Split callouts using block tokens under `tag`.
///
/// Markers inside fenced code blocks are ignored.
pub fn split_callouts_tagged(markdown: &str, tag: String) -> CalloutSplit {
    let code_ranges = find_code_ranges(markdown);
    let lines: Vec<&str> = markdown.split_inclusive('\n').collect();
    let mut body = String::with_capacity(markdown.len());
    let mut callouts = Vec::new();
    let mut offset = 0;
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        let marker = if is_in_fenced_block(offset, &code_ranges) {
            None
        } else {
            MARKER.captures(line.trim_end_matches(['\n', '\r']))
        };

        let Some(cap) = marker else {
            body.push_str(line);
            offset += line.len();
            i += 1;
            continue;
        };

        let spelling = cap.get(1).map(|m| m.as_str()).unwrap_or("");
        let kind = canonicalize(spelling).unwrap_or_else(|| {
            warn!(callout = spelling, "unknown callout type, using note");
            CalloutKind::Note
        });
        let title = cap.get(2).map(|m| m.as_str().trim()).unwrap_or("");
        let title = if title.is_empty() {
            kind.default_title()
        } else {
            title.to_string()
        };

        offset += line.len();
        i += 1;

        let mut content_lines = Vec::new();
        while i < lines.len() && QUOTE_LINE.is_match(lines[i]) {
            content_lines.push(strip_quote(lines[i]));
            offset += lines[i].len();
            i += 1;
        }

        body.push('\n');
        body.push_str(&block_token(&tag, callouts.len()));
        body.push_str("\n\n");
        callouts.push(Callout {
            kind,
            title,
            content: content_lines.join("\n"),
        });
    }

    CalloutSplit {
        body,
        tag,
        callouts,
    }
}

/// Remove the leading `>` and at most one following space.
fn strip_quote(line: &str) -> &str {
    let line = line.trim_end_matches(['\n', '\r']).trim_start_matches(' ');
    let rest = line.strip_prefix('>').unwrap_or(line);
    rest.strip_prefix(' ').unwrap_or(rest)
}

/// Render a callout as an `aside` tagged with its category.
///
/// `title_html` and `content_html` must already be HTML.
pub fn render_callout(kind: CalloutKind, title_html: &str, content_html: &str) -> String {
    format!(
        "<aside class=\"admon {}\">\n<p class=\"admon-title\"><strong>{}</strong></p>\n{}\n</aside>\n",
        kind.as_str(),
        title_html,
        content_html.trim()
    )
}
