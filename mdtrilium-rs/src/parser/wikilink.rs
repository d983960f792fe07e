//! Wikilink extraction and placeholder substitution.
//!
//! Every `[[target]]` or `[[target|display]]` outside code is replaced by a
//! placeholder token that carries the reference's index. The tokens pass
//! through the Markdown renderer untouched and are swapped for real links once
//! every target has a note. Tokens are `⟦wikiref:N⟧` unless the body already
//! contains that text, in which case a numbered tag is used (see
//! [`crate::parser::token`]).

use crate::parser::code_block::{find_code_ranges, is_in_code};
use crate::parser::token;
use crate::types::WikiRef;
use regex::Regex;
use std::sync::LazyLock;

// [[target]] or [[target|display]]; neither part may contain brackets
static WIKILINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[([^\[\]\|]*)(?:\|([^\[\]]*))?\]\]").unwrap());

/// Base tag for reference placeholders.
pub const REFERENCE_TAG: &str = "wikiref";

/// Placeholder token for the reference at `index` under `tag`.
pub fn placeholder(tag: &str, index: usize) -> String {
    token::token(tag, index)
}

/// A body with its references swapped out for placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedLinks {
    /// The body with one placeholder per reference, in order.
    pub body: String,
    /// Tag shared by this body's placeholders.
    pub tag: String,
    /// References in order of appearance; `references[i]` owns placeholder `i`.
    pub references: Vec<WikiRef>,
}

/// Extract all references from content, left to right, under the first free
/// placeholder tag.
///
/// Empty targets (`[[]]`), unterminated `[[` and links inside code are left
/// verbatim.
pub fn extract_references(content: &str) -> ExtractedLinks {
    let (tag, _) = token::free_tag(REFERENCE_TAG, content, 0);
    extract_references_tagged(content, tag)
}

/// Extract references using placeholders under `tag`.
///
/// `tag` must not already occur in `content`; see [`token::free_tag`].
pub fn extract_references_tagged(content: &str, tag: String) -> ExtractedLinks {
    let code_ranges = find_code_ranges(content);
    let mut body = String::with_capacity(content.len());
    let mut references = Vec::new();
    let mut last = 0;

    for cap in WIKILINK.captures_iter(content) {
        let Some(full) = cap.get(0) else {
            continue;
        };
        if is_in_code(full.start(), &code_ranges) {
            continue;
        }

        let target = cap.get(1).map(|m| m.as_str()).unwrap_or("");
        let display = cap.get(2).map(|m| m.as_str());
        let Some(reference) = WikiRef::parse(target, display) else {
            continue;
        };

        body.push_str(&content[last..full.start()]);
        body.push_str(&placeholder(&tag, references.len()));
        references.push(reference);
        last = full.end();
    }

    body.push_str(&content[last..]);
    ExtractedLinks {
        body,
        tag,
        references,
    }
}

/// Indices of the placeholders under `tag` in `body`, in order of appearance.
pub fn find_placeholders(body: &str, tag: &str) -> Vec<usize> {
    token::find_tokens(tag, body)
}

/// Replace each placeholder under `tag` with the markup returned by `link`.
///
/// Placeholders `link` has no markup for are left as written.
pub fn replace_placeholders(
    body: &str,
    tag: &str,
    link: impl FnMut(usize) -> Option<String>,
) -> String {
    token::replace_tokens(tag, body, link)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_link() {
        let out = extract_references("See [[My Note]] for details.");
        assert_eq!(out.references.len(), 1);
        assert_eq!(out.references[0].name, "My Note");
        assert!(out.references[0].display.is_none());
        assert_eq!(out.tag, REFERENCE_TAG);
        assert_eq!(out.body, "See ⟦wikiref:0⟧ for details.");
    }

    #[test]
    fn test_link_with_display() {
        let out = extract_references("See [[My Note|the note]].");
        assert_eq!(out.references[0].name, "My Note");
        assert_eq!(out.references[0].display.as_deref(), Some("the note"));
    }

    #[test]
    fn test_link_with_path() {
        let out = extract_references("[[folder/subfolder/note|shown]]");
        let r = &out.references[0];
        assert_eq!(r.target, "folder/subfolder/note");
        assert_eq!(r.path.as_deref(), Some("folder/subfolder"));
        assert_eq!(r.name, "note");
    }

    #[test]
    fn test_placeholders_are_ordered() {
        let out = extract_references("[[a]] then [[b]] then [[a]]");
        assert_eq!(out.references.len(), 3);
        assert_eq!(find_placeholders(&out.body, &out.tag), vec![0, 1, 2]);
        assert_eq!(out.references[2].name, "a");
    }

    #[test]
    fn test_empty_and_unterminated_left_verbatim() {
        let content = "empty [[]] and [[ |x]] and open [[never closed";
        let out = extract_references(content);
        assert!(out.references.is_empty());
        assert_eq!(out.body, content);
    }

    #[test]
    fn test_link_in_code_skipped() {
        let content = "See [[real]]\n\n```\n[[fake]]\n```\n\nand `[[inline]]` too";
        let out = extract_references(content);
        assert_eq!(out.references.len(), 1);
        assert_eq!(out.references[0].name, "real");
        assert!(out.body.contains("[[fake]]"));
        assert!(out.body.contains("`[[inline]]`"));
    }

    #[test]
    fn test_replace_placeholders() {
        let out = extract_references("x [[a]] y [[b|B]] z");
        let replaced = replace_placeholders(&out.body, &out.tag, |i| {
            Some(format!("<{}>", out.references.get(i)?.display_text()))
        });
        assert_eq!(replaced, "x <a> y <B> z");
        assert!(find_placeholders(&replaced, &out.tag).is_empty());
    }

    #[test]
    fn test_literal_placeholder_text_kept() {
        let content = "literal ⟦wikiref:0⟧ and ⟦wikiref:7⟧ then [[b]]";
        let out = extract_references(content);
        assert_eq!(out.references.len(), 1);
        assert_ne!(out.tag, REFERENCE_TAG);
        assert_eq!(find_placeholders(&out.body, &out.tag), vec![0]);

        let replaced = replace_placeholders(&out.body, &out.tag, |i| {
            Some(format!("<{}>", out.references.get(i)?.name))
        });
        assert_eq!(replaced, "literal ⟦wikiref:0⟧ and ⟦wikiref:7⟧ then <b>");
    }
}
