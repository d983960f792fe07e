//! Code span detection, so references and callouts inside code are left alone.

use regex::Regex;
use std::sync::LazyLock;

/// A byte range covered by a fenced block or an inline code span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeRange {
    /// Start byte offset (inclusive).
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
    /// Whether this is a fenced block (vs inline code).
    pub fenced: bool,
}

// Opening or closing fence: up to three spaces of indent, then ``` or ~~~
static FENCE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^ {0,3}(`{3,}|~{3,})").unwrap());

// Inline code delimited by runs of one or two backticks on a single line
static INLINE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"``(?:[^`\n]|`[^`\n])+``|`[^`\n]+`").unwrap());

/// Find all fenced blocks and inline code spans in content, sorted by start.
///
/// An unclosed fence runs to the end of the content, as it does in CommonMark.
pub fn find_code_ranges(content: &str) -> Vec<CodeRange> {
    let mut ranges = Vec::new();
    let mut open: Option<(usize, char, usize)> = None;
    let mut offset = 0;

    for line in content.split_inclusive('\n') {
        let line_start = offset;
        offset += line.len();

        let Some(cap) = FENCE.captures(line) else {
            continue;
        };
        let fence = cap.get(1).map(|m| m.as_str()).unwrap_or("");
        let fence_char = fence.chars().next().unwrap_or('`');

        match open {
            None => open = Some((line_start, fence_char, fence.len())),
            Some((start, ch, len)) => {
                let rest = line[cap.get(0).map(|m| m.end()).unwrap_or(0)..].trim();
                if fence_char == ch && fence.len() >= len && rest.is_empty() {
                    ranges.push(CodeRange {
                        start,
                        end: offset,
                        fenced: true,
                    });
                    open = None;
                }
            }
        }
    }

    if let Some((start, _, _)) = open {
        ranges.push(CodeRange {
            start,
            end: content.len(),
            fenced: true,
        });
    }

    let fenced = ranges.clone();
    for m in INLINE_CODE.find_iter(content) {
        if fenced.iter().any(|r| m.start() < r.end && m.end() > r.start) {
            continue;
        }
        ranges.push(CodeRange {
            start: m.start(),
            end: m.end(),
            fenced: false,
        });
    }

    ranges.sort_by_key(|r| r.start);
    ranges
}

/// Check if a byte offset is inside any code range.
pub fn is_in_code(offset: usize, ranges: &[CodeRange]) -> bool {
    ranges.iter().any(|r| offset >= r.start && offset < r.end)
}

/// Check if a byte offset is inside a fenced block.
pub fn is_in_fenced_block(offset: usize, ranges: &[CodeRange]) -> bool {
    ranges
        .iter()
        .any(|r| r.fenced && offset >= r.start && offset < r.end)
}
