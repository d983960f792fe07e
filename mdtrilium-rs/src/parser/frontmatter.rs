//! YAML frontmatter splitting and lenient parsing.

use serde_yaml::Value;
use tracing::warn;

/// Frontmatter extraction result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontmatterSplit<'a> {
    /// The raw YAML string (without delimiters).
    pub yaml: Option<&'a str>,
    /// The content after the frontmatter.
    pub body: &'a str,
}

/// Split content into frontmatter and body.
///
/// The block must open with `---` on the first line and close with a line
/// that is exactly `---` or `...`. Anything else is treated as plain body.
pub fn split_frontmatter(content: &str) -> FrontmatterSplit<'_> {
    let no_frontmatter = FrontmatterSplit {
        yaml: None,
        body: content,
    };

    let mut lines = content.split_inclusive('\n');
    let Some(first) = lines.next() else {
        return no_frontmatter;
    };
    if first.trim_end() != "---" || !first.ends_with('\n') {
        return no_frontmatter;
    }

    let yaml_start = first.len();
    let mut offset = yaml_start;
    for line in lines {
        let trimmed = line.trim_end();
        if trimmed == "---" || trimmed == "..." {
            // Strip the newline that ends the last YAML line
            let yaml_end = content[..offset]
                .strip_suffix('\n')
                .map(|s| s.strip_suffix('\r').unwrap_or(s).len())
                .unwrap_or(offset)
                .max(yaml_start);
            return FrontmatterSplit {
                yaml: Some(&content[yaml_start..yaml_end]),
                body: &content[offset + line.len()..],
            };
        }
        offset += line.len();
    }

    no_frontmatter
}

/// Parse frontmatter YAML, degrading to `None` when it is malformed.
///
/// Malformed metadata never stops a document from being imported.
pub fn parse_frontmatter(yaml: &str, source: &str) -> Option<Value> {
    match serde_yaml::from_str::<Value>(yaml) {
        Ok(Value::Null) => None,
        Ok(value) => Some(value),
        Err(e) => {
            warn!(source, error = %e, "ignoring malformed frontmatter");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_no_frontmatter() {
        let split = split_frontmatter("Just some content");
        assert!(split.yaml.is_none());
        assert_eq!(split.body, "Just some content");
    }

    #[test]
    fn test_split_with_frontmatter() {
        let content = "---\ntitle: Test\ntags: [a, b]\n---\n\nContent here";
        let split = split_frontmatter(content);
        assert_eq!(split.yaml, Some("title: Test\ntags: [a, b]"));
        assert_eq!(split.body, "\nContent here");
    }

    #[test]
    fn test_split_dots_terminator() {
        let content = "---\ntags: x\n...\nBody";
        let split = split_frontmatter(content);
        assert_eq!(split.yaml, Some("tags: x"));
        assert_eq!(split.body, "Body");
    }

    #[test]
    fn test_split_frontmatter_at_eof() {
        let split = split_frontmatter("---\ntitle: Test\n---");
        assert_eq!(split.yaml, Some("title: Test"));
        assert_eq!(split.body, "");
    }

    #[test]
    fn test_split_empty_frontmatter() {
        let split = split_frontmatter("---\n---\nBody");
        assert_eq!(split.yaml, Some(""));
        assert_eq!(split.body, "Body");
    }

    #[test]
    fn test_crlf_frontmatter() {
        let split = split_frontmatter("---\r\ntags: a\r\n---\r\nBody");
        assert_eq!(split.yaml, Some("tags: a"));
        assert_eq!(split.body, "Body");
    }

    #[test]
    fn test_no_closing_delimiter() {
        let content = "---\ntitle: Test\n\nContent without closing";
        let split = split_frontmatter(content);
        assert!(split.yaml.is_none());
        assert_eq!(split.body, content);
    }

    #[test]
    fn test_horizontal_rule_later_is_body() {
        let content = "Intro\n---\nMore";
        assert!(split_frontmatter(content).yaml.is_none());
    }

    #[test]
    fn test_parse_frontmatter() {
        let value = parse_frontmatter("title: My Note\ntags:\n  - rust\n  - cli", "t.md").unwrap();
        assert_eq!(value["title"].as_str(), Some("My Note"));
        assert_eq!(value["tags"].as_sequence().unwrap().len(), 2);
    }

    #[test]
    fn test_malformed_frontmatter_is_none() {
        assert!(parse_frontmatter("invalid: yaml: syntax:", "t.md").is_none());
        assert!(parse_frontmatter("", "t.md").is_none());
    }
}
