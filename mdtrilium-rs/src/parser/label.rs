//! Label extraction from frontmatter (`tags`, `labels`, `categories`, ...).

use crate::types::Label;
use serde_yaml::Value;

/// Label appended to every imported note.
pub const READ_ONLY: &str = "readOnly";

/// Keys whose values are read as labels unless configured otherwise.
pub const DEFAULT_LABEL_KEYS: &[&str] = &["tags", "labels", "categories"];

/// Parse one raw label string.
///
/// `/` splits name from value at its first occurrence; failing that `_` does;
/// otherwise the whole string is a valueless label. Blank input and blank
/// names yield `None`; a blank value becomes a valueless label.
pub fn parse_label(raw: &str) -> Option<Label> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let split = raw.split_once('/').or_else(|| raw.split_once('_'));
    let label = match split {
        Some((name, value)) => {
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            match value.trim() {
                "" => Label::flag(name),
                value => Label::new(name, value),
            }
        }
        None => Label::flag(raw),
    };
    Some(label)
}

/// Collect the raw label strings found under `keys` in a frontmatter mapping.
///
/// A string value is split on commas; a sequence contributes each scalar item.
pub fn raw_labels(frontmatter: &Value, keys: &[String]) -> Vec<String> {
    let mut raw = Vec::new();

    for key in keys {
        match frontmatter.get(key.as_str()) {
            Some(Value::String(s)) => raw.extend(s.split(',').map(|t| t.trim().to_string())),
            Some(Value::Sequence(items)) => raw.extend(items.iter().filter_map(scalar_to_string)),
            Some(other) => raw.extend(scalar_to_string(other)),
            None => {}
        }
    }

    raw
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Extract the ordered label set for a document.
///
/// Exact duplicates collapse to their first occurrence; distinct values under
/// one name are all kept. The `readOnly` flag is always last.
pub fn extract_labels(frontmatter: Option<&Value>, keys: &[String]) -> Vec<Label> {
    let mut labels: Vec<Label> = Vec::new();
    let read_only = Label::flag(READ_ONLY);

    if let Some(fm) = frontmatter {
        for raw in raw_labels(fm, keys) {
            if let Some(label) = parse_label(&raw) {
                if label != read_only && !labels.contains(&label) {
                    labels.push(label);
                }
            }
        }
    }

    labels.push(read_only);
    labels
}
