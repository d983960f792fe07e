//! Indexed tokens that stand in for content while Markdown is rendered.
//!
//! A token reads `⟦tag:N⟧`. The tag is picked per body so that no token text
//! already occurs in it; a note that quotes `⟦wikiref:0⟧` literally gets its
//! own links tokenized under `wikiref1` instead.

/// The `k`-th candidate tag for `base`: `base`, `base1`, `base2`, ...
fn candidate(base: &str, k: usize) -> String {
    if k == 0 {
        base.to_string()
    } else {
        format!("{}{}", base, k)
    }
}

fn opening(tag: &str) -> String {
    format!("⟦{}:", tag)
}

/// First candidate tag at or after `start` whose tokens do not occur in
/// `content`. Returns the tag and its candidate number.
pub fn free_tag(base: &str, content: &str, start: usize) -> (String, usize) {
    let mut k = start;
    loop {
        let tag = candidate(base, k);
        if !content.contains(&opening(&tag)) {
            return (tag, k);
        }
        k += 1;
    }
}

/// Token for `index` under `tag`.
pub fn token(tag: &str, index: usize) -> String {
    format!("⟦{}:{}⟧", tag, index)
}

/// Indices of the tokens under `tag`, in order of appearance.
pub fn find_tokens(tag: &str, text: &str) -> Vec<usize> {
    let mut found = Vec::new();
    scan(tag, text, |index| {
        found.push(index);
        None
    });
    found
}

/// True when every token under `tag` in `text` is below `count` and occurs at
/// most once.
pub fn tokens_unique(tag: &str, text: &str, count: usize) -> bool {
    let mut seen = vec![false; count];
    find_tokens(tag, text)
        .into_iter()
        .all(|index| index < count && !std::mem::replace(&mut seen[index], true))
}

/// Replace tokens under `tag` in a single pass.
///
/// Text produced by `replace` is not scanned again. A token for which
/// `replace` returns `None` is kept as written.
pub fn replace_tokens(
    tag: &str,
    text: &str,
    replace: impl FnMut(usize) -> Option<String>,
) -> String {
    scan(tag, text, replace)
}

fn scan(tag: &str, text: &str, mut replace: impl FnMut(usize) -> Option<String>) -> String {
    let open = opening(tag);
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(pos) = rest.find(&open) {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + open.len()..];
        let digits = after.len() - after.trim_start_matches(|c: char| c.is_ascii_digit()).len();

        let index = match after[digits..].strip_prefix('⟧') {
            Some(_) if digits > 0 => after[..digits].parse::<usize>().ok(),
            _ => None,
        };
        match index.and_then(&mut replace) {
            Some(markup) => {
                out.push_str(&markup);
                rest = &after[digits + '⟧'.len_utf8()..];
            }
            None => {
                out.push_str(&open);
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_free_tag_skips_taken_tags() {
        assert_eq!(free_tag("ref", "plain text", 0), ("ref".to_string(), 0));
        assert_eq!(free_tag("ref", "quotes ⟦ref:3⟧", 0), ("ref1".to_string(), 1));
        assert_eq!(free_tag("ref", "⟦ref:0⟧ ⟦ref1:0⟧", 0), ("ref2".to_string(), 2));
        assert_eq!(free_tag("ref", "plain", 4), ("ref4".to_string(), 4));
    }

    #[test]
    fn test_find_tokens_ignores_other_tags() {
        let text = "a ⟦ref:0⟧ b ⟦ref1:5⟧ c ⟦ref:2⟧ d ⟦ref:x⟧ ⟦ref:⟧";
        assert_eq!(find_tokens("ref", text), vec![0, 2]);
        assert_eq!(find_tokens("ref1", text), vec![5]);
    }

    #[test]
    fn test_replace_keeps_unknown_indices() {
        let out = replace_tokens("ref", "⟦ref:0⟧ ⟦ref:9⟧", |i| (i == 0).then(|| "zero".into()));
        assert_eq!(out, "zero ⟦ref:9⟧");
    }

    #[test]
    fn test_replacement_not_rescanned() {
        let out = replace_tokens("ref", "⟦ref:0⟧|⟦ref:1⟧", |i| match i {
            0 => Some(token("ref", 1)),
            _ => Some("one".into()),
        });
        assert_eq!(out, "⟦ref:1⟧|one");
    }

    #[test]
    fn test_tokens_unique() {
        assert!(tokens_unique("ref", "⟦ref:1⟧ ⟦ref:0⟧", 2));
        assert!(tokens_unique("ref", "⟦ref:1⟧", 2));
        assert!(!tokens_unique("ref", "⟦ref:0⟧ ⟦ref:0⟧", 2));
        assert!(!tokens_unique("ref", "⟦ref:2⟧", 2));
    }
}
