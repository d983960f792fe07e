//! Markdown to HTML rendering.
//!
//! Baseline conversion is pulldown-cmark. Callout blocks are cut out before
//! conversion, rendered recursively through [`render_markdown`], and spliced
//! back in where their block token landed.

use crate::parser::callout::{
    block_token, render_callout, split_callouts_tagged, CalloutSplit, CALLOUT_TAG,
};
use crate::parser::token::{free_tag, replace_tokens, tokens_unique};
use pulldown_cmark::{html, Options, Parser};
use tracing::warn;

/// Token tags tried per body before accepting a render with duplicate tokens.
pub const MAX_TAG_ATTEMPTS: usize = 16;

/// Markdown extensions enabled for note bodies.
pub fn markdown_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options
}

fn push_html(markdown: &str) -> String {
    let mut output = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut output, Parser::new_ext(markdown, markdown_options()));
    output
}

/// Render a Markdown body (which may contain reference placeholders) to HTML.
///
/// Entities in the source can decode to token text, so the rendered output is
/// checked and the split redone under the next free tag when a block token
/// shows up more than once.
pub fn render_markdown(markdown: &str) -> String {
    let mut start = 0;
    for attempt in 1..=MAX_TAG_ATTEMPTS {
        let (tag, k) = free_tag(CALLOUT_TAG, markdown, start);
        let split = split_callouts_tagged(markdown, tag);
        let output = push_html(&split.body);
        if tokens_unique(&split.tag, &output, split.callouts.len()) {
            return splice_callouts(output, &split);
        }
        if attempt == MAX_TAG_ATTEMPTS {
            warn!(tag = %split.tag, "callout tokens still ambiguous, splicing anyway");
            return splice_callouts(output, &split);
        }
        start = k + 1;
    }
    push_html(markdown)
}

fn splice_callouts(mut output: String, split: &CalloutSplit) -> String {
    for index in 0..split.callouts.len() {
        let token = block_token(&split.tag, index);
        output = output.replacen(&format!("<p>{}</p>\n", token), &token, 1);
    }
    replace_tokens(&split.tag, &output, |index| {
        let callout = split.callouts.get(index)?;
        let content = render_markdown(&callout.content);
        Some(render_callout(callout.kind, &escape_html(&callout.title), &content))
    })
}

/// Escape text for inclusion in HTML content or attribute values.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::wikilink::{extract_references, find_placeholders, placeholder};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_basic_markdown() {
        let html = render_markdown("# Title\n\nSome *emphasis* and a list:\n\n- one\n- two\n");
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<em>emphasis</em>"));
        assert!(html.contains("<li>one</li>"));
    }

    #[test]
    fn test_table_and_strikethrough() {
        let html = render_markdown("| a | b |\n|---|---|\n| 1 | 2 |\n\n~~gone~~\n");
        assert!(html.contains("<table>"));
        assert!(html.contains("<del>gone</del>"));
    }

    #[test]
    fn test_placeholders_survive_rendering() {
        let extracted = extract_references("**See [[a]]** and [[b|B]], also `[[c]]`.\n");
        let html = render_markdown(&extracted.body);
        assert!(html.contains(&placeholder(&extracted.tag, 0)));
        assert!(html.contains(&placeholder(&extracted.tag, 1)));
        assert_eq!(find_placeholders(&html, &extracted.tag).len(), extracted.references.len());
    }

    #[test]
    fn test_callout_rendered_as_aside() {
        let html = render_markdown("Before\n\n> [!tip] Remember\n> Some **bold** text\n\nAfter\n");
        assert!(html.contains("<aside class=\"admon tip\">"));
        assert!(html.contains("<strong>Remember</strong>"));
        assert!(html.contains("<strong>bold</strong>"));
        assert!(html.contains("<p>Before</p>"));
        assert!(html.contains("<p>After</p>"));
        assert!(!html.contains("⟦callout"));
        assert!(!html.contains("<blockquote>"));
    }

    #[test]
    fn test_callout_content_keeps_placeholders_and_code() {
        let extracted = extract_references("> [!note]\n> Link to [[x]]\n> ```\n> code\n> ```\n");
        let html = render_markdown(&extracted.body);
        assert!(html.contains(&placeholder(&extracted.tag, 0)));
        assert!(html.contains("<pre><code>code\n</code></pre>"));
    }

    #[test]
    fn test_nested_callouts() {
        let html = render_markdown("> [!note] Outer\n> text\n>\n> > [!danger] Inner\n> > deep\n");
        assert!(html.contains("<aside class=\"admon note\">"));
        assert!(html.contains("<aside class=\"admon danger\">"));
        assert!(html.find("admon note").unwrap() < html.find("admon danger").unwrap());
    }

    #[test]
    fn test_literal_block_token_stays_text() {
        let html = render_markdown("⟦callout:0⟧\n\n> [!tip] Real\n> body\n");
        assert!(html.starts_with("<p>⟦callout:0⟧</p>\n"));
        assert_eq!(html.matches("<aside").count(), 1);
        assert!(html.contains("<strong>Real</strong>"));
    }

    #[test]
    fn test_entity_spelled_block_token_stays_text() {
        let html = render_markdown("&#10214;callout:0&#10215;\n\n> [!tip] Real\n> body\n");
        assert!(html.starts_with("<p>⟦callout:0⟧</p>\n"));
        assert_eq!(html.matches("<aside").count(), 1);
    }

    #[test]
    fn test_callout_title_escaped() {
        let html = render_markdown("> [!info] a <b> & c\n> x\n");
        assert!(html.contains("<strong>a &lt;b&gt; &amp; c</strong>"));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<a href=\"x\">&'"), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }
}
