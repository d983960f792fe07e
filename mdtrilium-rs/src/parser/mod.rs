//! Parsers for the Markdown dialect found in exported vaults.

pub mod callout;
pub mod code_block;
pub mod frontmatter;
pub mod label;
pub mod token;
pub mod wikilink;

pub use callout::{canonicalize, split_callouts, CalloutKind};
pub use code_block::{find_code_ranges, CodeRange};
pub use frontmatter::{parse_frontmatter, split_frontmatter};
pub use label::{extract_labels, parse_label, READ_ONLY};
pub use wikilink::{extract_references, find_placeholders, replace_placeholders};
