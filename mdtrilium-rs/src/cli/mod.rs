//! CLI command implementations.

pub mod args;
pub mod output;

pub mod import;
pub mod inspect;
pub mod tree;

pub use args::{Cli, Commands};
pub use output::Output;
