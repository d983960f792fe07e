//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "mdtrilium")]
#[command(author, version, about = "Import a directory of Markdown notes into Trilium", long_about = None)]
pub struct Cli {
    /// Path to a config file (default: <config_dir>/mdtrilium/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output as JSON (default)
    #[arg(long, global = true, conflicts_with_all = ["yaml", "toml"])]
    pub json: bool,

    /// Output as YAML
    #[arg(long, global = true, conflicts_with_all = ["json", "toml"])]
    pub yaml: bool,

    /// Output as TOML
    #[arg(long, global = true, conflicts_with_all = ["json", "yaml"])]
    pub toml: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase log verbosity (can be repeated)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn output_format(&self) -> OutputFormat {
        self.explicit_format().unwrap_or_default()
    }

    /// The output format, if one was asked for on the command line.
    pub fn explicit_format(&self) -> Option<OutputFormat> {
        if self.json {
            Some(OutputFormat::Json)
        } else if self.yaml {
            Some(OutputFormat::Yaml)
        } else if self.toml {
            Some(OutputFormat::Toml)
        } else {
            None
        }
    }

    /// Default log filter for the verbosity flags.
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
    Toml,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Import a directory into Trilium
    Import(ImportArgs),

    /// Show the folder and document tree that would be imported
    Tree(TreeArgs),

    /// Show labels, references and rendered body for one document
    Inspect(InspectArgs),
}

/// Which source entries to scan.
#[derive(Parser, Debug, Clone, Default)]
pub struct ScanArgs {
    /// Include files and folders whose names start with '.'
    #[arg(long)]
    pub include_hidden: bool,

    /// Skip paths matching this glob (relative to the source, repeatable)
    #[arg(long)]
    pub exclude: Vec<String>,
}

// === Import ===

#[derive(Parser, Debug)]
pub struct ImportArgs {
    /// Source directory
    pub source: PathBuf,

    /// Trilium server URL
    #[arg(long)]
    pub server: Option<String>,

    /// ETAPI token
    #[arg(long)]
    pub token: Option<String>,

    /// Note to import under
    #[arg(long)]
    pub parent: Option<String>,

    /// Run against an in-memory repository and report what would be written
    #[arg(long)]
    pub preview: bool,

    /// Link unmatched names to existing notes with the same title
    #[arg(long)]
    pub link_existing: bool,

    #[command(flatten)]
    pub scan: ScanArgs,
}

// === Tree ===

#[derive(Parser, Debug)]
pub struct TreeArgs {
    /// Source directory
    pub source: PathBuf,

    #[command(flatten)]
    pub scan: ScanArgs,
}

// === Inspect ===

#[derive(Parser, Debug)]
pub struct InspectArgs {
    /// Markdown file
    pub file: PathBuf,

    /// Omit the rendered body
    #[arg(long)]
    pub no_body: bool,
}
