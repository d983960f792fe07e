//! Configuration: an optional TOML file, environment overrides, then CLI flags.

use crate::convert::ConvertOptions;
use crate::error::{ImportError, Result};
use crate::graph::ImportOptions;
use crate::parser::label::DEFAULT_LABEL_KEYS;
use crate::tree::ScanOptions;
use crate::types::NoteId;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_SERVER: &str = "http://localhost:8080";
pub const DEFAULT_PARENT: &str = "root";

pub const ENV_SERVER: &str = "TRILIUM_SERVER";
pub const ENV_TOKEN: &str = "TRILIUM_TOKEN";
pub const ENV_PARENT: &str = "TRILIUM_PARENT";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the Trilium server.
    pub server: Option<String>,
    /// ETAPI token.
    pub token: Option<String>,
    /// Note under which imported trees are placed.
    pub parent: Option<String>,
    pub import: ImportSection,
}

/// The `[import]` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSection {
    pub label_keys: Vec<String>,
    pub extensions: Vec<String>,
    pub include_hidden: bool,
    pub exclude: Vec<String>,
    pub relation_name: String,
    pub orphans_title: String,
    pub link_existing: bool,
}

impl Default for ImportSection {
    fn default() -> Self {
        let options = ImportOptions::default();
        Self {
            label_keys: DEFAULT_LABEL_KEYS.iter().map(|k| k.to_string()).collect(),
            extensions: vec!["md".to_string()],
            include_hidden: false,
            exclude: Vec::new(),
            relation_name: options.relation_name,
            orphans_title: options.orphans_title,
            link_existing: options.link_existing,
        }
    }
}

impl Config {
    /// `<config_dir>/mdtrilium/config.toml`, if a config dir is known.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("mdtrilium").join("config.toml"))
    }

    /// Load configuration from `path` (or the default location), then apply
    /// environment overrides. A `.env` file in the working directory is read
    /// first.
    ///
    /// An explicit path must exist; a missing default file is not an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Ok(env_file) = dotenvy::dotenv() {
            debug!(path = %env_file.display(), "loaded .env");
        }

        let mut config = match path {
            Some(path) => Self::load_from(path)?,
            None => match Self::default_path() {
                Some(path) if path.is_file() => Self::load_from(&path)?,
                _ => Self::default(),
            },
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Parse a config file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ImportError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config = toml::from_str(&content)?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Override connection settings from environment variables.
    ///
    /// Empty values are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(server) = get(ENV_SERVER) {
            self.server = Some(server);
        }
        if let Some(token) = get(ENV_TOKEN) {
            self.token = Some(token);
        }
        if let Some(parent) = get(ENV_PARENT) {
            self.parent = Some(parent);
        }
    }

    pub fn server_url(&self) -> &str {
        self.server.as_deref().unwrap_or(DEFAULT_SERVER)
    }

    pub fn parent_note(&self) -> NoteId {
        NoteId::new(self.parent.as_deref().unwrap_or(DEFAULT_PARENT))
    }

    /// The token, required for live imports.
    pub fn require_token(&self) -> Result<&str> {
        self.token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or(ImportError::MissingToken)
    }

    pub fn scan_options(&self) -> Result<ScanOptions> {
        let options = ScanOptions {
            extensions: self.import.extensions.clone(),
            include_hidden: self.import.include_hidden,
            exclude: Vec::new(),
            convert: ConvertOptions {
                label_keys: self.import.label_keys.clone(),
            },
        };
        options.with_excludes(&self.import.exclude)
    }

    pub fn import_options(&self) -> ImportOptions {
        ImportOptions {
            relation_name: self.import.relation_name.clone(),
            orphans_title: self.import.orphans_title.clone(),
            link_existing: self.import.link_existing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server_url(), DEFAULT_SERVER);
        assert_eq!(config.parent_note(), NoteId::new("root"));
        assert_eq!(config.import.label_keys, vec!["tags", "labels", "categories"]);
        assert_eq!(config.import.relation_name, "references");
        assert!(matches!(config.require_token(), Err(ImportError::MissingToken)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
server = "https://notes.example.com"
token = "secret"

[import]
exclude = ["drafts/**"]
include_hidden = true
orphans_title = "Unresolved"
"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.server_url(), "https://notes.example.com");
        assert_eq!(config.require_token().unwrap(), "secret");
        assert_eq!(config.parent_note(), NoteId::new("root"));
        assert!(config.import.include_hidden);
        assert_eq!(config.import.extensions, vec!["md"]);
        assert_eq!(config.import_options().orphans_title, "Unresolved");

        let scan = config.scan_options().unwrap();
        assert_eq!(scan.exclude.len(), 1);
        assert!(scan.exclude[0].matches("drafts/a.md"));
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let result = Config::load_from(Path::new("/nonexistent/mdtrilium.toml"));
        assert!(matches!(result, Err(ImportError::Config(_))));
    }

    #[test]
    fn test_invalid_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "server = [").unwrap();
        assert!(matches!(Config::load_from(&path), Err(ImportError::TomlParse(_))));
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = Config {
            server: Some("http://file".to_string()),
            ..Config::default()
        };
        let env: HashMap<&str, &str> = [
            (ENV_SERVER, "http://env"),
            (ENV_TOKEN, "tok"),
            (ENV_PARENT, ""),
        ]
        .into_iter()
        .collect();
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.server_url(), "http://env");
        assert_eq!(config.token.as_deref(), Some("tok"));
        assert_eq!(config.parent, None);
    }

    #[test]
    fn test_bad_exclude_pattern() {
        let mut config = Config::default();
        config.import.exclude = vec!["[".to_string()];
        assert!(matches!(config.scan_options(), Err(ImportError::GlobPattern(_))));
    }
}
