//! Error types and exit codes for mdtrilium.

use std::path::PathBuf;
use thiserror::Error;

/// Process exit codes.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const SOURCE_NOT_FOUND: i32 = 2;
    pub const DUPLICATE_NAME: i32 = 3;
    pub const CONFIG_ERROR: i32 = 4;
    pub const PARTIAL_FAILURE: i32 = 5;
}

/// Main error type for import operations.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Source directory not found: {0}")]
    SourceNotFound(PathBuf),

    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Duplicate name '{name}' in folder {container}")]
    DuplicateName { container: PathBuf, name: String },

    #[error("Service returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Config error: {0}")]
    Config(String),

    #[error("No ETAPI token configured (use --token or TRILIUM_TOKEN)")]
    MissingToken,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Glob pattern error: {0}")]
    GlobPattern(#[from] glob::PatternError),

    #[error("{0}")]
    Other(String),
}

impl ImportError {
    /// Returns the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            ImportError::SourceNotFound(_) | ImportError::NotADirectory(_) => {
                exit_code::SOURCE_NOT_FOUND
            }
            ImportError::DuplicateName { .. } => exit_code::DUPLICATE_NAME,
            ImportError::Config(_)
            | ImportError::MissingToken
            | ImportError::TomlParse(_)
            | ImportError::GlobPattern(_) => exit_code::CONFIG_ERROR,
            _ => exit_code::GENERAL_ERROR,
        }
    }
}

/// Result type alias for import operations.
pub type Result<T> = std::result::Result<T, ImportError>;

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success,
    GeneralError,
    PartialFailure,
}

impl ExitCode {
    /// Convert to exit code integer.
    pub fn code(self) -> i32 {
        match self {
            ExitCode::Success => exit_code::SUCCESS,
            ExitCode::GeneralError => exit_code::GENERAL_ERROR,
            ExitCode::PartialFailure => exit_code::PARTIAL_FAILURE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_errors_have_distinct_codes() {
        let dup = ImportError::DuplicateName {
            container: PathBuf::from("notes"),
            name: "a".to_string(),
        };
        assert_eq!(dup.exit_code(), exit_code::DUPLICATE_NAME);
        assert_eq!(
            ImportError::SourceNotFound(PathBuf::from("x")).exit_code(),
            exit_code::SOURCE_NOT_FOUND
        );
        assert_eq!(ImportError::MissingToken.exit_code(), exit_code::CONFIG_ERROR);
    }

    #[test]
    fn test_api_error_message() {
        let err = ImportError::Api {
            status: 401,
            message: "Unauthorized".to_string(),
        };
        assert_eq!(err.to_string(), "Service returned HTTP 401: Unauthorized");
        assert_eq!(err.exit_code(), exit_code::GENERAL_ERROR);
    }
}
