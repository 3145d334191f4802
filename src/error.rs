//! Error types for playlist reconciliation.
//!
//! Per-item problems (folder checks, filename parses, track matches) are
//! collected into aggregate reports and raised once. Execution-time I/O
//! failures are raised immediately.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::models::VerificationReport;

/// Main error type for the reconciliation pipeline.
#[derive(Error, Debug)]
pub enum Error {
    /// One or more input folders failed validation
    #[error("{0}")]
    FolderValidation(FolderValidationReport),

    /// A local filename does not follow the `Artist - Track` convention
    #[error(transparent)]
    FileParsing(#[from] FileParseError),

    /// A value failed validation
    #[error("Validation failed for {field} '{value}': {reason}")]
    Validation {
        field: String,
        value: String,
        reason: String,
    },

    /// A required field was missing from the playlist data
    #[error("Value is missing for field '{field}'")]
    NullValue { field: String },

    /// Authentication or fetch failure against the playlist service
    #[error("Remote service error during {operation}: {details}")]
    RemoteService { operation: String, details: String },

    /// Playlist could not be fully reconciled against the local files
    #[error("{0}")]
    PlaylistVerification(VerificationReport),

    /// Copy/move failure while applying the plan
    #[error("File operation '{operation}' failed for '{}': {details}", path.display())]
    FileOperation {
        operation: String,
        path: PathBuf,
        details: String,
    },

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding/decoding errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience Result type using the crate Error
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn validation(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Error::Validation {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub fn remote(operation: impl Into<String>, details: impl fmt::Display) -> Self {
        Error::RemoteService {
            operation: operation.into(),
            details: details.to_string(),
        }
    }

    pub fn file_operation(
        operation: impl Into<String>,
        path: impl Into<PathBuf>,
        details: impl fmt::Display,
    ) -> Self {
        Error::FileOperation {
            operation: operation.into(),
            path: path.into(),
            details: details.to_string(),
        }
    }
}

/// Unwrap a required field or fail with [`Error::NullValue`].
pub fn require<T>(field: impl Into<String>, value: Option<T>) -> Result<T> {
    value.ok_or_else(|| Error::NullValue {
        field: field.into(),
    })
}

/// A filename that could not be split into artist and track.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Could not parse file '{}': {reason}", file_name(path))]
pub struct FileParseError {
    pub path: PathBuf,
    pub reason: String,
}

impl FileParseError {
    pub fn new(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

fn file_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Aggregated input-folder problems.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderValidationReport {
    pub missing: Vec<String>,
    pub not_directories: Vec<String>,
    pub unreadable: Vec<String>,
}

impl FolderValidationReport {
    pub fn is_empty(&self) -> bool {
        self.missing.is_empty() && self.not_directories.is_empty() && self.unreadable.is_empty()
    }
}

impl fmt::Display for FolderValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if !self.missing.is_empty() {
            parts.push(format!("{} folders don't exist", self.missing.len()));
        }
        if !self.unreadable.is_empty() {
            parts.push(format!("{} folders have permission issues", self.unreadable.len()));
        }
        if !self.not_directories.is_empty() {
            parts.push(format!("{} paths are not directories", self.not_directories.len()));
        }
        write!(f, "Folder validation failed: {}", parts.join(", "))?;

        write_group(f, "Missing folders", &self.missing)?;
        write_group(f, "Permission errors", &self.unreadable)?;
        write_group(f, "Not directories", &self.not_directories)
    }
}

/// Render one category of an aggregated error: a header with its count, then
/// one line per item. Empty categories are omitted.
pub(crate) fn write_group<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    title: &str,
    items: &[T],
) -> fmt::Result {
    if items.is_empty() {
        return Ok(());
    }
    write!(f, "\n\n{} ({}):", title, items.len())?;
    for item in items {
        write!(f, "\n  - {}", item)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_folder_report_lists_every_item() {
        let report = FolderValidationReport {
            missing: vec!["/a".to_string(), "/b".to_string()],
            not_directories: vec!["/c.txt".to_string()],
            unreadable: vec![],
        };
        let text = Error::FolderValidation(report).to_string();
        assert!(text.starts_with(
            "Folder validation failed: 2 folders don't exist, 1 paths are not directories"
        ));
        assert!(text.contains("Missing folders (2):\n  - /a\n  - /b"));
        assert!(text.contains("Not directories (1):\n  - /c.txt"));
        assert!(!text.contains("Permission errors"));
    }

    #[test]
    fn test_file_parse_error_names_file() {
        let err =
            FileParseError::new("/music/in/Nothing here.mp3", "Expected format: 'Artist - Track'");
        assert_eq!(
            err.to_string(),
            "Could not parse file 'Nothing here.mp3': Expected format: 'Artist - Track'"
        );
    }

    #[test]
    fn test_require_names_field() {
        let err = require::<u32>("album_name for 42", None).unwrap_err();
        assert_eq!(err.to_string(), "Value is missing for field 'album_name for 42'");
        assert_eq!(require("id", Some(7)).unwrap(), 7);
    }

    #[test]
    fn test_file_operation_display() {
        let err = Error::file_operation("copy", "/src/a.mp3", "disk full");
        assert_eq!(
            err.to_string(),
            "File operation 'copy' failed for '/src/a.mp3': disk full"
        );
    }
}
