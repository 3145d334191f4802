//! Input folder validation and audio file enumeration.
//!
//! Folders are listed one level deep (no recursion). Output order is folder
//! order, then filename order within each folder; matching does not depend
//! on it beyond first-candidate tie-breaks.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{Error, FolderValidationReport, Result};
use crate::models::LocalFile;

/// Audio extensions picked up by the scanner (compared case-insensitively)
pub const SUPPORTED_EXTENSIONS: [&str; 7] =
    [".flac", ".mp3", ".m4a", ".wav", ".aac", ".ogg", ".wma"];

pub fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let dotted = format!(".{}", ext.to_ascii_lowercase());
            SUPPORTED_EXTENSIONS.contains(&dotted.as_str())
        })
        .unwrap_or(false)
}

/// Check that every folder exists, is a directory and can be listed.
///
/// All problems are collected before failing, so the operator sees every
/// bad folder at once.
pub fn validate_input_folders(folders: &[PathBuf]) -> Result<()> {
    let mut report = FolderValidationReport::default();

    for folder in folders {
        if !folder.exists() {
            report.missing.push(folder.display().to_string());
            continue;
        }
        if !folder.is_dir() {
            report.not_directories.push(folder.display().to_string());
            continue;
        }
        // Listing the whole directory is the only reliable readability probe
        let listing =
            fs::read_dir(folder).and_then(|entries| entries.collect::<io::Result<Vec<_>>>());
        match listing {
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
                report.unreadable.push(folder.display().to_string());
            }
            Err(e) => {
                report.unreadable.push(format!("{} (OS error: {})", folder.display(), e));
            }
        }
    }

    if !report.is_empty() {
        return Err(Error::FolderValidation(report));
    }
    tracing::debug!("Input folders validated: {:?}", folders);
    Ok(())
}

/// Collect audio files from `folders`, in folder order and then filename order.
pub fn scan_audio_files(folders: &[PathBuf]) -> Result<Vec<LocalFile>> {
    if folders.is_empty() {
        return Err(Error::validation("input_folders", "empty list", "No input folders provided"));
    }

    let mut files = Vec::new();
    for folder in folders {
        let before = files.len();
        let walker = WalkDir::new(folder)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if is_dangling_link(&e) => {
                    if let Some(path) = e.path() {
                        tracing::debug!("Skipping dangling link {}", path.display());
                    }
                    continue;
                }
                Err(e) => return Err(Error::file_operation("list directory", folder, e)),
            };
            let path = entry.path();
            if entry.file_type().is_file() && is_audio_file(path) {
                files.push(LocalFile::new(path));
            }
        }
        tracing::debug!("Found {} audio files in {}", files.len() - before, folder.display());
    }

    if files.is_empty() {
        return Err(Error::validation(
            "audio_files",
            format!("{} folder(s)", folders.len()),
            format!(
                "No audio files found. Supported extensions: {}",
                SUPPORTED_EXTENSIONS.join(", ")
            ),
        ));
    }

    Ok(files)
}

/// A followed symlink whose target is gone; not a regular file, so not an error.
fn is_dangling_link(err: &walkdir::Error) -> bool {
    err.path().is_some()
        && err
            .io_error()
            .map_or(false, |e| e.kind() == io::ErrorKind::NotFound)
}
