//! Filesystem-safety helpers for destination paths.
//!
//! Names coming from the playlist service end up as directory and file
//! names, so characters that are illegal or risky on common filesystems are
//! replaced before they are joined into a path.

use crate::error::{Error, Result};
use crate::normalize::WHITESPACE_RUN;
use std::path::Path;

/// Placeholder for a segment that sanitizes to nothing
pub const EMPTY_SEGMENT: &str = "_";

/// Replacement for each problematic character; empty means remove.
const REPLACEMENTS: [(char, &str); 10] = [
    (':', "-"),
    ('/', "-"),
    ('\\', "-"),
    ('<', "("),
    ('>', ")"),
    ('"', "'"),
    ('|', "-"),
    ('?', ""),
    ('*', ""),
    ('\0', ""),
];

/// Sanitize a single path segment (directory or file name).
///
/// Never pass a full path: separators are replaced like any other character.
pub fn sanitize_component(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for ch in name.chars() {
        match REPLACEMENTS.iter().find(|(bad, _)| *bad == ch) {
            Some((_, replacement)) => out.push_str(replacement),
            None => out.push(ch),
        }
    }

    let trimmed = out.trim_matches(|c| c == '.' || c == ' ');
    let collapsed = WHITESPACE_RUN.replace_all(trimmed, " ").into_owned();

    if collapsed.is_empty() {
        EMPTY_SEGMENT.to_string()
    } else {
        collapsed
    }
}

/// Validates that the output root can hold the planned tree.
///
/// Checks:
/// - Output must not be an existing non-directory
/// - Output cannot be one of the input folders
pub fn validate_output_root(output: &Path, input_folders: &[&Path]) -> Result<()> {
    if output.exists() && !output.is_dir() {
        return Err(Error::validation(
            "output",
            output.display().to_string(),
            "Output path exists and is not a directory",
        ));
    }

    for input in input_folders {
        if output == *input {
            return Err(Error::validation(
                "output",
                output.display().to_string(),
                format!("Output cannot be the same as input folder '{}'", input.display()),
            ));
        }
    }

    Ok(())
}
