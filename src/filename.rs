//! Parsing of `Artist - Track` local filenames.

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

use crate::error::FileParseError;
use crate::normalize::normalize_name;

/// Matches track number prefixes like "01 - ", "001. ", "7-"
pub static TRACK_NUMBER_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\s*[.\-]\s*").unwrap());

/// Separator between artist and track; only the first occurrence splits.
pub const ARTIST_TRACK_SEPARATOR: &str = " - ";

/// Parse a local filename into normalized `(artist, track)`.
///
/// Expected shapes: `Artist - Track.ext`, `01 - Artist - Track.ext`,
/// `001. Artist - Track.ext`. Everything after the first separator is the
/// track, so `A - B - C.mp3` is artist `a`, track `b - c`.
pub fn parse_filename(path: &Path) -> Result<(String, String), FileParseError> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let without_number = TRACK_NUMBER_PREFIX.replace(&file_name, "");
    let stem = Path::new(without_number.as_ref())
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let (artist, track) = stem
        .split_once(ARTIST_TRACK_SEPARATOR)
        .ok_or_else(|| FileParseError::new(path, "Expected format: 'Artist - Track'"))?;

    let artist = normalize_name(artist);
    let track = normalize_name(track);
    if artist.is_empty() || track.is_empty() {
        return Err(FileParseError::new(
            path,
            "Empty artist or track name after normalization",
        ));
    }

    Ok((artist, track))
}
