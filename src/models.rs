//! Core data models for playlist reconciliation.
//!
//! This module contains the playlist values built from fetched data, the
//! local file handle, match results, and the verification/summary types
//! produced by a reconciliation run.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{require, write_group, FileParseError, Result};
use crate::filename::parse_filename;
use crate::normalize::normalize_name;

// ============================================================================
// Type Aliases
// ============================================================================

/// album_id -> consolidated album-artist, built once per run
pub type AlbumArtistMap = FxHashMap<String, String>;

/// Normalized track name -> (normalized artist, path) candidates in scan order
pub type LocalTrackIndex = FxHashMap<String, Vec<(String, PathBuf)>>;

// ============================================================================
// Raw Playlist Data
// ============================================================================

/// Playlist as delivered by a playlist source. Every field is optional here;
/// [`Playlist::from_raw`] enforces which ones are required.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct RawPlaylist {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub duration_secs: Option<u64>,
    pub created: Option<String>,
    pub last_updated: Option<String>,
    pub last_item_added_at: Option<String>,
    #[serde(default)]
    pub tracks: Vec<RawTrack>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct RawTrack {
    pub name: Option<String>,
    #[serde(default)]
    pub artists: Vec<String>,
    pub album_id: Option<String>,
    pub album_name: Option<String>,
    pub album_artist: Option<String>,
    pub track_num: Option<u32>,
    pub disc_num: Option<u32>,
}

// ============================================================================
// Playlist Models
// ============================================================================

/// One playlist entry. Immutable once built.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Track {
    pub position: usize, // 0-indexed playlist position
    pub name: String,
    pub artists: Vec<String>,
    pub album_id: String,
    pub album_name: String,
    pub album_artist: String, // Raw album artist, may disagree across tracks
    pub track_num: u32,
    pub disc_num: u32,
}

impl Track {
    pub fn from_raw(position: usize, raw: RawTrack) -> Result<Self> {
        let album_id = require(format!("album for track {}", position + 1), raw.album_id)?;
        let album_name = require(format!("album_name for {}", album_id), raw.album_name)?;
        let album_artist = require(format!("album_artist for {}", album_name), raw.album_artist)?;
        let name = require(format!("name for track {}", position + 1), raw.name)?;
        if raw.artists.is_empty() {
            return Err(crate::error::Error::NullValue {
                field: format!("artists for {}", name),
            });
        }

        let track_num = require(format!("track_num for track {}", position + 1), raw.track_num)?;
        let disc_num = require(format!("disc_num for track {}", position + 1), raw.disc_num)?;
        for (field, value) in [("track_num", track_num), ("disc_num", disc_num)] {
            if value == 0 {
                return Err(crate::error::Error::validation(
                    format!("{} for track {}", field, position + 1),
                    "0",
                    "must be a positive integer",
                ));
            }
        }

        Ok(Self {
            position,
            name,
            artists: raw.artists,
            album_id,
            album_name,
            album_artist,
            track_num,
            disc_num,
        })
    }

    pub fn normalized_name(&self) -> String {
        normalize_name(&self.name)
    }

    pub fn normalized_artists(&self) -> Vec<String> {
        self.artists.iter().map(|a| normalize_name(a)).collect()
    }

    /// 1-based position as shown to the operator
    pub fn display_position(&self) -> usize {
        self.position + 1
    }
}

/// Playlist with its metadata and ordered tracks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    pub description: String,
    pub duration_secs: u64,
    pub created: String,
    pub last_updated: String,
    pub last_item_added_at: String,
    pub tracks: Vec<Track>,
}

impl Playlist {
    /// Build the immutable playlist, failing on the first missing required field.
    pub fn from_raw(raw: RawPlaylist) -> Result<Self> {
        let tracks = raw
            .tracks
            .into_iter()
            .enumerate()
            .map(|(position, t)| Track::from_raw(position, t))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            id: require("id", raw.id)?,
            name: require("name", raw.name)?,
            description: require("description", raw.description)?,
            duration_secs: require("duration", raw.duration_secs)?,
            created: require("created", raw.created)?,
            last_updated: require("last_updated", raw.last_updated)?,
            last_item_added_at: require("last_item_added_at", raw.last_item_added_at)?,
            tracks,
        })
    }
}

impl fmt::Display for Playlist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Playlist(id={}, name={}, tracks={})", self.id, self.name, self.tracks.len())
    }
}

// ============================================================================
// Local Files
// ============================================================================

/// Audio file found by the folder scanner.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LocalFile {
    pub path: PathBuf,
}

impl LocalFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Normalized `(artist, track)` parsed from the filename.
    pub fn parse(&self) -> std::result::Result<(String, String), FileParseError> {
        parse_filename(&self.path)
    }

    /// Extension including the leading dot, original case; empty if none.
    pub fn extension(&self) -> String {
        self.path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

// ============================================================================
// Match Results
// ============================================================================

/// Confirmed pairing of a playlist track with a local file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Match {
    pub track: Track,
    pub local_file: LocalFile,
    pub album_artist: String, // Consolidated for the track's album
}

// ============================================================================
// Verification Report
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ParsingFailure {
    pub path: PathBuf,
    pub reason: String,
}

impl From<FileParseError> for ParsingFailure {
    fn from(e: FileParseError) -> Self {
        Self {
            path: e.path,
            reason: e.reason,
        }
    }
}

impl fmt::Display for ParsingFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let err = FileParseError::new(self.path.clone(), self.reason.clone());
        write!(f, "{}: {}", self.path.display(), err)
    }
}

/// Track found by name, but no local artist equals any playlist artist.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ArtistMismatch {
    pub position: usize,
    pub name: String,
    pub expected_artists: Vec<String>,
    pub local_artists: Vec<String>,
}

impl fmt::Display for ArtistMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Position {}: Track '{}' found locally with artists {:?} but playlist expects {:?}",
            self.position + 1,
            self.name,
            self.local_artists,
            self.expected_artists
        )
    }
}

/// No local file carries the track's normalized name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MissingTrack {
    pub position: usize,
    pub name: String,
    pub artists: Vec<String>,
}

impl fmt::Display for MissingTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Position {}: '{}' by {}",
            self.position + 1,
            self.name,
            self.artists.join(", ")
        )
    }
}

/// Everything that kept a reconciliation run from verifying.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct VerificationReport {
    pub parsing_failures: Vec<ParsingFailure>,
    pub artist_mismatches: Vec<ArtistMismatch>,
    pub missing: Vec<MissingTrack>,
}

impl VerificationReport {
    pub fn is_empty(&self) -> bool {
        self.parsing_failures.is_empty()
            && self.artist_mismatches.is_empty()
            && self.missing.is_empty()
    }

    pub fn len(&self) -> usize {
        self.parsing_failures.len() + self.artist_mismatches.len() + self.missing.len()
    }

    /// Write the report to a JSON file
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

impl fmt::Display for VerificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if !self.parsing_failures.is_empty() {
            parts.push(format!("{} files failed to parse", self.parsing_failures.len()));
        }
        if !self.artist_mismatches.is_empty() {
            parts.push(format!("{} tracks have incorrect artists", self.artist_mismatches.len()));
        }
        if !self.missing.is_empty() {
            parts.push(format!("{} tracks not found locally", self.missing.len()));
        }
        write!(f, "Playlist verification failed: {}", parts.join(", "))?;

        write_group(f, "Parsing errors", &self.parsing_failures)?;
        write_group(f, "Artist mismatches", &self.artist_mismatches)?;
        write_group(f, "Tracks missing locally", &self.missing)
    }
}

// ============================================================================
// Statistics
// ============================================================================

/// Summary logged after every reconciliation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReconcileSummary {
    pub playlist: String,
    pub total_tracks: usize,
    pub matched: usize,
    pub missing: usize,
    pub unique_albums: usize,
    pub unique_artists: usize,
    pub duration: String,
    pub match_rate: f64,
}

impl ReconcileSummary {
    pub fn new(playlist: &Playlist, matched: usize) -> Self {
        let total_tracks = playlist.tracks.len();
        let unique_albums: FxHashSet<&str> =
            playlist.tracks.iter().map(|t| t.album_name.as_str()).collect();
        let unique_artists: FxHashSet<&str> = playlist
            .tracks
            .iter()
            .flat_map(|t| t.artists.iter().map(String::as_str))
            .collect();

        Self {
            playlist: playlist.name.clone(),
            total_tracks,
            matched,
            missing: total_tracks.saturating_sub(matched),
            unique_albums: unique_albums.len(),
            unique_artists: unique_artists.len(),
            duration: format_playlist_duration(playlist.duration_secs),
            match_rate: if total_tracks == 0 {
                0.0
            } else {
                100.0 * matched as f64 / total_tracks as f64
            },
        }
    }

    /// Log the summary block
    pub fn log(&self) {
        tracing::info!("{:=<60}", "");
        tracing::info!("PLAYLIST VERIFICATION SUMMARY");
        tracing::info!("{:=<60}", "");
        tracing::info!("Playlist: {}", self.playlist);
        tracing::info!("Total tracks in playlist: {}", self.total_tracks);
        tracing::info!("Tracks available locally: {}", self.matched);
        tracing::info!("Missing tracks: {}", self.missing);
        tracing::info!("Unique albums: {}", self.unique_albums);
        tracing::info!("Unique artists: {}", self.unique_artists);
        tracing::info!("Total duration: {}", self.duration);
        tracing::info!("Match rate: {:.1}%", self.match_rate);
        tracing::info!("{:=<60}", "");
    }
}

/// Format seconds as `Hh Mm Ss`, or `Mm Ss` under an hour
pub fn format_playlist_duration(total_secs: u64) -> String {
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else {
        format!("{}m {}s", minutes, seconds)
    }
}
