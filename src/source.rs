//! Playlist sources.
//!
//! A source only delivers raw data; [`fetch_playlist`] turns it into the
//! immutable [`Playlist`] and enforces required fields.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::models::{Playlist, RawPlaylist};

/// Anything that can fetch a playlist by id.
pub trait PlaylistSource {
    /// Fetch the raw playlist. Every failure is a remote-service error
    /// naming the attempted operation.
    fn fetch_raw(&mut self, playlist_id: &str) -> Result<RawPlaylist>;
}

/// Fetch and validate a playlist from any source.
pub fn fetch_playlist(source: &mut dyn PlaylistSource, playlist_id: &str) -> Result<Playlist> {
    let raw = source.fetch_raw(playlist_id)?;
    let playlist = Playlist::from_raw(raw)?;
    tracing::info!("Fetched {} with {} tracks", playlist, playlist.tracks.len());
    Ok(playlist)
}

/// Playlist exported to a JSON file in the [`RawPlaylist`] shape.
#[derive(Debug, Clone)]
pub struct JsonPlaylistSource {
    path: PathBuf,
}

impl JsonPlaylistSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PlaylistSource for JsonPlaylistSource {
    fn fetch_raw(&mut self, playlist_id: &str) -> Result<RawPlaylist> {
        let text = fs::read_to_string(&self.path).map_err(|e| {
            Error::remote("read playlist export", format!("{}: {}", self.path.display(), e))
        })?;
        let raw: RawPlaylist = serde_json::from_str(&text).map_err(|e| {
            Error::remote("parse playlist export", format!("{}: {}", self.path.display(), e))
        })?;

        // An export may be used without an id; if it carries one it must agree
        if let Some(id) = raw.id.as_deref() {
            if !playlist_id.is_empty() && id != playlist_id {
                return Err(Error::remote(
                    "fetch playlist",
                    format!(
                        "Playlist with ID {} not found in {}",
                        playlist_id,
                        self.path.display()
                    ),
                ));
            }
        }
        Ok(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const EXPORT: &str = r#"{
        "id": "abc",
        "name": "Mix",
        "description": "",
        "duration_secs": 400,
        "created": "2024-01-01",
        "last_updated": "2024-01-02",
        "last_item_added_at": "2024-01-02",
        "tracks": [
            {"name": "Song A", "artists": ["X"], "album_id": "1", "album_name": "Alb1",
             "album_artist": "X", "track_num": 1, "disc_num": 1},
            {"name": "Song B", "artists": ["X", "Y"], "album_id": "1", "album_name": "Alb1",
             "album_artist": "X", "track_num": 2, "disc_num": 2}
        ]
    }"#;

    #[test]
    fn test_json_source_builds_playlist() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mix.json");
        fs::write(&path, EXPORT).unwrap();

        let mut source = JsonPlaylistSource::new(&path);
        let playlist = fetch_playlist(&mut source, "abc").unwrap();
        assert_eq!(playlist.name, "Mix");
        assert_eq!(playlist.tracks.len(), 2);
        assert_eq!(playlist.tracks[1].artists, vec!["X".to_string(), "Y".to_string()]);
        assert_eq!(playlist.tracks[1].disc_num, 2);
    }

    #[test]
    fn test_json_source_id_mismatch() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mix.json");
        fs::write(&path, EXPORT).unwrap();

        let err = fetch_playlist(&mut JsonPlaylistSource::new(&path), "other").unwrap_err();
        assert!(matches!(err, Error::RemoteService { .. }));
        assert!(err.to_string().contains("Playlist with ID other not found"));
    }

    #[test]
    fn test_json_source_missing_file() {
        let dir = tempdir().unwrap();
        let err = fetch_playlist(&mut JsonPlaylistSource::new(dir.path().join("nope.json")), "abc")
            .unwrap_err();
        assert!(err.to_string().starts_with("Remote service error during read playlist export"));
    }

    #[test]
    fn test_json_source_missing_disc_num_is_fatal() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mix.json");
        fs::write(&path, EXPORT.replace(", \"disc_num\": 2", "")).unwrap();

        let err = fetch_playlist(&mut JsonPlaylistSource::new(&path), "abc").unwrap_err();
        assert_eq!(err.to_string(), "Value is missing for field 'disc_num for track 2'");
    }

    #[test]
    fn test_json_source_null_field_is_fatal() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mix.json");
        fs::write(&path, EXPORT.replace("\"name\": \"Mix\",", "\"name\": null,")).unwrap();

        let err = fetch_playlist(&mut JsonPlaylistSource::new(&path), "abc").unwrap_err();
        assert_eq!(err.to_string(), "Value is missing for field 'name'");
    }
}
