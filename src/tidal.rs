//! Tidal API client for playlist fetching.
//!
//! Authenticates with an OAuth session file as written by the common Tidal
//! session tooling (`{"token_type": {"data": ..}, "access_token": {"data": ..}}`).
//! Tokens are not refreshed; an expired session surfaces as a login error.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::models::{RawPlaylist, RawTrack};
use crate::source::PlaylistSource;

const API_BASE: &str = "https://api.tidal.com/v1";
const PAGE_SIZE: usize = 100;
const USER_AGENT: &str = concat!("playlist-reconcile/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// SESSION FILE
// ============================================================================

#[derive(Debug, Deserialize)]
struct SessionValue<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct SessionFile {
    token_type: SessionValue<String>,
    access_token: SessionValue<String>,
}

// ============================================================================
// API RESPONSE TYPES
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiSession {
    country_code: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiPlaylist {
    uuid: Option<String>,
    title: Option<String>,
    description: Option<String>,
    duration: Option<u64>,
    created: Option<String>,
    last_updated: Option<String>,
    last_item_added_at: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiPage {
    #[serde(default)]
    items: Vec<ApiItem>,
    total_number_of_items: usize,
}

#[derive(Debug, Deserialize)]
struct ApiItem {
    item: serde_json::Value,
    #[serde(rename = "type")]
    item_type: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiTrack {
    title: Option<String>,
    version: Option<String>,
    #[serde(default)]
    artists: Vec<ApiArtist>,
    album: Option<ApiAlbum>,
    track_number: Option<u32>,
    volume_number: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ApiArtist {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ApiAlbum {
    id: Option<serde_json::Value>,
    title: Option<String>,
}

// ============================================================================
// CONVERSION
// ============================================================================

/// Title plus ` (version)` unless the title already mentions the version.
fn full_name(title: &str, version: Option<&str>) -> String {
    match version {
        Some(v) if !v.is_empty() && !title.contains(v) => format!("{} ({})", title, v),
        _ => title.to_string(),
    }
}

impl From<ApiTrack> for RawTrack {
    fn from(t: ApiTrack) -> Self {
        let artists: Vec<String> = t.artists.into_iter().map(|a| a.name).collect();
        let (album_id, album_name) = match t.album {
            Some(album) => (
                album.id.map(|id| match id {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                }),
                album.title,
            ),
            None => (None, None),
        };

        RawTrack {
            name: t.title.as_deref().map(|title| full_name(title, t.version.as_deref())),
            // Partial album objects carry no artist; the main track artist stands in
            album_artist: artists.first().cloned(),
            artists,
            album_id,
            album_name,
            track_num: t.track_number,
            disc_num: t.volume_number,
        }
    }
}

// ============================================================================
// CLIENT
// ============================================================================

/// Blocking Tidal client; logs in lazily on the first fetch.
pub struct TidalClient {
    session_file: PathBuf,
    agent: ureq::Agent,
    authorization: Option<String>,
    country_code: Option<String>,
}

impl TidalClient {
    pub fn new(session_file: impl Into<PathBuf>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build();
        Self {
            session_file: session_file.into(),
            agent,
            authorization: None,
            country_code: None,
        }
    }

    pub fn session_file(&self) -> &Path {
        &self.session_file
    }

    pub fn is_logged_in(&self) -> bool {
        self.authorization.is_some() && self.country_code.is_some()
    }

    /// Load the session file and resolve the account's country code.
    pub fn login(&mut self) -> Result<()> {
        tracing::debug!("Logging into Tidal with {}", self.session_file.display());
        let session_path = self.session_file.display();
        let text = fs::read_to_string(&self.session_file)
            .map_err(|e| Error::remote("login", format!("{}: {}", session_path, e)))?;
        let session: SessionFile = serde_json::from_str(&text)
            .map_err(|e| Error::remote("login", format!("invalid session file: {}", e)))?;

        let authorization = format!("{} {}", session.token_type.data, session.access_token.data);
        let api_session: ApiSession = self
            .agent
            .get(&format!("{}/sessions", API_BASE))
            .set("Authorization", &authorization)
            .call()
            .map_err(|e| Error::remote("login", describe(e)))?
            .into_json()
            .map_err(|e| Error::remote("login", e))?;

        self.authorization = Some(authorization);
        self.country_code = Some(api_session.country_code);
        Ok(())
    }

    fn get<T: serde::de::DeserializeOwned>(
        &self,
        operation: &str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let (Some(authorization), Some(country_code)) = (&self.authorization, &self.country_code)
        else {
            return Err(Error::remote(operation, "not logged in"));
        };

        let mut request = self
            .agent
            .get(&format!("{}{}", API_BASE, path))
            .set("Authorization", authorization)
            .query("countryCode", country_code);
        for (key, value) in query {
            request = request.query(key, value);
        }

        request
            .call()
            .map_err(|e| Error::remote(operation, describe(e)))?
            .into_json()
            .map_err(|e| Error::remote(operation, e))
    }
}

impl PlaylistSource for TidalClient {
    fn fetch_raw(&mut self, playlist_id: &str) -> Result<RawPlaylist> {
        if !self.is_logged_in() {
            self.login()?;
        }

        tracing::debug!("Fetching playlist with ID {}", playlist_id);
        let operation = "fetch playlist";
        let playlist: ApiPlaylist = self
            .get(operation, &format!("/playlists/{}", playlist_id), &[])
            .map_err(|e| match e {
                Error::RemoteService { details, .. } => Error::remote(
                    operation,
                    format!("Failed to fetch playlist {}: {}", playlist_id, details),
                ),
                other => other,
            })?;

        let mut tracks = Vec::new();
        let mut offset = 0;
        loop {
            let page: ApiPage = self.get(
                "fetch playlist tracks",
                &format!("/playlists/{}/items", playlist_id),
                &[("limit", PAGE_SIZE.to_string()), ("offset", offset.to_string())],
            )?;
            let fetched = page.items.len();
            for item in page.items.into_iter().filter(|i| i.item_type == "track") {
                let track: ApiTrack = serde_json::from_value(item.item)
                    .map_err(|e| Error::remote("fetch playlist tracks", e))?;
                tracks.push(RawTrack::from(track));
            }

            offset += fetched;
            if fetched == 0 || offset >= page.total_number_of_items {
                break;
            }
        }

        Ok(RawPlaylist {
            id: playlist.uuid,
            name: playlist.title,
            description: playlist.description,
            duration_secs: playlist.duration,
            created: playlist.created,
            last_updated: playlist.last_updated,
            last_item_added_at: playlist.last_item_added_at,
            tracks,
        })
    }
}

/// Readable description of a ureq failure, including the HTTP status.
fn describe(err: ureq::Error) -> String {
    match err {
        ureq::Error::Status(401, _) => "HTTP 401: session rejected (expired token?)".to_string(),
        ureq::Error::Status(404, _) => "HTTP 404: not found".to_string(),
        ureq::Error::Status(code, response) => {
            format!("HTTP {}: {}", code, response.status_text())
        }
        ureq::Error::Transport(t) => t.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Track;
    use tempfile::tempdir;

    #[test]
    fn test_full_name_appends_version_once() {
        assert_eq!(full_name("Song", Some("Remastered")), "Song (Remastered)");
        assert_eq!(full_name("Song (Remastered)", Some("Remastered")), "Song (Remastered)");
        assert_eq!(full_name("Song", Some("")), "Song");
        assert_eq!(full_name("Song", None), "Song");
    }

    #[test]
    fn test_track_item_converts_to_raw_track() {
        let json = r#"{
            "id": 123,
            "title": "Song B",
            "version": null,
            "trackNumber": 2,
            "volumeNumber": 1,
            "artists": [{"id": 1, "name": "X"}, {"id": 2, "name": "Y"}],
            "album": {"id": 77, "title": "Alb1", "cover": "abc"}
        }"#;
        let api: ApiTrack = serde_json::from_str(json).unwrap();
        let track = Track::from_raw(1, RawTrack::from(api)).unwrap();

        assert_eq!(track.name, "Song B");
        assert_eq!(track.artists, vec!["X".to_string(), "Y".to_string()]);
        assert_eq!(track.album_id, "77");
        assert_eq!(track.album_name, "Alb1");
        assert_eq!(track.album_artist, "X");
        assert_eq!(track.track_num, 2);
    }

    #[test]
    fn test_page_keeps_item_types() {
        let json = r#"{
            "limit": 100, "offset": 0, "totalNumberOfItems": 2,
            "items": [
                {"item": {"title": "A"}, "type": "track"},
                {"item": {"title": "Clip"}, "type": "video"}
            ]
        }"#;
        let page: ApiPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.total_number_of_items, 2);
        let tracks: Vec<_> = page.items.iter().filter(|i| i.item_type == "track").collect();
        assert_eq!(tracks.len(), 1);
    }

    #[test]
    fn test_login_with_missing_session_file() {
        let dir = tempdir().unwrap();
        let mut client = TidalClient::new(dir.path().join("tidal-session-oauth.json"));
        let err = client.login().unwrap_err();
        assert!(err.to_string().starts_with("Remote service error during login"));
        assert!(!client.is_logged_in());
    }

    #[test]
    fn test_login_with_malformed_session_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, r#"{"token_type": "Bearer"}"#).unwrap();

        let err = TidalClient::new(&path).login().unwrap_err();
        assert!(err.to_string().contains("invalid session file"));
    }
}
