//! Album-artist consolidation.
//!
//! Compilations and features make the per-track album artist disagree across
//! an album. Folder names need one stable value per album, chosen here by how
//! often each artist is credited on the album's tracks.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::models::{AlbumArtistMap, Track};

pub const UNKNOWN_ARTIST: &str = "Unknown Artist";
pub const VARIOUS_ARTISTS: &str = "Various Artists";

/// Pick one album-artist for the tracks of a single album.
///
/// - one most-credited artist wins outright
/// - two tied artists become `"A & B"` in lexical order
/// - three or more tied artists become `"Various Artists"`
pub fn consolidate_album_artist(tracks: &[&Track]) -> String {
    let Some(first) = tracks.first() else {
        return UNKNOWN_ARTIST.to_string();
    };

    let mut counts: FxHashMap<&str, usize> = FxHashMap::default();
    for track in tracks {
        for artist in &track.artists {
            *counts.entry(artist.as_str()).or_default() += 1;
        }
    }

    let Some(max_count) = counts.values().copied().max() else {
        // No credited artists anywhere: trust the service's album artist
        return first.album_artist.clone();
    };

    let mut top: Vec<&str> = counts
        .into_iter()
        .filter(|&(_, count)| count == max_count)
        .map(|(artist, _)| artist)
        .collect();
    top.sort_unstable();

    match top.len() {
        1 => top[0].to_string(),
        2 => top.join(" & "),
        _ => VARIOUS_ARTISTS.to_string(),
    }
}

/// Consolidate every album of the playlist once, keyed by album id.
pub fn build_album_artist_map(tracks: &[Track]) -> AlbumArtistMap {
    // Albums in first-appearance order so logging follows the playlist
    let mut order: Vec<&str> = Vec::new();
    let mut albums: FxHashMap<&str, Vec<&Track>> = FxHashMap::default();
    for track in tracks {
        let group = albums.entry(track.album_id.as_str()).or_insert_with(|| {
            order.push(track.album_id.as_str());
            Vec::new()
        });
        group.push(track);
    }

    let mut map = AlbumArtistMap::default();
    for album_id in order {
        let album_tracks = &albums[album_id];
        let consolidated = consolidate_album_artist(album_tracks);

        let unique_artists: FxHashSet<&str> = album_tracks
            .iter()
            .flat_map(|t| t.artists.iter().map(String::as_str))
            .collect();
        if unique_artists.len() > 1 {
            tracing::info!(
                "Album '{}' has {} unique artists, using '{}' as folder name",
                album_tracks[0].album_name,
                unique_artists.len(),
                consolidated
            );
        }

        map.insert(album_id.to_string(), consolidated);
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(position: usize, artists: &[&str], album_id: &str) -> Track {
        Track {
            position,
            name: format!("Song {position}"),
            artists: artists.iter().map(|a| a.to_string()).collect(),
            album_id: album_id.to_string(),
            album_name: format!("Album {album_id}"),
            album_artist: "Service Artist".to_string(),
            track_num: position as u32 + 1,
            disc_num: 1,
        }
    }

    fn consolidate(tracks: &[Track]) -> String {
        let refs: Vec<&Track> = tracks.iter().collect();
        consolidate_album_artist(&refs)
    }

    #[test]
    fn test_single_dominant_artist_with_outlier() {
        let tracks = vec![
            track(0, &["Main"], "a"),
            track(1, &["Main"], "a"),
            track(2, &["Main"], "a"),
            track(3, &["Guest"], "a"),
        ];
        assert_eq!(consolidate(&tracks), "Main");
    }

    #[test]
    fn test_two_way_tie_sorted_lexically() {
        let tracks = vec![track(0, &["Zed"], "a"), track(1, &["Alpha"], "a")];
        assert_eq!(consolidate(&tracks), "Alpha & Zed");

        let reversed = vec![track(0, &["Alpha"], "a"), track(1, &["Zed"], "a")];
        assert_eq!(consolidate(&reversed), "Alpha & Zed");
    }

    #[test]
    fn test_three_way_tie_is_various_artists() {
        let tracks = vec![track(0, &["A"], "a"), track(1, &["B"], "a"), track(2, &["C"], "a")];
        assert_eq!(consolidate(&tracks), VARIOUS_ARTISTS);
    }

    #[test]
    fn test_multi_artist_track_counts_each_artist() {
        let tracks = vec![
            track(0, &["X"], "a"),
            track(1, &["X", "Y"], "a"),
            track(2, &["Z"], "a"),
        ];
        assert_eq!(consolidate(&tracks), "X");
    }

    #[test]
    fn test_empty_album_is_unknown() {
        assert_eq!(consolidate_album_artist(&[]), UNKNOWN_ARTIST);
    }

    #[test]
    fn test_no_artists_falls_back_to_album_artist() {
        let tracks = vec![track(0, &[], "a"), track(1, &[], "a")];
        assert_eq!(consolidate(&tracks), "Service Artist");
    }

    #[test]
    fn test_map_has_one_entry_per_album() {
        let tracks = vec![
            track(0, &["A"], "one"),
            track(1, &["B"], "two"),
            track(2, &["A"], "one"),
            track(3, &["C"], "two"),
        ];
        let map = build_album_artist_map(&tracks);
        assert_eq!(map.len(), 2);
        assert_eq!(map["one"], "A");
        assert_eq!(map["two"], "B & C");
    }
}
