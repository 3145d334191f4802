//! Reconciliation of playlist tracks against local files.
//!
//! Matching is exact on normalized names:
//! 1. Index local files by normalized track name (scan order kept per name)
//! 2. Walk the playlist in order; the first unused candidate whose artist
//!    equals any of the track's artists wins, and each file is used once
//! 3. Anything unmatched or unparsable lands in the [`VerificationReport`];
//!    a non-empty report fails the whole run

use rustc_hash::FxHashSet;
use std::path::{Path, PathBuf};

use crate::consolidate::build_album_artist_map;
use crate::error::{Error, Result};
use crate::models::{
    ArtistMismatch, LocalFile, LocalTrackIndex, Match, MissingTrack, Playlist, ReconcileSummary,
    Track, VerificationReport,
};

/// Outcome of one reconciliation run, before the all-or-nothing check.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Reconciliation {
    pub matches: Vec<Match>,
    pub report: VerificationReport,
}

impl Reconciliation {
    /// Matches if nothing was reported, otherwise the full report as an error.
    pub fn into_verified(self) -> Result<Vec<Match>> {
        if self.report.is_empty() {
            Ok(self.matches)
        } else {
            Err(Error::PlaylistVerification(self.report))
        }
    }
}

/// Index local files by normalized track name. Unparsable files are recorded
/// in `report` and left out of the index.
pub fn build_local_index(files: &[LocalFile], report: &mut VerificationReport) -> LocalTrackIndex {
    let mut index = LocalTrackIndex::default();
    for file in files {
        match file.parse() {
            Ok((artist, track)) => {
                index.entry(track).or_default().push((artist, file.path.clone()))
            }
            Err(e) => {
                tracing::debug!("{}", e);
                report.parsing_failures.push(e.into());
            }
        }
    }
    index
}

/// Match every playlist track to at most one local file.
pub fn reconcile(tracks: &[Track], files: &[LocalFile]) -> Reconciliation {
    let album_artists = build_album_artist_map(tracks);
    let mut report = VerificationReport::default();
    let index = build_local_index(files, &mut report);
    let mut matches = Vec::with_capacity(tracks.len());
    let mut consumed: FxHashSet<PathBuf> = FxHashSet::default();

    for track in tracks {
        // A file already matched to an earlier position is not a candidate
        let candidates: Vec<&(String, PathBuf)> = index
            .get(&track.normalized_name())
            .map(|all| all.iter().filter(|(_, path)| !consumed.contains(path)).collect())
            .unwrap_or_default();
        if candidates.is_empty() {
            report.missing.push(MissingTrack {
                position: track.position,
                name: track.name.clone(),
                artists: track.artists.clone(),
            });
            continue;
        }

        let wanted = track.normalized_artists();
        let found = candidates
            .iter()
            .find(|(local_artist, _)| wanted.iter().any(|a| a == local_artist));

        match found {
            Some((_, path)) => {
                consumed.insert(path.clone());
                let album_artist = album_artists
                    .get(&track.album_id)
                    .cloned()
                    .unwrap_or_else(|| track.album_artist.clone());
                matches.push(Match {
                    track: track.clone(),
                    local_file: LocalFile::new(path.clone()),
                    album_artist,
                });
            }
            None => report.artist_mismatches.push(ArtistMismatch {
                position: track.position,
                name: track.name.clone(),
                expected_artists: track.artists.clone(),
                local_artists: candidates.iter().map(|(artist, _)| artist.clone()).collect(),
            }),
        }
    }

    Reconciliation { matches, report }
}

/// Reconcile a playlist, log its summary, and require a clean report.
///
/// With `report_path` the report is written before the check, clean or not.
pub fn verify_playlist(
    playlist: &Playlist,
    files: &[LocalFile],
    report_path: Option<&Path>,
) -> Result<(Vec<Match>, ReconcileSummary)> {
    let reconciliation = reconcile(&playlist.tracks, files);
    let summary = ReconcileSummary::new(playlist, reconciliation.matches.len());
    summary.log();

    if let Some(path) = report_path {
        reconciliation.report.write_to_file(path)?;
        tracing::info!("Verification report written to {}", path.display());
    }

    Ok((reconciliation.into_verified()?, summary))
}
