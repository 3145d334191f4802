//! Plan execution: copy or move matched files into the destination tree.
//!
//! An existing destination is never overwritten; the operation is skipped,
//! which makes re-running over a partially built tree safe.

use rustc_hash::FxHashSet;
use serde::Serialize;
use std::fmt;
use std::fs::{self, File, FileTimes};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::models::Match;
use crate::plan::destination_path;
use crate::progress::{create_progress_bar, log_progress};

/// How matched files reach the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Mode {
    Copy,
    Move,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Copy => write!(f, "copy"),
            Mode::Move => write!(f, "move"),
        }
    }
}

/// What [`apply`] did (or, in a dry run, would do) for one match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Neither copy nor move was requested
    NoOp,
    Copied(PathBuf),
    Moved(PathBuf),
    /// Destination already present; nothing was touched
    Skipped(PathBuf),
    /// Dry run: the operation that would run and its destination
    Planned(Mode, PathBuf),
}

/// Counters for one plan execution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExecutionSummary {
    pub copied: usize,
    pub moved: usize,
    pub skipped: usize,
    pub planned: usize,
    pub no_op: usize,
}

impl ExecutionSummary {
    pub fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::NoOp => self.no_op += 1,
            Outcome::Copied(_) => self.copied += 1,
            Outcome::Moved(_) => self.moved += 1,
            Outcome::Skipped(_) => self.skipped += 1,
            Outcome::Planned(..) => self.planned += 1,
        }
    }

    /// Number of files actually written or moved
    pub fn file_operations(&self) -> usize {
        self.copied + self.moved
    }
}

/// Apply one match: copy or move its file to the planned destination.
///
/// Dry runs perform the same checks but never touch the filesystem.
pub fn apply(m: &Match, root: &Path, mode: Option<Mode>, dry_run: bool) -> Result<Outcome> {
    let Some(mode) = mode else {
        return Ok(Outcome::NoOp);
    };

    let source = m.local_file.path();
    if !source.exists() {
        return Err(Error::file_operation("validate source", source, "Source file does not exist"));
    }

    let destination = destination_path(root, m);
    let position = m.track.display_position();

    if destination.exists() {
        tracing::info!(
            "Destination file already exists: {}. Skipping playlist position {}: {}",
            destination.display(),
            position,
            source.display()
        );
        return Ok(Outcome::Skipped(destination));
    }

    if dry_run {
        tracing::info!(
            "Would {} playlist position {}: {} -> {}",
            mode,
            position,
            source.display(),
            destination.display()
        );
        return Ok(Outcome::Planned(mode, destination));
    }

    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| Error::file_operation("create directory", parent, e))?;
    }

    let result = match mode {
        Mode::Copy => copy_preserving_metadata(source, &destination),
        Mode::Move => move_file(source, &destination),
    };
    result.map_err(|e| {
        Error::file_operation(
            mode.to_string(),
            source,
            format!("Failed to {} to {}: {}", mode, destination.display(), e),
        )
    })?;

    tracing::debug!(
        "{} playlist position {}: {} -> {}",
        match mode {
            Mode::Copy => "Copied",
            Mode::Move => "Moved",
        },
        position,
        source.display(),
        destination.display()
    );

    Ok(match mode {
        Mode::Copy => Outcome::Copied(destination),
        Mode::Move => Outcome::Moved(destination),
    })
}

/// Apply every match in order, stopping at the first failure.
///
/// Destinations are claimed per run: a later match planned onto a path an
/// earlier match already claimed is skipped, also during a dry run.
pub fn execute_plan(
    matches: &[Match],
    root: &Path,
    mode: Option<Mode>,
    dry_run: bool,
    log_only: bool,
) -> Result<ExecutionSummary> {
    let mut summary = ExecutionSummary::default();
    let mut claimed: FxHashSet<PathBuf> = FxHashSet::default();
    let total = matches.len() as u64;
    let label = match (mode, dry_run) {
        (None, _) => "Verifying",
        (Some(_), true) => "Planning",
        (Some(Mode::Copy), false) => "Copying",
        (Some(Mode::Move), false) => "Moving",
    };
    let pb = create_progress_bar(total, label, log_only || mode.is_none());

    for (i, m) in matches.iter().enumerate() {
        let destination = destination_path(root, m);
        let outcome = if mode.is_some() && claimed.contains(&destination) {
            tracing::warn!(
                "Playlist position {} maps to {} which another track already claimed; skipping",
                m.track.display_position(),
                destination.display()
            );
            Outcome::Skipped(destination)
        } else {
            claimed.insert(destination);
            match apply(m, root, mode, dry_run) {
                Ok(outcome) => outcome,
                Err(e) => {
                    pb.abandon();
                    return Err(e);
                }
            }
        };
        summary.record(&outcome);

        pb.inc(1);
        log_progress(label, i as u64 + 1, total, 100, log_only);
    }

    pb.finish_with_message(format!(
        "{}: {} copied, {} moved, {} skipped, {} planned",
        label, summary.copied, summary.moved, summary.skipped, summary.planned
    ));
    Ok(summary)
}

/// Copy file contents and permissions, then carry over access/modify times.
fn copy_preserving_metadata(source: &Path, destination: &Path) -> std::io::Result<()> {
    fs::copy(source, destination)?;
    let metadata = fs::metadata(source)?;
    let times = FileTimes::new()
        .set_accessed(metadata.accessed()?)
        .set_modified(metadata.modified()?);
    File::options().write(true).open(destination)?.set_times(times)
}

/// Rename, falling back to copy + remove when the rename cannot work (for
/// example across filesystems).
fn move_file(source: &Path, destination: &Path) -> std::io::Result<()> {
    if fs::rename(source, destination).is_ok() {
        return Ok(());
    }
    copy_preserving_metadata(source, destination)?;
    fs::remove_file(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LocalFile, Track};
    use tempfile::tempdir;

    fn matched(source: &Path, name: &str, track_num: u32) -> Match {
        Match {
            track: Track {
                position: track_num as usize - 1,
                name: name.to_string(),
                artists: vec!["X".to_string()],
                album_id: "alb".to_string(),
                album_name: "Alb1".to_string(),
                album_artist: "X".to_string(),
                track_num,
                disc_num: 1,
            },
            local_file: LocalFile::new(source),
            album_artist: "X".to_string(),
        }
    }

    fn setup(names: &[&str]) -> (tempfile::TempDir, tempfile::TempDir, Vec<Match>) {
        let input = tempdir().unwrap();
        let output = tempdir().unwrap();
        let matches = names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let src = input.path().join(format!("X - {name}.mp3"));
                fs::write(&src, name.as_bytes()).unwrap();
                matched(&src, name, i as u32 + 1)
            })
            .collect();
        (input, output, matches)
    }

    #[test]
    fn test_copy_creates_parent_and_keeps_source() {
        let (_input, output, matches) = setup(&["Song A"]);
        let outcome = apply(&matches[0], output.path(), Some(Mode::Copy), false).unwrap();

        let expected = output.path().join("X/Alb1/01 - X - Song A.mp3");
        assert_eq!(outcome, Outcome::Copied(expected.clone()));
        assert_eq!(fs::read(&expected).unwrap(), b"Song A");
        assert!(matches[0].local_file.path().exists());
    }

    #[test]
    fn test_copy_preserves_modified_time() {
        let (_input, output, matches) = setup(&["Song A"]);
        let src = matches[0].local_file.path();
        let old = std::time::SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(1_000_000_000);
        File::options()
            .write(true)
            .open(src)
            .unwrap()
            .set_times(FileTimes::new().set_modified(old))
            .unwrap();

        let outcome = apply(&matches[0], output.path(), Some(Mode::Copy), false).unwrap();
        let Outcome::Copied(dest) = outcome else {
            panic!("expected copy");
        };
        assert_eq!(fs::metadata(dest).unwrap().modified().unwrap(), old);
    }

    #[test]
    fn test_move_removes_source() {
        let (_input, output, matches) = setup(&["Song A"]);
        let outcome = apply(&matches[0], output.path(), Some(Mode::Move), false).unwrap();

        let expected = output.path().join("X/Alb1/01 - X - Song A.mp3");
        assert_eq!(outcome, Outcome::Moved(expected.clone()));
        assert!(expected.exists());
        assert!(!matches[0].local_file.path().exists());
    }

    #[test]
    fn test_no_mode_is_no_op() {
        let (_input, output, matches) = setup(&["Song A"]);
        assert_eq!(apply(&matches[0], output.path(), None, false).unwrap(), Outcome::NoOp);
        assert_eq!(fs::read_dir(output.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_dry_run_touches_nothing() {
        let (_input, output, matches) = setup(&["Song A"]);
        let outcome = apply(&matches[0], output.path(), Some(Mode::Move), true).unwrap();

        assert_eq!(
            outcome,
            Outcome::Planned(Mode::Move, output.path().join("X/Alb1/01 - X - Song A.mp3"))
        );
        assert!(matches[0].local_file.path().exists());
        assert_eq!(fs::read_dir(output.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_missing_source_is_error() {
        let (_input, output, matches) = setup(&["Song A"]);
        fs::remove_file(matches[0].local_file.path()).unwrap();

        for dry_run in [false, true] {
            let err = apply(&matches[0], output.path(), Some(Mode::Copy), dry_run).unwrap_err();
            match err {
                Error::FileOperation { operation, .. } => assert_eq!(operation, "validate source"),
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn test_existing_destination_skipped() {
        let (_input, output, matches) = setup(&["Song A"]);
        let dest = destination_path(output.path(), &matches[0]);
        fs::create_dir_all(dest.parent().unwrap()).unwrap();
        fs::write(&dest, b"already here").unwrap();

        let outcome = apply(&matches[0], output.path(), Some(Mode::Move), false).unwrap();
        assert_eq!(outcome, Outcome::Skipped(dest.clone()));
        assert_eq!(fs::read(&dest).unwrap(), b"already here");
        assert!(matches[0].local_file.path().exists());
    }

    #[test]
    fn test_rerun_over_complete_tree_does_nothing() {
        let (_input, output, matches) = setup(&["Song A", "Song B", "Song C"]);
        let first = execute_plan(&matches, output.path(), Some(Mode::Copy), false, true).unwrap();
        assert_eq!(first.copied, 3);

        let second = execute_plan(&matches, output.path(), Some(Mode::Copy), false, true).unwrap();
        assert_eq!(second.file_operations(), 0);
        assert_eq!(second.skipped, 3);
    }

    #[test]
    fn test_colliding_destinations_claimed_once() {
        let (input, output, mut matches) = setup(&["Song A"]);
        let twin = input.path().join("Other - Song A.mp3");
        fs::write(&twin, b"twin").unwrap();
        matches.push(matched(&twin, "Song A", 1));

        let planned = execute_plan(&matches, output.path(), Some(Mode::Copy), true, true).unwrap();
        assert_eq!(planned.planned, 1);
        assert_eq!(planned.skipped, 1);

        let applied = execute_plan(&matches, output.path(), Some(Mode::Copy), false, true).unwrap();
        assert_eq!(applied.copied, 1);
        assert_eq!(applied.skipped, 1);
        let dest = output.path().join("X/Alb1/01 - X - Song A.mp3");
        assert_eq!(fs::read(dest).unwrap(), b"Song A");
    }

    #[test]
    fn test_plan_stops_at_first_error() {
        let (_input, output, matches) = setup(&["Song A", "Song B", "Song C"]);
        fs::remove_file(matches[1].local_file.path()).unwrap();

        let err = execute_plan(&matches, output.path(), Some(Mode::Copy), false, true).unwrap_err();
        assert!(matches!(err, Error::FileOperation { .. }));
        assert!(output.path().join("X/Alb1/01 - X - Song A.mp3").exists());
        assert!(!output.path().join("X/Alb1/03 - X - Song C.mp3").exists());
    }
}
