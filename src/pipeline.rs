//! End-to-end run: validate folders, fetch the playlist, reconcile, and
//! apply the plan.

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::error::{Error, Result};
use crate::execute::{execute_plan, ExecutionSummary, Mode};
use crate::models::{Playlist, ReconcileSummary};
use crate::progress::format_duration;
use crate::reconcile::verify_playlist;
use crate::safety::validate_output_root;
use crate::scan::{scan_audio_files, validate_input_folders};
use crate::source::{fetch_playlist, PlaylistSource};

/// Everything one run needs besides the playlist source.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub input_folders: Vec<PathBuf>,
    pub output: PathBuf,
    pub mode: Option<Mode>,
    pub dry_run: bool,
    pub log_only: bool,
    /// Write the verification report here, whether or not it is clean
    pub report_path: Option<PathBuf>,
    /// Write the run statistics here on success
    pub stats_path: Option<PathBuf>,
}

/// Statistics of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct RunStats {
    pub reconcile: ReconcileSummary,
    pub execution: ExecutionSummary,
    pub elapsed_seconds: f64,
}

impl RunStats {
    /// Write stats to a JSON file
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Split a comma-separated folder list, trimming entries and dropping empty ones.
pub fn parse_folder_list(list: &str) -> Vec<PathBuf> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .collect()
}

/// Fetch the playlist and run the reconciliation pipeline.
pub fn run(
    options: &RunOptions,
    source: &mut dyn PlaylistSource,
    playlist_id: &str,
) -> Result<RunStats> {
    validate_input_folders(&options.input_folders)?;
    let inputs: Vec<&Path> = options.input_folders.iter().map(PathBuf::as_path).collect();
    validate_output_root(&options.output, &inputs)?;

    let playlist = fetch_playlist(source, playlist_id)?;
    reconcile_and_apply(options, &playlist)
}

/// Validate folders, then reconcile an already fetched playlist and apply the plan.
pub fn run_with_playlist(options: &RunOptions, playlist: &Playlist) -> Result<RunStats> {
    validate_input_folders(&options.input_folders)?;
    let inputs: Vec<&Path> = options.input_folders.iter().map(PathBuf::as_path).collect();
    validate_output_root(&options.output, &inputs)?;
    reconcile_and_apply(options, playlist)
}

fn reconcile_and_apply(options: &RunOptions, playlist: &Playlist) -> Result<RunStats> {
    let start = Instant::now();
    let files = scan_audio_files(&options.input_folders)?;
    tracing::info!(
        "Scanned {} audio files in {} folder(s)",
        files.len(),
        options.input_folders.len()
    );

    let (matches, summary) = verify_playlist(playlist, &files, options.report_path.as_deref())?;

    let execution = execute_plan(
        &matches,
        &options.output,
        options.mode,
        options.dry_run,
        options.log_only,
    )?;

    let elapsed = start.elapsed();
    tracing::info!(
        "Done in {}: {} copied, {} moved, {} skipped, {} planned",
        format_duration(elapsed),
        execution.copied,
        execution.moved,
        execution.skipped,
        execution.planned
    );

    let stats = RunStats {
        reconcile: summary,
        execution,
        elapsed_seconds: elapsed.as_secs_f64(),
    };
    if let Some(path) = &options.stats_path {
        stats.write_to_file(path)?;
    }
    Ok(stats)
}

/// Validate folders only (no playlist source configured).
pub fn validate_only(options: &RunOptions) -> Result<()> {
    validate_input_folders(&options.input_folders)?;
    if options.input_folders.is_empty() {
        return Err(Error::validation("input_folders", "empty list", "No input folders provided"));
    }
    tracing::info!(
        "No playlist source given; {} input folder(s) validated",
        options.input_folders.len()
    );
    Ok(())
}
