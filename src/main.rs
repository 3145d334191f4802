use anyhow::{bail, Context, Result};
use clap::{ArgGroup, Parser};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use playlist_reconcile::execute::Mode;
use playlist_reconcile::pipeline::{self, parse_folder_list, RunOptions};
use playlist_reconcile::source::{JsonPlaylistSource, PlaylistSource};
use playlist_reconcile::tidal::TidalClient;

#[derive(Parser)]
#[command(name = "playlist-reconcile")]
#[command(about = "Match a playlist against local audio files and organize them by album")]
#[command(group(ArgGroup::new("mode").args(["copy", "move_files"])))]
struct Args {
    /// Comma-separated list of folders holding `Artist - Title.ext` files
    #[arg(env = "PLAYLIST_RECONCILE_INPUT_FOLDERS")]
    input_folders: String,

    /// Root of the organized output tree
    #[arg(long, env = "PLAYLIST_RECONCILE_OUT")]
    out: PathBuf,

    /// Copy matched files into the output tree
    #[arg(long)]
    copy: bool,

    /// Move matched files into the output tree
    #[arg(long = "move")]
    move_files: bool,

    /// Log planned operations without touching the filesystem
    #[arg(long)]
    dry_run: bool,

    #[arg(long, env = "PLAYLIST_RECONCILE_TIDAL_PLAYLIST_ID", conflicts_with = "playlist_json")]
    tidal_playlist_id: Option<String>,

    #[arg(long, env = "TIDAL_SESSION_FILE", default_value = "tidal-session-oauth.json")]
    tidal_session_file: PathBuf,

    /// Playlist export to use instead of the Tidal API
    #[arg(long, env = "PLAYLIST_RECONCILE_PLAYLIST_JSON")]
    playlist_json: Option<PathBuf>,

    /// Write the verification report (JSON) here
    #[arg(long)]
    report: Option<PathBuf>,

    /// Write run statistics (JSON) here
    #[arg(long)]
    stats: Option<PathBuf>,

    /// Disable progress bars, log progress lines instead
    #[arg(long)]
    log_only: bool,
}

impl Args {
    fn mode(&self) -> Option<Mode> {
        match (self.copy, self.move_files) {
            (true, _) => Some(Mode::Copy),
            (_, true) => Some(Mode::Move),
            _ => None,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "playlist_reconcile=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let input_folders = parse_folder_list(&args.input_folders);
    if input_folders.is_empty() {
        bail!("No input folders given in '{}'", args.input_folders);
    }

    let options = RunOptions {
        input_folders,
        output: args.out.clone(),
        mode: args.mode(),
        dry_run: args.dry_run,
        log_only: args.log_only,
        report_path: args.report.clone(),
        stats_path: args.stats.clone(),
    };

    let (mut source, playlist_id): (Box<dyn PlaylistSource>, String) =
        match (&args.playlist_json, &args.tidal_playlist_id) {
            (Some(path), _) => (Box::new(JsonPlaylistSource::new(path)), String::new()),
            (None, Some(id)) => (Box::new(TidalClient::new(&args.tidal_session_file)), id.clone()),
            (None, None) => {
                pipeline::validate_only(&options).context("Input folder validation failed")?;
                return Ok(());
            }
        };

    let stats = pipeline::run(&options, source.as_mut(), &playlist_id)
        .context("Playlist reconciliation failed")?;

    println!("\n{:=<60}", "");
    println!("Reconciliation complete!");
    println!("  Playlist: {}", stats.reconcile.playlist);
    println!("  Matched: {}/{}", stats.reconcile.matched, stats.reconcile.total_tracks);
    println!("  Copied: {}", stats.execution.copied);
    println!("  Moved: {}", stats.execution.moved);
    println!("  Skipped: {}", stats.execution.skipped);
    if args.dry_run {
        println!("  Planned: {}", stats.execution.planned);
    }
    println!("  Elapsed: {:.2}s", stats.elapsed_seconds);
    println!("{:=<60}", "");

    Ok(())
}
