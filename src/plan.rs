//! Destination planning.
//!
//! Layout: `<root>/<album artist>/<album>/<NN> - <artists> - <title><ext>`

use std::path::{Path, PathBuf};

use crate::models::Match;
use crate::safety::sanitize_component;

/// Filename for a matched track: `NN - Artist, Artist - Title.ext`.
///
/// The track number is padded to two digits; larger numbers keep all digits.
pub fn destination_file_name(m: &Match) -> String {
    let artists = sanitize_component(&m.track.artists.join(", "));
    let title = sanitize_component(&m.track.name);
    let name = format!(
        "{:02} - {} - {}{}",
        m.track.track_num,
        artists,
        title,
        m.local_file.extension()
    );
    sanitize_component(&name)
}

/// Full destination path for a match under `root`. Pure: touches nothing.
pub fn destination_path(root: &Path, m: &Match) -> PathBuf {
    root.join(sanitize_component(&m.album_artist))
        .join(sanitize_component(&m.track.album_name))
        .join(destination_file_name(m))
}
