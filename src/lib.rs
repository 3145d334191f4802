//! Playlist reconciliation library: match a streaming playlist against local
//! audio files and lay them out as `<album artist>/<album>/<NN> - <artists> - <title>`.

pub mod consolidate;
pub mod error;
pub mod execute;
pub mod filename;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod plan;
pub mod progress;
pub mod reconcile;
pub mod safety;
pub mod scan;
pub mod source;
pub mod tidal;

pub use error::{Error, Result};
