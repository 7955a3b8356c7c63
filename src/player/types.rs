use thiserror::Error;

use crate::engine::EngineError;
use crate::graph::GraphError;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum PlayerState {
    /// No tracks.
    #[default]
    Empty,
    /// Tracks listed, nothing bound yet.
    Loaded,
    Paused,
    Playing,
}

/// How a play request ended when it did not fail.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PlayOutcome {
    Playing,
    /// A newer request took over while this one was suspended.
    Superseded,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct AddOutcome {
    pub added: usize,
    pub duplicates: usize,
    /// The first add started playback of the first track.
    pub started: bool,
}

/// Snapshot of the bound media.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MediaStatus {
    pub position: f64,
    pub duration: Option<f64>,
    pub paused: bool,
    pub ended: bool,
}

#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("track {index} is out of range (playlist has {len})")]
    IndexOutOfBounds { index: usize, len: usize },
    #[error("nothing is loaded")]
    NothingLoaded,
    #[error("seek fraction {0} is outside 0..=1")]
    InvalidFraction(f64),
    #[error("track duration is not known yet")]
    DurationUnknown,
    #[error("unknown preset \"{0}\"")]
    UnknownPreset(String),
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error(transparent)]
    Engine(#[from] EngineError),
}
