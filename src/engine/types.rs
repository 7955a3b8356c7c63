//! Node descriptions, parameters and engine errors.

use std::time::Duration;

use thiserror::Error;

use super::handle::HandleId;

/// Identifier of a node owned by an engine.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PanningModel {
    EqualPower,
    /// Head-related transfer function.
    Hrtf,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DistanceModel {
    Linear,
    Inverse,
    Exponential,
}

/// Construction parameters of a processing node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeSpec {
    HighPass {
        frequency: f32,
        q: f32,
    },
    LowShelf {
        frequency: f32,
        gain_db: f32,
    },
    Peaking {
        frequency: f32,
        q: f32,
        gain_db: f32,
    },
    HighShelf {
        frequency: f32,
        gain_db: f32,
    },
    Compressor {
        threshold_db: f32,
        knee_db: f32,
        ratio: f32,
        attack: Duration,
        release: Duration,
    },
    Panner {
        panning: PanningModel,
        distance: DistanceModel,
        ref_distance: f32,
        max_distance: f32,
        rolloff: f32,
    },
    Gain {
        value: f32,
    },
}

impl NodeSpec {
    /// Short name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            NodeSpec::HighPass { .. } => "highpass",
            NodeSpec::LowShelf { .. } => "lowshelf",
            NodeSpec::Peaking { .. } => "peaking",
            NodeSpec::HighShelf { .. } => "highshelf",
            NodeSpec::Compressor { .. } => "compressor",
            NodeSpec::Panner { .. } => "panner",
            NodeSpec::Gain { .. } => "gain",
        }
    }
}

/// Live parameters that can change after a node is built.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Param {
    /// Filter gain in dB, or linear gain for a gain node.
    Gain,
    PositionX,
    PositionY,
    PositionZ,
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("audio engine unavailable: {0}")]
    Unavailable(String),
    #[error("source handle {0} has been revoked")]
    SourceRevoked(HandleId),
    #[error("could not decode source: {0}")]
    Decode(String),
    #[error("unknown node {0:?}")]
    UnknownNode(NodeId),
    #[error("node {0:?} has no route to the destination")]
    Unrouted(NodeId),
    #[error("playback rejected: {0}")]
    PlayRejected(String),
}
