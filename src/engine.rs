//! Audio engine seam.
//!
//! The playback core never talks to an audio backend directly. It builds its
//! processing chain through [`AudioEngine`] and drives playback through
//! [`MediaElement`], the same split a browser makes between an audio context
//! and a media element. `crate::audio` provides the rodio implementation.

mod handle;
mod types;

use std::future::Future;

pub use handle::{HandleId, HandleRegistry, SourceHandle};
pub use types::*;

/// A node-graph audio engine.
///
/// Engines are shared with the orbit ticker thread, so every method takes
/// `&self` and implementations keep their own interior locking.
pub trait AudioEngine: Send + Sync + 'static {
    /// Playable media produced for each bound source.
    type Media: MediaElement;

    /// Monotonic engine clock in seconds.
    fn current_time(&self) -> f64;

    /// Resume the processing clock. Engines may start suspended.
    fn resume(&self) -> impl Future<Output = Result<(), EngineError>>;

    fn create_node(&self, spec: &NodeSpec) -> Result<NodeId, EngineError>;

    /// Create a source node and its media element from a revocable handle.
    fn create_media_source(
        &self,
        handle: &SourceHandle,
    ) -> Result<(NodeId, Self::Media), EngineError>;

    fn connect(&self, from: NodeId, to: NodeId) -> Result<(), EngineError>;

    /// Remove every outgoing edge of `node`.
    fn disconnect(&self, node: NodeId);

    /// Free a node. Releasing a source node drops its media resources.
    fn release(&self, node: NodeId);

    fn destination(&self) -> NodeId;

    /// Set a live parameter. Unknown nodes and unsupported params are ignored.
    fn set_param(&self, node: NodeId, param: Param, value: f32);
}

/// Transport half of a bound source.
pub trait MediaElement: Clone {
    /// Start or continue playback. May reject, e.g. for undecodable input.
    fn play(&self) -> impl Future<Output = Result<(), EngineError>>;
    fn pause(&self);
    fn is_paused(&self) -> bool;
    /// Playback position in seconds.
    fn position(&self) -> f64;
    fn set_position(&self, seconds: f64);
    /// Total length in seconds, once known.
    fn duration(&self) -> Option<f64>;
    /// True once playback ran off the end of the source.
    fn has_ended(&self) -> bool;
}
