//! rodio-backed [`AudioEngine`](crate::engine::AudioEngine).
//!
//! rodio has no node graph, so the engine keeps a table of node descriptions
//! and turns a routed source into one `Source` pipeline when it is connected.
//! Parameters that change while playing (tone gains, panner position, trim)
//! live in shared atomics that the pipeline stages poll.

mod engine;
mod media;
mod sink;
mod stages;
mod thread;

pub use engine::RodioEngine;
pub use media::RodioMedia;
