//! Terminal 8D audio player.
//!
//! Tracks run through a fixed EQ, dynamics and HRTF panning chain while an
//! orbit moves the panner around the listener's head.

pub mod audio;
pub mod config;
pub mod engine;
pub mod graph;
pub mod library;
pub mod metadata;
pub mod offline;
pub mod orbit;
pub mod player;
pub mod runtime;
pub mod session;
pub mod ui;

#[cfg(test)]
mod testing;
