//! Configuration loader and schema types.
//!
//! This module exposes the configuration schema used to drive the audio
//! chain, the orbit, presets and the terminal UI, plus helpers to load it from
//! disk and the environment.

mod load;
mod schema;

pub use load::{default_config_path, resolve_config_path};
pub use schema::*;

#[cfg(test)]
mod tests;
