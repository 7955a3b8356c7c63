//! Best-effort "now playing" lookup.
//!
//! A lookup runs on its own thread and reports through a single-slot mailbox
//! that only accepts results for the newest request. Nothing here can affect
//! playback.

mod lookup;
mod slot;

pub use lookup::{LookupError, MetadataLookup, VideoInfo, YoutubeLookup};
pub use slot::{MetadataDisplay, MetadataFetcher, MetadataSlot};

#[cfg(test)]
mod tests;
