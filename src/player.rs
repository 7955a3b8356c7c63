//! Playback state machine.
//!
//! ```text
//! Empty --add--> Loaded --play--> Playing <--toggle--> Paused
//!                                    |  ended, more tracks: play next
//!                                    `- ended, last track:  Paused at start
//! ```

mod controller;
mod types;
mod view;

pub use controller::PlaybackController;
pub use types::{AddOutcome, MediaStatus, PlayOutcome, PlaybackError, PlayerState};
pub use view::{TransportView, format_time, play_glyph, progress_ratio};
