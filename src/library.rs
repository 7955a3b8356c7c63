mod display;
mod model;
mod scan;

pub use display::clean_song_name;
pub use model::{InputFile, Playlist, Track};
pub use scan::{expand_paths, read_inputs};
