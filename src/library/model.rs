use std::fs;
use std::io;
use std::path::Path;

use crate::engine::SourceHandle;

/// Raw bytes selected by the user, before they become a track.
#[derive(Debug, Clone)]
pub struct InputFile {
    /// Original file name, extension included.
    pub name: String,
    pub bytes: Vec<u8>,
}

impl InputFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    pub fn read(path: &Path) -> io::Result<Self> {
        let name = path
            .file_name()
            .and_then(|s| s.to_str())
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?
            .to_string();
        Ok(Self {
            name,
            bytes: fs::read(path)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Track {
    pub display_name: String,
    pub handle: SourceHandle,
}

/// Ordered, append-only list of uniquely named tracks.
#[derive(Debug, Default)]
pub struct Playlist {
    tracks: Vec<Track>,
}

impl Playlist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, display_name: &str) -> bool {
        self.tracks.iter().any(|t| t.display_name == display_name)
    }

    /// Append `track` unless one with the same name is already listed.
    pub fn push_unique(&mut self, track: Track) -> bool {
        if self.contains(&track.display_name) {
            return false;
        }
        self.tracks.push(track);
        true
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.tracks.iter().map(|t| t.display_name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Track> {
        self.tracks.iter()
    }

    /// Empty the list, handing back the tracks so their handles can be revoked.
    pub fn drain(&mut self) -> Vec<Track> {
        std::mem::take(&mut self.tracks)
    }
}
