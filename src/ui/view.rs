use std::cell::{Ref, RefCell};

use crate::metadata::MetadataDisplay;
use crate::player::TransportView;

/// Everything the terminal draws, as last reported by the controller.
#[derive(Debug, Clone, Default)]
pub struct ViewSnapshot {
    pub playing: bool,
    pub position: f64,
    pub duration: Option<f64>,
    pub tracks: Vec<String>,
    pub current: Option<usize>,
    pub metadata: Option<MetadataDisplay>,
    pub preset: String,
    pub error: Option<String>,
}

impl ViewSnapshot {
    pub fn current_name(&self) -> Option<&str> {
        self.current
            .and_then(|i| self.tracks.get(i))
            .map(String::as_str)
    }
}

/// [`TransportView`] that records callbacks for the next frame.
#[derive(Debug, Default)]
pub struct TuiView {
    snapshot: RefCell<ViewSnapshot>,
}

impl TuiView {
    pub fn new(preset: impl Into<String>) -> Self {
        Self {
            snapshot: RefCell::new(ViewSnapshot {
                preset: preset.into(),
                ..ViewSnapshot::default()
            }),
        }
    }

    pub fn snapshot(&self) -> Ref<'_, ViewSnapshot> {
        self.snapshot.borrow()
    }
}

impl TransportView for TuiView {
    fn show_playing(&self, playing: bool) {
        let mut s = self.snapshot.borrow_mut();
        s.playing = playing;
        if playing {
            s.error = None;
        }
    }

    fn show_progress(&self, position: f64, duration: Option<f64>) {
        let mut s = self.snapshot.borrow_mut();
        s.position = position;
        s.duration = duration;
    }

    fn show_duration(&self, duration: f64) {
        self.snapshot.borrow_mut().duration = Some(duration);
    }

    fn render_playlist(&self, names: &[&str], current: Option<usize>) {
        let mut s = self.snapshot.borrow_mut();
        s.tracks = names.iter().map(|n| n.to_string()).collect();
        s.current = current;
    }

    fn show_metadata(&self, metadata: &MetadataDisplay) {
        self.snapshot.borrow_mut().metadata = Some(metadata.clone());
    }

    fn show_preset(&self, name: &str) {
        self.snapshot.borrow_mut().preset = name.to_string();
    }

    fn show_error(&self, message: &str) {
        self.snapshot.borrow_mut().error = Some(message.to_string());
    }
}
