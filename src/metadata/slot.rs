use std::sync::{Arc, Mutex};
use std::thread;

use tracing::{debug, warn};

use super::lookup::{MetadataLookup, VideoInfo};

/// What the now-playing panel should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataDisplay {
    Searching(String),
    Found(VideoInfo),
    NotFound,
    /// Lookup disabled or failed.
    Unavailable,
}

impl MetadataDisplay {
    pub fn headline(&self) -> String {
        match self {
            MetadataDisplay::Searching(q) => format!("searching for \"{q}\"..."),
            MetadataDisplay::Found(info) => info.title.clone(),
            MetadataDisplay::NotFound => "no match found".to_string(),
            MetadataDisplay::Unavailable => "-".to_string(),
        }
    }
}

#[derive(Debug, Default)]
struct SlotState {
    newest: u64,
    pending: Option<MetadataDisplay>,
}

/// Single-slot mailbox holding the latest result for the newest request.
#[derive(Debug, Clone, Default)]
pub struct MetadataSlot {
    state: Arc<Mutex<SlotState>>,
}

impl MetadataSlot {
    /// Mark `token` as the newest request. Older pending results are dropped.
    pub fn begin(&self, token: u64) {
        if let Ok(mut s) = self.state.lock() {
            if token >= s.newest {
                s.newest = token;
                s.pending = None;
            }
        }
    }

    /// Store a result. Rejected if a newer request has begun since.
    pub fn offer(&self, token: u64, display: MetadataDisplay) -> bool {
        match self.state.lock() {
            Ok(mut s) if s.newest == token => {
                s.pending = Some(display);
                true
            }
            _ => false,
        }
    }

    pub fn take(&self) -> Option<MetadataDisplay> {
        self.state.lock().ok().and_then(|mut s| s.pending.take())
    }
}

/// Fires lookups in the background and collects them in a [`MetadataSlot`].
#[derive(Default)]
pub struct MetadataFetcher {
    lookup: Option<Arc<dyn MetadataLookup>>,
    slot: MetadataSlot,
}

impl MetadataFetcher {
    pub fn new(lookup: Option<Arc<dyn MetadataLookup>>) -> Self {
        Self {
            lookup,
            slot: MetadataSlot::default(),
        }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.lookup.is_some()
    }

    pub fn slot(&self) -> &MetadataSlot {
        &self.slot
    }

    /// Start a lookup for `query` under `token`. Returns the worker, if one
    /// was spawned.
    pub fn request(&self, token: u64, query: &str) -> Option<thread::JoinHandle<()>> {
        self.slot.begin(token);
        let Some(lookup) = self.lookup.clone() else {
            self.slot.offer(token, MetadataDisplay::Unavailable);
            return None;
        };
        if query.is_empty() {
            self.slot.offer(token, MetadataDisplay::NotFound);
            return None;
        }

        let slot = self.slot.clone();
        let query = query.to_string();
        let spawned = thread::Builder::new()
            .name("metadata-lookup".into())
            .spawn(move || {
                let display = match lookup.lookup(&query) {
                    Ok(Some(info)) => {
                        debug!(%query, title = %info.title, "metadata found");
                        MetadataDisplay::Found(info)
                    }
                    Ok(None) => {
                        debug!(%query, "no metadata match");
                        MetadataDisplay::NotFound
                    }
                    Err(e) => {
                        warn!(%query, error = %e, "metadata lookup failed");
                        MetadataDisplay::Unavailable
                    }
                };
                if !slot.offer(token, display) {
                    debug!(%query, token, "discarding stale metadata");
                }
            });

        match spawned {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!(error = %e, "could not spawn metadata lookup");
                self.slot.offer(token, MetadataDisplay::Unavailable);
                None
            }
        }
    }

    /// Latest result for the newest request, if it arrived since the last call.
    pub fn take_update(&self) -> Option<MetadataDisplay> {
        self.slot.take()
    }
}
