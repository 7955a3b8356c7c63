//! Revocable handles to in-memory audio bytes.
//!
//! The registry owns the bytes; a handle only holds a weak reference. Revoking
//! a handle drops the registry's copy, so a forgotten revoke is the only way
//! the backing buffer outlives its track.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct HandleId(u64);

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "blob:{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct SourceHandle {
    id: HandleId,
    data: Weak<[u8]>,
}

impl SourceHandle {
    pub fn id(&self) -> HandleId {
        self.id
    }

    /// Borrow the bytes, or `None` once revoked.
    pub fn open(&self) -> Option<Arc<[u8]>> {
        self.data.upgrade()
    }

    pub fn is_revoked(&self) -> bool {
        self.data.strong_count() == 0
    }
}

impl PartialEq for SourceHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for SourceHandle {}

#[derive(Debug, Default)]
pub struct HandleRegistry {
    next_id: u64,
    live: HashMap<HandleId, Arc<[u8]>>,
}

impl HandleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, bytes: Vec<u8>) -> SourceHandle {
        self.next_id += 1;
        let id = HandleId(self.next_id);
        let data: Arc<[u8]> = Arc::from(bytes);
        let handle = SourceHandle {
            id,
            data: Arc::downgrade(&data),
        };
        self.live.insert(id, data);
        handle
    }

    /// Release the bytes behind `handle`. Returns false if it was already gone.
    pub fn revoke(&mut self, handle: &SourceHandle) -> bool {
        self.live.remove(&handle.id).is_some()
    }

    pub fn revoke_all(&mut self) -> usize {
        let n = self.live.len();
        self.live.clear();
        n
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }
}
