//! Per-session audio state: the shared graph plus the handles it reads from.

use tracing::info;

use crate::engine::{AudioEngine, HandleRegistry, SourceHandle};
use crate::graph::AudioGraph;

pub struct AudioSession<E: AudioEngine> {
    graph: AudioGraph<E>,
    handles: HandleRegistry,
}

impl<E: AudioEngine> AudioSession<E> {
    pub fn new(graph: AudioGraph<E>) -> Self {
        Self {
            graph,
            handles: HandleRegistry::new(),
        }
    }

    pub fn graph(&self) -> &AudioGraph<E> {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut AudioGraph<E> {
        &mut self.graph
    }

    /// Register raw audio bytes and return the handle tracks refer to.
    pub fn register(&mut self, bytes: Vec<u8>) -> SourceHandle {
        self.handles.create(bytes)
    }

    pub fn revoke(&mut self, handle: &SourceHandle) -> bool {
        self.handles.revoke(handle)
    }

    pub fn live_handles(&self) -> usize {
        self.handles.live_count()
    }

    /// Release the graph and every registered handle. Returns how many
    /// handles were revoked.
    pub fn teardown(&mut self) -> usize {
        self.graph.shutdown();
        let revoked = self.handles.revoke_all();
        info!(revoked, "audio session closed");
        revoked
    }
}
