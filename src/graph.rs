//! The fixed processing chain and its single rebindable source.
//!
//! ```text
//! source -> highpass -> lowshelf -> peaking -> highshelf -> compressor -> panner -> trim -> out
//! ```
//!
//! Everything right of `source` is built once, the first time
//! [`AudioGraph::ensure_initialized`] runs. Only the source edge and node
//! parameters change afterwards.

mod chain;
mod preset;
mod spatial;

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use crate::config::AudioSettings;
use crate::engine::{AudioEngine, EngineError, HandleId, NodeId, Param, SourceHandle};

pub use chain::ChainNodes;
pub use preset::{BUILTIN_PRESETS, PresetProfile};
pub use spatial::{Position, SpatialTarget};

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("audio graph used before initialization")]
    NotInitialized,
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Builds the engine on first use.
pub type EngineFactory<E> = Box<dyn Fn() -> Result<E, EngineError>>;

struct BoundSource {
    node: NodeId,
    handle: HandleId,
}

struct LiveGraph<E: AudioEngine> {
    engine: Arc<E>,
    chain: ChainNodes,
    bound: Option<BoundSource>,
}

pub struct AudioGraph<E: AudioEngine> {
    factory: EngineFactory<E>,
    settings: AudioSettings,
    tone: PresetProfile,
    live: Option<LiveGraph<E>>,
}

impl<E: AudioEngine> AudioGraph<E> {
    pub fn new(
        settings: AudioSettings,
        tone: PresetProfile,
        factory: impl Fn() -> Result<E, EngineError> + 'static,
    ) -> Self {
        Self {
            factory: Box::new(factory),
            settings,
            tone,
            live: None,
        }
    }

    /// Construct the engine and the node chain. Later calls return the same engine.
    pub fn ensure_initialized(&mut self) -> Result<Arc<E>, EngineError> {
        if let Some(live) = &self.live {
            return Ok(Arc::clone(&live.engine));
        }

        let engine = Arc::new((self.factory)()?);
        let chain = chain::build_chain(engine.as_ref(), &self.settings, &self.tone)?;
        info!(nodes = chain.in_order().len(), "audio graph built");

        self.live = Some(LiveGraph {
            engine: Arc::clone(&engine),
            chain,
            bound: None,
        });
        Ok(engine)
    }

    pub fn is_initialized(&self) -> bool {
        self.live.is_some()
    }

    pub fn engine(&self) -> Option<Arc<E>> {
        self.live.as_ref().map(|l| Arc::clone(&l.engine))
    }

    pub fn chain(&self) -> Option<ChainNodes> {
        self.live.as_ref().map(|l| l.chain)
    }

    /// Handle of the source currently feeding the chain.
    pub fn bound_handle(&self) -> Option<HandleId> {
        self.live.as_ref()?.bound.as_ref().map(|b| b.handle)
    }

    /// Swap the chain's input to `handle`, releasing whatever was bound before.
    pub fn bind_source(&mut self, handle: &SourceHandle) -> Result<E::Media, GraphError> {
        let live = self.live.as_mut().ok_or(GraphError::NotInitialized)?;
        if let Some(old) = live.bound.take() {
            live.engine.disconnect(old.node);
            live.engine.release(old.node);
            debug!(handle = %old.handle, "released previous source");
        }

        let (node, media) = live.engine.create_media_source(handle)?;
        if let Err(e) = live.engine.connect(node, live.chain.head()) {
            live.engine.release(node);
            return Err(e.into());
        }

        live.bound = Some(BoundSource {
            node,
            handle: handle.id(),
        });
        debug!(handle = %handle.id(), "source bound");
        Ok(media)
    }

    /// Detach and release the bound source, if any.
    pub fn unbind_source(&mut self) -> bool {
        let Some(live) = self.live.as_mut() else {
            return false;
        };
        match live.bound.take() {
            Some(old) => {
                live.engine.disconnect(old.node);
                live.engine.release(old.node);
                debug!(handle = %old.handle, "source unbound");
                true
            }
            None => false,
        }
    }

    pub fn set_spatial_position(&self, pos: Position) {
        if let Some(live) = &self.live {
            spatial::write_position(live.engine.as_ref(), live.chain.panner, pos);
        }
    }

    pub fn spatial_target(&self) -> Option<SpatialTarget<E>> {
        self.live
            .as_ref()
            .map(|l| SpatialTarget::new(Arc::clone(&l.engine), l.chain.panner))
    }

    /// Push tone gains to the live filters.
    ///
    /// The profile is remembered either way and is used as the starting tone
    /// if the chain has not been built yet.
    pub fn apply_preset(&mut self, profile: PresetProfile) {
        self.tone = profile;
        let Some(live) = &self.live else {
            return;
        };
        live.engine.set_param(live.chain.bass, Param::Gain, profile.bass);
        live.engine
            .set_param(live.chain.presence, Param::Gain, profile.presence);
        live.engine.set_param(live.chain.treble, Param::Gain, profile.treble);
    }

    pub fn tone(&self) -> PresetProfile {
        self.tone
    }

    /// Resume the engine clock. Safe to call repeatedly.
    pub async fn resume(&self) -> Result<(), GraphError> {
        let engine = self.engine().ok_or(GraphError::NotInitialized)?;
        engine.resume().await?;
        Ok(())
    }

    /// Release the source and every chain node, then drop the engine.
    pub fn shutdown(&mut self) {
        self.unbind_source();
        if let Some(live) = self.live.take() {
            for node in live.chain.in_order() {
                live.engine.disconnect(node);
                live.engine.release(node);
            }
            info!("audio graph released");
        }
    }
}

impl<E: AudioEngine> Drop for AudioGraph<E> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
