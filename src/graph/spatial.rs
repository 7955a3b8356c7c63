use std::sync::Arc;

use crate::engine::{AudioEngine, NodeId, Param};

/// Emitter position relative to the listener, in panner units.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// The panner node plus the engine that owns it.
///
/// Cloneable and `Send`, so it can be handed to a ticker thread while the graph
/// itself stays with the controller.
pub struct SpatialTarget<E: AudioEngine> {
    engine: Arc<E>,
    panner: NodeId,
}

impl<E: AudioEngine> Clone for SpatialTarget<E> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            panner: self.panner,
        }
    }
}

impl<E: AudioEngine> SpatialTarget<E> {
    pub(crate) fn new(engine: Arc<E>, panner: NodeId) -> Self {
        Self { engine, panner }
    }

    /// Engine clock in seconds.
    pub fn now(&self) -> f64 {
        self.engine.current_time()
    }

    pub fn set_position(&self, pos: Position) {
        write_position(self.engine.as_ref(), self.panner, pos);
    }
}

pub(super) fn write_position<E: AudioEngine>(engine: &E, panner: NodeId, pos: Position) {
    engine.set_param(panner, Param::PositionX, pos.x);
    engine.set_param(panner, Param::PositionY, pos.y);
    engine.set_param(panner, Param::PositionZ, pos.z);
}
