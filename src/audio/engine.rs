use std::collections::HashMap;
use std::future::{Future, ready};
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::engine::{AudioEngine, EngineError, NodeId, NodeSpec, Param, SourceHandle};

use super::media::RodioMedia;
use super::stages::{NodeParams, StagePlan};
use super::thread::{OutputThread, spawn_output_thread};

const DESTINATION: NodeId = NodeId(0);

enum NodeKind {
    Processor(NodeSpec, NodeParams),
    Source(RodioMedia),
}

struct Node {
    kind: NodeKind,
    /// Each node feeds at most one downstream node.
    next: Option<NodeId>,
}

#[derive(Default)]
struct NodeTable {
    last_id: u32,
    nodes: HashMap<NodeId, Node>,
}

impl NodeTable {
    fn insert(&mut self, kind: NodeKind) -> NodeId {
        self.last_id += 1;
        let id = NodeId(self.last_id);
        self.nodes.insert(id, Node { kind, next: None });
        id
    }

    /// Processing stages between `start` and the destination, or `None` if
    /// the route is broken.
    fn route_from(&self, start: NodeId) -> Option<Vec<StagePlan>> {
        let mut plan = Vec::new();
        let mut cursor = start;
        for _ in 0..=self.nodes.len() {
            if cursor == DESTINATION {
                return Some(plan);
            }
            let node = self.nodes.get(&cursor)?;
            match &node.kind {
                NodeKind::Processor(spec, params) => plan.push(StagePlan {
                    spec: spec.clone(),
                    params: params.clone(),
                }),
                NodeKind::Source(_) => return None,
            }
            cursor = node.next?;
        }
        None
    }
}

/// Audio engine on top of the default rodio output device.
pub struct RodioEngine {
    output: OutputThread,
    clock: Instant,
    table: Mutex<NodeTable>,
}

impl RodioEngine {
    /// Open the default output device.
    pub fn open() -> Result<Self, EngineError> {
        let output = spawn_output_thread()?;
        info!("audio output opened");
        Ok(Self {
            output,
            clock: Instant::now(),
            table: Mutex::new(NodeTable::default()),
        })
    }

    fn table(&self) -> MutexGuard<'_, NodeTable> {
        self.table.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl AudioEngine for RodioEngine {
    type Media = RodioMedia;

    fn current_time(&self) -> f64 {
        self.clock.elapsed().as_secs_f64()
    }

    /// The output stream runs from the moment it is opened.
    fn resume(&self) -> impl Future<Output = Result<(), EngineError>> {
        ready(Ok(()))
    }

    fn create_node(&self, spec: &NodeSpec) -> Result<NodeId, EngineError> {
        if let NodeSpec::Compressor { ratio, .. } = spec {
            debug!(ratio, "limiter stage has a fixed ratio; configured ratio is ignored");
        }
        let id = self
            .table()
            .insert(NodeKind::Processor(spec.clone(), NodeParams::for_spec(spec)));
        debug!(node = id.0, kind = spec.kind(), "node created");
        Ok(id)
    }

    fn create_media_source(
        &self,
        handle: &SourceHandle,
    ) -> Result<(NodeId, RodioMedia), EngineError> {
        let bytes = handle
            .open()
            .ok_or(EngineError::SourceRevoked(handle.id()))?;
        let media = RodioMedia::new(handle.id(), bytes, self.output.mixer().clone());
        let id = self.table().insert(NodeKind::Source(media.clone()));
        Ok((id, media))
    }

    fn connect(&self, from: NodeId, to: NodeId) -> Result<(), EngineError> {
        let mut table = self.table();
        if to != DESTINATION && !table.nodes.contains_key(&to) {
            return Err(EngineError::UnknownNode(to));
        }
        let node = table
            .nodes
            .get_mut(&from)
            .ok_or(EngineError::UnknownNode(from))?;
        if let Some(old) = node.next.replace(to) {
            debug!(from = from.0, old = old.0, "replacing existing edge");
        }

        let media = match &node.kind {
            NodeKind::Source(media) => media.clone(),
            NodeKind::Processor(..) => return Ok(()),
        };
        let Some(plan) = table.route_from(to) else {
            if let Some(node) = table.nodes.get_mut(&from) {
                node.next = None;
            }
            return Err(EngineError::Unrouted(from));
        };
        drop(table);
        media.attach(&plan);
        Ok(())
    }

    fn disconnect(&self, node: NodeId) {
        let mut table = self.table();
        let Some(n) = table.nodes.get_mut(&node) else {
            return;
        };
        n.next = None;
        if let NodeKind::Source(media) = &n.kind {
            media.detach();
        }
    }

    fn release(&self, node: NodeId) {
        let removed = self.table().nodes.remove(&node);
        match removed {
            Some(Node {
                kind: NodeKind::Source(media),
                ..
            }) => media.release(),
            Some(_) => {}
            None => warn!(node = node.0, "release of unknown node"),
        }
    }

    fn destination(&self) -> NodeId {
        DESTINATION
    }

    fn set_param(&self, node: NodeId, param: Param, value: f32) {
        let table = self.table();
        let Some(Node {
            kind: NodeKind::Processor(_, params),
            ..
        }) = table.nodes.get(&node)
        else {
            return;
        };
        match param {
            Param::Gain => params.gain.set(value),
            Param::PositionX => params.position[0].set(value),
            Param::PositionY => params.position[1].set(value),
            Param::PositionZ => params.position[2].set(value),
        }
    }
}
