//! Test doubles: a recording engine, scripted media, a recording view and a
//! stub metadata lookup.

use std::cell::RefCell;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;

use crate::engine::{
    AudioEngine, EngineError, HandleId, MediaElement, NodeId, NodeSpec, Param, SourceHandle,
};
use crate::metadata::{LookupError, MetadataDisplay, MetadataLookup, VideoInfo};
use crate::player::TransportView;

/// Returns `Pending` exactly once.
#[derive(Debug, Default)]
pub struct YieldNow {
    yielded: bool,
}

impl Future for YieldNow {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.yielded {
            Poll::Ready(())
        } else {
            self.yielded = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    Created(NodeId, &'static str),
    Source(NodeId, HandleId),
    Connected(NodeId, NodeId),
    Disconnected(NodeId),
    Released(NodeId),
    Param(NodeId, Param, f32),
    Resumed,
}

#[derive(Debug)]
struct MediaState {
    handle: HandleId,
    paused: bool,
    position: f64,
    duration: Option<f64>,
    ended: bool,
    released: bool,
    reject: bool,
    plays: usize,
}

#[derive(Debug, Clone)]
pub struct MockMedia {
    state: Arc<Mutex<MediaState>>,
}

impl MockMedia {
    fn with<R>(&self, f: impl FnOnce(&mut MediaState) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }

    pub fn handle(&self) -> HandleId {
        self.with(|s| s.handle)
    }

    /// Number of play requests that resolved successfully.
    pub fn plays(&self) -> usize {
        self.with(|s| s.plays)
    }

    pub fn is_released(&self) -> bool {
        self.with(|s| s.released)
    }

    /// Simulate the decoder running off the end.
    pub fn finish(&self) {
        self.with(|s| {
            s.ended = true;
            s.paused = true;
            s.position = s.duration.unwrap_or(s.position);
        });
    }

    pub fn advance_to(&self, seconds: f64) {
        self.with(|s| s.position = seconds);
    }
}

impl MediaElement for MockMedia {
    fn play(&self) -> impl Future<Output = Result<(), EngineError>> {
        let state = Arc::clone(&self.state);
        async move {
            YieldNow::default().await;
            let mut s = state.lock().unwrap();
            if s.released {
                return Err(EngineError::PlayRejected("source was released".into()));
            }
            if s.reject {
                return Err(EngineError::Decode(format!("{} is not audio", s.handle)));
            }
            s.paused = false;
            s.ended = false;
            s.plays += 1;
            Ok(())
        }
    }

    fn pause(&self) {
        self.with(|s| s.paused = true);
    }

    fn is_paused(&self) -> bool {
        self.with(|s| s.paused)
    }

    fn position(&self) -> f64 {
        self.with(|s| s.position)
    }

    fn set_position(&self, seconds: f64) {
        self.with(|s| {
            s.position = seconds;
            s.ended = false;
        });
    }

    fn duration(&self) -> Option<f64> {
        self.with(|s| s.duration)
    }

    fn has_ended(&self) -> bool {
        self.with(|s| s.ended)
    }
}

#[derive(Debug)]
struct EngineState {
    next_node: u32,
    builds: usize,
    clock: f64,
    events: Vec<EngineEvent>,
    specs: HashMap<NodeId, NodeSpec>,
    media: HashMap<NodeId, MockMedia>,
    duration: Option<f64>,
    fail_build: bool,
    fail_resume: bool,
    resume_yields: bool,
}

impl Default for EngineState {
    fn default() -> Self {
        Self {
            next_node: 1,
            builds: 0,
            clock: 0.0,
            events: Vec::new(),
            specs: HashMap::new(),
            media: HashMap::new(),
            duration: Some(200.0),
            fail_build: false,
            fail_resume: false,
            resume_yields: false,
        }
    }
}

/// Test-side view of every engine the factory hands out.
#[derive(Debug, Clone, Default)]
pub struct EngineProbe {
    state: Arc<Mutex<EngineState>>,
}

impl EngineProbe {
    pub fn new() -> Self {
        Self::default()
    }

    fn with<R>(&self, f: impl FnOnce(&mut EngineState) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }

    pub fn factory(&self) -> impl Fn() -> Result<MockEngine, EngineError> + 'static {
        let state = Arc::clone(&self.state);
        move || {
            let mut s = state.lock().unwrap();
            if s.fail_build {
                return Err(EngineError::Unavailable("no output device".into()));
            }
            s.builds += 1;
            Ok(MockEngine {
                state: Arc::clone(&state),
            })
        }
    }

    pub fn builds(&self) -> usize {
        self.with(|s| s.builds)
    }

    pub fn events(&self) -> Vec<EngineEvent> {
        self.with(|s| s.events.clone())
    }

    pub fn clear_events(&self) {
        self.with(|s| s.events.clear());
    }

    pub fn set_clock(&self, seconds: f64) {
        self.with(|s| s.clock = seconds);
    }

    pub fn set_duration(&self, duration: Option<f64>) {
        self.with(|s| s.duration = duration);
    }

    pub fn fail_build(&self, fail: bool) {
        self.with(|s| s.fail_build = fail);
    }

    pub fn fail_resume(&self, fail: bool) {
        self.with(|s| s.fail_resume = fail);
    }

    pub fn resume_yields(&self, yields: bool) {
        self.with(|s| s.resume_yields = yields);
    }

    pub fn spec_of(&self, node: NodeId) -> Option<NodeSpec> {
        self.with(|s| s.specs.get(&node).cloned())
    }

    /// Most recently created media for `handle`.
    pub fn media_for(&self, handle: HandleId) -> Option<MockMedia> {
        self.with(|s| {
            s.media
                .iter()
                .filter(|(_, m)| m.handle() == handle)
                .max_by_key(|(node, _)| **node)
                .map(|(_, m)| m.clone())
        })
    }

    /// Handles whose source nodes are still alive.
    pub fn live_sources(&self) -> Vec<HandleId> {
        self.with(|s| {
            s.media
                .values()
                .filter(|m| !m.is_released())
                .map(MockMedia::handle)
                .collect()
        })
    }

    /// Every value written to `param` on `node`, oldest first.
    pub fn param_writes(&self, node: NodeId, param: Param) -> Vec<f32> {
        self.with(|s| {
            s.events
                .iter()
                .filter_map(|e| match e {
                    EngineEvent::Param(n, p, v) if *n == node && *p == param => Some(*v),
                    _ => None,
                })
                .collect()
        })
    }
}

#[derive(Debug)]
pub struct MockEngine {
    state: Arc<Mutex<EngineState>>,
}

pub const MOCK_DESTINATION: NodeId = NodeId(0);

/// Sources whose bytes start with this refuse to play.
pub const CORRUPT: &[u8] = b"corrupt";

impl MockEngine {
    fn with<R>(&self, f: impl FnOnce(&mut EngineState) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }
}

impl AudioEngine for MockEngine {
    type Media = MockMedia;

    fn current_time(&self) -> f64 {
        self.with(|s| s.clock)
    }

    fn resume(&self) -> impl Future<Output = Result<(), EngineError>> {
        let state = Arc::clone(&self.state);
        async move {
            let yields = state.lock().unwrap().resume_yields;
            if yields {
                YieldNow::default().await;
            }
            let mut s = state.lock().unwrap();
            if s.fail_resume {
                return Err(EngineError::Unavailable("clock refused to start".into()));
            }
            s.events.push(EngineEvent::Resumed);
            Ok(())
        }
    }

    fn create_node(&self, spec: &NodeSpec) -> Result<NodeId, EngineError> {
        self.with(|s| {
            let id = NodeId(s.next_node);
            s.next_node += 1;
            s.specs.insert(id, spec.clone());
            s.events.push(EngineEvent::Created(id, spec.kind()));
            Ok(id)
        })
    }

    fn create_media_source(
        &self,
        handle: &SourceHandle,
    ) -> Result<(NodeId, MockMedia), EngineError> {
        if handle.is_revoked() {
            return Err(EngineError::SourceRevoked(handle.id()));
        }
        self.with(|s| {
            let id = NodeId(s.next_node);
            s.next_node += 1;
            let media = MockMedia {
                state: Arc::new(Mutex::new(MediaState {
                    handle: handle.id(),
                    paused: true,
                    position: 0.0,
                    duration: s.duration,
                    ended: false,
                    released: false,
                    reject: handle
                        .open()
                        .is_some_and(|b| b.starts_with(CORRUPT)),
                    plays: 0,
                })),
            };
            s.media.insert(id, media.clone());
            s.events.push(EngineEvent::Source(id, handle.id()));
            Ok((id, media))
        })
    }

    fn connect(&self, from: NodeId, to: NodeId) -> Result<(), EngineError> {
        self.with(|s| s.events.push(EngineEvent::Connected(from, to)));
        Ok(())
    }

    fn disconnect(&self, node: NodeId) {
        self.with(|s| s.events.push(EngineEvent::Disconnected(node)));
    }

    fn release(&self, node: NodeId) {
        self.with(|s| {
            if let Some(media) = s.media.get(&node) {
                media.with(|m| {
                    m.released = true;
                    m.paused = true;
                });
            }
            s.events.push(EngineEvent::Released(node));
        });
    }

    fn destination(&self) -> NodeId {
        MOCK_DESTINATION
    }

    fn set_param(&self, node: NodeId, param: Param, value: f32) {
        self.with(|s| s.events.push(EngineEvent::Param(node, param, value)));
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    Playing(bool),
    Progress(f64, Option<f64>),
    Duration(f64),
    Playlist(Vec<String>, Option<usize>),
    Metadata(MetadataDisplay),
    Preset(String),
    Error(String),
}

#[derive(Debug, Default)]
pub struct RecordingView {
    events: RefCell<Vec<ViewEvent>>,
}

impl RecordingView {
    pub fn events(&self) -> Vec<ViewEvent> {
        self.events.borrow().clone()
    }

    pub fn last_playing(&self) -> Option<bool> {
        self.events.borrow().iter().rev().find_map(|e| match e {
            ViewEvent::Playing(p) => Some(*p),
            _ => None,
        })
    }

    pub fn errors(&self) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                ViewEvent::Error(m) => Some(m.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn last_playlist(&self) -> Option<(Vec<String>, Option<usize>)> {
        self.events.borrow().iter().rev().find_map(|e| match e {
            ViewEvent::Playlist(names, current) => Some((names.clone(), *current)),
            _ => None,
        })
    }

    pub fn metadata(&self) -> Vec<MetadataDisplay> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                ViewEvent::Metadata(m) => Some(m.clone()),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: ViewEvent) {
        self.events.borrow_mut().push(event);
    }
}

impl TransportView for RecordingView {
    fn show_playing(&self, playing: bool) {
        self.push(ViewEvent::Playing(playing));
    }

    fn show_progress(&self, position: f64, duration: Option<f64>) {
        self.push(ViewEvent::Progress(position, duration));
    }

    fn show_duration(&self, duration: f64) {
        self.push(ViewEvent::Duration(duration));
    }

    fn render_playlist(&self, names: &[&str], current: Option<usize>) {
        self.push(ViewEvent::Playlist(
            names.iter().map(|n| n.to_string()).collect(),
            current,
        ));
    }

    fn show_metadata(&self, metadata: &MetadataDisplay) {
        self.push(ViewEvent::Metadata(metadata.clone()));
    }

    fn show_preset(&self, name: &str) {
        self.push(ViewEvent::Preset(name.to_string()));
    }

    fn show_error(&self, message: &str) {
        self.push(ViewEvent::Error(message.to_string()));
    }
}

/// Lookup that answers from a fixed table after an optional delay.
#[derive(Debug, Default)]
pub struct StubLookup {
    answers: HashMap<String, VideoInfo>,
    delays: HashMap<String, Duration>,
    queries: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl StubLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(mut self, query: &str, title: &str) -> Self {
        self.answers.insert(
            query.to_string(),
            VideoInfo {
                title: title.to_string(),
                thumbnail_url: Some(format!("https://img.example/{query}.jpg")),
            },
        );
        self
    }

    pub fn delay(mut self, query: &str, delay: Duration) -> Self {
        self.delays.insert(query.to_string(), delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

impl MetadataLookup for StubLookup {
    fn lookup(&self, query: &str) -> Result<Option<VideoInfo>, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().unwrap().push(query.to_string());
        if let Some(delay) = self.delays.get(query) {
            std::thread::sleep(*delay);
        }
        if query == "offline" {
            return Err(LookupError::Status(503));
        }
        Ok(self.answers.get(query).cloned())
    }
}
