use std::future::{Future, ready};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use rodio::{Sink, Source};
use rodio::mixer::Mixer;
use tracing::{debug, warn};

use crate::engine::{EngineError, HandleId, MediaElement};

use super::sink::{ByteDecoder, open_decoder, paused_sink, probe_duration};
use super::stages::{BoxedSource, StagePlan, build_pipeline};

struct MediaState {
    handle: HandleId,
    bytes: Option<Arc<[u8]>>,
    /// Decoder opened up front, consumed by the first attach.
    fresh: Option<ByteDecoder>,
    decode_error: Option<String>,
    duration: Option<Duration>,
    sink: Option<Sink>,
    pending_seek: Option<Duration>,
    /// Offset applied to the decoder before the sink started counting.
    seek_base: Duration,
    started: bool,
}

/// Media element for one bound source. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct RodioMedia {
    state: Arc<Mutex<MediaState>>,
    mixer: Mixer,
}

impl RodioMedia {
    pub(super) fn new(handle: HandleId, bytes: Arc<[u8]>, mixer: Mixer) -> Self {
        let (fresh, decode_error) = match open_decoder(&bytes) {
            Ok(decoder) => (Some(decoder), None),
            Err(e) => {
                debug!(%handle, error = %e, "source is not decodable");
                (None, Some(e.to_string()))
            }
        };
        let duration = probe_duration(&bytes, fresh.as_ref());
        Self {
            state: Arc::new(Mutex::new(MediaState {
                handle,
                bytes: Some(bytes),
                fresh,
                decode_error,
                duration,
                sink: None,
                pending_seek: None,
                seek_base: Duration::ZERO,
                started: false,
            })),
            mixer,
        }
    }

    fn lock(&self) -> MutexGuard<'_, MediaState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Build the processing pipeline and park it in a paused sink.
    pub(super) fn attach(&self, plan: &[StagePlan]) {
        let mut s = self.lock();
        if let Some(old) = s.sink.take() {
            old.stop();
        }
        let mut decoder = match s.fresh.take() {
            Some(decoder) => decoder,
            None => {
                let Some(bytes) = s.bytes.as_ref() else {
                    return;
                };
                match open_decoder(bytes) {
                    Ok(decoder) => decoder,
                    Err(e) => {
                        s.decode_error = Some(e.to_string());
                        return;
                    }
                }
            }
        };

        s.seek_base = Duration::ZERO;
        if let Some(pos) = s.pending_seek.take() {
            match decoder.try_seek(pos) {
                Ok(()) => s.seek_base = pos,
                Err(e) => warn!(handle = %s.handle, error = %e, "seek failed"),
            }
        }
        let source: BoxedSource = Box::new(decoder);
        let sink = paused_sink(&self.mixer, build_pipeline(source, plan));
        s.sink = Some(sink);
        s.started = false;
        debug!(handle = %s.handle, stages = plan.len(), "pipeline attached");
    }

    /// Drop the pipeline but keep the bytes so it can be attached again.
    pub(super) fn detach(&self) {
        let mut s = self.lock();
        if let Some(sink) = s.sink.take() {
            sink.stop();
        }
    }

    /// Stop for good and let go of the bytes.
    pub(super) fn release(&self) {
        let mut s = self.lock();
        if let Some(sink) = s.sink.take() {
            sink.stop();
        }
        s.fresh = None;
        s.bytes = None;
    }

    fn start(&self) -> Result<(), EngineError> {
        let mut s = self.lock();
        if let Some(reason) = &s.decode_error {
            return Err(EngineError::Decode(reason.clone()));
        }
        if s.bytes.is_none() {
            return Err(EngineError::PlayRejected("source was released".into()));
        }
        let Some(sink) = s.sink.as_ref() else {
            return Err(EngineError::PlayRejected("source is not connected".into()));
        };
        if sink.empty() {
            return Err(EngineError::PlayRejected("source has run out".into()));
        }
        sink.play();
        s.started = true;
        Ok(())
    }
}

impl MediaElement for RodioMedia {
    fn play(&self) -> impl Future<Output = Result<(), EngineError>> {
        ready(self.start())
    }

    fn pause(&self) {
        if let Some(sink) = self.lock().sink.as_ref() {
            sink.pause();
        }
    }

    fn is_paused(&self) -> bool {
        self.lock().sink.as_ref().is_none_or(Sink::is_paused)
    }

    fn position(&self) -> f64 {
        let s = self.lock();
        match (&s.sink, s.pending_seek) {
            (Some(sink), _) => (s.seek_base + sink.get_pos()).as_secs_f64(),
            (None, Some(pos)) => pos.as_secs_f64(),
            (None, None) => 0.0,
        }
    }

    fn set_position(&self, seconds: f64) {
        if !seconds.is_finite() {
            return;
        }
        let pos = Duration::from_secs_f64(seconds.max(0.0));
        let mut s = self.lock();
        if pos.is_zero() && !s.started && s.seek_base.is_zero() && s.sink.is_some() {
            // Freshly attached pipelines already sit at the start.
            return;
        }
        let Some(result) = s.sink.as_ref().map(|sink| sink.try_seek(pos)) else {
            s.pending_seek = Some(pos);
            return;
        };
        match result {
            // The sink's own position now counts from the start of the track.
            Ok(()) => s.seek_base = Duration::ZERO,
            Err(e) => warn!(handle = %s.handle, error = %e, "seek failed"),
        }
    }

    fn duration(&self) -> Option<f64> {
        self.lock().duration.map(|d| d.as_secs_f64())
    }

    fn has_ended(&self) -> bool {
        let s = self.lock();
        s.started && s.sink.as_ref().is_some_and(Sink::empty)
    }
}
