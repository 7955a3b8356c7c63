//! Decoding handle bytes and preparing paused sinks.

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use lofty::prelude::*;
use lofty::probe::Probe;
use rodio::mixer::Mixer;
use rodio::{Decoder, Sink, Source};

use crate::engine::EngineError;

pub(super) type ByteDecoder = Decoder<Cursor<Arc<[u8]>>>;

pub(super) fn open_decoder(bytes: &Arc<[u8]>) -> Result<ByteDecoder, EngineError> {
    Decoder::new(Cursor::new(Arc::clone(bytes))).map_err(|e| EngineError::Decode(e.to_string()))
}

/// Container-reported length, falling back to what the decoder knows.
pub(super) fn probe_duration(bytes: &[u8], decoder: Option<&ByteDecoder>) -> Option<Duration> {
    let from_tags = Probe::new(Cursor::new(bytes))
        .guess_file_type()
        .ok()
        .and_then(|p| p.read().ok())
        .map(|tagged| tagged.properties().duration())
        .filter(|d| !d.is_zero());
    from_tags.or_else(|| decoder.and_then(|d| d.total_duration()))
}

/// Create a paused `Sink` on `mixer` that will play `source`.
pub(super) fn paused_sink<S>(mixer: &Mixer, source: S) -> Sink
where
    S: Source + Send + 'static,
{
    let sink = Sink::connect_new(mixer);
    sink.pause();
    sink.append(source);
    sink
}
