use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle};

use rodio::OutputStreamBuilder;
use rodio::mixer::Mixer;
use tracing::debug;

use crate::engine::EngineError;

/// Owns the output stream on a dedicated thread, since the stream itself
/// cannot leave the thread that opened it.
pub(super) struct OutputThread {
    mixer: Mixer,
    shutdown: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl OutputThread {
    pub(super) fn mixer(&self) -> &Mixer {
        &self.mixer
    }
}

pub(super) fn spawn_output_thread() -> Result<OutputThread, EngineError> {
    let (ready_tx, ready_rx) = mpsc::sync_channel::<Result<Mixer, String>>(1);
    let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

    let handle = thread::Builder::new()
        .name("audio-output".into())
        .spawn(move || {
            let mut stream = match OutputStreamBuilder::open_default_stream() {
                Ok(stream) => stream,
                Err(e) => {
                    let _ = ready_tx.send(Err(e.to_string()));
                    return;
                }
            };
            // rodio logs to stderr when OutputStream is dropped. That's useful in debugging,
            // but noisy for a TUI app.
            stream.log_on_drop(false);

            if ready_tx.send(Ok(stream.mixer().clone())).is_err() {
                return;
            }
            // Returns once the engine drops its sender.
            let _ = shutdown_rx.recv();
            debug!("output stream closed");
        })
        .map_err(|e| EngineError::Unavailable(e.to_string()))?;

    match ready_rx.recv() {
        Ok(Ok(mixer)) => Ok(OutputThread {
            mixer,
            shutdown: Some(shutdown_tx),
            handle: Some(handle),
        }),
        Ok(Err(reason)) => {
            let _ = handle.join();
            Err(EngineError::Unavailable(reason))
        }
        Err(_) => Err(EngineError::Unavailable(
            "audio output thread exited early".into(),
        )),
    }
}

impl Drop for OutputThread {
    fn drop(&mut self) {
        drop(self.shutdown.take());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
