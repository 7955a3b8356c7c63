//! Rotating emitter driven from the engine clock.
//!
//! A single ticker thread per run writes the panner position every period.
//! Elapsed time is measured on the engine's clock rather than the wall clock,
//! so the orbit stays in step with what is actually being heard.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::OrbitSettings;
use crate::engine::AudioEngine;
use crate::graph::{Position, SpatialTarget};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct OrbitConfig {
    pub radius_x: f32,
    pub radius_z: f32,
    /// Radians per second.
    pub speed: f32,
    pub period: Duration,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self::from(&OrbitSettings::default())
    }
}

impl From<&OrbitSettings> for OrbitConfig {
    fn from(s: &OrbitSettings) -> Self {
        Self {
            radius_x: s.radius_x,
            radius_z: s.radius_z,
            speed: s.speed,
            period: Duration::from_millis(s.tick_ms.max(1)),
        }
    }
}

impl OrbitConfig {
    /// Flattened ellipse: wide left/right swing, shallow front/back.
    pub fn wide() -> Self {
        Self {
            radius_x: 1.4,
            radius_z: 0.6,
            speed: 1.0,
            ..Self::default()
        }
    }
}

/// Emitter position `elapsed` seconds into an orbit.
pub fn orbit_position(config: &OrbitConfig, elapsed: f64) -> Position {
    let angle = f64::from(config.speed) * elapsed;
    Position::new(
        config.radius_x * angle.cos() as f32,
        0.0,
        config.radius_z * angle.sin() as f32,
    )
}

struct Ticker {
    stop: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

pub struct OrbitDriver {
    config: OrbitConfig,
    ticker: Option<Ticker>,
    runs: u64,
}

impl OrbitDriver {
    pub fn new(config: OrbitConfig) -> Self {
        Self {
            config,
            ticker: None,
            runs: 0,
        }
    }

    pub fn config(&self) -> &OrbitConfig {
        &self.config
    }

    /// Begin orbiting from `clock_now` (engine seconds). A running orbit is
    /// stopped first.
    pub fn start<E: AudioEngine>(&mut self, clock_now: f64, target: SpatialTarget<E>) {
        self.stop();

        let config = self.config;
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);
        target.set_position(orbit_position(&config, 0.0));

        let spawned = thread::Builder::new()
            .name("orbit".into())
            .spawn(move || {
                loop {
                    thread::park_timeout(config.period);
                    if stop_flag.load(Ordering::Acquire) {
                        break;
                    }
                    let elapsed = (target.now() - clock_now).max(0.0);
                    target.set_position(orbit_position(&config, elapsed));
                }
            });

        match spawned {
            Ok(handle) => {
                self.runs += 1;
                self.ticker = Some(Ticker { stop, handle });
                debug!(run = self.runs, "orbit started");
            }
            Err(e) => warn!(error = %e, "could not spawn orbit ticker"),
        }
    }

    /// Cancel the ticker. Returns false if nothing was running.
    pub fn stop(&mut self) -> bool {
        let Some(ticker) = self.ticker.take() else {
            return false;
        };
        ticker.stop.store(true, Ordering::Release);
        ticker.handle.thread().unpark();
        if ticker.handle.join().is_err() {
            warn!("orbit ticker panicked");
        }
        debug!(run = self.runs, "orbit stopped");
        true
    }

    pub fn is_running(&self) -> bool {
        self.ticker.is_some()
    }

    /// How many times an orbit has been started.
    pub fn runs(&self) -> u64 {
        self.runs
    }
}

impl Drop for OrbitDriver {
    fn drop(&mut self) {
        self.stop();
    }
}
