use std::cell::{Cell, RefCell};

use tracing::{debug, info, warn};

use crate::config::PresetSettings;
use crate::engine::{AudioEngine, HandleId, MediaElement};
use crate::library::{InputFile, Playlist, Track, clean_song_name};
use crate::metadata::{MetadataDisplay, MetadataFetcher};
use crate::orbit::OrbitDriver;
use crate::session::AudioSession;

use super::types::{AddOutcome, MediaStatus, PlayOutcome, PlaybackError, PlayerState};
use super::view::TransportView;

struct Inner<E: AudioEngine> {
    session: AudioSession<E>,
    orbit: OrbitDriver,
    playlist: Playlist,
    state: PlayerState,
    current: Option<usize>,
    media: Option<E::Media>,
    /// Playlist index of `media`. Differs from `current` while a newer
    /// track is bound but not yet activated.
    bound: Option<usize>,
    preset: String,
}

impl<E: AudioEngine> Inner<E> {
    /// Silence the bound media and stop the orbit. Returns whether it was playing.
    fn halt(&mut self) -> bool {
        if let Some(media) = &self.media {
            media.pause();
        }
        self.orbit.stop();
        let was_playing = self.state == PlayerState::Playing;
        if was_playing {
            self.state = PlayerState::Paused;
        }
        was_playing
    }

    fn start_orbit(&mut self) {
        if let Some(target) = self.session.graph().spatial_target() {
            let now = target.now();
            self.orbit.start(now, target);
        }
    }

    fn clear_media(&mut self) {
        self.media = None;
        self.bound = None;
    }

    fn idle_state(&self) -> PlayerState {
        if self.playlist.is_empty() {
            PlayerState::Empty
        } else if self.media.is_some() || self.current.is_some() {
            PlayerState::Paused
        } else {
            PlayerState::Loaded
        }
    }
}

/// Owns the playlist and drives the graph, orbit and view through play,
/// pause, seek and track changes.
///
/// Methods take `&self` so that a new request can be issued while an earlier
/// one is suspended. Every play request takes a token; a request whose token
/// is no longer the newest when it wakes up backs off without touching state,
/// so the last request wins.
pub struct PlaybackController<E: AudioEngine, V: TransportView> {
    inner: RefCell<Inner<E>>,
    view: V,
    metadata: MetadataFetcher,
    presets: PresetSettings,
    requests: Cell<u64>,
}

impl<E: AudioEngine, V: TransportView> PlaybackController<E, V> {
    pub fn new(
        session: AudioSession<E>,
        orbit: OrbitDriver,
        view: V,
        metadata: MetadataFetcher,
        presets: PresetSettings,
    ) -> Self {
        let preset = presets.default.clone();
        Self {
            inner: RefCell::new(Inner {
                session,
                orbit,
                playlist: Playlist::new(),
                state: PlayerState::Empty,
                current: None,
                media: None,
                bound: None,
                preset,
            }),
            view,
            metadata,
            presets,
            requests: Cell::new(0),
        }
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn state(&self) -> PlayerState {
        self.inner.borrow().state
    }

    pub fn current_index(&self) -> Option<usize> {
        self.inner.borrow().current
    }

    pub fn track_names(&self) -> Vec<String> {
        self.inner
            .borrow()
            .playlist
            .iter()
            .map(|t| t.display_name.clone())
            .collect()
    }

    pub fn track_count(&self) -> usize {
        self.inner.borrow().playlist.len()
    }

    pub fn orbit_running(&self) -> bool {
        self.inner.borrow().orbit.is_running()
    }

    /// Number of orbits started so far.
    pub fn orbit_runs(&self) -> u64 {
        self.inner.borrow().orbit.runs()
    }

    pub fn bound_handle(&self) -> Option<HandleId> {
        self.inner.borrow().session.graph().bound_handle()
    }

    pub fn track_handle(&self, index: usize) -> Option<HandleId> {
        self.inner.borrow().playlist.get(index).map(|t| t.handle.id())
    }

    pub fn live_handles(&self) -> usize {
        self.inner.borrow().session.live_handles()
    }

    pub fn current_preset(&self) -> String {
        self.inner.borrow().preset.clone()
    }

    pub fn media_status(&self) -> Option<MediaStatus> {
        let inner = self.inner.borrow();
        inner.media.as_ref().map(|m| MediaStatus {
            position: m.position(),
            duration: m.duration(),
            paused: m.is_paused(),
            ended: m.has_ended(),
        })
    }

    fn next_token(&self) -> u64 {
        let token = self.requests.get() + 1;
        self.requests.set(token);
        token
    }

    fn is_stale(&self, token: u64) -> bool {
        self.requests.get() != token
    }

    fn refresh_playlist(&self) {
        let inner = self.inner.borrow();
        self.view
            .render_playlist(&inner.playlist.names(), inner.current);
    }

    /// Append files not already listed by name. The first add into an empty
    /// playlist starts the first track.
    pub async fn add_files(&self, files: Vec<InputFile>) -> AddOutcome {
        let mut outcome = AddOutcome::default();
        let first_add = {
            let mut inner = self.inner.borrow_mut();
            let was_empty = inner.playlist.is_empty() && inner.current.is_none();
            for file in files {
                if inner.playlist.contains(&file.name) {
                    debug!(name = %file.name, "skipping duplicate");
                    outcome.duplicates += 1;
                    continue;
                }
                let handle = inner.session.register(file.bytes);
                inner.playlist.push_unique(Track {
                    display_name: file.name,
                    handle,
                });
                outcome.added += 1;
            }
            if outcome.added > 0 && inner.state == PlayerState::Empty {
                inner.state = PlayerState::Loaded;
            }
            was_empty && outcome.added > 0
        };

        if outcome.added > 0 {
            info!(
                added = outcome.added,
                duplicates = outcome.duplicates,
                "tracks added"
            );
            self.refresh_playlist();
        }
        if first_add {
            outcome.started = matches!(self.play_track_at(0).await, Ok(PlayOutcome::Playing));
        }
        outcome
    }

    /// Bind and play the track at `index` from the start.
    pub async fn play_track_at(&self, index: usize) -> Result<PlayOutcome, PlaybackError> {
        let len = self.track_count();
        if index >= len {
            return Err(PlaybackError::IndexOutOfBounds { index, len });
        }
        let token = self.next_token();

        let engine = self.inner.borrow_mut().session.graph_mut().ensure_initialized();
        let engine = match engine {
            Ok(engine) => engine,
            Err(e) => return self.fail(token, e.into()),
        };
        if let Err(e) = engine.resume().await {
            return self.fail(token, e.into());
        }
        if self.is_stale(token) {
            debug!(index, "play request superseded before bind");
            return Ok(PlayOutcome::Superseded);
        }

        let (was_playing, bound) = {
            let mut inner = self.inner.borrow_mut();
            let was_playing = inner.halt();
            let handle = inner.playlist.get(index).map(|t| t.handle.clone());
            let bound = match handle {
                Some(handle) => inner
                    .session
                    .graph_mut()
                    .bind_source(&handle)
                    .map_err(PlaybackError::from),
                None => Err(PlaybackError::IndexOutOfBounds {
                    index,
                    len: inner.playlist.len(),
                }),
            };
            match &bound {
                Ok(media) => {
                    media.set_position(0.0);
                    inner.media = Some(media.clone());
                    inner.bound = Some(index);
                }
                Err(_) => inner.clear_media(),
            }
            (was_playing, bound)
        };
        if was_playing {
            self.view.show_playing(false);
        }
        let media = match bound {
            Ok(media) => media,
            Err(e) => return self.fail(token, e),
        };

        let handle = self.track_handle(index);
        let played = media.play().await;
        if self.is_stale(token) {
            debug!(index, "play request superseded after start");
            self.settle_superseded(&media, handle, played.is_ok());
            return Ok(PlayOutcome::Superseded);
        }
        if let Err(e) = played {
            {
                let mut inner = self.inner.borrow_mut();
                inner.session.graph_mut().unbind_source();
                inner.clear_media();
            }
            return self.fail(token, e.into());
        }

        self.activate(token, index);
        Ok(PlayOutcome::Playing)
    }

    /// A superseded request may have started media nobody wants any more.
    /// Only the bound media of a playing controller is left running.
    fn settle_superseded(&self, media: &E::Media, handle: Option<HandleId>, started: bool) {
        if started && !keeps_running(handle, self.bound_handle(), self.state()) {
            media.pause();
        }
    }

    fn fail(&self, token: u64, err: PlaybackError) -> Result<PlayOutcome, PlaybackError> {
        if self.is_stale(token) {
            debug!(error = %err, "superseded request failed");
            return Ok(PlayOutcome::Superseded);
        }
        {
            let mut inner = self.inner.borrow_mut();
            inner.halt();
            let idle = inner.idle_state();
            inner.state = idle;
        }
        warn!(error = %err, "playback failed");
        self.view.show_playing(false);
        self.view.show_error(&err.to_string());
        Err(err)
    }

    fn activate(&self, token: u64, index: usize) {
        let (query, duration) = {
            let mut inner = self.inner.borrow_mut();
            inner.current = Some(index);
            inner.state = PlayerState::Playing;
            inner.start_orbit();
            let query = inner
                .playlist
                .get(index)
                .map(|t| clean_song_name(&t.display_name))
                .unwrap_or_default();
            (query, inner.media.as_ref().and_then(|m| m.duration()))
        };
        info!(index, "playing");

        self.view.show_playing(true);
        self.view.show_progress(0.0, duration);
        self.refresh_playlist();
        if self.metadata.is_enabled() {
            self.view
                .show_metadata(&MetadataDisplay::Searching(query.clone()));
        }
        self.metadata.request(token, &query);
    }

    /// Pause if playing, otherwise resume.
    pub async fn toggle_play_pause(&self) -> Result<PlayerState, PlaybackError> {
        match self.state() {
            PlayerState::Empty => return Err(PlaybackError::NothingLoaded),
            PlayerState::Playing => {
                self.pause();
            }
            PlayerState::Loaded | PlayerState::Paused => {
                self.resume().await?;
            }
        }
        Ok(self.state())
    }

    /// Pause playback and cancel any in-flight play request. Returns false if
    /// nothing was playing.
    pub fn pause(&self) -> bool {
        self.next_token();
        let was_playing = self.inner.borrow_mut().halt();
        if was_playing {
            info!("paused");
            self.view.show_playing(false);
        }
        was_playing
    }

    /// Continue the current track where it stopped. Plays the first track if
    /// nothing has been bound yet.
    pub async fn resume(&self) -> Result<PlayOutcome, PlaybackError> {
        let (state, media, current, bound) = {
            let inner = self.inner.borrow();
            (inner.state, inner.media.clone(), inner.current, inner.bound)
        };
        match state {
            PlayerState::Empty => return Err(PlaybackError::NothingLoaded),
            PlayerState::Playing => return Ok(PlayOutcome::Playing),
            PlayerState::Loaded | PlayerState::Paused => {}
        }
        let Some(media) = media else {
            return self.play_track_at(current.unwrap_or(0)).await;
        };

        let token = self.next_token();
        let handle = self.bound_handle();
        let engine = self.inner.borrow_mut().session.graph_mut().ensure_initialized();
        let engine = match engine {
            Ok(engine) => engine,
            Err(e) => return self.fail(token, e.into()),
        };
        if let Err(e) = engine.resume().await {
            return self.fail(token, e.into());
        }
        if self.is_stale(token) {
            return Ok(PlayOutcome::Superseded);
        }

        let played = media.play().await;
        if self.is_stale(token) {
            self.settle_superseded(&media, handle, played.is_ok());
            return Ok(PlayOutcome::Superseded);
        }
        if let Err(e) = played {
            return self.fail(token, e.into());
        }

        // The media belongs to a track whose own request was superseded
        // before it could activate; finish that activation here.
        if let Some(index) = bound.filter(|&i| Some(i) != current) {
            self.activate(token, index);
            return Ok(PlayOutcome::Playing);
        }

        {
            let mut inner = self.inner.borrow_mut();
            inner.state = PlayerState::Playing;
            inner.start_orbit();
        }
        info!("resumed");
        self.view.show_playing(true);
        Ok(PlayOutcome::Playing)
    }

    /// Jump to `fraction` of the track. Returns the new position in seconds.
    pub fn seek_to_fraction(&self, fraction: f64) -> Result<f64, PlaybackError> {
        if !(0.0..=1.0).contains(&fraction) {
            return Err(PlaybackError::InvalidFraction(fraction));
        }
        let (target, duration) = {
            let inner = self.inner.borrow();
            let media = inner.media.as_ref().ok_or(PlaybackError::NothingLoaded)?;
            let duration = media
                .duration()
                .filter(|d| d.is_finite() && *d > 0.0)
                .ok_or(PlaybackError::DurationUnknown)?;
            let target = fraction * duration;
            media.set_position(target);
            (target, duration)
        };
        debug!(target, "seek");
        self.view.show_progress(target, Some(duration));
        Ok(target)
    }

    /// Move by `delta` of the track length, clamped to the track.
    pub fn seek_by(&self, delta: f64) -> Result<f64, PlaybackError> {
        let status = self.media_status().ok_or(PlaybackError::NothingLoaded)?;
        let duration = status
            .duration
            .filter(|d| d.is_finite() && *d > 0.0)
            .ok_or(PlaybackError::DurationUnknown)?;
        let fraction = (status.position / duration + delta).clamp(0.0, 1.0);
        self.seek_to_fraction(fraction)
    }

    pub fn on_time_update(&self) {
        if let Some(status) = self.media_status() {
            self.view.show_progress(status.position, status.duration);
        }
    }

    pub fn on_duration_known(&self, duration: f64) {
        self.view.show_duration(duration);
    }

    /// Advance after the current track ran out. Past the last track, stop at
    /// the start of the current one.
    pub async fn on_track_ended(&self) -> Result<Option<PlayOutcome>, PlaybackError> {
        let (next, duration) = {
            let mut inner = self.inner.borrow_mut();
            if inner.state != PlayerState::Playing {
                return Ok(None);
            }
            inner.halt();
            let len = inner.playlist.len();
            let next = inner.current.map(|i| i + 1).filter(|&n| n < len);
            let duration = inner.media.as_ref().and_then(|m| m.duration());
            if next.is_none() {
                // The next play rebinds the current track from zero.
                inner.session.graph_mut().unbind_source();
                inner.clear_media();
            }
            (next, duration)
        };
        self.view.show_playing(false);

        match next {
            Some(index) => self.play_track_at(index).await.map(Some),
            None => {
                info!("end of playlist");
                self.view.show_progress(0.0, duration);
                Ok(None)
            }
        }
    }

    /// Apply a tone preset by name.
    pub fn apply_preset(&self, name: &str) -> Result<(), PlaybackError> {
        let profile = self
            .presets
            .resolve(name)
            .ok_or_else(|| PlaybackError::UnknownPreset(name.to_string()))?;
        {
            let mut inner = self.inner.borrow_mut();
            inner.session.graph_mut().apply_preset(profile);
            inner.preset = name.to_string();
        }
        info!(preset = name, "preset applied");
        self.view.show_preset(name);
        Ok(())
    }

    /// Push the newest metadata result to the view, if one arrived.
    pub fn poll_metadata(&self) -> bool {
        match self.metadata.take_update() {
            Some(display) => {
                self.view.show_metadata(&display);
                true
            }
            None => false,
        }
    }

    /// End the session: stop everything, release the graph and revoke every
    /// track handle. Returns the number of handles revoked.
    pub fn teardown(&self) -> usize {
        self.next_token();
        let revoked = {
            let mut inner = self.inner.borrow_mut();
            inner.halt();
            inner.clear_media();
            inner.current = None;
            inner.playlist.drain();
            inner.state = PlayerState::Empty;
            inner.session.teardown()
        };
        self.view.show_playing(false);
        self.refresh_playlist();
        revoked
    }
}

/// Whether a superseded request's media may keep playing: only when it is
/// still bound and the controller is playing it.
fn keeps_running(media: Option<HandleId>, bound: Option<HandleId>, state: PlayerState) -> bool {
    media.is_some() && media == bound && state == PlayerState::Playing
}
