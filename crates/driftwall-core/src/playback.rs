//! Clock-synchronized playback engine for the overlay animation.
//!
//! One exclusively-owned session per activation. Activation issues a
//! one-shot asset load tagged with a session epoch; the host fetches and
//! decodes off the main path and hands the result back, which is ignored if
//! the session was torn down in the meantime.
//!
//! While playing, the displayed frame is a pure function of the clock:
//! `floor(audio_position × fps)` when an audio clock is available, otherwise
//! `floor(elapsed_wall / frame_duration)`, always clamped to the frame
//! range. Reaching the last frame freezes the output and releases the wake
//! lock; further clock advancement never wraps around.

use std::time::Duration;

use crate::frames::{AssetError, FrameSet};
use crate::viewport::{DisplayScale, Viewport, fit_display};

/// Best-effort screen wake lock.
///
/// Hosts without the capability plug in [`NoopWakeLock`]; failure to acquire
/// is silently non-fatal.
pub trait WakeLock {
    /// Attempt to acquire. Returns whether the lock is actually held.
    fn acquire(&mut self) -> bool;
    /// Release if held. Idempotent.
    fn release(&mut self);
}

/// Wake lock for hosts without the capability. Never holds.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopWakeLock;

impl WakeLock for NoopWakeLock {
    fn acquire(&mut self) -> bool {
        false
    }
    fn release(&mut self) {}
}

/// Playback session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// No session. Also the post-teardown state.
    Idle,
    /// Asset load in flight.
    Loading,
    /// Frames decoded, audio not yet started.
    Ready,
    /// Autoplay was rejected; waiting for an external user gesture.
    PendingGesture,
    /// Frames advancing against the clock.
    Playing,
    /// Last frame reached; output frozen, wake lock released.
    Completed,
    /// Asset fetch/decompress/parse failed. Terminal; no retry.
    Failed,
}

/// Which clock drives the frame index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockSource {
    /// Host-supplied audio position.
    Audio,
    /// Engine time elapsed since playback began.
    Wall,
}

/// Tag for one asset-load request. A completion carrying a stale token is
/// ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadToken {
    epoch: u64,
}

/// The overlay playback engine. All session state lives here; nothing is
/// process-global.
pub struct PlaybackEngine {
    state: PlaybackState,
    epoch: u64,
    frames: Option<FrameSet>,
    clock: ClockSource,
    origin: Duration,
    frame_index: usize,
    visible: bool,
    container: Viewport,
    scale: Option<DisplayScale>,
    wake: Box<dyn WakeLock>,
    wake_held: bool,
    error: Option<String>,
}

impl PlaybackEngine {
    /// Engine with no wake-lock capability.
    pub fn new() -> Self {
        Self::with_wake_lock(Box::new(NoopWakeLock))
    }

    /// Engine with a host-provided wake lock.
    pub fn with_wake_lock(wake: Box<dyn WakeLock>) -> Self {
        Self {
            state: PlaybackState::Idle,
            epoch: 0,
            frames: None,
            clock: ClockSource::Wall,
            origin: Duration::ZERO,
            frame_index: 0,
            visible: true,
            container: Viewport::default(),
            scale: None,
            wake,
            wake_held: false,
            error: None,
        }
    }

    /// Start a session: tear down any previous one, enter `Loading`, and
    /// return the token the host must pass back with the asset result.
    pub fn activate(&mut self, container: Viewport) -> LoadToken {
        self.deactivate();
        self.container = container;
        self.state = PlaybackState::Loading;
        log::debug!("playback activated (epoch {})", self.epoch);
        LoadToken { epoch: self.epoch }
    }

    /// Deliver the one-shot asset load result.
    ///
    /// A result tagged with a stale token — the session was deactivated
    /// while the load was in flight — is ignored entirely.
    pub fn on_asset_loaded(&mut self, token: LoadToken, result: Result<FrameSet, AssetError>) {
        if token.epoch != self.epoch || self.state != PlaybackState::Loading {
            log::debug!("ignoring stale asset result (epoch {})", token.epoch);
            return;
        }
        match result {
            Ok(frames) => {
                self.refit(&frames);
                self.frames = Some(frames);
                self.state = PlaybackState::Ready;
            }
            Err(e) => {
                log::warn!("asset load failed: {e}");
                self.error = Some(e.to_string());
                self.state = PlaybackState::Failed;
            }
        }
    }

    /// Audio started (or the host elected the wall clock): begin playing.
    /// Valid from `Ready`; a best-effort wake lock is acquired.
    pub fn begin(&mut self, clock: ClockSource, now: Duration) {
        if self.state != PlaybackState::Ready {
            return;
        }
        self.start_playing(clock, now);
    }

    /// Autoplay was rejected by the host environment. Non-fatal: wait for a
    /// user gesture instead of failing.
    pub fn on_autoplay_rejected(&mut self) {
        if self.state == PlaybackState::Ready {
            self.state = PlaybackState::PendingGesture;
        }
    }

    /// External user-gesture event. Leaves `PendingGesture`.
    pub fn on_user_gesture(&mut self, clock: ClockSource, now: Duration) {
        if self.state == PlaybackState::PendingGesture {
            self.start_playing(clock, now);
        }
    }

    /// Whether the host should keep scheduling per-frame ticks.
    pub fn wants_tick(&self) -> bool {
        self.state == PlaybackState::Playing && self.visible
    }

    /// Per-frame clock tick. `audio_position` is the audio clock when
    /// available; otherwise the wall clock (engine time minus the playback
    /// origin) drives the index.
    pub fn tick(&mut self, now: Duration, audio_position: Option<Duration>) {
        if !self.wants_tick() {
            return;
        }
        let Some(frames) = &self.frames else { return };

        let position = match (self.clock, audio_position) {
            (ClockSource::Audio, Some(pos)) => pos,
            _ => now.saturating_sub(self.origin),
        };

        self.frame_index = frames.index_at(position);
        if self.frame_index == frames.last_index() {
            // Freeze on the final frame; further clock advancement must not
            // change the display or wrap around.
            self.state = PlaybackState::Completed;
            self.release_wake();
        }
    }

    /// Tab hidden/visible. Hiding suspends ticking without losing state;
    /// showing resumes from the current clock position.
    pub fn on_visibility(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Viewport resize: refit the overlay scale against the container box.
    /// An unmeasurable container is a logged no-op.
    pub fn on_resize(&mut self, container: Viewport) {
        self.container = container;
        if let Some(frames) = self.frames.take() {
            self.refit(&frames);
            self.frames = Some(frames);
        }
    }

    /// Tear down the session: bump the epoch so an in-flight asset load
    /// becomes stale, release the wake lock, and return to `Idle`.
    pub fn deactivate(&mut self) {
        self.epoch += 1;
        self.release_wake();
        self.state = PlaybackState::Idle;
        self.frames = None;
        self.scale = None;
        self.frame_index = 0;
        self.error = None;
    }

    /// Current lifecycle state.
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Static error string after a failed load.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Current frame index.
    pub fn frame_index(&self) -> usize {
        self.frame_index
    }

    /// Text of the currently displayed frame, while playing or frozen on
    /// the final frame.
    pub fn current_frame(&self) -> Option<&str> {
        match self.state {
            PlaybackState::Playing | PlaybackState::Completed => {
                self.frames.as_ref().map(|f| f.frame(self.frame_index))
            }
            _ => None,
        }
    }

    /// Fitted overlay geometry, once frames are decoded and the container
    /// measured.
    pub fn display_scale(&self) -> Option<DisplayScale> {
        self.scale
    }

    /// The decoded frame set, once ready.
    pub fn frames(&self) -> Option<&FrameSet> {
        self.frames.as_ref()
    }

    /// Whether the wake lock is currently held.
    pub fn holds_wake_lock(&self) -> bool {
        self.wake_held
    }

    fn start_playing(&mut self, clock: ClockSource, now: Duration) {
        self.clock = clock;
        self.origin = now;
        self.frame_index = 0;
        self.state = PlaybackState::Playing;
        self.wake_held = self.wake.acquire();
    }

    fn refit(&mut self, frames: &FrameSet) {
        match fit_display(self.container, frames.cols()) {
            Some(scale) => self.scale = Some(scale),
            None => log::warn!(
                "container not measurable ({}x{}), skipping display fit",
                self.container.width,
                self.container.height
            ),
        }
    }

    fn release_wake(&mut self) {
        if self.wake_held {
            self.wake.release();
            self.wake_held = false;
        }
    }
}

impl Default for PlaybackEngine {
    fn default() -> Self {
        Self::new()
    }
}
