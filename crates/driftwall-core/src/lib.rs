//! # driftwall-core
//!
//! **A comment wall that drifts.**
//!
//! `driftwall-core` is the presentation engine behind the drifting comment
//! wall: a weighted sampler picks messages from a feed snapshot, a bounded
//! swarm scheduler floats value-copies of them across the viewport, and a
//! clock-synchronized playback engine renders a compressed text-frame
//! animation as an overlay.
//!
//! ## Quick Start
//!
//! ```
//! use std::time::Duration;
//! use driftwall_core::{Message, SwarmScheduler, Viewport};
//!
//! let feed = vec![
//!     Message::new("m1", "ada", "hello wall", 3),
//!     Message::new("m2", "lin", "drift on", 1),
//! ];
//!
//! let mut swarm = SwarmScheduler::new(Viewport::new(1280, 720));
//! swarm.set_feed(&feed, Duration::ZERO);
//!
//! // The host drives time; every due spawn fires inside advance().
//! swarm.advance(Duration::from_secs(5));
//! assert!(!swarm.items().is_empty());
//! ```
//!
//! ## Architecture
//!
//! Feed snapshot → weight table → sampler → swarm scheduler → host render
//!
//! All scheduling is single-threaded and cooperative: time is an explicit
//! `Duration` since mount, hosts drive it with wall time, and tests drive it
//! with simulated time. Nothing here blocks, sleeps, or spawns threads.
//!
//! The playback overlay is independent of the swarm: [`PlaybackEngine`]
//! owns one session per activation, loads its frame asset through an
//! epoch-tagged one-shot request, and derives the displayed frame purely
//! from the clock.

pub mod feed;
pub mod frames;
pub mod playback;
pub mod swarm;
pub mod timer;
pub mod viewport;
pub mod weights;

pub use feed::{ANONYMOUS, Message, parse_snapshot};
pub use frames::{AssetError, DEFAULT_FPS, FrameSet};
pub use playback::{
    ClockSource, LoadToken, NoopWakeLock, PlaybackEngine, PlaybackState, WakeLock,
};
pub use swarm::{DEFAULT_STAGGER, FlyingItem, SwarmConfig, SwarmScheduler};
pub use timer::{TimerId, TimerQueue};
pub use viewport::{
    DisplayScale, MIN_CELL_SIZE, OVERLAY_ASPECT, Viewport, fit_display, font_size_range,
    swarm_capacity,
};
pub use weights::{WeightTable, WeightedEntry, weight_for};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
