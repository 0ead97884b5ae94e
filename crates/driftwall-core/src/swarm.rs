//! Swarm scheduler: a bounded, continuously replenished set of flying items.
//!
//! Each live item is an independent timed animation instance sourced from
//! the weighted sampler. There is no shared tick: every item's lifecycle is
//! driven by its own traversal timer, and replacements are inserted after a
//! per-spawn stagger delay so batches never land as a synchronized burst.
//!
//! A feed snapshot change is an atomic-from-the-outside reset: the old batch
//! is entirely cleared (items and pending timers both) before the new batch
//! begins staggering in.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use uuid::Uuid;

use crate::feed::Message;
use crate::timer::TimerQueue;
use crate::viewport::{Viewport, font_size_range, swarm_capacity};
use crate::weights::WeightTable;

/// Default insertion stagger between consecutive spawns.
pub const DEFAULT_STAGGER: Duration = Duration::from_millis(200);

/// Vertical lane range: items occupy the top 0–80% of the viewport.
const TOP_PERCENT_MAX: f64 = 80.0;

/// Traversal duration range in seconds.
const TRAVERSAL_SECS: (f64, f64) = (4.0, 10.0);

/// One ephemeral visual instance of a sampled message.
///
/// Holds value-copies of the source message's body and author, taken at
/// creation time — the feed snapshot can be replaced while the item is still
/// animating.
#[derive(Debug, Clone)]
pub struct FlyingItem {
    /// Instance key, distinct from every other live item even when two
    /// items share a source message.
    pub key: Uuid,
    /// Copied message text.
    pub body: String,
    /// Copied author name.
    pub author: String,
    /// Vertical offset as a percentage of viewport height, in `[0, 80)`.
    pub top_percent: f64,
    /// Font size rolled from the width-dependent range.
    pub font_size: u32,
    /// Traversal duration across the viewport.
    pub duration: Duration,
    /// Engine time at which the item was inserted.
    pub spawned_at: Duration,
}

impl FlyingItem {
    /// Traversal progress in `[0, 1]` at engine time `now`.
    pub fn progress(&self, now: Duration) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_sub(self.spawned_at);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }
}

/// Scheduler tuning knobs.
#[derive(Debug, Clone)]
pub struct SwarmConfig {
    /// Insertion stagger between consecutive spawns.
    pub stagger: Duration,
    /// Fixed capacity instead of the viewport-width policy.
    pub capacity_override: Option<usize>,
}

impl Default for SwarmConfig {
    fn default() -> Self {
        Self {
            stagger: DEFAULT_STAGGER,
            capacity_override: None,
        }
    }
}

enum SwarmTimer {
    /// Initial-batch spawn: draw from the sampler when the timer fires.
    Spawn,
    /// Replacement insertion carrying the value-copy drawn at completion.
    Respawn { body: String, author: String },
    /// Traversal complete for the item with this key.
    Complete(Uuid),
}

/// Bounded lifecycle scheduler for the comment swarm.
///
/// Host-driven: call [`advance`](Self::advance) whenever time moves, with
/// `now` as the duration since mount. All per-session mutable state lives
/// inside this value; [`teardown`](Self::teardown) deterministically cancels
/// every pending timer.
pub struct SwarmScheduler {
    table: WeightTable,
    live: Vec<FlyingItem>,
    timers: TimerQueue<SwarmTimer>,
    rng: StdRng,
    viewport: Viewport,
    capacity: usize,
    config: SwarmConfig,
}

impl SwarmScheduler {
    /// Create a scheduler with OS-seeded randomness.
    pub fn new(viewport: Viewport) -> Self {
        Self::with_config(viewport, SwarmConfig::default(), StdRng::from_os_rng())
    }

    /// Create a scheduler with explicit config and RNG (seedable for tests).
    ///
    /// # Panics
    /// Panics when `config.capacity_override` is `Some(0)` — a zero-capacity
    /// swarm is a caller contract violation.
    pub fn with_config(viewport: Viewport, config: SwarmConfig, rng: StdRng) -> Self {
        if let Some(k) = config.capacity_override {
            assert!(k > 0, "swarm capacity override must be positive");
        }
        let capacity = config
            .capacity_override
            .unwrap_or_else(|| swarm_capacity(viewport.width));
        Self {
            table: WeightTable::default(),
            live: Vec::new(),
            timers: TimerQueue::new(),
            rng,
            viewport,
            capacity,
            config,
        }
    }

    /// Receive a full-replace feed snapshot.
    ///
    /// Clears all live items and pending timers, rebuilds the weight table,
    /// then schedules up to `capacity` spawns staggered by
    /// `config.stagger × index`.
    pub fn set_feed(&mut self, messages: &[Message], now: Duration) {
        self.table = WeightTable::build(messages);
        self.live.clear();
        self.timers.clear();

        log::debug!(
            "feed snapshot: {} records, {} eligible, total weight {}",
            messages.len(),
            self.table.len(),
            self.table.total_weight()
        );

        for i in 0..self.capacity {
            self.timers
                .schedule(now + self.config.stagger * i as u32, SwarmTimer::Spawn);
        }
    }

    /// React to a viewport resize. The new capacity applies to subsequent
    /// spawns only; live items are never evicted.
    pub fn on_resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        if self.config.capacity_override.is_none() {
            self.capacity = swarm_capacity(viewport.width);
        }
    }

    /// Fire every timer due at `now`, in deadline order.
    pub fn advance(&mut self, now: Duration) {
        while let Some((_, event)) = self.timers.pop_due(now) {
            match event {
                SwarmTimer::Spawn => {
                    let drawn = self
                        .table
                        .sample(&mut self.rng)
                        .map(|m| (m.body.clone(), m.author.clone()));
                    match drawn {
                        Some((body, author)) => self.insert_item(body, author, now),
                        // No selection: leave the slot empty until the next
                        // feed change.
                        None => {}
                    }
                }
                SwarmTimer::Respawn { body, author } => {
                    self.insert_item(body, author, now);
                }
                SwarmTimer::Complete(key) => self.on_complete(key, now),
            }
        }
    }

    /// Deactivate: cancel every pending timer and drop all live items.
    /// Nothing fires after this returns.
    pub fn teardown(&mut self) {
        self.timers.clear();
        self.live.clear();
        self.table = WeightTable::default();
    }

    /// Currently live items. The engine's public render surface.
    pub fn items(&self) -> &[FlyingItem] {
        &self.live
    }

    /// Current capacity ceiling.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of pending timers (spawns in flight plus traversals).
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Earliest pending deadline, for host loop pacing.
    pub fn next_deadline(&mut self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    fn insert_item(&mut self, body: String, author: String, now: Duration) {
        // Capacity is a hard ceiling: a spawn that fires while the swarm is
        // full is dropped, not queued.
        if self.live.len() >= self.capacity {
            return;
        }

        let (min_secs, max_secs) = TRAVERSAL_SECS;
        let font_range = font_size_range(self.viewport.width);
        let item = FlyingItem {
            key: Uuid::new_v4(),
            body,
            author,
            top_percent: self.rng.random_range(0.0..TOP_PERCENT_MAX),
            font_size: self.rng.random_range(font_range),
            duration: Duration::from_secs_f64(self.rng.random_range(min_secs..=max_secs)),
            spawned_at: now,
        };

        self.timers
            .schedule(now + item.duration, SwarmTimer::Complete(item.key));
        self.live.push(item);
    }

    fn on_complete(&mut self, key: Uuid, now: Duration) {
        self.live.retain(|item| item.key != key);

        // Draw the replacement now; its insertion waits one stagger so
        // replenishment never bursts.
        let drawn = self
            .table
            .sample(&mut self.rng)
            .map(|m| (m.body.clone(), m.author.clone()));
        if let Some((body, author)) = drawn {
            self.timers.schedule(
                now + self.config.stagger,
                SwarmTimer::Respawn { body, author },
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::Message;

    const MS: Duration = Duration::from_millis(1);

    fn feed() -> Vec<Message> {
        vec![
            Message::new("a", "ada", "first message", 3),
            Message::new("b", "bob", "second message", 1),
            Message::anonymous("c", "third message", 0),
        ]
    }

    fn scheduler(width: u32, seed: u64) -> SwarmScheduler {
        SwarmScheduler::with_config(
            Viewport::new(width, 900),
            SwarmConfig::default(),
            StdRng::seed_from_u64(seed),
        )
    }

    /// Run the scheduler forward in small steps so timers fire in order.
    fn run_until(s: &mut SwarmScheduler, until: Duration) {
        let mut t = Duration::ZERO;
        while t <= until {
            s.advance(t);
            t += 50 * MS;
        }
    }

    // -----------------------------------------------------------------------
    // Capacity policy
    // -----------------------------------------------------------------------

    #[test]
    fn test_population_follows_viewport_policy() {
        for (width, expected) in [(400, 15), (800, 18), (1200, 20)] {
            let mut s = scheduler(width, 7);
            s.set_feed(&feed(), Duration::ZERO);
            run_until(&mut s, Duration::from_secs(4));
            assert_eq!(s.items().len(), expected, "width {width}");
        }
    }

    #[test]
    fn test_population_never_exceeds_capacity() {
        let mut s = scheduler(1200, 11);
        s.set_feed(&feed(), Duration::ZERO);
        let mut t = Duration::ZERO;
        while t <= Duration::from_secs(60) {
            s.advance(t);
            assert!(
                s.items().len() <= s.capacity(),
                "exceeded capacity at {t:?}"
            );
            t += 25 * MS;
        }
    }

    #[test]
    fn test_resize_applies_to_subsequent_spawns_only() {
        let mut s = scheduler(1200, 3);
        s.set_feed(&feed(), Duration::ZERO);
        run_until(&mut s, Duration::from_secs(4));
        assert_eq!(s.items().len(), 20);

        // Shrinking never evicts live items...
        s.on_resize(Viewport::new(400, 900));
        assert_eq!(s.capacity(), 15);
        assert_eq!(s.items().len(), 20);

        // ...but replenishment settles toward the new ceiling.
        run_until(&mut s, Duration::from_secs(60));
        assert!(s.items().len() <= 15);
    }

    #[test]
    #[should_panic(expected = "capacity override")]
    fn test_zero_capacity_override_panics() {
        let config = SwarmConfig {
            capacity_override: Some(0),
            ..Default::default()
        };
        let _ = SwarmScheduler::with_config(
            Viewport::new(800, 600),
            config,
            StdRng::seed_from_u64(0),
        );
    }

    // -----------------------------------------------------------------------
    // Stagger
    // -----------------------------------------------------------------------

    #[test]
    fn test_initial_batch_staggers_in() {
        let mut s = scheduler(1200, 5);
        s.set_feed(&feed(), Duration::ZERO);

        s.advance(Duration::ZERO);
        assert_eq!(s.items().len(), 1);

        s.advance(450 * MS);
        assert_eq!(s.items().len(), 3, "one item per 200ms stagger step");

        s.advance(Duration::from_secs(4));
        assert_eq!(s.items().len(), 20);
    }

    #[test]
    fn test_replenishment_waits_one_stagger() {
        let mut s = scheduler(1200, 9);
        s.set_feed(&feed(), Duration::ZERO);
        s.advance(Duration::ZERO);
        let item = s.items()[0].clone();
        let completes_at = item.spawned_at + item.duration;

        s.advance(completes_at);
        assert!(!s.items().iter().any(|i| i.key == item.key));

        s.advance(completes_at + DEFAULT_STAGGER);
        // Replacement landed (the swarm was below capacity).
        assert!(s.items().iter().any(|i| i.spawned_at == completes_at + DEFAULT_STAGGER));
    }

    // -----------------------------------------------------------------------
    // Feed reset
    // -----------------------------------------------------------------------

    #[test]
    fn test_feed_change_is_atomic_reset() {
        let mut s = scheduler(1200, 13);
        s.set_feed(&feed(), Duration::ZERO);
        run_until(&mut s, Duration::from_secs(4));
        assert_eq!(s.items().len(), 20);

        let t = Duration::from_secs(5);
        s.set_feed(&[Message::anonymous("z", "fresh", 2)], t);
        assert!(s.items().is_empty(), "old batch cleared before new staggers in");

        // Last spawn lands at 5s + 19 * 200ms = 8.8s; the earliest possible
        // completion is 5s + 4s = 9s. Check in between.
        run_until(&mut s, Duration::from_millis(8_900));
        assert_eq!(s.items().len(), 20);
        assert!(s.items().iter().all(|i| i.body == "fresh"));
    }

    #[test]
    fn test_items_hold_value_copies() {
        let mut s = scheduler(1200, 17);
        s.set_feed(&feed(), Duration::ZERO);
        s.advance(Duration::ZERO);
        let before = s.items()[0].clone();

        // Replacing the snapshot must not disturb an already-copied item's
        // text. (The reset clears it from the live set; the copy itself is
        // still intact and detached from any snapshot.)
        s.set_feed(&[], Duration::from_secs(1));
        assert!(!before.body.is_empty());
        assert!(!before.author.is_empty());
    }

    #[test]
    fn test_empty_feed_spawns_nothing() {
        let mut s = scheduler(1200, 19);
        s.set_feed(&[], Duration::ZERO);
        run_until(&mut s, Duration::from_secs(10));
        assert!(s.items().is_empty());
        assert_eq!(s.pending_timers(), 0, "no-selection slots are not retried");
    }

    #[test]
    fn test_no_selection_skips_replenishment_until_next_feed() {
        // One eligible record, then a snapshot where nothing is eligible.
        let mut s = scheduler(1200, 23);
        s.set_feed(&[Message::anonymous("only", "text", -1)], Duration::ZERO);
        run_until(&mut s, Duration::from_secs(10));
        assert!(s.items().is_empty());

        // Next feed change revives the swarm. Check after the last spawn
        // (14.8s) but before the earliest possible completion (15s).
        s.set_feed(&feed(), Duration::from_secs(11));
        run_until(&mut s, Duration::from_millis(14_900));
        assert_eq!(s.items().len(), 20);
    }

    // -----------------------------------------------------------------------
    // Per-spawn randomization
    // -----------------------------------------------------------------------

    #[test]
    fn test_spawn_properties_within_contract() {
        let mut s = scheduler(1200, 29);
        s.set_feed(&feed(), Duration::ZERO);
        run_until(&mut s, Duration::from_secs(4));

        let range = font_size_range(1200);
        for item in s.items() {
            assert!((0.0..TOP_PERCENT_MAX).contains(&item.top_percent));
            assert!(range.contains(&item.font_size));
            let secs = item.duration.as_secs_f64();
            assert!((4.0..=10.0).contains(&secs), "duration {secs}s");
        }
    }

    #[test]
    fn test_instance_keys_unique_even_for_same_message() {
        let mut s = scheduler(1200, 31);
        s.set_feed(&[Message::anonymous("solo", "only one", 5)], Duration::ZERO);
        run_until(&mut s, Duration::from_secs(4));
        assert_eq!(s.items().len(), 20);

        let mut keys: Vec<Uuid> = s.items().iter().map(|i| i.key).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), 20, "all keys distinct for one source message");
    }

    #[test]
    fn test_properties_rerolled_on_respawn() {
        let mut s = scheduler(1200, 37);
        s.set_feed(&[Message::anonymous("solo", "text", 5)], Duration::ZERO);
        s.advance(Duration::ZERO);
        let first = s.items()[0].clone();

        // Run long enough for several respawns of "the same" item.
        run_until(&mut s, Duration::from_secs(40));
        let later = s
            .items()
            .iter()
            .find(|i| i.key != first.key)
            .expect("respawned item");
        // Three independent uniform rolls colliding exactly is not a thing.
        assert!(
            later.top_percent != first.top_percent
                || later.duration != first.duration
                || later.font_size != first.font_size
        );
    }

    #[test]
    fn test_progress_clamps() {
        let item = FlyingItem {
            key: Uuid::new_v4(),
            body: "x".into(),
            author: "y".into(),
            top_percent: 10.0,
            font_size: 20,
            duration: Duration::from_secs(4),
            spawned_at: Duration::from_secs(1),
        };
        assert_eq!(item.progress(Duration::ZERO), 0.0);
        assert!((item.progress(Duration::from_secs(3)) - 0.5).abs() < 1e-9);
        assert_eq!(item.progress(Duration::from_secs(60)), 1.0);
    }

    // -----------------------------------------------------------------------
    // Teardown
    // -----------------------------------------------------------------------

    #[test]
    fn test_teardown_cancels_everything() {
        let mut s = scheduler(1200, 41);
        s.set_feed(&feed(), Duration::ZERO);
        run_until(&mut s, Duration::from_secs(2));
        assert!(!s.items().is_empty());
        assert!(s.pending_timers() > 0);

        s.teardown();
        assert!(s.items().is_empty());
        assert_eq!(s.pending_timers(), 0);

        // Sentinel: simulated time advance after teardown fires nothing.
        run_until(&mut s, Duration::from_secs(120));
        assert!(s.items().is_empty());
        assert_eq!(s.pending_timers(), 0);
    }
}
