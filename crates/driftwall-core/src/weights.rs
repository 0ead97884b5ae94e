//! Cumulative weight table and O(log n) weighted sampler.
//!
//! Built once per feed snapshot, never per draw. Eligibility policy: a
//! record is eligible iff `score >= 0`; its weight is `score` when positive,
//! otherwise a floor weight of 1 so zero-score messages still get a chance
//! to appear. Negative scores exclude a record entirely.
//!
//! A draw picks `u` uniformly in `[0, total_weight)` and binary-searches the
//! first cumulative entry strictly greater than `u`. An empty table yields
//! `None` — "no selection", which callers treat as "nothing to spawn now",
//! not an error.

use rand::Rng;

use crate::feed::Message;

/// One `(cumulative_weight, record)` pair.
///
/// The record is a value-copy of the feed message, so the table outlives the
/// snapshot it was built from.
#[derive(Debug, Clone)]
pub struct WeightedEntry {
    /// Prefix sum of weights up to and including this record.
    pub cumulative: u64,
    /// The eligible record.
    pub message: Message,
}

/// Monotonic cumulative-weight table over the eligible records of one
/// feed snapshot.
#[derive(Debug, Clone, Default)]
pub struct WeightTable {
    entries: Vec<WeightedEntry>,
    total: u64,
}

/// Sampling weight for a record, or `None` when the record is ineligible.
pub fn weight_for(message: &Message) -> Option<u64> {
    if message.score < 0 {
        None
    } else {
        Some((message.score as u64).max(1))
    }
}

impl WeightTable {
    /// Build the table from a full-replace snapshot.
    ///
    /// Filters to eligible records and prefix-sums their weights. Call this
    /// only when the snapshot changes.
    pub fn build(messages: &[Message]) -> Self {
        let mut entries = Vec::new();
        let mut total = 0u64;
        for message in messages {
            if let Some(w) = weight_for(message) {
                total += w;
                entries.push(WeightedEntry {
                    cumulative: total,
                    message: message.clone(),
                });
            }
        }
        Self { entries, total }
    }

    /// Total weight across all eligible records.
    pub fn total_weight(&self) -> u64 {
        self.total
    }

    /// Number of eligible records.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no record is eligible (`total_weight == 0`).
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The eligible entries in feed order.
    pub fn entries(&self) -> &[WeightedEntry] {
        &self.entries
    }

    /// Draw one record proportionally to weight, or `None` when the table
    /// is empty.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&Message> {
        if self.total == 0 {
            return None;
        }
        let u = rng.random_range(0.0..self.total as f64);
        self.sample_at(u)
    }

    /// Deterministic draw at a given point `u`.
    ///
    /// Selects the first entry whose cumulative weight is strictly greater
    /// than `u`. Exposed so the draw rule itself is verifiable.
    ///
    /// # Panics
    /// Panics when `u` is outside `[0, total_weight)` — a caller contract
    /// violation, not a runtime state.
    pub fn sample_at(&self, u: f64) -> Option<&Message> {
        if self.total == 0 {
            return None;
        }
        assert!(
            u >= 0.0 && u < self.total as f64,
            "sample point {u} outside [0, {})",
            self.total
        );
        let idx = self
            .entries
            .partition_point(|entry| (entry.cumulative as f64) <= u);
        self.entries.get(idx).map(|entry| &entry.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use statrs::distribution::{ChiSquared, ContinuousCDF};

    fn snapshot() -> Vec<Message> {
        vec![
            Message::anonymous("a", "first", 3),
            Message::anonymous("b", "second", 1),
            Message::anonymous("c", "third", 0),
        ]
    }

    // -----------------------------------------------------------------------
    // Eligibility and construction
    // -----------------------------------------------------------------------

    #[test]
    fn test_weight_floor_for_zero_score() {
        assert_eq!(weight_for(&Message::anonymous("x", "", 0)), Some(1));
    }

    #[test]
    fn test_weight_positive_score_passthrough() {
        assert_eq!(weight_for(&Message::anonymous("x", "", 7)), Some(7));
    }

    #[test]
    fn test_negative_score_ineligible() {
        assert_eq!(weight_for(&Message::anonymous("x", "", -1)), None);
    }

    #[test]
    fn test_build_cumulative_monotonic() {
        let table = WeightTable::build(&snapshot());
        assert_eq!(table.len(), 3);
        assert_eq!(table.total_weight(), 5);
        let cums: Vec<u64> = table.entries().iter().map(|e| e.cumulative).collect();
        assert_eq!(cums, vec![3, 4, 5]);
    }

    #[test]
    fn test_build_filters_negative_scores() {
        let mut msgs = snapshot();
        msgs.push(Message::anonymous("d", "downvoted", -5));
        let table = WeightTable::build(&msgs);
        assert_eq!(table.len(), 3);
        assert!(table.entries().iter().all(|e| e.message.id != "d"));
    }

    #[test]
    fn test_empty_snapshot_is_empty_table() {
        let table = WeightTable::build(&[]);
        assert!(table.is_empty());
        assert_eq!(table.total_weight(), 0);
    }

    // -----------------------------------------------------------------------
    // Draw rule
    // -----------------------------------------------------------------------

    #[test]
    fn test_sample_at_strictly_greater_rule() {
        // weights [3,1,1] => cumulative [3,4,5]; u=3.5 must select "b":
        // the first cumulative entry strictly greater than 3.5 is 4.
        let table = WeightTable::build(&snapshot());
        assert_eq!(table.sample_at(3.5).unwrap().id, "b");
    }

    #[test]
    fn test_sample_at_boundaries() {
        let table = WeightTable::build(&snapshot());
        assert_eq!(table.sample_at(0.0).unwrap().id, "a");
        assert_eq!(table.sample_at(2.999).unwrap().id, "a");
        assert_eq!(table.sample_at(3.0).unwrap().id, "b");
        assert_eq!(table.sample_at(4.0).unwrap().id, "c");
        assert_eq!(table.sample_at(4.999).unwrap().id, "c");
    }

    #[test]
    #[should_panic]
    fn test_sample_at_out_of_range_panics() {
        let table = WeightTable::build(&snapshot());
        let _ = table.sample_at(5.0);
    }

    #[test]
    fn test_sample_empty_table_is_no_selection() {
        let table = WeightTable::build(&[]);
        let mut rng = StdRng::seed_from_u64(1);
        assert!(table.sample(&mut rng).is_none());
        assert!(table.sample_at(0.0).is_none());
    }

    #[test]
    fn test_sample_all_negative_is_no_selection() {
        let msgs = vec![
            Message::anonymous("a", "", -1),
            Message::anonymous("b", "", -3),
        ];
        let table = WeightTable::build(&msgs);
        let mut rng = StdRng::seed_from_u64(1);
        assert!(table.sample(&mut rng).is_none());
    }

    // -----------------------------------------------------------------------
    // Distribution convergence
    // -----------------------------------------------------------------------

    #[test]
    fn test_empirical_frequency_matches_weights() {
        // Chi-square goodness of fit: empirical frequency of each record
        // should converge to weight / total_weight.
        let table = WeightTable::build(&snapshot());
        let mut rng = StdRng::seed_from_u64(0xD81F7);
        let draws = 50_000usize;

        let mut counts = [0u64; 3];
        for _ in 0..draws {
            match table.sample(&mut rng).unwrap().id.as_str() {
                "a" => counts[0] += 1,
                "b" => counts[1] += 1,
                "c" => counts[2] += 1,
                other => panic!("unexpected id {other}"),
            }
        }

        let expected = [3.0, 1.0, 1.0].map(|w: f64| w / 5.0 * draws as f64);
        let chi2: f64 = counts
            .iter()
            .zip(expected.iter())
            .map(|(&obs, &exp)| (obs as f64 - exp).powi(2) / exp)
            .sum();

        let dist = ChiSquared::new(2.0).unwrap();
        let p = dist.sf(chi2);
        assert!(p > 0.001, "chi2={chi2:.2}, p={p:.5}: draws diverge from weights");
    }

    #[test]
    fn test_zero_score_records_still_appear() {
        let table = WeightTable::build(&snapshot());
        let mut rng = StdRng::seed_from_u64(42);
        let mut saw_c = false;
        for _ in 0..1_000 {
            if table.sample(&mut rng).unwrap().id == "c" {
                saw_c = true;
                break;
            }
        }
        assert!(saw_c, "floor weight should give zero-score records a chance");
    }
}
