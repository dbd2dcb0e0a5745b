//! Interval store: range add/set over a skip list breakpoint index.
//!
//! The store keeps the profile in canonical form after every mutation:
//! no two adjacent breakpoints share a value, the first breakpoint is never 0
//! and the profile never ends in two 0-valued breakpoints.
//!
//! A mutation over `[from, to)` runs in four steps:
//! 1. materialize `from` and `to`, seeding each new breakpoint with the value
//!    already in effect there, so the function does not change;
//! 2. collect the breakpoints in `[from, to)` from the index;
//! 3. add to or overwrite their values (overwrite drops the interior ones);
//! 4. merge the two edges, the only places where redundancy can appear.
//!
//! Steps 1 and 4 are O(log n). Step 3 is O(m) in the breakpoints inside the
//! range.

use crate::config::check_range;
use crate::error::{Result, SegmentsError};
use crate::segment::{Intensity, Position, Segment};
use crate::skiplist::SkipList;
use rand::rngs::SmallRng;
use rand::Rng;
use rustc_hash::FxHashMap;
use std::fmt;

/// A mutable piecewise-constant profile over the integer line.
///
/// Positions outside every touched range have value 0.
pub trait SegmentStore {
    /// Add `amount` to every position in `[from, to)`.
    fn add(&mut self, from: Position, to: Position, amount: Intensity) -> Result<()>;

    /// Overwrite every position in `[from, to)` with `amount`.
    fn set(&mut self, from: Position, to: Position, amount: Intensity) -> Result<()>;

    /// Canonical breakpoint/value pairs in increasing position order.
    fn segments(&self) -> Vec<Segment>;

    /// Value of the profile at `position`.
    fn value_at(&self, position: Position) -> Intensity;
}

/// How a range update combines with existing values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Add the amount to the existing values
    Accumulate,
    /// Replace the existing values with the amount
    Overwrite,
}

/// Counters kept by a [`SkipListStore`].
#[derive(Debug, Default, Clone)]
pub struct StoreStats {
    pub adds: u64,
    pub sets: u64,
    pub created: u64,
    pub removed: u64,
    pub breakpoints: usize,
    pub height: usize,
}

impl fmt::Display for StoreStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Adds: {}, Sets: {}, Breakpoints: {} (created {}, removed {}), Height: {}",
            self.adds, self.sets, self.breakpoints, self.created, self.removed, self.height
        )
    }
}

/// Segment store backed by a skip list of breakpoints and a value map.
///
/// The index only orders the breakpoints; values live in the map, keyed by
/// the same positions, and both always hold the same key set.
pub struct SkipListStore<R = SmallRng> {
    index: SkipList<R>,
    values: FxHashMap<Position, Intensity>,
    stats: StoreStats,
}

impl SkipListStore<SmallRng> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::from_index(SkipList::new())
    }

    /// Create an empty store whose index shape is reproducible.
    pub fn with_seed(seed: u64) -> Self {
        Self::from_index(SkipList::with_seed(seed))
    }
}

impl Default for SkipListStore<SmallRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> SkipListStore<R> {
    /// Create an empty store drawing index levels from `rng`.
    pub fn with_rng(rng: R) -> Self {
        Self::from_index(SkipList::with_rng(rng))
    }

    fn from_index(index: SkipList<R>) -> Self {
        Self {
            index,
            values: FxHashMap::default(),
            stats: StoreStats::default(),
        }
    }

    /// Number of materialized breakpoints.
    #[inline]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Check if the profile is 0 everywhere.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Reset the profile to 0 everywhere. Every dropped breakpoint counts as removed.
    pub fn clear(&mut self) {
        self.stats.removed += self.index.len() as u64;
        self.index.clear();
        self.values.clear();
    }

    /// Snapshot of the store counters.
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            breakpoints: self.index.len(),
            height: self.index.height(),
            ..self.stats.clone()
        }
    }

    /// Apply a range update over `[from, to)`.
    ///
    /// Either the whole update is applied or the store is left unchanged.
    pub fn apply(
        &mut self,
        from: Position,
        to: Position,
        amount: Intensity,
        mode: Mode,
    ) -> Result<()> {
        if !check_range(from, to)? {
            return Ok(());
        }

        match mode {
            Mode::Accumulate => {
                self.check_overflow(from, to, amount)?;
                self.stats.adds += 1;
            }
            Mode::Overwrite => self.stats.sets += 1,
        }

        self.materialize(from);
        self.materialize(to);

        let touched = self.index.range_keys(from, to);
        // The last key is `to` itself, which keeps its value.
        let span = &touched[..touched.len() - 1];

        match mode {
            Mode::Accumulate => {
                for &key in span {
                    *self.values.entry(key).or_default() += amount;
                }
            }
            Mode::Overwrite => {
                if let Some((&first, interior)) = span.split_first() {
                    self.values.insert(first, amount);
                    for &key in interior {
                        self.remove_breakpoint(key);
                    }
                }
            }
        }

        self.merge_edges(from, to);
        Ok(())
    }

    #[inline]
    fn value(&self, key: Position) -> Intensity {
        self.values.get(&key).copied().unwrap_or(0)
    }

    /// Every value an accumulate over `[from, to)` would change must stay in range.
    fn check_overflow(&self, from: Position, to: Position, amount: Intensity) -> Result<()> {
        if self.value_at(from).checked_add(amount).is_none() {
            return Err(SegmentsError::Overflow { position: from });
        }
        for key in self.index.keys_from(from).take_while(|&k| k < to) {
            if self.value(key).checked_add(amount).is_none() {
                return Err(SegmentsError::Overflow { position: key });
            }
        }
        Ok(())
    }

    /// Make `key` a breakpoint without changing the profile.
    fn materialize(&mut self, key: Position) {
        if self.index.insert(key) {
            self.stats.created += 1;
        }
        if !self.values.contains_key(&key) {
            let seed = self.index.predecessor(key).map_or(0, |prev| self.value(prev));
            self.values.insert(key, seed);
        }
    }

    fn remove_breakpoint(&mut self, key: Position) {
        if self.index.remove(key) {
            self.values.remove(&key);
            self.stats.removed += 1;
        }
    }

    /// A breakpoint is redundant when it repeats the value in effect before it.
    fn is_redundant(&self, key: Position) -> bool {
        let value = self.value(key);
        match self.index.predecessor(key) {
            Some(prev) => self.value(prev) == value,
            None => value == 0,
        }
    }

    fn merge_edges(&mut self, from: Position, to: Position) {
        if self.is_redundant(from) {
            self.remove_breakpoint(from);
        }

        // `to` keeps the value it had, so it still differs from its successor.
        if self.is_redundant(to) {
            self.remove_breakpoint(to);
        }
    }
}

impl<R: Rng> SegmentStore for SkipListStore<R> {
    fn add(&mut self, from: Position, to: Position, amount: Intensity) -> Result<()> {
        self.apply(from, to, amount, Mode::Accumulate)
    }

    fn set(&mut self, from: Position, to: Position, amount: Intensity) -> Result<()> {
        self.apply(from, to, amount, Mode::Overwrite)
    }

    fn segments(&self) -> Vec<Segment> {
        self.index
            .keys()
            .map(|key| Segment::new(key, self.value(key)))
            .collect()
    }

    fn value_at(&self, position: Position) -> Intensity {
        self.index.floor(position).map_or(0, |key| self.value(key))
    }
}

impl<R> fmt::Debug for SkipListStore<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SkipListStore")
            .field("index", &self.index)
            .field("values", &self.values)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::{check_canonical, format_segments};

    fn render<S: SegmentStore>(store: &S) -> String {
        format_segments(&store.segments())
    }

    #[test]
    fn test_empty_store() {
        let store = SkipListStore::with_seed(1);
        assert!(store.is_empty());
        assert_eq!(render(&store), "[]");
        assert_eq!(store.value_at(0), 0);
    }

    #[test]
    fn test_add_scenario_one() {
        let mut store = SkipListStore::with_seed(1);
        store.add(10, 30, 1).unwrap();
        assert_eq!(render(&store), "[[10,1],[30,0]]");
        store.add(20, 40, 1).unwrap();
        assert_eq!(render(&store), "[[10,1],[20,2],[30,1],[40,0]]");
        store.add(10, 40, -2).unwrap();
        assert_eq!(render(&store), "[[10,-1],[20,0],[30,-1],[40,0]]");
    }

    #[test]
    fn test_add_scenario_two() {
        let mut store = SkipListStore::with_seed(2);
        store.add(10, 30, 1).unwrap();
        store.add(20, 40, 1).unwrap();
        assert_eq!(render(&store), "[[10,1],[20,2],[30,1],[40,0]]");
        store.add(10, 40, -1).unwrap();
        assert_eq!(render(&store), "[[20,1],[30,0]]");
        store.add(10, 40, -1).unwrap();
        assert_eq!(render(&store), "[[10,-1],[20,0],[30,-1],[40,0]]");
    }

    #[test]
    fn test_set_collapses_interior() {
        let mut store = SkipListStore::with_seed(3);
        store.add(10, 30, 1).unwrap();
        store.set(15, 25, 5).unwrap();
        assert_eq!(render(&store), "[[10,1],[15,5],[25,1],[30,0]]");

        store.add(16, 18, 1).unwrap();
        store.add(20, 22, 2).unwrap();
        store.set(12, 28, 7).unwrap();
        assert_eq!(render(&store), "[[10,1],[12,7],[28,1],[30,0]]");
    }

    #[test]
    fn test_materialize_keeps_function() {
        let mut store = SkipListStore::with_seed(4);
        store.add(10, 30, 3).unwrap();

        let before: Vec<Intensity> = (0..40).map(|p| store.value_at(p)).collect();
        store.materialize(20);
        store.materialize(35);
        store.materialize(5);
        let after: Vec<Intensity> = (0..40).map(|p| store.value_at(p)).collect();

        assert_eq!(before, after);
        assert_eq!(store.value(20), 3);
        assert_eq!(store.value(35), 0);
        assert_eq!(store.value(5), 0);
    }

    #[test]
    fn test_set_zero_on_empty() {
        let mut store = SkipListStore::with_seed(5);
        store.set(10, 20, 0).unwrap();
        assert_eq!(render(&store), "[]");
        assert!(store.is_empty());
    }

    #[test]
    fn test_add_zero_is_noop() {
        let mut store = SkipListStore::with_seed(5);
        store.add(10, 20, 4).unwrap();
        store.add(0, 50, 0).unwrap();
        assert_eq!(render(&store), "[[10,4],[20,0]]");
    }

    #[test]
    fn test_run_meets_value_resuming_at_to() {
        let mut store = SkipListStore::with_seed(6);
        store.add(0, 40, 3).unwrap();
        store.add(0, 20, 2).unwrap();
        assert_eq!(render(&store), "[[0,5],[20,3],[40,0]]");

        // [0, 20) drops to the value that resumes at 20
        store.add(0, 20, -2).unwrap();
        assert_eq!(render(&store), "[[0,3],[40,0]]");
    }

    #[test]
    fn test_set_matches_neighbours() {
        let mut store = SkipListStore::with_seed(7);
        store.set(0, 10, 1).unwrap();
        store.set(20, 30, 1).unwrap();
        store.set(10, 20, 1).unwrap();
        assert_eq!(render(&store), "[[0,1],[30,0]]");

        store.set(0, 30, 0).unwrap();
        assert_eq!(render(&store), "[]");
    }

    #[test]
    fn test_set_erases_trailing_run() {
        let mut store = SkipListStore::with_seed(8);
        store.add(10, 30, 1).unwrap();
        store.add(40, 50, 2).unwrap();
        store.set(35, 60, 0).unwrap();
        assert_eq!(render(&store), "[[10,1],[30,0]]");
    }

    #[test]
    fn test_negative_positions() {
        let mut store = SkipListStore::with_seed(9);
        store.add(-30, -10, 2).unwrap();
        store.add(-20, 10, 1).unwrap();
        assert_eq!(render(&store), "[[-30,2],[-20,3],[-10,1],[10,0]]");
        assert_eq!(store.value_at(-25), 2);
        assert_eq!(store.value_at(0), 1);
        assert_eq!(store.value_at(10), 0);
    }

    #[test]
    fn test_invalid_range_rejected() {
        let mut store = SkipListStore::with_seed(10);
        store.add(10, 30, 1).unwrap();
        let err = store.add(30, 10, 1).unwrap_err();
        assert!(matches!(err, SegmentsError::InvalidRange { from: 30, to: 10 }));
        assert_eq!(render(&store), "[[10,1],[30,0]]");
    }

    #[test]
    fn test_empty_range_is_noop() {
        let mut store = SkipListStore::with_seed(11);
        store.add(10, 30, 1).unwrap();
        store.add(20, 20, 5).unwrap();
        store.set(15, 15, 9).unwrap();
        assert_eq!(render(&store), "[[10,1],[30,0]]");
    }

    #[test]
    fn test_overflow_leaves_store_unchanged() {
        let mut store = SkipListStore::with_seed(12);
        store.add(0, 10, Intensity::MAX).unwrap();
        store.add(20, 30, 1).unwrap();
        let before = store.segments();

        let err = store.add(5, 25, 1).unwrap_err();
        assert!(matches!(err, SegmentsError::Overflow { position: 5 }));
        assert_eq!(store.segments(), before);

        // Overwrite never overflows
        store.set(5, 25, Intensity::MIN).unwrap();
        assert_eq!(store.value_at(6), Intensity::MIN);
    }

    #[test]
    fn test_clear_and_stats() {
        let mut store = SkipListStore::with_seed(13);
        store.add(10, 30, 1).unwrap();
        store.set(20, 40, 2).unwrap();

        let stats = store.stats();
        assert_eq!(stats.adds, 1);
        assert_eq!(stats.sets, 1);
        assert_eq!(stats.breakpoints, store.len());
        assert_eq!(
            stats.created - stats.removed,
            store.len() as u64
        );

        store.clear();
        assert!(store.is_empty());
        assert_eq!(render(&store), "[]");

        let stats = store.stats();
        assert_eq!(stats.created, stats.removed);
        store.add(5, 6, 1).unwrap();
        let stats = store.stats();
        assert_eq!(stats.created - stats.removed, store.len() as u64);
    }

    #[test]
    fn test_updates_ending_on_breakpoints_stay_canonical() {
        let mut store = SkipListStore::with_seed(15);
        store.add(0, 10, 1).unwrap();
        store.add(10, 20, 2).unwrap();
        store.add(20, 30, 3).unwrap();
        assert_eq!(render(&store), "[[0,1],[10,2],[20,3],[30,0]]");

        // Every `to` lands on an existing breakpoint
        store.add(0, 10, 1).unwrap();
        assert_eq!(render(&store), "[[0,2],[20,3],[30,0]]");
        assert!(check_canonical(&store.segments()).is_ok());

        store.set(0, 20, 3).unwrap();
        assert_eq!(render(&store), "[[0,3],[30,0]]");

        store.add(0, 30, -3).unwrap();
        assert_eq!(render(&store), "[]");
        assert!(store.is_empty());
    }

    #[test]
    fn test_serialization_is_idempotent() {
        let mut store = SkipListStore::with_seed(14);
        store.add(1, 5, 2).unwrap();
        store.set(3, 9, -1).unwrap();
        assert_eq!(render(&store), render(&store));
        assert!(check_canonical(&store.segments()).is_ok());
    }
}
