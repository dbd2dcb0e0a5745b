//! Intensity profile façade with canonical text rendering.

use crate::error::Result;
use crate::segment::{format_segments, Intensity, Position, Segment};
use crate::store::{SegmentStore, SkipListStore};
use std::fmt;

/// An intensity profile over the integer line.
///
/// Forwards updates to its store and renders as `[[10,1],[30,0]]`.
///
/// # Example
///
/// ```
/// use intensity_segments::IntensityProfile;
///
/// let mut profile = IntensityProfile::new();
/// assert_eq!(profile.to_string(), "[]");
///
/// profile.add(10, 30, 1).unwrap();
/// profile.add(20, 40, 1).unwrap();
/// assert_eq!(profile.to_string(), "[[10,1],[20,2],[30,1],[40,0]]");
///
/// profile.set(15, 25, 5).unwrap();
/// assert_eq!(profile.to_string(), "[[10,1],[15,5],[25,2],[30,1],[40,0]]");
/// ```
#[derive(Debug, Default)]
pub struct IntensityProfile<S = SkipListStore> {
    store: S,
}

impl IntensityProfile<SkipListStore> {
    /// Create an empty profile backed by a skip list store.
    pub fn new() -> Self {
        Self::with_store(SkipListStore::new())
    }
}

impl<S: SegmentStore> IntensityProfile<S> {
    /// Wrap an existing store.
    pub fn with_store(store: S) -> Self {
        Self { store }
    }

    /// Add `amount` to every position in `[from, to)`.
    pub fn add(&mut self, from: Position, to: Position, amount: Intensity) -> Result<()> {
        self.store.add(from, to, amount)
    }

    /// Set every position in `[from, to)` to `amount`.
    pub fn set(&mut self, from: Position, to: Position, amount: Intensity) -> Result<()> {
        self.store.set(from, to, amount)
    }

    /// Canonical breakpoint/value pairs.
    pub fn segments(&self) -> Vec<Segment> {
        self.store.segments()
    }

    /// Borrow the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Unwrap the underlying store.
    pub fn into_inner(self) -> S {
        self.store
    }
}

impl<S: SegmentStore> fmt::Display for IntensityProfile<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_segments(&self.store.segments()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dense::DenseProfile;

    #[test]
    fn test_profile_display() {
        let mut profile = IntensityProfile::with_store(SkipListStore::with_seed(1));
        assert_eq!(profile.to_string(), "[]");
        profile.add(10, 30, 1).unwrap();
        assert_eq!(profile.to_string(), "[[10,1],[30,0]]");
        profile.add(20, 40, 1).unwrap();
        profile.add(10, 40, -2).unwrap();
        assert_eq!(profile.to_string(), "[[10,-1],[20,0],[30,-1],[40,0]]");
    }

    #[test]
    fn test_profile_over_dense_store() {
        let mut profile = IntensityProfile::with_store(DenseProfile::new(100));
        profile.add(10, 30, 1).unwrap();
        profile.set(15, 25, 5).unwrap();
        assert_eq!(profile.to_string(), "[[10,1],[15,5],[25,1],[30,0]]");
        assert_eq!(profile.store().value_at(20), 5);
        assert_eq!(profile.to_string(), format_segments(&profile.segments()));
    }
}
