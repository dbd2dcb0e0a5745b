//! Dense reference profile over a bounded domain.
//!
//! Applies every update cell by cell, so it is trivially correct and is used
//! as the oracle that [`SkipListStore`](crate::store::SkipListStore) is
//! checked against.

use crate::config::check_range;
use crate::error::{Result, SegmentsError};
use crate::segment::{Intensity, Position, Segment};
use crate::store::SegmentStore;
use std::ops::Range;

/// A profile stored as one cell per position in `[0, domain]`.
///
/// Updates may touch `[0, domain)`; the cell at `domain` stays 0 so a run
/// reaching the end of the domain is still terminated by a breakpoint.
#[derive(Debug, Clone)]
pub struct DenseProfile {
    cells: Vec<Intensity>,
}

impl DenseProfile {
    /// Create a zero profile over `[0, domain]`.
    ///
    /// Panics if the cells cannot be allocated; see [`DenseProfile::try_new`].
    pub fn new(domain: usize) -> Self {
        Self {
            cells: vec![0; domain + 1],
        }
    }

    /// Create a zero profile over `[0, domain]`, failing instead of aborting
    /// when `domain + 1` cells cannot be allocated.
    pub fn try_new(domain: usize) -> Result<Self> {
        let too_large = || {
            SegmentsError::InvalidArgument(format!("domain {} does not fit in memory", domain))
        };
        let len = domain.checked_add(1).ok_or_else(too_large)?;
        let mut cells = Vec::new();
        cells.try_reserve_exact(len).map_err(|_| too_large())?;
        cells.resize(len, 0);
        Ok(Self { cells })
    }

    /// Largest position a range may end at.
    #[inline]
    pub fn domain(&self) -> Position {
        (self.cells.len() - 1) as Position
    }

    /// Cell range for `[from, to)`, or `None` if the range is empty.
    fn cells_for(&self, from: Position, to: Position) -> Result<Option<Range<usize>>> {
        if !check_range(from, to)? {
            return Ok(None);
        }
        let domain = self.domain();
        if from < 0 {
            return Err(SegmentsError::OutOfDomain {
                position: from,
                domain,
            });
        }
        if to > domain {
            return Err(SegmentsError::OutOfDomain {
                position: to,
                domain,
            });
        }
        Ok(Some(from as usize..to as usize))
    }
}

impl SegmentStore for DenseProfile {
    fn add(&mut self, from: Position, to: Position, amount: Intensity) -> Result<()> {
        let Some(range) = self.cells_for(from, to)? else {
            return Ok(());
        };
        if let Some(offset) = self.cells[range.clone()]
            .iter()
            .position(|v| v.checked_add(amount).is_none())
        {
            return Err(SegmentsError::Overflow {
                position: from + offset as Position,
            });
        }
        for cell in &mut self.cells[range] {
            *cell += amount;
        }
        Ok(())
    }

    fn set(&mut self, from: Position, to: Position, amount: Intensity) -> Result<()> {
        if let Some(range) = self.cells_for(from, to)? {
            self.cells[range].fill(amount);
        }
        Ok(())
    }

    fn segments(&self) -> Vec<Segment> {
        let mut segments = Vec::new();
        let mut current = 0;
        for (position, &value) in self.cells.iter().enumerate() {
            if value != current {
                segments.push(Segment::new(position as Position, value));
                current = value;
            }
        }
        segments
    }

    fn value_at(&self, position: Position) -> Intensity {
        usize::try_from(position)
            .ok()
            .and_then(|p| self.cells.get(p).copied())
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::format_segments;

    #[test]
    fn test_dense_scenario() {
        let mut dense = DenseProfile::new(50);
        assert_eq!(format_segments(&dense.segments()), "[]");
        dense.add(10, 30, 1).unwrap();
        dense.add(20, 40, 1).unwrap();
        assert_eq!(
            format_segments(&dense.segments()),
            "[[10,1],[20,2],[30,1],[40,0]]"
        );
        dense.set(15, 25, 5).unwrap();
        assert_eq!(
            format_segments(&dense.segments()),
            "[[10,1],[15,5],[25,2],[30,1],[40,0]]"
        );
    }

    #[test]
    fn test_run_to_domain_end_is_terminated() {
        let mut dense = DenseProfile::new(10);
        dense.add(5, 10, 3).unwrap();
        assert_eq!(format_segments(&dense.segments()), "[[5,3],[10,0]]");
    }

    #[test]
    fn test_try_new_rejects_huge_domain() {
        assert!(matches!(
            DenseProfile::try_new(usize::MAX),
            Err(SegmentsError::InvalidArgument(_))
        ));
        assert!(matches!(
            DenseProfile::try_new(usize::MAX / 2),
            Err(SegmentsError::InvalidArgument(_))
        ));
        let dense = DenseProfile::try_new(10).unwrap();
        assert_eq!(dense.domain(), 10);
        assert!(dense.segments().is_empty());
    }

    #[test]
    fn test_out_of_domain() {
        let mut dense = DenseProfile::new(10);
        assert!(matches!(
            dense.add(-1, 5, 1),
            Err(SegmentsError::OutOfDomain { position: -1, .. })
        ));
        assert!(matches!(
            dense.set(5, 11, 1),
            Err(SegmentsError::OutOfDomain { position: 11, .. })
        ));
        assert_eq!(dense.value_at(-3), 0);
        assert_eq!(dense.value_at(100), 0);
    }

    #[test]
    fn test_overflow_is_atomic() {
        let mut dense = DenseProfile::new(10);
        dense.add(4, 6, Intensity::MAX).unwrap();
        assert!(matches!(
            dense.add(0, 10, 1),
            Err(SegmentsError::Overflow { position: 4 })
        ));
        assert_eq!(dense.value_at(0), 0);
    }
}
