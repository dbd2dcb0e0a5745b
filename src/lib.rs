//! Intensity segments: piecewise-constant integer profiles over the integer line.
//!
//! A profile starts at 0 everywhere and is changed by two range operations
//! over half-open ranges `[from, to)`: `add` increments, `set` overwrites.
//! It is kept as a canonical list of breakpoints, each carrying the value in
//! effect up to the next breakpoint.
//!
//! # Features
//!
//! - **Skip list index**: breakpoints live in an arena-backed skip list with
//!   expected O(log n) point operations and a seedable level generator
//! - **Canonical form**: redundant breakpoints are merged away after every
//!   mutation, so equal profiles always serialize identically
//! - **Dense oracle**: a cell-per-position reference store for checking
//!
//! # Example
//!
//! ```rust
//! use intensity_segments::{format_segments, SegmentStore, SkipListStore};
//!
//! let mut store = SkipListStore::new();
//! store.add(10, 30, 1).unwrap();
//! store.add(20, 40, 1).unwrap();
//! assert_eq!(
//!     format_segments(&store.segments()),
//!     "[[10,1],[20,2],[30,1],[40,0]]"
//! );
//! ```

pub mod commands;
pub mod config;
pub mod dense;
pub mod error;
pub mod output;
pub mod profile;
pub mod script;
pub mod segment;
pub mod skiplist;
pub mod store;

// Re-export commonly used types
pub use dense::DenseProfile;
pub use error::{Result, SegmentsError};
pub use profile::IntensityProfile;
pub use segment::{format_segments, Intensity, Position, Segment};
pub use skiplist::SkipList;
pub use store::{Mode, SegmentStore, SkipListStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::commands::{ApplyCommand, GenerateCommand, VerifyCommand};
    pub use crate::dense::DenseProfile;
    pub use crate::error::{Result, SegmentsError};
    pub use crate::profile::IntensityProfile;
    pub use crate::segment::{format_segments, Intensity, Position, Segment};
    pub use crate::store::{SegmentStore, SkipListStore};
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_basic_workflow() {
        use crate::script::parse_script;
        use crate::store::{SegmentStore, SkipListStore};

        let script = b"add 10 30 1\nadd 20 40 1\nadd 10 40 -1\n";
        let mut store = SkipListStore::with_seed(1);
        for item in parse_script(script) {
            let (_, op) = item.unwrap();
            op.apply(&mut store).unwrap();
        }

        let segments = store.segments();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].position, 20);
        assert_eq!(segments[0].value, 1);
    }

    #[test]
    fn test_profile_workflow() {
        use crate::dense::DenseProfile;
        use crate::profile::IntensityProfile;

        let mut fast = IntensityProfile::new();
        let mut dense = IntensityProfile::with_store(DenseProfile::new(100));
        for profile_ops in [(10, 30, 1), (20, 40, 1), (10, 40, -2)] {
            let (from, to, amount) = profile_ops;
            fast.add(from, to, amount).unwrap();
            dense.add(from, to, amount).unwrap();
        }

        assert_eq!(fast.to_string(), dense.to_string());
    }
}
