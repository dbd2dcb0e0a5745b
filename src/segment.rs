//! Breakpoint/value pairs and their canonical text form.

use std::fmt;

/// A position on the integer line.
pub type Position = i64;

/// The value of the profile on a half-open segment.
pub type Intensity = i64;

/// A breakpoint together with the intensity effective from it up to the next one.
///
/// The profile has value `value` on `[position, next breakpoint)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Segment {
    pub position: Position,
    pub value: Intensity,
}

impl Segment {
    /// Create a new segment.
    #[inline]
    pub fn new(position: Position, value: Intensity) -> Self {
        Self { position, value }
    }
}

impl From<(Position, Intensity)> for Segment {
    #[inline]
    fn from((position, value): (Position, Intensity)) -> Self {
        Self { position, value }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{}]", self.position, self.value)
    }
}

/// Render segments in canonical text form: `[[10,1],[30,0]]`, or `[]` when empty.
pub fn format_segments(segments: &[Segment]) -> String {
    let mut out = String::with_capacity(2 + segments.len() * 8);
    out.push('[');
    for (i, segment) in segments.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&segment.to_string());
    }
    out.push(']');
    out
}

/// Check the canonical-form invariants of a segment sequence.
///
/// Returns a description of the first violation found.
pub fn check_canonical(segments: &[Segment]) -> Result<(), String> {
    if let Some(first) = segments.first() {
        if first.value == 0 {
            return Err(format!("leading breakpoint {} has value 0", first.position));
        }
    }
    for pair in segments.windows(2) {
        if pair[0].position >= pair[1].position {
            return Err(format!(
                "breakpoints out of order: {} then {}",
                pair[0].position, pair[1].position
            ));
        }
        if pair[0].value == pair[1].value {
            return Err(format!(
                "adjacent breakpoints {} and {} share value {}",
                pair[0].position, pair[1].position, pair[1].value
            ));
        }
    }
    if let Some(last) = segments.last() {
        if last.value != 0 {
            return Err(format!("profile does not return to 0 after {}", last.position));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_display() {
        assert_eq!(Segment::new(10, 1).to_string(), "[10,1]");
        assert_eq!(Segment::new(-5, -2).to_string(), "[-5,-2]");
    }

    #[test]
    fn test_format_segments() {
        assert_eq!(format_segments(&[]), "[]");
        let segments = [Segment::new(10, 1), Segment::new(30, 0)];
        assert_eq!(format_segments(&segments), "[[10,1],[30,0]]");
    }

    #[test]
    fn test_check_canonical() {
        assert!(check_canonical(&[]).is_ok());
        assert!(check_canonical(&[Segment::new(10, 1), Segment::new(30, 0)]).is_ok());

        // Leading zero
        assert!(check_canonical(&[Segment::new(10, 0)]).is_err());
        // Adjacent equal values
        assert!(
            check_canonical(&[Segment::new(10, 1), Segment::new(20, 1), Segment::new(30, 0)])
                .is_err()
        );
        // Trailing zero-zero
        assert!(check_canonical(&[
            Segment::new(10, 1),
            Segment::new(20, 0),
            Segment::new(30, 0)
        ])
        .is_err());
    }
}
