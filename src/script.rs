//! Zero-allocation parsing of operation scripts.
//!
//! A script holds one operation per line:
//!
//! ```text
//! # comment
//! add 10 30 1
//! set 15 25 5
//! print
//! ```
//!
//! Fields are separated by ASCII whitespace. Blank lines and lines starting
//! with `#` are skipped.

use crate::error::{Result, SegmentsError};
use crate::segment::{Intensity, Position};
use crate::store::SegmentStore;
use memchr::memchr;
use std::fmt;

/// One line of an operation script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Add {
        from: Position,
        to: Position,
        amount: Intensity,
    },
    Set {
        from: Position,
        to: Position,
        amount: Intensity,
    },
    Print,
}

impl Op {
    /// Apply the operation to a store. `Print` leaves the store untouched.
    pub fn apply<S: SegmentStore>(&self, store: &mut S) -> Result<()> {
        match *self {
            Op::Add { from, to, amount } => store.add(from, to, amount),
            Op::Set { from, to, amount } => store.set(from, to, amount),
            Op::Print => Ok(()),
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Op::Add { from, to, amount } => write!(f, "add {} {} {}", from, to, amount),
            Op::Set { from, to, amount } => write!(f, "set {} {} {}", from, to, amount),
            Op::Print => write!(f, "print"),
        }
    }
}

/// Fast i64 parsing with optional sign - no allocation.
///
/// Returns None on empty input, stray characters or overflow.
#[inline(always)]
pub fn parse_i64_fast(bytes: &[u8]) -> Option<i64> {
    let (negative, digits) = match bytes.split_first()? {
        (b'-', rest) => (true, rest),
        (b'+', rest) => (false, rest),
        _ => (false, bytes),
    };
    if digits.is_empty() {
        return None;
    }
    let mut n: i64 = 0;
    for &b in digits {
        let d = b.wrapping_sub(b'0');
        if d > 9 {
            return None;
        }
        n = n.checked_mul(10)?;
        // Accumulate negatively so i64::MIN parses
        n = if negative {
            n.checked_sub(d as i64)?
        } else {
            n.checked_add(d as i64)?
        };
    }
    Some(n)
}

/// Check if a line should be skipped (blank or comment).
#[inline(always)]
pub fn should_skip_line(line: &[u8]) -> bool {
    match line.iter().position(|b| !b.is_ascii_whitespace()) {
        None => true,
        Some(i) => line[i] == b'#',
    }
}

/// Parse a single non-skipped script line.
///
/// The error is a message without line information.
pub fn parse_op(line: &[u8]) -> std::result::Result<Op, String> {
    let mut fields = line
        .split(|b| b.is_ascii_whitespace())
        .filter(|f| !f.is_empty());

    let name = fields.next().ok_or_else(|| "empty line".to_string())?;
    let mut number = |what: &str| -> std::result::Result<i64, String> {
        let field = fields
            .next()
            .ok_or_else(|| format!("missing {} field", what))?;
        parse_i64_fast(field).ok_or_else(|| {
            format!(
                "invalid {} '{}'",
                what,
                String::from_utf8_lossy(field)
            )
        })
    };

    let op = match name {
        b"add" | b"set" => {
            let from = number("from")?;
            let to = number("to")?;
            let amount = number("amount")?;
            if name == b"add" {
                Op::Add { from, to, amount }
            } else {
                Op::Set { from, to, amount }
            }
        }
        b"print" => Op::Print,
        other => {
            return Err(format!(
                "unknown operation '{}'",
                String::from_utf8_lossy(other)
            ))
        }
    };

    if let Some(extra) = fields.next() {
        return Err(format!(
            "unexpected trailing field '{}'",
            String::from_utf8_lossy(extra)
        ));
    }
    Ok(op)
}

/// Iterator over the operations of a script held in memory.
///
/// Yields `(line_number, op)` with 1-based line numbers.
pub struct ScriptOps<'a> {
    data: &'a [u8],
    pos: usize,
    line: usize,
}

/// Parse the operations of a script buffer.
pub fn parse_script(data: &[u8]) -> ScriptOps<'_> {
    ScriptOps {
        data,
        pos: 0,
        line: 0,
    }
}

impl Iterator for ScriptOps<'_> {
    type Item = Result<(usize, Op)>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.pos < self.data.len() {
            let rest = &self.data[self.pos..];
            let line_len = memchr(b'\n', rest).unwrap_or(rest.len());
            let mut line = &rest[..line_len];
            self.pos += line_len + 1;
            self.line += 1;

            // Handle \r\n
            if let Some((&b'\r', head)) = line.split_last() {
                line = head;
            }
            if should_skip_line(line) {
                continue;
            }

            let line_number = self.line;
            return Some(
                parse_op(line)
                    .map(|op| (line_number, op))
                    .map_err(|message| SegmentsError::Parse {
                        line: line_number,
                        message,
                    }),
            );
        }
        None
    }
}
