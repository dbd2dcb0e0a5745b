//! Error type shared by the stores, the script parser and the commands.

use crate::segment::Position;
use std::io;
use thiserror::Error;

/// Errors that can occur while mutating a profile or running a command.
#[derive(Error, Debug)]
pub enum SegmentsError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Invalid range: from ({from}) > to ({to})")]
    InvalidRange { from: Position, to: Position },

    #[error("Empty range at {at} (strict ranges enabled)")]
    EmptyRange { at: Position },

    #[error("Intensity overflow at position {position}")]
    Overflow { position: Position },

    #[error("Position {position} outside dense domain [0, {domain}]")]
    OutOfDomain { position: Position, domain: Position },

    #[error("Mismatch in trial with seed {seed} after step {step}: expected {expected}, got {actual}")]
    Mismatch {
        seed: u64,
        step: usize,
        expected: String,
        actual: String,
    },

    #[error("Line {line}: {source}")]
    Script {
        line: usize,
        #[source]
        source: Box<SegmentsError>,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, SegmentsError>;
