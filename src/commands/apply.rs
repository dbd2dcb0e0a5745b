//! Apply an operation script to a fresh profile.
//!
//! Every `print` writes the current profile in canonical text form on its
//! own line. A script without any `print` writes the final profile once.

use crate::error::{Result, SegmentsError};
use crate::output::SegmentWriter;
use crate::script::{parse_script, Op};
use crate::store::{SegmentStore, SkipListStore, StoreStats};
use memmap2::Mmap;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

/// Minimum file size to use mmap (smaller files use buffered I/O)
const MMAP_THRESHOLD: usize = 64 * 1024;

/// Statistics from an apply run.
#[derive(Debug, Default, Clone)]
pub struct ApplyStats {
    pub ops: usize,
    pub prints: usize,
    pub used_mmap: bool,
    pub store: StoreStats,
}

impl std::fmt::Display for ApplyStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Ops: {}, Prints: {}, Mmap: {}, {}",
            self.ops,
            self.prints,
            if self.used_mmap { "yes" } else { "no" },
            self.store
        )
    }
}

/// Apply command configuration.
#[derive(Debug, Clone, Default)]
pub struct ApplyCommand {
    /// Seed for the index level generator (entropy when unset)
    pub seed: Option<u64>,
}

impl ApplyCommand {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a reproducible index shape.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Run on a script file.
    pub fn run<P: AsRef<Path>, W: Write>(&self, input_path: P, output: W) -> Result<ApplyStats> {
        let file = File::open(input_path.as_ref())?;
        let file_size = file.metadata()?.len() as usize;

        if file_size >= MMAP_THRESHOLD {
            // SAFETY: the map is read-only and dropped before returning.
            let mmap = unsafe { Mmap::map(&file)? };
            self.apply_bytes(&mmap, output, true)
        } else {
            self.run_reader(file, output)
        }
    }

    /// Run on stdin.
    pub fn run_stdin<W: Write>(&self, output: W) -> Result<ApplyStats> {
        let stdin = io::stdin();
        self.run_reader(stdin.lock(), output)
    }

    /// Run on any reader, buffering the whole script.
    pub fn run_reader<R: Read, W: Write>(&self, mut reader: R, output: W) -> Result<ApplyStats> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        self.apply_bytes(&data, output, false)
    }

    fn new_store(&self) -> SkipListStore {
        match self.seed {
            Some(seed) => SkipListStore::with_seed(seed),
            None => SkipListStore::new(),
        }
    }

    fn apply_bytes<W: Write>(&self, data: &[u8], output: W, used_mmap: bool) -> Result<ApplyStats> {
        let mut store = self.new_store();
        let mut writer = SegmentWriter::new(output);
        let mut stats = ApplyStats {
            used_mmap,
            ..Default::default()
        };

        for item in parse_script(data) {
            let (line, op) = item?;
            match op {
                Op::Print => {
                    writer.write_segments_line(&store.segments())?;
                    stats.prints += 1;
                }
                _ => {
                    op.apply(&mut store)
                        .map_err(|source| SegmentsError::Script {
                            line,
                            source: Box::new(source),
                        })?;
                    stats.ops += 1;
                }
            }
        }

        if stats.prints == 0 {
            writer.write_segments_line(&store.segments())?;
        }
        writer.flush()?;

        stats.store = store.stats();
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(script: &str) -> Result<String> {
        let mut output = Vec::new();
        ApplyCommand::new()
            .with_seed(1)
            .run_reader(script.as_bytes(), &mut output)?;
        Ok(String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_apply_prints() {
        let script = "print\nadd 10 30 1\nprint\nadd 20 40 1\nprint\nadd 10 40 -2\nprint\n";
        assert_eq!(
            apply(script).unwrap(),
            "[]\n[[10,1],[30,0]]\n[[10,1],[20,2],[30,1],[40,0]]\n[[10,-1],[20,0],[30,-1],[40,0]]\n"
        );
    }

    #[test]
    fn test_apply_final_state_without_print() {
        let script = "# overwrite collapse\nadd 10 30 1\nset 15 25 5\n";
        assert_eq!(apply(script).unwrap(), "[[10,1],[15,5],[25,1],[30,0]]\n");
        assert_eq!(apply("").unwrap(), "[]\n");
    }

    #[test]
    fn test_apply_reports_failing_line() {
        let err = apply("add 10 30 1\n\nadd 30 10 1\n").unwrap_err();
        match err {
            SegmentsError::Script { line, source } => {
                assert_eq!(line, 3);
                assert!(matches!(*source, SegmentsError::InvalidRange { .. }));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_apply_parse_error() {
        let err = apply("add 10 30\n").unwrap_err();
        assert!(matches!(err, SegmentsError::Parse { line: 1, .. }));
    }

    #[test]
    fn test_apply_stats() {
        let mut output = Vec::new();
        let stats = ApplyCommand::new()
            .run_reader(&b"add 10 30 1\nset 15 25 5\nprint\n"[..], &mut output)
            .unwrap();
        assert_eq!(stats.ops, 2);
        assert_eq!(stats.prints, 1);
        assert!(!stats.used_mmap);
        assert_eq!(stats.store.breakpoints, 4);
    }
}
