//! Buffered canonical-text output.
//!
//! Uses itoa for integer formatting to avoid allocation in the hot path.

use crate::error::Result;
use crate::segment::Segment;
use std::io::{BufWriter, Write};

/// Buffer size for SegmentWriter (1MB default).
const DEFAULT_BUFFER_SIZE: usize = 1024 * 1024;

/// Writer for profiles in canonical text form (`[[10,1],[30,0]]`).
pub struct SegmentWriter<W: Write> {
    writer: BufWriter<W>,
    itoa_buf: itoa::Buffer,
}

impl<W: Write> SegmentWriter<W> {
    /// Create a new SegmentWriter with the default buffer.
    pub fn new(output: W) -> Self {
        Self::with_capacity(DEFAULT_BUFFER_SIZE, output)
    }

    /// Create a new SegmentWriter with specified buffer size.
    pub fn with_capacity(capacity: usize, output: W) -> Self {
        Self {
            writer: BufWriter::with_capacity(capacity, output),
            itoa_buf: itoa::Buffer::new(),
        }
    }

    /// Write one `[position,value]` pair.
    #[inline]
    pub fn write_segment(&mut self, segment: &Segment) -> Result<()> {
        self.writer.write_all(b"[")?;
        self.writer
            .write_all(self.itoa_buf.format(segment.position).as_bytes())?;
        self.writer.write_all(b",")?;
        self.writer
            .write_all(self.itoa_buf.format(segment.value).as_bytes())?;
        self.writer.write_all(b"]")?;
        Ok(())
    }

    /// Write a whole profile without a trailing newline.
    pub fn write_segments(&mut self, segments: &[Segment]) -> Result<()> {
        self.writer.write_all(b"[")?;
        for (i, segment) in segments.iter().enumerate() {
            if i > 0 {
                self.writer.write_all(b",")?;
            }
            self.write_segment(segment)?;
        }
        self.writer.write_all(b"]")?;
        Ok(())
    }

    /// Write a whole profile followed by newline.
    pub fn write_segments_line(&mut self, segments: &[Segment]) -> Result<()> {
        self.write_segments(segments)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    /// Flush the output buffer.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
