// SPDX-License-Identifier: MIT
//
// Output batching.
//
// Every redraw of the edit line is staged in memory and written with a
// single write() + flush(). A keystroke then costs one syscall instead of
// one per escape sequence, and the terminal never renders a half-drawn
// line between the erase and the repaint.

use std::io::{self, Write};

/// A byte buffer that accumulates one redraw for a single `write()` call.
///
/// Default capacity comfortably fits a prompt, a line of input, and the
/// cursor repositioning sequence without reallocation.
#[derive(Debug)]
pub struct OutputBuffer {
    buf: Vec<u8>,
}

const DEFAULT_CAPACITY: usize = 256;

impl OutputBuffer {
    /// Create an empty buffer with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(DEFAULT_CAPACITY),
        }
    }

    /// Number of bytes accumulated.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the buffer is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The accumulated bytes (for testing and debugging).
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Clear the buffer for reuse (keeps allocated capacity).
    #[inline]
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Write the accumulated bytes to `w` in one call and clear the buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to or flushing `w` fails.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        if !self.buf.is_empty() {
            w.write_all(&self.buf)?;
            w.flush()?;
            self.buf.clear();
        }
        Ok(())
    }
}

impl Write for OutputBuffer {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        // Intentionally a no-op. Real flushing happens via flush_to().
        Ok(())
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn accumulates_writes() {
        let mut out = OutputBuffer::new();
        out.write_all(b"$ ").unwrap();
        out.write_all(b"ls").unwrap();
        assert_eq!(out.as_bytes(), b"$ ls");
        assert_eq!(out.len(), 4);
    }

    #[test]
    fn flush_is_noop() {
        let mut out = OutputBuffer::new();
        out.write_all(b"kept").unwrap();
        out.flush().unwrap();
        assert_eq!(out.as_bytes(), b"kept");
    }

    #[test]
    fn flush_to_drains_in_one_write() {
        let mut out = OutputBuffer::new();
        out.write_all(b"\r\x1b[K$ ").unwrap();
        let mut sink = Vec::new();
        out.flush_to(&mut sink).unwrap();
        assert_eq!(sink, b"\r\x1b[K$ ");
        assert!(out.is_empty());
    }

    #[test]
    fn flush_to_empty_writes_nothing() {
        let mut out = OutputBuffer::new();
        let mut sink = Vec::new();
        out.flush_to(&mut sink).unwrap();
        assert!(sink.is_empty());
    }

    #[test]
    fn clear_keeps_nothing() {
        let mut out = OutputBuffer::new();
        out.write_all(b"gone").unwrap();
        out.clear();
        assert!(out.is_empty());
    }
}
