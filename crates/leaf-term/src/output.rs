// SPDX-License-Identifier: MIT
//
// Output buffering — the single-write frame contract.
//
// `OutputBuffer` accumulates all ANSI bytes for a frame in memory so the
// entire frame can be written in one write() syscall. Writing a frame
// incrementally lets the terminal repaint mid-frame and tear; batching
// everything into one write is what keeps the screen stable.
//
// The buffer implements `io::Write`, so the escape generators in `ansi`
// and ordinary `write!` formatting both target it directly.

use std::io::{self, Write};

/// A byte buffer that accumulates ANSI output for a single `write()` syscall.
///
/// Instead of hundreds of small writes per frame (cursor moves, color
/// changes, characters), everything goes into this buffer first. A single
/// flush at frame end writes it all at once.
///
/// Default capacity: 16 KB — enough for most frames without reallocation.
#[derive(Debug)]
pub struct OutputBuffer {
    buf: Vec<u8>,
}

const DEFAULT_CAPACITY: usize = 16_384;

impl OutputBuffer {
    /// Create an empty buffer with default capacity (16 KB).
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

    /// Append raw bytes.
    #[inline]
    pub fn push(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Clear the buffer for reuse (keeps allocated capacity).
    #[inline]
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Write accumulated output to stdout and clear the buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to stdout fails.
    pub fn flush_stdout(&mut self) -> io::Result<()> {
        if !self.buf.is_empty() {
            let mut stdout = io::stdout().lock();
            stdout.write_all(&self.buf)?;
            stdout.flush()?;
            self.buf.clear();
        }
        Ok(())
    }

    /// Write accumulated output to an arbitrary writer and clear the buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `w` fails.
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
        // Intentionally a no-op. Real flushing via flush_stdout() / flush_to().
        Ok(())
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn new_is_empty() {
        let buf = OutputBuffer::new();
        assert!(buf.is_empty());
        assert_eq!(buf.len(), 0);
    }

    #[test]
    fn write_accumulates() {
        let mut buf = OutputBuffer::new();
        buf.write_all(b"hello").unwrap();
        buf.write_all(b" world").unwrap();
        assert_eq!(buf.as_bytes(), b"hello world");
        assert_eq!(buf.len(), 11);
    }

    #[test]
    fn push_appends_bytes() {
        let mut buf = OutputBuffer::new();
        buf.push(b"~");
        buf.push(b"\r\n");
        assert_eq!(buf.as_bytes(), b"~\r\n");
    }

    #[test]
    fn debug_format_does_not_panic() {
        let mut buf = OutputBuffer::new();
        buf.push(b"x");
        let _ = format!("{buf:?}");
    }

    #[test]
    fn write_trait_flush_is_noop() {
        let mut buf = OutputBuffer::new();
        buf.write_all(b"data").unwrap();
        Write::flush(&mut buf).unwrap();
        assert_eq!(buf.as_bytes(), b"data");
    }

    #[test]
    fn clear_keeps_capacity() {
        let mut buf = OutputBuffer::new();
        buf.write_all(b"data").unwrap();
        buf.clear();
        assert!(buf.is_empty());
        assert!(buf.buf.capacity() >= DEFAULT_CAPACITY);
    }

    #[test]
    fn flush_to_writes_everything_once() {
        let mut buf = OutputBuffer::new();
        buf.write_all(b"\x1b[2Jframe").unwrap();
        let mut sink = Vec::new();
        buf.flush_to(&mut sink).unwrap();
        assert_eq!(sink, b"\x1b[2Jframe");
        assert!(buf.is_empty());
    }

    #[test]
    fn flush_to_empty_writes_nothing() {
        let mut buf = OutputBuffer::new();
        let mut sink = Vec::new();
        buf.flush_to(&mut sink).unwrap();
        assert!(sink.is_empty());
    }

    #[test]
    fn formatting_via_write_macro() {
        let mut buf = OutputBuffer::new();
        write!(buf, "{}:{}", 3, 7).unwrap();
        assert_eq!(buf.as_bytes(), b"3:7");
    }

    #[test]
    fn default_is_new() {
        assert!(OutputBuffer::default().is_empty());
    }
}
