//! Tests for write_and_flush
//!
//! These tests verify:
//! - Data reaches the sink verbatim with nothing left buffered
//! - Short writes and failing sinks are absorbed, never propagated

use std::io::{self, BufWriter, Write};

use linecmd::protocol::write_and_flush;

// =============================================================================
// Helper Functions
// =============================================================================

/// Accepts at most `capacity` bytes, then reports a full sink
struct ShortSink {
    data: Vec<u8>,
    capacity: usize,
}

impl Write for ShortSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = buf.len().min(self.capacity - self.data.len());
        self.data.extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Every operation fails
struct BrokenSink;

impl Write for BrokenSink {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "broken pipe"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "broken pipe"))
    }
}

// =============================================================================
// Delivery Tests
// =============================================================================

#[test]
fn test_written_and_flushed() {
    let mut w = BufWriter::new(Vec::new());
    write_and_flush(&mut w, "foo\n");

    assert!(w.buffer().is_empty(), "Expected 0 bytes buffered, have {}", w.buffer().len());
    assert_eq!(w.get_ref().as_slice(), b"foo\n");
}

#[test]
fn test_multiple_writes_append_in_order() {
    let mut w = BufWriter::new(Vec::new());
    write_and_flush(&mut w, "successfully created db\n");
    write_and_flush(&mut w, "Available Commands:\n\thelp\n");

    assert!(w.buffer().is_empty());
    assert_eq!(
        String::from_utf8(w.get_ref().clone()).unwrap(),
        "successfully created db\nAvailable Commands:\n\thelp\n"
    );
}

#[test]
fn test_larger_than_buffer_capacity() {
    let data = "x".repeat(100_000);
    let mut w = BufWriter::with_capacity(16, Vec::new());
    write_and_flush(&mut w, &data);

    assert!(w.buffer().is_empty());
    assert_eq!(w.get_ref().len(), data.len());
}

#[test]
fn test_empty_string() {
    let mut w = BufWriter::new(Vec::new());
    write_and_flush(&mut w, "");
    assert!(w.get_ref().is_empty());
}

// =============================================================================
// Shortfall Tests
// =============================================================================

#[test]
fn test_short_sink_keeps_what_fits() {
    let sink = ShortSink {
        data: Vec::new(),
        capacity: 4,
    };
    // Unbuffered so the sink sees the write directly
    let mut w = BufWriter::with_capacity(0, sink);
    write_and_flush(&mut w, "Connection has expired\n");

    assert_eq!(w.get_ref().data.as_slice(), b"Conn");
}

#[test]
fn test_broken_sink_does_not_panic() {
    let mut w = BufWriter::with_capacity(0, BrokenSink);
    write_and_flush(&mut w, "anything\n");
    write_and_flush(&mut w, "still fine\n");
}
