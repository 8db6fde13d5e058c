//! Input and output collaborators for the engine.
//!
//! `,` pulls whole lines from a [`LineSource`] and `.` pushes single chars to
//! an [`OutputSink`]. Both are traits so callers can wire stdin/stdout for
//! the CLI or in-memory buffers for tests.

use std::io::{self, BufRead, Write};

/// Supplies input one line at a time.
///
/// Implementations may block until a line is available. An empty string is a
/// valid line; the engine simply asks again.
pub trait LineSource {
    /// Return the next line without its line terminator.
    fn next_line(&mut self) -> io::Result<String>;
}

/// Receives program output one char at a time.
pub trait OutputSink {
    fn write_char(&mut self, ch: char) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Reads lines from any buffered reader, e.g. `io::stdin().lock()` or a `Cursor`.
///
/// End of stream is reported as [`io::ErrorKind::UnexpectedEof`].
pub struct BufReadLines<R> {
    reader: R,
}

impl<R: BufRead> BufReadLines<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> LineSource for BufReadLines<R> {
    fn next_line(&mut self) -> io::Result<String> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input exhausted"));
        }
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(line)
    }
}

/// Writes chars as UTF-8 to any [`Write`] implementation.
pub struct WriterSink<W> {
    writer: W,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> OutputSink for WriterSink<W> {
    fn write_char(&mut self, ch: char) -> io::Result<()> {
        let mut buf = [0u8; 4];
        self.writer.write_all(ch.encode_utf8(&mut buf).as_bytes())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// Collects output in memory.
impl OutputSink for String {
    fn write_char(&mut self, ch: char) -> io::Result<()> {
        self.push(ch);
        Ok(())
    }
}
