use std::io::{ErrorKind, Read};

use memchr::memchr;

use crate::error::{Result, ScanError};

/// Read buffer per worker. Also the longest line a worker can handle.
pub const DEFAULT_BUFFER_SIZE: usize = 2 * 1024 * 1024;

/// Sequential line reader over a fixed-size buffer.
///
/// Lines are returned without their `\n` and without one trailing `\r`. A
/// final line with no terminator is still returned at end of input. The
/// buffer never grows: a line that does not fit fails with
/// [`ScanError::LineTooLong`].
pub struct LineScanner<R> {
    reader: R,
    buf: Box<[u8]>,
    start: usize,
    end: usize,
    eof: bool,
    consumed: u64,
}

impl<R: Read> LineScanner<R> {
    pub fn new(reader: R) -> Self {
        Self::with_capacity(reader, DEFAULT_BUFFER_SIZE)
    }

    pub fn with_capacity(reader: R, capacity: usize) -> Self {
        LineScanner {
            reader,
            buf: vec![0u8; capacity.max(1)].into_boxed_slice(),
            start: 0,
            end: 0,
            eof: false,
            consumed: 0,
        }
    }

    /// Bytes handed out so far, terminators included.
    pub fn consumed(&self) -> u64 {
        self.consumed
    }

    pub fn next_line(&mut self) -> Result<Option<&[u8]>> {
        loop {
            if let Some(pos) = memchr(b'\n', &self.buf[self.start..self.end]) {
                let line_start = self.start;
                self.start += pos + 1;
                self.consumed += pos as u64 + 1;
                return Ok(Some(trim_cr(&self.buf[line_start..line_start + pos])));
            }

            if self.eof {
                if self.start == self.end {
                    return Ok(None);
                }
                let line_start = self.start;
                self.consumed += (self.end - self.start) as u64;
                self.start = self.end;
                return Ok(Some(trim_cr(&self.buf[line_start..self.end])));
            }

            self.fill()?;
        }
    }

    fn fill(&mut self) -> Result<()> {
        if self.start > 0 {
            self.buf.copy_within(self.start..self.end, 0);
            self.end -= self.start;
            self.start = 0;
        }
        if self.end == self.buf.len() {
            return Err(ScanError::LineTooLong {
                limit: self.buf.len(),
            });
        }

        loop {
            match self.reader.read(&mut self.buf[self.end..]) {
                Ok(0) => {
                    self.eof = true;
                    return Ok(());
                }
                Ok(n) => {
                    self.end += n;
                    return Ok(());
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }
}

#[inline]
fn trim_cr(line: &[u8]) -> &[u8] {
    match line.split_last() {
        Some((b'\r', rest)) => rest,
        _ => line,
    }
}
