//! Splits a file into line-aligned byte ranges, one per worker.
//!
//! Provisional boundaries sit at equal-width multiples of `file_size / workers`.
//! Every boundary except the last is then pushed forward past the next `\n`
//! unless it already sits at the start of a line, so no line ever straddles
//! two ranges. The last range always ends at `file_size` and absorbs the
//! integer-division remainder.

use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom};

use memchr::memchr;
use serde::Serialize;

use crate::error::{Result, ScanError};

/// Half-open byte range `[start, end)` of the input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChunkRange {
    pub start: u64,
    pub end: u64,
}

impl ChunkRange {
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// Number of bytes to add to `offset` so that it lands on the first byte of a
/// line.
///
/// Returns 0 when the byte before `offset` is already a `\n` or when `offset`
/// is at or past end-of-file. Otherwise counts through the next `\n`
/// inclusive, or to end-of-file if the line is unterminated. Offset 0 is
/// treated as mid-line so a non-final range can never end at 0 in a
/// non-empty file.
pub fn adjust_to_next_newline<R: Read + Seek>(reader: &mut R, offset: u64) -> io::Result<u64> {
    let mut reader = if offset > 0 {
        reader.seek(SeekFrom::Start(offset - 1))?;
        let mut reader = BufReader::new(reader);
        let mut prev = [0u8; 1];
        if reader.read(&mut prev)? == 0 || prev[0] == b'\n' {
            return Ok(0);
        }
        reader
    } else {
        reader.seek(SeekFrom::Start(0))?;
        BufReader::new(reader)
    };

    let mut adjustment = 0u64;
    loop {
        let buf = reader.fill_buf()?;
        if buf.is_empty() {
            return Ok(adjustment);
        }
        match memchr(b'\n', buf) {
            Some(pos) => return Ok(adjustment + pos as u64 + 1),
            None => {
                let n = buf.len();
                adjustment += n as u64;
                reader.consume(n);
            }
        }
    }
}

/// Plan `workers` contiguous ranges covering `[0, file_size)`.
///
/// Always returns exactly `workers` ranges; trailing ones are empty when long
/// lines swallow their provisional boundaries or the file is smaller than the
/// worker count.
pub fn plan_chunks<R: Read + Seek>(
    reader: &mut R,
    file_size: u64,
    workers: usize,
) -> Result<Vec<ChunkRange>> {
    if workers == 0 {
        return Err(ScanError::NoWorkers);
    }

    let chunk_size = file_size / workers as u64;
    let mut chunks = Vec::with_capacity(workers);
    let mut start = 0u64;

    for i in 0..workers {
        let end = if i == workers - 1 {
            file_size
        } else {
            let provisional = ((i as u64 + 1) * chunk_size).max(start).min(file_size);
            let adjustment = adjust_to_next_newline(reader, provisional).map_err(|source| {
                ScanError::Boundary {
                    offset: provisional,
                    source,
                }
            })?;
            (provisional + adjustment).min(file_size)
        };

        tracing::debug!(chunk = i, start, end, bytes = end - start, "planned chunk");
        chunks.push(ChunkRange { start, end });
        start = end;
    }

    Ok(chunks)
}
