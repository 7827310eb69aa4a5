// src/compression/roundtrip.rs

//! Streaming decode-and-verify
//!
//! [`RoundTripDecoder`] decompresses a gzip stream on demand and, while doing
//! so, feeds every plaintext chunk into a mirrored encoder configured with the
//! canonical [`GzipParams`]. The mirrored output is compared against the
//! compressed bytes actually pulled from the source. Once the plaintext has
//! been read to the end, [`RoundTripDecoder::finish`] reports whether the
//! stream is transparently recompressible.

use super::{GzipParams, RoundTripError, StreamComparator, is_decode_failure};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;
use tracing::debug;

/// Outcome of a complete decode pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    /// Re-encoding the plaintext reproduces the consumed bytes exactly
    pub transparent: bool,
    /// Compressed bytes consumed from the source
    pub compressed_len: u64,
    /// Plaintext bytes produced
    pub plaintext_len: u64,
}

/// Source adapter recording the bytes the decoder pulls
struct CaptureReader<R> {
    inner: R,
    captured: Vec<u8>,
    total: u64,
}

impl<R: Read> Read for CaptureReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.captured.extend_from_slice(&buf[..n]);
        self.total += n as u64;
        Ok(n)
    }
}

/// Gzip decoder that verifies transparent recompressibility as it goes
///
/// The plaintext can be read exactly once through the [`Read`] impl. Memory
/// use is bounded by the chunk size plus the comparator window, independent
/// of the stream size.
pub struct RoundTripDecoder<R: Read> {
    decoder: GzDecoder<CaptureReader<R>>,
    /// Dropped as soon as the streams diverge
    encoder: Option<GzEncoder<Vec<u8>>>,
    comparator: StreamComparator,
    /// Plaintext decoded while probing the header
    primed: Vec<u8>,
    primed_pos: usize,
    plaintext_len: u64,
    chunk_size: usize,
    finished: bool,
}

impl<R: Read> RoundTripDecoder<R> {
    /// Wrap `source`, failing fast with [`RoundTripError::NotAGzipStream`]
    /// when it is empty or does not start with a valid gzip header
    pub fn new(source: R, params: &GzipParams) -> Result<Self, RoundTripError> {
        let capture = CaptureReader {
            inner: source,
            captured: Vec::new(),
            total: 0,
        };

        let mut this = Self {
            decoder: GzDecoder::new(capture),
            encoder: Some(params.encoder(Vec::new())),
            comparator: StreamComparator::new(params.max_lag),
            primed: Vec::new(),
            primed_pos: 0,
            plaintext_len: 0,
            chunk_size: params.buffer_size.max(1),
            finished: false,
        };
        this.prime()?;
        Ok(this)
    }

    /// Decode the first chunk so header problems surface from `new`
    fn prime(&mut self) -> Result<(), RoundTripError> {
        let mut buf = vec![0u8; self.chunk_size];
        let result = self.decoder.read(&mut buf);

        if self.decoder.header().is_none() {
            return match result {
                Err(e) if !is_decode_failure(&e) => Err(RoundTripError::Io(e)),
                _ => Err(RoundTripError::NotAGzipStream),
            };
        }

        let n = result.map_err(RoundTripError::from_decode)?;
        buf.truncate(n);
        self.absorb(&buf)?;
        if n == 0 {
            self.complete()?;
        }
        self.primed = buf;
        Ok(())
    }

    /// Account for a freshly decoded plaintext chunk
    fn absorb(&mut self, plain: &[u8]) -> io::Result<()> {
        let consumed = std::mem::take(&mut self.decoder.get_mut().captured);
        self.comparator.push_original(&consumed);
        self.plaintext_len += plain.len() as u64;

        if self.comparator.has_diverged() {
            self.encoder = None;
            return Ok(());
        }
        if let Some(encoder) = self.encoder.as_mut() {
            encoder.write_all(plain)?;
            let produced = std::mem::take(encoder.get_mut());
            self.comparator.push_reencoded(&produced);
        }
        Ok(())
    }

    /// Called once the decoder reports end of stream
    fn complete(&mut self) -> io::Result<()> {
        if let Some(encoder) = self.encoder.take() {
            let tail = encoder.finish()?;
            self.comparator.push_reencoded(&tail);
        }

        // Bytes after the first member (more members, padding, garbage)
        // are part of what a transparent stream would have to reproduce.
        if !self.comparator.has_diverged() {
            let mut probe = [0u8; 512];
            let capture = self.decoder.get_mut();
            let trailing = capture.read(&mut probe)?;
            let consumed = std::mem::take(&mut capture.captured);
            if trailing > 0 {
                debug!("Data follows the first gzip member");
            }
            self.comparator.push_original(&consumed);
        }

        self.finished = true;
        Ok(())
    }

    /// True once all plaintext has been handed out
    pub fn is_exhausted(&self) -> bool {
        self.finished && self.primed_pos == self.primed.len()
    }

    /// Plaintext bytes decoded so far
    pub fn plaintext_len(&self) -> u64 {
        self.plaintext_len
    }

    /// Close the reader and report the verdict
    ///
    /// A reader closed before its plaintext was fully consumed is never
    /// transparent: nothing can be proven about the unread remainder.
    pub fn finish(self) -> Verdict {
        Verdict {
            transparent: self.is_exhausted() && self.comparator.is_identical(),
            compressed_len: self.decoder.get_ref().total,
            plaintext_len: self.plaintext_len,
        }
    }
}

impl<R: Read> Read for RoundTripDecoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.primed_pos < self.primed.len() {
            let available = &self.primed[self.primed_pos..];
            let n = available.len().min(buf.len());
            buf[..n].copy_from_slice(&available[..n]);
            self.primed_pos += n;
            return Ok(n);
        }
        if self.finished || buf.is_empty() {
            return Ok(0);
        }

        let n = self.decoder.read(buf)?;
        self.absorb(&buf[..n])?;
        if n == 0 {
            self.complete()?;
        }
        Ok(n)
    }
}

/// Decode `path` without writing anything and report its verdict
///
/// Returns `Ok(None)` for files that are not gzip streams at all.
pub fn check_file(path: &Path, params: &GzipParams) -> Result<Option<Verdict>, RoundTripError> {
    let file = File::open(path)?;
    let mut decoder = match RoundTripDecoder::new(file, params) {
        Ok(decoder) => decoder,
        Err(RoundTripError::NotAGzipStream) => return Ok(None),
        Err(e) => return Err(e),
    };
    io::copy(&mut decoder, &mut io::sink()).map_err(RoundTripError::from_decode)?;
    Ok(Some(decoder.finish()))
}
