// src/compression/mod.rs
//! Gzip codec plumbing and round-trip verification
//!
//! Booster only trusts a decompression if compressing the recovered plaintext
//! again reproduces the original bytes exactly. This module holds the
//! canonical encoder configuration ([`GzipParams`]), the streaming
//! [`RoundTripDecoder`] that decodes and verifies in one pass, and the
//! bounded two-cursor comparator it is built on.
//!
//! Gzip encoding is deterministic for a given input and encoder
//! configuration, so "canonical" simply means: the same deflate level, a fixed
//! MTIME, a fixed OS byte, and no optional header fields.

pub mod compare;
mod roundtrip;

pub use compare::StreamComparator;
pub use roundtrip::{RoundTripDecoder, Verdict, check_file};

use flate2::write::GzEncoder;
use flate2::{Compression, GzBuilder};
use serde::Deserialize;
use std::io::{self, Read, Write};
use thiserror::Error;

/// Default streaming chunk size
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// Default bound on how far one side of the comparison may run ahead
pub const DEFAULT_MAX_LAG: usize = 16 * 1024 * 1024;

/// Round-trip decoding errors
#[derive(Error, Debug)]
pub enum RoundTripError {
    /// Empty input or an unparseable gzip header. This is the normal case for
    /// plain files and callers skip it silently.
    #[error("not a gzip stream")]
    NotAGzipStream,

    /// The header parsed but the body or trailer is truncated or corrupt
    #[error("corrupt gzip stream: {0}")]
    CorruptStream(#[source] io::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl RoundTripError {
    /// Classify an error raised while pulling plaintext out of the decoder
    ///
    /// flate2 reports malformed deflate data, checksum mismatches and early
    /// end of input through these kinds; anything else came from the source.
    pub fn from_decode(err: io::Error) -> Self {
        if is_decode_failure(&err) {
            Self::CorruptStream(err)
        } else {
            Self::Io(err)
        }
    }

    /// True for the expected, silent "plain file" case
    pub fn is_not_gzip(&self) -> bool {
        matches!(self, Self::NotAGzipStream)
    }
}

fn is_decode_failure(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::InvalidInput | io::ErrorKind::InvalidData | io::ErrorKind::UnexpectedEof
    )
}

/// Canonical gzip encoder configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GzipParams {
    /// Deflate level, 0..=9
    pub level: u32,
    /// Header MTIME field
    pub mtime: u32,
    /// Header OS field (255 = unknown)
    pub os: u8,
    /// Comparator window bound in bytes
    pub max_lag: usize,
    /// Streaming chunk size in bytes
    pub buffer_size: usize,
}

impl Default for GzipParams {
    fn default() -> Self {
        Self {
            level: Compression::default().level(),
            mtime: 0,
            os: 255,
            max_lag: DEFAULT_MAX_LAG,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl GzipParams {
    /// Build a gzip encoder writing into `writer` with these parameters
    pub fn encoder<W: Write>(&self, writer: W) -> GzEncoder<W> {
        GzBuilder::new()
            .mtime(self.mtime)
            .operating_system(self.os)
            .write(writer, Compression::new(self.level))
    }
}

/// Compress everything from `reader` into `writer` using the canonical
/// configuration. Returns the number of plaintext bytes consumed.
pub fn compress_stream<R: Read, W: Write>(
    mut reader: R,
    writer: W,
    params: &GzipParams,
) -> io::Result<u64> {
    let mut encoder = params.encoder(writer);
    let copied = io::copy(&mut reader, &mut encoder)?;
    encoder.finish()?.flush()?;
    Ok(copied)
}

/// Compress a byte slice with the canonical configuration
pub fn compress(data: &[u8], params: &GzipParams) -> io::Result<Vec<u8>> {
    let mut out = Vec::new();
    compress_stream(data, &mut out, params)?;
    Ok(out)
}
