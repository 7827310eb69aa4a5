// src/lib.rs

//! Booster: transparent gzip decompression for diff-friendly file trees
//!
//! Gzip output changes wildly with tiny changes in its plaintext, so two
//! nearly identical compressed layers share almost no bytes. Booster keeps a
//! decompressed "shadow" copy next to every gzip file that can be rebuilt
//! byte-for-byte from its plaintext, which lets a sync or diff tool work on
//! the plaintext and regenerate the exact compressed original afterwards.
//!
//! # Architecture
//!
//! - `compression`: the round-trip decoder, which decompresses a stream and
//!   simultaneously checks that re-encoding reproduces the original bytes
//! - `shadow`: tree passes that create shadows, regenerate originals and
//!   compute the deduplicated logical view
//! - `config`: TOML configuration (marker, codec parameters, policy)
//! - `progress`: progress reporting for passes

pub mod compression;
pub mod config;
mod error;
pub mod progress;
pub mod shadow;

pub use compression::{GzipParams, RoundTripDecoder, RoundTripError, Verdict, check_file};
pub use config::BoosterConfig;
pub use error::{Error, Result};
pub use progress::{CliProgress, LogProgress, ProgressTracker, SilentProgress};
pub use shadow::{
    DEFAULT_MARKER, DecompressOutcome, FileError, FileOp, PassReport, RecompressOutcome,
    ShadowTree, decompress_all_in, logical_view_of, recompress_all_in,
};
