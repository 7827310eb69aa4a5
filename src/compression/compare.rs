// src/compression/compare.rs

//! Two-cursor byte stream comparator
//!
//! Compares two byte streams that become available incrementally and at
//! different rates: the compressed bytes consumed from the source, and the
//! output of the mirrored re-encoder. Only the bytes by which one side is
//! ahead of the other are buffered, so memory is bounded by the lag between
//! the streams rather than by their size.

use std::collections::VecDeque;

/// Which stream the buffered bytes belong to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Original,
    Reencoded,
}

/// Incremental comparator for two byte streams
#[derive(Debug)]
pub struct StreamComparator {
    /// Bytes seen on the leading side but not yet on the other
    pending: VecDeque<u8>,
    lead: Side,
    diverged: bool,
    max_lag: usize,
    matched: u64,
}

impl StreamComparator {
    /// Create a comparator that gives up (diverges) once one side runs more
    /// than `max_lag` bytes ahead of the other
    pub fn new(max_lag: usize) -> Self {
        Self {
            pending: VecDeque::new(),
            lead: Side::Original,
            diverged: false,
            max_lag,
            matched: 0,
        }
    }

    /// Feed bytes consumed from the original compressed source
    pub fn push_original(&mut self, bytes: &[u8]) {
        self.push(Side::Original, bytes);
    }

    /// Feed bytes produced by the re-encoder
    pub fn push_reencoded(&mut self, bytes: &[u8]) {
        self.push(Side::Reencoded, bytes);
    }

    fn push(&mut self, side: Side, mut bytes: &[u8]) {
        if self.diverged || bytes.is_empty() {
            return;
        }

        if self.lead != side {
            while let Some((&actual, rest)) = bytes.split_first() {
                let Some(expected) = self.pending.pop_front() else {
                    break;
                };
                if expected != actual {
                    self.diverge();
                    return;
                }
                self.matched += 1;
                bytes = rest;
            }
            if bytes.is_empty() {
                return;
            }
        }

        // Either this side already leads, or the other side was fully matched
        self.lead = side;
        self.pending.extend(bytes);
        if self.pending.len() > self.max_lag {
            self.diverge();
        }
    }

    fn diverge(&mut self) {
        self.diverged = true;
        self.pending = VecDeque::new();
    }

    /// True once a mismatch was seen; latched for the comparator's lifetime
    pub fn has_diverged(&self) -> bool {
        self.diverged
    }

    /// Number of bytes confirmed identical on both sides
    pub fn matched(&self) -> u64 {
        self.matched
    }

    /// Final answer once both streams are complete: identical content and
    /// identical length
    pub fn is_identical(&self) -> bool {
        !self.diverged && self.pending.is_empty()
    }
}
