// Copyright 2025 N. Dornseif
//
// Dual-licensed under Apache 2.0 and MIT terms.

//! Verification-code side channel.
//!
//! Three write-only digest streams (test inputs, hash outputs, test
//! results) let two runs on different platforms be compared for
//! bit-exact agreement without keeping any of the data around.
//! Identical test runs produce identical VCodes; nothing more is
//! promised about the encoding.

use xxhash_rust::xxh3::Xxh3;

const STREAM_COUNT: usize = 3;

pub struct VCode {
    enabled: bool,
    streams: [Xxh3; STREAM_COUNT],
}

#[derive(Copy, Clone)]
pub enum Stream {
    Input = 0,
    Output = 1,
    Result = 2,
}

impl VCode {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            // Each stream is seeded with its own index so they stay
            // distinguishable even over identical byte sequences.
            streams: [
                Xxh3::with_seed(0),
                Xxh3::with_seed(1),
                Xxh3::with_seed(2),
            ],
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn add(&mut self, stream: Stream, data: &[u8]) {
        if self.enabled {
            self.streams[stream as usize].update(data);
        }
    }

    pub fn add_u64(&mut self, stream: Stream, data: u64) {
        self.add(stream, &data.to_le_bytes());
    }

    pub fn add_u32(&mut self, stream: Stream, data: u32) {
        self.add(stream, &data.to_le_bytes());
    }

    /// Fold the low 32 bits of all three stream digests into one
    /// overall 32-bit VCode.
    pub fn overall(&self) -> u32 {
        let mut fold = Xxh3::with_seed(STREAM_COUNT as u64);
        for s in &self.streams {
            fold.update(&((s.digest() as u32).to_le_bytes()));
        }
        fold.digest() as u32
    }

    /// The per-stream digests, low 32 bits each, for display.
    pub fn stream_codes(&self) -> [u32; STREAM_COUNT] {
        [
            self.streams[0].digest() as u32,
            self.streams[1].digest() as u32,
            self.streams[2].digest() as u32,
        ]
    }
}
