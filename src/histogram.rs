// Copyright 2025 N. Dornseif
//
// Dual-licensed under Apache 2.0 and MIT terms.

//! High-throughput tallying of hash bits into counter arrays.
//!
//! The avalanche and bit-independence tests add every bit of millions
//! of XOR digests into per-bit counters. The inner loop has a fixed
//! 8-wide body over each byte so the compiler can vectorize it.

use crate::blob::Blob;

/// Add each bit of 'hash' (0 or 1) to consecutive counters starting at
/// counts[cursor]. Returns the cursor just past the last bit.
pub fn histogram_hash_bits<const LEN: usize>(counts: &mut [u32], cursor: usize,
    hash: &Blob<LEN>) -> usize {
    let mut idx = cursor;
    for &byte in hash.as_bytes().iter() {
        let c = &mut counts[idx..idx + 8];
        for (bit, slot) in c.iter_mut().enumerate() {
            *slot += ((byte >> bit) & 1) as u32;
        }
        idx += 8;
    }
    idx
}

/// Like histogram_hash_bits, but only bits at 'startbit' and above are
/// counted; counts[cursor] corresponds to bit 'startbit'. Counters for
/// the suppressed bits do not exist in the destination, so nothing
/// before the cursor is touched.
pub fn histogram_hash_bits_from<const LEN: usize>(counts: &mut [u32], cursor: usize,
    hash: &Blob<LEN>, startbit: usize) -> usize {
    let mut idx = cursor;
    let first_byte = startbit / 8;
    let mut skip = startbit & 7;
    for &byte in hash.as_bytes()[first_byte..].iter() {
        let mut b = byte >> skip;
        for _ in skip..8 {
            counts[idx] += (b & 1) as u32;
            b >>= 1;
            idx += 1;
        }
        skip = 0;
    }
    idx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob::{Blob64, Blob32};

    #[test]
    fn full_histogram_counts_every_set_bit() {
        let h = Blob64::from(0x8000_0000_0000_0001u64);
        let mut counts = vec![0u32; 64];
        let end = histogram_hash_bits(&mut counts, 0, &h);
        assert_eq!(end, 64);
        assert_eq!(counts[0], 1);
        assert_eq!(counts[63], 1);
        assert_eq!(counts.iter().sum::<u32>(), 2);
    }

    #[test]
    fn histogram_accumulates_over_calls() {
        let h = Blob32::from(0xffff_ffffu64);
        let mut counts = vec![0u32; 32];
        for _ in 0..5 {
            histogram_hash_bits(&mut counts, 0, &h);
        }
        assert!(counts.iter().all(|&c| c == 5));
    }

    #[test]
    fn cursor_offsets_consecutive_tallies() {
        let h = Blob32::from(1u64);
        let mut counts = vec![0u32; 96];
        let mid = histogram_hash_bits(&mut counts, 0, &h);
        let end = histogram_hash_bits(&mut counts, mid, &h);
        assert_eq!((mid, end), (32, 64));
        assert_eq!(counts[0], 1);
        assert_eq!(counts[32], 1);
        assert_eq!(counts[64], 0);
    }

    #[test]
    fn startbit_variant_suppresses_low_bits() {
        let h = Blob64::from(u64::MAX);
        for startbit in [0usize, 1, 7, 8, 9, 40, 63] {
            let nbits = 64 - startbit;
            let mut counts = vec![0u32; nbits];
            let end = histogram_hash_bits_from(&mut counts, 0, &h, startbit);
            assert_eq!(end, nbits, "startbit {}", startbit);
            assert!(counts.iter().all(|&c| c == 1), "startbit {}", startbit);
        }
    }

    #[test]
    fn startbit_variant_matches_getbit() {
        let h = Blob64::from(0x1234_5678_9abc_def1u64);
        let startbit = 13;
        let mut counts = vec![0u32; 64 - startbit];
        histogram_hash_bits_from(&mut counts, 0, &h, startbit);
        for (i, &c) in counts.iter().enumerate() {
            assert_eq!(c, h.getbit(startbit + i), "bit {}", startbit + i);
        }
    }
}
