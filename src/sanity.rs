// Copyright 2025 N. Dornseif
//
// Dual-licensed under Apache 2.0 and MIT terms.

//! Implementation self-checks for a hash under test.
//!
//! Verification pins the implementation to a known 32-bit fingerprint;
//! sanity checks for the classic implementation bugs: writing past the
//! declared output width, reading outside the key, nondeterminism, and
//! alignment dependence.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::context::Context;
use crate::hashes::{Endianness, HashInfo, SeedMode};
use crate::strings::{FAIL_BANNER, PASS_STR, SKIP_STR};

//-----------------------------------------------------------------------------
// Verification value

/// Fingerprint a hash implementation: hash the keys {}, {0}, {0,1},
/// ... {0..254} with seed 256-i into a table, hash the whole table
/// with seed 0, and take the first four output bytes little-endian.
pub fn verification_value(ctx: &Context, info: &HashInfo) -> u32 {
    let hashbytes = (info.bits / 8) as usize;
    let mut key = [0u8; 256];
    let mut hashes = vec![0u8; hashbytes * 256];
    let mut total = vec![0u8; hashbytes];

    for i in 0..256usize {
        let seed = info.seed(256 - i as u64, SeedMode::Forced);
        (info.hashfn)(&key[..i], seed, &mut hashes[i * hashbytes..(i + 1) * hashbytes]);
        ctx.vcode_input(&key[..i]);
        key[i] = i as u8;
    }

    let seed = info.seed(0, SeedMode::Forced);
    (info.hashfn)(&hashes, seed, &mut total);
    ctx.vcode_output(&hashes);
    ctx.vcode_output(&total);

    let verification =
        u32::from_le_bytes([total[0], total[1], total[2], total[3]]);
    ctx.vcode_result_u32(verification);
    verification
}

/// Compare the computed verification value against the registered one.
/// A registered value of 0 means the hash has never been fingerprinted
/// for this endianness; that reports SKIP and does not fail.
pub fn verify_hash(ctx: &Context, info: &HashInfo, endian: Endianness) -> bool {
    let expected = info.expected_verification(endian);
    let actual = verification_value(ctx, info);

    let pass = if expected == 0 {
        println!(
            "{:18} - Verification value 0x{:08X} ....... {} (unverified)",
            info.name, actual, SKIP_STR
        );
        true
    } else if expected == actual {
        println!(
            "{:18} - Verification value 0x{:08X} ....... {}",
            info.name, actual, PASS_STR
        );
        true
    } else {
        println!(
            "{:18} - Verification value 0x{:08X} ....... FAIL! (expected 0x{:08X})",
            info.name, actual, expected
        );
        false
    };

    ctx.record_test_result(pass, "Verify", "");
    pass
}

//-----------------------------------------------------------------------------
// Sanity checks

fn verify_sentinel(buf: &[u8], sentinel: u8) -> bool {
    for (i, &b) in buf.iter().enumerate() {
        if b != sentinel {
            print!(" byte {}: 0x{:02X} != 0x{:02X}:", i, b, sentinel);
            return false;
        }
    }
    true
}

fn flipbit_buf(buf: &mut [u8], bit: usize) {
    buf[bit >> 3] ^= 1 << (bit & 7);
}

// These sentinels MUST be different values, so that an output byte the
// hash never writes shows up as "unchanged" in both passes.
const SENTINEL1: u8 = 0x5c;
const SENTINEL2: u8 = 0x36;

/// Check 1: the hash writes exactly bits/8 bytes, writes all of them,
/// never alters its input, and is deterministic.
fn sanity_check_output(info: &HashInfo, r: &mut StdRng, reps: usize, keymax: usize) -> bool {
    let hashbytes = (info.bits / 8) as usize;
    let buflen = keymax + 16 * 3;
    let seed = info.seed(0, SeedMode::AllowFix);

    let mut buffer1 = vec![0u8; buflen];
    let mut buffer2 = vec![0u8; buflen];
    let mut hash1 = vec![SENTINEL1; buflen];
    let mut hash2 = vec![SENTINEL2; buflen];

    print!("Running sanity check 1      ");
    for irep in 0..reps {
        crate::utils::progressdots(irep, 0, reps.saturating_sub(1), 10);

        for len in 0..=keymax {
            r.fill(&mut buffer1[..]);
            buffer2.copy_from_slice(&buffer1);

            // The whole padded buffer goes to the hash, so a write
            // past the declared width lands on a sentinel instead of
            // out of bounds.
            (info.hashfn)(&buffer1[..len], seed, &mut hash1);

            if buffer1 != buffer2 {
                print!(" hash altered input buffer:");
                return false;
            }
            if !verify_sentinel(&hash1[hashbytes..], SENTINEL1) {
                print!(" hash overflowed output buffer (pass 1):");
                return false;
            }

            (info.hashfn)(&buffer1[..len], seed, &mut hash2);
            if !verify_sentinel(&hash2[hashbytes..], SENTINEL2) {
                print!(" hash overflowed output buffer (pass 2):");
                return false;
            }

            if hash1[..hashbytes] != hash2[..hashbytes] {
                for i in 0..hashbytes {
                    if hash1[i] == hash2[i] {
                        continue;
                    }
                    if hash1[i] == SENTINEL1 && hash2[i] == SENTINEL2 {
                        print!(" output byte {} unchanged:", i);
                    } else {
                        print!(
                            " output byte {} inconsistent (0x{:02X} != 0x{:02X}):",
                            i, hash1[i], hash2[i]
                        );
                    }
                    return false;
                }
            }
        }
    }
    println!(" {}", PASS_STR);
    true
}

/// Check 2: flipping any key bit changes the output, flipping it back
/// restores it, bytes outside the key do not matter, and neither does
/// the key's alignment in memory.
fn sanity_check_bits(info: &HashInfo, r: &mut StdRng, reps: usize, keymax: usize) -> bool {
    let hashbytes = (info.bits / 8) as usize;
    let pad = 16usize;
    let buflen = keymax + pad * 3;
    let seed = info.seed(0, SeedMode::AllowFix);

    let mut buffer1 = vec![0u8; buflen];
    let mut buffer2 = vec![0u8; buflen];
    let mut hash3 = vec![0u8; hashbytes];
    let mut hash4 = vec![0u8; hashbytes];

    print!("Running sanity check 2      ");
    for irep in 0..reps {
        crate::utils::progressdots(irep, 0, reps.saturating_sub(1), 10);

        for len in 4..=keymax {
            for offset in pad..pad * 2 {
                r.fill(&mut buffer1[..]);
                r.fill(&mut buffer2[..]);
                let (key1_start, key2_start) = (pad, pad + offset);
                buffer2[key2_start..key2_start + len]
                    .copy_from_slice(&buffer1[key1_start..key1_start + len]);

                (info.hashfn)(&buffer1[key1_start..key1_start + len], seed, &mut hash3);

                for bit in 0..len * 8 {
                    flipbit_buf(&mut buffer2[key2_start..key2_start + len], bit);
                    (info.hashfn)(&buffer2[key2_start..key2_start + len], seed, &mut hash4);
                    if hash3 == hash4 {
                        print!(" flipped bit {}, got identical output:", bit);
                        return false;
                    }

                    flipbit_buf(&mut buffer2[key2_start..key2_start + len], bit);
                    (info.hashfn)(&buffer2[key2_start..key2_start + len], seed, &mut hash4);
                    if hash3 != hash4 {
                        print!(" flipped bit {} twice, got different output:", bit);
                        return false;
                    }
                }

                // Scribble over everything that is not a key byte; the
                // output must not move.
                for i in 0..buflen {
                    if (key2_start..key2_start + len).contains(&i) {
                        continue;
                    }
                    buffer2[i] ^= 0x55;
                }
                (info.hashfn)(&buffer2[key2_start..key2_start + len], seed, &mut hash4);
                if hash3 != hash4 {
                    print!(" changing bytes outside the key changed the output:");
                    return false;
                }
            }
        }
    }
    println!(" {}", PASS_STR);
    true
}

/// Run both sanity checks with the standard sizes.
pub fn sanity_test(ctx: &Context, info: &HashInfo) -> bool {
    sanity_test_sized(ctx, info, 10, 256, 2, 48)
}

/// Sized variant: check 1 runs reps1 x keymax1, check 2 runs
/// reps2 x keymax2 (check 2 costs keymax^2 x 8 hash calls per rep, so
/// it gets smaller numbers).
pub fn sanity_test_sized(ctx: &Context, info: &HashInfo, reps1: usize, keymax1: usize,
    reps2: usize, keymax2: usize) -> bool {
    println!("[[[ Sanity Tests ]]]");
    println!();

    let mut r = StdRng::seed_from_u64(ctx.rand_seed ^ 0x0088_3743);
    let mut result = true;

    result &= sanity_check_output(info, &mut r, reps1, keymax1);
    if result {
        result &= sanity_check_bits(info, &mut r, reps2, keymax2);
    }

    if !result {
        println!(" {}", FAIL_BANNER);
    }
    println!();
    ctx.record_test_result(result, "Sanity", "");
    ctx.vcode_result_u32(result as u32);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hashes::{find_hash, HashFn, HashInfo};
    use crate::report::ReportFlags;

    fn ctx() -> Context {
        Context::new(0, 0, 1, ReportFlags::QUIET, false, false)
    }

    fn test_info(bits: u32, hashfn: HashFn) -> HashInfo {
        HashInfo {
            name: "test",
            desc: "",
            bits,
            verification_le: 0,
            verification_be: 0,
            hashfn,
            seedfix: None,
        }
    }

    #[test]
    fn verification_of_identity_style_hash_is_stable() {
        // seed ^ (len << 16), truncated to 32 bits.
        fn identity32(key: &[u8], seed: u64, out: &mut [u8]) {
            let v = (seed as u32) ^ ((key.len() as u32) << 16);
            out[..4].copy_from_slice(&v.to_le_bytes());
        }
        let info = test_info(32, identity32);
        let c = ctx();
        let v1 = verification_value(&c, &info);
        let v2 = verification_value(&c, &info);
        assert_eq!(v1, v2);
        // Final pass hashes the 1024-byte table with seed 0, so the
        // identity hash emits (1024 << 16) little-endian.
        assert_eq!(v1, 0x0400_0000);
    }

    #[test]
    fn xxh3_verification_matches_registry() {
        // The registered fingerprint comes from the reference
        // implementation; reproducing it pins this harness's recipe
        // bit-for-bit.
        let c = ctx();
        let info = find_hash("xxh3-64").expect("registered");
        assert_eq!(verification_value(&c, info), 0x39CD_9E4A);
    }

    #[test]
    fn verification_differs_between_hashes() {
        let c = ctx();
        let a = verification_value(&c, find_hash("xxh64").expect("registered"));
        let b = verification_value(&c, find_hash("fnv1a-64").expect("registered"));
        assert_ne!(a, b);
    }

    #[test]
    fn sanity_passes_real_hash() {
        let c = ctx();
        let info = find_hash("xxh3-64").expect("registered");
        assert!(sanity_test_sized(&c, info, 2, 64, 1, 16));
    }

    #[test]
    fn sanity_catches_overwrite() {
        // Claims 32 bits but writes 5 bytes.
        fn overwriter(key: &[u8], seed: u64, out: &mut [u8]) {
            let v = xxhash_rust::xxh32::xxh32(key, seed as u32);
            out[..4].copy_from_slice(&v.to_le_bytes());
            out[4] = 0xEE;
        }
        let c = ctx();
        let info = test_info(32, overwriter);
        assert!(!sanity_test_sized(&c, &info, 1, 16, 1, 8));
    }

    #[test]
    fn sanity_catches_nondeterminism() {
        use std::sync::atomic::{AtomicU32, Ordering};
        static COUNTER: AtomicU32 = AtomicU32::new(0);
        fn wobbly(_key: &[u8], _seed: u64, out: &mut [u8]) {
            let v = COUNTER.fetch_add(1, Ordering::Relaxed);
            out[..4].copy_from_slice(&v.to_le_bytes());
        }
        let c = ctx();
        let info = test_info(32, wobbly);
        assert!(!sanity_test_sized(&c, &info, 1, 16, 1, 8));
    }

    #[test]
    fn sanity_catches_ignored_bits() {
        // Drops the last key byte: flipping its bits changes nothing.
        fn lossy(key: &[u8], seed: u64, out: &mut [u8]) {
            let trimmed = if key.is_empty() { key } else { &key[..key.len() - 1] };
            let v = xxhash_rust::xxh32::xxh32(trimmed, seed as u32);
            out[..4].copy_from_slice(&v.to_le_bytes());
        }
        let c = ctx();
        let info = test_info(32, lossy);
        assert!(!sanity_test_sized(&c, &info, 1, 16, 1, 8));
    }
}
