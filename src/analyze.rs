// Copyright 2025 N. Dornseif
//
// Dual-licensed under Apache 2.0 and MIT terms.

//! Statistical analysis of a list of hash values.
//!
//! test_hash_list() compares a hash list against what an idealized
//! random oracle would produce: collision counts over the full width
//! and over truncated high/low bit windows, fullest-bucket counts for
//! narrow windows, window-value distributions, and the same battery
//! again over XOR deltas of successive hashes.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::blob::{Blob, HashIdx};
use crate::blobsort::{blobsort, blobsort_indexed};
use crate::context::Context;
use crate::report::{self, DistVerdict, ReportFlags};
use crate::stats;

/// Which analyses test_hash_list runs.
#[derive(Clone)]
pub struct TestOpts {
    pub test_collisions: bool,
    pub test_max_collisions: bool,
    pub test_distribution: bool,
    pub test_high_bits: bool,
    pub test_low_bits: bool,
    /// 0 = off, 1 = successive deltas, k >= 2 = successive plus k-back.
    pub test_deltas: u32,
    pub flags: ReportFlags,
}

impl Default for TestOpts {
    fn default() -> Self {
        Self {
            test_collisions: true,
            test_max_collisions: false,
            test_distribution: true,
            test_high_bits: true,
            test_low_bits: true,
            test_deltas: 0,
            flags: ReportFlags::empty(),
        }
    }
}

#[derive(Copy, Clone, Debug)]
pub struct ListVerdict {
    pub pass: bool,
    pub log2p_sum: i32,
}

//-----------------------------------------------------------------------------
// Collision scanning

/// Sort the list and count adjacent equal pairs. Each value occurring
/// c times contributes c-1. With 'sample' set, up to max_collisions
/// colliding values are kept with their multiplicities for diagnostics.
pub fn find_collisions<const LEN: usize>(hashes: &mut [Blob<LEN>],
    collisions: &mut BTreeMap<Blob<LEN>, u32>, max_collisions: usize, sample: bool) -> u32 {
    blobsort(hashes);

    let mut collcount = 0u32;
    for i in 1..hashes.len() {
        if hashes[i] == hashes[i - 1] {
            collcount += 1;
            if sample && (collcount as usize) < max_collisions {
                *collisions.entry(hashes[i]).or_insert(1) += 1;
            }
        }
    }
    collcount
}

/// find_collisions with an index vector threaded through the sort, so
/// colliding hashes can be traced back to the keys that made them.
pub fn find_collisions_indexed<const LEN: usize>(hashes: &mut [Blob<LEN>],
    idxs: &mut [HashIdx], collisions: &mut BTreeMap<Blob<LEN>, Vec<HashIdx>>,
    max_per_collision: usize) -> u32 {
    blobsort_indexed(hashes, idxs);

    let mut collcount = 0u32;
    for i in 1..hashes.len() {
        if hashes[i] == hashes[i - 1] {
            collcount += 1;
            let entry = collisions.entry(hashes[i]).or_default();
            if entry.is_empty() {
                entry.push(idxs[i - 1]);
            }
            if entry.len() <= max_per_collision {
                entry.push(idxs[i]);
            }
        }
    }
    collcount
}

/// Tally collision counts for every bit window in [min_bits, max_bits]
/// over the high bits of a sorted hash list, in one linear pass: the
/// number of leading zero bits of the XOR of an adjacent pair says
/// which window widths that pair collides in, and a collision for N
/// bits is also one for every width below N.
///
/// With thresh_bits > 0, widths in [min_bits, thresh_bits] instead
/// record the peak number of collisions in any single bucket, found by
/// closing off the current run at each non-collision.
fn count_ranged_collisions<const LEN: usize>(hashes: &[Blob<LEN>], min_bits: u32, max_bits: u32,
    thresh_bits: u32, collcounts: &mut [u32]) {
    debug_assert!(min_bits >= 1);
    debug_assert!(min_bits <= max_bits);
    debug_assert!((LEN * 8) as u32 >= max_bits);
    debug_assert!(thresh_bits == 0 || (thresh_bits >= min_bits && thresh_bits <= max_bits));

    let collbins = (max_bits - min_bits + 1) as usize;
    let maxcollbins = if thresh_bits > 0 {
        (thresh_bits - min_bits + 1) as usize
    } else {
        0
    };
    debug_assert_eq!(collcounts.len(), collbins);

    collcounts.iter_mut().for_each(|c| *c = 0);
    let mut prevcoll = vec![0u32; maxcollbins];
    let mut maxcoll = vec![0u32; maxcollbins];

    for hnb in 1..hashes.len() {
        let hdiff = hashes[hnb - 1] ^ hashes[hnb];
        let mut hzb = hdiff.highzerobits();
        if hzb >= min_bits {
            if hzb > max_bits {
                hzb = max_bits;
            }
            collcounts[(hzb - min_bits) as usize] += 1;
        }
        if maxcollbins == 0 || hzb >= thresh_bits {
            continue;
        }

        // This pair is a non-collision for every window wider than hzb
        // bits. For those windows, close the current per-bucket run and
        // keep it if it is the new peak.
        if hzb < min_bits.saturating_sub(1) {
            hzb = min_bits - 1;
        }
        let lower: i64 = if hzb >= min_bits {
            (hzb - min_bits) as i64
        } else {
            -1
        };
        let mut coll = 0u32;
        for i in (maxcollbins..collbins).rev() {
            coll += collcounts[i];
        }
        for i in (0..maxcollbins).rev() {
            if (i as i64) <= lower {
                break;
            }
            coll += collcounts[i];
            maxcoll[i] = maxcoll[i].max(coll - prevcoll[i]);
            prevcoll[i] = coll;
        }
    }

    // Per-width tallies become cumulative counts.
    for i in (0..collbins.saturating_sub(1)).rev() {
        collcounts[i] += collcounts[i + 1];
    }
    // The last run of each max-tracked width never hit a closing
    // non-collision, so account for it here.
    for i in 0..maxcollbins {
        collcounts[i] = maxcoll[i].max(collcounts[i] - prevcoll[i]);
    }
}

//-----------------------------------------------------------------------------
// Window width selection

/// Widest window testable for distribution uniformity: at least 5 keys
/// per bin are needed to chase biases down to 1%, and 24 bits is the
/// cap. 0 means too few keys to test at all.
pub fn max_dist_bits(nb_h: u64) -> u32 {
    if nb_h < 5 * 8 {
        return 0;
    }
    let mut maxwidth = 24;
    while nb_h < (5u64 << maxwidth) {
        maxwidth -= 1;
    }
    maxwidth
}

/// Widest hash size whose expected collision count exceeds
/// min_collisions, scanning down from maxbits.
fn find_max_bits_target_collision_nb(nb_hashes: u64, min_collisions: u32, maxbits: u32) -> u32 {
    let mut nb = maxbits;
    while nb > 2 {
        if stats::estimate_nb_collisions(nb_hashes, nb) > min_collisions as f64 {
            return nb;
        }
        nb -= 1;
    }
    nb
}

/// Reduce the candidate width set to the bounds the counting pass
/// needs: lowest and highest in-range width, and the threshold below
/// which fullest-bucket tracking replaces collision sums.
fn compute_coll_bit_bounds(widths: &BTreeSet<u32>, orig_bits: u32, nb_h: u64) -> (u32, u32, u32) {
    let nlogn_bits = stats::nlogn_bound(nb_h);
    let mut min_bits = orig_bits + 1;
    let mut max_bits = 0u32;
    let mut thresh_bits = 0u32;

    for &nb in widths {
        if nb >= orig_bits {
            continue;
        }
        if nb < nlogn_bits {
            thresh_bits = thresh_bits.max(nb);
        }
        max_bits = max_bits.max(nb);
        min_bits = min_bits.min(nb);
    }
    (min_bits, max_bits, thresh_bits)
}

//-----------------------------------------------------------------------------
// Distribution analysis

/// Tally and score every window width for a batch of start bits.
/// Start bits are claimed through the shared counter; bins are
/// private, and finished rows go back under the scores mutex.
///
/// The tally does random writes across the bins, so 8-bit counters
/// keep much more of the histogram in cache. Bins are sized for an
/// average occupancy of 5..10, so initial counts almost always fit a
/// byte; a hash bad enough to overflow one gets retallied into 32-bit
/// bins (or upgraded mid-fold when the overflow happens there).
fn test_distribution_batch<const LEN: usize>(hashes: &[Blob<LEN>], istartbit: &AtomicUsize,
    batch_size: usize, maxwidth: u32, minwidth: u32, scores: &Mutex<Vec<f64>>) -> usize {
    let hashbits = LEN * 8;
    let widths = (maxwidth - minwidth + 1) as usize;
    let nb_h = hashes.len() as u64;
    let mut bins8 = vec![0u8; 1usize << maxwidth];
    let mut bins32: Vec<u32> = Vec::new();
    let mut testcount = 0usize;
    let mut row = vec![0.0f64; widths];

    loop {
        let startbit = istartbit.fetch_add(batch_size, Ordering::Relaxed);
        if startbit >= hashbits {
            break;
        }
        let stopbit = (startbit + batch_size).min(hashbits);

        for start in startbit..stopbit {
            let mut width = maxwidth;
            let mut bincount = 1usize << width;
            let mut bigbins = false;

            bins8[..bincount].iter_mut().for_each(|b| *b = 0);
            for h in hashes.iter() {
                let index = h.window(start, width as usize) as usize;
                bins8[index] = bins8[index].wrapping_add(1);
                if bins8[index] == 0 {
                    bigbins = true;
                    break;
                }
            }
            if bigbins {
                tracing::debug!(start, width, "bin overflow during tally, using 32-bit bins");
                bins32.clear();
                bins32.resize(bincount, 0);
                for h in hashes.iter() {
                    bins32[h.window(start, width as usize) as usize] += 1;
                }
            }

            // Score at the full width, then fold the bins in half and
            // rescore, down to minwidth.
            for slot in row.iter_mut() {
                let sumsq = if bigbins {
                    stats::sum_squares_u32(&bins32[..bincount])
                } else {
                    stats::sum_squares_u8(&bins8[..bincount])
                };
                *slot = stats::calc_score(sumsq, bincount, nb_h);
                testcount += 1;

                if width == minwidth {
                    break;
                }
                width -= 1;
                bincount /= 2;

                if bigbins {
                    for i in 0..bincount {
                        bins32[i] += bins32[i + bincount];
                    }
                } else {
                    let mut overflowed = false;
                    for i in 0..bincount {
                        let b = bins8[i + bincount];
                        let a = bins8[i].wrapping_add(b);
                        bins8[i] = a;
                        overflowed |= a < b;
                    }
                    if overflowed {
                        // Undo the possibly-wrapped additions while
                        // widening into 32-bit bins.
                        tracing::debug!(start, width, "bin overflow during fold");
                        bigbins = true;
                        bins32.clear();
                        bins32.resize(bincount, 0);
                        for i in 0..bincount {
                            let b = bins8[i + bincount];
                            let a = bins8[i].wrapping_sub(b);
                            bins32[i] = a as u32 + b as u32;
                        }
                    }
                }
            }

            let mut all = match scores.lock() {
                Ok(g) => g,
                Err(poisoned) => poisoned.into_inner(),
            };
            all[start * widths..(start + 1) * widths].copy_from_slice(&row);
        }
    }
    testcount
}

/// Measure how uniformly every N-bit window of the hashes is
/// distributed, N from 8 up to at most 24.
pub fn test_distribution<const LEN: usize>(ctx: &Context, hashes: &[Blob<LEN>],
    flags: ReportFlags) -> DistVerdict {
    let hashbits = LEN * 8;
    let nb_h = hashes.len() as u64;
    let maxwidth = max_dist_bits(nb_h);
    let minwidth = 8u32;

    if maxwidth < minwidth {
        return DistVerdict { pass: true, log2p: 0, worst_start: -1, worst_width: -1 };
    }

    if !flags.contains(ReportFlags::QUIET) {
        print!(
            "Testing distribution   (any  {:2}..{:2} bits){}",
            minwidth,
            maxwidth,
            if flags.contains(ReportFlags::DIAGRAMS) { "\n" } else { " - " }
        );
    }

    let widths = (maxwidth - minwidth + 1) as usize;
    let scores = Mutex::new(vec![0.0f64; hashbits * widths]);
    let istartbit = AtomicUsize::new(0);

    let tests = if ctx.ncpu == 1 {
        test_distribution_batch(hashes, &istartbit, hashbits, maxwidth, minwidth, &scores)
    } else {
        std::thread::scope(|s| {
            let handles: Vec<_> = (0..ctx.ncpu)
                .map(|_| {
                    s.spawn(|| {
                        test_distribution_batch(
                            hashes,
                            &istartbit,
                            (hashbits / 16).max(1),
                            maxwidth,
                            minwidth,
                            &scores,
                        )
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap_or(0)).sum()
        })
    };

    let scores = match scores.into_inner() {
        Ok(v) => v,
        Err(poisoned) => poisoned.into_inner(),
    };
    let verdict =
        report::report_distribution(ctx, &scores, tests, hashbits, maxwidth, minwidth, flags);
    if !verdict.pass && flags.contains(ReportFlags::DIAGRAMS) && verdict.worst_start >= 0 {
        report::show_outliers(hashes, verdict.worst_start as usize,
            verdict.worst_width as usize, 16);
    }
    verdict
}

//-----------------------------------------------------------------------------
// Hash list entry point

/// Run the configured analyses over a hash list. The list is consumed
/// in the sense that it gets sorted and bit-reversed along the way.
pub fn test_hash_list<const LEN: usize>(ctx: &Context, hashes: &mut Vec<Blob<LEN>>,
    opts: &TestOpts) -> ListVerdict {
    let nb_h = hashes.len() as u64;
    let hashbits = (LEN * 8) as u32;
    let flags = opts.flags;
    let quiet = flags.contains(ReportFlags::QUIET);
    let mut result = true;
    let mut log2p_sum = 0i32;

    // Deltas come off the list in generation order, before sorting
    // destroys it.
    let mut deltas_1: Vec<Blob<LEN>> = Vec::new();
    let mut deltas_n: Vec<Blob<LEN>> = Vec::new();
    if opts.test_deltas >= 1 && hashes.len() > opts.test_deltas as usize {
        deltas_1.reserve(hashes.len() - 1);
        let mut hprv = hashes[0];
        for &h in hashes.iter().skip(1) {
            deltas_1.push(h ^ hprv);
            hprv = h;
        }
        if opts.test_deltas >= 2 {
            let k = opts.test_deltas as usize;
            deltas_n.reserve(hashes.len() - k);
            for i in k..hashes.len() {
                deltas_n.push(hashes[i] ^ hashes[i - k]);
            }
        }
    }

    if opts.test_collisions {
        if !quiet {
            print!("Testing all collisions (     {:3}-bit)", hashbits);
        }

        for chunk in hashes.chunks(1024) {
            let mut buf = Vec::with_capacity(chunk.len() * LEN);
            for h in chunk {
                buf.extend_from_slice(h.as_bytes());
            }
            ctx.vcode_output(&buf);
        }

        let mut collisions: BTreeMap<Blob<LEN>, u32> = BTreeMap::new();
        let sample = flags.contains(ReportFlags::DIAGRAMS);
        let collcount = find_collisions(hashes, &mut collisions, 1000, sample);
        ctx.vcode_result_u32(collcount);

        // Explicitly reported widths: the common real-world hash table
        // sizes below this hash's width, the saturated small tables
        // when tracking fullest buckets, and the width where about 100
        // collisions are expected.
        let mut nb_bits_vec: BTreeSet<u32> = [224u32, 160, 128, 64, 32].into_iter().collect();
        if opts.test_max_collisions {
            nb_bits_vec.insert(12);
            nb_bits_vec.insert(8);
        }
        if opts.test_high_bits || opts.test_low_bits {
            let hundred_coll_bits = find_max_bits_target_collision_nb(nb_h, 100, hashbits);
            if stats::estimate_nb_collisions(nb_h, hundred_coll_bits) >= 100.0 {
                nb_bits_vec.insert(hundred_coll_bits);
            }
        }

        // Swept widths: everything above the n*log(n) bound with a
        // reasonable expected collision count is cheap to analyze in
        // the same pass. Widths the distribution test will cover are
        // left to it.
        let nlogn_bits = stats::nlogn_bound(nb_h);
        let min_t_bits = if opts.test_distribution {
            (max_dist_bits(nb_h) + 1).max(nlogn_bits)
        } else {
            nlogn_bits
        };
        let max_t_bits = find_max_bits_target_collision_nb(nb_h, 10, hashbits - 1);

        let mut test_bits_vec: BTreeSet<u32> = BTreeSet::new();
        if (opts.test_high_bits || opts.test_low_bits) && min_t_bits <= max_t_bits {
            test_bits_vec.extend(min_t_bits..=max_t_bits);
        }

        let mut collcounts_fwd: Vec<u32> = Vec::new();
        let mut collcounts_rev: Vec<u32> = Vec::new();
        let (mut min_bits, mut max_bits, mut thresh_bits) = (0u32, 0u32, 0u32);

        if opts.test_high_bits || opts.test_low_bits {
            let mut combined = nb_bits_vec.clone();
            combined.extend(test_bits_vec.iter().copied());
            let bounds = compute_coll_bit_bounds(&combined, hashbits, nb_h);
            min_bits = bounds.0;
            max_bits = bounds.1;
            thresh_bits = bounds.2;

            if opts.test_high_bits && max_bits > 0 {
                collcounts_fwd = vec![0u32; (max_bits - min_bits + 1) as usize];
                count_ranged_collisions(hashes, min_bits, max_bits, thresh_bits,
                    &mut collcounts_fwd);
            }
            if opts.test_low_bits && max_bits > 0 {
                collcounts_rev = vec![0u32; (max_bits - min_bits + 1) as usize];
                for h in hashes.iter_mut() {
                    h.reversebits();
                }
                blobsort(hashes.as_mut_slice());
                count_ranged_collisions(hashes, min_bits, max_bits, thresh_bits,
                    &mut collcounts_rev);
                for h in hashes.iter_mut() {
                    h.reversebits();
                }
                // No re-sort; the distribution test is order-blind.
            }

            if !collcounts_fwd.is_empty() {
                ctx.vcode_result_u32s(&collcounts_fwd);
            }
            if !collcounts_rev.is_empty() {
                ctx.vcode_result_u32s(&collcounts_rev);
            }
        }

        let v = report::report_collisions(ctx, nb_h, collcount, hashbits, false, false, false,
            flags);
        result &= v.pass;
        log2p_sum += v.log2p;
        if !v.pass && sample {
            report::print_collisions(&collisions, 1000, hashbits as usize, hashbits as usize,
                false);
        }

        if opts.test_high_bits || opts.test_low_bits {
            for &nb_bits in nb_bits_vec.iter().rev() {
                if nb_bits < min_bits || nb_bits > max_bits {
                    continue;
                }
                let maxcoll = opts.test_max_collisions && nb_bits <= thresh_bits;
                if opts.test_high_bits {
                    let v = report::report_collisions(ctx, nb_h,
                        collcounts_fwd[(nb_bits - min_bits) as usize], nb_bits, maxcoll, true,
                        true, flags);
                    result &= v.pass;
                    log2p_sum += v.log2p;
                }
                if opts.test_low_bits {
                    let v = report::report_collisions(ctx, nb_h,
                        collcounts_rev[(nb_bits - min_bits) as usize], nb_bits, maxcoll, false,
                        true, flags);
                    result &= v.pass;
                    log2p_sum += v.log2p;
                }
            }

            let sweep_ok = !test_bits_vec.is_empty() && min_t_bits >= min_bits
                && max_t_bits <= max_bits;
            if opts.test_high_bits && sweep_ok {
                let v = report::report_bits_collisions(ctx, nb_h,
                    &collcounts_fwd[(min_t_bits - min_bits) as usize..], min_t_bits, max_t_bits,
                    true, flags);
                result &= v.pass;
                log2p_sum += v.log2p;
            }
            if opts.test_low_bits && sweep_ok {
                let v = report::report_bits_collisions(ctx, nb_h,
                    &collcounts_rev[(min_t_bits - min_bits) as usize..], min_t_bits, max_t_bits,
                    false, flags);
                result &= v.pass;
                log2p_sum += v.log2p;
            }
        }
    }

    if opts.test_distribution {
        let v = test_distribution(ctx, hashes, flags);
        result &= v.pass;
        log2p_sum += v.log2p;
    }

    // Depth-1 recursion: the deltas get the same battery, but no
    // deltas of deltas.
    if opts.test_deltas >= 1 && !deltas_1.is_empty() {
        if !quiet {
            println!("---Analyzing hash deltas");
        }
        let sub = TestOpts { test_deltas: 0, ..opts.clone() };
        let v = test_hash_list(ctx, &mut deltas_1, &sub);
        result &= v.pass;
        log2p_sum += v.log2p_sum;

        if opts.test_deltas >= 2 && !deltas_n.is_empty() {
            if !quiet {
                println!("---Analyzing additional hash deltas");
            }
            let v = test_hash_list(ctx, &mut deltas_n, &sub);
            result &= v.pass;
            log2p_sum += v.log2p_sum;
        }
    }

    ListVerdict { pass: result, log2p_sum }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob::{Blob32, Blob64};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn ctx(ncpu: usize) -> Context {
        Context::new(0, 0, ncpu, ReportFlags::QUIET, false, false)
    }

    fn quiet_opts() -> TestOpts {
        TestOpts { flags: ReportFlags::QUIET, ..TestOpts::default() }
    }

    #[test]
    fn collision_scan_counts_multiplicities() {
        // 256 distinct single-byte-derived values: no collisions.
        let mut hashes: Vec<Blob32> = (0..=255u64).map(Blob32::from).collect();
        let mut sample = BTreeMap::new();
        assert_eq!(find_collisions(&mut hashes, &mut sample, 1000, false), 0);

        // Two copies of the set: exactly 256 adjacent-equal pairs.
        let mut doubled: Vec<Blob32> = (0..=255u64).chain(0..=255u64).map(Blob32::from).collect();
        assert_eq!(find_collisions(&mut doubled, &mut sample, 1000, false), 256);
    }

    #[test]
    fn collision_scan_equals_sum_of_multiplicities() {
        let mut r = StdRng::seed_from_u64(991);
        let mut hashes: Vec<Blob64> = Vec::new();
        let mut expected = 0u32;
        for _ in 0..500 {
            let v = Blob64::from(r.random::<u64>() & 0xffff);
            let c = 1 + r.random_range(0..4);
            hashes.extend(std::iter::repeat(v).take(c));
        }
        // Count true multiplicities independently.
        let mut byval: BTreeMap<Blob64, u32> = BTreeMap::new();
        for h in &hashes {
            *byval.entry(*h).or_insert(0) += 1;
        }
        for &c in byval.values() {
            expected += c - 1;
        }

        let mut sample = BTreeMap::new();
        assert_eq!(find_collisions(&mut hashes, &mut sample, 1000, true), expected);
        // Sampled multiplicities match the true ones.
        for (h, &c) in sample.iter() {
            assert_eq!(c, byval[h], "value {:?}", h);
        }
    }

    #[test]
    fn indexed_scan_reports_source_indices() {
        let mut hashes: Vec<Blob32> =
            [7u64, 3, 7, 9, 3, 7].iter().map(|&v| Blob32::from(v)).collect();
        let mut idxs: Vec<HashIdx> = (0..6).collect();
        let mut colls = BTreeMap::new();
        let n = find_collisions_indexed(&mut hashes, &mut idxs, &mut colls, 10);
        assert_eq!(n, 3); // 7 appears 3x (2 pairs), 3 appears 2x (1 pair)

        let mut three = colls[&Blob32::from(3u64)].clone();
        three.sort_unstable();
        assert_eq!(three, vec![1u32, 4]);
        let seven = &colls[&Blob32::from(7u64)];
        assert_eq!(seven.len(), 3);
        for &i in seven {
            assert!([0u32, 2, 5].contains(&i));
        }
    }

    // Brute-force companion: cumulative per-width collision counts via
    // u32 arithmetic, no highzerobits involved.
    fn brute_counts(sorted: &[Blob32], min_bits: u32, max_bits: u32) -> Vec<u32> {
        let mut counts = vec![0u32; (max_bits - min_bits + 1) as usize];
        for w in min_bits..=max_bits {
            for i in 1..sorted.len() {
                let a = u32::from_le_bytes(*sorted[i - 1].as_bytes());
                let b = u32::from_le_bytes(*sorted[i].as_bytes());
                if (a >> (32 - w)) == (b >> (32 - w)) {
                    counts[(w - min_bits) as usize] += 1;
                }
            }
        }
        counts
    }

    #[test]
    fn ranged_counts_match_brute_force() {
        let mut r = StdRng::seed_from_u64(4242);
        let mut hashes: Vec<Blob32> = (0..20000).map(|_| Blob32::from(r.random::<u32>() as u64))
            .collect();
        blobsort(hashes.as_mut_slice());

        let (min_bits, max_bits) = (8u32, 24u32);
        let mut counts = vec![0u32; (max_bits - min_bits + 1) as usize];
        count_ranged_collisions(&hashes, min_bits, max_bits, 0, &mut counts);
        assert_eq!(counts, brute_counts(&hashes, min_bits, max_bits));
    }

    #[test]
    fn ranged_max_tracking_finds_fullest_bucket() {
        // All hashes share their top 12 bits: every adjacent pair is a
        // 12-bit collision, one single bucket holding everything.
        let n = 3000u64;
        let mut hashes: Vec<Blob32> = (0..n).map(|v| Blob32::from(0xabc0_0000u64 | v)).collect();
        blobsort(hashes.as_mut_slice());

        let (min_bits, max_bits, thresh) = (8u32, 16u32, 12u32);
        let mut counts = vec![0u32; (max_bits - min_bits + 1) as usize];
        count_ranged_collisions(&hashes, min_bits, max_bits, thresh, &mut counts);

        // Widths 8..=12 track the fullest bucket, which holds all n
        // values, meaning n-1 collisions.
        for w in min_bits..=thresh {
            assert_eq!(counts[(w - min_bits) as usize], (n - 1) as u32, "width {}", w);
        }
    }

    #[test]
    fn max_dist_bits_thresholds() {
        assert_eq!(max_dist_bits(39), 0);
        assert_eq!(max_dist_bits(40), 3);
        assert_eq!(max_dist_bits(5 << 10), 10);
        assert_eq!(max_dist_bits(u64::MAX), 24);
    }

    #[test]
    fn distribution_passes_uniform_random() {
        let c = ctx(2);
        let mut r = StdRng::seed_from_u64(0xd157);
        let hashes: Vec<Blob32> = (0..1u64 << 18)
            .map(|_| Blob32::from(r.random::<u32>() as u64))
            .collect();
        let v = test_distribution(&c, &hashes, ReportFlags::QUIET);
        assert!(v.pass);
    }

    #[test]
    fn distribution_scores_unit_variance_under_null() {
        // For uniform random hashes every (startbit, width) score is a
        // standard normal variate.
        let mut r = StdRng::seed_from_u64(0x00b5_e55e);
        let hashes: Vec<Blob32> = (0..1u64 << 16)
            .map(|_| Blob32::from(r.random::<u32>() as u64))
            .collect();
        let maxwidth = max_dist_bits(hashes.len() as u64);
        let widths = (maxwidth - 8 + 1) as usize;
        let scores = Mutex::new(vec![0.0f64; 32 * widths]);
        let istartbit = AtomicUsize::new(0);
        test_distribution_batch(&hashes, &istartbit, 32, maxwidth, 8, &scores);

        let scores = match scores.into_inner() {
            Ok(v) => v,
            Err(p) => p.into_inner(),
        };
        let n = scores.len() as f64;
        let mean = scores.iter().sum::<f64>() / n;
        let var = scores.iter().map(|s| (s - mean) * (s - mean)).sum::<f64>() / n;
        assert!(mean.abs() < 0.4, "mean {}", mean);
        assert!((0.4..2.5).contains(&var), "variance {}", var);
    }

    #[test]
    fn identity_windows_at_bit_zero_are_flat() {
        // Counter values cover every low window exactly evenly, so the
        // score comes out at or below zero (flatter than random) and
        // never reads as a positive bias.
        let hashes: Vec<Blob32> = (0..1u64 << 18).map(Blob32::from).collect();
        for w in [8usize, 12, 15] {
            let mut bins = vec![0u32; 1 << w];
            for h in &hashes {
                bins[h.window(0, w) as usize] += 1;
            }
            let score = stats::calc_score(stats::sum_squares_u32(&bins), 1 << w,
                hashes.len() as u64);
            assert!(score <= 0.0, "w {}: {}", w, score);
        }
    }

    #[test]
    fn distribution_flags_zeroed_low_bits() {
        // Zeroing the low nibble of otherwise-uniform hashes crowds
        // every 16th bin. The worst window must be one that covers all
        // four dead bits (several do, since windows wrap).
        let c = ctx(2);
        let mut r = StdRng::seed_from_u64(0xd158);
        let hashes: Vec<Blob32> = (0..1u64 << 18)
            .map(|_| Blob32::from((r.random::<u32>() & !0xf) as u64))
            .collect();
        let v = test_distribution(&c, &hashes, ReportFlags::QUIET);
        assert!(!v.pass);
        let ws = v.worst_start as usize;
        let ww = v.worst_width as usize;
        for bit in 0..4usize {
            assert!(
                (bit + 32 - ws) % 32 < ww,
                "worst window ({}, {}) misses dead bit {}",
                ws,
                ww,
                bit
            );
        }
    }

    #[test]
    fn hash_list_passes_good_rng() {
        let c = ctx(2);
        let mut r = StdRng::seed_from_u64(0x7e57_11f7);
        let mut hashes: Vec<Blob64> = (0..100_000).map(|_| Blob64::from(r.random::<u64>()))
            .collect();
        let mut opts = quiet_opts();
        opts.test_deltas = 1;
        let v = test_hash_list(&c, &mut hashes, &opts);
        assert!(v.pass);
    }

    #[test]
    fn hash_list_fails_constant_hashes() {
        let c = ctx(1);
        let mut hashes: Vec<Blob64> = vec![Blob64::from(0x1234u64); 50_000];
        let v = test_hash_list(&c, &mut hashes, &quiet_opts());
        assert!(!v.pass);
    }

    #[test]
    fn hash_list_max_collisions_path() {
        let c = ctx(1);
        let mut r = StdRng::seed_from_u64(0xacc01ade);
        let mut hashes: Vec<Blob64> = (0..200_000).map(|_| Blob64::from(r.random::<u64>()))
            .collect();
        let mut opts = quiet_opts();
        opts.test_max_collisions = true;
        let v = test_hash_list(&c, &mut hashes, &opts);
        assert!(v.pass);
    }
}
