// Copyright 2025 N. Dornseif
//
// Dual-licensed under Apache 2.0 and MIT terms.

//! In-place unstable sort for hash value lists.
//!
//! Collision scanning needs adjacent-equal hashes, so the analyzers
//! sort every hash list. Three strategies, picked by size and width:
//! insertion sort with a move-min sentinel pass for small slices,
//! out-of-place LSB radix sort for blobs up to 8 bytes, and an
//! in-place MSB radix sort ("American flag") for wider blobs.

use crate::blob::{Blob, HashIdx};

const SMALLSORT_CUTOFF: usize = 1024;
const RADIX_SIZE: usize = 256;

/// Sortable item with little-endian radix byte access. Byte LEVELS-1
/// is the most significant.
pub trait SortKey: Copy {
    const LEVELS: usize;
    fn radix_byte(&self, level: usize) -> u8;
    fn key_lt(&self, other: &Self) -> bool;
}

impl<const LEN: usize> SortKey for Blob<LEN> {
    const LEVELS: usize = LEN;

    fn radix_byte(&self, level: usize) -> u8 {
        self.byte(level)
    }

    fn key_lt(&self, other: &Self) -> bool {
        self < other
    }
}

// Index pairs order by the blob alone, so a threaded index vector
// follows the exact same permutation as the bare hash list.
impl<const LEN: usize> SortKey for (Blob<LEN>, HashIdx) {
    const LEVELS: usize = LEN;

    fn radix_byte(&self, level: usize) -> u8 {
        self.0.byte(level)
    }

    fn key_lt(&self, other: &Self) -> bool {
        self.0 < other.0
    }
}

/// Swap the smallest element of items[lo..hi] to the front, so the
/// insertion loop after it never has to check the lower bound.
fn movemin<T: SortKey>(items: &mut [T], lo: usize, hi: usize) {
    let mut mini = lo;
    for i in lo + 1..hi {
        if items[i].key_lt(&items[mini]) {
            mini = i;
        }
    }
    items.swap(lo, mini);
}

/// Insertion sort on items[lo..hi]. With 'unguarded' the caller
/// guarantees an element no larger than any in the range sits at an
/// index below lo; the j > 0 backstop only exists to keep indexing
/// in-bounds.
fn insertionsort<T: SortKey>(items: &mut [T], lo: usize, hi: usize, unguarded: bool) {
    let bound = if unguarded { 0 } else { lo };
    for i in lo + 1..hi {
        let val = items[i];
        let mut j = i;
        while j > bound && val.key_lt(&items[j - 1]) {
            items[j] = items[j - 1];
            j -= 1;
        }
        items[j] = val;
    }
}

/// Sort entry for small blocks. A guarded call does the sentinel pass
/// itself; unguarded callers already have a smaller element below lo.
fn smallsort<T: SortKey>(items: &mut [T], mut lo: usize, hi: usize, guarded: bool) {
    debug_assert!(hi - lo > 1);
    if guarded {
        movemin(items, lo, hi);
        lo += 1;
    }
    insertionsort(items, lo, hi, true);
}

/// Out-of-place LSB radix sort, 8-bit radix, LEVELS passes. Any pass
/// whose frequency table shows a single byte value is skipped since it
/// would reorder nothing.
fn radixsort<T: SortKey>(items: &mut [T]) {
    let count = items.len();
    let levels = T::LEVELS;

    let mut freqs = vec![[0u32; RADIX_SIZE]; levels];
    for it in items.iter() {
        for (pass, f) in freqs.iter_mut().enumerate() {
            f[it.radix_byte(pass) as usize] += 1;
        }
    }

    let mut buf: Vec<T> = items.to_vec();
    let mut src_is_items = true;

    for (pass, f) in freqs.iter().enumerate() {
        if f.iter().any(|&n| n as usize == count) {
            continue;
        }
        let mut ptrs = [0usize; RADIX_SIZE];
        let mut next = 0usize;
        for (p, &n) in ptrs.iter_mut().zip(f.iter()) {
            *p = next;
            next += n as usize;
        }
        if src_is_items {
            for i in 0..count {
                let v = items[i];
                let b = v.radix_byte(pass) as usize;
                buf[ptrs[b]] = v;
                ptrs[b] += 1;
            }
        } else {
            for i in 0..count {
                let v = buf[i];
                let b = v.radix_byte(pass) as usize;
                items[ptrs[b]] = v;
                ptrs[b] += 1;
            }
        }
        src_is_items = !src_is_items;
    }

    if !src_is_items {
        items.copy_from_slice(&buf);
    }
}

/// In-place MSB radix sort, recursing from byte 'level' downwards.
/// Blocks at or below the small cutoff devolve to smallsort, unguarded
/// whenever the block does not start at the base of the whole slice.
fn flagsort<T: SortKey>(items: &mut [T], lo: usize, hi: usize, level: usize) {
    let count = hi - lo;
    debug_assert!(count > SMALLSORT_CUTOFF);

    let mut freqs = [0u32; RADIX_SIZE];
    for it in &items[lo..hi] {
        freqs[it.radix_byte(level) as usize] += 1;
    }

    // A single-value pass reorders nothing. This mostly hits degenerate
    // hashes (constant output bytes), where insertion sort beats
    // recursing with one fewer level.
    if freqs[items[lo].radix_byte(level) as usize] as usize == count {
        if level != 0 {
            insertionsort(items, lo, hi, lo != 0);
        }
        return;
    }

    let mut block_start = [0usize; RADIX_SIZE];
    let mut block_next = [0usize; RADIX_SIZE];
    let mut acc = lo;
    for v in 0..RADIX_SIZE {
        block_start[v] = acc;
        block_next[v] = acc;
        acc += freqs[v] as usize;
    }

    // Permutation cycle-walk: everything below block v is already home,
    // so each swap sends one misplaced item to its block.
    for v in 0..RADIX_SIZE {
        let end = block_start[v] + freqs[v] as usize;
        while block_next[v] < end {
            let i = block_next[v];
            let b = items[i].radix_byte(level) as usize;
            if b == v {
                block_next[v] += 1;
            } else {
                items.swap(i, block_next[b]);
                block_next[b] += 1;
            }
        }
    }

    if level == 0 {
        return;
    }

    let mut start = lo;
    for &f in freqs.iter() {
        let n = f as usize;
        if n > SMALLSORT_CUTOFF {
            flagsort(items, start, start + n, level - 1);
        } else if n > 1 {
            smallsort(items, start, start + n, start == 0);
        }
        start += n;
    }
}

/// Sort a hash list in place. Unstable; total little-endian integer
/// order.
pub fn blobsort<T: SortKey>(items: &mut [T]) {
    let n = items.len();
    if n <= SMALLSORT_CUTOFF {
        if n > 1 {
            smallsort(items, 0, n, true);
        }
    } else if T::LEVELS > 8 {
        flagsort(items, 0, n, T::LEVELS - 1);
    } else {
        radixsort(items);
    }
}

/// Sort a hash list together with its vector of original indices.
pub fn blobsort_indexed<const LEN: usize>(hashes: &mut [Blob<LEN>], idxs: &mut [HashIdx]) {
    debug_assert_eq!(hashes.len(), idxs.len());
    let mut pairs: Vec<(Blob<LEN>, HashIdx)> = hashes
        .iter()
        .copied()
        .zip(idxs.iter().copied())
        .collect();
    blobsort(&mut pairs);
    for (i, (h, x)) in pairs.into_iter().enumerate() {
        hashes[i] = h;
        idxs[i] = x;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob::{Blob128, Blob160, Blob256, Blob32, Blob64};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const TEST_SIZE: usize = 4096;

    fn rng(testnum: u64) -> StdRng {
        StdRng::seed_from_u64(0xb10b_5047 ^ testnum)
    }

    fn rand_fill<const LEN: usize>(r: &mut StdRng, n: usize) -> Vec<Blob<LEN>> {
        (0..n)
            .map(|_| {
                let mut b = Blob::<LEN>::zero();
                for byte in b.as_bytes_mut().iter_mut() {
                    *byte = r.random();
                }
                b
            })
            .collect()
    }

    fn shuffle<T>(r: &mut StdRng, v: &mut [T]) {
        for i in (1..v.len()).rev() {
            let j = r.random_range(0..=i);
            v.swap(i, j);
        }
    }

    fn check_sort<const LEN: usize>(mut v: Vec<Blob<LEN>>) {
        let mut expect = v.clone();
        expect.sort_unstable();
        blobsort(&mut v);
        assert_eq!(v, expect);
    }

    #[test]
    fn consecutive_sorted_and_backwards() {
        check_sort::<8>((0..TEST_SIZE as u64).map(Blob64::from).collect());
        check_sort::<8>((0..TEST_SIZE as u64).rev().map(Blob64::from).collect());
        check_sort::<16>((0..TEST_SIZE as u64).map(Blob128::from).collect());
        check_sort::<16>((0..TEST_SIZE as u64).rev().map(Blob128::from).collect());
    }

    #[test]
    fn consecutive_scrambled() {
        let mut r = rng(2);
        let mut v: Vec<Blob32> = (0..TEST_SIZE as u64).map(Blob32::from).collect();
        shuffle(&mut r, &mut v);
        check_sort(v);
    }

    #[test]
    fn random_values_all_widths() {
        let mut r = rng(6);
        check_sort::<4>(rand_fill(&mut r, TEST_SIZE));
        check_sort::<8>(rand_fill(&mut r, TEST_SIZE));
        check_sort::<16>(rand_fill(&mut r, TEST_SIZE));
        check_sort::<20>(rand_fill(&mut r, TEST_SIZE));
        check_sort::<28>(rand_fill(&mut r, TEST_SIZE));
        check_sort::<32>(rand_fill(&mut r, TEST_SIZE));
    }

    #[test]
    fn many_duplicates() {
        let mut r = rng(8);
        let mut v: Vec<Blob64> = Vec::with_capacity(TEST_SIZE);
        while v.len() < TEST_SIZE {
            let val = Blob64::from(r.random::<u64>());
            let run = 1 + r.random_range(0..TEST_SIZE - v.len());
            v.extend(std::iter::repeat(val).take(run));
        }
        shuffle(&mut r, &mut v);
        check_sort(v);
    }

    #[test]
    fn all_duplicates() {
        let mut r = rng(10);
        let val = Blob256::from(r.random::<u64>());
        check_sort(vec![val; TEST_SIZE]);
    }

    #[test]
    fn zero_bytes_in_fixed_positions() {
        // LSB, MSB, LSB+1 and MSB-1 positions each pinned to zero.
        let mut r = rng(11);
        for &offset in &[0usize, 15, 1, 14] {
            let mut v: Vec<Blob128> = rand_fill(&mut r, TEST_SIZE);
            for b in v.iter_mut() {
                b.as_bytes_mut()[offset] = 0;
            }
            check_sort(v);
        }
    }

    #[test]
    fn shared_half_width_prefix_and_suffix() {
        let mut r = rng(15);
        let common: Blob256 = rand_fill(&mut r, 1)[0];
        for prefix in [true, false] {
            let mut v: Vec<Blob256> = rand_fill(&mut r, TEST_SIZE);
            for b in v.iter_mut() {
                let bytes = b.as_bytes_mut();
                if prefix {
                    bytes[16..].copy_from_slice(&common.as_bytes()[16..]);
                } else {
                    bytes[..16].copy_from_slice(&common.as_bytes()[..16]);
                }
            }
            check_sort(v);
        }
    }

    #[test]
    fn each_position_avoids_some_byte() {
        let mut r = rng(17);
        let avoid: Vec<u8> = (0..8).map(|_| r.random()).collect();
        let mut v: Vec<Blob64> = rand_fill(&mut r, TEST_SIZE);
        for b in v.iter_mut() {
            for (i, byte) in b.as_bytes_mut().iter_mut().enumerate() {
                if *byte == avoid[i] {
                    *byte = avoid[i].wrapping_add(1);
                }
            }
        }
        check_sort(v);
    }

    #[test]
    fn constant_fills() {
        check_sort(vec![Blob128::zero(); TEST_SIZE]);
        check_sort(vec![Blob128::from(1u64); TEST_SIZE]);
        let mut ff = Blob128::zero();
        ff.sethighbits(128);
        check_sort(vec![ff; TEST_SIZE]);
    }

    #[test]
    fn aa55_duet() {
        let mut r = rng(21);
        let v: Vec<Blob160> = (0..TEST_SIZE)
            .map(|_| {
                let fill = if r.random::<bool>() { 0xAAu8 } else { 0x55 };
                Blob160::from_bytes(&[fill; 20])
            })
            .collect();
        check_sort(v);
    }

    #[test]
    fn small_sizes() {
        check_sort::<4>(vec![]);
        check_sort::<4>(vec![Blob32::from(7u64)]);
        check_sort::<4>(vec![Blob32::from(7u64), Blob32::from(3u64)]);
        let mut r = rng(23);
        check_sort::<8>(rand_fill(&mut r, SMALLSORT_CUTOFF));
        check_sort::<8>(rand_fill(&mut r, SMALLSORT_CUTOFF + 1));
    }

    #[test]
    fn indexed_sort_tracks_origins() {
        let mut r = rng(30);
        let orig: Vec<Blob64> = rand_fill(&mut r, TEST_SIZE);
        let mut hashes = orig.clone();
        let mut idxs: Vec<HashIdx> = (0..TEST_SIZE as HashIdx).collect();
        blobsort_indexed(&mut hashes, &mut idxs);

        let mut expect = orig.clone();
        expect.sort_unstable();
        assert_eq!(hashes, expect);

        let mut seen = vec![false; TEST_SIZE];
        for (h, &ix) in hashes.iter().zip(idxs.iter()) {
            assert_eq!(orig[ix as usize], *h);
            assert!(!seen[ix as usize]);
            seen[ix as usize] = true;
        }
    }
}
