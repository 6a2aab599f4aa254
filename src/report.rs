// Copyright 2025 N. Dornseif
//
// Dual-licensed under Apache 2.0 and MIT terms.

//! Turning raw counts and scores into verdict lines.
//!
//! Every reporter prints one line, marks failures and warnings, feeds
//! the scaled log2 p-value into the run context and hands back a
//! Verdict. Ratios and multipliers on the lines are cosmetic; only the
//! p-values decide pass or fail.

use std::collections::BTreeMap;

use crate::blob::{Blob, HashIdx};
use crate::context::Context;
use crate::stats;
use crate::strings::{FAIL_STR, WARN_STR};

bitflags::bitflags! {
    #[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
    pub struct ReportFlags: u32 {
        const PROGRESS  = 1 << 0;
        const VERBOSE   = 1 << 1;
        const MORESTATS = 1 << 2;
        const DIAGRAMS  = 1 << 3;
        const QUIET     = 1 << 4;
    }
}

/// 2^-20. A hash producing a result this improbable has failed.
pub const FAILURE_PBOUND: f64 = 9.5367431640625e-7;
/// 2^-16. Sixteen times as likely as failure; only worth a marker.
/// A full run involves thousands of tests, so a 1-in-65536 event is
/// expected to show up now and then even for a perfect hash.
pub const WARNING_PBOUND: f64 = 1.52587890625e-5;

#[derive(Copy, Clone, Debug)]
pub struct Verdict {
    pub pass: bool,
    pub log2p: i32,
}

#[derive(Copy, Clone, Debug)]
pub struct DistVerdict {
    pub pass: bool,
    pub log2p: i32,
    pub worst_start: i32,
    pub worst_width: i32,
}

/// One-character summary of a p-value: dot for comfortably safe,
/// digits counting down to the failure bound, letters past it, X for
/// extreme failure.
pub fn plot_char(p_value: f64) -> char {
    const DIGITS: i32 = 9; // '1'..'9'
    const CHARS: i32 = 6; // 'a'..'f'
    let offset = stats::log2_pvalue(FAILURE_PBOUND);

    if p_value > FAILURE_PBOUND * 2.0f64.powi(DIGITS) {
        '.'
    } else if p_value > FAILURE_PBOUND {
        let log2p = stats::log2_pvalue(p_value);
        (b'1' + (log2p + DIGITS - offset) as u8) as char
    } else if p_value > FAILURE_PBOUND * 2.0f64.powi(-CHARS) {
        let log2p = stats::log2_pvalue(p_value);
        (b'a' + (log2p - offset) as u8) as char
    } else {
        'X'
    }
}

fn print_markers(p_value: f64) -> bool {
    if p_value <= FAILURE_PBOUND {
        println!(" {}", FAIL_STR);
        false
    } else if p_value <= WARNING_PBOUND {
        println!(" {}", WARN_STR);
        true
    } else {
        println!();
        true
    }
}

fn print_pvalue_suffix(log2p: i32, p_value: f64, delta: i64, flags: ReportFlags) {
    if flags.contains(ReportFlags::MORESTATS) {
        if p_value > 0.00001 {
            print!("(^{:2}) (p<{:8.6}) ({:+})", log2p, p_value, delta);
        } else {
            print!("(^{:2}) (p<{:.2e}) ({:+})", log2p, p_value, delta);
        }
    } else {
        print!("(^{:2})", log2p);
    }
}

//-----------------------------------------------------------------------------
// Collision counts

/// Report on a collision count over nb_h hashes truncated to
/// 'hashsize' bits. With 'maxcoll' the count is the fullest-bucket
/// statistic instead of the sum over all buckets.
#[allow(clippy::too_many_arguments)]
pub fn report_collisions(ctx: &Context, nb_h: u64, collcount: u32, hashsize: u32, maxcoll: bool,
    highbits: bool, header: bool, flags: ReportFlags) -> Verdict {
    let largehash = hashsize > 32;

    let (expected, p_value) = if maxcoll {
        (
            stats::estimate_max_collisions(nb_h, hashsize),
            stats::max_coll_pvalue(nb_h, hashsize, collcount),
        )
    } else {
        let e = stats::estimate_nb_collisions(nb_h, hashsize);
        (e, stats::bounded_poisson_pvalue(e, collcount as u64))
    };
    let log2p = stats::log2_pvalue(p_value);

    // When both sides round to "none", the test exactly met
    // expectations; when a collision shows up against long odds, a
    // ratio is meaningless and prints as dashes.
    let ratio = if collcount == 0 {
        if expected < 0.1 {
            1.0
        } else {
            0.0
        }
    } else if expected < 0.01 {
        f64::INFINITY
    } else if collcount as i64 == expected.round() as i64 {
        1.0
    } else if !largehash && collcount as i64 == (expected + 0.4).round() as i64 {
        1.0
    } else {
        let r = (collcount as f64) / expected;
        if r >= 999.95 {
            f64::INFINITY
        } else {
            r
        }
    };

    let failure = p_value <= FAILURE_PBOUND;
    let warning = !failure && (p_value <= WARNING_PBOUND || ratio.is_nan());

    ctx.record_log2_pvalue(log2p);

    if !flags.contains(ReportFlags::QUIET) {
        if header {
            print!(
                "Testing {} collisions ({} {:3}-bit)",
                if maxcoll { "max" } else { "all" },
                if highbits { "high" } else { "low " },
                hashsize
            );
        }

        if !ratio.is_finite() {
            print!(" - Expected {:10.1}, actual {:10}  (------) ", expected, collcount);
        } else if ratio < 9.0 {
            print!(" - Expected {:10.1}, actual {:10}  ({:5.3}x) ", expected, collcount, ratio);
        } else {
            print!(" - Expected {:10.1}, actual {:10}  ({:.1}x) ", expected, collcount, ratio);
        }

        print_pvalue_suffix(log2p, p_value, collcount as i64 - expected.round() as i64, flags);

        if failure {
            println!(" {}", FAIL_STR);
        } else if warning {
            println!(" {}", WARN_STR);
        } else {
            println!();
        }
    }

    Verdict { pass: !failure, log2p }
}

/// Scan all truncated widths in [min_bits, max_bits], report the one
/// with the least likely collision count, scaled across the number of
/// widths scanned.
#[allow(clippy::too_many_arguments)]
pub fn report_bits_collisions(ctx: &Context, nb_h: u64, collcounts: &[u32], min_bits: u32,
    max_bits: u32, highbits: bool, flags: ReportFlags) -> Verdict {
    if max_bits <= 1 || min_bits > max_bits {
        return Verdict { pass: true, log2p: 0 };
    }

    let mut worst_p = f64::INFINITY;
    let mut worst_dev = 0.0f64;
    let mut worst_bits = 0u32;
    let mut worst_nb = 0u32;
    let mut worst_exp = 1.0f64;

    for b in min_bits..=max_bits {
        let nb_colls = collcounts[(b - min_bits) as usize];
        let expected = stats::estimate_nb_collisions(nb_h, b);
        debug_assert!(expected > 0.0);
        let p_value = stats::bounded_poisson_pvalue(expected, nb_colls as u64);
        if p_value < worst_p {
            worst_p = p_value;
            worst_dev = (nb_colls as f64) / expected;
            worst_bits = b;
            worst_nb = nb_colls;
            worst_exp = expected;
        }
    }

    let p_value = stats::scale_pvalue(worst_p, (max_bits - min_bits + 1) as usize);
    let log2p = stats::log2_pvalue(p_value);
    ctx.record_log2_pvalue(log2p);

    let failure = p_value <= FAILURE_PBOUND;
    let warning = !failure && p_value <= WARNING_PBOUND;

    if !flags.contains(ReportFlags::QUIET) {
        let head = format!(
            "Testing all collisions ({} {:2}..{:2} bits) - ",
            if highbits { "high" } else { "low " },
            min_bits,
            max_bits
        );
        let worst = format!(
            "Worst is {:2} bits: {}/{} ",
            worst_bits,
            worst_nb,
            worst_exp.round() as i64
        );
        let pad = 80usize.saturating_sub(head.len() + worst.len());
        print!("{}{}{}", head, worst, " ".repeat(pad));

        if worst_dev >= 999.95 {
            print!("(------) ");
        } else if worst_dev < 9.0 {
            print!("({:5.3}x) ", worst_dev);
        } else {
            print!("({:.1}x) ", worst_dev);
        }

        print_pvalue_suffix(log2p, p_value, worst_nb as i64 - worst_exp.round() as i64, flags);

        if failure {
            println!(" {}", FAIL_STR);
        } else if warning {
            println!(" {}", WARN_STR);
        } else {
            println!();
        }
    }

    Verdict { pass: !failure, log2p }
}

//-----------------------------------------------------------------------------
// Coin-flip bias (avalanche)

/// Report the worst bias over a tensor of per-(keybit, outbit) flip
/// counts, where each counter should be Binomial(coinflips, 1/2).
pub fn report_bias(ctx: &Context, counts: &[u32], coinflips: u64, hashbits: usize,
    flags: ReportFlags) -> Verdict {
    let trials = counts.len();
    let expected = (coinflips / 2) as i64;
    let mut worst_raw: i64 = 0;
    let mut worst_bias: i64 = 0;
    let mut worst_n = 0usize;

    for (i, &c) in counts.iter().enumerate() {
        let raw = c as i64 - expected;
        if raw.abs() > worst_bias {
            worst_bias = raw.abs();
            worst_raw = raw;
            worst_n = i;
        }
    }
    let worst_keybit = worst_n / hashbits;
    let worst_hashbit = worst_n % hashbits;

    // Threading makes per-rep output ordering nondeterministic, so the
    // summed tensor is hashed instead of the raw hash values.
    ctx.vcode_output_u32s(counts);
    ctx.vcode_result_u64(worst_bias as u64);
    ctx.vcode_result_u64(worst_n as u64);

    let p1value = stats::coinflip_binomial_pvalue(coinflips, worst_bias as u64);
    let p_value = stats::scale_pvalue(p1value, trials);
    let log2p = stats::log2_pvalue(p_value);
    let ratio = (worst_bias as f64) / (coinflips as f64);
    let pct = if ratio <= 5e-7 { 0.0 } else { ratio * 200.0 };
    let pctdigits = if pct >= 99.995 {
        1
    } else if pct >= 9.995 {
        2
    } else {
        3
    };

    ctx.record_log2_pvalue(log2p);

    if !flags.contains(ReportFlags::QUIET) {
        print!(
            "max is {:5.prec$}% at bit {:4} -> out {:3} ",
            pct,
            worst_keybit,
            worst_hashbit,
            prec = pctdigits
        );
        print_pvalue_suffix(log2p, p_value, worst_raw, flags);
    }

    let pass = if !flags.contains(ReportFlags::QUIET) {
        print_markers(p_value)
    } else {
        p_value > FAILURE_PBOUND
    };

    if flags.contains(ReportFlags::DIAGRAMS) && !flags.contains(ReportFlags::QUIET) {
        print!("[");
        for (i, &c) in counts.iter().enumerate() {
            let bias = (c as i64 - expected).unsigned_abs();
            let p = stats::coinflip_binomial_pvalue(coinflips, bias);
            print!("{}", plot_char(p));
            if (i % hashbits == hashbits - 1) && (i < trials - 1) {
                print!("]\n[");
            }
        }
        println!("]");
    }

    Verdict { pass, log2p }
}

//-----------------------------------------------------------------------------
// Bit independence

/// Report on dependencies between output bit changes. The popcount and
/// andcount tensors hold single-bit and joint flip counts; the four
/// cells of each (keybit, out1, out2) contingency table follow from
/// them, since the cells must sum to the rep count.
pub fn report_chisq_indep(ctx: &Context, popcount: &[u32], andcount: &[u32], keybits: usize,
    hashbits: usize, reps: u64, flags: ReportFlags) -> Verdict {
    let pairs = hashbits * (hashbits - 1) / 2;

    let mut max_chisq = 0.0f64;
    let mut max_keybit = 0usize;
    let mut max_out_a = 0usize;
    let mut max_out_b = 0usize;

    for keybit in 0..keybits {
        let pop_row = &popcount[keybit * hashbits..(keybit + 1) * hashbits];
        let and_row = &andcount[keybit * pairs..(keybit + 1) * pairs];
        let mut idx = 0usize;
        for out1 in 0..hashbits - 1 {
            let pop_y = pop_row[out1];
            for out2 in out1 + 1..hashbits {
                let c11 = and_row[idx];
                idx += 1;
                let c10 = pop_row[out2] - c11;
                let c01 = pop_y - c11;
                let c00 = reps as u32 - c11 - c10 - c01;
                let boxes = [c00, c01, c10, c11];

                let chisq = stats::chisq_indep_value(&boxes, reps);
                if max_chisq < chisq {
                    max_chisq = chisq;
                    max_keybit = keybit;
                    max_out_a = out1;
                    max_out_b = out2;
                }
            }
        }
    }

    ctx.vcode_output_u32s(popcount);
    ctx.vcode_output_u32s(andcount);
    ctx.vcode_result_u64(max_chisq as u64);
    ctx.vcode_result_u64(max_keybit as u64);
    ctx.vcode_result_u64(max_out_a as u64);
    ctx.vcode_result_u64(max_out_b as u64);

    let p_raw = stats::chisq_pvalue(max_chisq, 1);
    let p_value = stats::scale_pvalue(p_raw, keybits * pairs);
    let log2p = stats::log2_pvalue(p_value);
    let cramer_v = (max_chisq / reps as f64).sqrt();

    ctx.record_log2_pvalue(log2p);

    if !flags.contains(ReportFlags::QUIET) {
        print!(
            "max {:6.4} at bit {:4} -> out ({:3},{:3})  (^{:2})",
            cramer_v, max_keybit, max_out_a, max_out_b, log2p
        );
    }
    let pass = if !flags.contains(ReportFlags::QUIET) {
        print_markers(p_value)
    } else {
        p_value > FAILURE_PBOUND
    };

    if flags.contains(ReportFlags::DIAGRAMS) && !flags.contains(ReportFlags::QUIET) {
        let mut xyoffset = 0usize;
        for out1 in 0..hashbits - 1 {
            for out2 in out1 + 1..hashbits {
                print!("Output bits ({:3},{:3}) - ", out1, out2);
                for keybit in 0..keybits {
                    let pop_row = &popcount[keybit * hashbits..(keybit + 1) * hashbits];
                    let c11 = andcount[keybit * pairs + xyoffset];
                    let c10 = pop_row[out2] - c11;
                    let c01 = pop_row[out1] - c11;
                    let c00 = reps as u32 - c11 - c10 - c01;
                    let chisq = stats::chisq_indep_value(&[c00, c01, c10, c11], reps);
                    print!("{}", plot_char(stats::chisq_pvalue(chisq, 1)));
                }
                println!();
                xyoffset += 1;
            }
            println!();
        }
    }

    Verdict { pass, log2p }
}

//-----------------------------------------------------------------------------
// Distribution

/// Pick the worst standard-normal score over all (startbit, width)
/// slots and scale its p-value across the number of tests performed.
pub fn report_distribution(ctx: &Context, scores: &[f64], tests: usize, hashbits: usize,
    maxwidth: u32, minwidth: u32, flags: ReportFlags) -> DistVerdict {
    let widths = (maxwidth - minwidth + 1) as usize;
    let mut worst_n = 0.0f64;
    let mut worst_start: i32 = -1;
    let mut worst_width: i32 = -1;

    for startbit in 0..hashbits {
        let row = &scores[startbit * widths..(startbit + 1) * widths];
        let mut width = maxwidth as i32;
        for &n in row {
            if worst_n <= n {
                worst_n = n;
                worst_width = width;
                worst_start = startbit as i32;
            }
            width -= 1;
        }
    }

    ctx.vcode_result_u32(worst_n as u32);
    ctx.vcode_result_u64(worst_width as u64);
    ctx.vcode_result_u64(worst_start as u64);

    let p_value = stats::scale_pvalue(stats::std_normal_pvalue(worst_n), tests);
    let log2p = stats::log2_pvalue(p_value);
    let mult = stats::normalize_score(worst_n, worst_width.max(0) as usize);

    ctx.record_log2_pvalue(log2p);

    if !flags.contains(ReportFlags::QUIET) {
        if worst_start == -1 {
            print!("No positive bias detected            {:5.3}x  ", 0.0);
        } else if mult < 9.0 {
            print!(
                "Worst bias is {:2} bits at bit {:3}:    {:5.3}x  ",
                worst_width, worst_start, mult
            );
        } else {
            print!(
                "Worst bias is {:2} bits at bit {:3}:    {:.1}x  ",
                worst_width, worst_start, mult
            );
        }

        if flags.contains(ReportFlags::MORESTATS) {
            if p_value > 0.00001 {
                print!("(^{:2}) (p<{:8.6}) ({})", log2p, p_value, worst_n);
            } else {
                print!("(^{:2}) (p<{:.2e}) ({})", log2p, p_value, worst_n);
            }
        } else {
            print!("(^{:2})", log2p);
        }
    }

    let pass = if !flags.contains(ReportFlags::QUIET) {
        print_markers(p_value)
    } else {
        p_value > FAILURE_PBOUND
    };

    if flags.contains(ReportFlags::DIAGRAMS) && !flags.contains(ReportFlags::QUIET) {
        print!("[");
        for startbit in 0..hashbits {
            let row = &scores[startbit * widths..(startbit + 1) * widths];
            for &n in row {
                print!("{}", plot_char(stats::std_normal_pvalue(n)));
            }
            if startbit + 1 == hashbits {
                println!("]");
            } else {
                print!("]\n[");
            }
        }
    }

    DistVerdict { pass, log2p, worst_start, worst_width }
}

//-----------------------------------------------------------------------------
// Diagnostic dumps, verbose mode only. Never pass/fail.

/// Print sampled collision values with their multiplicities.
pub fn print_collisions<const LEN: usize>(collisions: &BTreeMap<Blob<LEN>, u32>,
    max_shown: usize, nb_bits: usize, prev_bits: usize, reversed: bool) {
    if prev_bits != nb_bits {
        print!(
            "\n{}-bit or more collisions (excluding {}-bit or more) ",
            nb_bits, prev_bits
        );
    } else {
        print!("\n{}-bit collisions ", nb_bits);
    }
    if collisions.len() >= max_shown {
        println!("(first {}):", max_shown);
    } else {
        println!("({}):", collisions.len());
    }

    for (hash, count) in collisions.iter().take(max_shown) {
        println!("{:6}x {}", count, hash.to_hex(nb_bits, reversed));
    }
    println!();
}

/// Print sampled collision values together with the keys that produced
/// them, via the caller's key printer.
pub fn print_collisions_keys<const LEN: usize>(collisions: &BTreeMap<Blob<LEN>, Vec<HashIdx>>,
    max_per_collision: usize, nb_bits: usize, reversed: bool, keyprint: &dyn Fn(HashIdx)) {
    println!("\n{}-bit collisions ({}):", nb_bits, collisions.len());
    for (hash, idxs) in collisions.iter() {
        if idxs.len() > max_per_collision {
            print!("\tfirst {} (of {}) results for hash value ", max_per_collision, idxs.len());
        } else {
            print!("\t{} results for hash value ", idxs.len());
        }
        println!("{}", hash.to_hex(nb_bits, reversed));
        for &idx in idxs.iter().take(max_per_collision) {
            print!("\t\t");
            keyprint(idx);
            println!();
        }
    }
    println!();
}

/// Show the most common and never-seen values of one window slice.
pub fn show_outliers<const LEN: usize>(hashes: &[Blob<LEN>], bit_offset: usize,
    bit_width: usize, max_entries: usize) {
    const N_OUTLIERS: usize = 10;
    let nb_c = 1usize << bit_width;
    let mut counts = vec![0u32; nb_c];
    for h in hashes {
        counts[h.window(bit_offset, bit_width) as usize] += 1;
    }

    let mut top: Vec<u32> = counts.iter().copied().filter(|&c| c > 0).collect();
    top.sort_unstable_by(|a, b| b.cmp(a));
    let maxbound = top.get(N_OUTLIERS - 1).copied().unwrap_or_else(|| {
        top.last().copied().unwrap_or(0)
    });
    let zerocount = counts.iter().filter(|&&c| c == 0).count();

    println!(
        "Most common hash values for {}-bits slice @ offset {} (expected count == {}):",
        bit_width,
        bit_offset,
        (hashes.len() as f64) * 2.0f64.powi(-(bit_width as i32))
    );
    let hexdigits = (bit_width + 3) / 4;
    let mut shown = 0usize;
    for (value, &count) in counts.iter().enumerate() {
        if count >= maxbound && count > 0 {
            println!("\t\t{:8}x 0x{:0width$x}", count, value, width = hexdigits);
            shown += 1;
            if shown >= max_entries {
                break;
            }
        }
    }

    if zerocount > 0 {
        println!(
            "Never-seen hash values for {}-bits slice @ offset {} (expected count == {}) ({} values):",
            bit_width,
            bit_offset,
            stats::get_missing_hashes_expected(hashes.len() as u64, bit_width as u32),
            zerocount
        );
        let mut left = zerocount.min(max_entries);
        for (value, &count) in counts.iter().enumerate() {
            if count == 0 {
                println!("\t\t          0x{:0width$x}", value, width = hexdigits);
                left -= 1;
                if left == 0 {
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;

    fn ctx() -> Context {
        Context::new(0, 0, 1, ReportFlags::QUIET, false, false)
    }

    #[test]
    fn plot_glyph_bands() {
        assert_eq!(plot_char(0.5), '.');
        // Just inside the digit band.
        assert_eq!(plot_char(2.0f64.powi(-12) * 1.5), '1');
        assert_eq!(plot_char(2.0f64.powi(-20) * 1.5), '9');
        // At and past the failure bound.
        assert_eq!(plot_char(2.0f64.powi(-21) * 1.5), 'a');
        assert_eq!(plot_char(2.0f64.powi(-26) * 1.5), 'f');
        assert_eq!(plot_char(2.0f64.powi(-40)), 'X');
    }

    #[test]
    fn collision_report_passes_on_expected_counts() {
        let c = ctx();
        // 2^20 keys at 32 bits expect ~128 collisions.
        let v = report_collisions(&c, 1 << 20, 130, 32, false, true, false, ReportFlags::QUIET);
        assert!(v.pass);
        assert!(v.log2p < 16);
    }

    #[test]
    fn collision_report_fails_on_wild_excess() {
        let c = ctx();
        let v = report_collisions(&c, 1 << 20, 60_000, 32, false, true, false, ReportFlags::QUIET);
        assert!(!v.pass);
        assert_eq!(v.log2p, 99);
    }

    #[test]
    fn bits_collision_report_flags_worst_width() {
        let c = ctx();
        // Sweep 20..24 bits with all counts close to expectations
        // except one absurd width.
        let nb_h = 1u64 << 20;
        let mut counts = Vec::new();
        for b in 20u32..=24 {
            counts.push((stats::estimate_nb_collisions(nb_h, b).floor() as u32).saturating_sub(1));
        }
        let ok = report_bits_collisions(&c, nb_h, &counts, 20, 24, true, ReportFlags::QUIET);
        assert!(ok.pass);

        counts[2] *= 40;
        let bad = report_bits_collisions(&c, nb_h, &counts, 20, 24, true, ReportFlags::QUIET);
        assert!(!bad.pass);
    }

    #[test]
    fn bias_report_fails_on_stuck_bit() {
        let c = ctx();
        let coinflips = 100_000u64;
        let hashbits = 32usize;
        // All bits perfectly balanced except one that never flips.
        let mut counts = vec![(coinflips / 2) as u32; 64 * hashbits];
        counts[5 * hashbits + 7] = 0;
        let v = report_bias(&c, &counts, coinflips, hashbits, ReportFlags::QUIET);
        assert!(!v.pass);
        assert_eq!(v.log2p, 99);
    }

    #[test]
    fn bias_report_passes_balanced_counts() {
        let c = ctx();
        let coinflips = 100_000u64;
        let hashbits = 32usize;
        let counts = vec![(coinflips / 2) as u32 + 40; 64 * hashbits];
        let v = report_bias(&c, &counts, coinflips, hashbits, ReportFlags::QUIET);
        assert!(v.pass);
    }

    #[test]
    fn chisq_report_passes_independent_bits() {
        let c = ctx();
        let keybits = 8usize;
        let hashbits = 8usize;
        let pairs = hashbits * (hashbits - 1) / 2;
        let reps = 100_000u64;
        // Perfectly independent fair bits: each flips half the time,
        // each pair flips together a quarter of the time.
        let popcount = vec![(reps / 2) as u32; keybits * hashbits];
        let andcount = vec![(reps / 4) as u32; keybits * pairs];
        let v = report_chisq_indep(&c, &popcount, &andcount, keybits, hashbits, reps,
            ReportFlags::QUIET);
        assert!(v.pass);
    }

    #[test]
    fn chisq_report_fails_locked_pair() {
        let c = ctx();
        let keybits = 8usize;
        let hashbits = 8usize;
        let pairs = hashbits * (hashbits - 1) / 2;
        let reps = 100_000u64;
        let popcount = vec![(reps / 2) as u32; keybits * hashbits];
        let mut andcount = vec![(reps / 4) as u32; keybits * pairs];
        // Output bits 0 and 1 always flip together for keybit 3.
        andcount[3 * pairs] = (reps / 2) as u32;
        let v = report_chisq_indep(&c, &popcount, &andcount, keybits, hashbits, reps,
            ReportFlags::QUIET);
        assert!(!v.pass);
    }

    #[test]
    fn distribution_report_verdicts() {
        let c = ctx();
        let hashbits = 32usize;
        let widths = 3usize; // 8..10
        let scores = vec![0.3f64; hashbits * widths];
        let v = report_distribution(&c, &scores, hashbits * widths, hashbits, 10, 8,
            ReportFlags::QUIET);
        assert!(v.pass);

        let mut bad = scores.clone();
        bad[5 * widths + 1] = 12.0;
        let v = report_distribution(&c, &bad, hashbits * widths, hashbits, 10, 8,
            ReportFlags::QUIET);
        assert!(!v.pass);
        assert_eq!(v.worst_start, 5);
        assert_eq!(v.worst_width, 9);
    }
}
