// Copyright 2025 N. Dornseif
//
// Dual-licensed under Apache 2.0 and MIT terms.

//! Misc utility functions.

use std::io::Write;
use std::time::Duration;

/// Format a duration to a fixed width.
pub fn format_elapsed_time(duration: Duration) -> String {
    const DECIMAL_DIGITS: usize = 4;
    let round_mul: f64 = 10.0_f64.powi(DECIMAL_DIGITS as i32);
    let secs = duration.as_secs_f64();

    if secs >= 1.0 {
        format!("{:<1$} s ", (secs * round_mul).floor() / round_mul, DECIMAL_DIGITS + 4)
    } else if secs >= 1e-3 {
        format!("{:<1$} ms", (secs * 1e3 * round_mul).floor() / round_mul, DECIMAL_DIGITS + 4)
    } else if secs >= 1e-6 {
        format!("{:<1$} µs", (secs * 1e6 * round_mul).floor() / round_mul, DECIMAL_DIGITS + 4)
    } else {
        format!("{:<1$} ns", (secs * 1e9 * round_mul).floor() / round_mul, DECIMAL_DIGITS + 4)
    }
}

/// Format a number of bytes into a pretty String.
/// e.g. 1048576 is 1 MiB
pub fn format_byte_count(num_bytes: usize) -> String {
    // 2**30 = 1073741824
    if num_bytes >= 1073741824 {
        format!("{:.2} GiB", (num_bytes as f64 / 1073741824.0))
    // 2**20 = 1048576
    } else if num_bytes >= 1048576 {
        format!("{:.2} MiB", (num_bytes as f64 / 1048576.0))
    // 2**10 = 1024
    } else if num_bytes >= 1024 {
        format!("{:.2} KiB", (num_bytes as f64 / 1024.0))
    } else {
        format!("{:.2} B", num_bytes as f64)
    }
}

/// Emit one progress dot each time 'i' crosses another 1/ndots-th of
/// the [lo, hi] range. Long tallies call this per iteration.
pub fn progressdots(i: usize, lo: usize, hi: usize, ndots: usize) {
    if hi <= lo || ndots == 0 {
        return;
    }
    let span = hi - lo;
    let cur = (i - lo) * ndots / span;
    let prev = if i == lo { usize::MAX } else { (i - 1 - lo) * ndots / span };
    if cur != prev {
        print!(".");
        let _ = std::io::stdout().flush();
    }
}

/// Parse an integer that may carry an 0x prefix, as the seed options do.
pub fn parse_maybe_hex(s: &str) -> Result<u64, std::num::ParseIntError> {
    let t = s.trim();
    if let Some(hex) = t.strip_prefix("0x").or_else(|| t.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16)
    } else {
        t.parse::<u64>()
    }
}
