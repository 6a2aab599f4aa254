// Copyright 2025 N. Dornseif
//
// Dual-licensed under Apache 2.0 and MIT terms.

//! Per-run state threaded through every test.
//!
//! One Context value replaces process-wide globals: the seed pair, the
//! worker count, report flags, accumulated results and the VCode
//! channel. Everything mutable sits behind one mutex so tests can
//! record results from worker threads.

use std::sync::Mutex;

use crate::report::ReportFlags;
use crate::strings;
use crate::vcode::{Stream, VCode};

pub struct Context {
    /// Seed handed to the hash under test.
    pub seed: u64,
    /// Base seed for all keyset RNGs.
    pub rand_seed: u64,
    pub ncpu: usize,
    pub flags: ReportFlags,
    pub extra: bool,
    inner: Mutex<Bookkeeping>,
}

struct Bookkeeping {
    vcode: VCode,
    log2p_hist: [u32; 100],
    failures: Vec<String>,
    tests_run: u32,
    tests_passed: u32,
}

impl Context {
    pub fn new(seed: u64, rand_seed: u64, ncpu: usize, flags: ReportFlags, extra: bool,
        vcode_enabled: bool) -> Self {
        Self {
            seed,
            rand_seed,
            ncpu,
            flags,
            extra,
            inner: Mutex::new(Bookkeeping {
                vcode: VCode::new(vcode_enabled),
                log2p_hist: [0; 100],
                failures: Vec::new(),
                tests_run: 0,
                tests_passed: 0,
            }),
        }
    }

    fn locked(&self) -> std::sync::MutexGuard<'_, Bookkeeping> {
        match self.inner.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn record_log2_pvalue(&self, logp: i32) {
        let mut b = self.locked();
        b.log2p_hist[logp.clamp(0, 99) as usize] += 1;
    }

    pub fn record_test_result(&self, pass: bool, suite: &str, detail: &str) {
        let mut b = self.locked();
        b.tests_run += 1;
        if pass {
            b.tests_passed += 1;
        } else if detail.is_empty() {
            b.failures.push(suite.to_string());
        } else {
            b.failures.push(format!("{} {}", suite, detail));
        }
    }

    pub fn vcode_input(&self, data: &[u8]) {
        self.locked().vcode.add(Stream::Input, data);
    }

    pub fn vcode_input_u64(&self, data: u64) {
        self.locked().vcode.add_u64(Stream::Input, data);
    }

    pub fn vcode_output(&self, data: &[u8]) {
        self.locked().vcode.add(Stream::Output, data);
    }

    pub fn vcode_output_u32s(&self, data: &[u32]) {
        let mut b = self.locked();
        for chunk in data.chunks(1024) {
            let bytes: Vec<u8> = chunk.iter().flat_map(|v| v.to_le_bytes()).collect();
            b.vcode.add(Stream::Output, &bytes);
        }
    }

    pub fn vcode_result_u32s(&self, data: &[u32]) {
        let mut b = self.locked();
        for chunk in data.chunks(1024) {
            let bytes: Vec<u8> = chunk.iter().flat_map(|v| v.to_le_bytes()).collect();
            b.vcode.add(Stream::Result, &bytes);
        }
    }

    pub fn vcode_result_u32(&self, data: u32) {
        self.locked().vcode.add_u32(Stream::Result, data);
    }

    pub fn vcode_result_u64(&self, data: u64) {
        self.locked().vcode.add_u64(Stream::Result, data);
    }

    pub fn vcode_enabled(&self) -> bool {
        self.locked().vcode.enabled()
    }

    pub fn vcode_overall(&self) -> u32 {
        self.locked().vcode.overall()
    }

    pub fn vcode_stream_codes(&self) -> [u32; 3] {
        self.locked().vcode.stream_codes()
    }

    /// Print the end-of-run summary. Returns whether every recorded
    /// test passed.
    pub fn print_summary(&self, hashname: &str) -> bool {
        let b = self.locked();
        let all_passed = b.tests_passed == b.tests_run;

        println!("----------------------------------------------------------------------------------------------");
        if all_passed {
            println!("{:18} - all tests passed ({} total)", hashname, b.tests_run);
        } else {
            println!(
                "{:18} - {}/{} tests passed - {}",
                hashname,
                b.tests_passed,
                b.tests_run,
                strings::FAIL_BANNER
            );
            println!("Failures:");
            for f in &b.failures {
                println!("    {}", f);
            }
        }

        if self.flags.contains(ReportFlags::VERBOSE) {
            println!("log2(p-value) histogram:");
            let maxp = b.log2p_hist.iter().copied().max().unwrap_or(0).max(1);
            for (logp, &count) in b.log2p_hist.iter().enumerate() {
                if count > 0 {
                    let bar = "#".repeat((count as usize * 50 / maxp as usize).max(1));
                    println!("  ^{:2} {:6} {}", logp, count, bar);
                }
            }
        }

        all_passed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_ctx() -> Context {
        Context::new(0, 0, 1, ReportFlags::QUIET, false, true)
    }

    #[test]
    fn results_accumulate() {
        let ctx = quiet_ctx();
        ctx.record_test_result(true, "Zeroes", "");
        ctx.record_test_result(false, "Avalanche", "32-byte keys");
        let b = ctx.locked();
        assert_eq!(b.tests_run, 2);
        assert_eq!(b.tests_passed, 1);
        assert_eq!(b.failures, vec!["Avalanche 32-byte keys".to_string()]);
    }

    #[test]
    fn log2p_values_clamp_into_histogram() {
        let ctx = quiet_ctx();
        ctx.record_log2_pvalue(0);
        ctx.record_log2_pvalue(99);
        ctx.record_log2_pvalue(150);
        let b = ctx.locked();
        assert_eq!(b.log2p_hist[0], 1);
        assert_eq!(b.log2p_hist[99], 2);
    }

    #[test]
    fn vcode_round_trips_through_context() {
        let a = quiet_ctx();
        let b = quiet_ctx();
        a.vcode_input(b"abc");
        a.vcode_result_u32(5);
        b.vcode_input(b"abc");
        b.vcode_result_u32(5);
        assert_eq!(a.vcode_overall(), b.vcode_overall());
    }
}
