// Copyright 2025 N. Dornseif
//
// Dual-licensed under Apache 2.0 and MIT terms.

//! Statistical quality testing of non-cryptographic hash functions.

use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use thiserror::Error;

pub mod analyze;
pub mod avalanche;
pub mod blob;
pub mod blobsort;
pub mod context;
pub mod hashes;
pub mod histogram;
pub mod keysets;
pub mod report;
pub mod sanity;
pub mod stats;
pub mod strings;
pub mod testdata;
pub mod utils;
pub mod vcode;

use context::Context;
use hashes::{all_hashes, find_hash, Endianness, HashInfo};
use report::ReportFlags;
use strings::{GROUP_NAMES, SUITE_NAMES};
use utils::{format_elapsed_time, parse_maybe_hex};

#[derive(Parser)]
#[command(
    name = "hashacid",
    version,
    about = "Statistical quality tests for non-cryptographic hash functions"
)]
struct Cli {
    /// Hash to test, case-insensitive. See --list for the registry.
    hashname: Option<String>,

    /// Comma-separated tests to run; case-insensitive unique prefixes
    /// are accepted. Groups: All, VerifyAll, SanityAll.
    #[arg(long, value_delimiter = ',')]
    test: Vec<String>,

    /// Comma-separated tests to exclude.
    #[arg(long, value_delimiter = ',')]
    notest: Vec<String>,

    /// Run the extended (slower) variants of the tests.
    #[arg(long)]
    extra: bool,

    /// More statistics on every report line, plus the summary histogram.
    #[arg(long)]
    verbose: bool,

    /// Print the summary even when a single test was selected.
    #[arg(long)]
    force_summary: bool,

    /// Worker thread count, capped at 32. Default: all cores.
    #[arg(long)]
    ncpu: Option<usize>,

    /// Seed passed to the hash under test (0x-prefixed hex accepted).
    #[arg(long, value_parser = parse_maybe_hex)]
    seed: Option<u64>,

    /// Base seed for the keyset RNGs (0x-prefixed hex accepted).
    #[arg(long, value_parser = parse_maybe_hex)]
    randseed: Option<u64>,

    /// native | nonnative | default | nondefault | big | little
    #[arg(long, default_value = "default")]
    endian: String,

    /// Stop the run after the first failing test returns.
    #[arg(long)]
    exit_on_failure: bool,
    #[arg(long)]
    noexit_on_failure: bool,

    /// Exit with code 99 when any test failed.
    #[arg(long)]
    exit_code_on_failure: bool,
    #[arg(long)]
    noexit_code_on_failure: bool,

    /// Record and print the run's verification code.
    #[arg(long)]
    vcode: bool,

    /// Like --vcode, but also fold in per-test inputs.
    #[arg(long)]
    vcode_all: bool,

    /// Print wall-clock time per test.
    #[arg(long)]
    time_tests: bool,
    #[arg(long)]
    notime_tests: bool,

    /// List registered hashes with their widths and descriptions.
    #[arg(long)]
    list: bool,

    /// List registered hash names only.
    #[arg(long)]
    listnames: bool,

    /// List test names.
    #[arg(long)]
    tests: bool,
}

#[derive(Debug, Error)]
enum ConfigError {
    #[error("no hash specified; pass a hash name or use --list")]
    NoHash,
    #[error("unknown hash '{0}'; use --list to see the registry")]
    UnknownHash(String),
    #[error("unknown test '{0}'; use --tests to see the test names")]
    UnknownTest(String),
    #[error("ambiguous test prefix '{0}' (matches {1})")]
    AmbiguousTest(String, String),
    #[error("bad --endian value '{0}'")]
    BadEndian(String),
}

/// Resolve one --test/--notest entry by case-insensitive unique
/// prefix against suite and group names.
fn resolve_test_name(name: &str) -> Result<&'static str, ConfigError> {
    let candidates: Vec<&'static str> = GROUP_NAMES
        .iter()
        .chain(SUITE_NAMES.iter())
        .copied()
        .collect();

    if let Some(&exact) = candidates
        .iter()
        .find(|c| c.eq_ignore_ascii_case(name))
    {
        return Ok(exact);
    }

    let lower = name.to_ascii_lowercase();
    let matches: Vec<&'static str> = candidates
        .iter()
        .copied()
        .filter(|c| c.to_ascii_lowercase().starts_with(&lower))
        .collect();
    match matches.len() {
        0 => Err(ConfigError::UnknownTest(name.to_string())),
        1 => Ok(matches[0]),
        _ => Err(ConfigError::AmbiguousTest(name.to_string(), matches.join(", "))),
    }
}

/// Expand --test/--notest into the ordered suite list to run.
/// VerifyAll and SanityAll short-circuit into whole-registry modes.
fn resolve_suites(test: &[String], notest: &[String])
    -> Result<(Vec<&'static str>, bool, bool), ConfigError> {
    let mut verify_all = false;
    let mut sanity_all = false;
    let mut wanted: Vec<&'static str> = Vec::new();

    if test.is_empty() {
        wanted.extend(SUITE_NAMES.iter().copied());
    }
    for name in test {
        match resolve_test_name(name)? {
            "All" => wanted.extend(SUITE_NAMES.iter().copied()),
            "VerifyAll" => verify_all = true,
            "SanityAll" => sanity_all = true,
            suite => wanted.push(suite),
        }
    }
    for name in notest {
        let resolved = resolve_test_name(name)?;
        wanted.retain(|s| *s != resolved);
    }

    // Keep registry order, drop duplicates.
    let mut suites: Vec<&'static str> = Vec::new();
    for s in SUITE_NAMES.iter() {
        if wanted.contains(s) {
            suites.push(s);
        }
    }
    Ok((suites, verify_all, sanity_all))
}

fn resolve_endian(value: &str) -> Result<Endianness, ConfigError> {
    let native = if cfg!(target_endian = "big") {
        Endianness::Big
    } else {
        Endianness::Little
    };
    let other = match native {
        Endianness::Big => Endianness::Little,
        Endianness::Little => Endianness::Big,
    };
    match value.to_ascii_lowercase().as_str() {
        "native" | "default" => Ok(native),
        "nonnative" | "nondefault" => Ok(other),
        "big" => Ok(Endianness::Big),
        "little" => Ok(Endianness::Little),
        _ => Err(ConfigError::BadEndian(value.to_string())),
    }
}

fn resolve_ncpu(requested: Option<usize>) -> usize {
    let auto = std::thread::available_parallelism().map_or(1, |n| n.get());
    let mut ncpu = requested.unwrap_or(auto).max(1);
    if ncpu > 32 {
        println!("WARNING: --ncpu={} capped at 32", ncpu);
        ncpu = 32;
    }
    ncpu
}

fn run_suites_typed<const LEN: usize>(ctx: &Context, info: &HashInfo, endian: Endianness,
    suites: &[&'static str], time_tests: bool, exit_on_failure: bool) -> bool {
    let mut all_passed = true;
    for &suite in suites {
        let start = Instant::now();
        let pass = match suite {
            "Sanity" => sanity::sanity_test(ctx, info),
            "Verify" => sanity::verify_hash(ctx, info, endian),
            "Avalanche" => avalanche::avalanche_test::<LEN>(ctx, info),
            "BIC" => avalanche::bic_test::<LEN>(ctx, info),
            "Zeroes" => keysets::zeroes_test::<LEN>(ctx, info),
            "Sparse" => keysets::sparse_test::<LEN>(ctx, info),
            "TwoBytes" => keysets::twobytes_test::<LEN>(ctx, info),
            "Text" => keysets::text_test::<LEN>(ctx, info),
            "Bitflip" => keysets::bitflip_test::<LEN>(ctx, info),
            "DiffDist" => keysets::diffdist_test::<LEN>(ctx, info),
            "Seed" => keysets::seed_test::<LEN>(ctx, info),
            "BadSeeds" => keysets::badseeds_test::<LEN>(ctx, info),
            _ => true,
        };
        if time_tests {
            println!("-- test {} finished in {}", suite, format_elapsed_time(start.elapsed()));
        }
        all_passed &= pass;
        if !pass && exit_on_failure {
            println!("Aborting: --exit-on-failure");
            break;
        }
    }
    all_passed
}

fn run_suites(ctx: &Context, info: &HashInfo, endian: Endianness, suites: &[&'static str],
    time_tests: bool, exit_on_failure: bool) -> bool {
    match info.bits {
        32 => run_suites_typed::<4>(ctx, info, endian, suites, time_tests, exit_on_failure),
        64 => run_suites_typed::<8>(ctx, info, endian, suites, time_tests, exit_on_failure),
        128 => run_suites_typed::<16>(ctx, info, endian, suites, time_tests, exit_on_failure),
        160 => run_suites_typed::<20>(ctx, info, endian, suites, time_tests, exit_on_failure),
        224 => run_suites_typed::<28>(ctx, info, endian, suites, time_tests, exit_on_failure),
        256 => run_suites_typed::<32>(ctx, info, endian, suites, time_tests, exit_on_failure),
        other => {
            eprintln!("hash '{}' declares unsupported width {}", info.name, other);
            false
        }
    }
}

fn print_hash_list(names_only: bool) {
    for info in all_hashes() {
        if names_only {
            println!("{}", info.name);
        } else {
            println!("{:18} {:4} bits   {}", info.name, info.bits, info.desc);
        }
    }
}

fn run(cli: &Cli) -> Result<bool, ConfigError> {
    let (suites, verify_all, sanity_all) = resolve_suites(&cli.test, &cli.notest)?;
    let endian = resolve_endian(&cli.endian)?;
    let ncpu = resolve_ncpu(cli.ncpu);

    let mut flags = ReportFlags::PROGRESS;
    if cli.verbose {
        flags |= ReportFlags::VERBOSE | ReportFlags::MORESTATS;
    }

    let ctx = Context::new(
        cli.seed.unwrap_or(0),
        cli.randseed.unwrap_or(0),
        ncpu,
        flags,
        cli.extra,
        cli.vcode || cli.vcode_all,
    );

    if verify_all || sanity_all {
        let mut all_passed = true;
        if verify_all {
            println!("[[[ VerifyAll ]]]");
            println!();
            for info in all_hashes() {
                all_passed &= sanity::verify_hash(&ctx, info, endian);
            }
            println!();
        }
        if sanity_all {
            println!("[[[ SanityAll ]]]");
            println!();
            for info in all_hashes() {
                println!("--- {}", info.name);
                all_passed &= sanity::sanity_test(&ctx, info);
            }
        }
        return Ok(all_passed);
    }

    let name = cli.hashname.as_deref().ok_or(ConfigError::NoHash)?;
    let info = find_hash(name).ok_or_else(|| ConfigError::UnknownHash(name.to_string()))?;

    println!(
        "--- Testing {} \"{}\" ({} bits) - started {}",
        info.name,
        info.desc,
        info.bits,
        chrono::Local::now().format("%a %b %e %T %Y")
    );
    println!("--- seed 0x{:016x}, rng seed 0x{:016x}, {} threads", ctx.seed, ctx.rand_seed, ncpu);
    println!();

    let time_tests = cli.time_tests && !cli.notime_tests;
    let exit_on_failure = cli.exit_on_failure && !cli.noexit_on_failure;
    let all_passed = run_suites(&ctx, info, endian, &suites, time_tests, exit_on_failure);

    if suites.len() > 1 || cli.force_summary {
        ctx.print_summary(info.name);
    }
    if ctx.vcode_enabled() {
        let streams = ctx.vcode_stream_codes();
        println!(
            "VCodes: overall 0x{:08x} (input 0x{:08x}, output 0x{:08x}, result 0x{:08x})",
            ctx.vcode_overall(),
            streams[0],
            streams[1],
            streams[2]
        );
    }

    Ok(all_passed)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            use clap::error::ErrorKind;
            if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
                print!("{}", e);
                return ExitCode::SUCCESS;
            }
            eprintln!("{}", e);
            return ExitCode::from(1);
        }
    };

    if cli.list || cli.listnames {
        print_hash_list(cli.listnames);
        return ExitCode::SUCCESS;
    }
    if cli.tests {
        for name in SUITE_NAMES.iter() {
            println!("{}", name);
        }
        return ExitCode::SUCCESS;
    }

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => {
            if cli.exit_code_on_failure && !cli.noexit_code_on_failure {
                ExitCode::from(99)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_resolve_by_unique_prefix() {
        assert_eq!(resolve_test_name("aval").expect("unique"), "Avalanche");
        assert_eq!(resolve_test_name("BIC").expect("exact"), "BIC");
        assert_eq!(resolve_test_name("zer").expect("unique"), "Zeroes");
        assert!(resolve_test_name("q").is_err());
        // "S" prefixes Sanity, SanityAll, Sparse, Seed...
        assert!(matches!(
            resolve_test_name("s"),
            Err(ConfigError::AmbiguousTest(_, _))
        ));
    }

    #[test]
    fn exact_name_beats_prefix_ambiguity() {
        // "Sanity" is both an exact name and a prefix of SanityAll.
        assert_eq!(resolve_test_name("sanity").expect("exact"), "Sanity");
        assert_eq!(resolve_test_name("verify").expect("exact"), "Verify");
    }

    #[test]
    fn suite_resolution_defaults_and_excludes() {
        let (suites, va, sa) = resolve_suites(&[], &[]).expect("default");
        assert_eq!(suites.len(), SUITE_NAMES.len());
        assert!(!va && !sa);

        let (suites, _, _) =
            resolve_suites(&["All".into()], &["BadSeeds".into()]).expect("exclude");
        assert!(!suites.contains(&"BadSeeds"));
        assert_eq!(suites.len(), SUITE_NAMES.len() - 1);

        let (suites, _, _) = resolve_suites(&["aval".into(), "bic".into()], &[]).expect("pair");
        assert_eq!(suites, vec!["Avalanche", "BIC"]);
    }

    #[test]
    fn endian_values_resolve() {
        assert!(resolve_endian("big").is_ok());
        assert!(resolve_endian("LITTLE").is_ok());
        assert!(resolve_endian("native").is_ok());
        assert!(resolve_endian("nondefault").is_ok());
        assert!(resolve_endian("middle").is_err());
    }

    #[test]
    fn ncpu_is_capped() {
        assert_eq!(resolve_ncpu(Some(64)), 32);
        assert_eq!(resolve_ncpu(Some(1)), 1);
    }
}
