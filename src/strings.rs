// Copyright 2025 N. Dornseif
//
// Dual-licensed under Apache 2.0 and MIT terms.

//! User interaction strings are stored here.

pub const FAIL_STR: &str = "!!!!!";
pub const WARN_STR: &str = "!";
pub const PASS_STR: &str = "PASS";
pub const SKIP_STR: &str = "SKIP";
pub const FAIL_BANNER: &str = "*********FAIL*********";

/// Individually selectable test suites, in run order.
pub const SUITE_NAMES: [&str; 12] = [
    "Sanity", "Verify", "Avalanche", "BIC", "Zeroes", "Sparse", "TwoBytes", "Text", "Bitflip",
    "DiffDist", "Seed", "BadSeeds",
];

/// Names accepted by --test that expand to groups of suites.
pub const GROUP_NAMES: [&str; 3] = ["All", "VerifyAll", "SanityAll"];
