// Copyright 2025 N. Dornseif
//
// Dual-licensed under Apache 2.0 and MIT terms.

//! Statistical primitives shared by every analyzer.
//!
//! P-values here are tail probabilities: the chance a random oracle
//! would have produced a result at least this extreme. Values close to
//! zero are the suspicious ones. Where precision in the tail matters
//! they are computed directly in that form via log1p/expm1 rather than
//! as 1-CDF.

use statrs::function::erf::erfc;

const INV_ROOT2: f64 = std::f64::consts::FRAC_1_SQRT_2;

fn exp2i(n: i32) -> f64 {
    2.0f64.powi(n)
}

//-----------------------------------------------------------------------------
// Collision count expectations

/// Expected number of colliding pairs when 'nb_h' hashes fall uniformly
/// into 2^nb_bits buckets.
///
/// The full formula needs 1-2^(-nb_bits) to fit a double with guard
/// room, so past 51 bits (or at low occupancy, where the leading Taylor
/// term dominates anyway) the simple quadratic estimate is used.
pub fn estimate_nb_collisions(nb_h: u64, nb_bits: u32) -> f64 {
    let n = nb_h as f64;
    let bits = nb_bits as i32;
    if bits > 51 || n < exp2i(bits) * exp2i(-25) * INV_ROOT2 {
        return n * (n - 1.0) * exp2i(-bits - 1);
    }

    // ln(pE) = nbH * ln(1 - 2^-bits) is the log-probability that one
    // given bucket stays empty; the expectation follows as
    // nbH + 2^bits * expm1(ln(pE)).
    let logp_e = n * (-exp2i(-bits)).ln_1p();
    n + logp_e.exp_m1() * exp2i(bits)
}

/// The number of buckets expected to stay empty.
pub fn get_missing_hashes_expected(nb_h: u64, nb_bits: u32) -> f64 {
    let p_e = ((nb_h as f64) * (-exp2i(-(nb_bits as i32))).ln_1p()).exp();
    p_e * exp2i(nb_bits as i32)
}

/// Largest bit count b < 256 such that nb_h >= ln(2) * b * 2^b.
///
/// Below this bound the hash table is so full that summing collisions
/// stops being informative and the fullest-bucket statistic takes over.
/// May exceed the width of the hash being tested.
pub fn nlogn_bound(nb_h: u64) -> u32 {
    let mut bits = 1;
    while bits <= 255 {
        if (nb_h as f64) < std::f64::consts::LN_2 * (bits as f64) * exp2i(bits as i32) {
            break;
        }
        bits += 1;
    }
    bits - 1
}

/// Estimated 50th-percentile count in the fullest of 2^nb_bits buckets
/// after nb_h balls. Raab-Steger bound with a fitted alpha term.
pub fn estimate_max_collisions(nb_h: u64, nb_bits: u32) -> f64 {
    let alpha = -(-0.128775055 * (nb_bits as f64) - 0.759110989).exp_m1();
    let m = (nb_h as f64) - 16.0;
    let n = exp2i(nb_bits as i32);
    let logn = (nb_bits as f64) * std::f64::consts::LN_2;
    (m / n) + alpha * (2.0 * (m / n) * logn).sqrt()
}

//-----------------------------------------------------------------------------
// P-value formulas

/// The worst result over N independent tests has CDF equal to a single
/// test's CDF raised to the Nth power. This computes that scaling while
/// staying in tail-probability space for precision.
pub fn scale_pvalue(p_value: f64, testcount: usize) -> f64 {
    -((-p_value).ln_1p() * (testcount as f64)).exp_m1()
}

/// scale_pvalue for 2^testbits tests.
pub fn scale_pvalue_2n(p_value: f64, testbits: u32) -> f64 {
    -((-p_value).ln_1p() * exp2i(testbits as i32)).exp_m1()
}

/// Display form: how many powers of two of improbability, clamped to
/// [0, 99].
pub fn log2_pvalue(p_value: f64) -> i32 {
    let l = p_value.log2();
    if l <= -99.0 {
        99
    } else {
        (-l.ceil() as i32).max(0)
    }
}

/// Upper tail of the standard normal distribution.
pub fn std_normal_pvalue(variable: f64) -> f64 {
    erfc(variable * INV_ROOT2) * 0.5
}

/// Helper for the Peizer-Pratt binomial approximation.
fn gfunc_peizer_pratt(x: f64) -> f64 {
    if x <= 0.0 {
        if x == 0.0 {
            return 1.0;
        }
        return f64::NAN;
    }
    if x >= 1.0 {
        if x == 1.0 {
            return 0.0;
        }
        return -gfunc_peizer_pratt(1.0 / x);
    }
    (1.0 - x * x + 2.0 * x * x.ln()) / ((1.0 - x) * (1.0 - x))
}

/// Tail probability that the fullest of 2^nb_bits buckets holds more
/// than 'max_coll' of the nb_h balls.
///
/// Bucket occupancy is Binomial(nb_h, 2^-nb_bits); the Peizer-Pratt
/// transformation gives the single-bucket tail, which is then scaled
/// across all buckets.
pub fn max_coll_pvalue(nb_h: u64, nb_bits: u32, max_coll: u32) -> f64 {
    let s = (max_coll as f64) + 0.5;
    let n = nb_h as f64;
    let t = n - s;
    let p = exp2i(-(nb_bits as i32));
    let q = 1.0 - p;

    let d1 = s + 1.0 / 6.0 - p * (n + 1.0 / 3.0);
    let d2 = d1 + 0.02 * (q / (s + 0.5) - p / (t + 0.5) + (q - 0.5) / (n + 1.0));

    let num = 1.0 + q * gfunc_peizer_pratt(s / (n * p)) + p * gfunc_peizer_pratt(t / (n * q));
    let denom = (n + 1.0 / 6.0) * p * q;
    let z2 = d2 * (num / denom).sqrt();

    let p_value = std_normal_pvalue(z2);
    scale_pvalue_2n(p_value, nb_bits)
}

/// Two-tailed probability that a fair coin flipped 'coinflips' times
/// lands at least 'delta' away from an even split. Peizer-Pratt with
/// p = 1/2 hardcoded.
pub fn coinflip_binomial_pvalue(coinflips: u64, delta: u64) -> f64 {
    let n = coinflips as f64;
    let delta = delta as f64;
    let two_s = n + 2.0 * delta;
    let two_t = n - 2.0 * delta;

    let d2 = delta + 0.02 * (1.0 / (two_s + 1.0) - 1.0 / (two_t + 1.0));

    let num = 2.0 + gfunc_peizer_pratt(two_s / n) + gfunc_peizer_pratt(two_t / n);
    let denom = n / 2.0 + 1.0 / 12.0;
    let z2 = d2 * (num / denom).sqrt();

    2.0 * std_normal_pvalue(z2)
}

/// Upper bound on the Poisson tail probability of seeing 'collisions'
/// when 'expected' were expected. Lower-than-expected counts are never
/// a failure, so those report 1.0.
pub fn bounded_poisson_pvalue(expected: f64, collisions: u64) -> f64 {
    if (collisions as f64) < expected {
        return 1.0;
    }
    let x = (collisions as f64) - 0.5;
    let g_over_root2 = (x * (x / expected).ln() + expected - x).sqrt();
    erfc(g_over_root2) / 2.0
}

//-----------------------------------------------------------------------------
// Chi-square independence

/// Chi-square statistic for a 2x2 contingency table (one degree of
/// freedom). Any expected cell below 10 makes the statistic unusable,
/// so the total is returned instead, which scales to a certain failure.
pub fn chisq_indep_value(boxes: &[u32; 4], total: u64) -> f64 {
    let n = total as f64;
    let colsum = [(boxes[0] + boxes[1]) as f64, (boxes[2] + boxes[3]) as f64];
    let rowsum = [(boxes[0] + boxes[2]) as f64, (boxes[1] + boxes[3]) as f64];
    let expect = [
        colsum[0] * rowsum[0] / n,
        colsum[0] * rowsum[1] / n,
        colsum[1] * rowsum[0] / n,
        colsum[1] * rowsum[1] / n,
    ];
    let mut chisq = 0.0;
    for i in 0..4 {
        if expect[i] < 10.0 {
            return n;
        }
        let d = (boxes[i] as f64) - expect[i];
        chisq += d * d / expect[i];
    }
    chisq
}

/// Tail probability for a chi-square statistic.
pub fn chisq_pvalue(chisq: f64, dof: u64) -> f64 {
    if dof == 1 {
        // For one degree of freedom, P(X > x) = 2 * (1 - Phi(sqrt(x))).
        return 2.0 * std_normal_pvalue(chisq.sqrt());
    }
    let ddof = dof as f64;
    if chisq <= ddof {
        return 1.0;
    }
    (-ddof / 2.0 * (chisq / ddof - 1.0 - (chisq / ddof).ln())).exp()
}

//-----------------------------------------------------------------------------
// Distribution score

pub fn sum_squares_u8(bins: &[u8]) -> u64 {
    bins.iter().map(|&b| (b as u64) * (b as u64)).sum()
}

pub fn sum_squares_u32(bins: &[u32]) -> u64 {
    bins.iter().map(|&b| (b as u64) * (b as u64)).sum()
}

/// RMSE-based distribution score over bin counts.
///
/// With M keys in N bins the MSE of a random spread is lambda = M/N.
/// sum(Bi^2) alone suffices since sum((Bi-lambda)^2) = sum(Bi^2) - M*lambda,
/// and (RMSE/sqrt(lambda) - 1) * sqrt(2N) is a standard normal variate
/// under the null, independent of M and N.
pub fn calc_score(sumsq: u64, bincount: usize, keycount: u64) -> f64 {
    let n = bincount as f64;
    let m = keycount as f64;
    let lambda = m / n;

    let rmse_ratio = ((sumsq as f64) / m - lambda).sqrt();
    (rmse_ratio - 1.0) * (2.0 * n).sqrt()
}

/// Convert a score back to an (rmse/sqrt(lambda) - 1) style multiplier
/// for display. Capped; precision past 999.9 is visual clutter.
pub fn normalize_score(score: f64, scorewidth: usize) -> f64 {
    if score <= 0.0 {
        return 0.0;
    }
    (score / (2.0 * scorewidth as f64).sqrt()).min(999.9)
}

//-----------------------------------------------------------------------------
// Combinatorics used by the keyset generators

pub fn choose_k(n: u64, k: u64) -> u64 {
    if k > n {
        return 0;
    }
    if k == 0 || k == n {
        return 1;
    }
    let k = k.min(n - k);
    let mut c = 1.0f64;
    for i in 0..k {
        c *= ((n - i) as f64) / ((i + 1) as f64);
    }
    c.round() as u64
}

pub fn choose_upto_k(n: u64, k: u64) -> u64 {
    (1..=k).map(|i| choose_k(n, i)).sum()
}
