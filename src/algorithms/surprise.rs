//! Discrete and asymptotic Surprise
//!
//! Surprise scores a partition by how unlikely its concentration of edges
//! inside clusters is under a hypergeometric null model. With
//!
//! - `p`: vertex pairs in the graph, `n(n-1)/2`
//! - `pi`: vertex pairs inside clusters
//! - `m`: edges in the graph
//! - `mi`: edges inside clusters
//!
//! the discrete score is
//!
//! ```text
//! S = -log10( sum_{j = mi}^{min(pi, m)} C(pi, j) C(p - pi, m - j) / C(p, m) )
//! ```
//!
//! Terms are astronomically small for real graphs, so the sum is accumulated
//! in log10 space and truncated once new terms stop contributing.
//!
//! # References
//! - Aldecoa & Marín (2011): "Deciphering network community structure by Surprise"
//! - Traag, Aldecoa & Delvenne (2015): "Detecting communities using asymptotical Surprise"

use std::f64::consts::{LN_10, PI};
use thiserror::Error;

/// The tail sum stops once a new term is below `10^TAIL_CUTOFF_LOG10` of the running sum
pub const TAIL_CUTOFF_LOG10: f64 = -4.0;

/// Above this argument log-factorials switch from exact sums to Stirling's series
pub const STIRLING_THRESHOLD: i64 = 1000;

/// Inconsistent `(p, pi, m, mi)` counts
///
/// These can only come from broken intracluster bookkeeping, so they are
/// fatal for the evaluation that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SurpriseError {
    /// A count went negative
    #[error("negative {name} = {value}: pair or edge count overflowed")]
    NegativeCount {
        /// Which of `p`, `pi`, `m`, `mi`
        name: &'static str,
        /// The offending value
        value: i64,
    },

    /// `pi > p`
    #[error("intracluster pairs exceed total pairs: pi = {pi} > p = {p}")]
    PairsExceedTotal {
        /// Total pairs
        p: i64,
        /// Intracluster pairs
        pi: i64,
    },

    /// `mi > m`
    #[error("intracluster edges exceed total edges: mi = {mi} > m = {m}")]
    EdgesExceedTotal {
        /// Total edges
        m: i64,
        /// Intracluster edges
        mi: i64,
    },

    /// `m - mi > p - pi`
    #[error("intercluster edges exceed intercluster pairs: m - mi = {} > p - pi = {}", .m - .mi, .p - .pi)]
    InterclusterOverflow {
        /// Total pairs
        p: i64,
        /// Intracluster pairs
        pi: i64,
        /// Total edges
        m: i64,
        /// Intracluster edges
        mi: i64,
    },

    /// `mi > pi`
    #[error("intracluster edges exceed intracluster pairs: mi = {mi} > pi = {pi}")]
    EdgesExceedPairs {
        /// Intracluster pairs
        pi: i64,
        /// Intracluster edges
        mi: i64,
    },
}

/// Validate a `(p, pi, m, mi)` quadruple
///
/// Returns `Ok(false)` for the degenerate cases whose score is defined as 0
/// (`mi == 0`, `pi == 0`, or `m - mi == p - pi`), `Ok(true)` when the tail sum
/// has to be computed.
///
/// # Errors
///
/// Returns [`SurpriseError`] when the counts are mutually inconsistent
pub fn check_arguments(p: i64, pi: i64, m: i64, mi: i64) -> Result<bool, SurpriseError> {
    for (name, value) in [("mi", mi), ("m", m), ("pi", pi), ("p", p)] {
        if value < 0 {
            return Err(SurpriseError::NegativeCount { name, value });
        }
    }
    if pi > p {
        return Err(SurpriseError::PairsExceedTotal { p, pi });
    }
    if mi > m {
        return Err(SurpriseError::EdgesExceedTotal { m, mi });
    }
    if m - mi > p - pi {
        return Err(SurpriseError::InterclusterOverflow { p, pi, m, mi });
    }
    if mi > pi {
        return Err(SurpriseError::EdgesExceedPairs { pi, mi });
    }

    Ok(mi != 0 && pi != 0 && m - mi != p - pi)
}

/// Discrete Surprise of a `(p, pi, m, mi)` quadruple
///
/// # Errors
///
/// Returns [`SurpriseError`] when the counts are inconsistent
///
/// # Example
///
/// ```
/// use trueno_fagso::algorithms::surprise::compute_surprise;
///
/// // One intracluster pair that is an edge, 7 edges among 15 pairs
/// let s = compute_surprise(15, 1, 7, 1).unwrap();
/// assert!((s - -(7.0_f64 / 15.0).log10()).abs() < 1e-12);
///
/// assert_eq!(compute_surprise(15, 0, 7, 0).unwrap(), 0.0);
/// assert!(compute_surprise(10, 11, 5, 2).is_err());
/// ```
pub fn compute_surprise(p: i64, pi: i64, m: i64, mi: i64) -> Result<f64, SurpriseError> {
    if !check_arguments(p, pi, m, mi)? {
        return Ok(0.0);
    }

    let upper = pi.min(m);
    let mut j = mi;
    let mut log_p = log_hyper_probability(p, pi, m, j);
    while j < upper {
        j += 1;
        let next = log_hyper_probability(p, pi, m, j);
        if accumulate_log10(next, &mut log_p) {
            break;
        }
    }

    // rounding can push the summed probability a hair above 1
    Ok((-log_p).max(0.0))
}

/// Asymptotic Surprise, `m * D(mi/m || pi/p)`, expressed in log10 units
///
/// Shares the validation and degenerate cases of [`compute_surprise`].
///
/// # Errors
///
/// Returns [`SurpriseError`] when the counts are inconsistent
#[allow(clippy::cast_precision_loss)]
pub fn compute_asymptotic_surprise(p: i64, pi: i64, m: i64, mi: i64) -> Result<f64, SurpriseError> {
    if !check_arguments(p, pi, m, mi)? {
        return Ok(0.0);
    }
    let q = mi as f64 / m as f64;
    let q_expected = pi as f64 / p as f64;
    Ok(m as f64 * kl_divergence(q, q_expected) / LN_10)
}

/// Binary Kullback-Leibler divergence `D(q || p)` in nats
///
/// Terms with a zero probability on either side are dropped.
#[must_use]
pub fn kl_divergence(q: f64, p: f64) -> f64 {
    let mut divergence = 0.0;
    if q > 0.0 && p > 0.0 {
        divergence += q * (q / p).ln();
    }
    if q < 1.0 && p < 1.0 {
        divergence += (1.0 - q) * ((1.0 - q) / (1.0 - p)).ln();
    }
    divergence
}

/// log10 of one hypergeometric term `C(pi, j) C(p - pi, m - j) / C(p, m)`
#[must_use]
pub fn log_hyper_probability(p: i64, pi: i64, m: i64, j: i64) -> f64 {
    (log_binomial(pi, j) + log_binomial(p - pi, m - j) - log_binomial(p, m)) / LN_10
}

/// Natural log of the binomial coefficient `C(n, k)`, `0 <= k <= n`
///
/// Exact log sums for small arguments; when both `n` and `k` exceed
/// [`STIRLING_THRESHOLD`] all three factorials use Stirling's series.
#[must_use]
pub fn log_binomial(n: i64, k: i64) -> f64 {
    if k == 0 || k == n {
        return 0.0;
    }
    if n > STIRLING_THRESHOLD && k > STIRLING_THRESHOLD {
        return log_factorial_stirling(n) - log_factorial_stirling(k) - log_factorial_stirling(n - k);
    }

    // C(n, k) = n! / (t! (n - t)!) with t the larger of k, n - k
    let t = k.max(n - k);
    sum_ln_range(t + 1, n) - log_factorial(n - t)
}

/// `ln(n!)`, exact up to [`STIRLING_THRESHOLD`]
#[must_use]
pub fn log_factorial(n: i64) -> f64 {
    if n > STIRLING_THRESHOLD {
        log_factorial_stirling(n)
    } else {
        sum_ln_range(2, n)
    }
}

/// Ramanujan's refinement of Stirling's approximation to `ln(n!)`
#[allow(clippy::cast_precision_loss)]
fn log_factorial_stirling(n: i64) -> f64 {
    if n <= 1 {
        return 0.0;
    }
    let n = n as f64;
    n * n.ln() - n + (n * (1.0 + 4.0 * n * (1.0 + 2.0 * n))).ln() / 6.0 + PI.ln() / 2.0
}

/// `sum_{i = min}^{max} ln(i)`
#[allow(clippy::cast_precision_loss)]
fn sum_ln_range(min: i64, max: i64) -> f64 {
    (min.max(1)..=max).map(|i| (i as f64).ln()).sum()
}

/// Fold `next` into the running log10-sum `log_p`
///
/// Returns `true` once the new term no longer moves the sum.
fn accumulate_log10(next: f64, log_p: &mut f64) -> bool {
    let (hi, lo) = if next > *log_p {
        (next, *log_p)
    } else {
        (*log_p, next)
    };
    *log_p = hi + (10_f64.powf(lo - hi)).ln_1p() / LN_10;
    next - *log_p < TAIL_CUTOFF_LOG10
}
