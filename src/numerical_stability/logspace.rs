//! Log-space reductions.
//!
//! Provides max-shifted implementations of `log Σ exp(x)` and friends.
//! Exponentiating raw log-likelihoods directly underflows to zero for
//! values below roughly `-745`, so every routine here subtracts the
//! maximum first and adds it back at the end.
//!
//! # Provided items
//! - [`GENERAL_TOL`]: absolute tolerance for "numerically zero" spreads.
//! - [`TIE_TOL`]: tolerance used to detect tied tails in PSIS.
//! - [`log_sum_exp`], [`log_mean_exp`], [`log_sum_exp_weighted`].
//! - [`is_constant`]: spread test used for degenerate posteriors.

/// Absolute tolerance below which a spread of values is treated as zero.
pub const GENERAL_TOL: f64 = 1e-12;

/// Relative tolerance for detecting a tail whose values are all tied.
///
/// Matches `f64::EPSILON / 100`, the cutoff below which a generalized
/// Pareto fit has no information to work with.
pub const TIE_TOL: f64 = f64::EPSILON / 100.0;

/// Numerically stable `log Σ_i exp(x_i)`.
///
/// # Parameters
/// - `values`: any iterator of `f64`. Values may be `-∞`.
///
/// # Returns
/// - `-∞` for an empty iterator or when every value is `-∞`.
/// - Otherwise `m + ln Σ exp(x_i − m)` with `m = max_i x_i`.
pub fn log_sum_exp<I>(values: I) -> f64
where
    I: IntoIterator<Item = f64>,
    I::IntoIter: Clone,
{
    let iter = values.into_iter();
    let max = iter.clone().fold(f64::NEG_INFINITY, f64::max);
    if max == f64::NEG_INFINITY {
        return f64::NEG_INFINITY;
    }
    let sum: f64 = iter.map(|x| (x - max).exp()).sum();
    max + sum.ln()
}

/// Numerically stable `log( (1/n) Σ_i exp(x_i) )`.
///
/// Returns `-∞` for an empty iterator.
pub fn log_mean_exp<I>(values: I) -> f64
where
    I: IntoIterator<Item = f64>,
    I::IntoIter: Clone + ExactSizeIterator,
{
    let iter = values.into_iter();
    let n = iter.len();
    if n == 0 {
        return f64::NEG_INFINITY;
    }
    log_sum_exp(iter) - (n as f64).ln()
}

/// Numerically stable `log Σ_i exp(lw_i + x_i)`.
///
/// Used to evaluate `log Σ_s w_s · p(y_i | θ_s)` from log weights and
/// log-likelihoods without leaving log space.
///
/// # Panics
/// - Panics in debug builds if the two slices differ in length; callers
///   pass columns of matrices that were shape-checked at construction.
pub fn log_sum_exp_weighted(log_weights: &[f64], log_values: &[f64]) -> f64 {
    debug_assert_eq!(log_weights.len(), log_values.len());
    log_sum_exp(log_weights.iter().zip(log_values).map(|(lw, lv)| lw + lv))
}

/// Whether every value lies within [`GENERAL_TOL`] of the first one.
///
/// An empty sequence is treated as constant.
pub fn is_constant<I>(values: I) -> bool
where
    I: IntoIterator<Item = f64>,
{
    let mut iter = values.into_iter();
    let Some(first) = iter.next() else {
        return true;
    };
    iter.all(|x| (x - first).abs() <= GENERAL_TOL)
}
