//! loo::psis — Pareto-smoothed importance sampling.
//!
//! Purpose
//! -------
//! Convert, for every observation `i`, the raw leave-one-out importance
//! ratios `r_s = 1 / p(y_i | θ_s)` into normalized, Pareto-smoothed log
//! weights, and record the Pareto shape diagnostic `k_hat_i`.
//!
//! Key behaviors
//! -------------
//! - Per column: center `lr = −log_lik` at its maximum, choose the tail
//!   size `M` from [`TailOptions`](crate::loo::options::TailOptions), fit a
//!   GPD to the exceedances of the `M` largest ratios over the largest
//!   non-tail ratio, and replace the tail by the GPD quantiles at
//!   `(j − ½)/M` shifted back by the threshold.
//! - Smoothed values are truncated at the largest raw ratio, then the
//!   whole vector is normalized to sum to one.
//! - Columns are independent; with the `parallel` feature and
//!   `LooOptions::parallel` they are dispatched on rayon and collected in
//!   column order.
//!
//! Invariants & assumptions
//! ------------------------
//! - Input is a validated [`PointwiseLogLik`] (finite, non-empty).
//! - Output weights are finite, non-negative and sum to 1 per column.
//! - Deterministic: repeated calls return bit-identical results, with or
//!   without parallelism.
//!
//! Edge cases
//! ----------
//! - Constant column: uniform weights, `k_hat = 0`, checked before the
//!   tail-size rule.
//! - `M < min_tail`: raw normalized weights, `k_hat = None`
//!   (`DegenerateTail`).
//! - Tied tail ratios or an undefined fit: raw tail kept, `k_hat = +∞`
//!   (`UnreliableEstimate`).
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use ndarray::Array2;

use crate::{
    loo::{
        diagnostics::{ParetoBucket, ParetoDiagnostic, ParetoTable},
        gpd::fit_gpd,
        options::LooOptions,
        pointwise::PointwiseLogLik,
    },
    numerical_stability::{TIE_TOL, is_constant, log_sum_exp},
};

/// SmoothedWeights — PSIS result for a single observation.
///
/// Fields
/// ------
/// - `log_weights`: normalized log weights, `log_sum_exp = 0`.
/// - `k_hat`: Pareto shape; `None` for a degenerate tail, `+∞` for an
///   undefined fit.
/// - `tail_len`: tail size `M` used (0 for a constant column).
/// - `n_eff`: `r_eff / Σ w²`.
#[derive(Debug, Clone, PartialEq)]
pub struct SmoothedWeights {
    pub log_weights: Vec<f64>,
    pub k_hat: Option<f64>,
    pub tail_len: usize,
    pub n_eff: f64,
}

/// PsisOutcome — smoothed weights and diagnostics for all observations.
///
/// Fields
/// ------
/// - `log_weights`: `Array2<f64>`
///   `S × N` normalized log weights, same layout as the log-likelihood.
/// - `diagnostics`: [`ParetoTable`]
#[derive(Debug, Clone, PartialEq)]
pub struct PsisOutcome {
    pub log_weights: Array2<f64>,
    pub diagnostics: ParetoTable,
}

impl PsisOutcome {
    /// Normalized weights on the natural scale.
    pub fn weights(&self) -> Array2<f64> {
        self.log_weights.mapv(f64::exp)
    }
}

/// Run PSIS on every observation.
///
/// Parameters
/// ----------
/// - `pointwise`: `&PointwiseLogLik`
///   Validated log-likelihood matrix with `r_eff`.
/// - `opts`: `&LooOptions`
///   Tail rule, GPD grid, thresholds and parallelism.
///
/// Returns
/// -------
/// `PsisOutcome`
///   Never fails; numerical problems are reported in the diagnostics.
pub fn psis(pointwise: &PointwiseLogLik, opts: &LooOptions) -> PsisOutcome {
    let log_lik = pointwise.log_lik();
    let r_eff = pointwise.relative_eff();
    let (n_draws, n_obs) = log_lik.dim();

    let smooth_column = |i: usize| {
        let log_ratios: Vec<f64> = log_lik.column(i).iter().map(|ll| -ll).collect();
        psis_smooth(&log_ratios, r_eff[i], opts)
    };

    #[cfg(feature = "parallel")]
    let columns: Vec<SmoothedWeights> = if opts.parallel {
        (0..n_obs).into_par_iter().map(smooth_column).collect()
    } else {
        (0..n_obs).map(smooth_column).collect()
    };
    #[cfg(not(feature = "parallel"))]
    let columns: Vec<SmoothedWeights> = (0..n_obs).map(smooth_column).collect();

    let mut log_weights = Array2::zeros((n_draws, n_obs));
    let mut rows = Vec::with_capacity(n_obs);
    for (i, column) in columns.into_iter().enumerate() {
        for (dst, src) in log_weights.column_mut(i).iter_mut().zip(&column.log_weights) {
            *dst = *src;
        }
        rows.push(ParetoDiagnostic {
            observation: i,
            k_hat: column.k_hat,
            tail_len: column.tail_len,
            n_eff: column.n_eff,
            bucket: ParetoBucket::classify(column.k_hat, &opts.thresholds),
        });
    }
    let diagnostics = ParetoTable::new(rows, opts.thresholds);
    log_summary(n_draws, &diagnostics);

    PsisOutcome { log_weights, diagnostics }
}

/// Pareto-smooth one vector of raw log importance ratios.
///
/// Parameters
/// ----------
/// - `log_ratios`: `&[f64]`
///   `−log p(y_i | θ_s)` for every draw `s`; finite, non-empty.
/// - `r_eff`: relative efficiency of the draws, `> 0`.
/// - `opts`: tail and GPD configuration.
///
/// Returns
/// -------
/// `SmoothedWeights`
pub fn psis_smooth(log_ratios: &[f64], r_eff: f64, opts: &LooOptions) -> SmoothedWeights {
    let n_draws = log_ratios.len();
    let max = log_ratios.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mut lw: Vec<f64> = log_ratios.iter().map(|lr| lr - max).collect();

    if is_constant(lw.iter().copied()) {
        let uniform = -(n_draws as f64).ln();
        return SmoothedWeights {
            log_weights: vec![uniform; n_draws],
            k_hat: Some(0.0),
            tail_len: 0,
            n_eff: r_eff * n_draws as f64,
        };
    }

    let tail_len = opts.tail.tail_len(n_draws, r_eff);
    let k_hat = if tail_len < opts.tail.min_tail {
        None
    } else {
        Some(smooth_tail(&mut lw, tail_len, opts))
    };

    for w in lw.iter_mut() {
        *w = w.min(0.0);
    }
    let norm = log_sum_exp(lw.iter().copied());
    for w in lw.iter_mut() {
        *w -= norm;
    }
    let sum_sq: f64 = lw.iter().map(|w| (2.0 * w).exp()).sum();

    SmoothedWeights { log_weights: lw, k_hat, tail_len, n_eff: r_eff / sum_sq }
}

/// Replace the `tail_len` largest entries of `lw` in place; returns `k_hat`.
fn smooth_tail(lw: &mut [f64], tail_len: usize, opts: &LooOptions) -> f64 {
    let n_draws = lw.len();
    let mut order: Vec<usize> = (0..n_draws).collect();
    order.sort_by(|&a, &b| lw[a].total_cmp(&lw[b]));
    let tail_idx = &order[n_draws - tail_len..];
    let cutoff = lw[order[n_draws - tail_len - 1]];

    let tail: Vec<f64> = tail_idx.iter().map(|&s| lw[s]).collect();
    if tail[tail_len - 1] - tail[0] <= TIE_TOL {
        return f64::INFINITY;
    }

    let exp_cutoff = cutoff.exp();
    let exceedances: Vec<f64> = tail.iter().map(|t| t.exp() - exp_cutoff).collect();
    let Some(fit) = fit_gpd(&exceedances, &opts.gpd) else {
        return f64::INFINITY;
    };

    let m = tail_len as f64;
    for (j, &s) in tail_idx.iter().enumerate() {
        let q = fit.quantile((j as f64 + 0.5) / m);
        lw[s] = (q + exp_cutoff).ln();
    }
    fit.k
}

fn log_summary(n_draws: usize, diagnostics: &ParetoTable) {
    let tails = diagnostics.rows().iter().map(|r| r.tail_len);
    log::debug!(
        "PSIS over {} observations with {n_draws} draws; tail sizes {}..={}.",
        diagnostics.len(),
        tails.clone().min().unwrap_or(0),
        tails.max().unwrap_or(0)
    );

    let degenerate = diagnostics.count(ParetoBucket::Undefined);
    let unreliable = diagnostics.unreliable().len();
    let ok = diagnostics.count(ParetoBucket::Ok);
    if degenerate + unreliable > 0 {
        let t = diagnostics.thresholds();
        log::warn!(
            "PSIS: {unreliable} of {} observations have Pareto k > {} and {degenerate} have \
             degenerate tails; LOO estimates for them are unreliable.",
            diagnostics.len(),
            t.ok
        );
    } else if ok > 0 {
        log::debug!("PSIS: {ok} observations have Pareto k in the ok range.");
    }
}
