//! loo::efficiency — relative MCMC efficiency of likelihood draws.
//!
//! Purpose
//! -------
//! Estimate, for each observation `i`, the relative efficiency
//! `r_eff_i = ESS_i / S` of the draws `p(y_i | θ_s)` on the likelihood
//! scale. PSIS uses `r_eff_i` to size the Pareto tail and to scale the
//! Monte Carlo error of `elpd_i`.
//!
//! Key behaviors
//! -------------
//! - Rows of the `S × N` matrix are grouped into chains by `chain_ids`;
//!   row order within a chain is iteration order. Chain labels only
//!   group rows, their numeric order is irrelevant.
//! - Per chain, the biased autocovariance
//!   `γ_t = (1/n) Σ_i (x_i − x̄)(x_{i+t} − x̄)` is averaged across chains.
//! - The multi-chain variance estimate adds the between-chain variance of
//!   chain means; autocorrelations `ρ_t = 1 − (W − γ̄_t) / var⁺`.
//! - Geyer's initial positive sequence truncates the sum over
//!   even/odd lag pairs, followed by the initial monotone sequence.
//! - `τ = max(−1 + 2 Σ_{t<T} ρ_t + ρ_T, 1 / log10(S))`, `ESS = S / τ`.
//!
//! Invariants & assumptions
//! ------------------------
//! - All chains must have equal length; otherwise `DimensionMismatch`.
//! - Columns are shifted by their maximum before exponentiation; ESS is
//!   scale-invariant so this only protects against underflow.
//! - Zero-variance columns and chains shorter than two draws yield
//!   `r_eff = 1`.
//!
//! Performance
//! -----------
//! - Autocovariances are computed lag by lag only up to the truncation
//!   point, so typical cost is O(S · T) per column with small `T`.
use std::collections::BTreeMap;

use ndarray::{Array1, ArrayView1, ArrayView2};

use crate::{
    draws::validation::check_equal_chain_lengths,
    loo::errors::{LooError, LooResult},
    numerical_stability::GENERAL_TOL,
};

/// Relative efficiency of every column of an `S × N` log-likelihood matrix.
///
/// Parameters
/// ----------
/// - `log_lik`: `ArrayView2<f64>`
///   Draws in rows, observations in columns.
/// - `chain_ids`: `&[usize]`
///   Chain label of each row (length `S`).
///
/// Returns
/// -------
/// `LooResult<Array1<f64>>`
///   `r_eff_i` per column.
///
/// Errors
/// ------
/// - `LooError::DimensionMismatch { what: "chain_ids", .. }` when
///   `chain_ids.len() != S`.
/// - `LooError::DimensionMismatch { what: "chain_length", .. }` when chains
///   differ in length.
pub fn relative_efficiency(log_lik: ArrayView2<'_, f64>, chain_ids: &[usize]) -> LooResult<Array1<f64>> {
    let rows_by_chain = group_rows(log_lik.nrows(), chain_ids)?;
    let r_eff = log_lik
        .columns()
        .into_iter()
        .map(|column| relative_eff_column(column, &rows_by_chain))
        .collect();
    Ok(r_eff)
}

/// Row indices of each chain in label order, after checking equal lengths.
pub(crate) fn group_rows(n_rows: usize, chain_ids: &[usize]) -> LooResult<Vec<Vec<usize>>> {
    if chain_ids.len() != n_rows {
        return Err(LooError::DimensionMismatch {
            what: "chain_ids",
            expected: n_rows,
            found: chain_ids.len(),
        });
    }
    let mut by_chain: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (row, &chain) in chain_ids.iter().enumerate() {
        by_chain.entry(chain).or_default().push(row);
    }
    let rows: Vec<Vec<usize>> = by_chain.into_values().collect();
    check_equal_chain_lengths(rows.iter().map(Vec::len))?;
    Ok(rows)
}

fn relative_eff_column(column: ArrayView1<'_, f64>, rows_by_chain: &[Vec<usize>]) -> f64 {
    let max = column.fold(f64::NEG_INFINITY, |acc, &x| acc.max(x));
    let chains: Vec<Vec<f64>> = rows_by_chain
        .iter()
        .map(|rows| rows.iter().map(|&r| (column[r] - max).exp()).collect())
        .collect();
    let total = chains.iter().map(Vec::len).sum::<usize>() as f64;
    match effective_sample_size(&chains) {
        Some(ess) => ess / total,
        None => 1.0,
    }
}

/// Multi-chain effective sample size with Geyer truncation.
///
/// Parameters
/// ----------
/// - `chains`: `&[Vec<f64>]`
///   Equal-length chains, each in iteration order.
///
/// Returns
/// -------
/// `Option<f64>`
///   `None` when there are no chains, chains have fewer than two draws,
///   or the pooled variance is numerically zero.
///
/// Notes
/// -----
/// - The `1 / log10(S)` floor on `τ` caps ESS at `S · log10(S)` for
///   antithetic chains.
pub fn effective_sample_size(chains: &[Vec<f64>]) -> Option<f64> {
    let m = chains.len();
    let n = chains.first()?.len();
    if n < 2 {
        return None;
    }
    let means: Vec<f64> = chains.iter().map(|c| c.iter().sum::<f64>() / n as f64).collect();
    let mean_acov = |lag: usize| -> f64 {
        chains
            .iter()
            .zip(&means)
            .map(|(c, &mu)| autocovariance(c, mu, lag))
            .sum::<f64>()
            / m as f64
    };

    let nf = n as f64;
    let mean_var = mean_acov(0) * nf / (nf - 1.0);
    let mut var_plus = mean_var * (nf - 1.0) / nf;
    if m > 1 {
        let grand = means.iter().sum::<f64>() / m as f64;
        var_plus += means.iter().map(|mu| (mu - grand).powi(2)).sum::<f64>() / (m - 1) as f64;
    }
    if !(var_plus > GENERAL_TOL * GENERAL_TOL) {
        return None;
    }
    let rho = |lag: usize| 1.0 - (mean_var - mean_acov(lag)) / var_plus;

    // Initial positive sequence.
    let mut rho_hat = vec![0.0; n];
    let mut t = 0;
    let mut even = 1.0;
    let mut odd = rho(1);
    rho_hat[0] = even;
    rho_hat[1] = odd;
    while t + 5 < n && even + odd > 0.0 {
        t += 2;
        even = rho(t);
        odd = rho(t + 1);
        if even + odd >= 0.0 {
            rho_hat[t] = even;
            rho_hat[t + 1] = odd;
        }
    }
    let max_t = t;
    if even > 0.0 {
        rho_hat[max_t] = even;
    }

    // Initial monotone sequence.
    let mut t = 0;
    while t + 4 <= max_t {
        t += 2;
        let previous = rho_hat[t - 2] + rho_hat[t - 1];
        if rho_hat[t] + rho_hat[t + 1] > previous {
            rho_hat[t] = previous / 2.0;
            rho_hat[t + 1] = rho_hat[t];
        }
    }

    let total = (m * n) as f64;
    let head: f64 = rho_hat[..max_t.max(1)].iter().sum();
    let tau = (-1.0 + 2.0 * head + rho_hat[max_t]).max(1.0 / total.log10());
    Some(total / tau)
}

fn autocovariance(chain: &[f64], mean: f64, lag: usize) -> f64 {
    let n = chain.len();
    if lag >= n {
        return 0.0;
    }
    let sum: f64 =
        chain[..n - lag].iter().zip(&chain[lag..]).map(|(a, b)| (a - mean) * (b - mean)).sum();
    sum / n as f64
}
