//! loo::gpd — generalized Pareto fit for importance-ratio tails.
//!
//! Purpose
//! -------
//! Fit a generalized Pareto distribution (GPD) with location 0 to tail
//! exceedances using the Zhang–Stephens profile-likelihood grid, and
//! evaluate its quantile function for tail smoothing.
//!
//! Key behaviors
//! -------------
//! - [`fit_gpd`] evaluates `m = min_grid_points + ⌊sqrt(n)⌋` candidate
//!   values of `θ = −k/σ` anchored at the first-quartile exceedance,
//!   averages them with their normalized profile likelihoods, and
//!   recovers `(k, σ)` from the averaged `θ`.
//! - Optional weakly informative shrinkage `k ← (n·k + 5) / (n + 10)`.
//! - [`gpd_quantile`] is `σ·((1 − p)^(−k) − 1)/k`, with the exponential
//!   limit `−σ·ln(1 − p)` as `k → 0`.
//!
//! Invariants & assumptions
//! ------------------------
//! - Exceedances are non-negative and sorted ascending.
//! - The fit is a bounded grid evaluation, no iteration or convergence
//!   criterion.
//! - An undefined fit (fewer than one exceedance, non-positive quartile
//!   anchor, all candidates infeasible, non-finite shape or scale)
//!   returns `None`; PSIS treats that as `k_hat = +∞`.
//!
//! Conventions
//! -----------
//! - Sign convention: `k > 0` is a heavy (Pareto-type) tail, `k = 0`
//!   exponential, `k < 0` bounded.
use crate::{loo::options::GpdOptions, numerical_stability::log_sum_exp};

/// Threshold on `|k|` below which the exponential quantile is used.
const SHAPE_ZERO_TOL: f64 = 1e-12;

/// GpdFit — fitted shape and scale.
///
/// Fields
/// ------
/// - `k`: `f64`
///   Shape (after optional shrinkage). Diagnostic `k_hat` of PSIS.
/// - `sigma`: `f64`
///   Scale, strictly positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpdFit {
    pub k: f64,
    pub sigma: f64,
}

impl GpdFit {
    /// Quantile at probability `p ∈ [0, 1)`.
    pub fn quantile(&self, p: f64) -> f64 {
        gpd_quantile(p, self.k, self.sigma)
    }
}

/// Fit a GPD to sorted, non-negative exceedances.
///
/// Parameters
/// ----------
/// - `x`: `&[f64]`
///   Exceedances over the tail threshold, ascending.
/// - `opts`: `&GpdOptions`
///   Grid size, prior scale, and shrinkage toggle.
///
/// Returns
/// -------
/// `Option<GpdFit>`
///   `None` when the fit is undefined (see module docs).
///
/// Notes
/// -----
/// - For each candidate `θ_j = 1/x_max + (1 − sqrt(m/(j − ½))) / (prior·x*)`
///   the profile log-likelihood is `n·(ln(−θ/k(θ)) − k(θ) − 1)` with
///   `k(θ) = mean(ln(1 − θ·x))`.
pub fn fit_gpd(x: &[f64], opts: &GpdOptions) -> Option<GpdFit> {
    let n = x.len();
    let x_max = *x.last()?;
    let quartile = ((n as f64 / 4.0 + 0.5).floor() as usize).max(1);
    let x_star = x[quartile - 1];
    if !(x_star > 0.0 && x_max > 0.0) {
        return None;
    }

    let nf = n as f64;
    let grid = opts.min_grid_points + nf.sqrt().floor() as usize;
    let m = grid as f64;
    let theta: Vec<f64> = (1..=grid)
        .map(|j| 1.0 / x_max + (1.0 - (m / (j as f64 - 0.5)).sqrt()) / opts.prior_scale / x_star)
        .collect();
    let log_lik: Vec<f64> = theta
        .iter()
        .map(|&t| {
            let l = nf * profile_log_lik(t, x);
            if l.is_finite() { l } else { f64::NEG_INFINITY }
        })
        .collect();

    let norm = log_sum_exp(log_lik.iter().copied());
    if !norm.is_finite() {
        return None;
    }
    let theta_hat: f64 = theta.iter().zip(&log_lik).map(|(t, l)| t * (l - norm).exp()).sum();

    let mut k = x.iter().map(|xi| (-theta_hat * xi).ln_1p()).sum::<f64>() / nf;
    let sigma = -k / theta_hat;
    if opts.weakly_informative {
        k = (k * nf + 5.0) / (nf + 10.0);
    }
    if !(k.is_finite() && sigma.is_finite() && sigma > 0.0) {
        return None;
    }
    Some(GpdFit { k, sigma })
}

fn profile_log_lik(theta: f64, x: &[f64]) -> f64 {
    let a = -theta;
    let k = x.iter().map(|xi| (a * xi).ln_1p()).sum::<f64>() / x.len() as f64;
    (a / k).ln() - k - 1.0
}

/// GPD quantile function with location 0.
///
/// Parameters
/// ----------
/// - `p`: probability in `[0, 1)`.
/// - `k`: shape.
/// - `sigma`: scale, `> 0`.
///
/// Returns
/// -------
/// `f64`
///   `NaN` when `sigma` is not strictly positive.
pub fn gpd_quantile(p: f64, k: f64, sigma: f64) -> f64 {
    if !(sigma > 0.0) {
        return f64::NAN;
    }
    let log_survival = (-p).ln_1p();
    if k.abs() < SHAPE_ZERO_TOL {
        -sigma * log_survival
    } else {
        sigma * (-k * log_survival).exp_m1() / k
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Closed-form quantiles for k = 0 and k = 0.5.
    // - Shape recovery on exact quantile samples of known GPDs.
    // - The weakly informative shrinkage formula.
    // - Undefined fits (zero quartile anchor, empty input).
    // -------------------------------------------------------------------------

    fn gpd_sample(n: usize, k: f64, sigma: f64) -> Vec<f64> {
        (1..=n).map(|j| gpd_quantile((j as f64 - 0.5) / n as f64, k, sigma)).collect()
    }

    fn no_prior() -> GpdOptions {
        GpdOptions { weakly_informative: false, ..GpdOptions::default() }
    }

    #[test]
    fn quantile_matches_closed_forms() {
        assert_relative_eq!(gpd_quantile(0.5, 0.0, 1.0), std::f64::consts::LN_2, epsilon = 1e-14);
        assert_relative_eq!(gpd_quantile(0.5, 0.5, 1.0), 2.0 * (2.0_f64.sqrt() - 1.0), epsilon = 1e-12);
        assert_relative_eq!(gpd_quantile(0.75, 0.5, 2.0), 2.0 * (2.0 - 1.0) / 0.5, epsilon = 1e-12);
        assert!(gpd_quantile(0.5, 0.5, 0.0).is_nan());
    }

    #[test]
    // Purpose
    // -------
    // Check that the grid fit recovers known shapes from noiseless samples.
    //
    // Given
    // -----
    // - 200 exact quantiles of GPD(k = 0, σ = 1) and GPD(k = 0.5, σ = 1).
    //
    // Expect
    // ------
    // - k within 0.1 of truth and σ within 20% of truth, without shrinkage.
    fn fit_recovers_known_shapes() {
        for &k_true in &[0.0, 0.5] {
            // Arrange
            let x = gpd_sample(200, k_true, 1.0);

            // Act
            let fit = fit_gpd(&x, &no_prior()).expect("fit should be defined");

            // Assert
            assert!((fit.k - k_true).abs() < 0.1, "k_true = {k_true}, k = {}", fit.k);
            assert!((fit.sigma - 1.0).abs() < 0.2, "sigma = {}", fit.sigma);
        }
    }

    #[test]
    // Purpose
    // -------
    // Verify the weakly informative prior is the documented affine shrinkage.
    //
    // Given
    // -----
    // - The same 50-point sample fitted with and without shrinkage.
    //
    // Expect
    // ------
    // - k_wip = (50·k_raw + 5) / 60 and identical σ.
    fn weakly_informative_prior_shrinks_toward_half() {
        // Arrange
        let x = gpd_sample(50, 0.2, 1.5);

        // Act
        let raw = fit_gpd(&x, &no_prior()).unwrap();
        let wip = fit_gpd(&x, &GpdOptions::default()).unwrap();

        // Assert
        assert_relative_eq!(wip.k, (50.0 * raw.k + 5.0) / 60.0, epsilon = 1e-12);
        assert_relative_eq!(wip.sigma, raw.sigma, epsilon = 1e-12);
    }

    #[test]
    fn fit_is_undefined_without_quartile_spread() {
        assert_eq!(fit_gpd(&[0.0, 0.0, 0.0, 0.0, 1.0, 2.0], &GpdOptions::default()), None);
        assert_eq!(fit_gpd(&[], &GpdOptions::default()), None);
    }
}
