//! loo::aggregate — PSIS-LOO expected log predictive density.
//!
//! Purpose
//! -------
//! Combine the smoothed importance weights with the log-likelihood into
//! pointwise and total leave-one-out estimates, their standard errors and
//! the effective number of parameters.
//!
//! Key behaviors
//! -------------
//! - `elpd_i = log Σ_s w_{s,i} · p(y_i | θ_s)`, evaluated in log space.
//! - `lppd_i = log mean_s p(y_i | θ_s)`, `p_loo_i = lppd_i − elpd_i`.
//! - Totals are sums over observations; standard errors are
//!   `sqrt(N · var_i(·))` with the `N − 1` sample variance.
//! - `looic = −2 · elpd_loo`, `se_looic = 2 · se_elpd_loo`.
//! - Monte Carlo SE of `elpd_i` by the delta method on the weighted mean
//!   likelihood, divided by `sqrt(r_eff_i)`.
//!
//! Invariants & assumptions
//! ------------------------
//! - A [`LooOutcome`] is immutable once built and carries the label of
//!   the model it belongs to.
//! - Unreliable `k_hat` values are reported through
//!   [`LooOutcome::warnings`]; they never abort the computation nor drop
//!   observations from the totals.
//! - With a single observation the standard errors are `NaN`.
//!
//! Downstream usage
//! ----------------
//! - [`compare`](crate::loo::compare::compare) differences two outcomes
//!   observation by observation.
use std::fmt;

use ndarray::{Array1, ArrayView1};
use statrs::statistics::Statistics;

use crate::{
    draws::DrawStore,
    loo::{
        diagnostics::{ParetoBucket, ParetoTable, PsisWarning},
        errors::{LooError, LooResult},
        options::LooOptions,
        pointwise::PointwiseLogLik,
        psis::{PsisOutcome, psis},
    },
    numerical_stability::{log_mean_exp, log_sum_exp_weighted},
};

/// Label given to outcomes that were not named with [`LooOutcome::with_model`].
pub const DEFAULT_MODEL: &str = "model";

/// PointwiseLoo — per-observation LOO quantities.
///
/// Fields
/// ------
/// - `elpd`: `elpd_i`.
/// - `lppd`: in-sample `lppd_i`.
/// - `p_loo`: `lppd_i − elpd_i`.
/// - `mcse_elpd`: Monte Carlo SE of `elpd_i`.
#[derive(Debug, Clone, PartialEq)]
pub struct PointwiseLoo {
    pub elpd: Array1<f64>,
    pub lppd: Array1<f64>,
    pub p_loo: Array1<f64>,
    pub mcse_elpd: Array1<f64>,
}

/// LooOutcome — PSIS-LOO estimates for one model.
///
/// Fields
/// ------
/// - `elpd_loo`, `se_elpd_loo`: total expected log predictive density and SE.
/// - `p_loo`, `se_p_loo`: effective number of parameters and SE.
/// - `looic`, `se_looic`: information-criterion scale (`−2·elpd_loo`).
/// - `mcse_elpd_loo`: Monte Carlo SE of `elpd_loo`.
/// - `pointwise`: [`PointwiseLoo`].
/// - `diagnostics`: per-observation Pareto-k table.
#[derive(Debug, Clone, PartialEq)]
pub struct LooOutcome {
    model: String,
    n_draws: usize,
    pub elpd_loo: f64,
    pub se_elpd_loo: f64,
    pub p_loo: f64,
    pub se_p_loo: f64,
    pub looic: f64,
    pub se_looic: f64,
    pub mcse_elpd_loo: f64,
    pub pointwise: PointwiseLoo,
    pub diagnostics: ParetoTable,
}

/// Compute PSIS-LOO for a validated log-likelihood matrix.
///
/// Parameters
/// ----------
/// - `pointwise`: `&PointwiseLogLik`
/// - `opts`: `&LooOptions`
///
/// Returns
/// -------
/// `LooOutcome`
///   Labelled [`DEFAULT_MODEL`]; rename with [`LooOutcome::with_model`].
///
/// Examples
/// --------
/// ```rust
/// # use ndarray::Array2;
/// # use rust_loo::loo::{LooOptions, PointwiseLogLik, loo};
/// let ll = Array2::from_elem((8, 3), -1.0);
/// let pw = PointwiseLogLik::from_matrix(ll, 2).unwrap();
/// let out = loo(&pw, &LooOptions::default());
/// assert!((out.elpd_loo + 3.0).abs() < 1e-12);
/// ```
pub fn loo(pointwise: &PointwiseLogLik, opts: &LooOptions) -> LooOutcome {
    let smoothed = psis(pointwise, opts);
    LooOutcome::assemble(pointwise, smoothed)
}

impl LooOutcome {
    /// Extract the log-likelihood from a draw store and run PSIS-LOO.
    ///
    /// Errors
    /// ------
    /// - Any error from [`PointwiseLogLik::from_draws`].
    pub fn from_draws(store: &DrawStore, opts: &LooOptions) -> LooResult<Self> {
        let pointwise = PointwiseLogLik::from_draws(store)?;
        Ok(loo(&pointwise, opts))
    }

    /// Aggregate previously computed PSIS weights.
    ///
    /// Errors
    /// ------
    /// - `LooError::DimensionMismatch { what: "log_weights", .. }` when the
    ///   weight matrix shape differs from the log-likelihood matrix.
    pub fn from_psis(pointwise: &PointwiseLogLik, smoothed: PsisOutcome) -> LooResult<Self> {
        let (s, n) = smoothed.log_weights.dim();
        if (s, n) != pointwise.log_lik().dim() {
            let found = if n != pointwise.n_obs() { n } else { s };
            let expected = if n != pointwise.n_obs() { pointwise.n_obs() } else { pointwise.n_draws() };
            return Err(LooError::DimensionMismatch { what: "log_weights", expected, found });
        }
        Ok(Self::assemble(pointwise, smoothed))
    }

    fn assemble(pointwise: &PointwiseLogLik, smoothed: PsisOutcome) -> Self {
        let log_lik = pointwise.log_lik();
        let r_eff = pointwise.relative_eff();
        let n_obs = pointwise.n_obs();

        let mut elpd = Array1::zeros(n_obs);
        let mut lppd = Array1::zeros(n_obs);
        let mut mcse_elpd = Array1::zeros(n_obs);
        for i in 0..n_obs {
            let ll = log_lik.column(i);
            let lw = smoothed.log_weights.column(i);
            elpd[i] = log_sum_exp_weighted(&lw.to_vec(), &ll.to_vec());
            lppd[i] = log_mean_exp(ll.iter().copied());
            mcse_elpd[i] = mcse_elpd_i(ll, lw, r_eff[i]);
        }
        let p_loo = &lppd - &elpd;

        let elpd_loo = elpd.sum();
        let se_elpd_loo = se_of_total(elpd.view());
        LooOutcome {
            model: DEFAULT_MODEL.to_string(),
            n_draws: pointwise.n_draws(),
            elpd_loo,
            se_elpd_loo,
            p_loo: p_loo.sum(),
            se_p_loo: se_of_total(p_loo.view()),
            looic: -2.0 * elpd_loo,
            se_looic: 2.0 * se_elpd_loo,
            mcse_elpd_loo: mcse_elpd.mapv(|m: f64| m * m).sum().sqrt(),
            pointwise: PointwiseLoo { elpd, lppd, p_loo, mcse_elpd },
            diagnostics: smoothed.diagnostics,
        }
    }

    /// Copy of `self` labelled `model`.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Number of observations `N`.
    pub fn n_obs(&self) -> usize {
        self.pointwise.elpd.len()
    }

    /// Number of draws `S` the estimate was computed from.
    pub fn n_draws(&self) -> usize {
        self.n_draws
    }

    /// Degenerate-tail and unreliable-estimate warnings.
    pub fn warnings(&self) -> Vec<PsisWarning> {
        self.diagnostics.warnings()
    }

    /// Observations whose `k_hat` exceeds the `ok` threshold; candidates
    /// for an exact refit without that observation.
    pub fn unreliable_observations(&self) -> Vec<usize> {
        self.diagnostics.unreliable()
    }
}

/// `sqrt(N · var(values))`, the SE of a sum of pointwise contributions.
///
/// `NaN` for fewer than two values.
pub(crate) fn se_of_total(values: ArrayView1<'_, f64>) -> f64 {
    let n = values.len() as f64;
    (n * values.iter().variance()).sqrt()
}

/// Delta-method Monte Carlo SE of `elpd_i`.
fn mcse_elpd_i(log_lik: ArrayView1<'_, f64>, log_weights: ArrayView1<'_, f64>, r_eff: f64) -> f64 {
    let shift = log_lik.fold(f64::NEG_INFINITY, |acc, &l| acc.max(l));
    let lik: Vec<f64> = log_lik.iter().map(|l| (l - shift).exp()).collect();
    let w: Vec<f64> = log_weights.iter().map(|lw| lw.exp()).collect();
    let e: f64 = w.iter().zip(&lik).map(|(w, p)| w * p).sum();
    let var: f64 = w.iter().zip(&lik).map(|(w, p)| w * w * (p - e).powi(2)).sum::<f64>() / r_eff;
    var.sqrt() / e
}

impl fmt::Display for LooOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Computed from {} by {} log-likelihood matrix (model '{}').",
            self.n_draws,
            self.n_obs(),
            self.model
        )?;
        writeln!(f)?;
        writeln!(f, "{:<10} {:>10} {:>8}", "", "Estimate", "SE")?;
        writeln!(f, "{:<10} {:>10.1} {:>8.1}", "elpd_loo", self.elpd_loo, self.se_elpd_loo)?;
        writeln!(f, "{:<10} {:>10.1} {:>8.1}", "p_loo", self.p_loo, self.se_p_loo)?;
        writeln!(f, "{:<10} {:>10.1} {:>8.1}", "looic", self.looic, self.se_looic)?;
        writeln!(f, "------")?;
        writeln!(f, "MCSE of elpd_loo is {:.1}.", self.mcse_elpd_loo)?;

        let good = self.diagnostics.thresholds().good;
        if self.diagnostics.count(ParetoBucket::Good) == self.n_obs() {
            write!(f, "All Pareto k estimates are good (k < {good}).")
        } else {
            writeln!(f)?;
            write!(f, "{}", self.diagnostics)
        }
    }
}
