//! loo::pointwise — validated pointwise log-likelihood input.
//!
//! Purpose
//! -------
//! Turn sampler output into the `S × N` log-likelihood matrix consumed by
//! PSIS, together with the chain membership of each row and the
//! per-observation relative efficiency `r_eff`.
//!
//! Key behaviors
//! -------------
//! - [`PointwiseLogLik::from_draws`] extracts the matrix from a
//!   [`DrawStore`] (chain-major rows) and requires equal chain lengths.
//! - [`PointwiseLogLik::from_matrix`] / [`PointwiseLogLik::from_matrix_with_chain_ids`]
//!   accept a matrix the caller already holds.
//! - [`PointwiseLogLik::with_relative_eff`] replaces the estimated `r_eff`
//!   with caller-supplied values.
//!
//! Invariants & assumptions
//! ------------------------
//! - `S ≥ 1`, `N ≥ 1`, every entry finite.
//! - All chains have the same number of draws.
//! - `r_eff` has length `N` with finite, strictly positive entries.
//!
//! Downstream usage
//! ----------------
//! - [`psis`](crate::loo::psis::psis) and [`loo`](crate::loo::aggregate::loo)
//!   take a `&PointwiseLogLik`; they never revalidate.
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

use crate::{
    draws::DrawStore,
    loo::{
        efficiency::{group_rows, relative_efficiency},
        errors::{LooError, LooResult},
    },
};

/// PointwiseLogLik — `S × N` log-likelihood matrix with chain structure.
///
/// Fields
/// ------
/// - `log_lik`: `Array2<f64>`
///   `log p(y_i | θ_s)`, draws in rows (chain-major), observations in
///   columns.
/// - `chain_ids`: `Vec<usize>`
///   Chain label of each row.
/// - `r_eff`: `Array1<f64>`
///   Relative efficiency per observation.
#[derive(Debug, Clone, PartialEq)]
pub struct PointwiseLogLik {
    log_lik: Array2<f64>,
    chain_ids: Vec<usize>,
    r_eff: Array1<f64>,
}

impl PointwiseLogLik {
    /// Extract the log-likelihood matrix and estimate `r_eff` from a store.
    ///
    /// Errors
    /// ------
    /// - `LooError::DimensionMismatch { what: "chain_length", .. }` when
    ///   chains have unequal lengths.
    /// - `LooError::Draw(DrawError::MissingLogLik)` when the draws carry no
    ///   log-likelihoods (e.g. a prior-only run).
    /// - `LooError::EmptyLogLik` when the store has zero observations.
    pub fn from_draws(store: &DrawStore) -> LooResult<Self> {
        let log_lik = store.log_lik_matrix()?;
        Self::from_matrix_with_chain_ids(log_lik, store.chain_ids())
    }

    /// Build from a matrix whose rows form `n_chains` contiguous,
    /// equal-length chains.
    ///
    /// Errors
    /// ------
    /// - `LooError::DimensionMismatch { what: "chains", .. }` when `n_chains`
    ///   is zero or does not divide `S`.
    /// - See [`PointwiseLogLik::from_matrix_with_chain_ids`].
    pub fn from_matrix(log_lik: Array2<f64>, n_chains: usize) -> LooResult<Self> {
        let n_rows = log_lik.nrows();
        if n_chains == 0 || n_rows % n_chains != 0 {
            return Err(LooError::DimensionMismatch {
                what: "chains",
                expected: n_chains,
                found: n_rows,
            });
        }
        let per_chain = n_rows / n_chains;
        let chain_ids = (0..n_rows).map(|row| row / per_chain).collect();
        Self::from_matrix_with_chain_ids(log_lik, chain_ids)
    }

    /// Build from a matrix and an explicit chain label per row.
    ///
    /// Errors
    /// ------
    /// - `LooError::EmptyLogLik` for a matrix with no rows or no columns.
    /// - `LooError::NonFiniteLogLik` at the first non-finite entry.
    /// - `LooError::DimensionMismatch` for a wrong-length `chain_ids` or
    ///   unequal chain lengths.
    pub fn from_matrix_with_chain_ids(log_lik: Array2<f64>, chain_ids: Vec<usize>) -> LooResult<Self> {
        let (draws, observations) = log_lik.dim();
        if draws == 0 || observations == 0 {
            return Err(LooError::EmptyLogLik { draws, observations });
        }
        if let Some(((draw, observation), &value)) =
            log_lik.indexed_iter().find(|(_, v)| !v.is_finite())
        {
            return Err(LooError::NonFiniteLogLik { draw, observation, value });
        }
        group_rows(draws, &chain_ids)?;
        let r_eff = relative_efficiency(log_lik.view(), &chain_ids)?;
        Ok(PointwiseLogLik { log_lik, chain_ids, r_eff })
    }

    /// Replace the estimated relative efficiencies.
    ///
    /// Errors
    /// ------
    /// - `LooError::DimensionMismatch { what: "r_eff", .. }` when
    ///   `r_eff.len() != N`.
    /// - `LooError::InvalidRelativeEff` for a non-finite or non-positive entry.
    pub fn with_relative_eff(mut self, r_eff: Array1<f64>) -> LooResult<Self> {
        if r_eff.len() != self.n_obs() {
            return Err(LooError::DimensionMismatch {
                what: "r_eff",
                expected: self.n_obs(),
                found: r_eff.len(),
            });
        }
        if let Some((observation, &value)) =
            r_eff.indexed_iter().find(|(_, v)| !(v.is_finite() && **v > 0.0))
        {
            return Err(LooError::InvalidRelativeEff { observation, value });
        }
        self.r_eff = r_eff;
        Ok(self)
    }

    pub fn log_lik(&self) -> ArrayView2<'_, f64> {
        self.log_lik.view()
    }

    pub fn chain_ids(&self) -> &[usize] {
        &self.chain_ids
    }

    pub fn relative_eff(&self) -> ArrayView1<'_, f64> {
        self.r_eff.view()
    }

    /// Number of draws `S`.
    pub fn n_draws(&self) -> usize {
        self.log_lik.nrows()
    }

    /// Number of observations `N`.
    pub fn n_obs(&self) -> usize {
        self.log_lik.ncols()
    }
}
