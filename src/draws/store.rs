//! Draw containers for sampler output.
//!
//! Purpose
//! -------
//! Provide the typed, validated container ([`DrawStore`]) for posterior or
//! prior draws produced by an external sampler, grouped by chain. This is
//! the single entry point through which sampler output enters the crate;
//! downstream layers (pointwise extraction, PSIS, predictive summaries)
//! rely on its invariants instead of re-validating raw vectors.
//!
//! Key behaviors
//! -------------
//! - [`Draw`] bundles one sampler output: the parameter vector, the
//!   generated `y_rep` vector and the pointwise log-likelihood vector.
//! - [`DrawStore::new`] checks that all draws agree on vector lengths and
//!   carry only finite values.
//! - Matrix views (`log_lik_matrix`, `y_rep_matrix`, `param_matrix`)
//!   stack draws chain-major into `S × k` arrays.
//!
//! Invariants & assumptions
//! ------------------------
//! - At least one chain; every chain holds at least one draw.
//! - Every draw has the same `params.len()` and `y_rep.len()`.
//! - `log_lik` is either present on every draw with the same length as
//!   `y_rep` (one entry per observation), or absent (length 0) on every
//!   draw. Prior-only runs may legitimately omit it.
//! - Chains may differ in length here; consumers that need equal-length
//!   chains (relative efficiency) check [`DrawStore::equal_chain_length`].
//! - Within a chain, draw order is preserved exactly as supplied.
//!
//! Conventions
//! -----------
//! - "Chain-major" row order: all draws of chain 0, then chain 1, and so
//!   on. [`DrawStore::chain_ids`] returns the chain index of each row.
//! - The store is read-only once built; no method mutates draws.
//!
//! Testing notes
//! -------------
//! - Unit tests cover construction (happy path, empty inputs, length and
//!   finiteness violations) and the chain-major matrix layout.
use crate::draws::{
    errors::{DrawError, DrawResult},
    validation::{check_finite, check_len},
};
use ndarray::{Array1, Array2, ArrayView2};

/// `Draw` — one sampler output.
///
/// Fields
/// ------
/// - `params`: `Array1<f64>`
///   Parameter vector θ_s in the sampler's own declaration order.
/// - `y_rep`: `Array1<f64>`
///   Generated replicated outcomes, one per observation.
/// - `log_lik`: `Array1<f64>`
///   Pointwise log-likelihood `log p(y_i | θ_s)`, one per observation, or
///   empty when the sampler did not produce it.
#[derive(Debug, Clone, PartialEq)]
pub struct Draw {
    pub params: Array1<f64>,
    pub y_rep: Array1<f64>,
    pub log_lik: Array1<f64>,
}

impl Draw {
    /// Construct a draw from its three component vectors.
    pub fn new(params: Array1<f64>, y_rep: Array1<f64>, log_lik: Array1<f64>) -> Self {
        Draw { params, y_rep, log_lik }
    }

    /// Construct a draw carrying only pointwise log-likelihood values.
    ///
    /// Convenient when the caller already holds a log-likelihood matrix and
    /// has no use for parameters or replicated data.
    pub fn from_log_lik(log_lik: Array1<f64>) -> Self {
        let n_obs = log_lik.len();
        Draw { params: Array1::zeros(0), y_rep: Array1::zeros(n_obs), log_lik }
    }
}

/// `DrawStore` — validated draws grouped by chain.
///
/// Purpose
/// -------
/// Hold the posterior (or prior) sample matrix with dimensions
/// `chains × iterations-per-chain × observations` and expose it in the
/// shapes the LOO and predictive layers consume.
///
/// Fields
/// ------
/// - `chains`: `Vec<Vec<Draw>>`
///   Draws grouped by chain; inner order is sampler iteration order.
/// - `n_obs`: `usize`
///   Number of observations (length of every `y_rep`).
/// - `n_params`: `usize`
///   Length of every parameter vector.
/// - `has_log_lik`: `bool`
///   Whether draws carry pointwise log-likelihoods.
///
/// Invariants
/// ----------
/// - See the module-level invariants; all are enforced by
///   [`DrawStore::new`].
///
/// Performance
/// -----------
/// - Validation is a single O(S · (n_obs + n_params)) scan. Matrix
///   accessors allocate a fresh `S × k` array on each call.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawStore {
    chains: Vec<Vec<Draw>>,
    n_obs: usize,
    n_params: usize,
    has_log_lik: bool,
}

impl DrawStore {
    /// Build a validated store from per-chain draws.
    ///
    /// Parameters
    /// ----------
    /// - `chains`: `Vec<Vec<Draw>>`
    ///   Outer vector indexes chains, inner vector holds that chain's draws
    ///   in iteration order.
    ///
    /// Returns
    /// -------
    /// `DrawResult<DrawStore>`
    ///
    /// Errors
    /// ------
    /// - `DrawError::EmptyStore` when `chains` is empty.
    /// - `DrawError::EmptyChain { chain }` when a chain has no draws.
    /// - `DrawError::DimensionMismatch { .. }` when `params`, `y_rep` or
    ///   `log_lik` lengths disagree across draws, or `log_lik` is present
    ///   with a length different from `y_rep`.
    /// - `DrawError::NonFiniteValue { .. }` for `NaN`/`±∞` entries.
    ///
    /// Examples
    /// --------
    /// ```rust
    /// # use ndarray::array;
    /// # use rust_loo::draws::{Draw, DrawStore};
    /// let chain = vec![
    ///     Draw::new(array![0.1], array![1.0, 2.0], array![-1.0, -1.2]),
    ///     Draw::new(array![0.2], array![1.1, 2.1], array![-0.9, -1.1]),
    /// ];
    /// let store = DrawStore::new(vec![chain]).unwrap();
    /// assert_eq!(store.n_draws(), 2);
    /// assert_eq!(store.n_obs(), 2);
    /// ```
    pub fn new(chains: Vec<Vec<Draw>>) -> DrawResult<Self> {
        let first = chains.first().ok_or(DrawError::EmptyStore)?;
        let reference = first.first().ok_or(DrawError::EmptyChain { chain: 0 })?;
        let n_obs = reference.y_rep.len();
        let n_params = reference.params.len();
        let has_log_lik = !reference.log_lik.is_empty();

        for (chain, draws) in chains.iter().enumerate() {
            if draws.is_empty() {
                return Err(DrawError::EmptyChain { chain });
            }
            for (iteration, draw) in draws.iter().enumerate() {
                check_len("params", n_params, draw.params.len())?;
                check_len("y_rep", n_obs, draw.y_rep.len())?;
                let expected_ll = if has_log_lik { n_obs } else { 0 };
                check_len("log_lik", expected_ll, draw.log_lik.len())?;

                check_finite("params", chain, iteration, draw.params.iter().copied())?;
                check_finite("y_rep", chain, iteration, draw.y_rep.iter().copied())?;
                check_finite("log_lik", chain, iteration, draw.log_lik.iter().copied())?;
            }
        }

        Ok(DrawStore { chains, n_obs, n_params, has_log_lik })
    }

    /// Build a log-likelihood-only store from an `S × N` matrix.
    ///
    /// Rows are split into `n_chains` contiguous, equal-length chains
    /// (chain-major order).
    ///
    /// Errors
    /// ------
    /// - `DrawError::DimensionMismatch { what: "chains", .. }` when
    ///   `n_chains` is zero or does not divide the number of rows.
    /// - Any error from [`DrawStore::new`].
    pub fn from_log_lik(log_lik: ArrayView2<'_, f64>, n_chains: usize) -> DrawResult<Self> {
        let n_rows = log_lik.nrows();
        if n_chains == 0 || n_rows % n_chains != 0 {
            return Err(DrawError::DimensionMismatch {
                what: "chains",
                expected: n_chains,
                found: n_rows,
            });
        }
        let per_chain = n_rows / n_chains;
        let chains = (0..n_chains)
            .map(|c| {
                (0..per_chain)
                    .map(|it| Draw::from_log_lik(log_lik.row(c * per_chain + it).to_owned()))
                    .collect()
            })
            .collect();
        DrawStore::new(chains)
    }

    /// Number of chains.
    pub fn n_chains(&self) -> usize {
        self.chains.len()
    }

    /// Total number of draws `S` across all chains.
    pub fn n_draws(&self) -> usize {
        self.chains.iter().map(Vec::len).sum()
    }

    /// Number of observations.
    pub fn n_obs(&self) -> usize {
        self.n_obs
    }

    /// Length of each parameter vector.
    pub fn n_params(&self) -> usize {
        self.n_params
    }

    /// Whether draws carry pointwise log-likelihoods.
    pub fn has_log_lik(&self) -> bool {
        self.has_log_lik
    }

    /// Draws of chain `index`, in iteration order.
    pub fn chain(&self, index: usize) -> Option<&[Draw]> {
        self.chains.get(index).map(Vec::as_slice)
    }

    /// All chains.
    pub fn chains(&self) -> &[Vec<Draw>] {
        &self.chains
    }

    /// Iterate over all draws in chain-major order.
    pub fn iter(&self) -> impl Iterator<Item = &Draw> {
        self.chains.iter().flatten()
    }

    /// Common chain length, or `None` when chains differ in length.
    pub fn equal_chain_length(&self) -> Option<usize> {
        let len = self.chains[0].len();
        self.chains.iter().all(|c| c.len() == len).then_some(len)
    }

    /// Chain index of each draw in chain-major order.
    pub fn chain_ids(&self) -> Vec<usize> {
        self.chains
            .iter()
            .enumerate()
            .flat_map(|(c, draws)| std::iter::repeat(c).take(draws.len()))
            .collect()
    }

    /// `S × N` matrix of pointwise log-likelihoods (chain-major rows).
    ///
    /// Errors
    /// ------
    /// - `DrawError::MissingLogLik` when draws carry no log-likelihoods.
    pub fn log_lik_matrix(&self) -> DrawResult<Array2<f64>> {
        if !self.has_log_lik {
            return Err(DrawError::MissingLogLik);
        }
        Ok(self.stack(self.n_obs, |d| &d.log_lik))
    }

    /// `S × N` matrix of replicated outcomes (chain-major rows).
    pub fn y_rep_matrix(&self) -> Array2<f64> {
        self.stack(self.n_obs, |d| &d.y_rep)
    }

    /// `S × P` matrix of parameter draws (chain-major rows).
    pub fn param_matrix(&self) -> Array2<f64> {
        self.stack(self.n_params, |d| &d.params)
    }

    fn stack<F>(&self, width: usize, field: F) -> Array2<f64>
    where
        F: Fn(&Draw) -> &Array1<f64>,
    {
        let mut out = Array2::zeros((self.n_draws(), width));
        for (mut row, draw) in out.rows_mut().into_iter().zip(self.iter()) {
            row.assign(field(draw));
        }
        out
    }
}
