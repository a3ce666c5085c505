//! numerical_stability — log-space reductions shared by the LOO engine.
//!
//! Purpose
//! -------
//! Collect the small set of numerically robust reductions that the PSIS
//! and LOO layers need to work on log-likelihoods without overflow or
//! underflow: max-shifted log-sum-exp, log-mean-exp, and the weighted
//! variants used to evaluate `log Σ_s w_s · exp(ℓ_s)`.
//!
//! Key behaviors
//! -------------
//! - Provide [`log_sum_exp`] and [`log_mean_exp`] over any iterator of
//!   `f64` values (slices, `ndarray` views, columns).
//! - Provide [`log_sum_exp_weighted`] for a pair of log-weight /
//!   log-value sequences of equal length.
//! - Centralize the tolerances ([`GENERAL_TOL`], [`TIE_TOL`]) that decide
//!   when a sequence is treated as numerically constant.
//!
//! Invariants & assumptions
//! ------------------------
//! - Inputs are finite or `-∞` (a zero weight on the natural scale).
//!   `+∞` and `NaN` are rejected upstream by the draw and pointwise
//!   validators.
//! - An all-`-∞` input reduces to `-∞`, never `NaN`.
//!
//! Conventions
//! -----------
//! - Every reduction shifts by the running maximum before exponentiating.
//! - This module never logs and holds no state; it is safe to call from
//!   rayon workers.

pub mod logspace;

pub use self::logspace::{
    GENERAL_TOL, TIE_TOL, is_constant, log_mean_exp, log_sum_exp, log_sum_exp_weighted,
};
