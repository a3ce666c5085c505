//! loo::errors — error type for the PSIS-LOO engine.
//!
//! Purpose
//! -------
//! Define [`LooError`] and the [`LooResult`] alias returned by pointwise
//! extraction, PSIS smoothing, LOO aggregation and model comparison.
//!
//! Key behaviors
//! -------------
//! - Shape and precondition failures (`DimensionMismatch`,
//!   `IncompatibleModels`, invalid options) abort immediately.
//! - Numerical-reliability problems are *not* errors: degenerate tails
//!   and large Pareto-k values are reported through
//!   [`PsisWarning`](crate::loo::diagnostics::PsisWarning) on the outcome.
//! - `From<DrawError>` folds draw-container failures into this type;
//!   dimension and chain-length problems surface as `DimensionMismatch`.
//!
//! Conventions
//! -----------
//! - Observation indices are 0-based columns of the `S × N` matrix; draw
//!   indices are 0-based chain-major rows.

use crate::draws::errors::DrawError;
#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

/// Result alias for LOO operations.
pub type LooResult<T> = Result<T, LooError>;

/// LooError — fatal failures of the LOO engine.
///
/// Variants
/// --------
/// - `DimensionMismatch { what, expected, found }`
///   Inputs with incompatible shapes (matrix vs. weights, `r_eff` length,
///   unequal chain lengths, chain ids vs. rows).
/// - `EmptyLogLik { draws, observations }`
///   A log-likelihood matrix with zero rows or zero columns.
/// - `NonFiniteLogLik { draw, observation, value }`
///   `NaN` or `±∞` in the log-likelihood matrix.
/// - `InvalidRelativeEff { observation, value }`
///   A supplied relative efficiency that is not finite and positive.
/// - `IncompatibleModels { model_a, model_b, n_a, n_b }`
///   Two LOO outcomes computed on different observation counts.
/// - `InvalidThresholds { good, ok }`, `InvalidTailFraction(f64)`,
///   `InvalidTailMultiplier(f64)`, `InvalidMinTail(usize)`,
///   `InvalidGridSize(usize)`, `InvalidGpdPrior(f64)`
///   Option values outside their documented domains.
/// - `Draw(DrawError)`
///   Any other draw-container failure.
#[derive(Debug, Clone, PartialEq)]
pub enum LooError {
    // ---- Shapes ----
    DimensionMismatch { what: &'static str, expected: usize, found: usize },
    EmptyLogLik { draws: usize, observations: usize },

    // ---- Values ----
    NonFiniteLogLik { draw: usize, observation: usize, value: f64 },
    InvalidRelativeEff { observation: usize, value: f64 },

    // ---- Comparison ----
    IncompatibleModels { model_a: String, model_b: String, n_a: usize, n_b: usize },

    // ---- Options ----
    InvalidThresholds { good: f64, ok: f64 },
    InvalidTailFraction(f64),
    InvalidTailMultiplier(f64),
    InvalidMinTail(usize),
    InvalidGridSize(usize),
    InvalidGpdPrior(f64),

    // ---- Draw store ----
    Draw(DrawError),
}

impl std::error::Error for LooError {}

impl std::fmt::Display for LooError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Shapes ----
            LooError::DimensionMismatch { what, expected, found } => {
                write!(f, "Dimension mismatch in {what}: expected {expected}, found {found}.")
            }
            LooError::EmptyLogLik { draws, observations } => write!(
                f,
                "Log-likelihood matrix must be non-empty; got {draws} draws × {observations} observations."
            ),
            // ---- Values ----
            LooError::NonFiniteLogLik { draw, observation, value } => write!(
                f,
                "Non-finite log-likelihood {value} at draw {draw}, observation {observation}."
            ),
            LooError::InvalidRelativeEff { observation, value } => write!(
                f,
                "Relative efficiency for observation {observation} must be finite and > 0; got {value}."
            ),
            // ---- Comparison ----
            LooError::IncompatibleModels { model_a, model_b, n_a, n_b } => write!(
                f,
                "Models '{model_a}' ({n_a} observations) and '{model_b}' ({n_b} observations) were not fit to the same data."
            ),
            // ---- Options ----
            LooError::InvalidThresholds { good, ok } => write!(
                f,
                "Pareto-k thresholds must be finite with 0 < good ({good}) <= ok ({ok})."
            ),
            LooError::InvalidTailFraction(value) => {
                write!(f, "Tail fraction must lie in (0, 1); got {value}.")
            }
            LooError::InvalidTailMultiplier(value) => {
                write!(f, "Tail multiplier must be finite and > 0; got {value}.")
            }
            LooError::InvalidMinTail(value) => {
                write!(f, "Minimum tail length must be at least 1; got {value}.")
            }
            LooError::InvalidGridSize(value) => {
                write!(f, "GPD grid must contain at least 1 point; got {value}.")
            }
            LooError::InvalidGpdPrior(value) => {
                write!(f, "GPD grid prior scale must be finite and > 0; got {value}.")
            }
            // ---- Draw store ----
            LooError::Draw(err) => write!(f, "{err}"),
        }
    }
}

impl From<DrawError> for LooError {
    fn from(err: DrawError) -> Self {
        match err {
            DrawError::DimensionMismatch { what, expected, found } => {
                LooError::DimensionMismatch { what, expected, found }
            }
            DrawError::ChainLengthMismatch { expected, found, .. } => {
                LooError::DimensionMismatch { what: "chain_length", expected, found }
            }
            other => LooError::Draw(other),
        }
    }
}

#[cfg(feature = "python-bindings")]
impl From<LooError> for PyErr {
    fn from(err: LooError) -> PyErr {
        PyValueError::new_err(format!("LooError: {err}"))
    }
}
