//! draws::errors — error type for draw containers.
//!
//! Purpose
//! -------
//! Define [`DrawError`] and the [`DrawResult`] alias used when assembling
//! and reshaping sampler output. All variants are *shape or precondition*
//! failures: the caller has to fix the inputs before retrying, nothing is
//! recovered locally.
//!
//! Conventions
//! -----------
//! - Chain and iteration indices are 0-based.
//! - `what` payloads name the offending field (`"params"`, `"y_rep"`,
//!   `"log_lik"`, `"chain_ids"`) so messages stay meaningful without the
//!   surrounding data.

#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

/// Result alias for draw-container operations.
pub type DrawResult<T> = Result<T, DrawError>;

/// DrawError — shape and precondition failures for sampler output.
///
/// Variants
/// --------
/// - `EmptyStore`
///   No chains were supplied.
/// - `EmptyChain { chain }`
///   A chain holds zero draws.
/// - `ChainLengthMismatch { chain, expected, found }`
///   Chains differ in length where equal lengths are required (relative
///   efficiency assumes equal-length chains).
/// - `DimensionMismatch { what, expected, found }`
///   A vector or matrix dimension disagrees with the rest of the store.
/// - `NonFiniteValue { what, chain, iteration, index, value }`
///   A draw carries `NaN` or `±∞` in a field that must be finite.
/// - `MissingLogLik`
///   The store was produced without pointwise log-likelihoods.
///
/// Notes
/// -----
/// - Every variant is fatal; numerical-reliability issues (tail fits,
///   Pareto-k) are diagnostics of the LOO layer, not errors.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawError {
    // ---- Structure ----
    EmptyStore,
    EmptyChain { chain: usize },
    ChainLengthMismatch { chain: usize, expected: usize, found: usize },

    // ---- Dimensions ----
    DimensionMismatch { what: &'static str, expected: usize, found: usize },

    // ---- Values ----
    NonFiniteValue { what: &'static str, chain: usize, iteration: usize, index: usize, value: f64 },
    MissingLogLik,
}

impl std::error::Error for DrawError {}

impl std::fmt::Display for DrawError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DrawError::EmptyStore => write!(f, "Draw store must contain at least one chain."),
            DrawError::EmptyChain { chain } => write!(f, "Chain {chain} contains no draws."),
            DrawError::ChainLengthMismatch { chain, expected, found } => write!(
                f,
                "Chain {chain} has {found} draws but {expected} were expected; chains must have equal length."
            ),
            DrawError::DimensionMismatch { what, expected, found } => {
                write!(f, "Dimension mismatch in {what}: expected {expected}, found {found}.")
            }
            DrawError::NonFiniteValue { what, chain, iteration, index, value } => write!(
                f,
                "Non-finite {what} value {value} at chain {chain}, iteration {iteration}, index {index}."
            ),
            DrawError::MissingLogLik => {
                write!(f, "Draws carry no pointwise log-likelihood values.")
            }
        }
    }
}

#[cfg(feature = "python-bindings")]
impl From<DrawError> for PyErr {
    fn from(err: DrawError) -> PyErr {
        PyValueError::new_err(format!("DrawError: {err}"))
    }
}
