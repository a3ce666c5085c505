//! predictive::errors — error type for predictive simulation.
//!
//! Purpose
//! -------
//! Define [`PredictiveError`] and [`PredictiveResult`] for model
//! specifications, datasets, sampler invocations and predictive checks.
//!
//! Key behaviors
//! -------------
//! - Specification and dataset problems are detected before the sampler
//!   is called.
//! - Sampler failures arrive as `anyhow::Error` and are flattened into
//!   `PredictiveError::Sampler` through `From`.
//! - Draw-container failures are wrapped as `PredictiveError::Draw`.
//!
//! Conventions
//! -----------
//! - Observation indices are 0-based positions in the dataset.

use crate::draws::errors::DrawError;
#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

/// Result alias for predictive-simulation operations.
pub type PredictiveResult<T> = Result<T, PredictiveError>;

/// PredictiveError — failures of the predictive workflow.
///
/// Variants
/// --------
/// - `EmptyName`
///   A model, hyperparameter, parameter or grouping name is empty.
/// - `InvalidHyperparameter { name, value }`
///   A hyperparameter that is not finite.
/// - `DuplicateParameter(name)`
///   Two parameter declarations share a name.
/// - `InvalidParameterSize { name }`
///   A parameter declared with zero length.
/// - `InvalidGroupCount { name, n_groups }`
///   A grouping key with zero groups.
/// - `EmptyDataset`
///   No outcomes were supplied.
/// - `NonFiniteOutcome { index, value }`
///   An observed outcome that is `NaN` or `±∞`.
/// - `GroupIndexOutOfRange { index, group, n_groups }`
///   A group index not below the number of groups.
/// - `GroupingMismatch { model_grouped, data_grouped }`
///   The model is grouped and the data is not, or vice versa.
/// - `DimensionMismatch { what, expected, found }`
///   Length disagreements between outcomes, group indices and draws.
/// - `Sampler(String)`
///   The external sampler reported a failure.
/// - `Draw(DrawError)`
///   The sampler output could not be assembled into a draw store.
#[derive(Debug, Clone, PartialEq)]
pub enum PredictiveError {
    // ---- Specification ----
    EmptyName,
    InvalidHyperparameter { name: String, value: f64 },
    DuplicateParameter(String),
    InvalidParameterSize { name: String },
    InvalidGroupCount { name: String, n_groups: usize },

    // ---- Dataset ----
    EmptyDataset,
    NonFiniteOutcome { index: usize, value: f64 },
    GroupIndexOutOfRange { index: usize, group: usize, n_groups: usize },
    GroupingMismatch { model_grouped: bool, data_grouped: bool },
    DimensionMismatch { what: &'static str, expected: usize, found: usize },

    // ---- Collaborators ----
    Sampler(String),
    Draw(DrawError),
}

impl std::error::Error for PredictiveError {}

impl std::fmt::Display for PredictiveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Specification ----
            PredictiveError::EmptyName => write!(f, "Names in a model specification must be non-empty."),
            PredictiveError::InvalidHyperparameter { name, value } => {
                write!(f, "Hyperparameter '{name}' must be finite; got {value}.")
            }
            PredictiveError::DuplicateParameter(name) => {
                write!(f, "Parameter '{name}' is declared more than once.")
            }
            PredictiveError::InvalidParameterSize { name } => {
                write!(f, "Parameter '{name}' must have at least one element.")
            }
            PredictiveError::InvalidGroupCount { name, n_groups } => {
                write!(f, "Grouping '{name}' must have at least one group; got {n_groups}.")
            }
            // ---- Dataset ----
            PredictiveError::EmptyDataset => write!(f, "Dataset must contain at least one outcome."),
            PredictiveError::NonFiniteOutcome { index, value } => {
                write!(f, "Outcome {index} is not finite ({value}).")
            }
            PredictiveError::GroupIndexOutOfRange { index, group, n_groups } => write!(
                f,
                "Observation {index} has group {group}, but only {n_groups} groups are declared."
            ),
            PredictiveError::GroupingMismatch { model_grouped, data_grouped } => write!(
                f,
                "Grouping mismatch: model grouped = {model_grouped}, data grouped = {data_grouped}."
            ),
            PredictiveError::DimensionMismatch { what, expected, found } => {
                write!(f, "Dimension mismatch in {what}: expected {expected}, found {found}.")
            }
            // ---- Collaborators ----
            PredictiveError::Sampler(msg) => write!(f, "Sampler failed: {msg}"),
            PredictiveError::Draw(err) => write!(f, "{err}"),
        }
    }
}

impl From<anyhow::Error> for PredictiveError {
    fn from(err: anyhow::Error) -> Self {
        PredictiveError::Sampler(format!("{err:#}"))
    }
}

impl From<DrawError> for PredictiveError {
    fn from(err: DrawError) -> Self {
        PredictiveError::Draw(err)
    }
}

#[cfg(feature = "python-bindings")]
impl From<PredictiveError> for PyErr {
    fn from(err: PredictiveError) -> PyErr {
        PyValueError::new_err(format!("PredictiveError: {err}"))
    }
}
