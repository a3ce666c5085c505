//! rust_loo — PSIS leave-one-out cross-validation with Python bindings.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers and as the PyO3 bridge that
//! exposes the LOO engine to Python via the `_rust_loo` extension module.
//! The crate estimates out-of-sample predictive accuracy of Bayesian models
//! from posterior draws with Pareto-smoothed importance sampling, and
//! drives the prior/posterior predictive workflow that produces those draws.
//!
//! Key behaviors
//! -------------
//! - Re-export the core modules:
//!   - [`draws`]: validated, chain-grouped sampler output.
//!   - [`predictive`]: model specifications, the sampler trait, prior and
//!     posterior simulation, predictive checks.
//!   - [`loo`]: relative efficiency, PSIS, LOO aggregation, diagnostics and
//!     model comparison.
//!   - [`numerical_stability`]: log-space reductions.
//! - With `python-bindings`, define `PsisLoo` and `LooCompare` classes under
//!   `_rust_loo.loo`.
//!
//! Invariants & assumptions
//! ------------------------
//! - All numerical work lives in the inner modules; this file performs only
//!   FFI glue, input conversion and error mapping.
//! - The library never installs a logger; diagnostics go through the `log`
//!   facade and are visible once the application installs one.
//!
//! Conventions
//! -----------
//! - Matrices are `draws × observations` in chain-major row order.
//! - Errors from core code are converted to `ValueError` at the PyO3
//!   boundary.
//!
//! Downstream usage
//! ----------------
//! - Rust: `use rust_loo::loo::prelude::*;` and
//!   `use rust_loo::predictive::prelude::*;`.
//! - Python: `from _rust_loo.loo import PsisLoo, LooCompare`.
//!
//! Testing notes
//! -------------
//! - Unit tests live in each module; `tests/integration_loo_pipeline.rs`
//!   runs the full prior → posterior → LOO → comparison workflow with a
//!   seeded toy sampler.

pub mod draws;
pub mod loo;
pub mod numerical_stability;
pub mod predictive;
pub mod utils;

#[cfg(feature = "python-bindings")]
use pyo3::{prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::{
    loo::{ComparisonOutcome, LooOptions, LooOutcome, PointwiseLogLik, compare, loo},
    utils::{extract_f64_matrix, extract_f64_vector},
};

/// PsisLoo — Python-facing PSIS-LOO estimate for one model.
///
/// Purpose
/// -------
/// Run PSIS-LOO on a log-likelihood matrix passed from Python and expose
/// the estimates and Pareto diagnostics as read-only properties.
///
/// Parameters
/// ----------
/// Constructed from Python via
/// `PsisLoo(log_lik, chain_ids=None, r_eff=None, model=None)`:
/// - `log_lik`: 2-D array-like `draws × observations`.
/// - `chain_ids`: optional chain label per row; all rows form one chain
///   when omitted.
/// - `r_eff`: optional relative efficiencies overriding the estimate.
/// - `model`: optional label used in comparisons.
///
/// Fields
/// ------
/// - `inner`: [`LooOutcome`]
#[cfg(feature = "python-bindings")]
#[pyclass(module = "rust_loo.loo")]
pub struct PsisLoo {
    inner: LooOutcome,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl PsisLoo {
    #[new]
    #[pyo3(
        signature = (log_lik, chain_ids = None, r_eff = None, model = None),
        text_signature = "(log_lik, /, chain_ids=None, r_eff=None, model=None)"
    )]
    pub fn new<'py>(
        log_lik: &Bound<'py, PyAny>, chain_ids: Option<Vec<usize>>,
        r_eff: Option<&Bound<'py, PyAny>>, model: Option<String>,
    ) -> PyResult<Self> {
        let matrix = extract_f64_matrix(log_lik)?;
        let chain_ids = chain_ids.unwrap_or_else(|| vec![0; matrix.nrows()]);
        let mut pointwise = PointwiseLogLik::from_matrix_with_chain_ids(matrix, chain_ids)?;
        if let Some(raw) = r_eff {
            pointwise = pointwise.with_relative_eff(extract_f64_vector(raw)?)?;
        }
        let mut inner = loo(&pointwise, &LooOptions::default());
        if let Some(name) = model {
            inner = inner.with_model(name);
        }
        Ok(PsisLoo { inner })
    }

    #[getter]
    pub fn model(&self) -> String {
        self.inner.model().to_string()
    }

    #[getter]
    pub fn elpd_loo(&self) -> f64 {
        self.inner.elpd_loo
    }

    #[getter]
    pub fn se_elpd_loo(&self) -> f64 {
        self.inner.se_elpd_loo
    }

    #[getter]
    pub fn p_loo(&self) -> f64 {
        self.inner.p_loo
    }

    #[getter]
    pub fn looic(&self) -> f64 {
        self.inner.looic
    }

    /// Pointwise `elpd_i`.
    #[getter]
    pub fn pointwise(&self) -> Vec<f64> {
        self.inner.pointwise.elpd.to_vec()
    }

    /// Pareto `k_hat` per observation; `None` where the tail was too short.
    #[getter]
    pub fn pareto_k(&self) -> Vec<Option<f64>> {
        self.inner.diagnostics.k_hat()
    }

    #[getter]
    pub fn n_eff(&self) -> Vec<f64> {
        self.inner.diagnostics.n_eff()
    }

    #[getter]
    pub fn warnings(&self) -> Vec<String> {
        self.inner.warnings().iter().map(ToString::to_string).collect()
    }

    pub fn __repr__(&self) -> String {
        self.inner.to_string()
    }
}

/// LooCompare — Python-facing paired comparison of two `PsisLoo` results.
///
/// `LooCompare(a, b)` reports `elpd(b) − elpd(a)` with its paired SE.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "rust_loo.loo")]
pub struct LooCompare {
    inner: ComparisonOutcome,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl LooCompare {
    #[new]
    #[pyo3(text_signature = "(a, b, /)")]
    pub fn new(a: PyRef<'_, PsisLoo>, b: PyRef<'_, PsisLoo>) -> PyResult<Self> {
        let inner = compare(&a.inner, &b.inner)?;
        Ok(LooCompare { inner })
    }

    #[getter]
    pub fn elpd_diff(&self) -> f64 {
        self.inner.elpd_diff
    }

    #[getter]
    pub fn se_diff(&self) -> f64 {
        self.inner.se_diff
    }

    #[getter]
    pub fn winner(&self) -> Option<String> {
        self.inner.winner().map(str::to_string)
    }

    #[getter]
    pub fn prob_b_better(&self) -> f64 {
        self.inner.prob_b_better()
    }

    pub fn __repr__(&self) -> String {
        self.inner.to_string()
    }
}

/// _rust_loo — PyO3 module initializer for the Python extension.
///
/// Creates the `loo` submodule, attaches it to `_rust_loo`, and registers
/// it in `sys.modules` so `rust_loo.loo` is importable with dot notation.
#[cfg(feature = "python-bindings")]
#[pymodule]
fn _rust_loo<'py>(_py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    let loo_mod = PyModule::new(_py, "loo")?;
    loo_module(_py, m, &loo_mod)?;

    // Manually add the submodule into sys.modules to allow for dot notation.
    _py.import("sys")?.getattr("modules")?.set_item("rust_loo.loo", loo_mod)?;
    Ok(())
}

#[cfg(feature = "python-bindings")]
fn loo_module<'py>(
    _py: Python, rust_loo: &Bound<'py, PyModule>, m: &Bound<'py, PyModule>,
) -> PyResult<()> {
    m.add_class::<PsisLoo>()?;
    m.add_class::<LooCompare>()?;
    rust_loo.add_submodule(m)?;
    Ok(())
}
