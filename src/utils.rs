//! utils — Python-to-Rust input conversion for the PyO3 bindings.
//!
//! Only compiled with the `python-bindings` feature. Accepts NumPy arrays,
//! pandas objects exposing `to_numpy`, and nested Python sequences, and
//! returns owned `ndarray` values so the core modules never see PyO3 types.
#[cfg(feature = "python-bindings")]
use ndarray::{Array1, Array2};

#[cfg(feature = "python-bindings")]
use numpy::{PyReadonlyArray1, PyReadonlyArray2};

#[cfg(feature = "python-bindings")]
use pyo3::{
    exceptions::{PyTypeError, PyValueError},
    prelude::*,
    types::PyAny,
};

/// Extract a 1-D float64 vector from an ndarray, Series or sequence.
#[cfg(feature = "python-bindings")]
pub fn extract_f64_vector(raw_data: &Bound<'_, PyAny>) -> PyResult<Array1<f64>> {
    if let Ok(arr) = raw_data.extract::<PyReadonlyArray1<f64>>() {
        return Ok(arr.as_array().to_owned());
    }
    if let Ok(obj) = raw_data.call_method("to_numpy", (false,), None) {
        if let Ok(arr) = obj.extract::<PyReadonlyArray1<f64>>() {
            return Ok(arr.as_array().to_owned());
        }
    }
    let vec: Vec<f64> = raw_data.extract().map_err(|_| {
        PyTypeError::new_err("expected a 1-D numpy.ndarray, pandas.Series, or sequence of float64")
    })?;
    Ok(Array1::from(vec))
}

/// Extract a 2-D float64 matrix (draws × observations).
///
/// Accepts a 2-D ndarray, a DataFrame (via `to_numpy`), or a list of
/// equal-length rows.
#[cfg(feature = "python-bindings")]
pub fn extract_f64_matrix(raw_data: &Bound<'_, PyAny>) -> PyResult<Array2<f64>> {
    if let Ok(arr) = raw_data.extract::<PyReadonlyArray2<f64>>() {
        return Ok(arr.as_array().to_owned());
    }
    if let Ok(obj) = raw_data.call_method("to_numpy", (false,), None) {
        if let Ok(arr) = obj.extract::<PyReadonlyArray2<f64>>() {
            return Ok(arr.as_array().to_owned());
        }
    }
    let rows: Vec<Vec<f64>> = raw_data.extract().map_err(|_| {
        PyTypeError::new_err("expected a 2-D numpy.ndarray, pandas.DataFrame, or list of rows")
    })?;
    let n_cols = rows.first().map_or(0, Vec::len);
    if rows.iter().any(|r| r.len() != n_cols) {
        return Err(PyValueError::new_err("all rows of log_lik must have the same length"));
    }
    let n_rows = rows.len();
    Array2::from_shape_vec((n_rows, n_cols), rows.into_iter().flatten().collect())
        .map_err(|e| PyValueError::new_err(e.to_string()))
}
