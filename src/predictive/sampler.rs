//! predictive::sampler — boundary to the external Bayesian sampler.
//!
//! Purpose
//! -------
//! Define the [`Sampler`] trait through which this crate obtains draws.
//! The sampler itself (HMC, NUTS, Gibbs, a compiled probabilistic
//! program, ...) is a black box; this crate only specifies what goes in
//! and what must come out.
//!
//! Key behaviors
//! -------------
//! - `sample` receives the full [`ModelSpec`], including its
//!   [`SamplingMode`](crate::predictive::SamplingMode), and the
//!   [`Dataset`].
//! - It returns draws grouped by chain. Under `PriorOnly` draws carry no
//!   log-likelihood; under `Posterior` every draw carries one value per
//!   observation.
//! - Failures are reported as `anyhow::Error` and converted to
//!   `PredictiveError::Sampler` by the callers in
//!   [`prior`](crate::predictive::prior).
//!
//! Invariants & assumptions
//! ------------------------
//! - Implementations are `Send + Sync` so that one sampler can serve
//!   simulations from several threads.
//! - Each draw's `y_rep` has one entry per observation in the dataset and
//!   `params` has `spec.n_params()` entries.
use crate::{
    draws::Draw,
    predictive::{dataset::Dataset, model_spec::ModelSpec},
};

/// Sampler — produces draws for a model specification and dataset.
pub trait Sampler: Send + Sync {
    /// Draw from the prior or posterior of `spec` given `data`.
    ///
    /// Returns
    /// -------
    /// `anyhow::Result<Vec<Vec<Draw>>>`
    ///   Outer vector indexes chains; inner vectors are in iteration order.
    fn sample(&self, spec: &ModelSpec, data: &Dataset) -> anyhow::Result<Vec<Vec<Draw>>>;
}

impl<S: Sampler + ?Sized> Sampler for &S {
    fn sample(&self, spec: &ModelSpec, data: &Dataset) -> anyhow::Result<Vec<Vec<Draw>>> {
        (**self).sample(spec, data)
    }
}

impl<S: Sampler + ?Sized> Sampler for Box<S> {
    fn sample(&self, spec: &ModelSpec, data: &Dataset) -> anyhow::Result<Vec<Vec<Draw>>> {
        (**self).sample(spec, data)
    }
}
