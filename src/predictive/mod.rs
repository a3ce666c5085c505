//! predictive — prior and posterior predictive simulation workflow.
//!
//! Purpose
//! -------
//! Specify models declaratively, run them through an external sampler in
//! prior-only or posterior mode, and summarize the replicated outcomes
//! before any LOO analysis.
//!
//! Key behaviors
//! -------------
//! - [`ModelSpec`] carries a [`SamplingMode`], named [`Hyperparameters`],
//!   [`ParameterDecl`]s and an optional [`GroupingKey`] (pooled vs.
//!   per-group variants of one schema).
//! - [`Dataset`] validates outcomes and group membership.
//! - [`Sampler`] is the trait boundary to the external sampler.
//! - [`simulate_prior`] and [`fit_posterior`] return validated
//!   [`DrawStore`](crate::draws::DrawStore)s.
//! - [`PredictiveSummary`] and [`predictive_check`] judge plausibility on
//!   the outcome scale.
//!
//! Invariants & assumptions
//! ------------------------
//! - Specifications are values: modifiers return copies, so repeated
//!   simulations with new hyperparameters never mutate the caller's spec.
//! - All failures are [`PredictiveError`]s; sampler errors are flattened
//!   from `anyhow::Error`.
//!
//! Downstream usage
//! ----------------
//! - The store returned by [`fit_posterior`] feeds
//!   [`PointwiseLogLik::from_draws`](crate::loo::PointwiseLogLik::from_draws).

pub mod check;
pub mod dataset;
pub mod errors;
pub mod model_spec;
pub mod prior;
pub mod sampler;

// ---- Re-exports (primary surface) -----------------------------------------

pub use self::check::{
    PredictiveCheck, PredictiveSummary, TestStatistic, predictive_check, predictive_checks,
};
pub use self::dataset::Dataset;
pub use self::errors::{PredictiveError, PredictiveResult};
pub use self::model_spec::{
    GroupingKey, Hyperparameters, ModelSpec, ParameterDecl, ParameterShape, SamplingMode,
};
pub use self::prior::{fit_posterior, simulate_prior};
pub use self::sampler::Sampler;

// ---- Optional convenience prelude for downstream crates ------------------

pub mod prelude {
    pub use super::check::{PredictiveSummary, TestStatistic, predictive_check};
    pub use super::dataset::Dataset;
    pub use super::errors::{PredictiveError, PredictiveResult};
    pub use super::model_spec::{GroupingKey, Hyperparameters, ModelSpec, SamplingMode};
    pub use super::prior::{fit_posterior, simulate_prior};
    pub use super::sampler::Sampler;
}
