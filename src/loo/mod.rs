//! loo — approximate leave-one-out cross-validation with PSIS.
//!
//! Purpose
//! -------
//! Estimate out-of-sample predictive accuracy from a single set of
//! posterior draws. Pareto-smoothed importance sampling (PSIS) reweights
//! the draws to approximate each leave-one-out posterior, with a Pareto
//! shape diagnostic telling the caller when the approximation cannot be
//! trusted.
//!
//! Key behaviors
//! -------------
//! - [`PointwiseLogLik`] holds the validated `S × N` log-likelihood
//!   matrix, chain membership, and relative efficiencies
//!   ([`relative_efficiency`]).
//! - [`psis`] smooths the importance ratios of every observation using a
//!   generalized Pareto tail fit ([`fit_gpd`]).
//! - [`loo`] aggregates the smoothed weights into a [`LooOutcome`]
//!   (`elpd_loo`, `se_elpd_loo`, `p_loo`, `looic`, Monte Carlo SE and a
//!   [`ParetoTable`]).
//! - [`compare`] / [`compare_models`] difference outcomes observation by
//!   observation.
//! - [`LooOptions`] configures thresholds, tail sizing, the GPD grid and
//!   parallel dispatch.
//!
//! Invariants & assumptions
//! ------------------------
//! - Shape and precondition failures are [`LooError`]s; reliability
//!   problems (degenerate tails, large `k_hat`) are [`PsisWarning`]s on
//!   the outcome and are logged through the `log` facade.
//! - Every computation is a pure function of its inputs; results are
//!   identical with and without the `parallel` feature.
//!
//! Conventions
//! -----------
//! - Matrices are `draws × observations`, rows in chain-major order.
//! - Comparisons report `B − A`; positive favours B.
//!
//! Downstream usage
//! ----------------
//! - Typical pipeline:
//!   `DrawStore → PointwiseLogLik::from_draws → loo → compare`.
//! - `use rust_loo::loo::prelude::*;` imports the primary surface.
//!
//! Testing notes
//! -------------
//! - Unit tests live beside each submodule; the end-to-end scenarios
//!   (constant likelihoods, outlier detection, chain-order invariance,
//!   comparison antisymmetry) are in `tests/integration_loo_pipeline.rs`.

pub mod aggregate;
pub mod compare;
pub mod diagnostics;
pub mod efficiency;
pub mod errors;
pub mod gpd;
pub mod options;
pub mod pointwise;
pub mod psis;

// ---- Re-exports (primary surface) -----------------------------------------

pub use self::aggregate::{LooOutcome, PointwiseLoo, loo};
pub use self::compare::{ComparisonOutcome, ModelComparison, RankedModel, compare, compare_models};
pub use self::diagnostics::{
    ParetoBucket, ParetoDiagnostic, ParetoTable, PsisWarning, PsisWarningKind,
};
pub use self::efficiency::{effective_sample_size, relative_efficiency};
pub use self::errors::{LooError, LooResult};
pub use self::gpd::{GpdFit, fit_gpd, gpd_quantile};
pub use self::options::{GpdOptions, LooOptions, ParetoThresholds, TailOptions};
pub use self::pointwise::PointwiseLogLik;
pub use self::psis::{PsisOutcome, SmoothedWeights, psis, psis_smooth};

// ---- Optional convenience prelude for downstream crates ------------------

pub mod prelude {
    pub use super::aggregate::{LooOutcome, loo};
    pub use super::compare::{ComparisonOutcome, compare, compare_models};
    pub use super::diagnostics::{ParetoBucket, PsisWarning, PsisWarningKind};
    pub use super::errors::{LooError, LooResult};
    pub use super::options::LooOptions;
    pub use super::pointwise::PointwiseLogLik;
}
