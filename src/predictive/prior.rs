//! predictive::prior — prior and posterior predictive simulation.
//!
//! Purpose
//! -------
//! Drive the external [`Sampler`] for the two stages of the workflow:
//! prior predictive simulation (likelihood disabled) to judge whether the
//! priors produce plausible outcomes, and posterior sampling (likelihood
//! enabled) to produce the draws consumed by the LOO engine.
//!
//! Key behaviors
//! -------------
//! - [`simulate_prior`] forces `SamplingMode::PriorOnly` on a copy of the
//!   specification; the caller's value is untouched, so the call can be
//!   repeated with new hyperparameters.
//! - [`fit_posterior`] forces `SamplingMode::Posterior` and requires
//!   pointwise log-likelihoods in every draw.
//! - Sampler output is validated into a [`DrawStore`] and checked against
//!   the dataset length and declared parameter count.
//!
//! Invariants & assumptions
//! ------------------------
//! - Stateless: no side effects beyond calling the sampler and logging.
//! - The dataset is checked against the specification before sampling.
use crate::{
    draws::{DrawError, DrawStore},
    predictive::{
        dataset::Dataset,
        errors::{PredictiveError, PredictiveResult},
        model_spec::{ModelSpec, SamplingMode},
        sampler::Sampler,
    },
};

/// Simulate from the prior predictive distribution.
///
/// Parameters
/// ----------
/// - `sampler`: the external sampler.
/// - `spec`: model specification; its mode is overridden with `PriorOnly`.
/// - `data`: dataset supplying the design (size, groups). Outcomes are not
///   conditioned on.
///
/// Returns
/// -------
/// `PredictiveResult<DrawStore>`
///   Draws whose `y_rep` follows the prior predictive distribution.
///
/// Errors
/// ------
/// - Dataset/specification incompatibilities (see [`Dataset::check_against`]).
/// - `PredictiveError::Sampler` when the sampler fails.
/// - `PredictiveError::Draw` or `DimensionMismatch` for malformed output.
pub fn simulate_prior<S>(sampler: &S, spec: &ModelSpec, data: &Dataset) -> PredictiveResult<DrawStore>
where
    S: Sampler + ?Sized,
{
    run(sampler, &spec.with_mode(SamplingMode::PriorOnly), data)
}

/// Sample from the posterior given the observed outcomes.
///
/// Errors
/// ------
/// - As for [`simulate_prior`], plus
///   `PredictiveError::Draw(DrawError::MissingLogLik)` when the sampler
///   returns draws without pointwise log-likelihoods.
pub fn fit_posterior<S>(sampler: &S, spec: &ModelSpec, data: &Dataset) -> PredictiveResult<DrawStore>
where
    S: Sampler + ?Sized,
{
    run(sampler, &spec.with_mode(SamplingMode::Posterior), data)
}

fn run<S>(sampler: &S, spec: &ModelSpec, data: &Dataset) -> PredictiveResult<DrawStore>
where
    S: Sampler + ?Sized,
{
    data.check_against(spec)?;
    log::info!(
        "Sampling model '{}' ({:?}) on {} observations.",
        spec.name(),
        spec.mode(),
        data.len()
    );

    let chains = sampler.sample(spec, data)?;
    let store = DrawStore::new(chains)?;

    if store.n_obs() != data.len() {
        return Err(PredictiveError::DimensionMismatch {
            what: "y_rep",
            expected: data.len(),
            found: store.n_obs(),
        });
    }
    if store.n_params() != spec.n_params() {
        return Err(PredictiveError::DimensionMismatch {
            what: "params",
            expected: spec.n_params(),
            found: store.n_params(),
        });
    }
    match spec.mode() {
        SamplingMode::Posterior if !store.has_log_lik() => {
            return Err(DrawError::MissingLogLik.into());
        }
        SamplingMode::PriorOnly if store.has_log_lik() => {
            log::debug!("Prior-only draws of '{}' carry log-likelihoods; ignored.", spec.name());
        }
        _ => {}
    }

    log::debug!(
        "Model '{}': {} chains, {} draws, {} parameters.",
        spec.name(),
        store.n_chains(),
        store.n_draws(),
        store.n_params()
    );
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draws::Draw;
    use crate::predictive::model_spec::{Hyperparameters, ParameterDecl, ParameterShape};
    use ndarray::{Array1, array};
    use std::sync::Mutex;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - The sampling mode seen by the sampler for each entry point.
    // - Validation of sampler output against the dataset and spec.
    // - Propagation of sampler failures.
    //
    // The seeded end-to-end sampler lives in the integration tests.
    // -------------------------------------------------------------------------

    /// Records the mode it was called with and emits fixed draws.
    struct RecordingSampler {
        seen: Mutex<Vec<SamplingMode>>,
        n_obs: usize,
    }

    impl Sampler for RecordingSampler {
        fn sample(&self, spec: &ModelSpec, _data: &Dataset) -> anyhow::Result<Vec<Vec<Draw>>> {
            self.seen.lock().map_err(|_| anyhow::anyhow!("poisoned"))?.push(spec.mode());
            let log_lik = if spec.mode().uses_likelihood() {
                Array1::from_elem(self.n_obs, -1.0)
            } else {
                Array1::zeros(0)
            };
            let draw = Draw::new(array![0.5], Array1::zeros(self.n_obs), log_lik);
            Ok(vec![vec![draw.clone(), draw]])
        }
    }

    struct FailingSampler;

    impl Sampler for FailingSampler {
        fn sample(&self, _spec: &ModelSpec, _data: &Dataset) -> anyhow::Result<Vec<Vec<Draw>>> {
            anyhow::bail!("initialization failed")
        }
    }

    fn spec() -> ModelSpec {
        ModelSpec::new(
            "normal",
            Hyperparameters::from_pairs([("mu_scale", 1.0)]).unwrap(),
            vec![ParameterDecl::new("mu", ParameterShape::Scalar)],
            None,
        )
        .unwrap()
    }

    #[test]
    // Purpose
    // -------
    // Ensure each entry point forces its sampling mode on a copy.
    //
    // Given
    // -----
    // - A spec in Posterior mode, passed to simulate_prior then fit_posterior.
    //
    // Expect
    // ------
    // - The sampler sees PriorOnly then Posterior; the caller's ModelSpec is unchanged.
    // - Only the posterior store carries log-likelihoods.
    fn entry_points_force_sampling_mode() {
        // Arrange
        let sampler = RecordingSampler { seen: Mutex::new(Vec::new()), n_obs: 3 };
        let data = Dataset::new(array![0.1, 0.2, 0.3], None).unwrap();
        let spec = spec();

        // Act
        let prior = simulate_prior(&sampler, &spec, &data).unwrap();
        let post = fit_posterior(&sampler, &spec, &data).unwrap();

        // Assert
        assert_eq!(
            *sampler.seen.lock().unwrap(),
            vec![SamplingMode::PriorOnly, SamplingMode::Posterior]
        );
        assert_eq!(spec.mode(), SamplingMode::Posterior);
        assert!(!prior.has_log_lik());
        assert!(post.has_log_lik());
        assert_eq!(post.n_draws(), 2);
    }

    #[test]
    fn output_shape_is_checked_against_dataset() {
        let sampler = RecordingSampler { seen: Mutex::new(Vec::new()), n_obs: 2 };
        let data = Dataset::new(array![0.1, 0.2, 0.3], None).unwrap();

        let err = simulate_prior(&sampler, &spec(), &data).unwrap_err();

        assert_eq!(err, PredictiveError::DimensionMismatch { what: "y_rep", expected: 3, found: 2 });
    }

    #[test]
    fn sampler_failures_surface_as_sampler_errors() {
        let data = Dataset::new(array![0.1], None).unwrap();

        let err = fit_posterior(&FailingSampler, &spec(), &data).unwrap_err();

        assert_eq!(err, PredictiveError::Sampler("initialization failed".into()));
    }
}
