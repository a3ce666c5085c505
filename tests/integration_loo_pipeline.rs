//! Integration tests for the predictive → PSIS-LOO → comparison workflow.
//!
//! Purpose
//! -------
//! - Validate the end-to-end pipeline: a seeded sampler behind the
//!   `Sampler` trait, prior and posterior simulation, pointwise
//!   log-likelihood extraction, PSIS smoothing, LOO aggregation and model
//!   comparison.
//! - Pin the behavioral properties the engine guarantees (normalized
//!   weights, constant-likelihood closed form, draw-order invariance,
//!   antisymmetric comparisons, outlier detection).
//!
//! Coverage
//! --------
//! - `predictive`: `ModelSpec` pooled vs. grouped variants, `Dataset`,
//!   `simulate_prior`, `fit_posterior`, `PredictiveSummary`,
//!   `predictive_check`.
//! - `draws`: `DrawStore` built from sampler output and from matrices.
//! - `loo`: `PointwiseLogLik`, `psis`, `loo`, `compare`, `compare_models`,
//!   diagnostics and warnings.
//!
//! Exclusions
//! ----------
//! - Fine-grained GPD, efficiency and option validation, covered by unit
//!   tests.
//! - Python bindings.
use approx::assert_relative_eq;
use ndarray::{Array1, Array2, array};
use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};
use rand_distr::{Distribution, Normal};
use rust_loo::{
    draws::{Draw, DrawError, DrawStore},
    loo::{
        LooError, LooOptions, LooOutcome, ParetoBucket, PointwiseLogLik, PsisWarningKind, compare,
        compare_models, loo, psis,
    },
    numerical_stability::log_sum_exp,
    predictive::{
        Dataset, GroupingKey, Hyperparameters, ModelSpec, ParameterDecl, ParameterShape,
        PredictiveSummary, Sampler, TestStatistic, fit_posterior, predictive_check,
        simulate_prior,
    },
};

// ---- Toy sampler --------------------------------------------------------------

/// Purpose
/// -------
/// Exact conjugate sampler for `y_i ~ Normal(alpha[g_i], sigma)` with a
/// `Normal(mu_loc, mu_scale)` prior on each intercept and known `sigma`.
///
/// Behavior
/// --------
/// - `PriorOnly`: intercepts from the prior, no log-likelihood.
/// - `Posterior`: intercepts from the closed-form posterior of each group
///   (one group when the spec is pooled), with pointwise log-likelihoods.
/// - Draws are independent, so relative efficiencies are close to 1.
/// - Chain `c` uses `StdRng::seed_from_u64(seed + c)`.
struct ConjugateNormalSampler {
    n_chains: usize,
    n_draws: usize,
    seed: u64,
}

fn normal_log_pdf(y: f64, mean: f64, sd: f64) -> f64 {
    -0.5 * (2.0 * std::f64::consts::PI * sd * sd).ln() - (y - mean).powi(2) / (2.0 * sd * sd)
}

impl Sampler for ConjugateNormalSampler {
    fn sample(&self, spec: &ModelSpec, data: &Dataset) -> anyhow::Result<Vec<Vec<Draw>>> {
        let hyper = |name: &str| {
            spec.hyperparameter(name).ok_or_else(|| anyhow::anyhow!("missing hyperparameter {name}"))
        };
        let (mu_loc, mu_scale, sigma) = (hyper("mu_loc")?, hyper("mu_scale")?, hyper("sigma")?);
        let n_groups = spec.grouping().map_or(1, |g| g.n_groups);
        let group_of = |i: usize| match (spec.grouping(), data.groups()) {
            (Some(_), Some(groups)) => groups[i],
            _ => 0,
        };

        // Per-group (mean, sd) of the intercept distribution to draw from.
        let y = data.outcomes();
        let mut dists = Vec::with_capacity(n_groups);
        for g in 0..n_groups {
            if spec.mode().uses_likelihood() {
                let members: Vec<f64> =
                    (0..data.len()).filter(|&i| group_of(i) == g).map(|i| y[i]).collect();
                let precision = 1.0 / mu_scale.powi(2) + members.len() as f64 / sigma.powi(2);
                let mean = (mu_loc / mu_scale.powi(2) + members.iter().sum::<f64>() / sigma.powi(2))
                    / precision;
                dists.push(Normal::new(mean, precision.sqrt().recip())?);
            } else {
                dists.push(Normal::new(mu_loc, mu_scale)?);
            }
        }

        let mut chains = Vec::with_capacity(self.n_chains);
        for c in 0..self.n_chains {
            let mut rng = StdRng::seed_from_u64(self.seed + c as u64);
            let mut draws = Vec::with_capacity(self.n_draws);
            for _ in 0..self.n_draws {
                let alpha: Array1<f64> = dists.iter().map(|d| d.sample(&mut rng)).collect();
                let y_rep: Array1<f64> = (0..data.len())
                    .map(|i| Normal::new(alpha[group_of(i)], sigma).map(|d| d.sample(&mut rng)))
                    .collect::<Result<_, _>>()?;
                let log_lik: Array1<f64> = if spec.mode().uses_likelihood() {
                    (0..data.len()).map(|i| normal_log_pdf(y[i], alpha[group_of(i)], sigma)).collect()
                } else {
                    Array1::zeros(0)
                };
                draws.push(Draw::new(alpha, y_rep, log_lik));
            }
            chains.push(draws);
        }
        Ok(chains)
    }
}

fn normal_spec(name: &str, mu_scale: f64, grouping: Option<GroupingKey>) -> ModelSpec {
    let hyper =
        Hyperparameters::from_pairs([("mu_loc", 0.0), ("mu_scale", mu_scale), ("sigma", 1.0)])
            .expect("finite hyperparameters");
    let params = vec![ParameterDecl::new("alpha", ParameterShape::PerGroup)];
    ModelSpec::new(name, hyper, params, grouping).expect("valid spec")
}

fn pooled_spec(mu_scale: f64) -> ModelSpec {
    normal_spec("pooled", mu_scale, None)
}

fn unpooled_spec() -> ModelSpec {
    normal_spec("unpooled", 10.0, Some(GroupingKey::new("site", 3).expect("three groups")))
}

/// Three sites with means −2, 0 and 3, ten observations each, residuals
/// spread deterministically over roughly ±0.8.
fn grouped_data() -> Dataset {
    let means = [-2.0, 0.0, 3.0];
    let mut y = Vec::new();
    let mut groups = Vec::new();
    for (g, m) in means.iter().enumerate() {
        for j in 0..10 {
            let offset = 1.6 * ((j as f64 * 0.618_033_988_7).fract() - 0.5);
            y.push(m + offset);
            groups.push(g);
        }
    }
    Dataset::new(Array1::from(y), Some(groups)).expect("valid dataset")
}

fn sampler() -> ConjugateNormalSampler {
    ConjugateNormalSampler { n_chains: 4, n_draws: 250, seed: 20_240_601 }
}

// ---- Predictive workflow ------------------------------------------------------

#[test]
// Purpose
// -------
// Ensure prior predictive simulation reflects the prior scale and is
// re-callable with new hyperparameters.
//
// Given
// -----
// - The pooled spec at mu_scale = 1, then at mu_scale = 10 via
//   `with_hyperparameter`.
//
// Expect
// ------
// - No log-likelihood in prior draws.
// - Pooled SD of y_rep near sqrt(1 + 1) and sqrt(100 + 1) respectively.
fn prior_predictive_tracks_hyperparameters() {
    // Arrange
    let data = grouped_data();
    let narrow = pooled_spec(1.0);
    let wide = narrow.with_hyperparameter("mu_scale", 10.0).unwrap();

    // Act
    let narrow_store = simulate_prior(&sampler(), &narrow, &data).unwrap();
    let wide_store = simulate_prior(&sampler(), &wide, &data).unwrap();
    let narrow_summary = PredictiveSummary::from_draws(&narrow_store);
    let wide_summary = PredictiveSummary::from_draws(&wide_store);

    // Assert
    assert!(!narrow_store.has_log_lik());
    assert_eq!(narrow_store.n_draws(), 1000);
    assert!((narrow_summary.pooled_sd - 2.0_f64.sqrt()).abs() < 0.3);
    assert!((wide_summary.pooled_sd - 101.0_f64.sqrt()).abs() < 1.5);
    assert_eq!(narrow.hyperparameter("mu_scale"), Some(1.0));
    assert!(matches!(
        PointwiseLogLik::from_draws(&narrow_store),
        Err(LooError::Draw(DrawError::MissingLogLik))
    ));
}

#[test]
fn posterior_predictive_check_is_calibrated_for_the_mean() {
    let data = grouped_data();
    let store = fit_posterior(&sampler(), &unpooled_spec(), &data).unwrap();

    let check = predictive_check(&store, &data, TestStatistic::Mean).unwrap();
    let summary = PredictiveSummary::from_draws(&store);

    assert!(check.p_value > 0.05 && check.p_value < 0.95, "p = {}", check.p_value);
    assert!(summary.coverage_90(&data).unwrap() > 0.7);
}

#[test]
fn grouped_model_requires_group_indices() {
    let data = Dataset::new(array![0.0, 1.0], None).unwrap();

    let err = fit_posterior(&sampler(), &unpooled_spec(), &data).unwrap_err();

    assert!(err.to_string().contains("Grouping mismatch"), "Got: {err}");
}

// ---- PSIS-LOO properties ------------------------------------------------------

#[test]
// Purpose
// -------
// Verify normalized weights across every observation of a posterior run.
//
// Given
// -----
// - Posterior draws of the unpooled model (4 × 250 draws, 30 observations).
//
// Expect
// ------
// - Each column of smoothed weights sums to 1.
// - All k_hat defined and below 0.7 for this well-specified model.
fn psis_weights_sum_to_one_per_observation() {
    // Arrange
    let store = fit_posterior(&sampler(), &unpooled_spec(), &grouped_data()).unwrap();
    let pointwise = PointwiseLogLik::from_draws(&store).unwrap();

    // Act
    let smoothed = psis(&pointwise, &LooOptions::default());

    // Assert
    for column in smoothed.log_weights.columns() {
        assert_relative_eq!(log_sum_exp(column.iter().copied()), 0.0, epsilon = 1e-10);
    }
    assert!(smoothed.diagnostics.rows().iter().all(|r| r.k_hat.is_some_and(|k| k < 0.7)));
}

#[test]
// Purpose
// -------
// Check the constant-likelihood scenario end to end.
//
// Given
// -----
// - 2 chains × 4 draws × 3 observations, every log-likelihood −1.0.
//
// Expect
// ------
// - elpd_i = −1 for all i, elpd_loo = −3, p_loo = 0.
// - k_hat finite for every observation; no warnings.
fn constant_likelihood_reproduces_itself() {
    // Arrange
    let store = DrawStore::from_log_lik(Array2::from_elem((8, 3), -1.0).view(), 2).unwrap();

    // Act
    let out = LooOutcome::from_draws(&store, &LooOptions::default()).unwrap();

    // Assert
    for e in &out.pointwise.elpd {
        assert_relative_eq!(*e, -1.0, epsilon = 1e-12);
    }
    assert_relative_eq!(out.elpd_loo, -3.0, epsilon = 1e-12);
    assert_relative_eq!(out.p_loo, 0.0, epsilon = 1e-12);
    assert!(out.diagnostics.k_hat().iter().all(|k| k.is_some_and(f64::is_finite)));
    assert!(out.warnings().is_empty());
}

#[test]
// Purpose
// -------
// Ensure a heavy-tailed observation is detected and reported, not dropped.
//
// Given
// -----
// - 4 chains × 250 draws, 4 observations. Observation 0 has importance
//   ratios u^(−1.5) for u spread over (0, 1), a Pareto tail with shape
//   1.5; the others vary smoothly in [−1.5, −1].
//
// Expect
// ------
// - k_hat_0 > 0.7, observation 0 flagged UnreliableEstimate.
// - The bounded observations stay below 0.7.
// - elpd_loo still finite and includes observation 0.
fn heavy_tailed_observation_is_flagged_unreliable() {
    // Arrange
    let spread = |s: usize| (s as f64 * 0.618_033_988_7).fract();
    let ll = Array2::from_shape_fn((1000, 4), |(s, i)| {
        if i == 0 {
            1.5 * (0.0005 + 0.999 * spread(s)).ln()
        } else {
            -1.0 - 0.5 * spread(s * (i + 1))
        }
    });
    let pointwise = PointwiseLogLik::from_matrix(ll, 4).unwrap();

    // Act
    let out = loo(&pointwise, &LooOptions::default());

    // Assert
    let k0 = out.diagnostics.rows()[0].k_hat.expect("tail long enough to fit");
    assert!(k0 > 0.7, "k_hat = {k0}");
    assert!(out.diagnostics.rows()[0].bucket.is_unreliable());
    assert_eq!(out.unreliable_observations(), vec![0]);
    assert!(out.warnings().iter().any(|w| w.observation == 0
        && matches!(w.kind, PsisWarningKind::UnreliableEstimate { .. })));
    assert!(out.elpd_loo.is_finite());
    assert_eq!(out.pointwise.elpd.len(), 4);
}

#[test]
// Purpose
// -------
// Verify invariance to the order of draws and of chains.
//
// Given
// -----
// - 4 chains × 25 draws × 5 observations (S = 100, so the tail is always
//   ⌈0.2·S⌉ = 20 regardless of r_eff).
// - The same rows shuffled with a seeded RNG, and the chain blocks
//   reversed.
//
// Expect
// ------
// - elpd_loo, p_loo and every k_hat agree to 1e-9.
fn results_are_invariant_to_draw_and_chain_order() {
    // Arrange
    let ll = Array2::from_shape_fn((100, 5), |(s, i)| {
        -1.0 - 0.3 * i as f64 - ((s * (i + 2)) as f64 * 0.618_033_988_7).fract().powi(2)
    });
    let mut rows: Vec<usize> = (0..100).collect();
    rows.shuffle(&mut StdRng::seed_from_u64(7));
    let shuffled = ll.select(ndarray::Axis(0), &rows);
    let reversed_chains: Vec<usize> =
        (0..4).rev().flat_map(|c| (c * 25)..((c + 1) * 25)).collect();
    let reordered = ll.select(ndarray::Axis(0), &reversed_chains);
    let opts = LooOptions::default();

    // Act
    let base = loo(&PointwiseLogLik::from_matrix(ll, 4).unwrap(), &opts);
    let others = [
        loo(&PointwiseLogLik::from_matrix(shuffled, 4).unwrap(), &opts),
        loo(&PointwiseLogLik::from_matrix(reordered, 4).unwrap(), &opts),
    ];

    // Assert
    for other in &others {
        assert_relative_eq!(base.elpd_loo, other.elpd_loo, max_relative = 1e-9);
        assert_relative_eq!(base.p_loo, other.p_loo, epsilon = 1e-9);
        for (a, b) in base.diagnostics.k_hat().iter().zip(other.diagnostics.k_hat()) {
            let (a, b) = (a.expect("tail of 20"), b.expect("tail of 20"));
            assert_relative_eq!(a, b, epsilon = 1e-9);
        }
    }
}

// ---- Model comparison ---------------------------------------------------------

#[test]
// Purpose
// -------
// Compare pooled and unpooled fits of clearly separated groups.
//
// Given
// -----
// - Sites with means −2, 0, 3 and unit noise; pooled vs unpooled model.
//
// Expect
// ------
// - Unpooled wins with elpd_diff > 2·se_diff.
// - compare(a, b) = −compare(b, a) with equal se_diff.
// - A finite, positive paired se_diff.
fn unpooled_model_wins_on_separated_groups() {
    // Arrange
    let data = grouped_data();
    let pooled_store = fit_posterior(&sampler(), &pooled_spec(10.0), &data).unwrap();
    let unpooled_store = fit_posterior(&sampler(), &unpooled_spec(), &data).unwrap();
    let opts = LooOptions::default();

    // Act
    let pooled = LooOutcome::from_draws(&pooled_store, &opts).unwrap().with_model("pooled");
    let unpooled = LooOutcome::from_draws(&unpooled_store, &opts).unwrap().with_model("unpooled");
    let ab = compare(&pooled, &unpooled).unwrap();
    let ba = compare(&unpooled, &pooled).unwrap();

    // Assert
    assert_eq!(ab.winner(), Some("unpooled"));
    assert!(ab.elpd_diff > 2.0 * ab.se_diff, "{ab}");
    assert_relative_eq!(ab.elpd_diff, -ba.elpd_diff, epsilon = 1e-12);
    assert_relative_eq!(ab.se_diff, ba.se_diff, epsilon = 1e-12);
    assert!(ab.se_diff.is_finite() && ab.se_diff > 0.0);
    assert!(ab.prob_b_better() > 0.97);

    let ranking = compare_models(&[&pooled, &unpooled]).unwrap();
    assert_eq!(ranking.best().map(|r| r.model.as_str()), Some("unpooled"));
}

#[test]
fn comparing_different_datasets_is_incompatible() {
    let a = loo(
        &PointwiseLogLik::from_matrix(Array2::from_elem((8, 3), -1.0), 2).unwrap(),
        &LooOptions::default(),
    );
    let b = loo(
        &PointwiseLogLik::from_matrix(Array2::from_elem((8, 4), -1.0), 2).unwrap(),
        &LooOptions::default(),
    );

    assert!(matches!(compare(&a, &b), Err(LooError::IncompatibleModels { n_a: 3, n_b: 4, .. })));
}

#[test]
fn short_runs_report_degenerate_tails() {
    // 20 draws: tail = min(4, 14) = 4 < 5.
    let ll = Array2::from_shape_fn((20, 2), |(s, i)| -1.0 - 0.1 * ((s + i) % 7) as f64);
    let out = loo(&PointwiseLogLik::from_matrix(ll, 2).unwrap(), &LooOptions::default());

    assert_eq!(out.diagnostics.count(ParetoBucket::Undefined), 2);
    assert!(out
        .warnings()
        .iter()
        .all(|w| matches!(w.kind, PsisWarningKind::DegenerateTail { tail_len: 4 })));
    assert!(out.elpd_loo.is_finite());
}
