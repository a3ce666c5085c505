//! loo::compare — paired comparison of PSIS-LOO outcomes.
//!
//! Purpose
//! -------
//! Compare models fitted to the same observations through the
//! per-observation differences of their `elpd_i`, which cancels the
//! observation-to-observation variability both models share.
//!
//! Key behaviors
//! -------------
//! - [`compare`] returns `elpd_diff = elpd_loo(B) − elpd_loo(A)` and
//!   `se_diff = sqrt(N · var_i(elpd_i(B) − elpd_i(A)))`. Positive means B
//!   is expected to predict new data better.
//! - [`ComparisonOutcome::prob_b_better`] is the normal approximation
//!   `Φ(elpd_diff / se_diff)`.
//! - [`compare_models`] ranks any number of outcomes by `elpd_loo`, best
//!   first, with every difference taken against the best model.
//!
//! Invariants & assumptions
//! ------------------------
//! - Outcomes must share the observation count; otherwise
//!   `IncompatibleModels`. Observation order is assumed to match.
//! - `compare(a, b)` and `compare(b, a)` are exact negatives with equal
//!   `se_diff`.
use std::fmt;

use ndarray::Array1;
use statrs::distribution::{ContinuousCDF, Normal};

use crate::loo::{
    aggregate::{LooOutcome, se_of_total},
    errors::{LooError, LooResult},
};

/// ComparisonOutcome — `B − A` difference in expected log predictive density.
///
/// Fields
/// ------
/// - `model_a`, `model_b`: labels of the compared outcomes.
/// - `elpd_diff`: `elpd_loo(B) − elpd_loo(A)`.
/// - `se_diff`: paired standard error of `elpd_diff`.
/// - `pointwise_diff`: `elpd_i(B) − elpd_i(A)`.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonOutcome {
    pub model_a: String,
    pub model_b: String,
    pub elpd_diff: f64,
    pub se_diff: f64,
    pub pointwise_diff: Array1<f64>,
}

/// Compare two LOO outcomes computed on the same observations.
///
/// Errors
/// ------
/// - `LooError::IncompatibleModels` when the observation counts differ.
pub fn compare(a: &LooOutcome, b: &LooOutcome) -> LooResult<ComparisonOutcome> {
    if a.n_obs() != b.n_obs() {
        return Err(LooError::IncompatibleModels {
            model_a: a.model().to_string(),
            model_b: b.model().to_string(),
            n_a: a.n_obs(),
            n_b: b.n_obs(),
        });
    }
    let pointwise_diff = &b.pointwise.elpd - &a.pointwise.elpd;
    Ok(ComparisonOutcome {
        model_a: a.model().to_string(),
        model_b: b.model().to_string(),
        elpd_diff: pointwise_diff.sum(),
        se_diff: se_of_total(pointwise_diff.view()),
        pointwise_diff,
    })
}

impl ComparisonOutcome {
    /// Label of the model with the larger `elpd_loo`; `None` on an exact tie.
    pub fn winner(&self) -> Option<&str> {
        if self.elpd_diff > 0.0 {
            Some(&self.model_b)
        } else if self.elpd_diff < 0.0 {
            Some(&self.model_a)
        } else {
            None
        }
    }

    /// `elpd_diff / se_diff`.
    pub fn z_score(&self) -> f64 {
        self.elpd_diff / self.se_diff
    }

    /// Normal-approximation probability that B predicts better than A.
    ///
    /// Notes
    /// -----
    /// - With `se_diff = 0` the difference is certain: 1, 0, or 0.5 on a tie.
    /// - `NaN` when `se_diff` is undefined (single observation).
    pub fn prob_b_better(&self) -> f64 {
        if self.se_diff.is_nan() {
            return f64::NAN;
        }
        if self.se_diff == 0.0 {
            return if self.elpd_diff > 0.0 {
                1.0
            } else if self.elpd_diff < 0.0 {
                0.0
            } else {
                0.5
            };
        }
        Normal::standard().cdf(self.z_score())
    }
}

impl fmt::Display for ComparisonOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "elpd_diff ({} - {}) = {:.1} ± {:.1}; ",
            self.model_b, self.model_a, self.elpd_diff, self.se_diff
        )?;
        match self.winner() {
            Some(w) => write!(f, "'{w}' is expected to predict better."),
            None => write!(f, "no difference."),
        }
    }
}

/// RankedModel — one row of a multi-model comparison.
///
/// `elpd_diff` and `se_diff` are relative to the best model (0 for it).
#[derive(Debug, Clone, PartialEq)]
pub struct RankedModel {
    pub model: String,
    pub elpd_loo: f64,
    pub se_elpd_loo: f64,
    pub elpd_diff: f64,
    pub se_diff: f64,
}

/// ModelComparison — outcomes ranked by `elpd_loo`, best first.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelComparison {
    pub ranked: Vec<RankedModel>,
}

impl ModelComparison {
    pub fn best(&self) -> Option<&RankedModel> {
        self.ranked.first()
    }
}

/// Rank several outcomes and difference each against the best.
///
/// Errors
/// ------
/// - `LooError::IncompatibleModels` naming the first outcome whose
///   observation count differs from the best model's.
pub fn compare_models(outcomes: &[&LooOutcome]) -> LooResult<ModelComparison> {
    let mut sorted: Vec<&LooOutcome> = outcomes.to_vec();
    sorted.sort_by(|x, y| y.elpd_loo.total_cmp(&x.elpd_loo));
    let Some(best) = sorted.first().copied() else {
        return Ok(ModelComparison { ranked: Vec::new() });
    };

    let ranked = sorted
        .iter()
        .map(|outcome| {
            let diff = compare(best, outcome)?;
            Ok(RankedModel {
                model: outcome.model().to_string(),
                elpd_loo: outcome.elpd_loo,
                se_elpd_loo: outcome.se_elpd_loo,
                elpd_diff: diff.elpd_diff,
                se_diff: if std::ptr::eq(*outcome, best) { 0.0 } else { diff.se_diff },
            })
        })
        .collect::<LooResult<Vec<_>>>()?;
    Ok(ModelComparison { ranked })
}

impl fmt::Display for ModelComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<16} {:>10} {:>8} {:>10} {:>8}",
            "model", "elpd_loo", "se", "elpd_diff", "se_diff"
        )?;
        for r in &self.ranked {
            writeln!(
                f,
                "{:<16} {:>10.1} {:>8.1} {:>10.1} {:>8.1}",
                r.model, r.elpd_loo, r.se_elpd_loo, r.elpd_diff, r.se_diff
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loo::{LooOptions, PointwiseLogLik, loo};
    use approx::assert_relative_eq;
    use ndarray::Array2;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Antisymmetry of the pairwise comparison.
    // - The paired SE being smaller than the naive combined SE when models
    //   share observation-level variability.
    // - Incompatible observation counts.
    // - Ranking of several models.
    // -------------------------------------------------------------------------

    fn constant_model(name: &str, values: &[f64]) -> LooOutcome {
        let ll = Array2::from_shape_fn((8, values.len()), |(_, i)| values[i]);
        let pw = PointwiseLogLik::from_matrix(ll, 2).unwrap();
        loo(&pw, &LooOptions::default()).with_model(name)
    }

    fn shared_and_shifted() -> (LooOutcome, LooOutcome) {
        let base: Vec<f64> = (0..10).map(|i| -1.0 - 0.5 * i as f64).collect();
        let shifted: Vec<f64> =
            base.iter().enumerate().map(|(i, v)| v + if i % 2 == 0 { 0.1 } else { 0.05 }).collect();
        (constant_model("a", &base), constant_model("b", &shifted))
    }

    #[test]
    // Purpose
    // -------
    // Check compare(A, B) and compare(B, A) are exact negatives.
    //
    // Given
    // -----
    // - Model b improves every observation of model a by 0.05 or 0.1.
    //
    // Expect
    // ------
    // - elpd_diff(a, b) = 0.75 = −elpd_diff(b, a); equal se_diff.
    // - Winner "b" both ways.
    fn comparison_is_antisymmetric() {
        // Arrange
        let (a, b) = shared_and_shifted();

        // Act
        let ab = compare(&a, &b).unwrap();
        let ba = compare(&b, &a).unwrap();

        // Assert
        assert_relative_eq!(ab.elpd_diff, 0.75, epsilon = 1e-12);
        assert_relative_eq!(ab.elpd_diff, -ba.elpd_diff, epsilon = 1e-14);
        assert_relative_eq!(ab.se_diff, ba.se_diff, epsilon = 1e-14);
        assert_eq!(ab.winner(), Some("b"));
        assert_eq!(ba.winner(), Some("b"));
        assert_relative_eq!(ab.prob_b_better() + ba.prob_b_better(), 1.0, epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Verify pairing removes shared observation-level variability.
    //
    // Given
    // -----
    // - The same two models; per-observation elpd spreads over [−5.5, −1].
    //
    // Expect
    // ------
    // - se_diff < sqrt(se_a² + se_b²).
    fn paired_se_is_smaller_than_naive_combination() {
        let (a, b) = shared_and_shifted();

        let cmp = compare(&a, &b).unwrap();
        let naive = (a.se_elpd_loo.powi(2) + b.se_elpd_loo.powi(2)).sqrt();

        assert!(cmp.se_diff < naive, "paired {} vs naive {naive}", cmp.se_diff);
        assert!(cmp.prob_b_better() > 0.5);
    }

    #[test]
    fn mismatched_observation_counts_are_incompatible() {
        let a = constant_model("a", &[-1.0, -2.0, -3.0]);
        let b = constant_model("b", &[-1.0, -2.0]);

        let err = compare(&a, &b).unwrap_err();

        assert_eq!(
            err,
            LooError::IncompatibleModels {
                model_a: "a".into(),
                model_b: "b".into(),
                n_a: 3,
                n_b: 2
            }
        );
    }

    #[test]
    fn identical_models_tie_with_zero_se() {
        let a = constant_model("a", &[-1.0, -2.0]);
        let b = constant_model("b", &[-1.0, -2.0]);

        let cmp = compare(&a, &b).unwrap();

        assert_eq!(cmp.winner(), None);
        assert_eq!(cmp.se_diff, 0.0);
        assert_eq!(cmp.prob_b_better(), 0.5);
        assert!(cmp.to_string().contains("no difference"));
    }

    #[test]
    // Purpose
    // -------
    // Ensure ranking orders by elpd_loo and differences against the best.
    //
    // Given
    // -----
    // - Three models with elpd_loo −3, −2.5, −4.
    //
    // Expect
    // ------
    // - Order mid, low, worst with diffs 0, −0.5, −1.5.
    fn compare_models_ranks_best_first() {
        // Arrange
        let low = constant_model("low", &[-1.0, -2.0]);
        let mid = constant_model("mid", &[-1.0, -1.5]);
        let worst = constant_model("worst", &[-2.0, -2.0]);

        // Act
        let table = compare_models(&[&low, &mid, &worst]).unwrap();

        // Assert
        let names: Vec<&str> = table.ranked.iter().map(|r| r.model.as_str()).collect();
        assert_eq!(names, vec!["mid", "low", "worst"]);
        assert_relative_eq!(table.ranked[1].elpd_diff, -0.5, epsilon = 1e-12);
        assert_relative_eq!(table.ranked[2].elpd_diff, -1.5, epsilon = 1e-12);
        assert_eq!(table.best().map(|r| r.elpd_diff), Some(0.0));
        assert!(compare_models(&[]).unwrap().ranked.is_empty());
    }
}
