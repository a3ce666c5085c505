//! predictive::check — predictive summaries and p-value checks.
//!
//! Purpose
//! -------
//! Summarize replicated outcomes `y_rep` on the outcome scale, and compare
//! them with observed data through test statistics. Used after
//! [`simulate_prior`](crate::predictive::simulate_prior) to judge prior
//! plausibility and after [`fit_posterior`](crate::predictive::fit_posterior)
//! as a posterior predictive check.
//!
//! Key behaviors
//! -------------
//! - [`PredictiveSummary::from_draws`] reports, per observation, the mean
//!   and the 5% / 50% / 95% quantiles of `y_rep`, plus the pooled mean and
//!   standard deviation over all draws and observations.
//! - [`predictive_check`] computes `T(y_rep_s)` for every draw and the
//!   p-value `P(T(y_rep) ≥ T(y))`.
//!
//! Conventions
//! -----------
//! - Quantiles follow `statrs::statistics::OrderStatistics::quantile`.
//! - Standard deviations use the `n − 1` denominator.
use ndarray::{Array1, ArrayView1, Axis};
use statrs::statistics::{Data, OrderStatistics, Statistics};

use crate::{
    draws::DrawStore,
    predictive::{
        dataset::Dataset,
        errors::{PredictiveError, PredictiveResult},
    },
};

/// PredictiveSummary — distribution of `y_rep` per observation.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictiveSummary {
    pub mean: Array1<f64>,
    pub q05: Array1<f64>,
    pub q50: Array1<f64>,
    pub q95: Array1<f64>,
    pub pooled_mean: f64,
    pub pooled_sd: f64,
}

impl PredictiveSummary {
    /// Summarize the replicated outcomes of a draw store.
    pub fn from_draws(store: &DrawStore) -> Self {
        let y_rep = store.y_rep_matrix();
        let n_obs = y_rep.ncols();
        let mut mean = Array1::zeros(n_obs);
        let mut q05 = Array1::zeros(n_obs);
        let mut q50 = Array1::zeros(n_obs);
        let mut q95 = Array1::zeros(n_obs);
        for (i, column) in y_rep.axis_iter(Axis(1)).enumerate() {
            mean[i] = column.iter().mean();
            let mut data = Data::new(column.to_vec());
            q05[i] = data.quantile(0.05);
            q50[i] = data.quantile(0.5);
            q95[i] = data.quantile(0.95);
        }
        PredictiveSummary {
            mean,
            q05,
            q50,
            q95,
            pooled_mean: y_rep.iter().mean(),
            pooled_sd: y_rep.iter().std_dev(),
        }
    }

    /// Share of observed outcomes inside their 90% predictive interval.
    ///
    /// Errors
    /// ------
    /// - `PredictiveError::DimensionMismatch { what: "outcomes", .. }` when
    ///   the dataset length differs from the summary.
    pub fn coverage_90(&self, data: &Dataset) -> PredictiveResult<f64> {
        check_outcome_len(self.mean.len(), data)?;
        let inside = data
            .outcomes()
            .iter()
            .zip(self.q05.iter().zip(&self.q95))
            .filter(|(y, (lo, hi))| lo <= y && y <= hi)
            .count();
        Ok(inside as f64 / data.len() as f64)
    }
}

/// TestStatistic — scalar summaries of an outcome vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TestStatistic {
    Mean,
    StdDev,
    Min,
    Max,
}

impl TestStatistic {
    pub const ALL: [TestStatistic; 4] =
        [TestStatistic::Mean, TestStatistic::StdDev, TestStatistic::Min, TestStatistic::Max];

    /// Evaluate the statistic on `values`.
    pub fn compute(self, values: ArrayView1<'_, f64>) -> f64 {
        match self {
            TestStatistic::Mean => values.iter().mean(),
            TestStatistic::StdDev => values.iter().std_dev(),
            TestStatistic::Min => values.fold(f64::INFINITY, |acc, &v| acc.min(v)),
            TestStatistic::Max => values.fold(f64::NEG_INFINITY, |acc, &v| acc.max(v)),
        }
    }
}

/// PredictiveCheck — observed statistic against its predictive distribution.
///
/// Fields
/// ------
/// - `statistic`: which `T` was used.
/// - `observed`: `T(y)`.
/// - `replicated`: `T(y_rep_s)` for each draw, chain-major.
/// - `p_value`: share of draws with `T(y_rep_s) ≥ T(y)`.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictiveCheck {
    pub statistic: TestStatistic,
    pub observed: f64,
    pub replicated: Array1<f64>,
    pub p_value: f64,
}

/// Compute the predictive p-value of `statistic` for observed `data`.
///
/// Errors
/// ------
/// - `PredictiveError::DimensionMismatch { what: "outcomes", .. }` when the
///   dataset length differs from the number of replicated observations.
pub fn predictive_check(
    store: &DrawStore, data: &Dataset, statistic: TestStatistic,
) -> PredictiveResult<PredictiveCheck> {
    check_outcome_len(store.n_obs(), data)?;
    let observed = statistic.compute(data.outcomes());
    let replicated: Array1<f64> =
        store.iter().map(|draw| statistic.compute(draw.y_rep.view())).collect();
    let exceed = replicated.iter().filter(|t| **t >= observed).count();
    let p_value = exceed as f64 / replicated.len() as f64;
    Ok(PredictiveCheck { statistic, observed, replicated, p_value })
}

/// Run [`predictive_check`] for every [`TestStatistic`].
pub fn predictive_checks(store: &DrawStore, data: &Dataset) -> PredictiveResult<Vec<PredictiveCheck>> {
    TestStatistic::ALL.iter().map(|&t| predictive_check(store, data, t)).collect()
}

fn check_outcome_len(expected: usize, data: &Dataset) -> PredictiveResult<()> {
    if data.len() != expected {
        return Err(PredictiveError::DimensionMismatch {
            what: "outcomes",
            expected,
            found: data.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draws::Draw;
    use approx::assert_relative_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Per-observation means, medians and pooled moments on a tiny store.
    // - p-values at the extremes and in the middle of the replicated
    //   distribution.
    // - Outcome length validation.
    // -------------------------------------------------------------------------

    fn store() -> DrawStore {
        let draws: Vec<Draw> = (0..5)
            .map(|s| {
                let v = s as f64;
                Draw::new(array![v], array![v, 10.0 + v], Array1::zeros(0))
            })
            .collect();
        DrawStore::new(vec![draws]).unwrap()
    }

    #[test]
    // Purpose
    // -------
    // Check summary statistics on hand-computable replicates.
    //
    // Given
    // -----
    // - y_rep draws (0, 10), (1, 11), ..., (4, 14).
    //
    // Expect
    // ------
    // - mean = (2, 12), median = (2, 12), pooled mean = 7.
    // - 5% quantile ≤ 5% ≤ 95% quantile per observation.
    fn summary_reports_means_and_quantiles() {
        // Act
        let summary = PredictiveSummary::from_draws(&store());

        // Assert
        assert_eq!(summary.mean.to_vec(), vec![2.0, 12.0]);
        assert_relative_eq!(summary.q50[0], 2.0, epsilon = 1e-12);
        assert_relative_eq!(summary.q50[1], 12.0, epsilon = 1e-12);
        assert!(summary.q05[1] < summary.q50[1] && summary.q50[1] < summary.q95[1]);
        assert_relative_eq!(summary.pooled_mean, 7.0, epsilon = 1e-12);
        assert!(summary.pooled_sd > 5.0);
    }

    #[test]
    // Purpose
    // -------
    // Verify p-values count draws with T(y_rep) ≥ T(y).
    //
    // Given
    // -----
    // - Replicated means 5, 6, 7, 8, 9; observed y = (1, 13) with mean 7,
    //   and y = (-100, -100) with mean -100.
    //
    // Expect
    // ------
    // - p = 3/5 for the first, 1 for the second.
    fn p_value_counts_exceedances() {
        // Arrange
        let store = store();
        let centred = Dataset::new(array![1.0, 13.0], None).unwrap();
        let low = Dataset::new(array![-100.0, -100.0], None).unwrap();

        // Act
        let mid = predictive_check(&store, &centred, TestStatistic::Mean).unwrap();
        let extreme = predictive_check(&store, &low, TestStatistic::Max).unwrap();

        // Assert
        assert_eq!(mid.replicated.to_vec(), vec![5.0, 6.0, 7.0, 8.0, 9.0]);
        assert_relative_eq!(mid.p_value, 0.6, epsilon = 1e-12);
        assert_eq!(extreme.p_value, 1.0);
        assert_eq!(predictive_checks(&store, &centred).unwrap().len(), 4);
    }

    #[test]
    fn outcome_length_must_match_replicates() {
        let data = Dataset::new(array![1.0, 2.0, 3.0], None).unwrap();

        let err = predictive_check(&store(), &data, TestStatistic::Min).unwrap_err();

        assert_eq!(err, PredictiveError::DimensionMismatch { what: "outcomes", expected: 2, found: 3 });
    }

    #[test]
    fn coverage_counts_outcomes_inside_interval() {
        let summary = PredictiveSummary::from_draws(&store());
        let data = Dataset::new(array![2.0, 100.0], None).unwrap();

        assert_relative_eq!(summary.coverage_90(&data).unwrap(), 0.5, epsilon = 1e-12);
    }
}
