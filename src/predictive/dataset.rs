//! predictive::dataset — observed outcomes handed to the sampler.
//!
//! A [`Dataset`] is an outcome vector plus, for grouped models, one group
//! index per observation. It is validated on construction and checked
//! against a [`ModelSpec`] before every sampler call.
use ndarray::{Array1, ArrayView1};

use crate::predictive::{
    errors::{PredictiveError, PredictiveResult},
    model_spec::ModelSpec,
};

/// Dataset — outcomes and optional group membership.
///
/// Invariants
/// ----------
/// - At least one outcome; all outcomes finite.
/// - When present, `groups.len() == outcomes.len()`.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    outcomes: Array1<f64>,
    groups: Option<Vec<usize>>,
}

impl Dataset {
    /// Errors
    /// ------
    /// - `PredictiveError::EmptyDataset` for no outcomes.
    /// - `PredictiveError::NonFiniteOutcome` at the first `NaN`/`±∞`.
    /// - `PredictiveError::DimensionMismatch { what: "groups", .. }` when
    ///   `groups` has a different length than `outcomes`.
    pub fn new(outcomes: Array1<f64>, groups: Option<Vec<usize>>) -> PredictiveResult<Self> {
        if outcomes.is_empty() {
            return Err(PredictiveError::EmptyDataset);
        }
        if let Some((index, &value)) = outcomes.indexed_iter().find(|(_, v)| !v.is_finite()) {
            return Err(PredictiveError::NonFiniteOutcome { index, value });
        }
        if let Some(g) = &groups {
            if g.len() != outcomes.len() {
                return Err(PredictiveError::DimensionMismatch {
                    what: "groups",
                    expected: outcomes.len(),
                    found: g.len(),
                });
            }
        }
        Ok(Dataset { outcomes, groups })
    }

    /// Check that the data can be used with `spec`.
    ///
    /// A pooled model ignores group indices; a grouped model requires them,
    /// each below the declared number of groups.
    ///
    /// Errors
    /// ------
    /// - `PredictiveError::GroupingMismatch` for a grouped model on
    ///   ungrouped data.
    /// - `PredictiveError::GroupIndexOutOfRange` for an index `≥ n_groups`.
    pub fn check_against(&self, spec: &ModelSpec) -> PredictiveResult<()> {
        let Some(key) = spec.grouping() else {
            return Ok(());
        };
        let Some(groups) = &self.groups else {
            return Err(PredictiveError::GroupingMismatch { model_grouped: true, data_grouped: false });
        };
        if let Some((index, &group)) = groups.iter().enumerate().find(|(_, g)| **g >= key.n_groups) {
            return Err(PredictiveError::GroupIndexOutOfRange { index, group, n_groups: key.n_groups });
        }
        Ok(())
    }

    pub fn outcomes(&self) -> ArrayView1<'_, f64> {
        self.outcomes.view()
    }

    pub fn groups(&self) -> Option<&[usize]> {
        self.groups.as_deref()
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}
