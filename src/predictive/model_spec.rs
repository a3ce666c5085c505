//! predictive::model_spec — declarative model specification.
//!
//! Purpose
//! -------
//! Describe a model to the external sampler: its name, whether the
//! likelihood is active, fixed prior hyperparameters, declared parameters,
//! and an optional grouping that turns a pooled model into an unpooled
//! (per-group) one.
//!
//! Key behaviors
//! -------------
//! - [`SamplingMode`] selects prior-only or posterior sampling.
//! - [`Hyperparameters`] is an ordered map of named finite scalars.
//! - [`ParameterDecl`] sizes resolve against the grouping:
//!   `ParameterShape::PerGroup` has one element per group when grouped and
//!   a single element when pooled.
//! - [`ModelSpec::with_mode`], [`ModelSpec::with_hyperparameter`] and
//!   [`ModelSpec::with_grouping`] return modified copies.
//!
//! Invariants & assumptions
//! ------------------------
//! - Names are non-empty; parameter names are unique.
//! - Hyperparameters are finite.
//! - A grouping has at least one group.
//!
//! Conventions
//! -----------
//! - Parameter vectors in [`Draw`](crate::draws::Draw) are laid out in
//!   declaration order; [`ModelSpec::parameter_range`] gives each slice.
use std::{collections::BTreeMap, ops::Range};

use crate::predictive::errors::{PredictiveError, PredictiveResult};

/// SamplingMode — whether the sampler conditions on the data.
///
/// Variants
/// --------
/// - `PriorOnly`: likelihood disabled; `y_rep` follows the prior
///   predictive distribution and draws carry no log-likelihood.
/// - `Posterior`: likelihood enabled; draws carry pointwise
///   log-likelihoods for LOO.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SamplingMode {
    PriorOnly,
    Posterior,
}

impl SamplingMode {
    pub fn uses_likelihood(self) -> bool {
        matches!(self, SamplingMode::Posterior)
    }
}

/// Hyperparameters — named, finite prior constants in name order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Hyperparameters(BTreeMap<String, f64>);

impl Hyperparameters {
    pub fn new() -> Self {
        Hyperparameters(BTreeMap::new())
    }

    /// Build from `(name, value)` pairs; later duplicates overwrite earlier ones.
    ///
    /// Errors
    /// ------
    /// - See [`Hyperparameters::insert`].
    pub fn from_pairs<I, S>(pairs: I) -> PredictiveResult<Self>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut out = Hyperparameters::new();
        for (name, value) in pairs {
            out.insert(name, value)?;
        }
        Ok(out)
    }

    /// Insert or replace a hyperparameter.
    ///
    /// Errors
    /// ------
    /// - `PredictiveError::EmptyName` for an empty name.
    /// - `PredictiveError::InvalidHyperparameter` for a non-finite value.
    pub fn insert(&mut self, name: impl Into<String>, value: f64) -> PredictiveResult<()> {
        let name = name.into();
        if name.is_empty() {
            return Err(PredictiveError::EmptyName);
        }
        if !value.is_finite() {
            return Err(PredictiveError::InvalidHyperparameter { name, value });
        }
        self.0.insert(name, value);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// GroupingKey — categorical index for per-group parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupingKey {
    pub name: String,
    pub n_groups: usize,
}

impl GroupingKey {
    /// Errors
    /// ------
    /// - `PredictiveError::EmptyName` for an empty name.
    /// - `PredictiveError::InvalidGroupCount` when `n_groups == 0`.
    pub fn new(name: impl Into<String>, n_groups: usize) -> PredictiveResult<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(PredictiveError::EmptyName);
        }
        if n_groups == 0 {
            return Err(PredictiveError::InvalidGroupCount { name, n_groups });
        }
        Ok(GroupingKey { name, n_groups })
    }
}

/// ParameterShape — how a parameter's length is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterShape {
    /// A single scalar.
    Scalar,
    /// A fixed-length vector.
    Vector(usize),
    /// One element per group; a scalar when the model is pooled.
    PerGroup,
}

/// ParameterDecl — a named parameter of the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterDecl {
    pub name: String,
    pub shape: ParameterShape,
}

impl ParameterDecl {
    pub fn new(name: impl Into<String>, shape: ParameterShape) -> Self {
        ParameterDecl { name: name.into(), shape }
    }

    /// Number of elements given the model's grouping.
    pub fn size(&self, grouping: Option<&GroupingKey>) -> usize {
        match (self.shape, grouping) {
            (ParameterShape::Scalar, _) => 1,
            (ParameterShape::Vector(n), _) => n,
            (ParameterShape::PerGroup, Some(g)) => g.n_groups,
            (ParameterShape::PerGroup, None) => 1,
        }
    }
}

/// ModelSpec — everything the sampler needs besides the data.
///
/// Fields
/// ------
/// - `name`: model label, carried into LOO outcomes and comparisons.
/// - `mode`: [`SamplingMode`].
/// - `hyperparameters`: fixed prior constants.
/// - `parameters`: declarations in parameter-vector order.
/// - `grouping`: `None` for a pooled model, `Some` for per-group effects.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSpec {
    name: String,
    mode: SamplingMode,
    hyperparameters: Hyperparameters,
    parameters: Vec<ParameterDecl>,
    grouping: Option<GroupingKey>,
}

impl ModelSpec {
    /// Build a validated specification in `Posterior` mode.
    ///
    /// Errors
    /// ------
    /// - `PredictiveError::EmptyName` for an empty model or parameter name.
    /// - `PredictiveError::DuplicateParameter` for repeated parameter names.
    /// - `PredictiveError::InvalidParameterSize` for `Vector(0)`.
    pub fn new(
        name: impl Into<String>, hyperparameters: Hyperparameters, parameters: Vec<ParameterDecl>,
        grouping: Option<GroupingKey>,
    ) -> PredictiveResult<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(PredictiveError::EmptyName);
        }
        for (i, decl) in parameters.iter().enumerate() {
            if decl.name.is_empty() {
                return Err(PredictiveError::EmptyName);
            }
            if decl.shape == ParameterShape::Vector(0) {
                return Err(PredictiveError::InvalidParameterSize { name: decl.name.clone() });
            }
            if parameters[..i].iter().any(|p| p.name == decl.name) {
                return Err(PredictiveError::DuplicateParameter(decl.name.clone()));
            }
        }
        Ok(ModelSpec { name, mode: SamplingMode::Posterior, hyperparameters, parameters, grouping })
    }

    /// Copy of `self` with a different sampling mode.
    pub fn with_mode(&self, mode: SamplingMode) -> Self {
        ModelSpec { mode, ..self.clone() }
    }

    /// Copy of `self` with one hyperparameter inserted or replaced.
    ///
    /// Errors
    /// ------
    /// - See [`Hyperparameters::insert`].
    pub fn with_hyperparameter(&self, name: impl Into<String>, value: f64) -> PredictiveResult<Self> {
        let mut out = self.clone();
        out.hyperparameters.insert(name, value)?;
        Ok(out)
    }

    /// Copy of `self` pooled (`None`) or grouped by `grouping`.
    pub fn with_grouping(&self, grouping: Option<GroupingKey>) -> Self {
        ModelSpec { grouping, ..self.clone() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mode(&self) -> SamplingMode {
        self.mode
    }

    pub fn hyperparameters(&self) -> &Hyperparameters {
        &self.hyperparameters
    }

    /// Hyperparameter `name`, if set.
    pub fn hyperparameter(&self, name: &str) -> Option<f64> {
        self.hyperparameters.get(name)
    }

    pub fn parameters(&self) -> &[ParameterDecl] {
        &self.parameters
    }

    pub fn grouping(&self) -> Option<&GroupingKey> {
        self.grouping.as_ref()
    }

    pub fn is_pooled(&self) -> bool {
        self.grouping.is_none()
    }

    /// Total parameter-vector length.
    pub fn n_params(&self) -> usize {
        self.parameters.iter().map(|p| p.size(self.grouping.as_ref())).sum()
    }

    /// Slice of the parameter vector occupied by `name`.
    pub fn parameter_range(&self, name: &str) -> Option<Range<usize>> {
        let mut start = 0;
        for decl in &self.parameters {
            let len = decl.size(self.grouping.as_ref());
            if decl.name == name {
                return Some(start..start + len);
            }
            start += len;
        }
        None
    }
}
