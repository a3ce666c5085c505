//! LOO options — configuration for PSIS smoothing and diagnostics.
//!
//! Purpose
//! -------
//! Collect every tunable constant of the PSIS-LOO computation in one
//! validated place: Pareto-k reliability thresholds, the tail-size rule,
//! the generalized Pareto grid, and whether per-observation work runs on
//! the rayon pool.
//!
//! Key behaviors
//! -------------
//! - [`ParetoThresholds`] classifies `k_hat` into good / ok / bad buckets.
//! - [`TailOptions::tail_len`] evaluates
//!   `M = min(⌈fraction·S⌉, ⌈multiplier·sqrt(S / r_eff)⌉)`.
//! - [`GpdOptions`] sizes the profile-likelihood grid and toggles the
//!   weakly informative shrinkage of `k_hat` toward 0.5.
//! - [`LooOptions`] bundles the three plus the `parallel` flag.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every constructor validates its inputs and returns [`LooResult`];
//!   `Default` values are the published PSIS constants (0.5 / 0.7, 0.2,
//!   3.0, minimum tail 5, grid of 30 + ⌊sqrt(M)⌋ points, prior scale 3).
//! - Options are plain `Copy` data; no hidden state.
//!
//! Testing notes
//! -------------
//! - Unit tests cover defaults, each rejection branch, and the tail-size
//!   formula on hand-computable inputs.
use crate::loo::errors::{LooError, LooResult};

/// ParetoThresholds — cutoffs for the `k_hat` reliability buckets.
///
/// Fields
/// ------
/// - `good`: `f64`
///   `k_hat < good` is reliable. Default `0.5`.
/// - `ok`: `f64`
///   `good ≤ k_hat ≤ ok` is usable but flagged; `k_hat > ok` is
///   unreliable. Default `0.7`.
///
/// Invariants
/// ----------
/// - Both finite with `0 < good ≤ ok`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParetoThresholds {
    pub good: f64,
    pub ok: f64,
}

impl ParetoThresholds {
    /// Construct validated thresholds.
    ///
    /// Errors
    /// ------
    /// - `LooError::InvalidThresholds { good, ok }` unless both are finite and
    ///   `0 < good ≤ ok`.
    pub fn new(good: f64, ok: f64) -> LooResult<Self> {
        if !(good.is_finite() && ok.is_finite() && good > 0.0 && good <= ok) {
            return Err(LooError::InvalidThresholds { good, ok });
        }
        Ok(ParetoThresholds { good, ok })
    }
}

impl Default for ParetoThresholds {
    fn default() -> Self {
        ParetoThresholds { good: 0.5, ok: 0.7 }
    }
}

/// TailOptions — rule for how many of the largest ratios form the tail.
///
/// Fields
/// ------
/// - `fraction`: `f64`
///   Upper bound on the tail as a share of all draws. Default `0.2`.
/// - `multiplier`: `f64`
///   Multiplier on `sqrt(S / r_eff)`. Default `3.0`.
/// - `min_tail`: `usize`
///   Tails shorter than this are not smoothed (`k_hat` undefined).
///   Default `5`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TailOptions {
    pub fraction: f64,
    pub multiplier: f64,
    pub min_tail: usize,
}

impl TailOptions {
    /// Construct validated tail options.
    ///
    /// Errors
    /// ------
    /// - `LooError::InvalidTailFraction` unless `0 < fraction < 1`.
    /// - `LooError::InvalidTailMultiplier` unless `multiplier` is finite and `> 0`.
    /// - `LooError::InvalidMinTail` when `min_tail == 0`.
    pub fn new(fraction: f64, multiplier: f64, min_tail: usize) -> LooResult<Self> {
        if !(fraction > 0.0 && fraction < 1.0) {
            return Err(LooError::InvalidTailFraction(fraction));
        }
        if !(multiplier.is_finite() && multiplier > 0.0) {
            return Err(LooError::InvalidTailMultiplier(multiplier));
        }
        if min_tail == 0 {
            return Err(LooError::InvalidMinTail(min_tail));
        }
        Ok(TailOptions { fraction, multiplier, min_tail })
    }

    /// Tail length `M` for `n_draws` draws at relative efficiency `r_eff`.
    ///
    /// Returns `min(⌈fraction·S⌉, ⌈multiplier·sqrt(S / r_eff)⌉)`, capped at
    /// `S − 1` so that at least one draw remains below the tail threshold.
    pub fn tail_len(&self, n_draws: usize, r_eff: f64) -> usize {
        let s = n_draws as f64;
        let by_fraction = (self.fraction * s).ceil();
        let by_efficiency = (self.multiplier * (s / r_eff).sqrt()).ceil();
        let m = by_fraction.min(by_efficiency) as usize;
        m.min(n_draws.saturating_sub(1))
    }
}

impl Default for TailOptions {
    fn default() -> Self {
        TailOptions { fraction: 0.2, multiplier: 3.0, min_tail: 5 }
    }
}

/// GpdOptions — generalized Pareto grid-fit configuration.
///
/// Fields
/// ------
/// - `min_grid_points`: `usize`
///   Base grid size; the fit evaluates `min_grid_points + ⌊sqrt(M)⌋`
///   candidates. Default `30`.
/// - `prior_scale`: `f64`
///   Scale of the grid spacing around the first-quartile anchor.
///   Default `3.0`.
/// - `weakly_informative`: `bool`
///   Shrink `k_hat` toward 0.5 as `(M·k + 5) / (M + 10)`. Default `true`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpdOptions {
    pub min_grid_points: usize,
    pub prior_scale: f64,
    pub weakly_informative: bool,
}

impl GpdOptions {
    /// Construct validated GPD options.
    ///
    /// Errors
    /// ------
    /// - `LooError::InvalidGridSize` when `min_grid_points == 0`.
    /// - `LooError::InvalidGpdPrior` unless `prior_scale` is finite and `> 0`.
    pub fn new(min_grid_points: usize, prior_scale: f64, weakly_informative: bool) -> LooResult<Self> {
        if min_grid_points == 0 {
            return Err(LooError::InvalidGridSize(min_grid_points));
        }
        if !(prior_scale.is_finite() && prior_scale > 0.0) {
            return Err(LooError::InvalidGpdPrior(prior_scale));
        }
        Ok(GpdOptions { min_grid_points, prior_scale, weakly_informative })
    }
}

impl Default for GpdOptions {
    fn default() -> Self {
        GpdOptions { min_grid_points: 30, prior_scale: 3.0, weakly_informative: true }
    }
}

/// LooOptions — full configuration of a PSIS-LOO run.
///
/// Fields
/// ------
/// - `thresholds`: [`ParetoThresholds`]
/// - `tail`: [`TailOptions`]
/// - `gpd`: [`GpdOptions`]
/// - `parallel`: `bool`
///   Fan per-observation work out on rayon. Ignored when the crate is
///   built without the `parallel` feature. Results are identical either
///   way. Default `true`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LooOptions {
    pub thresholds: ParetoThresholds,
    pub tail: TailOptions,
    pub gpd: GpdOptions,
    pub parallel: bool,
}

impl LooOptions {
    /// Bundle already-validated components.
    pub fn new(thresholds: ParetoThresholds, tail: TailOptions, gpd: GpdOptions, parallel: bool) -> Self {
        LooOptions { thresholds, tail, gpd, parallel }
    }

    /// Copy of `self` with per-observation parallelism switched on or off.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

impl Default for LooOptions {
    fn default() -> Self {
        LooOptions {
            thresholds: ParetoThresholds::default(),
            tail: TailOptions::default(),
            gpd: GpdOptions::default(),
            parallel: true,
        }
    }
}
