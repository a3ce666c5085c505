//! loo::diagnostics — Pareto-k reliability table and warnings.
//!
//! Purpose
//! -------
//! Classify the per-observation Pareto shape estimates `k_hat` produced by
//! PSIS, collect them into a reportable table, and derive the warnings an
//! operator acts on (e.g. exact refits for flagged observations).
//!
//! Key behaviors
//! -------------
//! - [`ParetoBucket::classify`] maps `k_hat` to good / ok / bad / very bad,
//!   or `Undefined` when the tail was too short to fit.
//! - [`ParetoTable`] holds one [`ParetoDiagnostic`] per observation, in
//!   observation order, and renders bucket counts plus per-observation rows.
//! - [`ParetoTable::warnings`] lists `DegenerateTail` and
//!   `UnreliableEstimate` conditions. Neither is an error; estimates stay
//!   in the LOO totals.
//!
//! Conventions
//! -----------
//! - `k_hat = +∞` encodes a tail whose fit was undefined (tied tail ratios,
//!   zero quartile exceedance); it lands in `VeryBad`.
use std::fmt;

use crate::loo::options::ParetoThresholds;

/// ParetoBucket — reliability class of one `k_hat`.
///
/// Variants
/// --------
/// - `Good`: `k_hat < good`.
/// - `Ok`: `good ≤ k_hat ≤ ok`; usable, flagged.
/// - `Bad`: `ok < k_hat ≤ 1`; unreliable.
/// - `VeryBad`: `k_hat > 1` (including `+∞`); unreliable, variance of the
///   raw ratios is infinite.
/// - `Undefined`: no fit was attempted (tail below the minimum size).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ParetoBucket {
    Good,
    Ok,
    Bad,
    VeryBad,
    Undefined,
}

impl ParetoBucket {
    /// All buckets in reporting order.
    pub const ALL: [ParetoBucket; 5] = [
        ParetoBucket::Good,
        ParetoBucket::Ok,
        ParetoBucket::Bad,
        ParetoBucket::VeryBad,
        ParetoBucket::Undefined,
    ];

    /// Classify a shape estimate against `thresholds`.
    pub fn classify(k_hat: Option<f64>, thresholds: &ParetoThresholds) -> Self {
        match k_hat {
            None => ParetoBucket::Undefined,
            Some(k) if k < thresholds.good => ParetoBucket::Good,
            Some(k) if k <= thresholds.ok => ParetoBucket::Ok,
            Some(k) if k <= 1.0 => ParetoBucket::Bad,
            Some(_) => ParetoBucket::VeryBad,
        }
    }

    /// Whether the estimate for this observation should not be trusted.
    pub fn is_unreliable(self) -> bool {
        matches!(self, ParetoBucket::Bad | ParetoBucket::VeryBad)
    }

    pub fn label(self) -> &'static str {
        match self {
            ParetoBucket::Good => "good",
            ParetoBucket::Ok => "ok",
            ParetoBucket::Bad => "bad",
            ParetoBucket::VeryBad => "very bad",
            ParetoBucket::Undefined => "undefined",
        }
    }
}

impl fmt::Display for ParetoBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// ParetoDiagnostic — PSIS diagnostics of one observation.
///
/// Fields
/// ------
/// - `observation`: column index `i`.
/// - `k_hat`: fitted shape; `None` when the tail was too short.
/// - `tail_len`: number of draws `M` in the tail.
/// - `n_eff`: PSIS effective sample size `r_eff / Σ w²`.
/// - `bucket`: classification of `k_hat`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParetoDiagnostic {
    pub observation: usize,
    pub k_hat: Option<f64>,
    pub tail_len: usize,
    pub n_eff: f64,
    pub bucket: ParetoBucket,
}

/// PsisWarningKind — reportable PSIS conditions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PsisWarningKind {
    /// Tail shorter than the minimum; raw weights used, `k_hat` undefined.
    DegenerateTail { tail_len: usize },
    /// `k_hat` above the `ok` threshold.
    UnreliableEstimate { k_hat: f64 },
}

/// PsisWarning — one flagged observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PsisWarning {
    pub observation: usize,
    pub kind: PsisWarningKind,
}

impl fmt::Display for PsisWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            PsisWarningKind::DegenerateTail { tail_len } => write!(
                f,
                "observation {}: degenerate tail ({tail_len} draws); raw importance weights used.",
                self.observation
            ),
            PsisWarningKind::UnreliableEstimate { k_hat } => write!(
                f,
                "observation {}: Pareto k = {k_hat:.3}; LOO estimate unreliable, consider an exact refit.",
                self.observation
            ),
        }
    }
}

/// ParetoTable — per-observation Pareto-k diagnostics.
///
/// Invariants
/// ----------
/// - `rows[i].observation == i`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParetoTable {
    rows: Vec<ParetoDiagnostic>,
    thresholds: ParetoThresholds,
}

impl ParetoTable {
    pub(crate) fn new(rows: Vec<ParetoDiagnostic>, thresholds: ParetoThresholds) -> Self {
        ParetoTable { rows, thresholds }
    }

    pub fn rows(&self) -> &[ParetoDiagnostic] {
        &self.rows
    }

    pub fn thresholds(&self) -> ParetoThresholds {
        self.thresholds
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// `k_hat` per observation.
    pub fn k_hat(&self) -> Vec<Option<f64>> {
        self.rows.iter().map(|r| r.k_hat).collect()
    }

    /// PSIS effective sample size per observation.
    pub fn n_eff(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.n_eff).collect()
    }

    /// Number of observations in `bucket`.
    pub fn count(&self, bucket: ParetoBucket) -> usize {
        self.rows.iter().filter(|r| r.bucket == bucket).count()
    }

    /// Largest defined `k_hat`, or `None` when no shape was fitted.
    pub fn max_k_hat(&self) -> Option<f64> {
        self.rows.iter().filter_map(|r| r.k_hat).reduce(f64::max)
    }

    /// Indices of observations that are not in the `Good` bucket.
    pub fn flagged(&self) -> Vec<usize> {
        self.rows.iter().filter(|r| r.bucket != ParetoBucket::Good).map(|r| r.observation).collect()
    }

    /// Indices of observations with `k_hat > ok`.
    pub fn unreliable(&self) -> Vec<usize> {
        self.rows.iter().filter(|r| r.bucket.is_unreliable()).map(|r| r.observation).collect()
    }

    /// Degenerate-tail and unreliable-estimate warnings, in observation order.
    pub fn warnings(&self) -> Vec<PsisWarning> {
        self.rows
            .iter()
            .filter_map(|r| {
                let kind = match (r.bucket, r.k_hat) {
                    (ParetoBucket::Undefined, _) => {
                        PsisWarningKind::DegenerateTail { tail_len: r.tail_len }
                    }
                    (b, Some(k_hat)) if b.is_unreliable() => {
                        PsisWarningKind::UnreliableEstimate { k_hat }
                    }
                    _ => return None,
                };
                Some(PsisWarning { observation: r.observation, kind })
            })
            .collect()
    }
}

impl fmt::Display for ParetoTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let t = self.thresholds;
        let n = self.rows.len().max(1) as f64;
        writeln!(f, "Pareto k diagnostic values:")?;
        writeln!(f, "{:<24} {:>8} {:>7}", "", "Count", "Pct.")?;
        for bucket in ParetoBucket::ALL {
            let range = match bucket {
                ParetoBucket::Good => format!("(-Inf, {})", t.good),
                ParetoBucket::Ok => format!("[{}, {}]", t.good, t.ok),
                ParetoBucket::Bad => format!("({}, 1]", t.ok),
                ParetoBucket::VeryBad => "(1, Inf)".to_string(),
                ParetoBucket::Undefined => "-".to_string(),
            };
            let count = self.count(bucket);
            writeln!(
                f,
                "{:<24} {:>8} {:>6.1}%",
                format!("{range} ({bucket})"),
                count,
                100.0 * count as f64 / n
            )?;
        }
        writeln!(f)?;
        writeln!(f, "{:>6} {:>8} {:>6} {:>10} {:<10}", "obs", "k_hat", "M", "n_eff", "bucket")?;
        for r in &self.rows {
            let k = match r.k_hat {
                Some(k) => format!("{k:.3}"),
                None => "NA".to_string(),
            };
            writeln!(
                f,
                "{:>6} {:>8} {:>6} {:>10.1} {:<10}",
                r.observation, k, r.tail_len, r.n_eff, r.bucket
            )?;
        }
        Ok(())
    }
}
