//! draws — typed containers for sampler output.
//!
//! Purpose
//! -------
//! Hold posterior and prior draws produced by an external sampler,
//! grouped by chain, and expose them in the matrix shapes consumed by the
//! LOO engine and the predictive summaries.
//!
//! Key behaviors
//! -------------
//! - [`Draw`] bundles a parameter vector, replicated outcomes `y_rep`, and
//!   pointwise log-likelihoods for one iteration of one chain.
//! - [`DrawStore`] validates shapes and finiteness once, preserves
//!   within-chain order, and produces chain-major `S × k` matrices.
//! - [`DrawError`] / [`DrawResult`] report every shape or precondition
//!   failure; the shared guards live in [`validation`].
//!
//! Invariants & assumptions
//! ------------------------
//! - Chain membership is immutable once a store is built.
//! - Within-chain order is meaningful (autocorrelation); chain order is
//!   not, and no result downstream depends on it.
//!
//! Downstream usage
//! ----------------
//! - Samplers return `Vec<Vec<Draw>>`; the predictive layer wraps that in
//!   a [`DrawStore`].
//! - The pointwise extractor (`loo::pointwise`) reads the log-likelihood
//!   matrix and chain structure from a [`DrawStore`].

pub mod errors;
pub mod store;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::errors::{DrawError, DrawResult};
pub use self::store::{Draw, DrawStore};
