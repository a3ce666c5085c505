//! draws::validation — shared input guards for sampler output.
//!
//! Purpose
//! -------
//! Centralize the length and finiteness checks applied to every draw so
//! [`DrawStore`](crate::draws::DrawStore) construction and the pointwise
//! extractor report identical errors for identical problems.
//!
//! Conventions
//! -----------
//! - Purely validation: no allocation beyond error construction, no I/O.
//! - Checks stop at the first offending element.

use crate::draws::errors::{DrawError, DrawResult};

/// Require `found == expected` for the vector named `what`.
///
/// Errors
/// ------
/// - `DrawError::DimensionMismatch { what, expected, found }`.
#[inline]
pub fn check_len(what: &'static str, expected: usize, found: usize) -> DrawResult<()> {
    if expected != found {
        return Err(DrawError::DimensionMismatch { what, expected, found });
    }
    Ok(())
}

/// Require every value of one draw's field to be finite.
///
/// Parameters
/// ----------
/// - `what`: field name used in the error payload.
/// - `chain`, `iteration`: location of the draw.
/// - `values`: the field's entries in index order.
///
/// Errors
/// ------
/// - `DrawError::NonFiniteValue { .. }` for the first `NaN`/`±∞` entry.
pub fn check_finite<I>(
    what: &'static str, chain: usize, iteration: usize, values: I,
) -> DrawResult<()>
where
    I: IntoIterator<Item = f64>,
{
    for (index, value) in values.into_iter().enumerate() {
        if !value.is_finite() {
            return Err(DrawError::NonFiniteValue { what, chain, iteration, index, value });
        }
    }
    Ok(())
}

/// Require all chains to share one length; returns that length.
///
/// Parameters
/// ----------
/// - `lengths`: chain lengths in chain order. Must be non-empty.
///
/// Errors
/// ------
/// - `DrawError::EmptyStore` for an empty input.
/// - `DrawError::ChainLengthMismatch { chain, expected, found }` naming the
///   first chain whose length differs from chain 0.
pub fn check_equal_chain_lengths<I>(lengths: I) -> DrawResult<usize>
where
    I: IntoIterator<Item = usize>,
{
    let mut iter = lengths.into_iter().enumerate();
    let (_, expected) = iter.next().ok_or(DrawError::EmptyStore)?;
    for (chain, found) in iter {
        if found != expected {
            return Err(DrawError::ChainLengthMismatch { chain, expected, found });
        }
    }
    Ok(expected)
}
