//! Vector utilities shared by ranking, clustering and gap analysis.

use crate::error::{MatchError, Result};
use crate::model::Vector;

/// Decimal digits kept on every externally visible score.
pub const SCORE_PRECISION: i32 = 4;

/// Check that a vector is non-empty and every component is finite.
pub fn validate(v: &[f32]) -> Result<()> {
    if v.is_empty() {
        return Err(MatchError::EmptyVector);
    }
    if let Some(index) = v.iter().position(|x| !x.is_finite()) {
        return Err(MatchError::NonFinite { index });
    }
    Ok(())
}

/// Validate a vector and additionally require a non-zero magnitude.
pub fn validate_nonzero(v: &[f32]) -> Result<()> {
    validate(v)?;
    if norm(v) == 0.0 {
        return Err(MatchError::ZeroMagnitude);
    }
    Ok(())
}

/// Require `v` to have exactly `expected` components.
pub fn check_dimension(v: &[f32], expected: usize) -> Result<()> {
    if v.len() != expected {
        return Err(MatchError::DimensionMismatch {
            expected,
            found: v.len(),
        });
    }
    Ok(())
}

pub fn dot(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| *x as f64 * *y as f64)
        .sum()
}

pub fn norm(a: &[f32]) -> f64 {
    a.iter().map(|x| (*x as f64) * (*x as f64)).sum::<f64>().sqrt()
}

/// Compute cosine similarity between two vectors.
///
/// Fails on length mismatch, empty or non-finite input, and zero magnitude.
/// The result is clamped to [-1, 1] to absorb rounding at the extremes.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f64> {
    validate(a)?;
    check_dimension(b, a.len())?;
    validate(b)?;
    let norm_a = norm(a);
    let norm_b = norm(b);
    if norm_a == 0.0 || norm_b == 0.0 {
        return Err(MatchError::ZeroMagnitude);
    }
    Ok((dot(a, b) / (norm_a * norm_b)).clamp(-1.0, 1.0))
}

pub fn squared_euclidean(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = *x as f64 - *y as f64;
            d * d
        })
        .sum()
}

pub fn euclidean(a: &[f32], b: &[f32]) -> f64 {
    squared_euclidean(a, b).sqrt()
}

/// Element-wise mean of equally sized vectors. `None` for an empty input.
pub fn mean<'a, I>(vectors: I) -> Option<Vector>
where
    I: IntoIterator<Item = &'a [f32]>,
{
    let mut iter = vectors.into_iter();
    let first = iter.next()?;
    let mut sums: Vec<f64> = first.iter().map(|x| *x as f64).collect();
    let mut count = 1usize;
    for v in iter {
        for (s, x) in sums.iter_mut().zip(v.iter()) {
            *s += *x as f64;
        }
        count += 1;
    }
    Some(sums.into_iter().map(|s| (s / count as f64) as f32).collect())
}

/// Round a score to [`SCORE_PRECISION`] decimal digits.
pub fn round_score(x: f64) -> f64 {
    let factor = 10f64.powi(SCORE_PRECISION);
    (x * factor).round() / factor
}
