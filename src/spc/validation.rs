//! Precondition checks shared by every calculator.
//!
//! Each check returns the first violated precondition; callers run them in
//! the documented order so the reported error is deterministic.

use crate::error::{Result, SpcError};

use super::chart::ControlLimits;
use super::constants::{MAX_SAMPLE_SIZE, MIN_SAMPLE_SIZE};

/// Rejects NaN and infinite values.
///
/// `offset` is added to the reported index so subgroup checks can report
/// the position in flattened input order.
pub(crate) fn ensure_finite(values: &[f64], offset: usize) -> Result<()> {
    match values.iter().position(|x| !x.is_finite()) {
        Some(i) => Err(SpcError::NonFiniteValue {
            index: offset + i,
            value: values[i],
        }),
        None => Ok(()),
    }
}

/// Accepts a statistic computed from already-validated input.
///
/// Inputs are finite and non-empty by the time this runs, so a missing or
/// non-finite result means the arithmetic overflowed.
pub(crate) fn finite_statistic(value: Option<f64>) -> Result<f64> {
    match value {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(SpcError::Overflow),
    }
}

/// Rejects limits with a non-finite center line or bound.
pub(crate) fn finite_limits(limits: ControlLimits) -> Result<ControlLimits> {
    if [limits.center_line, limits.ucl, limits.lcl]
        .iter()
        .all(|x| x.is_finite())
    {
        Ok(limits)
    } else {
        Err(SpcError::Overflow)
    }
}

/// Requires at least `required` values.
pub(crate) fn ensure_min_len(values: &[f64], required: usize) -> Result<()> {
    if values.len() < required {
        return Err(SpcError::InsufficientValues {
            required,
            actual: values.len(),
        });
    }
    Ok(())
}

/// Validates a subgroup set for X-bar/R analysis and returns the common
/// subgroup size.
///
/// Order: non-empty, identical sizes, size within 2..=25, finite values.
pub(crate) fn subgroup_size<S: AsRef<[f64]>>(subgroups: &[S]) -> Result<usize> {
    let first = subgroups.first().ok_or(SpcError::EmptySubgroups)?;
    let n = first.as_ref().len();

    if let Some((index, sg)) = subgroups
        .iter()
        .enumerate()
        .find(|(_, sg)| sg.as_ref().len() != n)
    {
        return Err(SpcError::InconsistentSubgroupSize {
            expected: n,
            actual: sg.as_ref().len(),
            index,
        });
    }

    if !(MIN_SAMPLE_SIZE..=MAX_SAMPLE_SIZE).contains(&n) {
        return Err(SpcError::InvalidSubgroupSize(n));
    }

    ensure_all_finite(subgroups)?;
    Ok(n)
}

/// Finite check across a subgroup set, indexing in flattened order.
pub(crate) fn ensure_all_finite<S: AsRef<[f64]>>(subgroups: &[S]) -> Result<()> {
    let mut offset = 0;
    for sg in subgroups {
        let sg = sg.as_ref();
        ensure_finite(sg, offset)?;
        offset += sg.len();
    }
    Ok(())
}

/// Validates a moving-range span against a series of `len` values.
///
/// Requires `2 <= span <= len - 1` and a span with tabulated constants.
pub(crate) fn moving_range_span(span: usize, len: usize) -> Result<()> {
    let max = len.saturating_sub(1).min(MAX_SAMPLE_SIZE);
    if span < MIN_SAMPLE_SIZE || span > max {
        return Err(SpcError::InvalidSpan { span, max });
    }
    Ok(())
}

/// Sigma multipliers must be finite and non-negative.
pub(crate) fn sigma_multiplier(k: f64) -> Result<()> {
    if !k.is_finite() || k < 0.0 {
        return Err(SpcError::InvalidSigmaMultiplier(k));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subgroup_size_order_of_checks() {
        let empty: Vec<Vec<f64>> = Vec::new();
        assert_eq!(subgroup_size(&empty), Err(SpcError::EmptySubgroups));

        // Inconsistent sizes win over an out-of-range size.
        let mixed = vec![vec![1.0], vec![1.0, 2.0]];
        assert_eq!(
            subgroup_size(&mixed),
            Err(SpcError::InconsistentSubgroupSize {
                expected: 1,
                actual: 2,
                index: 1
            })
        );

        assert_eq!(
            subgroup_size(&[vec![1.0]]),
            Err(SpcError::InvalidSubgroupSize(1))
        );
        assert_eq!(
            subgroup_size(&[vec![1.0; 30]]),
            Err(SpcError::InvalidSubgroupSize(30))
        );
        assert_eq!(subgroup_size(&[[1.0, 2.0, 3.0]]), Ok(3));
    }

    #[test]
    fn test_non_finite_reports_flattened_index() {
        let sgs = vec![vec![1.0, 2.0], vec![3.0, f64::INFINITY]];
        assert_eq!(
            subgroup_size(&sgs),
            Err(SpcError::NonFiniteValue {
                index: 3,
                value: f64::INFINITY
            })
        );
    }

    #[test]
    fn test_span_bounds() {
        assert!(moving_range_span(2, 3).is_ok());
        assert_eq!(
            moving_range_span(1, 3),
            Err(SpcError::InvalidSpan { span: 1, max: 2 })
        );
        assert_eq!(
            moving_range_span(3, 3),
            Err(SpcError::InvalidSpan { span: 3, max: 2 })
        );
        assert_eq!(
            moving_range_span(15, 3),
            Err(SpcError::InvalidSpan { span: 15, max: 2 })
        );
        // Long series are still capped by the constants table.
        assert!(moving_range_span(25, 100).is_ok());
        assert_eq!(
            moving_range_span(26, 100),
            Err(SpcError::InvalidSpan { span: 26, max: 25 })
        );
    }

    #[test]
    fn test_min_len() {
        assert_eq!(
            ensure_min_len(&[1.0], 2),
            Err(SpcError::InsufficientValues {
                required: 2,
                actual: 1
            })
        );
        assert!(ensure_min_len(&[1.0, 2.0], 2).is_ok());
    }

    #[test]
    fn test_sigma_multiplier() {
        assert!(sigma_multiplier(0.0).is_ok());
        assert!(sigma_multiplier(3.0).is_ok());
        assert!(sigma_multiplier(-1.0).is_err());
        assert!(sigma_multiplier(f64::NAN).is_err());
    }
}
