//! Dispersion-based limits: pooled standard deviation and k-sigma limits.
//!
//! # Algorithms
//!
//! - **Pooled sigma**: degrees-of-freedom weighted average of subgroup
//!   sample variances, `sqrt(sum((n_i - 1) s_i^2) / sum(n_i - 1))`.
//! - **Sigma limits**: `mean +/- k * s`, with `s` the sample standard
//!   deviation (Bessel's correction).
//!
//! Variances come from `u_numflow::stats::variance` (Welford's algorithm).
//!
//! # References
//!
//! - Montgomery, D.C. (2019). *Introduction to Statistical Quality Control*, 8th ed.,
//!   Section 6.4 (pooled estimates of sigma).

use serde::{Deserialize, Serialize};
use tracing::debug;
use u_numflow::stats;

use crate::error::{Result, SpcError};

use super::chart::ControlLimits;
use super::validation;
use super::variables::checked_mean;

/// Default sigma multiplier for Shewhart limits.
pub const DEFAULT_SIGMA_MULTIPLIER: f64 = 3.0;

/// k-sigma control limits and the standard deviation behind them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SigmaLimits {
    #[serde(flatten)]
    pub limits: ControlLimits,
    /// Sample standard deviation of the input series.
    pub std_dev: f64,
    /// Multiplier `k` the limits were computed with.
    pub sigma: f64,
}

/// Computes the pooled standard deviation across subgroups of possibly
/// unequal size.
///
/// Subgroups with fewer than two values carry no degrees of freedom and
/// are skipped.
///
/// # Errors
///
/// - [`SpcError::InsufficientDegreesOfFreedom`] if no subgroup has two or
///   more values (this includes an empty set).
/// - [`SpcError::NonFiniteValue`] on NaN or infinity.
/// - [`SpcError::Overflow`] if a subgroup variance overflows `f64`.
///
/// # Examples
///
/// ```
/// use spc_limits::spc::pooled_std_dev;
///
/// let subgroups = vec![
///     vec![10.0, 12.0, 11.0, 13.0, 12.0],
///     vec![11.0, 13.0, 12.0, 14.0, 13.0],
///     vec![12.0, 14.0, 13.0, 15.0, 14.0],
/// ];
/// let sp = pooled_std_dev(&subgroups).unwrap();
/// assert!(sp > 0.0);
/// ```
pub fn pooled_std_dev<S: AsRef<[f64]>>(subgroups: &[S]) -> Result<f64> {
    validation::ensure_all_finite(subgroups)?;

    let mut weighted = 0.0_f64;
    let mut dof = 0_usize;
    for subgroup in subgroups {
        let subgroup = subgroup.as_ref();
        if subgroup.len() < 2 {
            continue;
        }
        let var = validation::finite_statistic(stats::variance(subgroup))?;
        let df = subgroup.len() - 1;
        weighted += df as f64 * var;
        dof += df;
    }

    if dof == 0 {
        return Err(SpcError::InsufficientDegreesOfFreedom);
    }

    let pooled = validation::finite_statistic(Some((weighted / dof as f64).sqrt()))?;
    debug!(subgroups = subgroups.len(), dof, pooled, "computed pooled sigma");
    Ok(pooled)
}

/// Computes `mean +/- k * s` limits for an arbitrary multiplier `k`.
///
/// Larger `k` strictly widens the limits whenever `s > 0`.
///
/// # Errors
///
/// - [`SpcError::InsufficientValues`] if fewer than 2 values.
/// - [`SpcError::InvalidSigmaMultiplier`] if `k` is negative or not finite.
/// - [`SpcError::NonFiniteValue`] on NaN or infinity.
/// - [`SpcError::Overflow`] if the mean, standard deviation or a limit
///   overflows `f64`.
///
/// # Examples
///
/// ```
/// use spc_limits::spc::sigma_limits;
///
/// let values = [100.0, 102.0, 98.0, 101.0, 99.0];
/// let r = sigma_limits(&values, 3.0).unwrap();
/// assert!((r.limits.ucl - (r.limits.center_line + 3.0 * r.std_dev)).abs() < 1e-9);
/// ```
pub fn sigma_limits(values: &[f64], k: f64) -> Result<SigmaLimits> {
    validation::ensure_min_len(values, 2)?;
    validation::sigma_multiplier(k)?;
    validation::ensure_finite(values, 0)?;

    let mean = checked_mean(values)?;
    let std_dev = validation::finite_statistic(stats::std_dev(values))?;
    let limits = validation::finite_limits(ControlLimits::symmetric(mean, k * std_dev))?;
    debug!(
        observations = values.len(),
        k,
        cl = limits.center_line,
        ucl = limits.ucl,
        lcl = limits.lcl,
        "computed sigma limits"
    );

    Ok(SigmaLimits {
        limits,
        std_dev,
        sigma: k,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- pooled_std_dev ---

    #[test]
    fn test_pooled_equal_sizes() {
        let subgroups = vec![
            vec![10.0, 12.0, 11.0, 13.0, 12.0],
            vec![11.0, 13.0, 12.0, 14.0, 13.0],
            vec![12.0, 14.0, 13.0, 15.0, 14.0],
        ];
        // Each subgroup is a shift of the first: s^2 = 1.3 for all.
        let sp = pooled_std_dev(&subgroups).unwrap();
        assert!((sp - 1.3_f64.sqrt()).abs() < 1e-10, "got {sp}");
    }

    #[test]
    fn test_pooled_unequal_sizes_weights_by_dof() {
        // s1^2 = 1 (df 2), s2^2 = 8 (df 1) -> (2*1 + 1*8) / 3 = 10/3
        let subgroups = vec![vec![1.0, 2.0, 3.0], vec![0.0, 4.0]];
        let sp = pooled_std_dev(&subgroups).unwrap();
        assert!((sp - (10.0_f64 / 3.0).sqrt()).abs() < 1e-10, "got {sp}");
    }

    #[test]
    fn test_pooled_skips_singletons() {
        let with = vec![vec![1.0, 2.0, 3.0], vec![100.0]];
        let without = vec![vec![1.0, 2.0, 3.0]];
        assert_eq!(
            pooled_std_dev(&with).unwrap(),
            pooled_std_dev(&without).unwrap()
        );
    }

    #[test]
    fn test_pooled_all_singletons() {
        let subgroups = vec![vec![1.0], vec![2.0], vec![]];
        assert_eq!(
            pooled_std_dev(&subgroups),
            Err(SpcError::InsufficientDegreesOfFreedom)
        );
        let empty: Vec<Vec<f64>> = Vec::new();
        assert_eq!(
            pooled_std_dev(&empty),
            Err(SpcError::InsufficientDegreesOfFreedom)
        );
    }

    #[test]
    fn test_pooled_zero_variance() {
        let sp = pooled_std_dev(&[[5.0, 5.0], [7.0, 7.0]]).unwrap();
        assert!(sp.abs() < f64::EPSILON);
    }

    // --- sigma_limits ---

    #[test]
    fn test_sigma_limits_three_sigma() {
        let values = [100.0, 102.0, 98.0, 101.0, 99.0, 103.0, 97.0, 102.0, 100.0, 101.0];
        let r = sigma_limits(&values, 3.0).unwrap();
        assert!((r.limits.center_line - 100.3).abs() < 1e-9);
        assert!((r.limits.ucl - (r.limits.center_line + 3.0 * r.std_dev)).abs() < 0.01);
        assert!((r.limits.lcl - (r.limits.center_line - 3.0 * r.std_dev)).abs() < 0.01);
        assert!((r.sigma - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_sigma_limits_known_std_dev() {
        // 2, 4, 4, 4, 5, 5, 7, 9: sample variance 32/7
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let r = sigma_limits(&values, 2.0).unwrap();
        let s = (32.0_f64 / 7.0).sqrt();
        assert!((r.std_dev - s).abs() < 1e-10);
        assert!((r.limits.ucl - (5.0 + 2.0 * s)).abs() < 1e-10);
    }

    #[test]
    fn test_sigma_limits_wider_with_k() {
        let values = [100.0, 102.0, 98.0, 101.0, 99.0];
        let two = sigma_limits(&values, 2.0).unwrap();
        let three = sigma_limits(&values, 3.0).unwrap();
        assert!(three.limits.ucl > two.limits.ucl);
        assert!(three.limits.lcl < two.limits.lcl);
    }

    #[test]
    fn test_sigma_limits_insufficient_values() {
        assert_eq!(
            sigma_limits(&[1.0], 3.0),
            Err(SpcError::InsufficientValues {
                required: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn test_sigma_limits_invalid_k() {
        assert_eq!(
            sigma_limits(&[1.0, 2.0], -1.0),
            Err(SpcError::InvalidSigmaMultiplier(-1.0))
        );
        assert!(sigma_limits(&[1.0, 2.0], f64::INFINITY).is_err());
    }

    #[test]
    fn test_sigma_limits_overflowing_mean() {
        assert_eq!(sigma_limits(&[1e308; 3], 3.0), Err(SpcError::Overflow));
    }

    #[test]
    fn test_sigma_limits_overflowing_bound() {
        // Mean and s are finite; mean + k * s is not.
        assert_eq!(
            sigma_limits(&[0.0, 1e150], 1e160),
            Err(SpcError::Overflow)
        );
    }

    #[test]
    fn test_pooled_overflowing_variance() {
        assert_eq!(
            pooled_std_dev(&[[1e308, -1e308], [1.0, 2.0]]),
            Err(SpcError::Overflow)
        );
    }

    #[test]
    fn test_sigma_limits_zero_variance() {
        let r = sigma_limits(&[4.0, 4.0, 4.0], 3.0).unwrap();
        assert!(r.std_dev.abs() < f64::EPSILON);
        assert!((r.limits.ucl - 4.0).abs() < f64::EPSILON);
        assert!((r.limits.lcl - 4.0).abs() < f64::EPSILON);
    }
}
