//! Variables control charts: X-bar/R and Individuals/Moving Range.
//!
//! Subgroup charts track the mean and within-subgroup range of small
//! samples; the I-MR chart handles one observation per time step and
//! estimates short-term variation from moving ranges.
//!
//! All factors come from [`constants`](super::constants).
//!
//! # References
//!
//! - Montgomery, D.C. (2019). *Introduction to Statistical Quality Control*, 8th ed.,
//!   Chapter 6: Control Charts for Variables.
//! - ASTM E2587 - Standard Practice for Use of Control Charts
//! - Shewhart, W.A. (1931). *Economic Control of Quality of Manufactured Product*.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};
use u_numflow::stats;

use crate::error::{Result, SpcError};

use super::chart::ControlLimits;
use super::constants::{self, ConstantRow};
use super::validation;

/// Default moving-range span (pairwise absolute differences).
pub const DEFAULT_MOVING_RANGE_SPAN: usize = 2;

/// Mean and range of a single subgroup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubgroupStats {
    pub mean: f64,
    /// `max - min`.
    pub range: f64,
}

/// Limits for a paired X-bar and R chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XBarRLimits {
    /// X-bar chart: CL = X-double-bar, UCL/LCL = CL +/- A2 * R-bar.
    pub x_bar: ControlLimits,
    /// R chart: CL = R-bar, UCL = D4 * R-bar, LCL = max(0, D3 * R-bar).
    pub range: ControlLimits,
    /// Plotted X-bar points, one per subgroup, in input order.
    pub subgroup_means: Vec<f64>,
    /// Plotted R points, one per subgroup, in input order.
    pub subgroup_ranges: Vec<f64>,
    pub subgroup_size: usize,
    /// Factors used for `subgroup_size`.
    pub constants: ConstantRow,
}

impl XBarRLimits {
    /// Short-term sigma estimate, R-bar / d2.
    pub fn sigma_hat(&self) -> f64 {
        self.range.center_line / self.constants.d2
    }
}

/// Moving-range chart limits together with the plotted moving ranges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovingRangeLimits {
    #[serde(flatten)]
    pub limits: ControlLimits,
    /// `len(values) - span + 1` moving ranges in input order.
    pub values: Vec<f64>,
}

/// Limits for a paired Individuals and Moving Range chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndividualsMRLimits {
    /// I chart: CL = mean, UCL/LCL = CL +/- 3 * MR-bar / d2.
    pub individuals: ControlLimits,
    /// MR chart: CL = MR-bar, UCL = D4 * MR-bar, LCL = max(0, D3 * MR-bar).
    pub moving_range: MovingRangeLimits,
    pub span: usize,
    /// Factors used for `span`.
    pub constants: ConstantRow,
}

impl IndividualsMRLimits {
    /// Short-term sigma estimate, MR-bar / d2.
    pub fn sigma_hat(&self) -> f64 {
        self.moving_range.limits.center_line / self.constants.d2
    }
}

/// Computes the mean and range of one subgroup.
///
/// # Errors
///
/// - [`SpcError::EmptySubgroup`] if `subgroup` is empty.
/// - [`SpcError::NonFiniteValue`] if it contains NaN or infinity.
/// - [`SpcError::Overflow`] if the mean or range overflows `f64`.
///
/// # Examples
///
/// ```
/// use spc_limits::spc::subgroup_stats;
///
/// let s = subgroup_stats(&[1.0, 5.0, 3.0]).unwrap();
/// assert_eq!(s.mean, 3.0);
/// assert_eq!(s.range, 4.0);
/// ```
pub fn subgroup_stats(subgroup: &[f64]) -> Result<SubgroupStats> {
    if subgroup.is_empty() {
        return Err(SpcError::EmptySubgroup);
    }
    validation::ensure_finite(subgroup, 0)?;
    Ok(SubgroupStats {
        mean: checked_mean(subgroup)?,
        range: range_of(subgroup)?,
    })
}

/// Computes X-bar and R chart limits from a set of equal-size subgroups.
///
/// # Algorithm
///
/// 1. For each subgroup, compute the mean (X-bar) and range (R).
/// 2. Compute the grand mean (X-double-bar) and average range (R-bar).
/// 3. X-bar chart limits: CL = X-double-bar, UCL/LCL = CL +/- A2 * R-bar.
/// 4. R chart limits: CL = R-bar, UCL = D4 * R-bar, LCL = max(0, D3 * R-bar).
///
/// # Errors
///
/// Checked in order:
/// 1. [`SpcError::EmptySubgroups`] if `subgroups` is empty.
/// 2. [`SpcError::InconsistentSubgroupSize`] if sizes differ.
/// 3. [`SpcError::InvalidSubgroupSize`] if the size is outside 2..=25.
/// 4. [`SpcError::NonFiniteValue`] on NaN or infinity.
/// 5. [`SpcError::Overflow`] if a statistic or limit overflows `f64`.
///
/// # Examples
///
/// ```
/// use spc_limits::spc::xbar_r_limits;
///
/// let subgroups = [
///     [25.0, 26.0, 24.5, 25.5, 25.0],
///     [25.2, 24.8, 25.1, 24.9, 25.3],
///     [25.1, 25.0, 24.7, 25.3, 24.9],
/// ];
/// let limits = xbar_r_limits(&subgroups).unwrap();
/// assert!(limits.x_bar.ucl > limits.x_bar.center_line);
/// assert!(limits.x_bar.center_line > limits.x_bar.lcl);
/// assert!(limits.range.lcl >= 0.0);
/// ```
pub fn xbar_r_limits<S: AsRef<[f64]>>(subgroups: &[S]) -> Result<XBarRLimits> {
    let n = validation::subgroup_size(subgroups)?;
    let constants = constants::lookup(n)?;

    let mut subgroup_means = Vec::with_capacity(subgroups.len());
    let mut subgroup_ranges = Vec::with_capacity(subgroups.len());
    for subgroup in subgroups {
        let s = subgroup_stats(subgroup.as_ref())?;
        subgroup_means.push(s.mean);
        subgroup_ranges.push(s.range);
    }

    let grand_mean = checked_mean(&subgroup_means)?;
    let r_bar = checked_mean(&subgroup_ranges)?;
    trace!(n, grand_mean, r_bar, "subgroup statistics");

    let x_bar = validation::finite_limits(ControlLimits::symmetric(
        grand_mean,
        constants.a2 * r_bar,
    ))?;
    let range = validation::finite_limits(ControlLimits::for_range(
        r_bar,
        constants.d4 * r_bar,
        constants.d3 * r_bar,
    ))?;
    debug!(
        subgroups = subgroups.len(),
        n,
        cl = x_bar.center_line,
        ucl = x_bar.ucl,
        lcl = x_bar.lcl,
        r_ucl = range.ucl,
        "computed X-bar/R limits"
    );

    Ok(XBarRLimits {
        x_bar,
        range,
        subgroup_means,
        subgroup_ranges,
        subgroup_size: n,
        constants,
    })
}

/// Computes the moving ranges of `values` over windows of `span`
/// consecutive observations.
///
/// `MR_i = max(window) - min(window)` for windows ending at indices
/// `span - 1 ..= len - 1`. With `span = 2` this is `|x_i - x_{i-1}|`.
/// Returns an empty vector when `span` is zero or exceeds `values.len()`.
///
/// # Examples
///
/// ```
/// use spc_limits::spc::moving_ranges;
///
/// assert_eq!(moving_ranges(&[10.0, 12.0, 9.0], 2), vec![2.0, 3.0]);
/// assert_eq!(moving_ranges(&[10.0, 12.0, 9.0, 11.0], 3), vec![3.0, 3.0]);
/// ```
pub fn moving_ranges(values: &[f64], span: usize) -> Vec<f64> {
    if span == 0 {
        return Vec::new();
    }
    values
        .windows(span)
        .map(|w| {
            let (lo, hi) = w
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| {
                    (lo.min(x), hi.max(x))
                });
            hi - lo
        })
        .collect()
}

/// Computes Individuals and Moving Range chart limits.
///
/// # Algorithm
///
/// 1. Moving ranges over windows of `span` consecutive values
///    (see [`moving_ranges`]).
/// 2. Mean of the individual values (X-bar) and of the moving ranges (MR-bar).
/// 3. I chart limits: CL = X-bar, UCL/LCL = CL +/- 3 * MR-bar / d2(span).
/// 4. MR chart limits: CL = MR-bar, UCL = D4 * MR-bar, LCL = max(0, D3 * MR-bar).
///
/// # Errors
///
/// - [`SpcError::InsufficientValues`] if fewer than 2 values.
/// - [`SpcError::InvalidSpan`] unless `2 <= span <= len - 1` (and `span <= 25`).
/// - [`SpcError::NonFiniteValue`] on NaN or infinity.
/// - [`SpcError::Overflow`] if a statistic or limit overflows `f64`.
///
/// # Examples
///
/// ```
/// use spc_limits::spc::{individuals_mr_limits, DEFAULT_MOVING_RANGE_SPAN};
///
/// let values = [25.0, 25.2, 24.8, 25.1, 24.9, 25.3, 25.0, 24.7];
/// let limits = individuals_mr_limits(&values, DEFAULT_MOVING_RANGE_SPAN).unwrap();
/// assert!(limits.individuals.ucl > limits.individuals.center_line);
/// assert_eq!(limits.moving_range.values.len(), values.len() - 1);
/// ```
pub fn individuals_mr_limits(values: &[f64], span: usize) -> Result<IndividualsMRLimits> {
    validation::ensure_min_len(values, 2)?;
    validation::moving_range_span(span, values.len())?;
    validation::ensure_finite(values, 0)?;
    let constants = constants::lookup(span)?;

    let mr_values = moving_ranges(values, span);
    let x_bar = checked_mean(values)?;
    let mr_bar = checked_mean(&mr_values)?;
    trace!(span, x_bar, mr_bar, ranges = mr_values.len(), "moving ranges");

    let individuals = validation::finite_limits(ControlLimits::symmetric(
        x_bar,
        3.0 * mr_bar / constants.d2,
    ))?;
    let moving_range = MovingRangeLimits {
        limits: validation::finite_limits(ControlLimits::for_range(
            mr_bar,
            constants.d4 * mr_bar,
            constants.d3 * mr_bar,
        ))?,
        values: mr_values,
    };
    debug!(
        observations = values.len(),
        span,
        cl = individuals.center_line,
        ucl = individuals.ucl,
        lcl = individuals.lcl,
        mr_ucl = moving_range.limits.ucl,
        "computed I-MR limits"
    );

    Ok(IndividualsMRLimits {
        individuals,
        moving_range,
        span,
        constants,
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub(crate) fn checked_mean(data: &[f64]) -> Result<f64> {
    validation::finite_statistic(stats::mean(data))
}

/// Range (max - min) of a non-empty, finite slice.
fn range_of(data: &[f64]) -> Result<f64> {
    let max_val = validation::finite_statistic(stats::max(data))?;
    let min_val = validation::finite_statistic(stats::min(data))?;
    validation::finite_statistic(Some(max_val - min_val))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn furnace_subgroups() -> Vec<Vec<f64>> {
        vec![
            vec![1650.0, 1655.0, 1648.0, 1652.0, 1651.0],
            vec![1649.0, 1653.0, 1650.0, 1654.0, 1652.0],
            vec![1651.0, 1650.0, 1649.0, 1653.0, 1652.0],
            vec![1652.0, 1651.0, 1650.0, 1654.0, 1653.0],
            vec![1650.0, 1652.0, 1651.0, 1653.0, 1654.0],
        ]
    }

    // --- subgroup_stats ---

    #[test]
    fn test_subgroup_stats() {
        let s = subgroup_stats(&[72.0, 84.0, 79.0, 49.0]).unwrap();
        assert!((s.mean - 71.0).abs() < 1e-12);
        assert!((s.range - 35.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_subgroup_stats_single_value() {
        let s = subgroup_stats(&[4.2]).unwrap();
        assert!((s.mean - 4.2).abs() < f64::EPSILON);
        assert!(s.range.abs() < f64::EPSILON);
    }

    #[test]
    fn test_subgroup_stats_empty() {
        assert_eq!(subgroup_stats(&[]), Err(SpcError::EmptySubgroup));
    }

    #[test]
    fn test_subgroup_stats_nan() {
        assert!(matches!(
            subgroup_stats(&[1.0, f64::NAN]),
            Err(SpcError::NonFiniteValue { index: 1, .. })
        ));
    }

    // --- xbar_r_limits ---

    #[test]
    fn test_xbar_r_furnace_data() {
        let limits = xbar_r_limits(&furnace_subgroups()).unwrap();
        // Subgroup means: 1651.2, 1651.6, 1651.0, 1652.0, 1652.0
        assert!(
            (limits.x_bar.center_line - 1651.56).abs() < 1e-9,
            "CL={}",
            limits.x_bar.center_line
        );
        assert!(limits.x_bar.ucl > limits.x_bar.center_line);
        assert!(limits.x_bar.lcl < limits.x_bar.center_line);
        assert_eq!(limits.subgroup_size, 5);
        assert_eq!(limits.subgroup_means.len(), 5);
        // Ranges: 7, 5, 4, 4, 4 -> R-bar = 4.8
        assert!((limits.range.center_line - 4.8).abs() < 1e-12);
        assert!((limits.range.ucl - 2.114 * 4.8).abs() < 1e-12);
        assert_eq!(limits.range.lcl, 0.0);
    }

    #[test]
    fn test_xbar_r_textbook_n4() {
        let subgroups = [
            [72.0, 84.0, 79.0, 49.0],
            [56.0, 87.0, 33.0, 42.0],
            [55.0, 73.0, 22.0, 60.0],
            [44.0, 80.0, 54.0, 74.0],
            [97.0, 26.0, 48.0, 58.0],
        ];
        let limits = xbar_r_limits(&subgroups).unwrap();
        // Subgroup means: 71.0, 54.5, 52.5, 63.0, 57.25
        let expected_grand_mean = (71.0 + 54.5 + 52.5 + 63.0 + 57.25) / 5.0;
        assert!((limits.x_bar.center_line - expected_grand_mean).abs() < 1e-9);
        // Ranges: 35, 54, 51, 36, 71 -> R-bar = 49.4
        let r_bar = 49.4;
        assert!((limits.x_bar.ucl - (expected_grand_mean + 0.729 * r_bar)).abs() < 1e-9);
        assert!((limits.x_bar.lcl - (expected_grand_mean - 0.729 * r_bar)).abs() < 1e-9);
    }

    #[test]
    fn test_xbar_r_factors_n5() {
        // Single subgroup with mean=50, range=10
        let limits = xbar_r_limits(&[[45.0, 47.0, 50.0, 53.0, 55.0]]).unwrap();
        assert!((limits.x_bar.center_line - 50.0).abs() < f64::EPSILON);
        assert!((limits.range.center_line - 10.0).abs() < f64::EPSILON);
        // UCL = 50 + 0.577 * 10 = 55.77
        assert!((limits.x_bar.ucl - 55.77).abs() < 1e-9);
        // LCL = 50 - 0.577 * 10 = 44.23
        assert!((limits.x_bar.lcl - 44.23).abs() < 1e-9);
        // sigma-hat = 10 / 2.326
        assert!((limits.sigma_hat() - 10.0 / 2.326).abs() < 1e-12);
    }

    #[test]
    fn test_xbar_r_positive_d3_for_large_subgroups() {
        let subgroups: Vec<Vec<f64>> = (0..4)
            .map(|k| (0..8).map(|i| 100.0 + i as f64 + k as f64 * 0.5).collect())
            .collect();
        let limits = xbar_r_limits(&subgroups).unwrap();
        // n = 8: D3 = 0.136, R-bar = 7
        assert!((limits.range.lcl - 0.136 * 7.0).abs() < 1e-12);
        assert!(limits.range.lcl > 0.0);
    }

    #[test]
    fn test_xbar_r_constant_subgroups() {
        // All identical values: R-bar = 0, limits collapse
        let limits = xbar_r_limits(&[[10.0, 10.0, 10.0], [10.0, 10.0, 10.0]]).unwrap();
        assert!((limits.x_bar.center_line - 10.0).abs() < f64::EPSILON);
        assert!((limits.x_bar.ucl - 10.0).abs() < f64::EPSILON);
        assert!((limits.x_bar.lcl - 10.0).abs() < f64::EPSILON);
        assert_eq!(limits.range.ucl, 0.0);
        assert_eq!(limits.range.lcl, 0.0);
    }

    #[test]
    fn test_xbar_r_empty() {
        let empty: Vec<Vec<f64>> = Vec::new();
        assert_eq!(xbar_r_limits(&empty), Err(SpcError::EmptySubgroups));
    }

    #[test]
    fn test_xbar_r_invalid_sizes() {
        assert_eq!(
            xbar_r_limits(&[vec![1.0]]),
            Err(SpcError::InvalidSubgroupSize(1))
        );
        assert_eq!(
            xbar_r_limits(&[vec![1.0; 30]]),
            Err(SpcError::InvalidSubgroupSize(30))
        );
        assert!(xbar_r_limits(&[vec![1.0; 25]]).is_ok());
    }

    #[test]
    fn test_xbar_r_inconsistent_sizes() {
        let subgroups = vec![vec![1.0, 2.0, 3.0], vec![1.0, 2.0]];
        assert_eq!(
            xbar_r_limits(&subgroups),
            Err(SpcError::InconsistentSubgroupSize {
                expected: 3,
                actual: 2,
                index: 1
            })
        );
    }

    #[test]
    fn test_xbar_r_rejects_nan() {
        assert!(matches!(
            xbar_r_limits(&[[1.0, f64::NAN, 3.0]]),
            Err(SpcError::NonFiniteValue { index: 1, .. })
        ));
    }

    // --- moving_ranges ---

    #[test]
    fn test_moving_ranges_span2() {
        let mr = moving_ranges(&[10.0, 12.0, 9.0], 2);
        assert_eq!(mr, vec![2.0, 3.0]);
    }

    #[test]
    fn test_moving_ranges_span3() {
        // Windows: [1,4,2], [4,2,8], [2,8,3]
        let mr = moving_ranges(&[1.0, 4.0, 2.0, 8.0, 3.0], 3);
        assert_eq!(mr, vec![3.0, 6.0, 6.0]);
    }

    #[test]
    fn test_moving_ranges_degenerate_span() {
        assert!(moving_ranges(&[1.0, 2.0], 0).is_empty());
        assert!(moving_ranges(&[1.0, 2.0], 3).is_empty());
    }

    // --- individuals_mr_limits ---

    #[test]
    fn test_imr_center_line_is_mean() {
        let values = [
            1650.0, 1652.0, 1651.0, 1653.0, 1650.0, 1654.0, 1652.0, 1651.0, 1653.0, 1650.0,
        ];
        let limits = individuals_mr_limits(&values, 2).unwrap();
        let expected_mean = values.iter().sum::<f64>() / values.len() as f64;
        assert!((limits.individuals.center_line - expected_mean).abs() < 0.01);
        assert_eq!(limits.moving_range.values.len(), values.len() - 1);
        assert_eq!(limits.span, 2);
    }

    #[test]
    fn test_imr_e2_factor() {
        let limits = individuals_mr_limits(&[95.0, 105.0, 100.0], 2).unwrap();
        // MR = 10, 5 -> MR-bar = 7.5
        let half_width = 3.0 * 7.5 / 1.128;
        assert!((limits.individuals.center_line - 100.0).abs() < f64::EPSILON);
        assert!((limits.individuals.ucl - (100.0 + half_width)).abs() < 1e-9);
        assert!((limits.individuals.lcl - (100.0 - half_width)).abs() < 1e-9);
        assert!((limits.moving_range.limits.ucl - 3.267 * 7.5).abs() < 1e-9);
        assert_eq!(limits.moving_range.limits.lcl, 0.0);
        assert!((limits.sigma_hat() - 7.5 / 1.128).abs() < 1e-12);
    }

    #[test]
    fn test_imr_span3_uses_span_constants() {
        let values = [1.0, 4.0, 2.0, 8.0, 3.0];
        let limits = individuals_mr_limits(&values, 3).unwrap();
        assert_eq!(limits.moving_range.values, vec![3.0, 6.0, 6.0]);
        assert!((limits.moving_range.limits.center_line - 5.0).abs() < 1e-12);
        assert!((limits.moving_range.limits.ucl - 2.574 * 5.0).abs() < 1e-12);
        let half_width = 3.0 * 5.0 / 1.693;
        assert!((limits.individuals.ucl - (3.6 + half_width)).abs() < 1e-9);
    }

    #[test]
    fn test_imr_insufficient_values() {
        assert_eq!(
            individuals_mr_limits(&[1.0], 2),
            Err(SpcError::InsufficientValues {
                required: 2,
                actual: 1
            })
        );
        assert!(individuals_mr_limits(&[], 2).is_err());
    }

    #[test]
    fn test_imr_invalid_span() {
        assert!(matches!(
            individuals_mr_limits(&[1.0, 2.0, 3.0], 1),
            Err(SpcError::InvalidSpan { span: 1, .. })
        ));
        assert!(matches!(
            individuals_mr_limits(&[1.0, 2.0, 3.0], 15),
            Err(SpcError::InvalidSpan { span: 15, .. })
        ));
    }

    #[test]
    fn test_imr_two_values_has_no_valid_span() {
        // span must be <= len - 1 = 1, but also >= 2
        assert!(matches!(
            individuals_mr_limits(&[1.0, 2.0], 2),
            Err(SpcError::InvalidSpan { span: 2, max: 1 })
        ));
    }

    #[test]
    fn test_xbar_r_overflowing_range() {
        // Every value is finite; only the range 1e308 - (-1e308) overflows.
        assert_eq!(
            xbar_r_limits(&[[1e308, -1e308], [0.0, 1.0]]),
            Err(SpcError::Overflow)
        );
        assert_eq!(subgroup_stats(&[1e308, -1e308]), Err(SpcError::Overflow));
    }

    #[test]
    fn test_imr_overflowing_moving_range() {
        assert_eq!(
            individuals_mr_limits(&[1e308, -1e308, 0.0], 2),
            Err(SpcError::Overflow)
        );
    }

    #[test]
    fn test_imr_constant_series() {
        let limits = individuals_mr_limits(&[5.0; 6], 2).unwrap();
        assert!((limits.individuals.ucl - 5.0).abs() < f64::EPSILON);
        assert!((limits.individuals.lcl - 5.0).abs() < f64::EPSILON);
        assert!(limits.moving_range.values.iter().all(|&m| m == 0.0));
    }
}
