//! Control chart factors for subgroup sizes (and moving-range spans) 2..=25.
//!
//! A2, D3 and D4 follow ASTM E2587 / Montgomery (2019), Appendix VI. d2 is
//! the mean of the relative range distribution for a normal population,
//! used to estimate sigma as R-bar / d2.
//!
//! Beyond n = 25 the factors are not tabulated and normal approximations
//! would be needed; those sizes are rejected.
//!
//! # References
//!
//! - Montgomery, D.C. (2019). *Introduction to Statistical Quality Control*, 8th ed.
//! - ASTM E2587 - Standard Practice for Use of Control Charts

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpcError};

/// Smallest tabulated sample size.
pub const MIN_SAMPLE_SIZE: usize = 2;

/// Largest tabulated sample size.
pub const MAX_SAMPLE_SIZE: usize = 25;

/// Control chart factors for one sample size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConstantRow {
    /// Sample size (subgroup size or moving-range span).
    pub n: usize,
    /// X-bar chart factor: UCL/LCL = X-double-bar +/- A2 * R-bar.
    #[serde(rename = "A2")]
    pub a2: f64,
    /// R chart lower factor: LCL = D3 * R-bar.
    #[serde(rename = "D3")]
    pub d3: f64,
    /// R chart upper factor: UCL = D4 * R-bar.
    #[serde(rename = "D4")]
    pub d4: f64,
    /// Sigma estimator: sigma-hat = R-bar / d2.
    pub d2: f64,
}

const fn row(n: usize, a2: f64, d3: f64, d4: f64, d2: f64) -> ConstantRow {
    ConstantRow { n, a2, d3, d4, d2 }
}

/// Factor table indexed by `n - 2`.
const TABLE: [ConstantRow; 24] = [
    row(2, 1.880, 0.0, 3.267, 1.128),
    row(3, 1.023, 0.0, 2.574, 1.693),
    row(4, 0.729, 0.0, 2.282, 2.059),
    row(5, 0.577, 0.0, 2.114, 2.326),
    row(6, 0.483, 0.0, 2.004, 2.534),
    row(7, 0.419, 0.076, 1.924, 2.704),
    row(8, 0.373, 0.136, 1.864, 2.847),
    row(9, 0.337, 0.184, 1.816, 2.970),
    row(10, 0.308, 0.223, 1.777, 3.078),
    row(11, 0.285, 0.256, 1.744, 3.173),
    row(12, 0.266, 0.283, 1.716, 3.258),
    row(13, 0.249, 0.307, 1.692, 3.336),
    row(14, 0.235, 0.328, 1.671, 3.407),
    row(15, 0.223, 0.347, 1.652, 3.472),
    row(16, 0.212, 0.363, 1.636, 3.532),
    row(17, 0.203, 0.378, 1.621, 3.588),
    row(18, 0.194, 0.391, 1.608, 3.640),
    row(19, 0.187, 0.403, 1.596, 3.689),
    row(20, 0.180, 0.415, 1.585, 3.735),
    row(21, 0.173, 0.425, 1.575, 3.778),
    row(22, 0.167, 0.434, 1.566, 3.819),
    row(23, 0.162, 0.443, 1.557, 3.858),
    row(24, 0.157, 0.451, 1.548, 3.895),
    row(25, 0.153, 0.459, 1.541, 3.931),
];

/// Looks up the control chart factors for sample size `n`.
///
/// # Errors
///
/// [`SpcError::UnsupportedSampleSize`] if `n` is outside `2..=25`.
///
/// # Examples
///
/// ```
/// use spc_limits::spc::constants;
///
/// let row = constants::lookup(5).unwrap();
/// assert_eq!(row.a2, 0.577);
/// assert!(constants::lookup(26).is_err());
/// ```
pub fn lookup(n: usize) -> Result<ConstantRow> {
    if !(MIN_SAMPLE_SIZE..=MAX_SAMPLE_SIZE).contains(&n) {
        return Err(SpcError::UnsupportedSampleSize(n));
    }
    Ok(TABLE[n - MIN_SAMPLE_SIZE])
}

/// All tabulated rows in ascending order of `n`.
pub fn rows() -> &'static [ConstantRow] {
    &TABLE
}
