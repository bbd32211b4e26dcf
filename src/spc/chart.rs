//! Core control limit type shared by every chart.
//!
//! # References
//!
//! - Montgomery, D.C. (2019). *Introduction to Statistical Quality Control*, 8th ed.
//! - ASTM E2587 - Standard Practice for Use of Control Charts

use serde::{Deserialize, Serialize};

/// Control limits for a chart.
///
/// Represents the center line (CL), upper control limit (UCL) and lower
/// control limit (LCL) computed from process data.
///
/// # Invariants
///
/// - `lcl <= center_line <= ucl`
/// - `lcl >= 0` for range-type charts (R, MR)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlLimits {
    /// Center line (process mean, mean range, ...).
    pub center_line: f64,
    /// Upper control limit.
    pub ucl: f64,
    /// Lower control limit.
    pub lcl: f64,
}

impl ControlLimits {
    /// Limits placed symmetrically at `center_line +/- half_width`.
    pub fn symmetric(center_line: f64, half_width: f64) -> Self {
        Self {
            center_line,
            ucl: center_line + half_width,
            lcl: center_line - half_width,
        }
    }

    /// Limits for a range-type statistic, which cannot be negative.
    ///
    /// `lcl` is clamped at zero.
    pub fn for_range(center_line: f64, ucl: f64, lcl: f64) -> Self {
        Self {
            center_line,
            ucl,
            lcl: lcl.max(0.0),
        }
    }

    /// Distance between the limits.
    pub fn width(&self) -> f64 {
        self.ucl - self.lcl
    }

    /// One-sigma zone width implied by the upper limit, `(UCL - CL) / 3`.
    pub fn sigma(&self) -> f64 {
        (self.ucl - self.center_line) / 3.0
    }

    /// Whether `value` lies within `[lcl, ucl]`.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lcl && value <= self.ucl
    }
}
