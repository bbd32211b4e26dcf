//! Process capability indices (Cp, Cpk, Pp, Ppk, Cpm).
//!
//! Process capability indices quantify how well a process output fits within
//! specification limits. Short-term indices (Cp, Cpk) use within-group
//! variation, while long-term indices (Pp, Ppk) use overall variation.
//!
//! # References
//!
//! - Montgomery (2019), *Introduction to Statistical Quality Control*, 8th ed.,
//!   Chapter 8.
//! - Kane (1986), "Process Capability Indices", *Journal of Quality Technology*
//!   18(1), pp. 41--52.
//! - Chan, Cheng & Spiring (1988), "A New Measure of Process Capability: Cpm",
//!   *Journal of Quality Technology* 20(3), pp. 162--175.
//! - Bissell (1990), "How Reliable is Your Capability Index?", *Applied
//!   Statistics* 39(3), pp. 331--340.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;
use u_numflow::stats;

use crate::error::{Result, SpcError};
use crate::spc::validation;

use super::sigma_level::{sigma_to_ppm, SigmaQuality, LONG_TERM_SHIFT};

/// Minimum number of observations for a process capability study.
pub const MIN_CAPABILITY_SAMPLES: usize = 30;

/// Two-sided specification limits with an optional target.
///
/// # Examples
///
/// ```
/// use spc_limits::capability::SpecLimits;
///
/// let spec = SpecLimits::new(11.0, 9.0).unwrap();
/// assert_eq!(spec.target_or_midpoint(), 10.0);
///
/// assert!(SpecLimits::new(9.0, 11.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecLimits {
    pub usl: f64,
    pub lsl: f64,
    /// Nominal value. The midpoint of the limits is used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<f64>,
}

impl SpecLimits {
    /// Creates validated limits without a target.
    ///
    /// # Errors
    ///
    /// [`SpcError::InvalidSpecLimits`] unless both limits are finite and
    /// `usl > lsl`.
    pub fn new(usl: f64, lsl: f64) -> Result<Self> {
        let spec = Self {
            usl,
            lsl,
            target: None,
        };
        spec.validate()?;
        Ok(spec)
    }

    /// Sets the target used for Cpm and centering.
    pub fn with_target(mut self, target: f64) -> Self {
        self.target = Some(target);
        self
    }

    /// Checks that the limits are finite and ordered, with a finite width.
    ///
    /// Needed for values that were deserialized rather than built with
    /// [`SpecLimits::new`].
    pub fn validate(&self) -> Result<()> {
        if !self.usl.is_finite()
            || !self.lsl.is_finite()
            || self.usl <= self.lsl
            || !self.tolerance().is_finite()
        {
            return Err(SpcError::InvalidSpecLimits {
                usl: self.usl,
                lsl: self.lsl,
            });
        }
        Ok(())
    }

    /// `USL - LSL`.
    pub fn tolerance(&self) -> f64 {
        self.usl - self.lsl
    }

    pub fn midpoint(&self) -> f64 {
        (self.usl + self.lsl) / 2.0
    }

    /// The explicit target if it is finite, otherwise the midpoint.
    pub fn target_or_midpoint(&self) -> f64 {
        self.target
            .filter(|t| t.is_finite())
            .unwrap_or_else(|| self.midpoint())
    }

    /// Whether `x` lies within `[LSL, USL]`.
    pub fn contains(&self, x: f64) -> bool {
        x >= self.lsl && x <= self.usl
    }
}

/// Grade of a single capability index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Grade {
    /// Below 1.0.
    Poor,
    /// 1.0 up to 1.33.
    Marginal,
    /// 1.33 up to 2.0.
    Good,
    /// 2.0 and above.
    Excellent,
}

impl Grade {
    pub fn from_index(index: f64) -> Self {
        if index >= 2.0 {
            Grade::Excellent
        } else if index >= 1.33 {
            Grade::Good
        } else if index >= 1.0 {
            Grade::Marginal
        } else {
            Grade::Poor
        }
    }

    /// Reading of this grade when applied to Cp (spread only).
    pub fn potential_description(self) -> &'static str {
        match self {
            Grade::Excellent => "Excellent - Process has excellent potential capability",
            Grade::Good => "Good - Process has good potential capability",
            Grade::Marginal => "Marginal - Process meets minimum requirements",
            Grade::Poor => "Poor - Process cannot meet specifications",
        }
    }

    /// Reading of this grade when applied to Cpk (spread and centering).
    pub fn actual_description(self) -> &'static str {
        match self {
            Grade::Excellent => "Excellent - Process is well-centered and capable",
            Grade::Good => "Good - Process is capable",
            Grade::Marginal => "Marginal - Process barely meets specifications",
            Grade::Poor => "Poor - Process produces defects",
        }
    }
}

/// Overall verdict combining Cp and Cpk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Assessment {
    CapableAndCentered,
    CapableOffCenter,
    NeedsCentering,
    NeedsImprovement,
}

impl Assessment {
    /// Classifies a `(Cp, Cpk)` pair.
    ///
    /// The gap `Cp - Cpk` measures how much capability is lost to an
    /// off-target mean.
    pub fn from_indices(cp: f64, cpk: f64) -> Self {
        let gap = (cp - cpk).abs();
        if cpk >= 1.33 && gap < 0.2 {
            Assessment::CapableAndCentered
        } else if cpk >= 1.0 && gap > 0.3 {
            Assessment::CapableOffCenter
        } else if cp >= 1.33 && cpk < 1.0 {
            Assessment::NeedsCentering
        } else {
            Assessment::NeedsImprovement
        }
    }

    pub fn recommendation(self) -> &'static str {
        match self {
            Assessment::CapableAndCentered => {
                "Continue monitoring. Consider process improvement for Six Sigma level."
            }
            Assessment::CapableOffCenter => "Focus on centering the process mean to target value.",
            Assessment::NeedsCentering => {
                "Adjust process mean to improve Cpk. Reduce process variation."
            }
            Assessment::NeedsImprovement => {
                "Reduce process variation and center the process. Consider process redesign."
            }
        }
    }
}

impl fmt::Display for Assessment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Assessment::CapableAndCentered => "Process is capable and well-centered",
            Assessment::CapableOffCenter => "Process has capability but is off-center",
            Assessment::NeedsCentering => "Process has potential but needs centering",
            Assessment::NeedsImprovement => "Process needs improvement",
        };
        f.write_str(text)
    }
}

/// Graded reading of a [`CapabilityReport`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interpretation {
    pub cp: Grade,
    pub cpk: Grade,
    pub overall: Assessment,
    pub sigma_quality: SigmaQuality,
}

impl Interpretation {
    fn new(cp: f64, cpk: f64, sigma_level: f64) -> Self {
        Self {
            cp: Grade::from_index(cp),
            cpk: Grade::from_index(cpk),
            overall: Assessment::from_indices(cp, cpk),
            sigma_quality: SigmaQuality::from_sigma_level(sigma_level),
        }
    }

    pub fn recommendation(&self) -> &'static str {
        self.overall.recommendation()
    }
}

/// Result of a process capability study.
///
/// # Index interpretation
///
/// | Index | Value | Interpretation |
/// |-------|-------|----------------|
/// | Cp/Pp | >= 1.33 | Process is capable |
/// | Cpk/Ppk | >= 1.33 | Process is capable and centered |
/// | Cpm | >= 1.33 | Process meets Taguchi loss criterion |
///
/// Reference: Montgomery (2019), Chapter 8, Table 8.5.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityReport {
    /// Cp = (USL - LSL) / (6 * sigma_short).
    pub cp: f64,
    /// Cpk = min(Cpu, Cpl).
    pub cpk: f64,
    /// Cpu = (USL - mean) / (3 * sigma_short).
    pub cpu: f64,
    /// Cpl = (mean - LSL) / (3 * sigma_short).
    pub cpl: f64,
    /// Pp = (USL - LSL) / (6 * sigma_overall).
    pub pp: f64,
    pub ppk: f64,
    pub ppu: f64,
    pub ppl: f64,
    /// Cpm = (USL - LSL) / (6 * sqrt(s^2 + (mean - target)^2)).
    pub cpm: f64,
    /// `3 * Cpk + 1.5`.
    pub sigma_level: f64,
    /// Long-run PPM implied by `sigma_level`.
    pub expected_ppm: f64,
    /// Observed defects per million, from out-of-spec counts.
    pub dpmo: f64,
    /// Percentage of observations within spec.
    #[serde(rename = "yield")]
    pub yield_percent: f64,
    pub mean: f64,
    /// Overall (long-term) sample standard deviation.
    pub std_dev: f64,
    /// Sigma behind Cp/Cpk: the pooled estimate when given, else `std_dev`.
    pub short_term_std_dev: f64,
    pub target: f64,
    /// `(mean - target) / ((USL - LSL) / 2)`. Zero is perfectly centered,
    /// +/-1 puts the mean on a limit.
    pub centering: f64,
    pub interpretation: Interpretation,
}

/// Configured process capability calculator.
///
/// # Examples
///
/// ```
/// use spc_limits::capability::{ProcessCapability, SpecLimits};
///
/// let spec = SpecLimits::new(10.6, 9.4).unwrap();
/// let values: Vec<f64> = (0..40).map(|i| 10.0 + ((i % 5) as f64 - 2.0) * 0.1).collect();
///
/// let report = ProcessCapability::new(spec).analyze(&values, Some(0.1)).unwrap();
/// assert!((report.cp - 2.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessCapability {
    spec: SpecLimits,
    min_samples: usize,
}

impl ProcessCapability {
    pub fn new(spec: SpecLimits) -> Self {
        Self {
            spec,
            min_samples: MIN_CAPABILITY_SAMPLES,
        }
    }

    /// Overrides the minimum study size (default 30).
    pub fn with_min_samples(mut self, min_samples: usize) -> Self {
        self.min_samples = min_samples.max(2);
        self
    }

    pub fn spec(&self) -> &SpecLimits {
        &self.spec
    }

    /// Runs the study.
    ///
    /// `pooled_std_dev` is the short-term sigma, typically from
    /// [`crate::spc::pooled_std_dev`] or `R-bar / d2`. Without it Cp/Cpk use
    /// the overall standard deviation and equal Pp/Ppk.
    ///
    /// # Errors
    ///
    /// - [`SpcError::InsufficientCapabilityData`] below the minimum study size.
    /// - [`SpcError::InvalidSpecLimits`] unless `usl > lsl`, both finite.
    /// - [`SpcError::InvalidPooledStdDev`] if the pooled sigma is not a
    ///   finite positive number.
    /// - [`SpcError::NonFiniteValue`] on NaN or infinity.
    /// - [`SpcError::ZeroVariation`] if every observation is identical.
    /// - [`SpcError::Overflow`] if the mean or variance overflows `f64`.
    pub fn analyze(&self, values: &[f64], pooled_std_dev: Option<f64>) -> Result<CapabilityReport> {
        if values.len() < self.min_samples {
            return Err(SpcError::InsufficientCapabilityData {
                required: self.min_samples,
                actual: values.len(),
            });
        }
        self.spec.validate()?;
        if let Some(sp) = pooled_std_dev {
            if !sp.is_finite() || sp <= 0.0 {
                return Err(SpcError::InvalidPooledStdDev(sp));
            }
        }
        validation::ensure_finite(values, 0)?;

        let mean = validation::finite_statistic(stats::mean(values))?;
        let variance = validation::finite_statistic(stats::variance(values))?;
        let std_dev = variance.sqrt();
        if std_dev <= 0.0 {
            return Err(SpcError::ZeroVariation);
        }
        let short = pooled_std_dev.unwrap_or(std_dev);

        let SpecLimits { usl, lsl, .. } = self.spec;
        let tolerance = self.spec.tolerance();
        let target = self.spec.target_or_midpoint();

        let cp = tolerance / (6.0 * short);
        let cpu = (usl - mean) / (3.0 * short);
        let cpl = (mean - lsl) / (3.0 * short);
        let cpk = cpu.min(cpl);

        let pp = tolerance / (6.0 * std_dev);
        let ppu = (usl - mean) / (3.0 * std_dev);
        let ppl = (mean - lsl) / (3.0 * std_dev);
        let ppk = ppu.min(ppl);

        let cpm = tolerance / (6.0 * (variance + (mean - target).powi(2)).sqrt());

        let sigma_level = 3.0 * cpk + LONG_TERM_SHIFT;
        let n = values.len() as f64;
        let defects = values.iter().filter(|&&v| !self.spec.contains(v)).count() as f64;

        let report = CapabilityReport {
            cp,
            cpk,
            cpu,
            cpl,
            pp,
            ppk,
            ppu,
            ppl,
            cpm,
            sigma_level,
            expected_ppm: sigma_to_ppm(sigma_level),
            dpmo: defects / n * 1_000_000.0,
            yield_percent: (n - defects) / n * 100.0,
            mean,
            std_dev,
            short_term_std_dev: short,
            target,
            centering: (mean - target) / (tolerance / 2.0),
            interpretation: Interpretation::new(cp, cpk, sigma_level),
        };
        debug!(
            observations = values.len(),
            cp,
            cpk,
            ppk,
            sigma_level,
            defects,
            "computed process capability"
        );
        Ok(report)
    }
}

/// Runs a process capability study with the default minimum of 30 values.
///
/// See [`ProcessCapability::analyze`].
pub fn process_capability(
    values: &[f64],
    spec: &SpecLimits,
    pooled_std_dev: Option<f64>,
) -> Result<CapabilityReport> {
    ProcessCapability::new(*spec).analyze(values, pooled_std_dev)
}

/// Supported confidence levels for [`cpk_confidence_interval`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfidenceLevel {
    #[serde(rename = "0.90")]
    Ninety,
    #[default]
    #[serde(rename = "0.95")]
    NinetyFive,
    #[serde(rename = "0.99")]
    NinetyNine,
}

impl ConfidenceLevel {
    /// Two-sided standard normal quantile.
    pub fn z(self) -> f64 {
        match self {
            ConfidenceLevel::Ninety => 1.645,
            ConfidenceLevel::NinetyFive => 1.960,
            ConfidenceLevel::NinetyNine => 2.576,
        }
    }

    pub fn as_f64(self) -> f64 {
        match self {
            ConfidenceLevel::Ninety => 0.90,
            ConfidenceLevel::NinetyFive => 0.95,
            ConfidenceLevel::NinetyNine => 0.99,
        }
    }
}

impl TryFrom<f64> for ConfidenceLevel {
    type Error = SpcError;

    fn try_from(level: f64) -> Result<Self> {
        [
            ConfidenceLevel::Ninety,
            ConfidenceLevel::NinetyFive,
            ConfidenceLevel::NinetyNine,
        ]
        .into_iter()
        .find(|c| (c.as_f64() - level).abs() < 1e-9)
        .ok_or(SpcError::UnsupportedConfidenceLevel(level))
    }
}

/// Two-sided confidence interval for Cpk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
    pub confidence: ConfidenceLevel,
}

/// Bissell's normal-approximation confidence interval for Cpk.
///
/// ```text
/// SE = sqrt(1 / (9n) + Cpk^2 / (2(n - 1)))
/// ```
///
/// which equals `Cpk * sqrt(1/(9 n Cpk^2) + 1/(2(n-1)))` but stays defined
/// at `Cpk = 0`.
///
/// # Errors
///
/// - [`SpcError::InsufficientValues`] if `n < 2`.
/// - [`SpcError::NonFiniteValue`] if `cpk` is NaN or infinite.
///
/// # Examples
///
/// ```
/// use spc_limits::capability::{cpk_confidence_interval, ConfidenceLevel};
///
/// let ci = cpk_confidence_interval(1.33, 50, ConfidenceLevel::NinetyFive).unwrap();
/// assert!(ci.lower < 1.33 && 1.33 < ci.upper);
/// ```
pub fn cpk_confidence_interval(
    cpk: f64,
    n: usize,
    confidence: ConfidenceLevel,
) -> Result<ConfidenceInterval> {
    if n < 2 {
        return Err(SpcError::InsufficientValues {
            required: 2,
            actual: n,
        });
    }
    if !cpk.is_finite() {
        return Err(SpcError::NonFiniteValue {
            index: 0,
            value: cpk,
        });
    }
    let n = n as f64;
    let se = (1.0 / (9.0 * n) + cpk * cpk / (2.0 * (n - 1.0))).sqrt();
    let half_width = confidence.z() * se;
    Ok(ConfidenceInterval {
        lower: cpk - half_width,
        upper: cpk + half_width,
        confidence,
    })
}
