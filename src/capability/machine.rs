//! Machine capability (Cm, Cmk).
//!
//! A machine capability study measures a single machine over a short run of
//! consecutive parts, so only the overall sample standard deviation is
//! available. The indices mirror Cp/Cpk with that sigma.
//!
//! # References
//!
//! - VDA Band 4 (2011), *Quality Assurance in the Process Landscape*,
//!   Chapter "Machine and Process Capability".

use serde::{Deserialize, Serialize};
use tracing::debug;
use u_numflow::stats;

use crate::error::{Result, SpcError};
use crate::spc::validation;

use super::indices::SpecLimits;

/// Minimum number of consecutive parts for a machine capability study.
pub const MIN_MACHINE_SAMPLES: usize = 50;

/// Machine capability indices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineCapability {
    /// Cm = (USL - LSL) / (6s).
    pub cm: f64,
    /// Cmk = min(Cmu, Cml).
    pub cmk: f64,
    pub cmu: f64,
    pub cml: f64,
    pub mean: f64,
    pub std_dev: f64,
}

/// Computes Cm/Cmk from at least 50 consecutive measurements.
///
/// # Errors
///
/// - [`SpcError::InsufficientCapabilityData`] with fewer than 50 values.
/// - [`SpcError::InvalidSpecLimits`] unless `usl > lsl`, both finite.
/// - [`SpcError::NonFiniteValue`] on NaN or infinity.
/// - [`SpcError::ZeroVariation`] if every measurement is identical.
/// - [`SpcError::Overflow`] if the mean or standard deviation overflows.
///
/// # Examples
///
/// ```
/// use spc_limits::capability::{machine_capability, SpecLimits};
///
/// let spec = SpecLimits::new(10.6, 9.4).unwrap();
/// let values: Vec<f64> = (0..50).map(|i| 10.0 + ((i % 5) as f64 - 2.0) * 0.1).collect();
/// let m = machine_capability(&values, &spec).unwrap();
/// assert!((m.cm - 1.4).abs() < 1e-9);
/// ```
pub fn machine_capability(values: &[f64], spec: &SpecLimits) -> Result<MachineCapability> {
    machine_capability_with_min(values, spec, MIN_MACHINE_SAMPLES)
}

pub(crate) fn machine_capability_with_min(
    values: &[f64],
    spec: &SpecLimits,
    min_samples: usize,
) -> Result<MachineCapability> {
    let required = min_samples.max(2);
    if values.len() < required {
        return Err(SpcError::InsufficientCapabilityData {
            required,
            actual: values.len(),
        });
    }
    spec.validate()?;
    validation::ensure_finite(values, 0)?;

    let mean = validation::finite_statistic(stats::mean(values))?;
    let std_dev = validation::finite_statistic(stats::std_dev(values))?;
    if std_dev <= 0.0 {
        return Err(SpcError::ZeroVariation);
    }

    let cmu = (spec.usl - mean) / (3.0 * std_dev);
    let cml = (mean - spec.lsl) / (3.0 * std_dev);
    let m = MachineCapability {
        cm: spec.tolerance() / (6.0 * std_dev),
        cmk: cmu.min(cml),
        cmu,
        cml,
        mean,
        std_dev,
    };
    debug!(observations = values.len(), cm = m.cm, cmk = m.cmk, "computed machine capability");
    Ok(m)
}
