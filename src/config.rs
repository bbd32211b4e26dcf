//! Calculator defaults.
//!
//! [`SpcConfig`] holds the tunable parameters of the calculators. It is
//! plain data: callers load it however they like (JSON, TOML, hard-coded)
//! and pass it in. Missing fields fall back to the Shewhart defaults.
//!
//! ```
//! use spc_limits::SpcConfig;
//!
//! let config: SpcConfig = serde_json::from_str(r#"{ "movingRangeSpan": 3 }"#).unwrap();
//! assert_eq!(config.moving_range_span, 3);
//! assert_eq!(config.sigma_multiplier, 3.0);
//! assert_eq!(config.capability.min_samples, 30);
//! ```

use serde::{Deserialize, Serialize};

use crate::capability::{
    self, CapabilityReport, MachineCapability, ProcessCapability, SpecLimits,
    MIN_CAPABILITY_SAMPLES, MIN_MACHINE_SAMPLES,
};
use crate::error::{Result, SpcError};
use crate::spc::constants::MAX_SAMPLE_SIZE;
use crate::spc::{
    self as limits, validation, IndividualsMRLimits, SigmaLimits, DEFAULT_MOVING_RANGE_SPAN,
    DEFAULT_SIGMA_MULTIPLIER,
};

/// Calculator configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpcConfig {
    /// Window for the moving range of an Individuals chart.
    pub moving_range_span: usize,
    /// `k` for [`SpcConfig::sigma_limits`].
    pub sigma_multiplier: f64,
    pub capability: CapabilityConfig,
}

impl Default for SpcConfig {
    fn default() -> Self {
        Self {
            moving_range_span: DEFAULT_MOVING_RANGE_SPAN,
            sigma_multiplier: DEFAULT_SIGMA_MULTIPLIER,
            capability: CapabilityConfig::default(),
        }
    }
}

/// Minimum study sizes for capability analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CapabilityConfig {
    pub min_samples: usize,
    pub machine_min_samples: usize,
}

impl Default for CapabilityConfig {
    fn default() -> Self {
        Self {
            min_samples: MIN_CAPABILITY_SAMPLES,
            machine_min_samples: MIN_MACHINE_SAMPLES,
        }
    }
}

impl SpcConfig {
    /// Checks every field against the bounds the calculators enforce.
    ///
    /// # Errors
    ///
    /// - [`SpcError::InvalidSpan`] if the span is outside `2..=25`.
    /// - [`SpcError::InvalidSigmaMultiplier`] if `k` is negative or not finite.
    /// - [`SpcError::InvalidConfig`] if a minimum study size is below 2.
    pub fn validate(&self) -> Result<()> {
        validation::moving_range_span(self.moving_range_span, MAX_SAMPLE_SIZE + 1)?;
        validation::sigma_multiplier(self.sigma_multiplier)?;
        if self.capability.min_samples < 2 {
            return Err(SpcError::InvalidConfig(
                "capability.minSamples must be at least 2",
            ));
        }
        if self.capability.machine_min_samples < 2 {
            return Err(SpcError::InvalidConfig(
                "capability.machineMinSamples must be at least 2",
            ));
        }
        Ok(())
    }

    /// [`crate::spc::individuals_mr_limits`] with the configured span.
    pub fn individuals_mr_limits(&self, values: &[f64]) -> Result<IndividualsMRLimits> {
        limits::individuals_mr_limits(values, self.moving_range_span)
    }

    /// [`crate::spc::sigma_limits`] with the configured multiplier.
    pub fn sigma_limits(&self, values: &[f64]) -> Result<SigmaLimits> {
        limits::sigma_limits(values, self.sigma_multiplier)
    }

    /// [`crate::capability::process_capability`] with the configured
    /// minimum study size.
    pub fn process_capability(
        &self,
        values: &[f64],
        spec: &SpecLimits,
        pooled_std_dev: Option<f64>,
    ) -> Result<CapabilityReport> {
        self.validate()?;
        ProcessCapability::new(*spec)
            .with_min_samples(self.capability.min_samples)
            .analyze(values, pooled_std_dev)
    }

    /// [`crate::capability::machine_capability`] with the configured
    /// minimum study size.
    pub fn machine_capability(
        &self,
        values: &[f64],
        spec: &SpecLimits,
    ) -> Result<MachineCapability> {
        self.validate()?;
        capability::machine_capability_with_min(values, spec, self.capability.machine_min_samples)
    }
}
