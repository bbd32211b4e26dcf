//! Process capability analysis.
//!
//! Computes standard capability indices for assessing how well a process
//! meets specification limits.
//!
//! # Indices
//!
//! - **Cp** - Potential capability (spread vs tolerance)
//! - **Cpk** - Actual capability (centering considered)
//! - **Pp**, **Ppk** - Long-term performance indices
//! - **Cpm** - Taguchi capability (target deviation)
//! - **Cm**, **Cmk** - Machine capability from a short consecutive run
//!
//! # Sigma Level
//!
//! - [`sigma_to_ppm`] - Convert sigma level to PPM defect rate
//! - [`ppm_to_sigma`] - Convert PPM defect rate to sigma level
//!
//! # References
//!
//! - Montgomery (2019), *Introduction to Statistical Quality Control*, 8th ed.

mod indices;
mod machine;
mod sigma_level;

pub use indices::{
    cpk_confidence_interval, process_capability, Assessment, CapabilityReport,
    ConfidenceInterval, ConfidenceLevel, Grade, Interpretation, ProcessCapability, SpecLimits,
    MIN_CAPABILITY_SAMPLES,
};
pub(crate) use machine::machine_capability_with_min;
pub use machine::{machine_capability, MachineCapability, MIN_MACHINE_SAMPLES};
pub use sigma_level::{ppm_to_sigma, sigma_to_ppm, SigmaQuality, LONG_TERM_SHIFT};
