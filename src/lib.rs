//! # spc-limits
//!
//! Statistical process control (SPC) limit calculators and process
//! capability analysis.
//!
//! This crate computes the numbers behind Shewhart control charts from
//! raw `f64` data. It knows nothing about where the measurements come from
//! or how charts are drawn; every calculator is a pure function returning a
//! fresh, serializable result.
//!
//! ## Modules
//!
//! - [`spc`] - X̄-R and I-MR limits, pooled sigma, k-sigma limits, run rules
//! - [`capability`] - Process capability (Cp, Cpk, Pp, Ppk, Cpm), machine
//!   capability (Cm, Cmk), sigma level conversions
//! - [`config`] - Serializable calculator defaults
//! - [`error`] - The [`SpcError`] type shared by all calculators
//!
//! ## Example
//!
//! ```
//! use spc_limits::spc::xbar_r_limits;
//!
//! let subgroups = [
//!     [1650.2, 1651.8, 1649.5, 1652.1, 1650.9],
//!     [1651.3, 1649.8, 1652.4, 1650.6, 1651.1],
//!     [1650.8, 1652.2, 1649.9, 1651.5, 1650.3],
//! ];
//! let limits = xbar_r_limits(&subgroups).unwrap();
//! assert_eq!(limits.subgroup_size, 5);
//! assert!(limits.x_bar.ucl > limits.x_bar.center_line);
//! ```
//!
//! ## Design Philosophy
//!
//! - **Stateless**: No caches or shared state; safe to call from any thread
//! - **Numerical stability**: Leverages `u-numflow` for stable statistics
//! - **Research-backed**: All algorithms reference academic literature

pub mod capability;
pub mod config;
pub mod error;
pub mod spc;

pub use config::{CapabilityConfig, SpcConfig};
pub use error::{ErrorKind, Result, SpcError};
