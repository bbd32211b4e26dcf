//! Statistical Process Control (SPC) control limits.
//!
//! Every calculator is a pure function: it validates its input, computes
//! statistics and returns a fresh result value. Nothing is cached between
//! calls, so the functions can be called concurrently without locking.
//!
//! # Limit Calculators
//!
//! - [`xbar_r_limits`] - X-bar and Range chart limits for subgroup data (n=2..25)
//! - [`individuals_mr_limits`] - Individuals and Moving Range chart limits
//! - [`pooled_std_dev`] - Pooled standard deviation across subgroups
//! - [`sigma_limits`] - Generic `mean +/- k * sigma` limits
//!
//! # Run Rules
//!
//! - [`WesternElectricRules`] - 4 classic run rules
//! - [`NelsonRules`] - 8 rules (superset of Western Electric)
//!
//! # References
//!
//! - Montgomery, D.C. (2019). *Introduction to Statistical Quality Control*, 8th ed.
//! - ASTM E2587 - Standard Practice for Use of Control Charts
//! - Nelson, L.S. (1984). "The Shewhart Control Chart - Tests for Special Causes",
//!   *Journal of Quality Technology* 16(4), pp. 237-239.

mod chart;
pub mod constants;
mod dispersion;
mod rules;
pub(crate) mod validation;
mod variables;

pub use chart::ControlLimits;
pub use constants::ConstantRow;
pub use dispersion::{pooled_std_dev, sigma_limits, SigmaLimits, DEFAULT_SIGMA_MULTIPLIER};
pub use rules::{
    check_rules, NelsonRules, Rule, RuleReport, RunRule, Severity, Violation,
    WesternElectricRules, IN_CONTROL_ACTION,
};
pub use variables::{
    individuals_mr_limits, moving_ranges, subgroup_stats, xbar_r_limits, IndividualsMRLimits,
    MovingRangeLimits, SubgroupStats, XBarRLimits, DEFAULT_MOVING_RANGE_SPAN,
};
