//! Run rules for detecting non-random patterns in control charts.
//!
//! Implements the Western Electric (4 rules) and Nelson (8 rules) tests for
//! special causes of variation. The plotted series is checked against
//! limits computed by one of the calculators; sigma is taken as
//! `(UCL - CL) / 3`.
//!
//! # References
//!
//! - Nelson, L.S. (1984). "The Shewhart Control Chart - Tests for Special Causes",
//!   *Journal of Quality Technology* 16(4), pp. 237-239.
//! - Western Electric (1956). *Statistical Quality Control Handbook*.
//! - Montgomery, D.C. (2019). *Introduction to Statistical Quality Control*, 8th ed.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, SpcError};

use super::chart::ControlLimits;
use super::validation;

/// Nelson's eight tests for special causes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rule {
    /// Rule 1: one point beyond the control limits.
    BeyondLimits,
    /// Rule 2: 9 points in a row on the same side of the center line.
    NineOneSide,
    /// Rule 3: 6 points in a row steadily increasing or decreasing.
    SixTrend,
    /// Rule 4: 14 points in a row alternating up and down.
    FourteenAlternating,
    /// Rule 5: 2 of 3 points beyond 2 sigma, same side.
    TwoOfThreeBeyond2Sigma,
    /// Rule 6: 4 of 5 points beyond 1 sigma, same side.
    FourOfFiveBeyond1Sigma,
    /// Rule 7: 15 points in a row within 1 sigma (stratification).
    FifteenWithin1Sigma,
    /// Rule 8: 8 points in a row beyond 1 sigma on either side (mixture).
    EightBeyond1Sigma,
}

/// How urgently a violation should be acted upon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Rule {
    /// Rule number, 1..=8.
    pub fn number(self) -> u8 {
        match self {
            Rule::BeyondLimits => 1,
            Rule::NineOneSide => 2,
            Rule::SixTrend => 3,
            Rule::FourteenAlternating => 4,
            Rule::TwoOfThreeBeyond2Sigma => 5,
            Rule::FourOfFiveBeyond1Sigma => 6,
            Rule::FifteenWithin1Sigma => 7,
            Rule::EightBeyond1Sigma => 8,
        }
    }

    /// Number of consecutive points the rule inspects.
    pub fn window(self) -> usize {
        match self {
            Rule::BeyondLimits => 1,
            Rule::NineOneSide => 9,
            Rule::SixTrend => 6,
            Rule::FourteenAlternating => 14,
            Rule::TwoOfThreeBeyond2Sigma => 3,
            Rule::FourOfFiveBeyond1Sigma => 5,
            Rule::FifteenWithin1Sigma => 15,
            Rule::EightBeyond1Sigma => 8,
        }
    }

    pub fn severity(self) -> Severity {
        match self {
            Rule::BeyondLimits => Severity::Critical,
            Rule::NineOneSide | Rule::SixTrend | Rule::TwoOfThreeBeyond2Sigma => Severity::High,
            Rule::FourteenAlternating
            | Rule::FourOfFiveBeyond1Sigma
            | Rule::EightBeyond1Sigma => Severity::Medium,
            Rule::FifteenWithin1Sigma => Severity::Low,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Rule::BeyondLimits => "one point beyond 3 sigma from center line",
            Rule::NineOneSide => "9 points in a row on same side of center line",
            Rule::SixTrend => "6 points in a row steadily increasing or decreasing",
            Rule::FourteenAlternating => "14 points alternating up and down",
            Rule::TwoOfThreeBeyond2Sigma => "2 out of 3 points beyond 2 sigma (same side)",
            Rule::FourOfFiveBeyond1Sigma => "4 out of 5 points beyond 1 sigma (same side)",
            Rule::FifteenWithin1Sigma => "15 points in a row within 1 sigma of center line",
            Rule::EightBeyond1Sigma => "8 points in a row beyond 1 sigma (either side)",
        }
    }

    /// Corrective action for this pattern.
    pub fn recommended_action(self) -> &'static str {
        match self {
            Rule::BeyondLimits => {
                "Investigate special causes immediately; stop production if necessary."
            }
            Rule::NineOneSide => {
                "Process mean has shifted; check for systematic changes in materials, operators, or equipment."
            }
            Rule::SixTrend => {
                "Trend detected; check for tool wear, temperature drift, or gradual process changes."
            }
            Rule::FourteenAlternating => {
                "Excessive alternation; check for alternating causes or overcontrol."
            }
            Rule::TwoOfThreeBeyond2Sigma | Rule::FourOfFiveBeyond1Sigma => {
                "Process shift detected; investigate recent changes in process parameters."
            }
            Rule::FifteenWithin1Sigma => {
                "Unusually low variation; verify data collection and the measurement system."
            }
            Rule::EightBeyond1Sigma => {
                "High variation; check for multiple process streams or inconsistent inputs."
            }
        }
    }
}

/// Action returned when no rule fires.
pub const IN_CONTROL_ACTION: &str = "Process is in statistical control; continue routine monitoring.";

/// One rule firing at one point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub rule: Rule,
    /// Index of the point that completed the pattern.
    pub index: usize,
    /// First index of the inspected window.
    pub start_index: usize,
    /// Plotted value at `index`.
    pub value: f64,
}

impl Violation {
    fn new(rule: Rule, index: usize, values: &[f64]) -> Self {
        Self {
            rule,
            index,
            start_index: (index + 1).saturating_sub(rule.window()),
            value: values[index],
        }
    }

    pub fn severity(&self) -> Severity {
        self.rule.severity()
    }
}

/// Trait for applying run rules to a plotted series.
pub trait RunRule {
    /// Checks `values` against `limits`, returning violations sorted by
    /// point index. A point may appear once per rule it triggers.
    fn check(&self, values: &[f64], limits: &ControlLimits) -> Vec<Violation>;
}

/// Western Electric rules: Nelson rules 1, 2, 5 and 6.
#[derive(Debug, Clone, Copy, Default)]
pub struct WesternElectricRules;

/// All eight Nelson rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct NelsonRules;

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// `(one_sigma, two_sigma)` zone widths.
fn zone_widths(limits: &ControlLimits) -> (f64, f64) {
    let sigma = limits.sigma();
    (sigma, 2.0 * sigma)
}

/// Sign of each step: +1 up, -1 down, 0 flat.
fn step_directions(values: &[f64]) -> Vec<i8> {
    values
        .windows(2)
        .map(|w| {
            if w[1] > w[0] {
                1
            } else if w[1] < w[0] {
                -1
            } else {
                0
            }
        })
        .collect()
}

fn check_rule1(values: &[f64], limits: &ControlLimits) -> Vec<Violation> {
    values
        .iter()
        .enumerate()
        .filter(|&(_, &v)| v > limits.ucl || v < limits.lcl)
        .map(|(i, _)| Violation::new(Rule::BeyondLimits, i, values))
        .collect()
}

fn check_rule2(values: &[f64], limits: &ControlLimits) -> Vec<Violation> {
    let mut violations = Vec::new();
    if values.len() < 9 {
        return violations;
    }

    // A point exactly on the center line breaks the run.
    let side = |v: f64| -> i8 {
        if v > limits.center_line {
            1
        } else if v < limits.center_line {
            -1
        } else {
            0
        }
    };

    let mut run_length = 0_usize;
    let mut prev = 0_i8;
    for (i, &v) in values.iter().enumerate() {
        let s = side(v);
        run_length = if s != 0 && s == prev { run_length + 1 } else { 1 };
        prev = s;
        if s != 0 && run_length >= 9 {
            violations.push(Violation::new(Rule::NineOneSide, i, values));
        }
    }
    violations
}

fn check_rule3(values: &[f64]) -> Vec<Violation> {
    let mut violations = Vec::new();
    if values.len() < 6 {
        return violations;
    }

    let dirs = step_directions(values);
    let mut run_length = 0_usize;
    for i in 0..dirs.len() {
        run_length = if dirs[i] != 0 && i > 0 && dirs[i] == dirs[i - 1] {
            run_length + 1
        } else if dirs[i] != 0 {
            1
        } else {
            0
        };
        // 5 same-direction steps = 6 points; dirs[i] ends at values[i + 1].
        if run_length >= 5 {
            violations.push(Violation::new(Rule::SixTrend, i + 1, values));
        }
    }
    violations
}

fn check_rule4(values: &[f64]) -> Vec<Violation> {
    let mut violations = Vec::new();
    if values.len() < 14 {
        return violations;
    }

    let dirs = step_directions(values);
    let mut alt_length = 0_usize;
    for i in 0..dirs.len() {
        alt_length = if dirs[i] != 0 && i > 0 && dirs[i] == -dirs[i - 1] {
            alt_length + 1
        } else if dirs[i] != 0 {
            1
        } else {
            0
        };
        // 13 alternating steps = 14 points.
        if alt_length >= 13 {
            violations.push(Violation::new(Rule::FourteenAlternating, i + 1, values));
        }
    }
    violations
}

/// `count` of the last `window` points beyond `zone` on the same side.
fn check_zone_count(
    values: &[f64],
    limits: &ControlLimits,
    rule: Rule,
    zone: f64,
    count: usize,
) -> Vec<Violation> {
    let window = rule.window();
    let mut violations = Vec::new();
    if values.len() < window {
        return violations;
    }

    let upper = limits.center_line + zone;
    let lower = limits.center_line - zone;
    for i in (window - 1)..values.len() {
        let w = &values[i + 1 - window..=i];
        let above = w.iter().filter(|&&v| v > upper).count();
        let below = w.iter().filter(|&&v| v < lower).count();
        if above >= count || below >= count {
            violations.push(Violation::new(rule, i, values));
        }
    }
    violations
}

/// Runs of `rule.window()` consecutive points satisfying `pred`.
fn check_run(values: &[f64], rule: Rule, pred: impl Fn(f64) -> bool) -> Vec<Violation> {
    let mut violations = Vec::new();
    let mut run_length = 0_usize;
    for (i, &v) in values.iter().enumerate() {
        run_length = if pred(v) { run_length + 1 } else { 0 };
        if run_length >= rule.window() {
            violations.push(Violation::new(rule, i, values));
        }
    }
    violations
}

fn check_rule5(values: &[f64], limits: &ControlLimits) -> Vec<Violation> {
    let (_, two_sigma) = zone_widths(limits);
    check_zone_count(values, limits, Rule::TwoOfThreeBeyond2Sigma, two_sigma, 2)
}

fn check_rule6(values: &[f64], limits: &ControlLimits) -> Vec<Violation> {
    let (one_sigma, _) = zone_widths(limits);
    check_zone_count(values, limits, Rule::FourOfFiveBeyond1Sigma, one_sigma, 4)
}

fn check_rule7(values: &[f64], limits: &ControlLimits) -> Vec<Violation> {
    let (one_sigma, _) = zone_widths(limits);
    let (lo, hi) = (limits.center_line - one_sigma, limits.center_line + one_sigma);
    check_run(values, Rule::FifteenWithin1Sigma, |v| v >= lo && v <= hi)
}

fn check_rule8(values: &[f64], limits: &ControlLimits) -> Vec<Violation> {
    let (one_sigma, _) = zone_widths(limits);
    let (lo, hi) = (limits.center_line - one_sigma, limits.center_line + one_sigma);
    check_run(values, Rule::EightBeyond1Sigma, |v| v > hi || v < lo)
}

// ---------------------------------------------------------------------------
// RunRule implementations
// ---------------------------------------------------------------------------

impl RunRule for WesternElectricRules {
    fn check(&self, values: &[f64], limits: &ControlLimits) -> Vec<Violation> {
        let mut results = Vec::new();
        results.extend(check_rule1(values, limits));
        results.extend(check_rule2(values, limits));
        results.extend(check_rule5(values, limits));
        results.extend(check_rule6(values, limits));
        results.sort_by_key(|v| v.index);
        results
    }
}

impl RunRule for NelsonRules {
    fn check(&self, values: &[f64], limits: &ControlLimits) -> Vec<Violation> {
        let mut results = Vec::new();
        results.extend(check_rule1(values, limits));
        results.extend(check_rule2(values, limits));
        results.extend(check_rule3(values));
        results.extend(check_rule4(values));
        results.extend(check_rule5(values, limits));
        results.extend(check_rule6(values, limits));
        results.extend(check_rule7(values, limits));
        results.extend(check_rule8(values, limits));
        results.sort_by_key(|v| v.index);
        results
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Violations found in one series, with per-severity counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleReport {
    /// Violations sorted by point index.
    pub violations: Vec<Violation>,
    pub total_critical: usize,
    pub total_high: usize,
    pub total_medium: usize,
    pub total_low: usize,
}

impl RuleReport {
    fn from_violations(violations: Vec<Violation>) -> Self {
        let count = |s: Severity| violations.iter().filter(|v| v.severity() == s).count();
        Self {
            total_critical: count(Severity::Critical),
            total_high: count(Severity::High),
            total_medium: count(Severity::Medium),
            total_low: count(Severity::Low),
            violations,
        }
    }

    pub fn has_violations(&self) -> bool {
        !self.violations.is_empty()
    }

    pub fn total_violations(&self) -> usize {
        self.violations.len()
    }

    /// Violations of one severity, in point order.
    pub fn by_severity(&self, severity: Severity) -> impl Iterator<Item = &Violation> {
        self.violations
            .iter()
            .filter(move |v| v.severity() == severity)
    }

    /// Violations of one rule, in point order.
    pub fn by_rule(&self, rule: Rule) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(move |v| v.rule == rule)
    }

    /// One action per triggered rule family, in rule order.
    pub fn recommended_actions(&self) -> Vec<&'static str> {
        let mut rules: Vec<Rule> = self.violations.iter().map(|v| v.rule).collect();
        rules.sort_by_key(|r| r.number());
        let mut actions: Vec<&'static str> = Vec::new();
        for rule in rules {
            let action = rule.recommended_action();
            if !actions.contains(&action) {
                actions.push(action);
            }
        }
        if actions.is_empty() {
            actions.push(IN_CONTROL_ACTION);
        }
        actions
    }
}

/// Checks a plotted series against control limits with the given rule set.
///
/// # Errors
///
/// - [`SpcError::EmptyValues`] if `values` is empty.
/// - [`SpcError::NonFiniteValue`] on NaN or infinity.
///
/// # Examples
///
/// ```
/// use spc_limits::spc::{check_rules, ControlLimits, NelsonRules, Rule};
///
/// let limits = ControlLimits::symmetric(25.0, 5.0);
/// let report = check_rules(&[25.0, 31.0, 25.0], &limits, &NelsonRules).unwrap();
/// assert_eq!(report.violations[0].rule, Rule::BeyondLimits);
/// assert_eq!(report.total_critical, 1);
/// ```
pub fn check_rules(
    values: &[f64],
    limits: &ControlLimits,
    rules: &impl RunRule,
) -> Result<RuleReport> {
    if values.is_empty() {
        return Err(SpcError::EmptyValues);
    }
    validation::ensure_finite(values, 0)?;

    let report = RuleReport::from_violations(rules.check(values, limits));
    debug!(
        points = values.len(),
        violations = report.total_violations(),
        critical = report.total_critical,
        "checked run rules"
    );
    Ok(report)
}
