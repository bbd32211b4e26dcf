//! Sigma quality levels.
//!
//! Converts between parts-per-million (PPM) defect rates and sigma quality
//! levels using the 1.5-sigma long-term shift convention, and grades a
//! sigma level into the familiar six-sigma quality bands.
//!
//! | Sigma | PPM (defects per million) |
//! |-------|--------------------------|
//! | 6.0   | 3.4                      |
//! | 5.0   | 233                      |
//! | 4.0   | 6,210                    |
//! | 3.0   | 66,807                   |
//! | 2.0   | 308,538                  |
//!
//! # References
//!
//! - Harry & Schroeder (2000), *Six Sigma: The Breakthrough Management
//!   Strategy Revolutionizing the World's Top Corporations*.

use std::fmt;

use serde::{Deserialize, Serialize};
use u_numflow::special::{inverse_normal_cdf, standard_normal_cdf};

/// Long-term drift of the process mean assumed by the sigma-level scale.
pub const LONG_TERM_SHIFT: f64 = 1.5;

/// Converts a sigma quality level to an expected PPM defect rate.
///
/// ```text
/// PPM = 1,000,000 * (1 - Phi(sigma - 1.5))
/// ```
///
/// # Examples
///
/// ```
/// use spc_limits::capability::sigma_to_ppm;
///
/// assert!((sigma_to_ppm(6.0) - 3.4).abs() < 1.0);
/// assert!((sigma_to_ppm(3.0) - 66_807.0).abs() < 500.0);
/// ```
pub fn sigma_to_ppm(sigma: f64) -> f64 {
    1_000_000.0 * (1.0 - standard_normal_cdf(sigma - LONG_TERM_SHIFT))
}

/// Converts a PPM defect rate to a sigma quality level.
///
/// Inverse of [`sigma_to_ppm`]. Returns `None` unless `0 < ppm < 1_000_000`.
///
/// # Examples
///
/// ```
/// use spc_limits::capability::ppm_to_sigma;
///
/// let sigma = ppm_to_sigma(3.4).unwrap();
/// assert!((sigma - 6.0).abs() < 0.1);
/// assert!(ppm_to_sigma(0.0).is_none());
/// ```
pub fn ppm_to_sigma(ppm: f64) -> Option<f64> {
    if ppm.is_nan() || ppm <= 0.0 || ppm >= 1_000_000.0 {
        return None;
    }
    let z = inverse_normal_cdf(1.0 - ppm / 1_000_000.0);
    z.is_finite().then_some(z + LONG_TERM_SHIFT)
}

/// Six-sigma quality band for a sigma level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SigmaQuality {
    /// Below 2 sigma.
    Poor,
    BelowAverage,
    Average,
    Good,
    Excellent,
    /// 6 sigma and above.
    WorldClass,
}

impl SigmaQuality {
    /// Band containing `sigma_level`.
    pub fn from_sigma_level(sigma_level: f64) -> Self {
        if sigma_level >= 6.0 {
            SigmaQuality::WorldClass
        } else if sigma_level >= 5.0 {
            SigmaQuality::Excellent
        } else if sigma_level >= 4.0 {
            SigmaQuality::Good
        } else if sigma_level >= 3.0 {
            SigmaQuality::Average
        } else if sigma_level >= 2.0 {
            SigmaQuality::BelowAverage
        } else {
            SigmaQuality::Poor
        }
    }
}

impl fmt::Display for SigmaQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SigmaQuality::WorldClass => "6σ - World Class (3.4 DPMO)",
            SigmaQuality::Excellent => "5σ - Excellent (233 DPMO)",
            SigmaQuality::Good => "4σ - Good (6,210 DPMO)",
            SigmaQuality::Average => "3σ - Average (66,807 DPMO)",
            SigmaQuality::BelowAverage => "2σ - Below Average (308,537 DPMO)",
            SigmaQuality::Poor => "1σ - Poor (>690,000 DPMO)",
        };
        f.write_str(label)
    }
}
