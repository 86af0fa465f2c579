//! Rough exposure estimates from apparent magnitude.

use serde::{Deserialize, Serialize};

/// Maps an apparent magnitude to a continuous exposure time in seconds.
///
/// Implementations must be monotonically non-decreasing in magnitude:
/// fainter targets never get shorter estimates.
pub trait ExposureEstimator: Send + Sync {
    fn estimate(&self, magnitude: f64) -> f64;
}

/// Scales a reference exposure by the flux ratio to a reference magnitude:
/// `t = t_ref * 10^(k * (m - m_ref))`.
///
/// With `k = 0.4` the exposure keeps the collected source flux constant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceStarModel {
    pub reference_magnitude: f64,
    /// Seconds needed at the reference magnitude
    pub reference_exptime: f64,
    pub scale_per_magnitude: f64,
}

impl Default for ReferenceStarModel {
    fn default() -> Self {
        Self {
            reference_magnitude: 17.0,
            reference_exptime: 20.0,
            scale_per_magnitude: 0.4,
        }
    }
}

impl ExposureEstimator for ReferenceStarModel {
    fn estimate(&self, magnitude: f64) -> f64 {
        self.reference_exptime
            * 10f64.powf(self.scale_per_magnitude * (magnitude - self.reference_magnitude))
    }
}

/// Same estimate for every magnitude. Useful for fixed-exposure campaigns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedExposure(pub f64);

impl ExposureEstimator for FixedExposure {
    fn estimate(&self, _magnitude: f64) -> f64 {
        self.0
    }
}
