use serde::{Deserialize, Serialize};
use std::fmt;

/// Exposure times (seconds) a plan entry may request, ascending.
pub const ALLOWED_EXPTIMES: [u32; 5] = [20, 30, 60, 120, 300];

/// A decision the planner took while bounding an exposure.
///
/// None of these are failures. The pipeline logs them; tests inspect them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlanDiagnostic {
    /// Estimate exceeded the time before the target trails out of the aperture.
    RateRescale { from: f64, to: f64 },
    /// Exposure exceeded the guide-tracking ceiling.
    TrackingRescale { from: f64, to: f64 },
    /// Rate was zero, negative or not finite; no rate cap was applied.
    UnboundedRate { rate: f64 },
    /// Photometric estimate was zero, negative or not finite.
    DegenerateEstimate { estimate: f64 },
    /// Nearest allowed value was above the ceiling.
    StepDown { from: u32, to: u32 },
    /// No allowed value fits under the exposure ceiling.
    LimitUnsatisfiable { limit: f64, exptime: u32 },
}

impl fmt::Display for PlanDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanDiagnostic::RateRescale { from, to } => write!(
                f,
                "exposure time is too long for rate, rescaling: {:.1}s -> {:.1}s",
                from, to
            ),
            PlanDiagnostic::TrackingRescale { from, to } => write!(
                f,
                "exposure time is too long for tracking, rescaling: {:.1}s -> {:.1}s",
                from, to
            ),
            PlanDiagnostic::UnboundedRate { rate } => {
                write!(f, "rate {} \"/min gives no trailing limit", rate)
            }
            PlanDiagnostic::DegenerateEstimate { estimate } => {
                write!(f, "photometric estimate {} is unusable", estimate)
            }
            PlanDiagnostic::StepDown { from, to } => {
                write!(f, "allowed exposure {}s exceeds ceiling, using {}s", from, to)
            }
            PlanDiagnostic::LimitUnsatisfiable { limit, exptime } => write!(
                f,
                "ceiling {:.1}s is below every allowed exposure, using {}s",
                limit, exptime
            ),
        }
    }
}

/// Planner output for one classified target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedExposure {
    /// Discretized exposure time in seconds, one of [`ALLOWED_EXPTIMES`]
    pub exptime: u32,
    /// Exposures per filter that fit in the budget
    pub repeats: u32,
    /// Total time budget for the target, in seconds
    pub budget: u32,
    /// Continuous exposure after rate and tracking caps, before discretization
    pub capped_exptime: f64,
    /// Trailing limit in seconds; `None` when the rate gives no limit
    pub rate_limit: Option<f64>,
    #[serde(default)]
    pub diagnostics: Vec<PlanDiagnostic>,
}

impl PlannedExposure {
    pub fn was_rescaled(&self) -> bool {
        self.diagnostics.iter().any(|d| {
            matches!(
                d,
                PlanDiagnostic::RateRescale { .. } | PlanDiagnostic::TrackingRescale { .. }
            )
        })
    }
}
