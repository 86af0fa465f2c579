//! Exposure planning.
//!
//! Turns a classified target's brightness and sky-motion rate into a
//! discretized exposure time and a repeat count:
//!
//! 1. rough estimate from the photometric model
//! 2. clamp to the time before the target trails out of the aperture
//! 3. clamp to the guide-tracking ceiling
//! 4. round to the nearest allowed exposure (ties go to the shorter one),
//!    stepping down if the rounded value overshoots the ceiling
//! 5. pick the total time budget from the priority
//! 6. repeats = floor(budget / (exptime + readout))

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use qtty::Seconds;

use super::photometry::{ExposureEstimator, ReferenceStarModel};
use crate::models::{ClassifiedTarget, PlanDiagnostic, PlannedExposure, ALLOWED_EXPTIMES};

/// Detector plate scale in arcsec/pixel
pub const DEFAULT_PIXEL_SCALE: f64 = 0.6;
/// Photometry aperture radius in pixels
pub const DEFAULT_APERTURE_RADIUS: f64 = 5.0;
/// Longest exposure guiding holds, in seconds
pub const DEFAULT_TRACKING_LIMIT: f64 = 300.0;
/// Per-exposure readout dead time, in seconds
pub const DEFAULT_READOUT: f64 = 40.0;

/// How a priority class maps to a total observing-time budget.
///
/// Two conventions exist for LOOK plans and they cannot be reconciled, so the
/// choice is always explicit configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BudgetPolicy {
    /// priority > 3 gets 1800 s, everything else 300 s
    #[default]
    Tiered,
    /// priority == 1 gets 1800 s, everything else 600 s
    TopPriority,
}

impl BudgetPolicy {
    /// Total time budget in seconds for a priority class.
    pub fn budget(&self, priority: u32) -> u32 {
        match self {
            BudgetPolicy::Tiered => {
                if priority > 3 {
                    30 * 60
                } else {
                    5 * 60
                }
            }
            BudgetPolicy::TopPriority => {
                if priority == 1 {
                    30 * 60
                } else {
                    10 * 60
                }
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetPolicy::Tiered => "tiered",
            BudgetPolicy::TopPriority => "top-priority",
        }
    }
}

impl fmt::Display for BudgetPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BudgetPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tiered" => Ok(BudgetPolicy::Tiered),
            "top-priority" | "top_priority" => Ok(BudgetPolicy::TopPriority),
            other => Err(format!(
                "Unknown budget policy '{}'. Must be 'tiered' or 'top-priority'",
                other
            )),
        }
    }
}

/// Instrument geometry and timing used by the planner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExposureSettings {
    pub pixel_scale: f64,
    pub aperture_radius: f64,
    pub tracking_limit: f64,
    pub readout: f64,
    pub budget_policy: BudgetPolicy,
}

impl Default for ExposureSettings {
    fn default() -> Self {
        Self {
            pixel_scale: DEFAULT_PIXEL_SCALE,
            aperture_radius: DEFAULT_APERTURE_RADIUS,
            tracking_limit: DEFAULT_TRACKING_LIMIT,
            readout: DEFAULT_READOUT,
            budget_policy: BudgetPolicy::default(),
        }
    }
}

/// Exposure after which a target moving at `rate` arcsec/min trails out of
/// an aperture of `aperture_radius` pixels.
///
/// Returns `None` when the rate is zero, negative or not finite: such a
/// target never trails, so there is no limit.
pub fn rate_limit_seconds(rate: f64, pixel_scale: f64, aperture_radius: f64) -> Option<Seconds> {
    if !rate.is_finite() || rate <= 0.0 {
        return None;
    }
    let pixels_per_minute = rate / pixel_scale;
    Some(Seconds::new(aperture_radius / pixels_per_minute * 60.0))
}

/// Nearest allowed exposure by absolute difference. On a tie the shorter
/// exposure wins (first minimum over the ascending list).
pub fn round_to_allowed(exptime: f64) -> u32 {
    let mut best = ALLOWED_EXPTIMES[0];
    let mut best_diff = (ALLOWED_EXPTIMES[0] as f64 - exptime).abs();
    for &allowed in &ALLOWED_EXPTIMES[1..] {
        let diff = (allowed as f64 - exptime).abs();
        if diff < best_diff {
            best = allowed;
            best_diff = diff;
        }
    }
    best
}

/// Largest allowed exposure not above `ceiling`.
pub fn largest_allowed_within(ceiling: f64) -> Option<u32> {
    ALLOWED_EXPTIMES
        .iter()
        .rev()
        .copied()
        .find(|&allowed| allowed as f64 <= ceiling)
}

/// Total time budget in seconds for a priority class.
pub fn total_time_budget(priority: u32, policy: BudgetPolicy) -> u32 {
    policy.budget(priority)
}

/// Exposures that fit in `budget`, each costing `exptime + readout` seconds.
pub fn repeat_count(budget: u32, exptime: u32, readout: f64) -> u32 {
    let cycle = exptime as f64 + readout;
    if !cycle.is_finite() || cycle <= 0.0 {
        return 0;
    }
    (budget as f64 / cycle).floor().max(0.0) as u32
}

/// Plans exposures for classified targets.
///
/// Planning is pure: the same target and settings always give the same
/// [`PlannedExposure`], diagnostics included.
#[derive(Debug, Clone)]
pub struct ExposurePlanner<E = ReferenceStarModel> {
    settings: ExposureSettings,
    estimator: E,
}

impl ExposurePlanner<ReferenceStarModel> {
    /// Planner with default settings and the default photometric model
    pub fn with_defaults() -> Self {
        Self::new(ExposureSettings::default(), ReferenceStarModel::default())
    }
}

impl<E: ExposureEstimator> ExposurePlanner<E> {
    pub fn new(settings: ExposureSettings, estimator: E) -> Self {
        Self {
            settings,
            estimator,
        }
    }

    pub fn settings(&self) -> &ExposureSettings {
        &self.settings
    }

    pub fn plan(&self, target: &ClassifiedTarget) -> PlannedExposure {
        let settings = &self.settings;
        let record = &target.target;
        let mut diagnostics = Vec::new();

        let estimate = self.estimator.estimate(record.magnitude);
        let mut exposure = if estimate.is_finite() && estimate > 0.0 {
            estimate
        } else {
            diagnostics.push(PlanDiagnostic::DegenerateEstimate { estimate });
            ALLOWED_EXPTIMES[0] as f64
        };

        let rate_limit =
            rate_limit_seconds(record.rate, settings.pixel_scale, settings.aperture_radius)
                .map(Seconds::value);
        match rate_limit {
            Some(limit) if exposure > limit => {
                diagnostics.push(PlanDiagnostic::RateRescale {
                    from: exposure,
                    to: limit,
                });
                exposure = limit;
            }
            Some(_) => {}
            None => diagnostics.push(PlanDiagnostic::UnboundedRate { rate: record.rate }),
        }

        if exposure > settings.tracking_limit {
            diagnostics.push(PlanDiagnostic::TrackingRescale {
                from: exposure,
                to: settings.tracking_limit,
            });
            exposure = settings.tracking_limit;
        }

        let capped_exptime = exposure;
        let mut exptime = round_to_allowed(capped_exptime);

        let ceiling = match rate_limit {
            Some(limit) => limit.min(settings.tracking_limit),
            None => settings.tracking_limit,
        };
        if exptime as f64 > ceiling {
            match largest_allowed_within(ceiling) {
                Some(fitting) => {
                    diagnostics.push(PlanDiagnostic::StepDown {
                        from: exptime,
                        to: fitting,
                    });
                    exptime = fitting;
                }
                None => {
                    exptime = ALLOWED_EXPTIMES[0];
                    diagnostics.push(PlanDiagnostic::LimitUnsatisfiable {
                        limit: ceiling,
                        exptime,
                    });
                }
            }
        }

        let budget = total_time_budget(target.priority, settings.budget_policy);
        let repeats = repeat_count(budget, exptime, settings.readout);

        PlannedExposure {
            exptime,
            repeats,
            budget,
            capped_exptime,
            rate_limit,
            diagnostics,
        }
    }
}
