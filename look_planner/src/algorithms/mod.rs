//! Priority classification and exposure planning.

pub mod exposure;
pub mod photometry;
pub mod priority;

pub use exposure::{
    largest_allowed_within, rate_limit_seconds, repeat_count, round_to_allowed,
    total_time_budget, BudgetPolicy, ExposurePlanner, ExposureSettings,
};
pub use photometry::{ExposureEstimator, FixedExposure, ReferenceStarModel};
pub use priority::{
    classify, default_bands, default_overrides, priority_for, MagnitudeBand, NameOverride,
};
