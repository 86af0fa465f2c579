//! Error types for plan generation.

/// Result type for planner operations
pub type PlannerResult<T> = Result<T, PlannerError>;

/// Error type for planner operations.
///
/// Rescale decisions and degenerate rates are not errors; they are reported
/// as [`crate::models::PlanDiagnostic`] events alongside the planned exposure.
#[derive(Debug, thiserror::Error)]
pub enum PlannerError {
    #[error("Target source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),

    #[error("Invalid magnitude band: {0}")]
    InvalidBand(String),

    #[error("Invalid name override: {0}")]
    InvalidOverride(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Write failure: {0}")]
    WriteFailure(String),
}

