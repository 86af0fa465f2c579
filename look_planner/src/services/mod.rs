//! Plan assembly and the end-to-end generation pipeline.

pub mod assembler;
pub mod pipeline;

pub use assembler::{assemble, assemble_all, sanitize_name};
pub use pipeline::{generate_todays_plan, LookPlanPipeline, PlanOutcome, PlanRun, PlannedTarget};
