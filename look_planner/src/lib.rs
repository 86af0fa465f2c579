//! LOOK observing-plan generator.
//!
//! Reads the published LOOK comet target tables, assigns each target a
//! priority, plans an exposure time and repeat count from its brightness and
//! sky motion, and writes a dated JSON plan for the telescope scheduler.
//!
//! # Example
//!
//! ```no_run
//! use look_planner::config::PlannerConfig;
//! use look_planner::services::generate_todays_plan;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let mut config = PlannerConfig::from_default_location()?;
//! config.apply_env_overrides();
//! let run = generate_todays_plan(config).await?;
//! println!("wrote {} entries to {}", run.receipt.entries, run.receipt.path.display());
//! # Ok(())
//! # }
//! ```

pub mod algorithms;
pub mod config;
pub mod error;
pub mod io;
pub mod models;
pub mod parsing;
pub mod preprocessing;
pub mod services;

pub use config::PlannerConfig;
pub use error::{PlannerError, PlannerResult};
