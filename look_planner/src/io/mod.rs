//! Target sources and plan persistence.
//!
//! # Example
//!
//! ```no_run
//! use look_planner::io::{FileTargetSource, PlanWriter, TargetSource};
//!
//! # async fn example() -> look_planner::error::PlannerResult<()> {
//! let source = FileTargetSource::new("look_targets.json");
//! let catalog = source.fetch().await?;
//! println!("{} active targets", catalog.active.len());
//!
//! let writer = PlanWriter::new("targets", "look.json");
//! println!("plan goes to {}", writer.plan_path(look_planner::io::today()).display());
//! # Ok(())
//! # }
//! ```

pub mod checksum;
pub mod source;
pub mod writer;

pub use checksum::calculate_checksum;
#[cfg(feature = "http-source")]
pub use source::HttpTargetSource;
pub use source::{source_from_settings, FileTargetSource, StaticTargetSource, TargetSource};
pub use writer::{serialize_plan, today, PlanReceipt, PlanWriter};
