//! Parsers for LOOK target data.
//!
//! # Parsers
//!
//! - [`look_table`]: Parse the published `active` / `new` target tables
//! - [`coordinates`]: Parse sexagesimal right ascension and declination strings
//!
//! # Example
//!
//! ```no_run
//! use look_planner::parsing::look_table::parse_look_file;
//! use std::path::Path;
//!
//! let catalog = parse_look_file(Path::new("look_targets.json"))
//!     .expect("Failed to parse targets");
//! println!("{} active targets", catalog.active.len());
//! ```

pub mod coordinates;
pub mod look_table;

#[cfg(test)]
mod look_table_tests;

pub use look_table::{parse_look_file, parse_look_str};
