use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{PlannerError, PlannerResult};
use crate::parsing::coordinates;

/// Default priority for targets that match no band and no override.
pub const DEFAULT_PRIORITY: u32 = 3;

/// A right ascension or declination as published by the target source.
///
/// The LOOK table publishes sexagesimal text (`"10 24 37.22"`), while
/// snapshots may already carry decimal degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CoordinateValue {
    Degrees(f64),
    Sexagesimal(String),
}

impl CoordinateValue {
    /// Right ascension in decimal degrees. Text is read as hour angle.
    pub fn ra_degrees(&self) -> PlannerResult<qtty::Degrees> {
        match self {
            CoordinateValue::Degrees(deg) => Ok(qtty::Degrees::new(*deg)),
            CoordinateValue::Sexagesimal(text) => coordinates::parse_ra(text)
                .map_err(|e| PlannerError::InvalidCoordinate(format!("{:#}", e))),
        }
    }

    /// Declination in decimal degrees.
    pub fn dec_degrees(&self) -> PlannerResult<qtty::Degrees> {
        match self {
            CoordinateValue::Degrees(deg) => Ok(qtty::Degrees::new(*deg)),
            CoordinateValue::Sexagesimal(text) => coordinates::parse_dec(text)
                .map_err(|e| PlannerError::InvalidCoordinate(format!("{:#}", e))),
        }
    }
}

impl fmt::Display for CoordinateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordinateValue::Degrees(deg) => write!(f, "{}", deg),
            CoordinateValue::Sexagesimal(text) => f.write_str(text),
        }
    }
}

/// The two tables published by the LOOK project page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetCategory {
    Active,
    New,
}

impl TargetCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetCategory::Active => "active",
            TargetCategory::New => "new",
        }
    }
}

impl fmt::Display for TargetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(TargetCategory::Active),
            "new" => Ok(TargetCategory::New),
            other => Err(format!(
                "Unknown target category '{}'. Must be 'active' or 'new'",
                other
            )),
        }
    }
}

/// A raw target row. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetRecord {
    pub name: String,
    pub ra: CoordinateValue,
    pub dec: CoordinateValue,
    /// Apparent V-band magnitude
    pub magnitude: f64,
    /// On-sky rate of motion in arcsec/minute. Zero when unpublished.
    pub rate: f64,
}

/// Target rows grouped by category, in published order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetCatalog {
    #[serde(default)]
    pub active: Vec<TargetRecord>,
    #[serde(default)]
    pub new: Vec<TargetRecord>,
}

impl TargetCatalog {
    pub fn category(&self, category: TargetCategory) -> &[TargetRecord] {
        match category {
            TargetCategory::Active => &self.active,
            TargetCategory::New => &self.new,
        }
    }

    /// Total number of rows across both categories.
    pub fn len(&self) -> usize {
        self.active.len() + self.new.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A target with its assigned priority class.
///
/// Priority is always >= 1. Larger values mean higher urgency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedTarget {
    pub target: TargetRecord,
    pub priority: u32,
}

impl ClassifiedTarget {
    pub fn new(target: TargetRecord, priority: u32) -> Self {
        Self { target, priority }
    }

    pub fn name(&self) -> &str {
        &self.target.name
    }
}
