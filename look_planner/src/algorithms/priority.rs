//! Priority classification of LOOK targets.
//!
//! Every target starts at [`DEFAULT_PRIORITY`]. Magnitude bands are applied in
//! order, then name overrides; within each pass the last match wins.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{PlannerError, PlannerResult};
use crate::models::{ClassifiedTarget, TargetRecord, DEFAULT_PRIORITY};

/// A magnitude range `lo < magnitude < hi` mapped to a priority.
///
/// Written as `"22-19"` in configuration. Bounds may be given in either
/// order; they are stored sorted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BandSpec", into = "BandSpec")]
pub struct MagnitudeBand {
    lo: f64,
    hi: f64,
    priority: u32,
}

/// Serialized form of a [`MagnitudeBand`]
#[derive(Debug, Clone, Serialize, Deserialize)]
struct BandSpec {
    range: String,
    priority: u32,
}

impl MagnitudeBand {
    pub fn new(a: f64, b: f64, priority: u32) -> PlannerResult<Self> {
        if !a.is_finite() || !b.is_finite() {
            return Err(PlannerError::InvalidBand(format!(
                "band bounds must be finite, got {} and {}",
                a, b
            )));
        }
        if priority == 0 {
            return Err(PlannerError::InvalidBand(
                "band priority must be a positive integer".to_string(),
            ));
        }
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        Ok(Self { lo, hi, priority })
    }

    /// Parse a `"22-19"` range with its priority.
    pub fn parse(range: &str, priority: u32) -> PlannerResult<Self> {
        let (first, second) = split_range(range)?;
        Self::new(first, second, priority)
    }

    pub fn lo(&self) -> f64 {
        self.lo
    }

    pub fn hi(&self) -> f64 {
        self.hi
    }

    pub fn priority(&self) -> u32 {
        self.priority
    }

    /// Strict containment; the bounds themselves do not match.
    pub fn contains(&self, magnitude: f64) -> bool {
        self.lo < magnitude && magnitude < self.hi
    }
}

/// Split `"22-19"` into its two bounds. A leading minus sign is allowed on
/// either bound (`"-1-2"`), which covers bright targets.
fn split_range(range: &str) -> PlannerResult<(f64, f64)> {
    let trimmed = range.trim();
    let invalid = || {
        PlannerError::InvalidBand(format!(
            "expected a magnitude range like '22-19', got '{}'",
            range
        ))
    };

    // Skip the first character so a leading sign is not taken as the separator.
    let split_at = trimmed
        .char_indices()
        .skip(1)
        .find(|&(_, c)| c == '-')
        .map(|(i, _)| i)
        .ok_or_else(invalid)?;

    let first = trimmed[..split_at].trim().parse::<f64>().map_err(|_| invalid())?;
    let second = trimmed[split_at + 1..]
        .trim()
        .parse::<f64>()
        .map_err(|_| invalid())?;
    Ok((first, second))
}

fn parse_priority(text: &str, context: &str) -> Result<u32, String> {
    let priority: u32 = text
        .trim()
        .parse()
        .map_err(|_| format!("invalid priority '{}' in '{}'", text.trim(), context))?;
    if priority == 0 {
        return Err(format!("priority must be a positive integer in '{}'", context));
    }
    Ok(priority)
}

impl TryFrom<BandSpec> for MagnitudeBand {
    type Error = PlannerError;

    fn try_from(spec: BandSpec) -> Result<Self, Self::Error> {
        MagnitudeBand::parse(&spec.range, spec.priority)
    }
}

impl From<MagnitudeBand> for BandSpec {
    fn from(band: MagnitudeBand) -> Self {
        BandSpec {
            range: format!("{}-{}", band.hi, band.lo),
            priority: band.priority,
        }
    }
}

/// `"22-19=3"`
impl FromStr for MagnitudeBand {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (range, priority) = s.rsplit_once('=').ok_or_else(|| {
            PlannerError::InvalidBand(format!("expected RANGE=PRIORITY, got '{}'", s))
        })?;
        let priority = parse_priority(priority, s).map_err(PlannerError::InvalidBand)?;
        MagnitudeBand::parse(range, priority)
    }
}

impl fmt::Display for MagnitudeBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}={}", self.hi, self.lo, self.priority)
    }
}

/// Targets whose name contains `pattern` receive `priority`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameOverride {
    pub pattern: String,
    pub priority: u32,
}

impl NameOverride {
    pub fn new(pattern: impl Into<String>, priority: u32) -> PlannerResult<Self> {
        let pattern = pattern.into();
        if pattern.is_empty() {
            return Err(PlannerError::InvalidOverride(
                "override pattern must not be empty".to_string(),
            ));
        }
        if priority == 0 {
            return Err(PlannerError::InvalidOverride(format!(
                "priority for '{}' must be a positive integer",
                pattern
            )));
        }
        Ok(Self { pattern, priority })
    }

    pub fn matches(&self, name: &str) -> bool {
        name.contains(&self.pattern)
    }
}

/// `"81P=1"`
impl FromStr for NameOverride {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (pattern, priority) = s.rsplit_once('=').ok_or_else(|| {
            PlannerError::InvalidOverride(format!("expected NAME=PRIORITY, got '{}'", s))
        })?;
        let priority = parse_priority(priority, s).map_err(PlannerError::InvalidOverride)?;
        NameOverride::new(pattern.trim(), priority)
    }
}

/// The LOOK band table: 22-19 → 3, 19-17 → 4, 17-15 → 5, 15-12 → 6.
pub fn default_bands() -> Vec<MagnitudeBand> {
    [(22.0, 19.0, 3), (19.0, 17.0, 4), (17.0, 15.0, 5), (15.0, 12.0, 6)]
        .into_iter()
        .map(|(a, b, p)| MagnitudeBand { lo: b, hi: a, priority: p })
        .collect()
}

/// Comets always followed at top urgency class 1.
pub fn default_overrides() -> Vec<NameOverride> {
    ["81P", "73P", "UN271"]
        .into_iter()
        .map(|pattern| NameOverride {
            pattern: pattern.to_string(),
            priority: 1,
        })
        .collect()
}

/// Priority of a single target under the given tables.
pub fn priority_for(
    target: &TargetRecord,
    bands: &[MagnitudeBand],
    overrides: &[NameOverride],
) -> u32 {
    let by_band = bands
        .iter()
        .rev()
        .find(|band| band.contains(target.magnitude))
        .map(|band| band.priority);

    overrides
        .iter()
        .rev()
        .find(|o| o.matches(&target.name))
        .map(|o| o.priority)
        .or(by_band)
        .unwrap_or(DEFAULT_PRIORITY)
}

/// Classify targets into a new sequence; the input is left untouched.
pub fn classify(
    targets: &[TargetRecord],
    bands: &[MagnitudeBand],
    overrides: &[NameOverride],
) -> Vec<ClassifiedTarget> {
    targets
        .iter()
        .map(|t| ClassifiedTarget::new(t.clone(), priority_for(t, bands, overrides)))
        .collect()
}
