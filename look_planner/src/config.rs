//! Planner configuration file support.
//!
//! Every section is optional and defaults to the LOOK conventions, so an
//! empty file is a valid configuration. A typical file:
//!
//! ```toml
//! [source]
//! url = "https://example.org/look/targets.json"
//!
//! [exposure]
//! readout = 40.0
//! budget_policy = "tiered"
//!
//! [[classifier.bands]]
//! range = "19-17"
//! priority = 4
//!
//! [plan]
//! filters = ["R"]
//! proposal_id = "2022S-01"
//! categories = ["active"]
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::algorithms::exposure::ExposureSettings;
use crate::algorithms::photometry::ReferenceStarModel;
use crate::algorithms::priority::{default_bands, default_overrides, MagnitudeBand, NameOverride};
use crate::error::{PlannerError, PlannerResult};
use crate::models::TargetCategory;
use crate::preprocessing::PrefilterConfig;

/// Environment variable naming the configuration file
pub const CONFIG_ENV: &str = "LOOK_PLANNER_CONFIG";

/// Top-level planner configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlannerConfig {
    #[serde(default)]
    pub source: SourceSettings,
    #[serde(default)]
    pub prefilter: PrefilterConfig,
    #[serde(default)]
    pub classifier: ClassifierSettings,
    #[serde(default)]
    pub exposure: ExposureSettings,
    #[serde(default)]
    pub photometry: ReferenceStarModel,
    #[serde(default)]
    pub plan: PlanSettings,
    #[serde(default)]
    pub output: OutputSettings,
}

/// Where the target table comes from. `path` wins over `url` when both are set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceSettings {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Priority tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierSettings {
    #[serde(default = "default_bands")]
    pub bands: Vec<MagnitudeBand>,
    #[serde(default = "default_overrides")]
    pub overrides: Vec<NameOverride>,
}

/// What to request for each target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSettings {
    #[serde(default = "default_filters")]
    pub filters: Vec<String>,
    #[serde(default = "default_proposal_id")]
    pub proposal_id: String,
    #[serde(default = "default_categories")]
    pub categories: Vec<TargetCategory>,
}

/// Where the plan is written: `<root>/<YYYY-MM-DD>/<file_name>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(default = "default_output_root")]
    pub root: PathBuf,
    #[serde(default = "default_file_name")]
    pub file_name: String,
}

/// Per-run values that take precedence over the configuration file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanOverrides {
    pub name_overrides: Vec<NameOverride>,
    pub bands: Vec<MagnitudeBand>,
    pub filters: Vec<String>,
    pub readout: Option<f64>,
    pub proposal_id: Option<String>,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_filters() -> Vec<String> {
    vec!["R".to_string()]
}

fn default_proposal_id() -> String {
    "2022S-01".to_string()
}

fn default_categories() -> Vec<TargetCategory> {
    vec![TargetCategory::Active]
}

fn default_output_root() -> PathBuf {
    PathBuf::from("targets")
}

fn default_file_name() -> String {
    "look.json".to_string()
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            url: None,
            path: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            bands: default_bands(),
            overrides: default_overrides(),
        }
    }
}

impl Default for PlanSettings {
    fn default() -> Self {
        Self {
            filters: default_filters(),
            proposal_id: default_proposal_id(),
            categories: default_categories(),
        }
    }
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            root: default_output_root(),
            file_name: default_file_name(),
        }
    }
}

impl PlannerConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> PlannerResult<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            PlannerError::ConfigurationError(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> PlannerResult<Self> {
        toml::from_str(content).map_err(|e| {
            PlannerError::ConfigurationError(format!("Failed to parse config file: {}", e))
        })
    }

    /// Load configuration from `$LOOK_PLANNER_CONFIG`, or the first file found in:
    /// 1. `look_planner.toml`
    /// 2. `config/look_planner.toml`
    /// 3. `../look_planner.toml`
    ///
    /// Falls back to defaults when no file exists. A file named by the
    /// environment variable must exist.
    pub fn from_default_location() -> PlannerResult<Self> {
        if let Ok(path) = env::var(CONFIG_ENV) {
            return Self::from_file(path);
        }

        let search_paths = [
            PathBuf::from("look_planner.toml"),
            PathBuf::from("config/look_planner.toml"),
            PathBuf::from("../look_planner.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Apply overrides from environment variables.
    ///
    /// # Environment Variables
    /// - `LOOK_SOURCE_URL`: target table URL
    /// - `LOOK_SOURCE_PATH`: local target table snapshot
    /// - `LOOK_OUTPUT_ROOT`: directory receiving dated plan folders
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = env::var("LOOK_SOURCE_URL") {
            self.source.url = Some(url);
        }
        if let Ok(path) = env::var("LOOK_SOURCE_PATH") {
            self.source.path = Some(PathBuf::from(path));
        }
        if let Ok(root) = env::var("LOOK_OUTPUT_ROOT") {
            self.output.root = PathBuf::from(root);
        }
    }

    /// Replace configured values with those given on the command line.
    ///
    /// A non-empty list replaces the configured list as a whole; later entries
    /// still win within it. Unset scalars keep the configured value.
    pub fn apply_plan_overrides(&mut self, overrides: PlanOverrides) {
        if !overrides.name_overrides.is_empty() {
            self.classifier.overrides = overrides.name_overrides;
        }
        if !overrides.bands.is_empty() {
            self.classifier.bands = overrides.bands;
        }
        if !overrides.filters.is_empty() {
            self.plan.filters = overrides.filters;
        }
        if let Some(readout) = overrides.readout {
            self.exposure.readout = readout;
        }
        if let Some(proposal_id) = overrides.proposal_id {
            self.plan.proposal_id = proposal_id;
        }
    }

    /// Check values the planner cannot work with.
    pub fn validate(&self) -> PlannerResult<()> {
        let invalid =
            |msg: String| -> PlannerResult<()> { Err(PlannerError::ConfigurationError(msg)) };

        let exposure = &self.exposure;
        if !(exposure.readout.is_finite() && exposure.readout >= 0.0) {
            return invalid(format!(
                "readout must be a non-negative number of seconds, got {}",
                exposure.readout
            ));
        }
        if !(exposure.pixel_scale.is_finite() && exposure.pixel_scale > 0.0) {
            return invalid(format!(
                "pixel_scale must be positive, got {}",
                exposure.pixel_scale
            ));
        }
        if !(exposure.aperture_radius.is_finite() && exposure.aperture_radius > 0.0) {
            return invalid(format!(
                "aperture_radius must be positive, got {}",
                exposure.aperture_radius
            ));
        }
        if !(exposure.tracking_limit.is_finite() && exposure.tracking_limit > 0.0) {
            return invalid(format!(
                "tracking_limit must be positive, got {}",
                exposure.tracking_limit
            ));
        }

        if self.plan.filters.is_empty() {
            return invalid("at least one filter is required".to_string());
        }
        if self.plan.filters.iter().any(|f| f.trim().is_empty()) {
            return invalid("filter names must not be empty".to_string());
        }
        if self.plan.proposal_id.trim().is_empty() {
            return invalid("proposal_id must not be empty".to_string());
        }
        if self.plan.categories.is_empty() {
            return invalid("at least one target category is required".to_string());
        }
        for (i, category) in self.plan.categories.iter().enumerate() {
            if self.plan.categories[..i].contains(category) {
                return invalid(format!("target category '{}' is listed twice", category));
            }
        }

        if let Some(o) = self.classifier.overrides.iter().find(|o| o.priority == 0) {
            return invalid(format!(
                "override '{}' must have a positive priority",
                o.pattern
            ));
        }
        if let Some(o) = self.classifier.overrides.iter().find(|o| o.pattern.is_empty()) {
            return invalid(format!(
                "override with priority {} has an empty pattern",
                o.priority
            ));
        }

        if self.prefilter.mag_min >= self.prefilter.mag_max {
            return invalid(format!(
                "prefilter mag_min ({}) must be below mag_max ({})",
                self.prefilter.mag_min, self.prefilter.mag_max
            ));
        }

        if self.output.file_name.trim().is_empty() {
            return invalid("output file_name must not be empty".to_string());
        }

        Ok(())
    }
}
