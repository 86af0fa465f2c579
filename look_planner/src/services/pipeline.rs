//! End-to-end plan generation.
//!
//! fetch → prefilter → classify → plan exposures → assemble entries → write.
//! The target source is fetched once and the plan file is written once, at
//! the end; if anything before the write fails, nothing is written.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::algorithms::exposure::ExposurePlanner;
use crate::algorithms::photometry::{ExposureEstimator, ReferenceStarModel};
use crate::algorithms::priority::classify;
use crate::config::PlannerConfig;
use crate::error::PlannerResult;
use crate::io::source::{source_from_settings, TargetSource};
use crate::io::writer::{today, PlanReceipt, PlanWriter};
use crate::models::{
    ClassifiedTarget, ObservationEntry, PlanDiagnostic, PlannedExposure, TargetCatalog,
    TargetCategory,
};
use crate::preprocessing::PrefilterStats;
use crate::services::assembler::assemble_all;

/// A classified target together with its planned exposure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedTarget {
    pub category: TargetCategory,
    pub target: ClassifiedTarget,
    pub exposure: PlannedExposure,
}

/// Everything produced from one catalog, before anything is written.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanOutcome {
    pub targets: Vec<PlannedTarget>,
    pub entries: Vec<ObservationEntry>,
    pub prefilter: Vec<(TargetCategory, PrefilterStats)>,
}

impl PlanOutcome {
    /// Targets whose exposure was clamped by rate or tracking.
    pub fn rescaled_targets(&self) -> usize {
        self.targets
            .iter()
            .filter(|t| t.exposure.was_rescaled())
            .count()
    }

    /// Total open-shutter time requested, in seconds.
    pub fn requested_seconds(&self) -> u64 {
        self.entries
            .iter()
            .map(|e| e.open_shutter_time() as u64)
            .sum()
    }
}

/// Result of a full run.
#[derive(Debug, Clone)]
pub struct PlanRun {
    pub outcome: PlanOutcome,
    pub receipt: PlanReceipt,
}

/// Plan generation pipeline.
pub struct LookPlanPipeline<E = ReferenceStarModel> {
    config: PlannerConfig,
    planner: ExposurePlanner<E>,
}

impl LookPlanPipeline<ReferenceStarModel> {
    /// Pipeline using the configured photometric model.
    pub fn from_config(config: PlannerConfig) -> PlannerResult<Self> {
        let estimator = config.photometry;
        Self::with_estimator(config, estimator)
    }
}

impl<E: ExposureEstimator> LookPlanPipeline<E> {
    pub fn with_estimator(config: PlannerConfig, estimator: E) -> PlannerResult<Self> {
        config.validate()?;
        let planner = ExposurePlanner::new(config.exposure, estimator);
        Ok(Self { config, planner })
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Classify, plan and assemble every selected category of `catalog`.
    ///
    /// Pure with respect to its input: the same catalog always yields the
    /// same outcome.
    pub fn build_plan(&self, catalog: &TargetCatalog) -> PlannerResult<PlanOutcome> {
        let classifier = &self.config.classifier;
        let mut targets = Vec::new();
        let mut prefilter = Vec::new();

        for &category in &self.config.plan.categories {
            let (rows, stats) = self.config.prefilter.apply(catalog.category(category));
            info!(
                category = %category,
                total = stats.total,
                kept = stats.kept,
                outside_magnitude = stats.outside_magnitude,
                above_declination = stats.above_declination,
                "Prefiltered targets"
            );
            prefilter.push((category, stats));

            for target in classify(&rows, &classifier.bands, &classifier.overrides) {
                let exposure = self.planner.plan(&target);
                log_plan(&target, &exposure);
                targets.push(PlannedTarget {
                    category,
                    target,
                    exposure,
                });
            }
        }

        let entries = assemble_all(
            targets.iter().map(|t| (&t.target, &t.exposure)),
            &self.config.plan.filters,
            &self.config.plan.proposal_id,
        )?;

        Ok(PlanOutcome {
            targets,
            entries,
            prefilter,
        })
    }

    /// Fetch once, build the plan, write it once.
    pub async fn run(
        &self,
        source: &dyn TargetSource,
        writer: &PlanWriter,
        date: NaiveDate,
    ) -> PlannerResult<PlanRun> {
        info!(source = %source.describe(), date = %date, "Generating LOOK plan");
        let catalog = source.fetch().await?;

        let outcome = self.build_plan(&catalog)?;
        let receipt = writer.write(&outcome.entries, date)?;

        info!(
            targets = outcome.targets.len(),
            entries = outcome.entries.len(),
            rescaled = outcome.rescaled_targets(),
            requested_seconds = outcome.requested_seconds(),
            "Made LOOK target list for {}",
            date
        );
        Ok(PlanRun { outcome, receipt })
    }
}

fn log_plan(target: &ClassifiedTarget, exposure: &PlannedExposure) {
    for diagnostic in &exposure.diagnostics {
        match diagnostic {
            PlanDiagnostic::UnboundedRate { .. } => {
                debug!(target_name = %target.name(), "{}", diagnostic)
            }
            _ => warn!(target_name = %target.name(), "{}", diagnostic),
        }
    }
    debug!(
        target_name = %target.name(),
        priority = target.priority,
        magnitude = target.target.magnitude,
        rate = target.target.rate,
        exptime = exposure.exptime,
        repeats = exposure.repeats,
        budget = exposure.budget,
        "Planned target"
    );
}

/// Generate today's plan from configuration: the configured source, the
/// configured output root, today's UTC date.
pub async fn generate_todays_plan(config: PlannerConfig) -> PlannerResult<PlanRun> {
    let source = source_from_settings(&config.source)?;
    let writer = PlanWriter::from_settings(&config.output);
    let pipeline = LookPlanPipeline::from_config(config)?;
    pipeline.run(source.as_ref(), &writer, today()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::photometry::FixedExposure;
    use crate::error::PlannerError;
    use crate::io::source::{FileTargetSource, StaticTargetSource};
    use crate::models::{CoordinateValue, TargetRecord};
    use tempfile::TempDir;

    fn record(name: &str, magnitude: f64, rate: f64, dec: &str) -> TargetRecord {
        TargetRecord {
            name: name.to_string(),
            ra: CoordinateValue::Sexagesimal("10 30 00".to_string()),
            dec: CoordinateValue::Sexagesimal(dec.to_string()),
            magnitude,
            rate,
        }
    }

    fn catalog() -> TargetCatalog {
        TargetCatalog {
            active: vec![
                record("C/2021 A1", 18.5, 2.0, "-15 30 00"),
                record("81P/Wild", 16.0, 0.5, "+05 00 00"),
                record("too north", 18.0, 1.0, "+40 00 00"),
            ],
            new: vec![record("2022 AB", 20.0, 1.0, "-20 00 00")],
        }
    }

    fn pipeline(config: PlannerConfig) -> LookPlanPipeline<FixedExposure> {
        LookPlanPipeline::with_estimator(config, FixedExposure(50.0)).unwrap()
    }

    #[test]
    fn test_build_plan_active_only_by_default() {
        let outcome = pipeline(PlannerConfig::default())
            .build_plan(&catalog())
            .unwrap();

        let names: Vec<&str> = outcome.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["C2021_A1_2022S-01", "81PWild_2022S-01"]);
        assert_eq!(outcome.prefilter.len(), 1);
        assert_eq!(outcome.prefilter[0].1.above_declination, 1);
    }

    #[test]
    fn test_build_plan_band_and_override_priorities() {
        let outcome = pipeline(PlannerConfig::default())
            .build_plan(&catalog())
            .unwrap();

        let first = &outcome.entries[0];
        assert_eq!(first.priority, 4);
        assert_eq!(first.exptime, 60);
        assert_eq!(first.repeats, 18);

        // 81P is overridden to 1, which the tiered policy gives 300 s
        let second = &outcome.entries[1];
        assert_eq!(second.priority, 1);
        assert_eq!(second.repeats, 3);
    }

    #[test]
    fn test_build_plan_with_new_category() {
        let mut config = PlannerConfig::default();
        config.plan.categories = vec![TargetCategory::Active, TargetCategory::New];

        let outcome = pipeline(config).build_plan(&catalog()).unwrap();
        assert_eq!(outcome.entries.len(), 3);
        assert_eq!(outcome.targets[2].category, TargetCategory::New);
        assert_eq!(outcome.entries[2].name, "2022_AB_2022S-01");
    }

    #[test]
    fn test_build_plan_one_entry_per_filter() {
        let mut config = PlannerConfig::default();
        config.plan.filters = vec!["g".to_string(), "r".to_string(), "i".to_string()];

        let outcome = pipeline(config).build_plan(&catalog()).unwrap();
        assert_eq!(outcome.entries.len(), 6);
        assert_eq!(outcome.targets.len(), 2);
    }

    #[test]
    fn test_build_plan_is_idempotent() {
        let pipeline = pipeline(PlannerConfig::default());
        let first = pipeline.build_plan(&catalog()).unwrap();
        let second = pipeline.build_plan(&catalog()).unwrap();
        assert_eq!(
            serde_json::to_string(&first.entries).unwrap(),
            serde_json::to_string(&second.entries).unwrap()
        );
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = PlannerConfig::default();
        config.plan.filters.clear();
        assert!(LookPlanPipeline::from_config(config).is_err());
    }

    #[tokio::test]
    async fn test_run_writes_once() {
        let dir = TempDir::new().unwrap();
        let writer = PlanWriter::new(dir.path(), "look.json");
        let source = StaticTargetSource::new(catalog());
        let date = NaiveDate::from_ymd_opt(2022, 9, 14).unwrap();

        let run = pipeline(PlannerConfig::default())
            .run(&source, &writer, date)
            .await
            .unwrap();

        assert_eq!(run.receipt.entries, 2);
        assert!(run.receipt.path.exists());
        assert_eq!(run.outcome.requested_seconds(), 60 * 18 + 60 * 3);
    }

    #[tokio::test]
    async fn test_run_source_failure_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let writer = PlanWriter::new(dir.path().join("targets"), "look.json");
        let source = FileTargetSource::new(dir.path().join("missing.json"));
        let date = NaiveDate::from_ymd_opt(2022, 9, 14).unwrap();

        let result = pipeline(PlannerConfig::default())
            .run(&source, &writer, date)
            .await;

        assert!(matches!(result, Err(PlannerError::SourceUnavailable(_))));
        assert!(!dir.path().join("targets").exists());
    }

    #[tokio::test]
    async fn test_run_bad_coordinate_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let writer = PlanWriter::new(dir.path().join("targets"), "look.json");
        let mut bad = catalog();
        bad.active[0].ra = CoordinateValue::Sexagesimal("xx yy zz".to_string());
        let source = StaticTargetSource::new(bad);
        let date = NaiveDate::from_ymd_opt(2022, 9, 14).unwrap();

        let result = pipeline(PlannerConfig::default())
            .run(&source, &writer, date)
            .await;

        assert!(matches!(result, Err(PlannerError::InvalidCoordinate(_))));
        assert!(!dir.path().join("targets").exists());
    }
}
