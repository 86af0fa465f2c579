//! End-to-end plan generation against on-disk target snapshots.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use tempfile::TempDir;

use look_planner::algorithms::{FixedExposure, MagnitudeBand};
use look_planner::io::{calculate_checksum, FileTargetSource, PlanWriter};
use look_planner::models::{ObservationEntry, TargetCategory};
use look_planner::services::LookPlanPipeline;
use look_planner::{PlannerConfig, PlannerError};

const SNAPSHOT: &str = r#"{
    "active": [
        {"Target Name": "C/2021 A1", "R.A.": "10 30 00", "Dec.": "-15 30 00",
         "V Mag.": 18.5, "Rate (\"/min)": 2.0},
        {"Target Name": "29P", "R.A.": "05 12 33", "Dec.": "+27 05 11",
         "V Mag.": 16.4, "Rate (\"/min)": 0.12},
        {"Target Name": "P/2010 H2", "R.A.": "22 00 00", "Dec.": "-05 00 00",
         "V Mag.": 23.1, "Rate (\"/min)": 0.8}
    ],
    "new": [
        {"Target Name": "2022 QE78", "R.A.": "01 00 00", "Dec.": "-30 00 00",
         "V Mag.": "20.2", "Rate (\"/min)": "1.0"}
    ]
}"#;

fn write_snapshot(dir: &Path, content: &str) -> FileTargetSource {
    let path = dir.join("look_targets.json");
    fs::write(&path, content).unwrap();
    FileTargetSource::new(path)
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2022, 9, 14).unwrap()
}

fn config() -> PlannerConfig {
    let mut config = PlannerConfig::default();
    config.classifier.bands = vec![MagnitudeBand::parse("19-17", 4).unwrap()];
    config.classifier.overrides = Vec::new();
    config.plan.filters = vec!["R".to_string()];
    config.exposure.readout = 40.0;
    config
}

#[tokio::test]
async fn test_single_target_plan() {
    let dir = TempDir::new().unwrap();
    let source = write_snapshot(dir.path(), SNAPSHOT);
    let writer = PlanWriter::new(dir.path().join("targets"), "look.json");

    let pipeline = LookPlanPipeline::with_estimator(config(), FixedExposure(50.0)).unwrap();
    let run = pipeline.run(&source, &writer, date()).await.unwrap();

    // 29P is above the declination ceiling and P/2010 H2 too faint
    assert_eq!(run.receipt.entries, 1);
    assert_eq!(
        run.receipt.path,
        dir.path().join("targets").join("2022-09-14").join("look.json")
    );

    let content = fs::read_to_string(&run.receipt.path).unwrap();
    let entries: Vec<ObservationEntry> = serde_json::from_str(&content).unwrap();
    let entry = &entries[0];
    assert_eq!(entry.name, "C2021_A1_2022S-01");
    assert_eq!(entry.exptime, 60);
    assert_eq!(entry.repeats, 18);
    assert_eq!(entry.priority, 4);
    assert_eq!(entry.filter, "R");
    assert_eq!(entry.propid, "2022S-01");
    assert!((entry.ra - 157.5).abs() < 1e-9);
    assert!((entry.dec + 15.5).abs() < 1e-9);
}

#[tokio::test]
async fn test_written_file_has_scheduler_keys() {
    let dir = TempDir::new().unwrap();
    let source = write_snapshot(dir.path(), SNAPSHOT);
    let writer = PlanWriter::new(dir.path().join("targets"), "look.json");

    let pipeline = LookPlanPipeline::with_estimator(config(), FixedExposure(50.0)).unwrap();
    let run = pipeline.run(&source, &writer, date()).await.unwrap();

    let content = fs::read_to_string(&run.receipt.path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&content).unwrap();
    let object = value[0].as_object().unwrap();
    for key in [
        "exptime", "filter", "repeats", "name", "ra", "dec", "propid", "priority",
    ] {
        assert!(object.contains_key(key), "missing key {}", key);
    }
}

#[tokio::test]
async fn test_rerun_is_byte_identical() {
    let dir = TempDir::new().unwrap();
    let source = write_snapshot(dir.path(), SNAPSHOT);
    let writer = PlanWriter::new(dir.path().join("targets"), "look.json");
    let pipeline = LookPlanPipeline::with_estimator(config(), FixedExposure(50.0)).unwrap();

    let first = pipeline.run(&source, &writer, date()).await.unwrap();
    let first_bytes = fs::read(&first.receipt.path).unwrap();
    let second = pipeline.run(&source, &writer, date()).await.unwrap();
    let second_bytes = fs::read(&second.receipt.path).unwrap();

    assert_eq!(first_bytes, second_bytes);
    assert_eq!(first.receipt.checksum, second.receipt.checksum);
    assert_eq!(
        first.receipt.checksum,
        calculate_checksum(&String::from_utf8(first_bytes).unwrap())
    );
}

#[tokio::test]
async fn test_categories_and_filters_multiply() {
    let dir = TempDir::new().unwrap();
    let source = write_snapshot(dir.path(), SNAPSHOT);
    let writer = PlanWriter::new(dir.path().join("targets"), "look.json");

    let mut config = config();
    config.plan.categories = vec![TargetCategory::Active, TargetCategory::New];
    config.plan.filters = vec!["g".to_string(), "r".to_string()];
    let pipeline = LookPlanPipeline::with_estimator(config, FixedExposure(50.0)).unwrap();

    let run = pipeline.run(&source, &writer, date()).await.unwrap();
    let entries = &run.outcome.entries;

    assert_eq!(entries.len(), 4);
    let order: Vec<(&str, &str)> = entries
        .iter()
        .map(|e| (e.name.as_str(), e.filter.as_str()))
        .collect();
    assert_eq!(
        order,
        vec![
            ("C2021_A1_2022S-01", "g"),
            ("C2021_A1_2022S-01", "r"),
            ("2022_QE78_2022S-01", "g"),
            ("2022_QE78_2022S-01", "r"),
        ]
    );
    // 20.2 is outside the only band, so the default priority applies
    assert_eq!(entries[2].priority, 3);
}

#[tokio::test]
async fn test_missing_source_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let source = FileTargetSource::new(dir.path().join("absent.json"));
    let output = dir.path().join("targets");
    let writer = PlanWriter::new(&output, "look.json");

    let pipeline = LookPlanPipeline::with_estimator(config(), FixedExposure(50.0)).unwrap();
    let result = pipeline.run(&source, &writer, date()).await;

    assert!(matches!(result, Err(PlannerError::SourceUnavailable(_))));
    assert!(!output.exists());
}

#[tokio::test]
async fn test_corrupt_source_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let source = write_snapshot(dir.path(), r#"{"active": [{"Target Name": 7}]}"#);
    let output = dir.path().join("targets");
    let writer = PlanWriter::new(&output, "look.json");

    let pipeline = LookPlanPipeline::with_estimator(config(), FixedExposure(50.0)).unwrap();
    let result = pipeline.run(&source, &writer, date()).await;

    assert!(matches!(result, Err(PlannerError::SourceUnavailable(_))));
    assert!(!output.exists());
}

#[tokio::test]
async fn test_plan_from_toml_config() {
    let dir = TempDir::new().unwrap();
    let source = write_snapshot(dir.path(), SNAPSHOT);
    let toml = format!(
        r#"
[source]
path = "{source}"

[exposure]
readout = 40.0
budget_policy = "top-priority"

[classifier]
bands = [{{ range = "19-17", priority = 4 }}]
overrides = [{{ pattern = "A1", priority = 1 }}]

[output]
root = "{root}"
"#,
        source = source.path().display(),
        root = dir.path().join("out").display()
    );
    let config = PlannerConfig::from_toml_str(&toml).unwrap();
    let writer = PlanWriter::from_settings(&config.output);

    let pipeline = LookPlanPipeline::with_estimator(config, FixedExposure(50.0)).unwrap();
    let run = pipeline.run(&source, &writer, date()).await.unwrap();

    let entry = &run.outcome.entries[0];
    assert_eq!(entry.priority, 1);
    // top-priority policy: 1800 s over 100 s cycles
    assert_eq!(entry.repeats, 18);
    assert!(run.receipt.path.starts_with(dir.path().join("out")));
}

#[tokio::test]
async fn test_demo_configuration_plans_demo_snapshot() {
    let demos = Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("demos");
    let mut config = PlannerConfig::from_file(demos.join("look_planner.toml")).unwrap();
    // The sample file spells out the defaults
    let expected = PlannerConfig {
        source: config.source.clone(),
        ..PlannerConfig::default()
    };
    assert_eq!(config, expected);

    let dir = TempDir::new().unwrap();
    config.output.root = dir.path().to_path_buf();
    let source = FileTargetSource::new(demos.join("look_targets.json"));
    let writer = PlanWriter::from_settings(&config.output);

    let pipeline = LookPlanPipeline::from_config(config).unwrap();
    let run = pipeline.run(&source, &writer, date()).await.unwrap();

    let names: Vec<&str> = run.outcome.entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["C2021_A1_2022S-01", "81PWild_2022S-01", "C2017_K2_2022S-01"]
    );
    assert_eq!(run.outcome.entries[1].priority, 1);
    assert!((run.outcome.entries[2].ra - 245.1).abs() < 1e-9);
}
