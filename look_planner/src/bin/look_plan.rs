//! LOOK plan generator
//!
//! Fetches the LOOK target tables, plans exposures and writes today's plan to
//! `<output root>/<YYYY-MM-DD>/<file name>`.
//!
//! # Usage
//!
//! ```bash
//! # Use look_planner.toml from the working directory
//! look-plan
//!
//! # Bump a comet to top priority and plan two filters
//! look-plan --override "C/2022 E3=1" --filter g --filter r
//!
//! # Plan from a local snapshot
//! LOOK_SOURCE_PATH=demos/look_targets.json look-plan
//! ```
//!
//! # Environment Variables
//!
//! - `LOOK_PLANNER_CONFIG`: Path to the TOML configuration file
//! - `LOOK_SOURCE_URL`: Target table URL
//! - `LOOK_SOURCE_PATH`: Local target table snapshot (wins over the URL)
//! - `LOOK_OUTPUT_ROOT`: Root directory for dated plans
//! - `RUST_LOG`: Log level (default: info)

use std::env;

use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use look_planner::algorithms::{MagnitudeBand, NameOverride};
use look_planner::config::{PlanOverrides, PlannerConfig};
use look_planner::io::{source_from_settings, today, PlanWriter};
use look_planner::services::LookPlanPipeline;

#[derive(Parser, Debug)]
#[command(name = "look-plan")]
#[command(about = "Generate the nightly LOOK observing plan", long_about = None)]
struct Args {
    /// Name override as SUBSTRING=PRIORITY; repeatable, later ones win.
    /// Replaces the configured overrides.
    #[arg(long = "override", value_name = "SUBSTR=PRIORITY")]
    overrides: Vec<NameOverride>,

    /// Magnitude band as HI-LO=PRIORITY; repeatable, later ones win.
    /// Replaces the configured bands.
    #[arg(long = "band", value_name = "HI-LO=PRIORITY")]
    bands: Vec<MagnitudeBand>,

    /// Filter to plan; repeatable. Replaces the configured filters.
    #[arg(long = "filter")]
    filters: Vec<String>,

    /// Readout dead time per exposure, in seconds
    #[arg(long)]
    readout: Option<f64>,

    /// Proposal identifier recorded on every entry
    #[arg(long)]
    proposal: Option<String>,
}

impl Args {
    fn into_overrides(self) -> PlanOverrides {
        PlanOverrides {
            name_overrides: self.overrides,
            bands: self.bands,
            filters: self.filters,
            readout: self.readout,
            proposal_id: self.proposal,
        }
    }
}

fn load_config(args: Args) -> anyhow::Result<PlannerConfig> {
    let mut config = PlannerConfig::from_default_location()?;
    config.apply_env_overrides();
    config.apply_plan_overrides(args.into_overrides());
    config.validate()?;
    Ok(config)
}

async fn run(args: Args) -> anyhow::Result<()> {
    let config = load_config(args)?;
    let source = source_from_settings(&config.source)?;
    let writer = PlanWriter::from_settings(&config.output);
    let pipeline = LookPlanPipeline::from_config(config)?;

    let run = pipeline.run(source.as_ref(), &writer, today()).await?;
    info!(
        "Plan written to {} ({} entries, sha256 {})",
        run.receipt.path.display(),
        run.receipt.entries,
        run.receipt.checksum
    );
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .init();

    run(Args::parse()).await
}
