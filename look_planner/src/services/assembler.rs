//! Observation entry assembly.
//!
//! Combines a classified target with its planned exposure into one
//! [`ObservationEntry`] per requested filter.

use crate::error::PlannerResult;
use crate::models::{ClassifiedTarget, ObservationEntry, PlannedExposure};

/// Scheduler-safe target name: spaces become underscores, slashes are
/// dropped, and the program identifier is appended.
///
/// `"C/2021 A1"` with `"2022S-01"` gives `"C2021_A1_2022S-01"`.
pub fn sanitize_name(name: &str, program_id: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .filter(|&c| c != '/')
        .map(|c| if c == ' ' { '_' } else { c })
        .collect();
    format!("{}_{}", cleaned, program_id)
}

/// Build the entry for one (target, filter) pair.
pub fn assemble(
    target: &ClassifiedTarget,
    planned: &PlannedExposure,
    filter: &str,
    program_id: &str,
) -> PlannerResult<ObservationEntry> {
    let record = &target.target;
    let ra = record.ra.ra_degrees()?;
    let dec = record.dec.dec_degrees()?;

    Ok(ObservationEntry {
        exptime: planned.exptime,
        filter: filter.to_string(),
        repeats: planned.repeats,
        name: sanitize_name(&record.name, program_id),
        ra: ra.value(),
        dec: dec.value(),
        propid: program_id.to_string(),
        priority: target.priority,
        magnitude: record.magnitude,
        rate: record.rate,
    })
}

/// Build entries for every target and filter, in target order then filter order.
///
/// Fails on the first target whose coordinates cannot be read, so a plan is
/// either complete or not produced at all.
pub fn assemble_all<'a, I>(
    planned: I,
    filters: &[String],
    program_id: &str,
) -> PlannerResult<Vec<ObservationEntry>>
where
    I: IntoIterator<Item = (&'a ClassifiedTarget, &'a PlannedExposure)>,
{
    let mut entries = Vec::new();
    for (target, plan) in planned {
        for filter in filters {
            entries.push(assemble(target, plan, filter, program_id)?);
        }
    }
    Ok(entries)
}
