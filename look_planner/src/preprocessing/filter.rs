use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::TargetRecord;
use crate::parsing::coordinates::leading_degrees;

/// Magnitude window and declination ceiling applied to fetched rows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrefilterConfig {
    /// Rows must be fainter than this (exclusive)
    pub mag_min: f64,
    /// Rows must be brighter than this (exclusive)
    pub mag_max: f64,
    /// Leading integer degrees of Dec must be below this
    pub dec_max: i32,
}

impl Default for PrefilterConfig {
    fn default() -> Self {
        Self {
            mag_min: 12.0,
            mag_max: 22.0,
            dec_max: 15,
        }
    }
}

/// Counts from one prefilter pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefilterStats {
    pub total: usize,
    pub kept: usize,
    pub outside_magnitude: usize,
    pub above_declination: usize,
    pub unreadable_declination: usize,
}

impl PrefilterConfig {
    pub fn magnitude_ok(&self, magnitude: f64) -> bool {
        self.mag_min < magnitude && magnitude < self.mag_max
    }

    /// Keep rows inside the magnitude window and below the declination
    /// ceiling, preserving order.
    pub fn apply(&self, rows: &[TargetRecord]) -> (Vec<TargetRecord>, PrefilterStats) {
        let mut stats = PrefilterStats {
            total: rows.len(),
            ..PrefilterStats::default()
        };

        let kept: Vec<TargetRecord> = rows
            .iter()
            .filter(|row| {
                if !self.magnitude_ok(row.magnitude) {
                    stats.outside_magnitude += 1;
                    return false;
                }
                match leading_degrees(&row.dec) {
                    Some(dec) if dec < self.dec_max => true,
                    Some(_) => {
                        stats.above_declination += 1;
                        false
                    }
                    None => {
                        warn!(target_name = %row.name, dec = %row.dec, "Dropping row with unreadable declination");
                        stats.unreadable_declination += 1;
                        false
                    }
                }
            })
            .cloned()
            .collect();

        stats.kept = kept.len();
        (kept, stats)
    }
}
