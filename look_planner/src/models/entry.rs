use serde::{Deserialize, Serialize};

/// One exposure request in the written plan.
///
/// Created once per (target, filter) pair and never mutated. Field names are
/// the keys the scheduler submission tooling reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationEntry {
    pub exptime: u32,
    pub filter: String,
    pub repeats: u32,
    pub name: String,
    pub ra: f64,
    pub dec: f64,
    pub propid: String,
    pub priority: u32,
    pub magnitude: f64,
    pub rate: f64,
}

impl ObservationEntry {
    /// Total open-shutter time requested by this entry, in seconds.
    pub fn open_shutter_time(&self) -> u32 {
        self.exptime * self.repeats
    }
}
