use crate::coordinate::Coordinate;

#[derive(Clone, Debug, PartialEq)]
pub struct RawData {
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp_ms: Option<i64>,
    // horizontal accuracy in meters
    pub accuracy: Option<f32>,
}

impl RawData {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ProcessResult {
    Append,
    Ignore,
}

// Consumer-grade fixes at or above this produce visible jitter on the map.
pub const ACCURACY_THRESHOLD: f32 = 50.0;

pub fn preprocess(accuracy: Option<f32>) -> ProcessResult {
    match accuracy {
        Some(accuracy) if accuracy < ACCURACY_THRESHOLD => ProcessResult::Append,
        // NaN and missing accuracy can't be shown to be under the threshold.
        _ => ProcessResult::Ignore,
    }
}

/// Picks the fix a batch delivery is judged by: the last one delivered.
/// Timestamps are not consulted.
pub fn last_in_batch(raw_data_list: &[RawData]) -> Option<&RawData> {
    raw_data_list.last()
}
