use chrono::{DateTime, Utc};

use crate::coordinate::Coordinate;
use crate::error::Result;
use crate::gps_processor::{self, ProcessResult, RawData};
use crate::location::LocationProvider;

/* One recording session at a time. `track` only ever holds fixes that passed
the accuracy filter, in the order they were delivered. It is emptied by
`start` and left alone by `stop` so the caller can persist it.
*/
pub struct Tracker<P: LocationProvider> {
    provider: P,
    tracking: bool,
    track: Vec<Coordinate>,
    started_at: Option<DateTime<Utc>>,
}

impl<P: LocationProvider> Tracker<P> {
    pub fn new(provider: P) -> Self {
        Tracker {
            provider,
            tracking: false,
            track: Vec::new(),
            started_at: None,
        }
    }

    pub fn request_permission(&mut self) -> Result<()> {
        self.provider.request_permission()
    }

    pub fn start(&mut self) -> Result<()> {
        self.track.clear();
        self.started_at = Some(Utc::now());
        self.tracking = true;
        if let Err(error) = self.provider.start_updates() {
            warn!("[tracker] failed to start location updates: {}", error);
            self.tracking = false;
            return Err(error);
        }
        info!("[tracker] started");
        Ok(())
    }

    pub fn stop(&mut self) {
        self.tracking = false;
        self.provider.stop_updates();
        info!("[tracker] stopped, num_of_points={}", self.track.len());
    }

    pub fn on_sample(&mut self, coordinate: Coordinate, accuracy: f32) -> ProcessResult {
        if !self.tracking {
            return ProcessResult::Ignore;
        }
        let result = gps_processor::preprocess(Some(accuracy));
        match result {
            ProcessResult::Append => self.track.push(coordinate),
            ProcessResult::Ignore => debug!(
                "[tracker] dropping fix ({}, {}), accuracy={}",
                coordinate.latitude, coordinate.longitude, accuracy
            ),
        }
        result
    }

    /// Handles one delivery from the platform. Only the last fix of the
    /// batch is considered, the fixes before it are dropped.
    pub fn on_location_update(&mut self, raw_data_list: &[RawData]) -> ProcessResult {
        if !self.tracking {
            return ProcessResult::Ignore;
        }
        match gps_processor::last_in_batch(raw_data_list) {
            None => ProcessResult::Ignore,
            Some(raw_data) => match raw_data.accuracy {
                Some(accuracy) => self.on_sample(raw_data.coordinate(), accuracy),
                None => {
                    debug!("[tracker] dropping fix without accuracy");
                    ProcessResult::Ignore
                }
            },
        }
    }

    pub fn is_tracking(&self) -> bool {
        self.tracking
    }

    pub fn track(&self) -> &[Coordinate] {
        &self.track
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn last_coordinate(&self) -> Option<Coordinate> {
        self.track.last().copied()
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }
}
