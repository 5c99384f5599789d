#![allow(dead_code)]

use gps_records_core::{gps_processor::RawData, location::LocationProvider, Error};
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
pub struct ProviderState {
    pub permission_granted: bool,
    pub hardware_available: bool,
    pub updating: bool,
    pub start_calls: usize,
    pub stop_calls: usize,
}

/// In-memory stand in for the platform location service. Clones share the
/// same state so a test can keep one while the tracker owns another.
#[derive(Clone)]
pub struct FakeLocationProvider {
    pub state: Arc<Mutex<ProviderState>>,
}

impl FakeLocationProvider {
    pub fn granted() -> Self {
        FakeLocationProvider {
            state: Arc::new(Mutex::new(ProviderState {
                permission_granted: true,
                hardware_available: true,
                ..Default::default()
            })),
        }
    }

    pub fn denied() -> Self {
        FakeLocationProvider {
            state: Arc::new(Mutex::new(ProviderState {
                permission_granted: false,
                hardware_available: true,
                ..Default::default()
            })),
        }
    }

    pub fn is_updating(&self) -> bool {
        self.state.lock().unwrap().updating
    }
}

impl LocationProvider for FakeLocationProvider {
    fn request_permission(&mut self) -> Result<(), Error> {
        self.state.lock().unwrap().permission_granted = true;
        Ok(())
    }

    fn start_updates(&mut self) -> Result<(), Error> {
        let mut state = self.state.lock().unwrap();
        state.start_calls += 1;
        if !state.permission_granted {
            return Err(Error::PermissionDenied);
        }
        if !state.hardware_available {
            return Err(Error::LocationUnavailable);
        }
        state.updating = true;
        Ok(())
    }

    fn stop_updates(&mut self) {
        let mut state = self.state.lock().unwrap();
        state.stop_calls += 1;
        state.updating = false;
    }
}

pub fn fix(latitude: f64, longitude: f64, accuracy: f32, timestamp_ms: i64) -> RawData {
    RawData {
        latitude,
        longitude,
        timestamp_ms: Some(timestamp_ms),
        accuracy: Some(accuracy),
    }
}

pub fn sub_folder(temp_dir: &tempdir::TempDir, sub: &str) -> String {
    let path = temp_dir.path().join(sub);
    std::fs::create_dir(&path).unwrap();
    path.into_os_string().into_string().unwrap()
}
