use std::sync::{Mutex, MutexGuard, OnceLock};

use crate::coordinate::Coordinate;
use crate::error::{Error, Result};
use crate::gps_processor::{ProcessResult, RawData};
use crate::location::LocationProvider;
use crate::logs;
use crate::profile::Profile;
use crate::route::Route;
use crate::storage::{RouteObserver, Storage};
use crate::tracker::Tracker;

pub type BoxedLocationProvider = Box<dyn LocationProvider + Send>;

// `tracker` is never held while calling into `storage`, route observers may
// call back into this module.
struct MainState {
    storage: Storage,
    tracker: Mutex<Tracker<BoxedLocationProvider>>,
}

static MAIN_STATE: OnceLock<MainState> = OnceLock::new();

pub fn init(
    support_dir: String,
    cache_dir: String,
    location_provider: BoxedLocationProvider,
) -> anyhow::Result<()> {
    if MAIN_STATE.get().is_some() {
        warn!("`init` is called multiple times");
        return Ok(());
    }

    if let Err(error) = logs::init(&cache_dir) {
        // another logger is already installed, keep using it
        eprintln!("failed to initialize logging: {}", error);
    }

    let storage = Storage::init(&support_dir)?;
    let state = MainState {
        storage,
        tracker: Mutex::new(Tracker::new(location_provider)),
    };
    if MAIN_STATE.set(state).is_err() {
        warn!("`init` is called multiple times");
    } else {
        info!("initialized");
    }
    Ok(())
}

fn get() -> Result<&'static MainState> {
    MAIN_STATE.get().ok_or(Error::NotInitialized)
}

fn tracker(state: &MainState) -> MutexGuard<'_, Tracker<BoxedLocationProvider>> {
    state
        .tracker
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub fn request_location_permission() -> Result<()> {
    tracker(get()?).request_permission()
}

pub fn start_tracking() -> Result<()> {
    tracker(get()?).start()
}

pub fn stop_tracking() -> Result<()> {
    tracker(get()?).stop();
    Ok(())
}

pub fn is_tracking() -> Result<bool> {
    Ok(tracker(get()?).is_tracking())
}

pub fn on_location_update(raw_data_list: Vec<RawData>) -> Result<ProcessResult> {
    Ok(tracker(get()?).on_location_update(&raw_data_list))
}

pub fn current_track() -> Result<Vec<Coordinate>> {
    Ok(tracker(get()?).track().to_vec())
}

/// Saves the track of the last session. The track is left untouched, so a
/// failed save can simply be retried.
pub fn save_route() -> Result<Route> {
    let state = get()?;
    let (track, opened_at) = {
        let tracker = tracker(state);
        (tracker.track().to_vec(), tracker.started_at())
    };
    state
        .storage
        .save_route(&track, opened_at.ok_or(Error::EmptyTrack)?)
}

/// Stops and takes the track under one lock, so no new session can clear it
/// before it is saved.
pub fn stop_tracking_and_save_route() -> Result<Route> {
    let state = get()?;
    let (track, opened_at) = {
        let mut tracker = tracker(state);
        tracker.stop();
        (tracker.track().to_vec(), tracker.started_at())
    };
    state
        .storage
        .save_route(&track, opened_at.ok_or(Error::EmptyTrack)?)
}

pub fn list_routes() -> Result<Vec<Route>> {
    get()?.storage.list_routes()
}

pub fn get_route(id: String) -> Result<Option<Route>> {
    get()?.storage.get_route(&id)
}

pub fn delete_route(id: String) -> Result<bool> {
    get()?.storage.delete_route(&id)
}

pub fn subscribe_route_changes(observer: RouteObserver) -> Result<()> {
    get()?.storage.subscribe(observer);
    Ok(())
}

pub fn get_profile() -> Result<Profile> {
    get()?.storage.load_profile()
}

pub fn set_username(username: String) -> Result<()> {
    get()?.storage.set_username(&username)
}

pub fn set_log_sink(sink: logs::LogSink) {
    logs::set_log_sink(sink)
}
