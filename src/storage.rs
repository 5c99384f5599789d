use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::coordinate::Coordinate;
use crate::error::{Error, Result};
use crate::main_db::MainDb;
use crate::profile::Profile;
use crate::route::Route;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RouteChange {
    Saved(String),
    Deleted(String),
}

pub type RouteObserver = Arc<dyn Fn(&RouteChange) + Send + Sync>;

/* The route store. Every write goes through a single `MainDb` transaction,
so a failed save leaves nothing behind. Observers are notified only after
the transaction committed.
*/
pub struct Storage {
    main_db: Mutex<MainDb>,
    observers: Mutex<Vec<RouteObserver>>,
}

impl Storage {
    pub fn init(support_dir: &str) -> anyhow::Result<Self> {
        let main_db = MainDb::open(support_dir)?;
        Ok(Storage {
            main_db: Mutex::new(main_db),
            observers: Mutex::new(Vec::new()),
        })
    }

    fn main_db(&self) -> MutexGuard<'_, MainDb> {
        // the connection stays usable after a panicking holder
        self.main_db
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn notify(&self, change: RouteChange) {
        // called on a snapshot, observers may subscribe from inside a callback
        let observers: Vec<RouteObserver> = self
            .observers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();
        for observer in observers {
            observer(&change);
        }
    }

    pub fn subscribe(&self, observer: RouteObserver) {
        self.observers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(observer);
    }

    pub fn save_route(&self, track: &[Coordinate], opened_at: DateTime<Utc>) -> Result<Route> {
        self.save_route_with_end_time(track, opened_at, Utc::now())
    }

    pub fn save_route_with_end_time(
        &self,
        track: &[Coordinate],
        opened_at: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Result<Route> {
        if track.is_empty() {
            return Err(Error::EmptyTrack);
        }
        let route = self
            .main_db()
            .with_txn(|txn| txn.create_and_insert_route(track, opened_at, end_time))
            .map_err(|error| {
                warn!("[storage] failed to save route: {:#}", error);
                Error::StoreWrite(error)
            })?
            .ok_or(Error::EmptyTrack)?;
        self.notify(RouteChange::Saved(route.id.clone()));
        Ok(route)
    }

    pub fn list_routes(&self) -> Result<Vec<Route>> {
        self.main_db()
            .with_txn(|txn| txn.list_routes())
            .map_err(Error::StoreRead)
    }

    pub fn get_route(&self, id: &str) -> Result<Option<Route>> {
        self.main_db()
            .with_txn(|txn| txn.get_route(id))
            .map_err(Error::StoreRead)
    }

    // Deleting an unknown id is not an error, it just reports `false`.
    pub fn delete_route(&self, id: &str) -> Result<bool> {
        let deleted = self
            .main_db()
            .with_txn(|txn| txn.delete_route(id))
            .map_err(Error::StoreWrite)?;
        if deleted {
            self.notify(RouteChange::Deleted(id.to_string()));
        }
        Ok(deleted)
    }

    pub fn load_profile(&self) -> Result<Profile> {
        Profile::load(&mut self.main_db()).map_err(Error::StoreRead)
    }

    pub fn set_username(&self, username: &str) -> Result<()> {
        Profile::set_username(&mut self.main_db(), username).map_err(Error::StoreWrite)
    }

    pub fn flush(&self) -> Result<()> {
        debug!("[storage] flushing");
        self.main_db().flush().map_err(Error::StoreWrite)
    }
}
