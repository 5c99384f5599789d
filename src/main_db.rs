use anyhow::Result;
use chrono::{DateTime, SubsecRound, Utc};
use rusqlite::{Connection, OptionalExtension, Row, Transaction};
use std::cmp::Ordering;
use std::error::Error;
use std::path::Path;
use std::str::FromStr;
use strum_macros::EnumIter;
use uuid::Uuid;

use crate::coordinate::Coordinate;
use crate::route::Route;
use crate::route_data;
use crate::utils;

/* The main database. `route` keeps every saved route: a few indexed columns
for listing and the coordinate arrays as one compressed blob (see
`route_data`). Routes are write-once, there is no update path.

`setting` is a small key value table for user preferences such as the
profile name.
*/

#[allow(clippy::type_complexity)]
fn open_db_and_run_migration(
    support_dir: &str,
    file_name: &str,
    migrations: &[&dyn Fn(&Transaction) -> Result<()>],
) -> Result<Connection> {
    debug!("open and run migration for {}", file_name);
    let mut conn = Connection::open(Path::new(support_dir).join(file_name))?;
    let tx = conn.transaction()?;

    let version = utils::db::init_metadata_and_get_version(&tx)? as usize;
    let target_version = migrations.len();
    debug!(
        "current version = {}, target_version = {}",
        version, target_version
    );
    match version.cmp(&target_version) {
        Ordering::Equal => (),
        Ordering::Less => {
            for (i, f) in migrations.iter().enumerate().skip(version) {
                info!("running migration for version: {}", i + 1);
                f(&tx)?;
            }
            utils::db::set_version_in_metadata(&tx, target_version as i32)?;
        }
        Ordering::Greater => {
            bail!(
                "version too high: current version = {}, target_version = {}",
                version,
                target_version
            );
        }
    }
    tx.commit()?;
    Ok(conn)
}

pub struct Txn<'a> {
    db_txn: rusqlite::Transaction<'a>,
}

fn route_of_row(row: &Row) -> Result<Route> {
    let id: String = row.get(0)?;
    let start_time = utils::timestamp_ms_to_datetime(row.get(1)?)?;
    let end_time = match row.get::<_, Option<i64>>(2)? {
        None => None,
        Some(end_time) => Some(utils::timestamp_ms_to_datetime(end_time)?),
    };
    let data = row.get_ref(3)?.as_blob()?;
    let (latitudes, longitudes) = route_data::deserialize_route_data(data)?;
    Route::new(id, start_time, end_time, latitudes, longitudes)
}

impl Txn<'_> {
    pub fn insert_route(&mut self, route: &Route) -> Result<()> {
        let mut data_bytes = Vec::new();
        route_data::serialize_route_data(route.latitudes(), route.longitudes(), &mut data_bytes)?;

        let sql = "INSERT INTO route (id, start_time, end_time, num_of_points, data) VALUES (?1, ?2, ?3, ?4, ?5);";
        self.db_txn.execute(
            sql,
            (
                &route.id,
                route.start_time.timestamp_millis(),
                route.end_time.map(|x| x.timestamp_millis()),
                route.num_of_points() as i64,
                data_bytes,
            ),
        )?;
        info!(
            "Route inserted: id={}, num_of_points={}",
            route.id,
            route.num_of_points()
        );
        Ok(())
    }

    // Returns `None` for an empty track, no route is created in that case.
    pub fn create_and_insert_route(
        &mut self,
        track: &[Coordinate],
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Result<Option<Route>> {
        if track.is_empty() {
            info!("Skip creating route for an empty track");
            return Ok(None);
        }
        // only millisecond precision survives a round trip through the db
        let route = Route::of_track(
            Uuid::new_v4().as_hyphenated().to_string(),
            start_time.trunc_subsecs(3),
            Some(end_time.trunc_subsecs(3)),
            track,
        );
        self.insert_route(&route)?;
        Ok(Some(route))
    }

    // Returns whether a route was actually removed.
    pub fn delete_route(&mut self, id: &str) -> Result<bool> {
        let changes = self
            .db_txn
            .execute("DELETE FROM route WHERE id = ?1;", (id,))?;
        info!("Deleting route: id={}, found={}", id, changes > 0);
        Ok(changes > 0)
    }

    pub fn list_routes(&self) -> Result<Vec<Route>> {
        let mut query = self.db_txn.prepare(
            // use `id` to break tie
            "SELECT id, start_time, end_time, data FROM route ORDER BY start_time DESC, id;",
        )?;
        let mut rows = query.query(())?;
        let mut results = Vec::new();
        while let Some(row) = rows.next()? {
            results.push(route_of_row(row)?);
        }
        Ok(results)
    }

    pub fn get_route(&self, id: &str) -> Result<Option<Route>> {
        let mut query = self
            .db_txn
            .prepare("SELECT id, start_time, end_time, data FROM route WHERE id = ?1;")?;
        query
            .query_row([id], |row| Ok(route_of_row(row)))
            .optional()?
            .transpose()
    }

    pub fn count_routes(&self) -> Result<usize> {
        let count: i64 = self
            .db_txn
            .query_row("SELECT COUNT(*) FROM route;", (), |row| row.get(0))?;
        Ok(count as usize)
    }
}

pub struct MainDb {
    conn: Connection,
}

impl MainDb {
    pub fn open(support_dir: &str) -> Result<MainDb> {
        let conn = open_db_and_run_migration(
            support_dir,
            "main.db",
            &[&|tx| {
                let sql = "
                CREATE TABLE route (
                    id             TEXT    PRIMARY KEY
                                           NOT NULL
                                           UNIQUE,
                    start_time     INTEGER NOT NULL, -- unix ms
                    end_time       INTEGER,          -- unix ms
                    num_of_points  INTEGER NOT NULL,
                    data           BLOB    NOT NULL
                );
                CREATE INDEX route_start_time_index ON route (
                    start_time DESC
                );
                CREATE TABLE setting (
                    key            TEXT    PRIMARY KEY
                                           NOT NULL
                                           UNIQUE,
                    value          TEXT
                );
                ";
                for s in sql_split::split(sql) {
                    tx.execute(&s, ())?;
                }
                Ok(())
            }],
        )?;
        Ok(MainDb { conn })
    }

    pub fn with_txn<F, O>(&mut self, f: F) -> Result<O>
    where
        F: FnOnce(&mut Txn) -> Result<O>,
    {
        let mut txn = Txn {
            db_txn: self.conn.transaction()?,
        };
        // dropping an uncommitted transaction rolls it back
        let output = f(&mut txn)?;
        txn.db_txn.commit()?;
        Ok(output)
    }

    pub fn flush(&self) -> Result<()> {
        self.conn.cache_flush()?;
        Ok(())
    }

    pub fn get_setting<T: FromStr>(&mut self, setting: Setting) -> Result<Option<T>>
    where
        <T as FromStr>::Err: Error + Send + Sync + 'static,
    {
        let tx = self.conn.transaction()?;
        let mut query = tx.prepare("SELECT value FROM setting WHERE key = ?1;")?;
        let result: Option<String> = query
            .query_row([setting.to_db_key()], |row| row.get(0))
            .optional()?;
        match result {
            None => Ok(None),
            Some(s) => {
                let v = FromStr::from_str(&s)?;
                Ok(Some(v))
            }
        }
    }

    pub fn get_setting_with_default<T: FromStr>(&mut self, setting: Setting, default: T) -> T
    where
        <T as FromStr>::Err: Error + Send + Sync + 'static,
    {
        match self.get_setting(setting) {
            Ok(v) => v,
            Err(error) => {
                warn!(
                    "[main_db.get_setting_with_default] setting:{:?}, error:{}",
                    setting, error
                );
                None
            }
        }
        .unwrap_or(default)
    }

    pub fn set_setting<T: ToString>(&mut self, setting: Setting, value: T) -> Result<()> {
        let tx = self.conn.transaction()?;
        let sql = "INSERT OR REPLACE INTO setting (key, value) VALUES (?1, ?2);";
        tx.execute(sql, (setting.to_db_key(), value.to_string()))?;
        tx.commit()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, EnumIter, PartialEq, Eq)]
pub enum Setting {
    Username,
    UserId,
}

impl Setting {
    fn to_db_key(self) -> &'static str {
        match self {
            Self::Username => "USERNAME",
            Self::UserId => "USER_ID",
        }
    }
}
