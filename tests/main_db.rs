pub mod test_utils;

use assert_float_eq::*;
use chrono::{Duration, TimeZone, Utc};
use gps_records_core::{
    coordinate::Coordinate,
    main_db::{MainDb, Setting},
};
use tempdir::TempDir;

fn sample_track() -> Vec<Coordinate> {
    (0..1000)
        .map(|i| Coordinate::new(24.10 + i as f64 * 0.0001, 120.60 - i as f64 * 0.0001))
        .collect()
}

#[test]
fn basic() {
    let temp_dir = TempDir::new("main_db-basic").unwrap();
    println!("temp dir: {:?}", temp_dir.path());

    let track = sample_track();
    let start = Utc.with_ymd_and_hms(2025, 5, 1, 8, 0, 0).unwrap();
    let end = start + Duration::minutes(42);

    let mut main_db = MainDb::open(temp_dir.path().to_str().unwrap()).unwrap();
    let route = main_db
        .with_txn(|txn| txn.create_and_insert_route(&track, start, end))
        .unwrap()
        .unwrap();

    // test restart
    let mut main_db = MainDb::open(temp_dir.path().to_str().unwrap()).unwrap();
    let routes = main_db.with_txn(|txn| txn.list_routes()).unwrap();
    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0], route);
    assert_eq!(routes[0].start_time, start);
    assert_eq!(routes[0].end_time, Some(end));
    assert_eq!(routes[0].num_of_points(), track.len());
    for (a, b) in routes[0].coordinates().zip(track.iter()) {
        assert_f64_near!(a.latitude, b.latitude);
        assert_f64_near!(a.longitude, b.longitude);
    }

    let fetched = main_db.with_txn(|txn| txn.get_route(&route.id)).unwrap();
    assert_eq!(fetched, Some(route));
    assert_eq!(
        main_db.with_txn(|txn| txn.get_route("missing")).unwrap(),
        None
    );
}

#[test]
fn empty_track() {
    let temp_dir = TempDir::new("main_db-empty_track").unwrap();
    let mut main_db = MainDb::open(temp_dir.path().to_str().unwrap()).unwrap();

    let now = Utc::now();
    let result = main_db
        .with_txn(|txn| txn.create_and_insert_route(&[], now, now))
        .unwrap();
    assert!(result.is_none());
    assert_eq!(main_db.with_txn(|txn| txn.count_routes()).unwrap(), 0);
}

#[test]
fn ordering() {
    let temp_dir = TempDir::new("main_db-ordering").unwrap();
    let mut main_db = MainDb::open(temp_dir.path().to_str().unwrap()).unwrap();

    let t = |h| Utc.with_ymd_and_hms(2025, 5, 1, h, 0, 0).unwrap();
    let track = [Coordinate::new(1.0, 2.0)];
    let ids = main_db
        .with_txn(|txn| {
            let mut ids = Vec::new();
            for h in [9, 7, 12, 8] {
                let route = txn
                    .create_and_insert_route(&track, t(h), t(h) + Duration::minutes(5))?
                    .unwrap();
                ids.push((h, route.id));
            }
            Ok(ids)
        })
        .unwrap();

    let routes = main_db.with_txn(|txn| txn.list_routes()).unwrap();
    let start_hours: Vec<_> = routes.iter().map(|r| r.start_time).collect();
    assert_eq!(start_hours, vec![t(12), t(9), t(8), t(7)]);
    let id_of = |h| ids.iter().find(|(x, _)| *x == h).unwrap().1.clone();
    assert_eq!(routes[0].id, id_of(12));
    assert_eq!(routes[3].id, id_of(7));
}

#[test]
fn delete() {
    let temp_dir = TempDir::new("main_db-delete").unwrap();
    let mut main_db = MainDb::open(temp_dir.path().to_str().unwrap()).unwrap();

    let now = Utc::now();
    let track = [Coordinate::new(1.0, 2.0)];
    let first = main_db
        .with_txn(|txn| txn.create_and_insert_route(&track, now, now))
        .unwrap()
        .unwrap();
    let second = main_db
        .with_txn(|txn| txn.create_and_insert_route(&track, now, now))
        .unwrap()
        .unwrap();
    assert_ne!(first.id, second.id);

    assert!(main_db.with_txn(|txn| txn.delete_route(&first.id)).unwrap());
    let routes = main_db.with_txn(|txn| txn.list_routes()).unwrap();
    assert_eq!(routes, vec![second.clone()]);

    // unknown and already deleted ids are no-ops
    assert!(!main_db.with_txn(|txn| txn.delete_route(&first.id)).unwrap());
    assert!(!main_db.with_txn(|txn| txn.delete_route("unknown")).unwrap());
    assert_eq!(main_db.with_txn(|txn| txn.count_routes()).unwrap(), 1);
}

#[test]
fn failed_txn_rolls_back() {
    let temp_dir = TempDir::new("main_db-failed_txn_rolls_back").unwrap();
    let mut main_db = MainDb::open(temp_dir.path().to_str().unwrap()).unwrap();

    let now = Utc::now();
    let track = [Coordinate::new(1.0, 2.0)];
    let result: anyhow::Result<()> = main_db.with_txn(|txn| {
        txn.create_and_insert_route(&track, now, now)?;
        anyhow::bail!("something went wrong after the insert")
    });
    assert!(result.is_err());
    assert_eq!(main_db.with_txn(|txn| txn.count_routes()).unwrap(), 0);
}

#[test]
fn setting() {
    let temp_dir = TempDir::new("main_db-setting").unwrap();
    println!("temp dir: {:?}", temp_dir.path());

    let mut main_db = MainDb::open(temp_dir.path().to_str().unwrap()).unwrap();
    // default value
    assert_eq!(
        main_db.get_setting_with_default(Setting::Username, "default".to_string()),
        "default"
    );

    // setting value
    main_db.set_setting(Setting::Username, "walker").unwrap();
    assert_eq!(
        main_db.get_setting_with_default(Setting::Username, "default".to_string()),
        "walker"
    );

    // restart
    let mut main_db = MainDb::open(temp_dir.path().to_str().unwrap()).unwrap();
    assert_eq!(
        main_db
            .get_setting::<String>(Setting::Username)
            .unwrap()
            .as_deref(),
        Some("walker")
    );
    assert_eq!(main_db.get_setting::<String>(Setting::UserId).unwrap(), None);
}
