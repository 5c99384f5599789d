use anyhow::Result;
use chrono::{DateTime, Duration, Utc};

use crate::coordinate::Coordinate;

/// A completed recording session. Coordinates are kept as two index-aligned
/// arrays, `coordinates()` pairs them back up.
#[derive(Clone, Debug, PartialEq)]
pub struct Route {
    pub id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    latitudes: Vec<f64>,
    longitudes: Vec<f64>,
}

impl Route {
    pub fn new(
        id: String,
        start_time: DateTime<Utc>,
        end_time: Option<DateTime<Utc>>,
        latitudes: Vec<f64>,
        longitudes: Vec<f64>,
    ) -> Result<Self> {
        if latitudes.len() != longitudes.len() {
            bail!(
                "Mismatched coordinate arrays for route {}: {} latitudes, {} longitudes",
                id,
                latitudes.len(),
                longitudes.len()
            );
        }
        Ok(Route {
            id,
            start_time,
            end_time,
            latitudes,
            longitudes,
        })
    }

    pub fn of_track(
        id: String,
        start_time: DateTime<Utc>,
        end_time: Option<DateTime<Utc>>,
        track: &[Coordinate],
    ) -> Self {
        let (latitudes, longitudes) = track.iter().map(|c| (c.latitude, c.longitude)).unzip();
        Route {
            id,
            start_time,
            end_time,
            latitudes,
            longitudes,
        }
    }

    pub fn latitudes(&self) -> &[f64] {
        &self.latitudes
    }

    pub fn longitudes(&self) -> &[f64] {
        &self.longitudes
    }

    pub fn num_of_points(&self) -> usize {
        self.latitudes.len()
    }

    pub fn coordinates(&self) -> impl Iterator<Item = Coordinate> + '_ {
        self.latitudes
            .iter()
            .zip(self.longitudes.iter())
            .map(|(lat, lng)| Coordinate::new(*lat, *lng))
    }

    pub fn start_coordinate(&self) -> Option<Coordinate> {
        self.coordinates().next()
    }

    pub fn end_coordinate(&self) -> Option<Coordinate> {
        match (self.latitudes.last(), self.longitudes.last()) {
            (Some(lat), Some(lng)) => Some(Coordinate::new(*lat, *lng)),
            _ => None,
        }
    }

    pub fn duration(&self) -> Option<Duration> {
        self.end_time.map(|end| end - self.start_time)
    }
}

/// Abbreviated hours/minutes/seconds, e.g. `1h 2m 3s`. Zero units are
/// skipped (`1h 3s`), anything under a second reads `0s`.
pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.num_seconds().max(0);
    let hours = total_secs / 3600;
    let mins = (total_secs % 3600) / 60;
    let secs = total_secs % 60;

    let parts: Vec<String> = [(hours, "h"), (mins, "m"), (secs, "s")]
        .into_iter()
        .filter(|(value, _)| *value > 0)
        .map(|(value, unit)| format!("{}{}", value, unit))
        .collect();
    if parts.is_empty() {
        return "0s".to_string();
    }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::{format_duration, Route};
    use crate::coordinate::Coordinate;

    #[test]
    fn mismatched_arrays() {
        let start = Utc.with_ymd_and_hms(2025, 1, 1, 8, 0, 0).unwrap();
        assert!(Route::new("a".to_string(), start, None, vec![1., 2.], vec![1.]).is_err());
        assert!(Route::new("a".to_string(), start, None, vec![], vec![]).is_ok());
    }

    #[test]
    fn track_round_trip() {
        let start = Utc.with_ymd_and_hms(2025, 1, 1, 8, 0, 0).unwrap();
        let track = vec![
            Coordinate::new(24.10, 120.60),
            Coordinate::new(24.12, 120.62),
            Coordinate::new(-91.0, 200.0),
        ];
        let route = Route::of_track("a".to_string(), start, None, &track);
        assert_eq!(route.latitudes(), &[24.10, 24.12, -91.0]);
        assert_eq!(route.longitudes(), &[120.60, 120.62, 200.0]);
        assert_eq!(route.coordinates().collect::<Vec<_>>(), track);
        assert_eq!(route.start_coordinate(), Some(track[0]));
        assert_eq!(route.end_coordinate(), Some(track[2]));
        assert_eq!(route.duration(), None);
    }

    #[test]
    fn duration_format() {
        assert_eq!(format_duration(Duration::zero()), "0s");
        assert_eq!(format_duration(Duration::milliseconds(900)), "0s");
        assert_eq!(format_duration(Duration::seconds(42)), "42s");
        assert_eq!(format_duration(Duration::seconds(125)), "2m 5s");
        assert_eq!(format_duration(Duration::seconds(120)), "2m");
        assert_eq!(format_duration(Duration::seconds(3600)), "1h");
        assert_eq!(format_duration(Duration::seconds(3603)), "1h 3s");
        assert_eq!(format_duration(Duration::seconds(3660)), "1h 1m");
        assert_eq!(format_duration(Duration::seconds(3723)), "1h 2m 3s");
        assert_eq!(format_duration(Duration::seconds(-5)), "0s");
    }
}
