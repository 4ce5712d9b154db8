#![allow(dead_code)]

use aisguard::constants::EARTH_RADIUS_KM;
use aisguard::{Mmsi, PositionFix, TrackFile, TrackSet};
use chrono::{DateTime, Duration, TimeZone, Utc};
use tracing_subscriber::EnvFilter;

/// Route library traces to the test output; filter with `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// `2024-01-01T00:00:00Z` shifted by `seconds`.
pub fn ts(seconds: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::seconds(seconds)
}

/// Latitude offset, in degrees, covering `km` along a meridian.
pub fn km_to_dlat(km: f64) -> f64 {
    (km / EARTH_RADIUS_KM).to_degrees()
}

/// Builder for synthetic tracks moving north along a meridian.
pub struct TrackBuilder {
    vessel: Mmsi,
    lat: f64,
    lon: f64,
    t: i64,
    fixes: Vec<PositionFix>,
}

impl TrackBuilder {
    pub fn new(vessel: Mmsi, lat: f64, lon: f64) -> Self {
        TrackBuilder {
            vessel,
            lat,
            lon,
            t: 0,
            fixes: vec![PositionFix::new(vessel, lat, lon, ts(0))],
        }
    }

    /// Move `km` north in `seconds`.
    pub fn leg(mut self, km: f64, seconds: i64) -> Self {
        self.lat += km_to_dlat(km);
        self.t += seconds;
        self.fixes
            .push(PositionFix::new(self.vessel, self.lat, self.lon, ts(self.t)));
        self
    }

    /// `n` identical legs.
    pub fn legs(self, n: usize, km: f64, seconds: i64) -> Self {
        (0..n).fold(self, |b, _| b.leg(km, seconds))
    }

    pub fn fixes(self) -> Vec<PositionFix> {
        self.fixes
    }
}

pub fn track_set(tracks: Vec<Vec<PositionFix>>) -> TrackSet {
    TrackSet::new_from_fixes(tracks.into_iter().flatten().collect())
}

/// Several quiet vessels with slightly varying cruise and one vessel with one extreme leg.
pub fn fleet_with_one_extreme_leg() -> TrackSet {
    let mut tracks: Vec<Vec<PositionFix>> = (0..6)
        .map(|v| {
            let mut b = TrackBuilder::new(100 + v, 50.0 + v as f64, 0.0);
            for i in 0..20 {
                let km = 2.0 + 0.1 * ((i + v) % 5) as f64;
                let seconds = 600 + 30 * ((i * 3 + v) % 4);
                b = b.leg(km, seconds);
            }
            b.fixes()
        })
        .collect();

    tracks.push(
        TrackBuilder::new(999, 40.0, 0.0)
            .legs(5, 2.0, 600)
            .leg(300.0, 60)
            .legs(5, 2.0, 600)
            .fixes(),
    );
    track_set(tracks)
}
