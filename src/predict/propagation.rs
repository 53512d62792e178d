use chrono::{DateTime, Utc};

use crate::predict::error::PredictError;
use crate::predict::tle_loader::TleEntry;
use crate::predict::types::GroundTrackPoint;
use crate::screening::{ScreeningError, StateProvider, StateVector, TimeGrid};

const EARTH_RADIUS_KM: f64 = 6378.137;

impl TleEntry {
    /// SGP4 position (km) and velocity (km/s) in the TEME frame
    pub fn propagate(&self, timestamp: DateTime<Utc>) -> Result<StateVector, PredictError> {
        let minutes = self
            .elements
            .datetime_to_minutes_since_epoch(&timestamp.naive_utc())
            .map_err(|e| PredictError::Propagation(e.to_string()))?;

        let prediction = self
            .constants
            .propagate(minutes)
            .map_err(|e| PredictError::Propagation(e.to_string()))?;

        Ok(StateVector::new(prediction.position, prediction.velocity))
    }
}

impl StateProvider for TleEntry {
    type Error = PredictError;

    fn id(&self) -> &str {
        &self.info.name
    }

    fn state_at(&self, epoch: DateTime<Utc>) -> Result<StateVector, PredictError> {
        self.propagate(epoch)
    }
}

/// Sub-satellite points over the grid, on a spherical Earth
pub fn ground_track(
    entry: &TleEntry,
    grid: &TimeGrid,
) -> Result<Vec<GroundTrackPoint>, ScreeningError> {
    grid.epochs()
        .iter()
        .map(|timestamp| {
            let state = entry
                .propagate(*timestamp)
                .map_err(|e| ScreeningError::Provider {
                    satellite: entry.info.name.clone(),
                    source: Box::new(e),
                })?;
            let sidereal = sgp4::iau_epoch_to_sidereal_time(sgp4::julian_years_since_j2000(
                &timestamp.naive_utc(),
            ));
            let ecef = teme_to_ecef_position(state.position_km, sidereal);
            Ok(subpoint(*timestamp, ecef))
        })
        .collect()
}

fn subpoint(timestamp: DateTime<Utc>, ecef: [f64; 3]) -> GroundTrackPoint {
    let radius = (ecef[0] * ecef[0] + ecef[1] * ecef[1] + ecef[2] * ecef[2]).sqrt();
    let latitude = (ecef[2] / radius).asin().to_degrees();
    let longitude = (ecef[1].atan2(ecef[0]).to_degrees() + 180.0).rem_euclid(360.0) - 180.0;

    GroundTrackPoint {
        timestamp,
        latitude_deg: round2(latitude),
        longitude_deg: round2(longitude),
        altitude_km: round2(radius - EARTH_RADIUS_KM),
    }
}

pub fn teme_to_ecef_position(pos_teme: [f64; 3], gmst: f64) -> [f64; 3] {
    let cos_gmst = gmst.cos();
    let sin_gmst = gmst.sin();
    [
        pos_teme[0] * cos_gmst + pos_teme[1] * sin_gmst,
        -pos_teme[0] * sin_gmst + pos_teme[1] * cos_gmst,
        pos_teme[2],
    ]
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predict::tle_loader::parse_tle_str;
    use crate::predict::tle_loader::tests::{ISS, NOAA_20};
    use crate::screening::{make_grid, screen, RiskLevel};
    use chrono::TimeZone;

    fn catalog() -> Vec<TleEntry> {
        parse_tle_str(&format!("{}\n{}", ISS, NOAA_20), "test.tle").unwrap()
    }

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 7, 13, 0, 0, 0).unwrap()
    }

    #[test]
    fn iss_state_is_in_low_earth_orbit() {
        let iss = &catalog()[0];
        let state = iss.state_at(start()).unwrap();
        let r = state.relative_to(&StateVector::new([0.0; 3], [0.0; 3]));
        assert!(r.0 > 6600.0 && r.0 < 6900.0, "radius {}", r.0);
        assert!(r.1 > 7.4 && r.1 < 7.9, "speed {}", r.1);
    }

    #[test]
    fn propagation_is_deterministic() {
        let iss = &catalog()[0];
        assert_eq!(iss.state_at(start()).unwrap(), iss.state_at(start()).unwrap());
    }

    #[test]
    fn ground_track_stays_within_inclination() {
        let iss = &catalog()[0];
        let grid = make_grid(start(), 3.0, 5.0).unwrap();
        let track = ground_track(iss, &grid).unwrap();
        assert_eq!(track.len(), grid.len());
        for point in &track {
            assert!(point.latitude_deg.abs() <= 52.0, "lat {}", point.latitude_deg);
            assert!((-180.0..180.0).contains(&point.longitude_deg));
            assert!(point.altitude_km > 300.0 && point.altitude_km < 500.0);
        }
    }

    #[test]
    fn screening_real_orbits_yields_bounded_risk() {
        let catalog = catalog();
        let grid = make_grid(start(), 24.0, 10.0).unwrap();
        // generous threshold so the pair is guaranteed to be flagged
        let report = screen("ISS (ZARYA)", &catalog, &grid, 20_000.0).unwrap();
        assert!(!report.conjunctions.is_empty());
        assert_eq!(report.risks.len(), 1);
        let risk = &report.risks[0];
        assert_eq!(risk.satellite_b, "NOAA 20");
        assert!((0.0..=1.0).contains(&risk.risk_score));
        assert!(risk.min_distance_km > 0.0);
        assert!(matches!(
            risk.risk_level,
            RiskLevel::Low | RiskLevel::Moderate | RiskLevel::High
        ));
    }
}
