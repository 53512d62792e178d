use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// Information about a single satellite from TLE
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SatelliteInfo {
    pub name: String,
    pub norad_id: u32,
    pub tle_source: String,
}

/// Sub-satellite point at one epoch
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GroundTrackPoint {
    pub timestamp: DateTime<Utc>,
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_km: f64,
}
