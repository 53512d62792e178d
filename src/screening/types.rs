use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::risk::RiskLevel;

/// Position (km) and velocity (km/s) of one satellite at one epoch
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StateVector {
    pub position_km: [f64; 3],
    pub velocity_km_s: [f64; 3],
}

impl StateVector {
    pub fn new(position_km: [f64; 3], velocity_km_s: [f64; 3]) -> Self {
        Self {
            position_km,
            velocity_km_s,
        }
    }

    /// Separation and relative speed against another state at the same epoch
    pub fn relative_to(&self, other: &StateVector) -> (f64, f64) {
        let dr = sub(self.position_km, other.position_km);
        let dv = sub(self.velocity_km_s, other.velocity_km_s);
        (norm(dr), norm(dv))
    }
}

fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn norm(v: [f64; 3]) -> f64 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

/// One sample where two satellites were closer than the screening threshold
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ConjunctionRecord {
    pub time: DateTime<Utc>,
    pub satellite_a: String,
    pub satellite_b: String,
    pub distance_km: f64,
    pub relative_speed_km_s: f64,
}

/// Closest-approach summary and risk score for one pair
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RiskRecord {
    pub satellite_a: String,
    pub satellite_b: String,
    pub min_distance_km: f64,
    pub relative_speed_at_min_km_s: f64,
    pub risk_score: f64,
    pub risk_level: RiskLevel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_to_is_euclidean() {
        let a = StateVector::new([3.0, 4.0, 0.0], [1.0, 0.0, 0.0]);
        let b = StateVector::new([0.0, 0.0, 0.0], [1.0, 2.0, 2.0]);
        let (d, v) = a.relative_to(&b);
        assert_eq!(d, 5.0);
        assert_eq!(v, (4.0f64 + 4.0).sqrt());
    }

    #[test]
    fn relative_distance_is_symmetric() {
        let a = StateVector::new([7000.0, 10.0, -3.0], [0.0, 7.5, 0.1]);
        let b = StateVector::new([6900.0, 250.0, 40.0], [0.2, -7.4, 0.0]);
        assert_eq!(a.relative_to(&b), b.relative_to(&a));
    }
}
