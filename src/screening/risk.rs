use serde::Serialize;
use utoipa::ToSchema;

use super::error::ScreeningError;
use super::grid::TimeGrid;
use super::provider::{find, propagate_series, relative_series, StateProvider};
use super::types::RiskRecord;

/// Miss distance at which the distance factor reaches 1 (km)
pub const REFERENCE_DISTANCE_KM: f64 = 1000.0;
/// Relative speed decay constant (km/s)
pub const REFERENCE_SPEED_KM_S: f64 = 8.0;

const HIGH_CUTOFF: f64 = 0.7;
const MODERATE_CUTOFF: f64 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema, strum_macros::Display)]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

/// Heuristic collision risk in `[0, 1]`, decreasing in both miss distance and
/// relative speed at closest approach.
///
/// Coincident positions (`d_min <= 0`) and any non-finite intermediate score
/// saturate to 1.0.
pub fn risk_score(min_distance_km: f64, relative_speed_km_s: f64) -> f64 {
    if min_distance_km <= 0.0 {
        return 1.0;
    }
    let raw = (REFERENCE_DISTANCE_KM / min_distance_km)
        * (-relative_speed_km_s / REFERENCE_SPEED_KM_S).exp();
    if raw.is_finite() {
        raw.min(1.0)
    } else {
        1.0
    }
}

pub fn risk_level(score: f64) -> RiskLevel {
    if score > HIGH_CUTOFF {
        RiskLevel::High
    } else if score > MODERATE_CUTOFF {
        RiskLevel::Moderate
    } else {
        RiskLevel::Low
    }
}

/// Index, distance and relative speed of the first sample with the smallest
/// separation. NaN distances are never selected.
pub(crate) fn closest_approach(series: &[(f64, f64)]) -> Option<(usize, f64, f64)> {
    let mut best: Option<(usize, f64, f64)> = None;
    for (i, (distance, speed)) in series.iter().enumerate() {
        if distance.is_nan() {
            continue;
        }
        let closer = match best {
            Some((_, d, _)) => *distance < d,
            None => true,
        };
        if closer {
            best = Some((i, *distance, *speed));
        }
    }
    best
}

/// Score one pair from its full distance/relative-speed series
pub fn score_series(id_a: &str, id_b: &str, series: &[(f64, f64)]) -> Option<RiskRecord> {
    let (_, min_distance_km, relative_speed_at_min_km_s) = closest_approach(series)?;
    let risk_score = risk_score(min_distance_km, relative_speed_at_min_km_s);
    Some(RiskRecord {
        satellite_a: id_a.to_string(),
        satellite_b: id_b.to_string(),
        min_distance_km,
        relative_speed_at_min_km_s,
        risk_score,
        risk_level: risk_level(risk_score),
    })
}

/// Score the reference against every other catalog member, in catalog order.
///
/// Scores come from the unconditional distance series, so a pair that never
/// crossed a conjunction threshold still gets a record.
pub fn score<P: StateProvider>(
    reference_id: &str,
    catalog: &[P],
    grid: &TimeGrid,
) -> Result<Vec<RiskRecord>, ScreeningError> {
    let (_, reference) = find(catalog, reference_id)?;
    let reference_states = propagate_series(reference, grid)?;

    let mut records = Vec::new();
    for other in catalog.iter().filter(|sat| sat.id() != reference_id) {
        let other_states = propagate_series(other, grid)?;
        let series = relative_series(&reference_states, &other_states);
        records.extend(score_series(reference_id, other.id(), &series));
    }
    Ok(records)
}
