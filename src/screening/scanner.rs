use log::debug;

use super::error::ScreeningError;
use super::grid::TimeGrid;
use super::provider::{find, propagate_series, relative_series, StateProvider};
use super::types::{ConjunctionRecord, StateVector};

pub(crate) fn check_threshold(threshold_km: f64) -> Result<(), ScreeningError> {
    if threshold_km.is_finite() && threshold_km > 0.0 {
        Ok(())
    } else {
        Err(ScreeningError::InvalidThreshold(threshold_km))
    }
}

/// Flag every sample where `reference` and another catalog member are closer
/// than `threshold_km`.
///
/// Records are grouped by the other satellite in catalog order and sorted by
/// epoch within each group. This is a brute-force O(catalog x grid) scan.
pub fn scan<P: StateProvider>(
    reference_id: &str,
    catalog: &[P],
    grid: &TimeGrid,
    threshold_km: f64,
) -> Result<Vec<ConjunctionRecord>, ScreeningError> {
    check_threshold(threshold_km)?;
    let (_, reference) = find(catalog, reference_id)?;
    let reference_states = propagate_series(reference, grid)?;

    let mut records = Vec::new();
    for other in catalog.iter().filter(|sat| sat.id() != reference_id) {
        let other_states = propagate_series(other, grid)?;
        records.extend(flag_pair(
            reference_id,
            other.id(),
            &reference_states,
            &other_states,
            grid,
            threshold_km,
        ));
    }

    Ok(records)
}

/// Flag close samples over every unordered pair `{i, j}`, `i < j`, of the catalog
pub fn scan_all_pairs<P: StateProvider>(
    catalog: &[P],
    grid: &TimeGrid,
    threshold_km: f64,
) -> Result<Vec<ConjunctionRecord>, ScreeningError> {
    check_threshold(threshold_km)?;
    let series = catalog
        .iter()
        .map(|sat| propagate_series(sat, grid))
        .collect::<Result<Vec<_>, _>>()?;

    let mut records = Vec::new();
    for i in 0..catalog.len() {
        for j in (i + 1)..catalog.len() {
            if catalog[i].id() == catalog[j].id() {
                continue;
            }
            records.extend(flag_pair(
                catalog[i].id(),
                catalog[j].id(),
                &series[i],
                &series[j],
                grid,
                threshold_km,
            ));
        }
    }

    Ok(records)
}

pub(crate) fn flag_pair(
    id_a: &str,
    id_b: &str,
    states_a: &[StateVector],
    states_b: &[StateVector],
    grid: &TimeGrid,
    threshold_km: f64,
) -> Vec<ConjunctionRecord> {
    let records: Vec<_> = relative_series(states_a, states_b)
        .into_iter()
        .zip(grid.epochs())
        .filter(|((distance_km, _), _)| *distance_km < threshold_km)
        .map(|((distance_km, relative_speed_km_s), time)| ConjunctionRecord {
            time: *time,
            satellite_a: id_a.to_string(),
            satellite_b: id_b.to_string(),
            distance_km,
            relative_speed_km_s,
        })
        .collect();

    if !records.is_empty() {
        debug!("{} / {}: {} close samples", id_a, id_b, records.len());
    }
    records
}
