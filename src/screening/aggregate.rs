use chrono::{DateTime, Utc};
use log::info;
use serde::Serialize;
use utoipa::ToSchema;

use super::error::ScreeningError;
use super::grid::TimeGrid;
use super::provider::{find, propagate_series, relative_series, StateProvider};
use super::risk::{score_series, RiskLevel};
use super::scanner::{check_threshold, flag_pair};
use super::types::{ConjunctionRecord, RiskRecord};

/// Headline numbers for a screening run
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ScreeningSummary {
    pub total_conjunctions: usize,
    pub high_risk_count: usize,
    pub max_risk_score: Option<f64>,
}

impl ScreeningSummary {
    fn from_records(conjunctions: &[ConjunctionRecord], risks: &[RiskRecord]) -> Self {
        Self {
            total_conjunctions: conjunctions.len(),
            high_risk_count: risks
                .iter()
                .filter(|r| r.risk_level == RiskLevel::High)
                .count(),
            max_risk_score: risks.iter().map(|r| r.risk_score).reduce(f64::max),
        }
    }
}

/// Conjunction timeline plus per-pair risk table for one screening run
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ScreeningReport {
    /// Reference satellite, absent for all-pairs runs
    pub reference: Option<String>,
    pub grid_start: DateTime<Utc>,
    pub grid_end: DateTime<Utc>,
    pub samples: usize,
    pub threshold_km: f64,
    pub conjunctions: Vec<ConjunctionRecord>,
    pub risks: Vec<RiskRecord>,
    pub summary: ScreeningSummary,
}

impl ScreeningReport {
    fn new(
        reference: Option<String>,
        grid: &TimeGrid,
        threshold_km: f64,
        conjunctions: Vec<ConjunctionRecord>,
        risks: Vec<RiskRecord>,
    ) -> Self {
        let summary = ScreeningSummary::from_records(&conjunctions, &risks);
        Self {
            reference,
            grid_start: grid.start(),
            grid_end: grid.end(),
            samples: grid.len(),
            threshold_km,
            conjunctions,
            risks,
            summary,
        }
    }
}

/// Screen one reference satellite against the catalog.
///
/// Every other satellite is propagated once; its series feeds both the
/// conjunction scan and, if it produced at least one conjunction, the risk
/// scorer. Satellites that never came within the threshold get no risk record.
pub fn screen<P: StateProvider>(
    reference_id: &str,
    catalog: &[P],
    grid: &TimeGrid,
    threshold_km: f64,
) -> Result<ScreeningReport, ScreeningError> {
    check_threshold(threshold_km)?;
    let (_, reference) = find(catalog, reference_id)?;
    let reference_states = propagate_series(reference, grid)?;

    let mut conjunctions = Vec::new();
    let mut risks = Vec::new();
    for other in catalog.iter().filter(|sat| sat.id() != reference_id) {
        let other_states = propagate_series(other, grid)?;
        let flagged = flag_pair(
            reference_id,
            other.id(),
            &reference_states,
            &other_states,
            grid,
            threshold_km,
        );
        if flagged.is_empty() {
            continue;
        }
        let series = relative_series(&reference_states, &other_states);
        risks.extend(score_series(reference_id, other.id(), &series));
        conjunctions.extend(flagged);
    }

    info!(
        "Screened {} against {} satellites: {} conjunctions, {} scored pairs",
        reference_id,
        catalog.len().saturating_sub(1),
        conjunctions.len(),
        risks.len()
    );

    Ok(ScreeningReport::new(
        Some(reference_id.to_string()),
        grid,
        threshold_km,
        conjunctions,
        risks,
    ))
}

/// Screen every unordered pair of the catalog
pub fn screen_all_pairs<P: StateProvider>(
    catalog: &[P],
    grid: &TimeGrid,
    threshold_km: f64,
) -> Result<ScreeningReport, ScreeningError> {
    check_threshold(threshold_km)?;
    let series = catalog
        .iter()
        .map(|sat| propagate_series(sat, grid))
        .collect::<Result<Vec<_>, _>>()?;

    let mut conjunctions = Vec::new();
    let mut risks = Vec::new();
    for i in 0..catalog.len() {
        for j in (i + 1)..catalog.len() {
            let (a, b) = (catalog[i].id(), catalog[j].id());
            if a == b {
                continue;
            }
            let flagged = flag_pair(a, b, &series[i], &series[j], grid, threshold_km);
            if flagged.is_empty() {
                continue;
            }
            risks.extend(score_series(a, b, &relative_series(&series[i], &series[j])));
            conjunctions.extend(flagged);
        }
    }

    info!(
        "Screened {} pairs: {} conjunctions, {} scored pairs",
        catalog.len() * catalog.len().saturating_sub(1) / 2,
        conjunctions.len(),
        risks.len()
    );

    Ok(ScreeningReport::new(
        None,
        grid,
        threshold_km,
        conjunctions,
        risks,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screening::provider::testing::Tabulated;
    use chrono::{Duration, TimeZone};

    fn grid(samples: i64) -> TimeGrid {
        let start = Utc.with_ymd_and_hms(2025, 9, 27, 0, 0, 0).unwrap();
        TimeGrid::new(
            start,
            Duration::minutes(10 * (samples - 1)),
            Duration::minutes(10),
        )
        .unwrap()
    }

    #[test]
    fn five_sample_encounter_end_to_end() {
        let grid = grid(5);
        let catalog = vec![
            Tabulated::along_x("SAT-A", &grid, &[0.0; 5], [0.0, 0.0, 0.0]),
            Tabulated::along_x(
                "SAT-B",
                &grid,
                &[600.0, 450.0, 300.0, 450.0, 600.0],
                [0.0, 7.0, 0.0],
            ),
        ];

        let report = screen("SAT-A", &catalog, &grid, 500.0).unwrap();

        assert_eq!(report.conjunctions.len(), 3);
        assert_eq!(report.conjunctions[0].time, grid.epochs()[1]);
        assert_eq!(report.conjunctions[2].time, grid.epochs()[3]);

        assert_eq!(report.risks.len(), 1);
        let risk = &report.risks[0];
        assert_eq!(risk.min_distance_km, 300.0);
        assert_eq!(risk.relative_speed_at_min_km_s, 7.0);
        assert_eq!(risk.risk_score, 1.0);
        assert_eq!(risk.risk_level, RiskLevel::High);

        assert_eq!(
            report.summary,
            ScreeningSummary {
                total_conjunctions: 3,
                high_risk_count: 1,
                max_risk_score: Some(1.0),
            }
        );
        assert_eq!(report.samples, 5);
        assert_eq!(report.reference.as_deref(), Some("SAT-A"));
    }

    #[test]
    fn reference_alone_gives_empty_report() {
        let grid = grid(3);
        let catalog = vec![Tabulated::along_x("SOLO", &grid, &[0.0; 3], [0.0; 3])];

        let report = screen("SOLO", &catalog, &grid, 500.0).unwrap();
        assert!(report.conjunctions.is_empty());
        assert!(report.risks.is_empty());
        assert_eq!(report.summary.total_conjunctions, 0);
        assert_eq!(report.summary.max_risk_score, None);
    }

    #[test]
    fn unflagged_pairs_are_not_scored() {
        let grid = grid(3);
        let catalog = vec![
            Tabulated::along_x("REF", &grid, &[0.0; 3], [0.0; 3]),
            Tabulated::along_x("FAR", &grid, &[5000.0; 3], [0.0; 3]),
            Tabulated::along_x("NEAR", &grid, &[900.0, 200.0, 900.0], [0.0, 2.0, 0.0]),
        ];

        let report = screen("REF", &catalog, &grid, 500.0).unwrap();
        assert_eq!(report.conjunctions.len(), 1);
        assert_eq!(report.risks.len(), 1);
        assert_eq!(report.risks[0].satellite_b, "NEAR");
        assert_eq!(report.risks[0].min_distance_km, 200.0);
    }

    #[test]
    fn all_pairs_report_scores_each_flagged_pair_once() {
        let grid = grid(2);
        let catalog = vec![
            Tabulated::along_x("A", &grid, &[0.0, 0.0], [0.0; 3]),
            Tabulated::along_x("B", &grid, &[100.0, 100.0], [0.0; 3]),
            Tabulated::along_x("C", &grid, &[8000.0, 8000.0], [0.0; 3]),
        ];

        let report = screen_all_pairs(&catalog, &grid, 500.0).unwrap();
        assert_eq!(report.reference, None);
        assert_eq!(report.conjunctions.len(), 2);
        assert_eq!(report.risks.len(), 1);
        assert_eq!(
            (report.risks[0].satellite_a.as_str(), report.risks[0].satellite_b.as_str()),
            ("A", "B")
        );
    }

    #[test]
    fn empty_catalog_all_pairs_is_not_an_error() {
        let grid = grid(2);
        let catalog: Vec<Tabulated> = Vec::new();
        let report = screen_all_pairs(&catalog, &grid, 500.0).unwrap();
        assert!(report.conjunctions.is_empty());
        assert!(report.risks.is_empty());
    }

    #[test]
    fn report_serializes_to_plain_json() {
        let grid = grid(2);
        let catalog = vec![
            Tabulated::along_x("A", &grid, &[0.0, 0.0], [0.0; 3]),
            Tabulated::along_x("B", &grid, &[2000.0, 100.0], [0.0; 3]),
        ];
        let report = screen("A", &catalog, &grid, 500.0).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["risks"][0]["risk_level"], "High");
        assert_eq!(json["conjunctions"][0]["distance_km"], 100.0);
        assert_eq!(json["summary"]["total_conjunctions"], 1);
    }
}
