use chrono::{DateTime, Utc};

use super::error::ScreeningError;
use super::grid::TimeGrid;
use super::types::StateVector;

/// Anything that can report its identity and its state at an arbitrary epoch.
///
/// Implementations must be deterministic for a given epoch; the screening
/// engine never mutates a provider and may evaluate epochs in any order.
pub trait StateProvider {
    type Error: std::error::Error + Send + Sync + 'static;

    fn id(&self) -> &str;

    fn state_at(&self, epoch: DateTime<Utc>) -> Result<StateVector, Self::Error>;
}

/// Evaluate a provider at every epoch of the grid
pub fn propagate_series<P: StateProvider>(
    satellite: &P,
    grid: &TimeGrid,
) -> Result<Vec<StateVector>, ScreeningError> {
    grid.epochs()
        .iter()
        .map(|epoch| {
            satellite
                .state_at(*epoch)
                .map_err(|e| ScreeningError::Provider {
                    satellite: satellite.id().to_string(),
                    source: Box::new(e),
                })
        })
        .collect()
}

/// Distance and relative speed series between two equally sampled state series
pub(crate) fn relative_series(a: &[StateVector], b: &[StateVector]) -> Vec<(f64, f64)> {
    a.iter().zip(b).map(|(sa, sb)| sa.relative_to(sb)).collect()
}

/// Look up a satellite in the catalog by identity
pub(crate) fn find<'a, P: StateProvider>(
    catalog: &'a [P],
    id: &str,
) -> Result<(usize, &'a P), ScreeningError> {
    catalog
        .iter()
        .enumerate()
        .find(|(_, sat)| sat.id() == id)
        .ok_or_else(|| ScreeningError::UnknownSatellite(id.to_string()))
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    pub struct TableError(pub String);

    impl fmt::Display for TableError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", self.0)
        }
    }

    impl std::error::Error for TableError {}

    /// Provider replaying a fixed list of states, one per grid index
    pub struct Tabulated {
        pub name: String,
        pub epochs: Vec<DateTime<Utc>>,
        pub states: Vec<StateVector>,
    }

    impl Tabulated {
        pub fn new(name: &str, grid: &TimeGrid, states: Vec<StateVector>) -> Self {
            Self {
                name: name.to_string(),
                epochs: grid.epochs().to_vec(),
                states,
            }
        }

        /// Satellite sitting at a fixed offset along x with a constant velocity
        pub fn along_x(name: &str, grid: &TimeGrid, xs: &[f64], velocity: [f64; 3]) -> Self {
            let states = xs
                .iter()
                .map(|x| StateVector::new([*x, 0.0, 0.0], velocity))
                .collect();
            Self::new(name, grid, states)
        }
    }

    impl StateProvider for Tabulated {
        type Error = TableError;

        fn id(&self) -> &str {
            &self.name
        }

        fn state_at(&self, epoch: DateTime<Utc>) -> Result<StateVector, TableError> {
            self.epochs
                .iter()
                .position(|e| *e == epoch)
                .and_then(|i| self.states.get(i).copied())
                .ok_or_else(|| TableError(format!("no state for {} at {}", self.name, epoch)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::Tabulated;
    use super::*;
    use crate::screening::make_grid;
    use chrono::TimeZone;

    #[test]
    fn provider_failure_is_tagged_with_satellite() {
        let start = Utc.with_ymd_and_hms(2025, 9, 27, 0, 0, 0).unwrap();
        let grid = make_grid(start, 1.0, 30.0).unwrap();
        // only two of the three epochs are tabulated
        let sat = Tabulated::along_x("BROKEN", &grid, &[0.0, 1.0], [0.0; 3]);

        match propagate_series(&sat, &grid) {
            Err(ScreeningError::Provider { satellite, source }) => {
                assert_eq!(satellite, "BROKEN");
                assert!(source.to_string().contains("no state"));
            }
            other => panic!("expected provider error, got {:?}", other.map(|s| s.len())),
        }
    }

    #[test]
    fn find_matches_by_identity() {
        let start = Utc.with_ymd_and_hms(2025, 9, 27, 0, 0, 0).unwrap();
        let grid = make_grid(start, 1.0, 30.0).unwrap();
        let catalog = vec![
            Tabulated::along_x("A", &grid, &[0.0; 3], [0.0; 3]),
            Tabulated::along_x("B", &grid, &[0.0; 3], [0.0; 3]),
        ];
        assert_eq!(find(&catalog, "B").unwrap().0, 1);
        assert!(matches!(
            find(&catalog, "C"),
            Err(ScreeningError::UnknownSatellite(id)) if id == "C"
        ));
    }
}
