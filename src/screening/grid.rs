use chrono::{DateTime, Duration, Utc};

use super::error::ScreeningError;

/// Largest grid the engine will build; every sample costs one propagation
/// per satellite.
pub const MAX_SAMPLES: i64 = 100_000;

/// Uniformly spaced, strictly increasing sample epochs
#[derive(Debug, Clone, PartialEq)]
pub struct TimeGrid {
    epochs: Vec<DateTime<Utc>>,
    step: Duration,
}

impl TimeGrid {
    /// Build a grid covering `duration` from `start`, inclusive of both ends
    /// when `duration` is a whole multiple of `step`.
    pub fn new(
        start: DateTime<Utc>,
        duration: Duration,
        step: Duration,
    ) -> Result<Self, ScreeningError> {
        let duration_ms = duration.num_milliseconds();
        let step_ms = step.num_milliseconds();

        if duration_ms <= 0 {
            return Err(ScreeningError::InvalidGridConfiguration(
                "duration must be positive".into(),
            ));
        }
        if step_ms <= 0 {
            return Err(ScreeningError::InvalidGridConfiguration(
                "step must be positive".into(),
            ));
        }
        if step_ms > duration_ms {
            return Err(ScreeningError::InvalidGridConfiguration(format!(
                "step ({} ms) exceeds duration ({} ms)",
                step_ms, duration_ms
            )));
        }

        let count = duration_ms / step_ms + 1;
        if count > MAX_SAMPLES {
            return Err(ScreeningError::InvalidGridConfiguration(format!(
                "{} samples exceeds the limit of {}",
                count, MAX_SAMPLES
            )));
        }

        let epochs = (0..count)
            .map(|i| {
                start
                    .checked_add_signed(Duration::milliseconds(i * step_ms))
                    .ok_or_else(|| {
                        ScreeningError::InvalidGridConfiguration(
                            "window exceeds representable time".into(),
                        )
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            epochs,
            step: Duration::milliseconds(step_ms),
        })
    }

    pub fn epochs(&self) -> &[DateTime<Utc>] {
        &self.epochs
    }

    pub fn len(&self) -> usize {
        self.epochs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.epochs.is_empty()
    }

    pub fn step(&self) -> Duration {
        self.step
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.epochs[0]
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.epochs[self.epochs.len() - 1]
    }
}

/// Grid of `floor(duration_hours * 60 / step_minutes) + 1` epochs from `start`
pub fn make_grid(
    start: DateTime<Utc>,
    duration_hours: f64,
    step_minutes: f64,
) -> Result<TimeGrid, ScreeningError> {
    if !duration_hours.is_finite() || duration_hours <= 0.0 {
        return Err(ScreeningError::InvalidGridConfiguration(format!(
            "duration_hours must be positive, got {}",
            duration_hours
        )));
    }
    if !step_minutes.is_finite() || step_minutes <= 0.0 {
        return Err(ScreeningError::InvalidGridConfiguration(format!(
            "step_minutes must be positive, got {}",
            step_minutes
        )));
    }
    if step_minutes > duration_hours * 60.0 {
        return Err(ScreeningError::InvalidGridConfiguration(format!(
            "step of {} min exceeds duration of {} h",
            step_minutes, duration_hours
        )));
    }

    let to_duration = |ms: f64| {
        Duration::try_milliseconds(ms.round() as i64).ok_or_else(|| {
            ScreeningError::InvalidGridConfiguration("window exceeds representable time".into())
        })
    };
    let duration = to_duration(duration_hours * 3_600_000.0)?;
    let step = to_duration(step_minutes * 60_000.0)?;
    TimeGrid::new(start, duration, step)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 27, 0, 0, 0).unwrap()
    }

    #[test]
    fn default_window_has_145_samples() {
        let grid = make_grid(start(), 24.0, 10.0).unwrap();
        assert_eq!(grid.len(), 145);
        assert_eq!(grid.start(), start());
        assert_eq!(grid.end(), start() + Duration::hours(24));
    }

    #[test]
    fn length_matches_floor_formula() {
        let cases = [(1.0, 7.0), (6.0, 10.0), (0.5, 30.0), (2.0, 0.5), (3.0, 11.0)];
        for (hours, step) in cases {
            let grid = make_grid(start(), hours, step).unwrap();
            let expected = (hours * 60.0 / step).floor() as usize + 1;
            assert_eq!(grid.len(), expected, "hours={} step={}", hours, step);
        }
    }

    #[test]
    fn epochs_are_strictly_increasing_and_uniform() {
        let grid = make_grid(start(), 3.0, 11.0).unwrap();
        let step = grid.step();
        assert_eq!(step, Duration::minutes(11));
        for pair in grid.epochs().windows(2) {
            assert!(pair[1] > pair[0]);
            assert_eq!(pair[1] - pair[0], step);
        }
        assert!(grid.end() <= start() + Duration::hours(3));
    }

    #[test]
    fn step_equal_to_duration_gives_two_samples() {
        let grid = make_grid(start(), 1.0, 60.0).unwrap();
        assert_eq!(grid.epochs(), &[start(), start() + Duration::hours(1)]);
    }

    #[test]
    fn same_inputs_give_same_grid() {
        assert_eq!(
            make_grid(start(), 6.0, 10.0).unwrap(),
            make_grid(start(), 6.0, 10.0).unwrap()
        );
    }

    #[test]
    fn rejects_invalid_configuration() {
        let cases = [(0.0, 10.0), (-1.0, 10.0), (1.0, 0.0), (1.0, -5.0), (1.0, 61.0)];
        for (hours, step) in cases {
            let err = make_grid(start(), hours, step).unwrap_err();
            assert!(
                matches!(err, ScreeningError::InvalidGridConfiguration(_)),
                "hours={} step={}",
                hours,
                step
            );
        }
        assert!(make_grid(start(), f64::NAN, 1.0).is_err());
    }

    #[test]
    fn count_uses_exact_millisecond_arithmetic() {
        // 1.1 h / 1.1 min is exactly 60 steps; the f64 quotient rounds just below
        let grid = make_grid(start(), 1.1, 1.1).unwrap();
        assert_eq!(grid.len(), 61);
        assert_eq!(grid.end(), start() + Duration::minutes(66));
    }

    #[test]
    fn window_past_last_representable_date_is_rejected() {
        let err = TimeGrid::new(
            start(),
            Duration::days(365 * 300_000),
            Duration::days(365 * 300_000),
        )
        .unwrap_err();
        assert!(matches!(err, ScreeningError::InvalidGridConfiguration(_)));

        let err = make_grid(start(), 3e9, 1.8e11).unwrap_err();
        assert!(matches!(err, ScreeningError::InvalidGridConfiguration(_)));
    }

    #[test]
    fn oversized_grid_is_rejected() {
        let err = TimeGrid::new(start(), Duration::hours(24), Duration::milliseconds(1)).unwrap_err();
        assert!(matches!(err, ScreeningError::InvalidGridConfiguration(_)));

        let at_limit = TimeGrid::new(
            start(),
            Duration::seconds(MAX_SAMPLES - 1),
            Duration::seconds(1),
        )
        .unwrap();
        assert_eq!(at_limit.len() as i64, MAX_SAMPLES);
    }

    #[test]
    fn chrono_constructor_rejects_step_longer_than_duration() {
        let err = TimeGrid::new(start(), Duration::minutes(5), Duration::minutes(6)).unwrap_err();
        assert!(matches!(err, ScreeningError::InvalidGridConfiguration(_)));
    }
}
