mod aggregate;
mod error;
mod grid;
mod provider;
mod risk;
mod scanner;
mod types;

pub use aggregate::{screen, screen_all_pairs, ScreeningReport, ScreeningSummary};
pub use error::ScreeningError;
pub use grid::{make_grid, TimeGrid, MAX_SAMPLES};
pub use provider::{propagate_series, StateProvider};
pub use risk::{risk_level, risk_score, score, score_series, RiskLevel};
pub use scanner::{scan, scan_all_pairs};
pub use types::{ConjunctionRecord, RiskRecord, StateVector};
