mod error;
mod propagation;
mod tle_loader;
mod types;

pub use error::PredictError;
pub use propagation::{ground_track, teme_to_ecef_position};
pub use tle_loader::{TleEntry, TleLoader};
pub use types::{GroundTrackPoint, SatelliteInfo};
