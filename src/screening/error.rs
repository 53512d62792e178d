use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScreeningError {
    #[error("invalid grid configuration: {0}")]
    InvalidGridConfiguration(String),
    #[error("invalid threshold: {0} km")]
    InvalidThreshold(f64),
    #[error("unknown satellite: {0}")]
    UnknownSatellite(String),
    #[error("state vector for {satellite} failed: {source}")]
    Provider {
        satellite: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}
