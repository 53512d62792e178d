use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::config::{parse_duration, ScreeningConfig};
use crate::predict::{ground_track, GroundTrackPoint};
use crate::screening::{screen, screen_all_pairs, ScreeningError, ScreeningReport};
use crate::web::api::error::{ApiError, ApiResult, ErrorResponse};
use crate::web::state::AppState;

/// Optional overrides of the configured screening window
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct WindowQuery {
    pub duration: Option<String>,
    pub step: Option<String>,
    pub threshold_km: Option<f64>,
    pub start: Option<String>,
}

impl WindowQuery {
    fn apply(&self, defaults: &ScreeningConfig) -> ApiResult<ScreeningConfig> {
        let mut window = defaults.clone();
        if let Some(duration) = &self.duration {
            window.duration = parse_duration(duration).map_err(ApiError::Validation)?;
        }
        if let Some(step) = &self.step {
            window.step = parse_duration(step).map_err(ApiError::Validation)?;
        }
        if let Some(threshold_km) = self.threshold_km {
            window.threshold_km = threshold_km;
        }
        if let Some(start) = &self.start {
            window.start = Some(
                DateTime::parse_from_rfc3339(start)
                    .map(|dt| dt.with_timezone(&Utc))
                    .map_err(|e| ApiError::Validation(e.to_string()))?,
            );
        }
        Ok(window)
    }
}

#[utoipa::path(
    get,
    path = "/api/screen/{reference}",
    tag = "screening",
    params(
        ("reference" = String, Path, description = "Reference satellite name"),
        ("duration" = Option<String>, Query, description = "Window length, e.g. 24h"),
        ("step" = Option<String>, Query, description = "Sample step, e.g. 10m"),
        ("threshold_km" = Option<f64>, Query, description = "Conjunction threshold (km)"),
        ("start" = Option<String>, Query, description = "Window start (RFC3339)")
    ),
    responses(
        (status = 200, description = "Conjunctions and risk table", body = ScreeningReport),
        (status = 400, description = "Invalid window", body = ErrorResponse),
        (status = 404, description = "Unknown reference satellite", body = ErrorResponse),
        (status = 422, description = "Propagation failed", body = ErrorResponse)
    )
)]
pub async fn screen_reference(
    State(state): State<AppState>,
    Path(reference): Path<String>,
    Query(query): Query<WindowQuery>,
) -> ApiResult<Json<ScreeningReport>> {
    let window = query.apply(&state.config.screening)?;
    let grid = window.grid(Utc::now())?;

    let catalog = state.tle_loader.read().await.snapshot();
    let report = run_blocking(move || {
        screen(&reference, catalog.as_slice(), &grid, window.threshold_km)
    })
    .await?;
    Ok(Json(report))
}

#[utoipa::path(
    get,
    path = "/api/screen",
    tag = "screening",
    params(
        ("duration" = Option<String>, Query, description = "Window length, e.g. 24h"),
        ("step" = Option<String>, Query, description = "Sample step, e.g. 10m"),
        ("threshold_km" = Option<f64>, Query, description = "Conjunction threshold (km)"),
        ("start" = Option<String>, Query, description = "Window start (RFC3339)")
    ),
    responses(
        (status = 200, description = "Conjunctions and risk table for every pair", body = ScreeningReport),
        (status = 400, description = "Invalid window", body = ErrorResponse),
        (status = 422, description = "Propagation failed", body = ErrorResponse)
    )
)]
pub async fn screen_catalog(
    State(state): State<AppState>,
    Query(query): Query<WindowQuery>,
) -> ApiResult<Json<ScreeningReport>> {
    let window = query.apply(&state.config.screening)?;
    let grid = window.grid(Utc::now())?;

    let catalog = state.tle_loader.read().await.snapshot();
    let report = run_blocking(move || {
        screen_all_pairs(catalog.as_slice(), &grid, window.threshold_km)
    })
    .await?;
    Ok(Json(report))
}

#[utoipa::path(
    get,
    path = "/api/track/{satellite}",
    tag = "screening",
    params(
        ("satellite" = String, Path, description = "Satellite name"),
        ("duration" = Option<String>, Query, description = "Window length, e.g. 24h"),
        ("step" = Option<String>, Query, description = "Sample step, e.g. 10m"),
        ("start" = Option<String>, Query, description = "Window start (RFC3339)")
    ),
    responses(
        (status = 200, description = "Ground track", body = Vec<GroundTrackPoint>),
        (status = 400, description = "Invalid window", body = ErrorResponse),
        (status = 404, description = "Unknown satellite", body = ErrorResponse)
    )
)]
pub async fn track(
    State(state): State<AppState>,
    Path(satellite): Path<String>,
    Query(query): Query<WindowQuery>,
) -> ApiResult<Json<Vec<GroundTrackPoint>>> {
    let window = query.apply(&state.config.screening)?;
    let grid = window.grid(Utc::now())?;

    let catalog = state.tle_loader.read().await.snapshot();
    if !catalog.iter().any(|s| s.info.name == satellite) {
        return Err(ApiError::NotFound(satellite));
    }
    let track = run_blocking(move || {
        let entry = catalog
            .iter()
            .find(|s| s.info.name == satellite)
            .ok_or_else(|| ScreeningError::UnknownSatellite(satellite.clone()))?;
        ground_track(entry, &grid)
    })
    .await?;
    Ok(Json(track))
}

/// Run CPU-bound screening off the async workers
async fn run_blocking<T, F>(job: F) -> ApiResult<T>
where
    F: FnOnce() -> Result<T, ScreeningError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(job)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map_err(ApiError::from)
}
