use axum::{extract::State, Json};

use crate::predict::SatelliteInfo;
use crate::web::api::error::{ApiResult, ErrorResponse};
use crate::web::state::AppState;

#[utoipa::path(
    get,
    path = "/api/catalog",
    tag = "catalog",
    responses(
        (status = 200, description = "Loaded satellites in catalog order", body = Vec<SatelliteInfo>)
    )
)]
pub async fn list_catalog(State(state): State<AppState>) -> Json<Vec<SatelliteInfo>> {
    let loader = state.tle_loader.read().await;
    Json(
        loader
            .satellites()
            .iter()
            .map(|s| s.info.clone())
            .collect(),
    )
}

#[utoipa::path(
    post,
    path = "/api/catalog/reload",
    tag = "catalog",
    responses(
        (status = 200, description = "Catalog reloaded", body = Vec<SatelliteInfo>),
        (status = 500, description = "Catalog could not be read", body = ErrorResponse)
    )
)]
pub async fn reload_catalog(State(state): State<AppState>) -> ApiResult<Json<Vec<SatelliteInfo>>> {
    let mut loader = state.tle_loader.write().await;
    loader.reload()?;
    Ok(Json(
        loader
            .satellites()
            .iter()
            .map(|s| s.info.clone())
            .collect(),
    ))
}
