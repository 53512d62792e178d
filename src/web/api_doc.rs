use utoipa::OpenApi;

use super::api::error::ErrorResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        super::api::catalog::list_catalog,
        super::api::catalog::reload_catalog,
        super::api::screen::screen_reference,
        super::api::screen::screen_catalog,
        super::api::screen::track,
    ),
    components(
        schemas(
            ErrorResponse,
            crate::predict::SatelliteInfo,
            crate::predict::GroundTrackPoint,
            crate::screening::ScreeningReport,
            crate::screening::ScreeningSummary,
            crate::screening::ConjunctionRecord,
            crate::screening::RiskRecord,
            crate::screening::RiskLevel,
        )
    ),
    info(
        title = "Conj-O-Mat Screening API",
        description = "Conjunction screening and collision risk scoring over a TLE catalog",
        version = "0.1.0"
    ),
    tags(
        (name = "catalog", description = "Loaded satellite catalog"),
        (name = "screening", description = "Conjunction screening and ground tracks")
    )
)]
pub struct ApiDoc;
