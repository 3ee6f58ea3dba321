//! OpenAPI documentation generation using utoipa
//!
//! Handler functions carry `#[utoipa::path]` annotations; this module
//! collects them into the specification served next to the Swagger UI.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Lumascope API",
        description = "Per-channel image histogram and brightness statistics \
                       service. The analysis step caches images as a graph \
                       executes; this API serves their histogram reports and \
                       downscaled previews on demand."
    ),
    paths(
        crate::web::handlers::histogram::generate_histogram,
        crate::web::handlers::health::health_check,
    ),
    components(schemas(
        crate::web::responses::HistogramResponse,
        crate::web::responses::ErrorResponse,
        crate::web::responses::HealthResponse,
        crate::models::ChannelHistograms,
        crate::models::ChannelStatsSet,
        crate::models::ChannelStats,
    )),
    tags(
        (name = "histogram", description = "Histogram retrieval"),
        (name = "health", description = "Service health"),
    )
)]
pub struct ApiDoc;
