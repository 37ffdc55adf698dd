use std::sync::Arc;

use axum::{Router, http::HeaderName};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Access-control core.
pub mod guard;
pub mod models;
pub mod policy;
pub mod session;

// Screen route table (role-partitioned view trees).
pub mod routes;

// Runtime that applies guard decisions, and its notice sink.
pub mod navigator;
pub mod notifier;

// Ambient concerns and the HTTP rendition.
pub mod api;
pub mod config;
pub mod error;
pub mod handlers;

// --- Public Re-exports ---

pub use config::AppConfig;
pub use error::{ConfigError, NavigationError, RouteTableError};
pub use guard::Guard;
pub use navigator::{NavigationOutcome, Navigator, PendingRedirect};
pub use policy::RealmPolicy;
pub use routes::RouteTable;

/// ApiDoc
///
/// OpenAPI document for the portal's machine-facing endpoints, served at
/// `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(handlers::list_routes, handlers::navigate),
    components(
        schemas(
            models::Role, models::Session, models::RouteMetadata, models::Severity,
            models::Decision, models::Notice, models::NavigateRequest,
            models::NavigateResponse, models::ScreenView, models::NoticeView,
            models::RouteSummary,
        )
    ),
    tags(
        (name = "homeserve-portal", description = "Household services portal navigation API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single, immutable container shared by every request: configuration,
/// the compiled route table, and the guard built over them.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub routes: Arc<RouteTable>,
    pub guard: Arc<Guard>,
}

impl AppState {
    /// Compiles the route table, checks the realm mapping and the configured
    /// auth entry point against it, and builds the guard. Any structural
    /// defect aborts startup.
    pub fn new(config: AppConfig) -> Result<Self, RouteTableError> {
        let routes = routes::load_routes()?;
        let realms = RealmPolicy::default();
        realms.validate(&routes)?;
        realms.validate_auth_entry(&routes, &config.auth_entry_path)?;

        let guard = Guard::from_config(realms, &config);
        Ok(Self {
            config,
            routes: Arc::new(routes),
            guard: Arc::new(guard),
        })
    }
}

/// create_router
///
/// Assembles the API routes, the Swagger UI, and the screen fallback, then
/// applies the request-id, tracing, and CORS layers.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name used to correlate every log line of one request.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Base Router Assembly
    let base_router = Router::new()
        // Documentation: Swagger UI over the generated OpenAPI document.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Machine-facing endpoints. They evaluate decisions but never gate on them.
        .merge(api::api_routes())
        // Screens: every other path is a screen and goes through the guard
        // before anything is rendered.
        .fallback(handlers::render_screen)
        // The route table and guard are shared by every handler.
        .with_state(state);

    // 3. Observability and Correlation Layers (outermost first)
    base_router
        .layer(
            ServiceBuilder::new()
                // 3a. Request ID Generation: a fresh UUID for every request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // 3b. Request Tracing: one span per request, tagged with the request ID,
                // so guard decisions logged by the handlers can be traced back.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // 3c. Request ID Propagation: echoes x-request-id back to the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 4. CORS Layer (applied last, so preflights never reach the guard)
        .layer(cors)
}

/// trace_span_logger
///
/// Builds the per-request span so that every log line of one request carries
/// its `x-request-id`.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
