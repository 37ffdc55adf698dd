use homeserve_portal::{
    AppState,
    config::{AppConfig, Env},
    create_router,
};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Entry point: configuration, logging, route table validation, HTTP server.
#[tokio::main]
async fn main() {
    // 1. Configuration (fail-fast)
    dotenv::dotenv().ok();
    let config = AppConfig::load().expect("FATAL: invalid portal configuration");

    // 2. Logging filter. RUST_LOG wins over the local defaults.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "homeserve_portal=debug,tower_http=info,axum=trace".into());

    // 3. Log format per environment: pretty locally, JSON in production.
    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Portal starting in {:?} mode", config.env);

    // 4. Route table and guard. A table or auth entry that falls outside the realm model aborts startup.
    let bind_addr = config.bind_addr.clone();
    let app_state = AppState::new(config).expect("FATAL: route table failed validation");
    tracing::info!(
        routes = app_state.routes.entries().len(),
        delay_ms = u64::try_from(app_state.guard.redirect_delay().as_millis()).unwrap_or(u64::MAX),
        "Route table validated."
    );

    // 5. Router and server.
    let app = create_router(app_state);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .expect("FATAL: failed to bind listener");

    tracing::info!("Listening on {}", bind_addr);
    tracing::info!("API Documentation (Swagger UI) available at: http://{}/swagger-ui", bind_addr);

    axum::serve(listener, app).await.expect("FATAL: server error");
}
