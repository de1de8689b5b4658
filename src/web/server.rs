use std::io;
use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::ingest::UpstreamClient;
use crate::wind::{OpenMeteoClient, WindResolver};

use super::api::{debug, telemetry, wind};
use super::api_doc::ApiDoc;
use super::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub upstream: UpstreamClient,
    pub wind: Arc<WindResolver<OpenMeteoClient>>,
}

pub async fn run_server(config: Config) -> io::Result<()> {
    let bind_addr = config.web.bind.clone();

    let upstream = UpstreamClient::new(&config.upstream)
        .map_err(|e| io::Error::other(e.to_string()))?;
    let wind_client = OpenMeteoClient::new(&config.wind)
        .map_err(|e| io::Error::other(e.to_string()))?;

    let state = AppState {
        config: Arc::new(config),
        upstream,
        wind: Arc::new(WindResolver::new(wind_client)),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/api/telemetry", get(telemetry::telemetry))
        .route("/api/wind", get(wind::wind))
        .route("/api/wind/tracks", get(wind::track_winds))
        .route("/api/debug/hour", get(debug::debug_hour))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    log::info!("Starting server on {}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await
}
