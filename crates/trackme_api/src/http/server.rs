use crate::domain::TrackingEventService;
use crate::http::{list_locations, save_location, track_click, upload_photo};
use anyhow::Context;
use axum::extract::DefaultBodyLimit;
use axum::http::{header, Method};
use axum::routing::get;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

/// Shared handler state
pub struct AppState {
    pub tracking_event_service: Arc<TrackingEventService>,
}

/// CORS configuration for the HTTP server.
#[derive(Debug, Clone)]
pub struct CorsConfig {
    /// Allowed origins. `["*"]` allows all origins.
    pub allowed_origins: Vec<String>,
    /// Max age for CORS preflight cache in seconds.
    pub max_age_secs: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["*".to_string()],
            max_age_secs: 3600,
        }
    }
}

impl CorsConfig {
    /// Parse comma-separated origins; an empty list allows all origins.
    pub fn from_comma_separated(origins: &str) -> Self {
        let allowed_origins: Vec<String> = origins
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Self {
            allowed_origins: if allowed_origins.is_empty() {
                vec!["*".to_string()]
            } else {
                allowed_origins
            },
            ..Default::default()
        }
    }
}

/// Configuration for the HTTP server.
#[derive(Debug, Clone)]
pub struct HttpServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_config: CorsConfig,
    /// Upper bound for request bodies, photo uploads included.
    pub max_upload_bytes: usize,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            cors_config: CorsConfig::default(),
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

fn build_cors_layer(config: &CorsConfig) -> CorsLayer {
    let allow_origin = if config.allowed_origins.iter().any(|origin| origin == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(
            config
                .allowed_origins
                .iter()
                .filter_map(|origin| origin.parse().ok()),
        )
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(Duration::from_secs(config.max_age_secs))
}

async fn health() -> &'static str {
    "ok"
}

/// Build the trackme router with CORS, tracing and body limit layers.
pub fn build_router(service: Arc<TrackingEventService>, config: &HttpServerConfig) -> Router {
    let state = Arc::new(AppState {
        tracking_event_service: service,
    });

    Router::new()
        .route("/locations", get(list_locations).post(save_location))
        .route("/locations/photos", axum::routing::post(upload_photo))
        .route("/click", get(track_click))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(build_cors_layer(&config.cors_config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until the token is cancelled, then drain in-flight requests.
pub async fn run_http_server(
    config: HttpServerConfig,
    service: Arc<TrackingEventService>,
    cancellation_token: CancellationToken,
) -> Result<(), anyhow::Error> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind http server to {}", addr))?;

    info!(address = %addr, "http server listening");

    let router = build_router(service, &config);

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        cancellation_token.cancelled().await;
        debug!("http server shutdown signal received");
    })
    .await
    .context("http server error")?;

    debug!("http server stopped gracefully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_from_comma_separated() {
        let config = CorsConfig::from_comma_separated("https://a.example, https://b.example,");
        assert_eq!(
            config.allowed_origins,
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );

        let config = CorsConfig::from_comma_separated("  ");
        assert_eq!(config.allowed_origins, vec!["*".to_string()]);
    }

    #[test]
    fn test_http_server_config_default() {
        let config = HttpServerConfig::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
    }
}
