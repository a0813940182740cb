mod config;

use anyhow::Context;
use common::postgres::{PostgresClient, PostgresConfig, PostgresTrackingEventRepository};
use common::s3::{S3Config, S3PhotoStore};
use common::telegram::{TelegramConfig, TelegramNotifier};
use common::telemetry::{init_telemetry, shutdown_telemetry, TelemetryConfig, TelemetryProviders};
use crate::config::ServiceConfig;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use trackme_api::domain::{NotificationDispatcher, TrackingEventService};
use trackme_api::http::{CorsConfig, HttpServerConfig};
use trackme_api::trackme_api::TrackmeApi;
use trackme_runner::Runner;

#[tokio::main]
async fn main() {
    let config = match ServiceConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let telemetry_providers: Option<TelemetryProviders> = match init_telemetry(&TelemetryConfig {
        service_name: config.otel_service_name.clone(),
        otel_endpoint: config.otel_endpoint.clone(),
        otel_enabled: config.otel_enabled,
        log_level: config.log_level.clone(),
    }) {
        Ok(providers) => providers,
        Err(e) => {
            eprintln!("Failed to initialize telemetry: {}", e);
            std::process::exit(1);
        }
    };

    info!(
        otel_enabled = config.otel_enabled,
        http_port = config.http_port,
        "Starting trackme service"
    );

    let service = match build_tracking_event_service(&config).await {
        Ok(service) => Arc::new(service),
        Err(e) => {
            error!(error = %format!("{:#}", e), "Failed to initialize dependencies");
            shutdown_telemetry(telemetry_providers);
            std::process::exit(1);
        }
    };

    let trackme_api = TrackmeApi::new(
        service,
        HttpServerConfig {
            host: config.http_host.clone(),
            port: config.http_port,
            cors_config: CorsConfig::from_comma_separated(&config.cors_allowed_origins),
            max_upload_bytes: config.max_upload_bytes,
        },
    );

    Runner::new()
        .with_named_process("trackme_api", trackme_api.into_runner_process())
        .with_closer(move || async move {
            info!("Running cleanup tasks...");
            shutdown_telemetry(telemetry_providers);
            Ok(())
        })
        .with_closer_timeout(Duration::from_secs(10))
        .run()
        .await;
}

async fn build_tracking_event_service(
    config: &ServiceConfig,
) -> anyhow::Result<TrackingEventService> {
    let postgres_client = PostgresClient::new(&PostgresConfig {
        url: config.postgres_url.clone(),
        database: config.postgres_database.clone(),
        max_pool_size: config.postgres_max_pool_size,
        operation_timeout_secs: config.storage_timeout_secs,
    })?;

    postgres_client
        .connect_with_retry(
            config.startup_retry_attempts,
            Duration::from_millis(config.startup_retry_backoff_ms),
        )
        .await?;
    postgres_client.ensure_schema().await?;
    debug!(database = %config.postgres_database, "postgres ready");

    let photo_store = S3PhotoStore::new(
        S3Config {
            region: config.s3_region.clone(),
            bucket: config.s3_bucket.clone(),
            access_key_id: config.s3_access_key_id.clone(),
            secret_access_key: config.s3_secret_access_key.clone(),
            endpoint: config.s3_endpoint.clone(),
        },
        Duration::from_secs(config.storage_timeout_secs),
    )?;

    let notifier = TelegramNotifier::new(TelegramConfig {
        bot_token: config.telegram_bot_token.clone(),
        chat_id: config.telegram_chat_id.clone(),
        api_base_url: config.telegram_api_base_url.clone(),
        timeout_secs: config.telegram_timeout_secs,
    })
    .context("failed to create telegram notifier")?;

    if !notifier.is_configured() {
        warn!("Telegram credentials not set; notifications will be dropped");
    }

    Ok(TrackingEventService::new(
        Arc::new(PostgresTrackingEventRepository::new(postgres_client)),
        Arc::new(photo_store),
        NotificationDispatcher::new(Arc::new(notifier)),
    ))
}
