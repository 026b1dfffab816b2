//! Periodic ingestion job: pulls the simulated source into the warehouse.

use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use driva_analytics_api::api_client::ApiClient;
use driva_analytics_api::config::{ClientConfig, Config};
use driva_analytics_api::db::Database;
use driva_analytics_api::ingestion::{Ingestor, WarehouseWriter};

/// Runs one ingestion cycle every `INGEST_INTERVAL_SECS` until Ctrl-C.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ingest=info,driva_analytics_api=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let client_config = ClientConfig::from_env()?;

    let db = Database::new(&config.database_url, 2).await?;
    let client = ApiClient::new(client_config.api_url.clone(), client_config.api_key.clone())?;
    let ingestor = Ingestor::new(client, WarehouseWriter::new(db.pool.clone()));

    tracing::info!(
        "Starting ingestion every {}s from {}",
        client_config.ingest_interval_secs,
        client_config.api_url
    );

    ingestor
        .run(
            Duration::from_secs(client_config.ingest_interval_secs),
            async {
                let _ = tokio::signal::ctrl_c().await;
            },
        )
        .await;

    db.close().await;
    Ok(())
}
