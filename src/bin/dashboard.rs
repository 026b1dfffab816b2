//! Terminal dashboard polling the analytics API.
//!
//! Type `n` / `p` (or a page number) and Enter to move between pages.

use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use driva_analytics_api::api_client::ApiClient;
use driva_analytics_api::config::ClientConfig;
use driva_analytics_api::dashboard::{Dashboard, PageCommand};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dashboard=info,driva_analytics_api=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ClientConfig::from_env()?;
    let client = ApiClient::new(config.api_url.clone(), config.api_key.clone())?;
    let (tx, rx) = mpsc::channel(8);

    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let command = match line.trim() {
                "n" | "next" => PageCommand::Next,
                "p" | "prev" => PageCommand::Previous,
                other => match other.parse::<i64>() {
                    Ok(page) => PageCommand::GoTo(page),
                    Err(_) => continue,
                },
            };
            if tx.send(command).await.is_err() {
                break;
            }
        }
    });

    tracing::info!("Polling {} every {}s", config.api_url, config.dashboard_interval_secs);

    Dashboard::new(client)
        .run(
            Duration::from_secs(config.dashboard_interval_secs),
            rx,
            async {
                let _ = tokio::signal::ctrl_c().await;
            },
        )
        .await;

    Ok(())
}
