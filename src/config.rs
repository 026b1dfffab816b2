use serde::Deserialize;

/// Server configuration for the analytics API.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub api_key: String,
    pub db_max_connections: u32,
    /// Chance (0.0..=1.0) that the simulated source answers 429.
    pub source_throttle_probability: f64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            database_url: match std::env::var("DATABASE_URL") {
                Ok(url) => {
                    if url.trim().is_empty() {
                        anyhow::bail!("DATABASE_URL cannot be empty");
                    }
                    if !url.starts_with("postgresql://") && !url.starts_with("postgres://") {
                        anyhow::bail!("DATABASE_URL must start with postgresql:// or postgres://");
                    }
                    url
                }
                Err(_) => database_url_from_parts(),
            },
            port: std::env::var("API_PORT")
                .or_else(|_| std::env::var("PORT"))
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("API_PORT must be a valid number between 1-65535"))?,
            api_key: std::env::var("API_KEY")
                .map_err(|_| anyhow::anyhow!("API_KEY environment variable required"))
                .and_then(|key| {
                    if key.trim().is_empty() {
                        anyhow::bail!("API_KEY cannot be empty");
                    }
                    Ok(key)
                })?,
            db_max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse::<u32>()
                .map_err(|_| anyhow::anyhow!("DB_MAX_CONNECTIONS must be a positive number"))
                .and_then(|n| non_zero("DB_MAX_CONNECTIONS", n))?,
            source_throttle_probability: std::env::var("SOURCE_THROTTLE_PROBABILITY")
                .unwrap_or_else(|_| "0.05".to_string())
                .parse::<f64>()
                .map_err(|_| anyhow::anyhow!("SOURCE_THROTTLE_PROBABILITY must be a number"))
                .and_then(|p| {
                    if !(0.0..=1.0).contains(&p) {
                        anyhow::bail!("SOURCE_THROTTLE_PROBABILITY must be between 0 and 1");
                    }
                    Ok(p)
                })?,
        };

        // Never log the key or the password
        tracing::debug!(
            "Database URL: {}...",
            &config.database_url[..20.min(config.database_url.len())]
        );
        tracing::debug!("Server Port: {}", config.port);
        tracing::debug!(
            "Source throttle probability: {}",
            config.source_throttle_probability
        );

        Ok(config)
    }
}

/// Rejects zero for counts and intervals (tokio intervals and pools need at
/// least one).
fn non_zero<T: PartialEq + Default>(name: &str, value: T) -> anyhow::Result<T> {
    if value == T::default() {
        anyhow::bail!("{} must be greater than zero", name);
    }
    Ok(value)
}

/// Builds a connection URL from the discrete `DB_*` variables.
fn database_url_from_parts() -> String {
    let host = std::env::var("DB_HOST").unwrap_or_else(|_| "localhost".to_string());
    let port = std::env::var("DB_PORT").unwrap_or_else(|_| "5432".to_string());
    let user = std::env::var("DB_USER").unwrap_or_else(|_| "driva_user".to_string());
    let password =
        std::env::var("DB_PASSWORD").unwrap_or_else(|_| "driva_password_secure".to_string());
    let name = std::env::var("DB_NAME").unwrap_or_else(|_| "driva_warehouse".to_string());

    format!("postgres://{}:{}@{}:{}/{}", user, password, host, port, name)
}

/// Settings shared by the client binaries (`ingest`, `dashboard`).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: String,
    pub api_key: String,
    pub ingest_interval_secs: u64,
    pub dashboard_interval_secs: u64,
}

impl ClientConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let api_url = std::env::var("API_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string())
            .trim_end_matches('/')
            .to_string();
        if !api_url.starts_with("http://") && !api_url.starts_with("https://") {
            anyhow::bail!("API_URL must start with http:// or https://");
        }

        Ok(Self {
            api_url,
            api_key: std::env::var("API_KEY")
                .map_err(|_| anyhow::anyhow!("API_KEY environment variable required"))?,
            ingest_interval_secs: std::env::var("INGEST_INTERVAL_SECS")
                .unwrap_or_else(|_| "300".to_string())
                .parse::<u64>()
                .map_err(|_| anyhow::anyhow!("INGEST_INTERVAL_SECS must be a number"))
                .and_then(|n| non_zero("INGEST_INTERVAL_SECS", n))?,
            dashboard_interval_secs: std::env::var("DASHBOARD_INTERVAL_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse::<u64>()
                .map_err(|_| anyhow::anyhow!("DASHBOARD_INTERVAL_SECS must be a number"))
                .and_then(|n| non_zero("DASHBOARD_INTERVAL_SECS", n))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_counts_and_intervals_are_rejected() {
        let err = non_zero("INGEST_INTERVAL_SECS", 0u64).unwrap_err();
        assert_eq!(err.to_string(), "INGEST_INTERVAL_SECS must be greater than zero");
        assert!(non_zero("DASHBOARD_INTERVAL_SECS", 0u64).is_err());
        assert!(non_zero("DB_MAX_CONNECTIONS", 0u32).is_err());
    }

    #[test]
    fn positive_values_pass_through() {
        assert_eq!(non_zero("INGEST_INTERVAL_SECS", 300u64).unwrap(), 300);
        assert_eq!(non_zero("DB_MAX_CONNECTIONS", 10u32).unwrap(), 10);
    }
}
