use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::fmt;
use std::time::Duration;

use crate::models::{
    EnrichmentRecord, OverviewResponse, Paginated, SourceEnrichment, TopWorkspacesResponse,
};

/// Errors raised while talking to the analytics API.
#[derive(Debug)]
pub enum ClientError {
    /// Connection, timeout or body decoding failure.
    Transport(reqwest::Error),
    /// The API answered 429.
    Throttled { retry_after: u64 },
    /// Any other non-2xx answer.
    Status { status: u16, body: String },
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Transport(e) => write!(f, "Request failed: {}", e),
            ClientError::Throttled { retry_after } => {
                write!(f, "Throttled by API, retry after {}s", retry_after)
            }
            ClientError::Status { status, body } => write!(f, "API returned {}: {}", status, body),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ClientError::Transport(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Transport(err)
    }
}

/// Filters accepted by `GET /analytics/enrichments`.
#[derive(Debug, Clone, Default)]
pub struct EnrichmentFilterParams {
    pub id_workspace: Option<String>,
    pub status_processamento: Option<String>,
    pub data_inicio: Option<String>,
    pub data_fim: Option<String>,
}

impl EnrichmentFilterParams {
    fn append_to(&self, query: &mut Vec<(&'static str, String)>) {
        let pairs = [
            ("id_workspace", &self.id_workspace),
            ("status_processamento", &self.status_processamento),
            ("data_inicio", &self.data_inicio),
            ("data_fim", &self.data_fim),
        ];
        for (key, value) in pairs {
            if let Some(value) = value {
                query.push((key, value.clone()));
            }
        }
    }
}

/// Bearer-authenticated client for the analytics API and the simulated
/// source it hosts.
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl ApiClient {
    /// Creates a new `ApiClient`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Root of the API, without trailing slash.
    /// * `token` - The bearer token sent on every request.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET /analytics/overview
    pub async fn get_overview(&self) -> Result<OverviewResponse, ClientError> {
        self.get_json("/analytics/overview", &[]).await
    }

    /// GET /analytics/enrichments
    pub async fn get_enrichments(
        &self,
        page: i64,
        limit: i64,
        filters: &EnrichmentFilterParams,
    ) -> Result<Paginated<EnrichmentRecord>, ClientError> {
        let mut query = vec![("page", page.to_string()), ("limit", limit.to_string())];
        filters.append_to(&mut query);
        self.get_json("/analytics/enrichments", &query).await
    }

    /// GET /analytics/workspaces/top
    pub async fn get_top_workspaces(
        &self,
        limit: i64,
    ) -> Result<TopWorkspacesResponse, ClientError> {
        self.get_json("/analytics/workspaces/top", &[("limit", limit.to_string())])
            .await
    }

    /// GET /people/v1/enrichments
    pub async fn get_source_page(
        &self,
        page: i64,
        limit: i64,
    ) -> Result<Paginated<SourceEnrichment>, ClientError> {
        self.get_json(
            "/people/v1/enrichments",
            &[("page", page.to_string()), ("limit", limit.to_string())],
        )
        .await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("GET {} {:?}", url, query);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let body: serde_json::Value = response.json().await.unwrap_or_default();
            let retry_after = body
                .get("retry_after")
                .and_then(|v| v.as_u64())
                .unwrap_or(crate::mock_source::RETRY_AFTER_SECS);
            tracing::warn!("{} throttled, retry after {}s", path, retry_after);
            return Err(ClientError::Throttled { retry_after });
        }

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }
}
