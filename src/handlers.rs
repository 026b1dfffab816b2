use crate::analytics_storage::AnalyticsStorage;
use crate::config::Config;
use crate::errors::AppError;
use crate::filters::EnrichmentFilters;
use crate::mock_source::ThrottlePolicy;
use crate::models::*;
use crate::pagination::{parse_param, PageRequest};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;

/// Page size of `/analytics/enrichments` when none is requested.
pub const ANALYTICS_DEFAULT_LIMIT: i64 = 20;
/// Number of workspaces in the ranking when none is requested.
pub const TOP_WORKSPACES_DEFAULT_LIMIT: i64 = 10;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: PgPool,
    /// Application configuration.
    pub config: Config,
    /// Fault injection for the simulated source.
    pub throttle: Arc<dyn ThrottlePolicy>,
}

impl AppState {
    pub fn storage(&self) -> AnalyticsStorage {
        AnalyticsStorage::new(self.db.clone())
    }
}

/// GET /health
///
/// Unauthenticated liveness probe; does not touch the database.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "OK",
            "timestamp": chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        })),
    )
}

/// GET /
///
/// Route directory and a hint of the auth scheme (never the key itself).
pub async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "name": "Driva Pipeline API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "enriquecimentos": "GET /people/v1/enrichments",
            "analytics_overview": "GET /analytics/overview",
            "analytics_enrichments": "GET /analytics/enrichments",
            "analytics_workspaces": "GET /analytics/workspaces/top",
            "health": "GET /health"
        },
        "auth": "Header: Authorization: Bearer <API_KEY>"
    }))
}

/// GET /analytics/overview
///
/// KPIs plus the status and size-category distributions.
pub async fn analytics_overview(
    State(state): State<Arc<AppState>>,
) -> Result<Json<OverviewResponse>, AppError> {
    tracing::debug!("GET /analytics/overview");

    let overview = state.storage().fetch_overview().await?;

    Ok(Json(overview))
}

/// GET /analytics/enrichments
///
/// Filtered page of `gold_enriquecimentos`, newest warehouse update first.
/// Pages past the end come back empty with accurate `meta`; unlike the
/// simulated source there is no upper bound check here.
pub async fn analytics_enrichments(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AnalyticsQuery>,
) -> Result<Json<Paginated<EnrichmentRecord>>, AppError> {
    tracing::debug!("GET /analytics/enrichments - params: {:?}", params);

    let request = PageRequest::from_params_at_least_first(
        params.page.as_deref(),
        params.limit.as_deref(),
        ANALYTICS_DEFAULT_LIMIT,
    );
    let filters = EnrichmentFilters::from_query(&params)?;

    let (meta, data) = state.storage().list_enrichments(&filters, request).await?;

    tracing::info!(
        "Served analytics page {}/{} ({} rows, {} filters)",
        meta.page,
        meta.total_pages,
        data.len(),
        filters.predicates().len()
    );

    Ok(Json(Paginated { meta, data }))
}

/// GET /analytics/workspaces/top
///
/// Ranking truncated to `limit`, in the view's order. No pagination metadata.
pub async fn top_workspaces(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LimitQuery>,
) -> Result<Json<TopWorkspacesResponse>, AppError> {
    let limit = top_workspaces_limit(params.limit.as_deref());
    tracing::debug!("GET /analytics/workspaces/top - limit: {}", limit);

    let data = state.storage().top_workspaces(limit).await?;

    Ok(Json(TopWorkspacesResponse { data }))
}

/// Ranking size: default when absent or not positive. Not capped, the view is
/// small.
pub fn top_workspaces_limit(raw: Option<&str>) -> i64 {
    parse_param(raw)
        .filter(|n| *n > 0)
        .unwrap_or(TOP_WORKSPACES_DEFAULT_LIMIT)
}
