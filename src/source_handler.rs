use crate::errors::AppError;
use crate::handlers::AppState;
use crate::mock_source::{self, DEFAULT_LIMIT};
use crate::models::{AnalyticsQuery, Paginated, SourceEnrichment};
use crate::pagination::PageRequest;
use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;

/// GET /people/v1/enrichments
///
/// Simulated upstream feed. May answer 429 at random (see
/// [`mock_source::ThrottlePolicy`]) and rejects pages outside
/// `[1, total_pages]` with 400. Filters other than `page`/`limit` are ignored.
pub async fn list_source_enrichments(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AnalyticsQuery>,
) -> Result<Json<Paginated<SourceEnrichment>>, AppError> {
    let request =
        PageRequest::from_params(params.page.as_deref(), params.limit.as_deref(), DEFAULT_LIMIT);
    tracing::debug!(
        "GET /people/v1/enrichments - page: {}, limit: {}",
        request.page,
        request.limit
    );

    let page = mock_source::serve_page(state.throttle.as_ref(), request)?;

    Ok(Json(page))
}
