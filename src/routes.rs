//! Route table shared by the server binary and the router tests.

use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

use crate::auth::require_bearer;
use crate::handlers::{self, AppState};
use crate::source_handler;

/// Every route is a GET; anything bigger than this is not a legitimate body.
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Full application without extra hardening on the protected routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    build_router_with(state, |protected| protected)
}

/// Full application; `harden` wraps the protected routes (main adds the
/// per-IP rate limiter there, which needs real peer addresses).
pub fn build_router_with<F>(state: Arc<AppState>, harden: F) -> Router
where
    F: FnOnce(Router<Arc<AppState>>) -> Router<Arc<AppState>>,
{
    let protected_routes = Router::new()
        .route(
            "/people/v1/enrichments",
            get(source_handler::list_source_enrichments),
        )
        .route("/analytics/overview", get(handlers::analytics_overview))
        .route("/analytics/enrichments", get(handlers::analytics_enrichments))
        .route("/analytics/workspaces/top", get(handlers::top_workspaces))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_bearer,
        ))
        .layer(ServiceBuilder::new().layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES)));

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .merge(harden(protected_routes))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
