//! Driva Analytics API Library
//!
//! Read-only reporting API over the `gold_enriquecimentos` warehouse table and
//! its aggregate views, a simulated upstream enrichment feed, and the two
//! clients that consume them (the ingestion job and the polling dashboard).
//!
//! # Modules
//!
//! - `analytics_storage`: Queries against the gold table and views.
//! - `api_client`: Bearer-authenticated HTTP client.
//! - `auth`: Bearer-token middleware.
//! - `config`: Configuration management.
//! - `dashboard`: Polling dashboard state and loop.
//! - `db`: Database connection and pool management.
//! - `errors`: Error handling types.
//! - `filters`: Optional filters and their SQL predicates.
//! - `handlers`: Analytics and introspection HTTP handlers.
//! - `ingestion`: Source → bronze → gold loader.
//! - `mock_source`: Simulated enrichment feed and fault injection.
//! - `models`: Core data models.
//! - `pagination`: Page arithmetic.
//! - `routes`: Router assembly.
//! - `source_handler`: HTTP handler of the simulated feed.

pub mod analytics_storage;
pub mod api_client;
pub mod auth;
pub mod config;
pub mod dashboard;
pub mod db;
pub mod errors;
pub mod filters;
pub mod handlers;
pub mod ingestion;
pub mod mock_source;
pub mod models;
pub mod pagination;
pub mod routes;
pub mod source_handler;
