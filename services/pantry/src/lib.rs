//! Pantry service library crate.
//!
//! # Purpose
//! Recipe and meal-planning HTTP service. Every resource is served by one
//! generic handler pipeline (`api::pipeline`) over typed data managers
//! (`store`), a best-effort change publisher (`publisher`) and an optional
//! search index (`search`).
//!
//! # Notes
//! The binary only loads configuration and calls [`build_state`] and
//! [`app::build_router`]; integration tests drive the same router.
pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod filter;
pub mod model;
pub mod observability;
pub mod publisher;
pub mod resource;
pub mod search;
pub mod store;
pub mod validation;

use crate::api::pipeline::PipelineSettings;
use crate::app::AppState;
use crate::auth::middleware::SessionResolver;
use crate::auth::token::SessionKeys;
use crate::config::PantryConfig;
use crate::store::Storage;
use std::sync::Arc;

/// Connects every backend named by `config` and assembles the shared state.
pub async fn build_state(config: &PantryConfig) -> anyhow::Result<AppState> {
    let storage = Storage::from_config(config).await?;
    let publisher = publisher::from_config(&config.events).await?;
    let search_index = search::from_config(&config.search)?;
    let keys = SessionKeys::new(
        config.session.issuer.clone(),
        config.session.signing_secret.as_bytes(),
    );
    tracing::info!(
        storage = storage.backend_name(),
        search = search_index.is_some(),
        topic = %config.events.data_changes_topic_name,
        "pantry state ready"
    );
    Ok(AppState {
        storage,
        publisher,
        search_index,
        session_resolver: Arc::new(SessionResolver {
            keys,
            cookie_name: config.session.cookie_name.clone(),
        }),
        pipeline: PipelineSettings {
            default_encoding: config.default_encoding,
            max_body_bytes: config.max_body_bytes,
        },
    })
}
