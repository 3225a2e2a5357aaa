//! # solace_api
//!
//! HTTP front end for Solace: one page that lists stored entries and accepts
//! new submissions.

pub mod error;
pub mod handlers;
pub mod views;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use solace_core::completion::CompletionClient;
use solace_core::entries::EntryStore;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::handlers::entries;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Persistent entry store.
    pub store: EntryStore,
    /// Outbound chat-completion client.
    pub completion: Arc<CompletionClient>,
}

impl AppState {
    pub fn new(store: EntryStore, completion: CompletionClient) -> Self {
        Self {
            store,
            completion: Arc::new(completion),
        }
    }
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    let trace = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route(
            "/",
            get(entries::index_handler).post(entries::submit_handler),
        )
        .layer(trace)
        .with_state(state)
}
