use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers::{health_handler, visited_domains_handler, visited_links_handler};
use crate::state::AppState;

pub struct App {}

impl App {
    pub fn router(state: AppState) -> Router {
        Router::new()
            .route("/health", get(health_handler))
            .route("/visited_links", post(visited_links_handler))
            .route("/visited_domains", get(visited_domains_handler))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }
}
