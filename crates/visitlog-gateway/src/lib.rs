//! HTTP gateway of the visitlog service.
//!
//! Exposes `POST /visited_links` to record visits and `GET /visited_domains`
//! to query them, on top of a [`visitlog_core::VisitService`].

pub mod app;
pub mod cli;
pub mod error;
pub mod handlers;
pub mod model;
pub mod server;
pub mod state;

pub use app::App;
pub use state::AppState;
