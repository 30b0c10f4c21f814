use crate::error::{AppError, Result};
use crate::model::{StatusResponse, VisitedDomainsQuery, VisitedDomainsResponse, VisitedLinksRequest};
use crate::state::AppState;
use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use tracing::debug;
use visitlog_core::TimeRange;

/// Records the domains of the submitted links.
///
/// The visit time is the time the request is handled. The write runs in the
/// background, so `ok` only means the batch was accepted.
pub async fn visited_links_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<StatusResponse>> {
    let request: VisitedLinksRequest =
        serde_json::from_slice(&body).map_err(|e| AppError::BadRequest(e.to_string()))?;

    let scheduled = state.visits().record_links(&request.links);
    debug!(links = request.links.len(), domains = scheduled, "accepted visited links");

    Ok(Json(StatusResponse::ok()))
}

/// Lists the distinct domains last visited within `[from, to]`.
pub async fn visited_domains_handler(
    State(state): State<AppState>,
    query: std::result::Result<Query<VisitedDomainsQuery>, QueryRejection>,
) -> Result<Json<VisitedDomainsResponse>> {
    let Query(query) = query.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let range = time_range(&query)?;

    let domains = state.visits().visited_between(range).await?;
    Ok(Json(VisitedDomainsResponse::ok(domains)))
}

fn time_range(query: &VisitedDomainsQuery) -> Result<TimeRange> {
    let from = parse_bound("from", query.from.as_deref())?;
    let to = parse_bound("to", query.to.as_deref())?;
    Ok(TimeRange::new(from, to)?)
}

fn parse_bound(name: &str, value: Option<&str>) -> Result<u64> {
    let value =
        value.ok_or_else(|| AppError::BadRequest(format!("missing query parameter '{name}'")))?;

    value.trim().parse::<u64>().map_err(|e| {
        AppError::BadRequest(format!("invalid value for '{name}': '{value}' ({e})"))
    })
}
