use serde::{Deserialize, Serialize};
use visitlog_core::Domain;

const OK: &str = "ok";

/// Body of `POST /visited_links`. Unknown fields are ignored.
#[derive(Debug, Deserialize)]
pub struct VisitedLinksRequest {
    pub links: Vec<String>,
}

/// Query of `GET /visited_domains`.
///
/// Bounds are kept as raw strings so that missing and malformed values
/// produce the service's own error body.
#[derive(Debug, Default, Deserialize)]
pub struct VisitedDomainsQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

impl StatusResponse {
    pub fn ok() -> Self {
        Self { status: OK }
    }
}

#[derive(Debug, Serialize)]
pub struct VisitedDomainsResponse {
    pub status: &'static str,
    pub domains: Vec<Domain>,
}

impl VisitedDomainsResponse {
    pub fn ok(domains: Vec<Domain>) -> Self {
        Self { status: OK, domains }
    }
}
