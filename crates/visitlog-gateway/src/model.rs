mod visits;

pub use visits::{StatusResponse, VisitedDomainsQuery, VisitedDomainsResponse, VisitedLinksRequest};
