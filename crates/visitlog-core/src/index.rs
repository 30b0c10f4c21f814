use crate::domain::{Domain, DomainBatch};
use crate::error::StoreError;
use crate::range::TimeRange;
use async_trait::async_trait;

/// Result type for index operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// A time-ordered index of domains keyed by their last visit.
///
/// The index behaves as a sorted set: each domain appears at most once and
/// carries a single score, the Unix second it was last seen. Writing a
/// domain again replaces its score unconditionally, so a later write with
/// an older timestamp moves the domain back in time.
#[async_trait]
pub trait DomainIndex: Send + Sync + 'static {
    /// Sets the score of every domain in `batch` to `at`.
    ///
    /// Domains are created when absent and overwritten when present. The
    /// batch is applied as one atomic unit. Returns the number of records
    /// that were created or changed; an empty batch writes nothing and
    /// returns `0`.
    async fn upsert_batch(&self, batch: &DomainBatch, at: u64) -> Result<usize>;

    /// Returns the domains whose score lies in `range`, both bounds inclusive.
    ///
    /// Results are ordered by ascending score, ties by domain name. No match
    /// is `Ok(vec![])`.
    async fn range_query(&self, range: TimeRange) -> Result<Vec<Domain>>;
}
