use crate::clock::Clock;
use crate::domain::{Domain, DomainBatch};
use crate::error::StoreError;
use crate::index::DomainIndex;
use crate::range::TimeRange;
use std::sync::Arc;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, trace};

/// Records visited links and answers history queries.
///
/// Writes are fire-and-forget: [`record_links`](Self::record_links) schedules
/// the upsert on a tracked background task and returns before it runs.
/// A query issued right after a write may not observe it, and two batches
/// touching the same domain may land in either order. [`drain`](Self::drain)
/// waits for every scheduled write and is meant for shutdown.
#[derive(Clone)]
pub struct VisitService {
    index: Arc<dyn DomainIndex>,
    clock: Arc<dyn Clock>,
    writes: TaskTracker,
}

impl VisitService {
    pub fn new(index: Arc<dyn DomainIndex>, clock: Arc<dyn Clock>) -> Self {
        Self {
            index,
            clock,
            writes: TaskTracker::new(),
        }
    }

    /// Extracts the domains of `links` and schedules them to be stored with
    /// the current time.
    ///
    /// The clock is read once for the whole batch. Returns the number of
    /// distinct domains scheduled, which is `0` when no link had a
    /// registrable domain; nothing is scheduled in that case.
    ///
    /// Must be called from within a tokio runtime.
    pub fn record_links<I, S>(&self, links: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let batch = DomainBatch::from_links(links);
        if batch.is_empty() {
            trace!("no registrable domains in submitted links");
            return 0;
        }

        let at = self.clock.unix_seconds();
        let scheduled = batch.len();
        let index = Arc::clone(&self.index);

        self.writes.spawn(async move {
            match index.upsert_batch(&batch, at).await {
                Ok(written) => debug!(written, domains = batch.len(), at, "Added domains"),
                Err(e) => {
                    error!(error = %e, domains = batch.len(), at, "Failed to add domains")
                }
            }
        });

        debug!(domains = scheduled, at, "scheduled domain batch");
        scheduled
    }

    /// Returns the domains last visited within `range`.
    pub async fn visited_between(&self, range: TimeRange) -> Result<Vec<Domain>, StoreError> {
        trace!(%range, "querying visited domains");
        let domains = self.index.range_query(range).await?;
        debug!(%range, found = domains.len(), "queried visited domains");
        Ok(domains)
    }

    /// Number of scheduled writes that have not finished yet.
    pub fn pending_writes(&self) -> usize {
        self.writes.len()
    }

    /// Stops accepting new writes and waits for the scheduled ones.
    pub async fn drain(&self) {
        self.writes.close();
        debug!(pending = self.writes.len(), "draining scheduled writes");
        self.writes.wait().await;
    }
}
