use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{BTreeSet, HashMap};
use std::ops::Bound;
use tracing::trace;
use visitlog_core::index::Result;
use visitlog_core::{Domain, DomainBatch, DomainIndex, TimeRange};

#[derive(Debug, Default)]
struct Entries {
    /// Ordered by score, then by name.
    by_time: BTreeSet<(u64, Domain)>,
    scores: HashMap<Domain, u64>,
}

/// In-memory implementation of [`DomainIndex`].
///
/// A score map keeps domains unique while an ordered set keyed by
/// `(score, domain)` serves range queries in `O(log n + k)`. Both live behind
/// one lock, so a batch is never observed half-applied.
#[derive(Debug, Default)]
pub struct InMemoryDomainIndex {
    entries: RwLock<Entries>,
}

impl InMemoryDomainIndex {
    /// Creates a new, empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new index with room for `capacity` domains.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(Entries {
                by_time: BTreeSet::new(),
                scores: HashMap::with_capacity(capacity),
            }),
        }
    }

    /// Number of distinct domains stored.
    pub fn len(&self) -> usize {
        self.entries.read().scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the score of `domain`, if stored.
    pub fn score(&self, domain: &Domain) -> Option<u64> {
        self.entries.read().scores.get(domain).copied()
    }
}

#[async_trait]
impl DomainIndex for InMemoryDomainIndex {
    async fn upsert_batch(&self, batch: &DomainBatch, at: u64) -> Result<usize> {
        if batch.is_empty() {
            return Ok(0);
        }

        let mut entries = self.entries.write();
        let mut written = 0;

        for domain in batch {
            match entries.scores.insert(domain.clone(), at) {
                Some(previous) if previous == at => {}
                Some(previous) => {
                    entries.by_time.remove(&(previous, domain.clone()));
                    entries.by_time.insert((at, domain.clone()));
                    written += 1;
                }
                None => {
                    entries.by_time.insert((at, domain.clone()));
                    written += 1;
                }
            }
        }

        trace!(written, domains = batch.len(), at, "upserted batch in memory");
        Ok(written)
    }

    async fn range_query(&self, range: TimeRange) -> Result<Vec<Domain>> {
        let entries = self.entries.read();

        // The empty name sorts before every stored domain.
        let lower = (range.min(), Domain::new_unchecked(""));
        let domains = entries
            .by_time
            .range::<(u64, Domain), _>((Bound::Included(lower), Bound::Unbounded))
            .take_while(|(score, _)| *score <= range.max())
            .map(|(_, domain)| domain.clone())
            .collect();

        Ok(domains)
    }
}
