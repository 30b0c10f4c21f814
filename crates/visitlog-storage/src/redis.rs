use async_trait::async_trait;
use tracing::{debug, trace, warn};
use visitlog_core::index::Result;
use visitlog_core::{Domain, DomainBatch, DomainIndex, StoreError, TimeRange};

/// Key of the sorted set holding all visited domains.
pub const DEFAULT_KEY: &str = "domains";

/// A Redis-backed implementation of [`DomainIndex`].
///
/// Domains are members of a single sorted set whose score is the Unix
/// second of the last visit. A batch is written with one multi-member
/// `ZADD`, which Redis applies atomically.
#[derive(Debug, Clone)]
pub struct RedisDomainIndex {
    conn: redis::aio::MultiplexedConnection,
    key: String,
}

fn map_redis_error(operation: &str, err: redis::RedisError) -> StoreError {
    let message = format!("{operation}: {err}");
    if err.is_timeout() {
        StoreError::Timeout(message)
    } else if err.is_io_error() || err.is_connection_dropped() || err.is_connection_refusal() {
        StoreError::Unavailable(message)
    } else {
        StoreError::Operation(message)
    }
}

impl RedisDomainIndex {
    /// Creates a new index over the default `domains` key.
    ///
    /// # Arguments
    ///
    /// * `conn` - A multiplexed Redis connection
    pub fn new(conn: redis::aio::MultiplexedConnection) -> Self {
        Self::with_key(conn, DEFAULT_KEY)
    }

    /// Creates a new index over a custom sorted-set key.
    ///
    /// # Arguments
    ///
    /// * `conn` - A multiplexed Redis connection
    /// * `key` - Key of the sorted set (e.g. "myapp:domains")
    pub fn with_key(conn: redis::aio::MultiplexedConnection, key: impl Into<String>) -> Self {
        Self {
            conn,
            key: key.into(),
        }
    }

    /// Opens a connection to `url` and verifies it with `PING`.
    ///
    /// # Arguments
    ///
    /// * `url` - Connection URI, e.g. `redis://127.0.0.1:6379/0`
    /// * `key` - Key of the sorted set
    pub async fn connect(url: &str, key: impl Into<String>) -> Result<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| StoreError::Unavailable(format!("invalid redis url: {e}")))?;

        let mut conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| map_redis_error("failed to connect to Redis", e))?;

        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .map_err(|e| map_redis_error("failed to ping Redis", e))?;

        let index = Self::with_key(conn, key);
        debug!(key = %index.key, "Connected to redis");
        Ok(index)
    }

    /// Returns the sorted-set key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Drops this handle's connection.
    ///
    /// The multiplexed connection shuts down once its last clone is dropped;
    /// the caller is expected to hold the only one.
    pub fn close(self) {
        let Self { conn, key } = self;
        drop(conn);
        debug!(key = %key, "Redis connection closed");
    }
}

#[async_trait]
impl DomainIndex for RedisDomainIndex {
    async fn upsert_batch(&self, batch: &DomainBatch, at: u64) -> Result<usize> {
        if batch.is_empty() {
            return Ok(0);
        }
        trace!(domains = batch.len(), at, "Adding domains to Redis");

        let members: Vec<(u64, &str)> = batch.iter().map(|d| (at, d.as_str())).collect();

        // CH makes ZADD count updated scores as well as new members.
        let mut conn = self.conn.clone();
        match redis::cmd("ZADD")
            .arg(&self.key)
            .arg("CH")
            .arg(&members)
            .query_async::<usize>(&mut conn)
            .await
        {
            Ok(written) => {
                debug!(written, domains = batch.len(), "Added domains");
                Ok(written)
            }
            Err(e) => {
                warn!(error = %e, domains = batch.len(), "Redis error on ZADD");
                Err(map_redis_error("failed to add domains", e))
            }
        }
    }

    async fn range_query(&self, range: TimeRange) -> Result<Vec<Domain>> {
        trace!(%range, "Fetching domains from Redis");

        let mut conn = self.conn.clone();
        let members = match redis::cmd("ZRANGEBYSCORE")
            .arg(&self.key)
            .arg(range.min())
            .arg(range.max())
            .query_async::<Vec<String>>(&mut conn)
            .await
        {
            Ok(members) => members,
            Err(e) => {
                warn!(error = %e, %range, "Redis error on ZRANGEBYSCORE");
                return Err(map_redis_error("failed to get domains", e));
            }
        };

        // The key may hold members written by older producers, e.g. "".
        let domains = members
            .into_iter()
            .filter_map(|member| match Domain::new(member.as_str()) {
                Ok(domain) => Some(domain),
                Err(e) => {
                    warn!(key = %self.key, %member, error = %e, "Skipping invalid member");
                    None
                }
            })
            .collect();

        Ok(domains)
    }
}
