use std::time::Duration;
use visitlog_core::{Domain, DomainBatch, DomainIndex, StoreError, TimeRange};
use visitlog_storage::RedisDomainIndex;
use visitlog_test_infra::redis::{RedisServer, RedisServerConfig};

/// Test fixture that manages a Redis container using test-infra.
pub struct RedisTestContainer {
    redis: RedisServer,
    redis_url: String,
}

impl RedisTestContainer {
    /// Starts a new Redis container with a random available port.
    pub async fn start() -> Self {
        let redis = RedisServer::start(RedisServerConfig::default())
            .await
            .expect("Failed to start Redis server");
        let redis_url = redis.url().await.expect("Failed to get Redis url");

        Self { redis, redis_url }
    }

    pub async fn index(&self) -> RedisDomainIndex {
        RedisDomainIndex::connect(&self.redis_url, "domains")
            .await
            .expect("Failed to connect index")
    }

    pub async fn connection(&self) -> redis::aio::MultiplexedConnection {
        self.redis
            .connection()
            .await
            .expect("Failed to get Redis connection")
    }
}

fn domain(s: &str) -> Domain {
    Domain::new(s).unwrap()
}

fn batch(names: &[&str]) -> DomainBatch {
    names.iter().map(|n| domain(n)).collect()
}

fn range(min: u64, max: u64) -> TimeRange {
    TimeRange::new(min, max).unwrap()
}

#[tokio::test]
#[ignore = "requires a Docker daemon"]
async fn test_upsert_stores_scores() {
    let fixture = RedisTestContainer::start().await;
    let index = fixture.index().await;

    for timestamp in [1u64, 999] {
        for names in [["ya.ru", "python.org"], ["funbox.ru", "google.com"]] {
            index.upsert_batch(&batch(&names), timestamp).await.unwrap();

            let mut conn = fixture.connection().await;
            for name in names {
                let score = redis::cmd("ZSCORE")
                    .arg("domains")
                    .arg(name)
                    .query_async::<Option<f64>>(&mut conn)
                    .await
                    .unwrap();
                assert_eq!(score, Some(timestamp as f64));
            }
        }
    }
}

#[tokio::test]
#[ignore = "requires a Docker daemon"]
async fn test_upsert_overwrites_with_older_timestamp() {
    let fixture = RedisTestContainer::start().await;
    let index = fixture.index().await;

    index.upsert_batch(&batch(&["x.com"]), 5).await.unwrap();
    index.upsert_batch(&batch(&["x.com"]), 1).await.unwrap();

    assert_eq!(index.range_query(range(1, 1)).await.unwrap(), vec![domain("x.com")]);
    assert!(index.range_query(range(5, 5)).await.unwrap().is_empty());

    let mut conn = fixture.connection().await;
    let members = redis::cmd("ZCARD")
        .arg("domains")
        .query_async::<usize>(&mut conn)
        .await
        .unwrap();
    assert_eq!(members, 1);
}

#[tokio::test]
#[ignore = "requires a Docker daemon"]
async fn test_upsert_counts_created_and_changed() {
    let fixture = RedisTestContainer::start().await;
    let index = fixture.index().await;

    assert_eq!(index.upsert_batch(&batch(&["a.com", "b.com"]), 3).await.unwrap(), 2);
    assert_eq!(index.upsert_batch(&batch(&["a.com", "c.com"]), 3).await.unwrap(), 1);
    assert_eq!(index.upsert_batch(&batch(&["a.com"]), 4).await.unwrap(), 1);
    assert_eq!(index.upsert_batch(&DomainBatch::new(), 4).await.unwrap(), 0);
}

#[tokio::test]
#[ignore = "requires a Docker daemon"]
async fn test_range_query_is_inclusive_and_ordered() {
    let fixture = RedisTestContainer::start().await;
    let index = fixture.index().await;

    index.upsert_batch(&batch(&["d1.com"]), 5).await.unwrap();
    index.upsert_batch(&batch(&["d2.com"]), 10).await.unwrap();
    index.upsert_batch(&batch(&["d3.com"]), 15).await.unwrap();
    index.upsert_batch(&batch(&["b.com", "a.com"]), 15).await.unwrap();

    assert_eq!(
        index.range_query(range(5, 10)).await.unwrap(),
        vec![domain("d1.com"), domain("d2.com")]
    );
    assert!(index.range_query(range(11, 14)).await.unwrap().is_empty());
    assert_eq!(
        index.range_query(range(5, 15)).await.unwrap(),
        vec![
            domain("d1.com"),
            domain("d2.com"),
            domain("a.com"),
            domain("b.com"),
            domain("d3.com"),
        ]
    );
}

#[tokio::test]
#[ignore = "requires a Docker daemon"]
async fn test_custom_key_isolates_indexes() {
    let fixture = RedisTestContainer::start().await;
    let first = RedisDomainIndex::with_key(fixture.connection().await, "first:domains");
    let second = RedisDomainIndex::with_key(fixture.connection().await, "second:domains");

    first.upsert_batch(&batch(&["ya.ru"]), 1).await.unwrap();

    assert_eq!(first.range_query(range(0, 1)).await.unwrap(), vec![domain("ya.ru")]);
    assert!(second.range_query(range(0, 1)).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "requires a Docker daemon"]
async fn test_invalid_members_are_skipped() {
    let fixture = RedisTestContainer::start().await;
    let index = fixture.index().await;

    index.upsert_batch(&batch(&["ya.ru", "funbox.ru"]), 1).await.unwrap();

    let mut conn = fixture.connection().await;
    let _: usize = redis::cmd("ZADD")
        .arg("domains")
        .arg(0)
        .arg("")
        .arg(1)
        .arg("not a domain")
        .query_async(&mut conn)
        .await
        .unwrap();

    assert_eq!(
        index.range_query(range(0, 1)).await.unwrap(),
        vec![domain("funbox.ru"), domain("ya.ru")]
    );
    assert!(index.range_query(range(0, 0)).await.unwrap().is_empty());
}

async fn client_count(conn: &mut redis::aio::MultiplexedConnection) -> usize {
    let clients = redis::cmd("CLIENT")
        .arg("LIST")
        .query_async::<String>(conn)
        .await
        .unwrap();
    clients.lines().filter(|line| !line.is_empty()).count()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
#[ignore = "requires a Docker daemon"]
async fn test_close_releases_connection() {
    let fixture = RedisTestContainer::start().await;
    let mut observer = fixture.connection().await;

    let index = fixture.index().await;
    let connected = client_count(&mut observer).await;

    index.close();

    let observer = tokio::sync::Mutex::new(observer);
    awaitility::at_most(Duration::from_secs(5))
        .poll_interval(Duration::from_millis(50))
        .until_async(|| async { client_count(&mut *observer.lock().await).await < connected })
        .await;
}

#[tokio::test]
async fn test_connect_fails_fast_without_server() {
    // Nothing listens on port 1.
    let err = RedisDomainIndex::connect("redis://127.0.0.1:1/0", "domains")
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Unavailable(_)), "unexpected error: {err:?}");
}

#[tokio::test]
async fn test_connect_rejects_malformed_url() {
    let err = RedisDomainIndex::connect("not-a-redis-url", "domains")
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Unavailable(_)));
}
