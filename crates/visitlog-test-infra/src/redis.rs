use crate::{Result, TestInfraError};
use std::time::Duration;
use testcontainers::core::{IntoContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, GenericImage, ImageExt};
use typed_builder::TypedBuilder;

const REDIS_PORT: u16 = 6379;

/// Settings for a disposable Redis server.
#[derive(Debug, Clone, TypedBuilder)]
pub struct RedisServerConfig {
    /// Tag of the `redis` image.
    #[builder(default = "8.6.0".to_string())]
    pub tag: String,

    /// Logical database used in [`RedisServer::url`].
    #[builder(default = 0)]
    pub database: u8,

    /// PING attempts made before the server is considered unusable.
    #[builder(default = 20)]
    pub ready_attempts: u32,
}

impl Default for RedisServerConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Test fixture for a single Redis server.
///
/// The container is removed when the fixture is dropped.
pub struct RedisServer {
    container: ContainerAsync<GenericImage>,
    config: RedisServerConfig,
}

impl RedisServer {
    /// Starts a Redis container and waits until it answers `PING`.
    pub async fn start(config: RedisServerConfig) -> Result<Self> {
        let container = GenericImage::new("redis", config.tag.as_str())
            .with_exposed_port(REDIS_PORT.tcp())
            .with_wait_for(WaitFor::message_on_stdout("Ready to accept connections"))
            .with_startup_timeout(Duration::from_secs(60))
            .start()
            .await?;

        let server = Self { container, config };
        server.wait_until_ready().await?;
        Ok(server)
    }

    pub async fn host(&self) -> Result<String> {
        let host = self.container.get_host().await?.to_string();

        Ok(match host.as_str() {
            "localhost" => String::from("127.0.0.1"),
            _ => host,
        })
    }

    pub async fn port(&self) -> Result<u16> {
        Ok(self.container.get_host_port_ipv4(REDIS_PORT).await?)
    }

    /// Connection URI including the configured database,
    /// e.g. `redis://127.0.0.1:32768/0`.
    pub async fn url(&self) -> Result<String> {
        let host = self.host().await?;
        let port = self.port().await?;
        Ok(format!("redis://{host}:{port}/{}", self.config.database))
    }

    /// Opens a fresh multiplexed connection.
    pub async fn connection(&self) -> Result<redis::aio::MultiplexedConnection> {
        let client = redis::Client::open(self.url().await?)?;
        Ok(client.get_multiplexed_async_connection().await?)
    }

    /// Returns the underlying container reference.
    pub fn container(&self) -> &ContainerAsync<GenericImage> {
        &self.container
    }

    async fn wait_until_ready(&self) -> Result<()> {
        let attempts = self.config.ready_attempts;
        for _ in 0..attempts {
            if let Ok(mut conn) = self.connection().await {
                let pong = redis::cmd("PING").query_async::<String>(&mut conn).await;
                if pong.is_ok() {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        Err(TestInfraError::NotReady { attempts })
    }
}
