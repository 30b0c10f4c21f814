use thiserror::Error;

/// Errors raised while provisioning test containers.
#[derive(Debug, Error)]
pub enum TestInfraError {
    #[error("failed to run container: {0}")]
    Container(#[from] testcontainers::TestcontainersError),

    #[error("redis client error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("redis did not answer PING after {attempts} attempts")]
    NotReady { attempts: u32 },
}

pub type Result<T> = std::result::Result<T, TestInfraError>;
