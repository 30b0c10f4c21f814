use clap::{Parser, ValueEnum};
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;
use visitlog_telemetry::{LogFormat, TelemetryConfig};

pub const LISTEN_ADDR_ENV: &str = "VISITLOG_LISTEN_ADDR";
pub const STORAGE_BACKEND_ENV: &str = "VISITLOG_STORAGE_BACKEND";
pub const REDIS_URL_ENV: &str = "VISITLOG_REDIS_URL";
pub const REDIS_KEY_ENV: &str = "VISITLOG_REDIS_KEY";
pub const LOG_FORMAT_ENV: &str = "VISITLOG_LOG_FORMAT";
pub const OTLP_ENDPOINT_ENV: &str = "VISITLOG_OTLP_ENDPOINT";
pub const SERVICE_NAME_ENV: &str = "VISITLOG_SERVICE_NAME";

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8000";
pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379/0";
pub const DEFAULT_REDIS_KEY: &str = "domains";
pub const DEFAULT_SERVICE_NAME: &str = "visitlog-gateway";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackendArg {
    #[value(name = "redis")]
    Redis,
    #[value(name = "in-memory")]
    InMemory,
}

impl Display for StorageBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackendArg::Redis => write!(f, "redis"),
            StorageBackendArg::InMemory => write!(f, "in-memory"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    #[value(name = "text")]
    Text,
    #[value(name = "json")]
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(value: LogFormatArg) -> Self {
        match value {
            LogFormatArg::Text => LogFormat::Text,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "visitlog-gateway", version, about = "Records visited domains and answers time-range queries")]
pub struct CLI {
    #[arg(long, env = LISTEN_ADDR_ENV, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    #[arg(
        long,
        env = STORAGE_BACKEND_ENV,
        value_enum,
        default_value_t = StorageBackendArg::Redis
    )]
    pub storage: StorageBackendArg,

    #[arg(long, env = REDIS_URL_ENV, default_value = DEFAULT_REDIS_URL)]
    pub redis_url: String,

    #[arg(long, env = REDIS_KEY_ENV, default_value = DEFAULT_REDIS_KEY)]
    pub redis_key: String,

    #[arg(long, env = LOG_FORMAT_ENV, value_enum, default_value_t = LogFormatArg::Text)]
    pub log_format: LogFormatArg,

    /// OTLP/HTTP traces endpoint; span export is off when unset.
    #[arg(long, env = OTLP_ENDPOINT_ENV)]
    pub otlp_endpoint: Option<String>,

    #[arg(long, env = SERVICE_NAME_ENV, default_value = DEFAULT_SERVICE_NAME)]
    pub service_name: String,
}

impl CLI {
    pub fn telemetry_config(&self) -> TelemetryConfig {
        TelemetryConfig::builder()
            .service_name(self.service_name.clone())
            .format(self.log_format.into())
            .otlp_endpoint(self.otlp_endpoint.clone())
            .build()
    }
}
