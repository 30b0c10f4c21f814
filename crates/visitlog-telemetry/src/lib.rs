//! Tracing setup shared by visitlog binaries.
//!
//! [`init`] installs a global subscriber made of an [`EnvFilter`] (read from
//! `RUST_LOG`), a text or JSON formatter, and, when an OTLP endpoint is
//! configured, an OpenTelemetry layer exporting spans over HTTP/JSON.
//! Records emitted through the `log` facade are bridged into tracing.
//!
//! Call [`init`] before starting the async runtime and
//! [`TelemetryGuard::shutdown`] after it has stopped; the span exporter runs
//! on its own thread and flushes synchronously.

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::{Protocol, WithExportConfig};
use opentelemetry_sdk::trace::SdkTracerProvider;
use opentelemetry_sdk::Resource;
use thiserror::Error;
use tracing::warn;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};
use typed_builder::TypedBuilder;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),
    #[error("failed to build OTLP exporter: {0}")]
    Exporter(String),
    #[error("failed to install subscriber: {0}")]
    Subscriber(#[from] tracing::subscriber::SetGlobalDefaultError),
    #[error("failed to bridge log records: {0}")]
    LogBridge(#[from] tracing_log::log::SetLoggerError),
}

pub type Result<T> = std::result::Result<T, TelemetryError>;

/// Output format of the log formatter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human readable, one line per event.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Telemetry settings.
///
/// # Example
///
/// ```rust
/// use visitlog_telemetry::{LogFormat, TelemetryConfig};
///
/// let config = TelemetryConfig::builder()
///     .service_name("visitlog-gateway")
///     .format(LogFormat::Json)
///     .build();
/// assert_eq!(config.default_directive, "info");
/// ```
#[derive(Debug, Clone, TypedBuilder)]
pub struct TelemetryConfig {
    /// Reported as the `service.name` resource of exported spans.
    #[builder(setter(into))]
    pub service_name: String,

    #[builder(default)]
    pub format: LogFormat,

    /// Filter used when `RUST_LOG` is unset.
    #[builder(default = "info".to_string(), setter(into))]
    pub default_directive: String,

    /// OTLP/HTTP traces endpoint, e.g. `http://localhost:4318/v1/traces`.
    /// Span export is disabled when unset.
    #[builder(default)]
    pub otlp_endpoint: Option<String>,
}

/// Keeps the span exporter alive; flush it with [`shutdown`](Self::shutdown).
#[must_use = "dropping the guard without shutdown may lose buffered spans"]
pub struct TelemetryGuard {
    provider: Option<SdkTracerProvider>,
}

impl TelemetryGuard {
    /// Whether spans are being exported.
    pub fn exporting(&self) -> bool {
        self.provider.is_some()
    }

    /// Flushes and stops the span exporter, if any.
    pub fn shutdown(self) {
        if let Some(provider) = self.provider {
            if let Err(e) = provider.shutdown() {
                warn!(error = %e, "failed to shut down span exporter");
            }
        }
    }
}

/// Installs the global subscriber described by `config`.
///
/// Fails if a global subscriber or logger is already installed.
pub fn init(config: &TelemetryConfig) -> Result<TelemetryGuard> {
    let filter = env_filter(&config.default_directive)?;

    let fmt_layer = match config.format {
        LogFormat::Text => tracing_subscriber::fmt::layer().boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer().json().boxed(),
    };

    let provider = config
        .otlp_endpoint
        .as_deref()
        .map(|endpoint| tracer_provider(&config.service_name, endpoint))
        .transpose()?;

    let otel_layer = provider.as_ref().map(|provider| {
        tracing_opentelemetry::layer().with_tracer(provider.tracer(config.service_name.clone()))
    });

    let subscriber = Registry::default()
        .with(fmt_layer)
        .with(otel_layer)
        .with(filter);

    tracing::subscriber::set_global_default(subscriber)?;
    tracing_log::LogTracer::init()?;

    Ok(TelemetryGuard { provider })
}

fn env_filter(default_directive: &str) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => Ok(EnvFilter::try_new(default_directive)?),
    }
}

fn tracer_provider(service_name: &str, endpoint: &str) -> Result<SdkTracerProvider> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_http()
        .with_protocol(Protocol::HttpJson)
        .with_endpoint(endpoint)
        .build()
        .map_err(|e| TelemetryError::Exporter(e.to_string()))?;

    let resource = Resource::builder()
        .with_service_name(service_name.to_string())
        .build();

    Ok(SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(resource)
        .build())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = TelemetryConfig::builder().service_name("svc").build();
        assert_eq!(config.service_name, "svc");
        assert_eq!(config.format, LogFormat::Text);
        assert_eq!(config.default_directive, "info");
        assert!(config.otlp_endpoint.is_none());
    }

    #[test]
    fn invalid_default_directive_is_rejected() {
        assert!(EnvFilter::try_new("visitlog=notalevel").is_err());
        assert!(EnvFilter::try_new("visitlog_core=debug,info").is_ok());
    }

    #[test]
    fn tracer_provider_builds_without_collector() {
        let provider = tracer_provider("svc", "http://127.0.0.1:4318/v1/traces").unwrap();
        let _ = provider.shutdown();
    }

    // The global subscriber can be installed once per process.
    #[test]
    fn init_installs_once() {
        let config = TelemetryConfig::builder()
            .service_name("svc")
            .format(LogFormat::Json)
            .build();

        let guard = init(&config).unwrap();
        assert!(!guard.exporting());
        tracing::info!("telemetry initialised");

        assert!(matches!(init(&config), Err(TelemetryError::Subscriber(_))));
        guard.shutdown();
    }
}
