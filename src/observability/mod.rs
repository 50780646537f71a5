//! Observability and telemetry.
//!
//! Structured logging via `tracing` and a Prometheus metrics exporter.
//! The serving path and the reload scheduler emit their counters through
//! the `metrics` facade whether or not the exporter is installed; with no
//! exporter the recordings are no-ops.

use crate::{Error, Result};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Observability configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObservabilityConfig {
    /// Emit logs as JSON instead of human-readable lines.
    pub json: bool,
    /// Lower the default log level from `info` to `debug`.
    pub verbose: bool,
    /// Address to expose Prometheus metrics on, if any.
    pub metrics_listen: Option<SocketAddr>,
}

static OBSERVABILITY_INIT: OnceLock<()> = OnceLock::new();

/// Reads the metrics listen address from `SUGGESTD_METRICS_PORT`.
///
/// Returns `None` (exporter disabled) when the variable is unset or does
/// not parse as a port.
#[must_use]
pub fn metrics_listen_from_env() -> Option<SocketAddr> {
    listen_for_port(&std::env::var("SUGGESTD_METRICS_PORT").ok()?)
}

fn listen_for_port(value: &str) -> Option<SocketAddr> {
    let port: u16 = value.parse().ok()?;
    Some(SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port))
}

/// Initializes logging and metrics for the process.
///
/// Must be called at most once, from within a tokio runtime when a
/// metrics listener is configured (the exporter spawns its HTTP task on
/// the ambient runtime).
///
/// # Errors
///
/// Returns an error if observability has already been initialized or if
/// the subscriber or exporter fails to install.
pub fn init(config: &ObservabilityConfig) -> Result<()> {
    if OBSERVABILITY_INIT.get().is_some() {
        return Err(Error::OperationFailed {
            operation: "observability_init".to_string(),
            cause: "observability already initialized".to_string(),
        });
    }

    let default_level = if config.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    if config.json {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_current_span(true),
            )
            .with(filter)
            .try_init()
            .map_err(init_error)?;
    } else {
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .with(filter)
            .try_init()
            .map_err(init_error)?;
    }

    if let Some(addr) = config.metrics_listen {
        PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()
            .map_err(|e| Error::OperationFailed {
                operation: "install_metrics_exporter".to_string(),
                cause: e.to_string(),
            })?;
        tracing::info!(%addr, "prometheus metrics exporter listening");
    }

    OBSERVABILITY_INIT
        .set(())
        .map_err(|()| Error::OperationFailed {
            operation: "observability_init".to_string(),
            cause: "failed to mark observability initialized".to_string(),
        })?;

    Ok(())
}

/// Helper to convert init errors.
#[allow(clippy::needless_pass_by_value)]
fn init_error(e: tracing_subscriber::util::TryInitError) -> Error {
    Error::OperationFailed {
        operation: "observability_init".to_string(),
        cause: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listen_requires_a_valid_port() {
        // Garbage values disable the exporter rather than erroring.
        assert!(listen_for_port("not-a-port").is_none());
        assert!(listen_for_port("70000").is_none());
        assert_eq!(
            listen_for_port("9090"),
            Some(SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 9090))
        );
    }
}
