use anyhow::Result;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::runtime::Tokio;
use opentelemetry_sdk::trace::{Tracer, TracerProvider};
use opentelemetry_sdk::Resource;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

const SERVICE_NAME: &str = "organize";

/// Shuts the OTLP tracer provider down when dropped, flushing buffered spans.
#[must_use]
pub struct TelemetryGuard {
    provider: Option<TracerProvider>,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.provider.take() {
            if let Err(e) = provider.shutdown() {
                tracing::warn!(error = %e, "failed to shut down tracer provider");
            }
        }
    }
}

pub fn init(config: &Config) -> Result<TelemetryGuard> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().json());

    let Some(endpoint) = &config.otlp_endpoint else {
        registry.init();
        return Ok(TelemetryGuard { provider: None });
    };

    let provider = otlp_provider(endpoint)?;
    registry
        .with(tracing_opentelemetry::layer().with_tracer(tracer(&provider)))
        .init();

    Ok(TelemetryGuard {
        provider: Some(provider),
    })
}

fn otlp_provider(endpoint: &str) -> Result<TracerProvider> {
    let resource = Resource::new(vec![KeyValue::new("service.name", SERVICE_NAME)]);

    let provider = opentelemetry_otlp::new_pipeline()
        .tracing()
        .with_exporter(
            opentelemetry_otlp::new_exporter()
                .tonic()
                .with_endpoint(endpoint),
        )
        .with_trace_config(opentelemetry_sdk::trace::Config::default().with_resource(resource))
        .install_batch(Tokio)?;

    Ok(provider)
}

fn tracer(provider: &TracerProvider) -> Tracer {
    provider.tracer(SERVICE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dropping_guard_shuts_provider_down() {
        let provider = TracerProvider::builder().build();
        let guard = TelemetryGuard {
            provider: Some(provider.clone()),
        };

        drop(guard);

        assert!(provider.shutdown().is_err(), "provider was not shut down");
    }

    #[test]
    fn guard_without_exporter_is_inert() {
        drop(TelemetryGuard { provider: None });
    }
}
