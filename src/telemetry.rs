//! Logging and OpenTelemetry bootstrap
//!
//! Console output always goes to stderr so `plan` can print clean JSON on
//! stdout. With an OTLP endpoint configured, spans, log records and metrics
//! are additionally exported over OTLP/HTTP.

use anyhow::{Context, Result};
use opentelemetry::trace::TracerProvider as _;
use opentelemetry::{KeyValue, global};
use opentelemetry_appender_tracing::layer::OpenTelemetryTracingBridge;
use opentelemetry_otlp::{LogExporter, MetricExporter, SpanExporter, WithExportConfig};
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::logs::SdkLoggerProvider;
use opentelemetry_sdk::metrics::SdkMeterProvider;
use opentelemetry_sdk::trace::SdkTracerProvider;
use opentelemetry_semantic_conventions::resource::SERVICE_VERSION;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

use crate::config::LoggingConfig;

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Flushes and shuts down exporters when dropped
#[must_use = "telemetry stops exporting when the guard is dropped"]
pub struct TelemetryGuard {
    providers: Option<Providers>,
}

struct Providers {
    tracer: SdkTracerProvider,
    meter: SdkMeterProvider,
    logger: SdkLoggerProvider,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        let Some(providers) = self.providers.take() else {
            return;
        };
        if let Err(e) = providers.tracer.shutdown() {
            eprintln!("Failed to shut down trace exporter: {e}");
        }
        if let Err(e) = providers.meter.shutdown() {
            eprintln!("Failed to shut down metric exporter: {e}");
        }
        if let Err(e) = providers.logger.shutdown() {
            eprintln!("Failed to shut down log exporter: {e}");
        }
    }
}

/// Install the global subscriber
///
/// `RUST_LOG` takes precedence over the configured level. Must be called
/// from within a Tokio runtime when OTLP export is enabled.
pub fn init(config: &LoggingConfig) -> Result<TelemetryGuard> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .with_context(|| format!("Invalid log level '{}'", config.level))?;

    let mut layers: Vec<BoxedLayer> = vec![console_layer(&config.format)];

    let providers = match config.otlp_endpoint.as_deref() {
        Some(endpoint) => {
            let providers = otlp_providers(endpoint)?;
            let tracer = providers.tracer.tracer(env!("CARGO_PKG_NAME"));
            layers.push(tracing_opentelemetry::layer().with_tracer(tracer).boxed());
            layers.push(OpenTelemetryTracingBridge::new(&providers.logger).boxed());
            Some(providers)
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    if let Some(endpoint) = &config.otlp_endpoint {
        tracing::info!(endpoint, "Exporting telemetry over OTLP");
    }

    Ok(TelemetryGuard { providers })
}

fn console_layer(format: &str) -> BoxedLayer {
    let layer = fmt::layer().with_writer(std::io::stderr).with_target(true);
    match format {
        "json" => layer.json().boxed(),
        _ => layer.pretty().boxed(),
    }
}

fn otlp_providers(endpoint: &str) -> Result<Providers> {
    let base = endpoint.trim_end_matches('/');
    let resource = Resource::builder()
        .with_service_name(env!("CARGO_PKG_NAME"))
        .with_attribute(KeyValue::new(SERVICE_VERSION, env!("CARGO_PKG_VERSION")))
        .build();

    let spans = SpanExporter::builder()
        .with_http()
        .with_endpoint(format!("{base}/v1/traces"))
        .build()
        .context("Failed to build OTLP span exporter")?;
    let tracer = SdkTracerProvider::builder()
        .with_batch_exporter(spans)
        .with_resource(resource.clone())
        .build();
    global::set_tracer_provider(tracer.clone());

    let metrics = MetricExporter::builder()
        .with_http()
        .with_endpoint(format!("{base}/v1/metrics"))
        .build()
        .context("Failed to build OTLP metric exporter")?;
    let meter = SdkMeterProvider::builder()
        .with_periodic_exporter(metrics)
        .with_resource(resource.clone())
        .build();
    global::set_meter_provider(meter.clone());

    let logs = LogExporter::builder()
        .with_http()
        .with_endpoint(format!("{base}/v1/logs"))
        .build()
        .context("Failed to build OTLP log exporter")?;
    let logger = SdkLoggerProvider::builder()
        .with_batch_exporter(logs)
        .with_resource(resource)
        .build();

    Ok(Providers {
        tracer,
        meter,
        logger,
    })
}
