use anyhow::Context;
use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{Resource, runtime, trace as sdktrace};
use tracing::Subscriber;
use tracing_subscriber::{
    EnvFilter, Layer, Registry, layer::SubscriberExt, registry::LookupSpan,
    util::SubscriberInitExt,
};

/// Install the global tracing subscriber.
///
/// Logs are emitted as flattened JSON with file/line information. `RUST_LOG`
/// overrides `log_level`. When `otlp_endpoint` is given, spans are also
/// exported over OTLP/gRPC under `service.name = service_name`.
pub fn init_tracing(
    service_name: &str,
    log_level: &str,
    otlp_endpoint: Option<&str>,
) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    // Generic over the subscriber so the same layer config fits both stacks below.
    fn fmt_layer<S>() -> impl Layer<S>
    where
        S: Subscriber + for<'a> LookupSpan<'a>,
    {
        tracing_subscriber::fmt::layer()
            .with_file(true)
            .with_line_number(true)
            .json()
            .flatten_event(true)
    }

    let Some(endpoint) = otlp_endpoint else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer())
            .try_init()
            .context("Failed to install tracing subscriber")?;
        return Ok(());
    };

    let otlp_exporter = opentelemetry_otlp::new_exporter()
        .tonic()
        .with_endpoint(endpoint);

    let tracer = opentelemetry_otlp::new_pipeline()
        .tracing()
        .with_exporter(otlp_exporter)
        .with_trace_config(sdktrace::config().with_resource(Resource::new(vec![
            KeyValue::new("service.name", service_name.to_string()),
        ])))
        .install_batch(runtime::Tokio)
        .with_context(|| {
            format!(
                "Failed to initialize OTLP tracer for service '{}' at endpoint '{}'",
                service_name, endpoint
            )
        })?;

    let telemetry = tracing_opentelemetry::layer::<Registry>().with_tracer(tracer);

    tracing_subscriber::registry()
        .with(telemetry)
        .with(env_filter)
        .with(fmt_layer())
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(())
}
