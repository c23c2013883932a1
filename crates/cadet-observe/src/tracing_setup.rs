//! Tracing subscriber initialization with optional OpenTelemetry export.
//!
//! Log output goes to stderr so stdout carries nothing but the conversation.
//! The one exception is [`OTEL_VAR`]: the stdout span exporter prints spans
//! to stdout, interleaved with answers. It is a local debugging aid and must
//! stay off when stdout is piped into another program.
//!
//! # Usage
//!
//! ```no_run
//! let otel = cadet_observe::tracing_setup::otel_enabled_from_env();
//! cadet_observe::tracing_setup::init_tracing(otel).unwrap();
//! // ...
//! cadet_observe::tracing_setup::shutdown_tracing();
//! ```

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use std::sync::OnceLock;

/// Set to `1` or `true` to bridge spans to OpenTelemetry.
pub const OTEL_VAR: &str = "CADET_OTEL";

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "warn";

/// Stores the OTel tracer provider so it can be shut down cleanly on exit.
static TRACER_PROVIDER: OnceLock<SdkTracerProvider> = OnceLock::new();

/// Whether [`OTEL_VAR`] asks for OpenTelemetry export.
pub fn otel_enabled_from_env() -> bool {
    otel_flag(std::env::var(OTEL_VAR).ok().as_deref())
}

fn otel_flag(value: Option<&str>) -> bool {
    matches!(
        value.map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("1" | "true" | "yes")
    )
}

/// Initialize the global tracing subscriber.
///
/// - Installs a `fmt` layer writing to stderr.
/// - Respects `RUST_LOG`, defaulting to [`DEFAULT_FILTER`].
/// - When `enable_otel` is true, additionally bridges spans to OpenTelemetry
///   using the stdout span exporter (local development only). Its output
///   lands on stdout next to the conversation.
///
/// # Errors
///
/// Returns an error if the global subscriber has already been set.
pub fn init_tracing(enable_otel: bool) -> Result<(), Box<dyn std::error::Error>> {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    if enable_otel {
        let provider = SdkTracerProvider::builder()
            .with_simple_exporter(opentelemetry_stdout::SpanExporter::default())
            .build();
        let tracer = provider.tracer("cadet");
        let otel_layer = tracing_opentelemetry::layer().with_tracer(tracer);

        let _ = TRACER_PROVIDER.set(provider.clone());
        opentelemetry::global::set_tracer_provider(provider);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .with(otel_layer)
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;
    }

    Ok(())
}

/// Flush pending traces and shut down the OpenTelemetry tracer provider.
///
/// No-op when OTel was not enabled.
pub fn shutdown_tracing() {
    if let Some(provider) = TRACER_PROVIDER.get() {
        if let Err(e) = provider.shutdown() {
            eprintln!("Warning: OTel tracer provider shutdown error: {e}");
        }
    }
}
