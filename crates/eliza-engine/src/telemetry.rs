//! Log and trace initialisation for the `eliza` binaries.
//!
//! Call [`init_tracing`] once at startup and keep the returned guard alive.
//!
//! # Environment variables
//!
//! | Variable | Effect |
//! |---|---|
//! | `RUST_LOG` | Log filter (default `"info"`). |
//! | `ELIZA_LOG_FORMAT=json` | Emit newline-delimited JSON logs. |
//! | `OTEL_EXPORTER_OTLP_ENDPOINT` | OTLP collector base URL (e.g. `http://localhost:4318`). When set, spans such as `eliza.respond` are exported over OTLP/HTTP. |
//!
//! ```rust,no_run
//! let _guard = eliza_engine::telemetry::init_tracing("eliza");
//! ```

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{Resource, trace::SdkTracerProvider};
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

const LOG_FORMAT_VAR: &str = "ELIZA_LOG_FORMAT";

/// Install the global subscriber.
///
/// Output is compact text unless `ELIZA_LOG_FORMAT=json`.  An OTLP layer is
/// added only when `OTEL_EXPORTER_OTLP_ENDPOINT` is set and the exporter
/// builds; otherwise logging works exactly the same without it.
pub fn init_tracing(service_name: &str) -> TracerProviderGuard {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = wants_json(std::env::var(LOG_FORMAT_VAR).ok().as_deref());

    let provider = build_provider(service_name);
    let otel_layer = provider.as_ref().map(|p| {
        tracing_opentelemetry::layer().with_tracer(p.tracer(service_name.to_string()))
    });
    let fmt_layer = if json {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().compact().boxed()
    };

    // `try_init` so a second call (e.g. from tests) is a no-op.
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(otel_layer)
        .with(fmt_layer)
        .try_init();

    TracerProviderGuard(provider)
}

fn wants_json(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.eq_ignore_ascii_case("json"))
}

// ─────────────────────────────────────────────────────────────────────────────
// RAII guard
// ─────────────────────────────────────────────────────────────────────────────

/// Shuts the OTLP provider down on drop, flushing pending spans.
pub struct TracerProviderGuard(Option<SdkTracerProvider>);

impl TracerProviderGuard {
    /// `true` when spans are being exported.
    pub fn is_exporting(&self) -> bool {
        self.0.is_some()
    }
}

impl Drop for TracerProviderGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.0.take()
            && let Err(e) = provider.shutdown()
        {
            eprintln!("[eliza] OpenTelemetry provider shutdown error: {e}");
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Internal helpers
// ─────────────────────────────────────────────────────────────────────────────

fn build_provider(service_name: &str) -> Option<SdkTracerProvider> {
    let endpoint = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT").ok()?;

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_http()
        .with_endpoint(endpoint)
        .build()
        .map_err(|e| eprintln!("[eliza] OTLP exporter init failed: {e}"))
        .ok()?;

    let resource = Resource::builder()
        .with_service_name(service_name.to_string())
        .build();

    // Simple exporter: the CLI may initialise tracing before any Tokio
    // runtime exists, and a batch exporter would need one.
    Some(
        SdkTracerProvider::builder()
            .with_resource(resource)
            .with_simple_exporter(exporter)
            .build(),
    )
}
