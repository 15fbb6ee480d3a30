/// URL for accessing the PostgreSQL database (should contain a database name in the path)
pub const DB_URL: &str = "DATABASE_URL";
/// Socket address the HTTP server listens on. Defaults to [DEFAULT_BIND_ADDRESS].
pub const SERVER_BIND_ADDRESS: &str = "SERVER_BIND_ADDRESS";
/// Log level configuration for the application. Uses [EnvFilter directives](https://docs.rs/tracing-subscriber/latest/tracing_subscriber/filter/struct.EnvFilter.html#directives)
pub const LOG_LEVEL: &str = "LOG_LEVEL";

/// OpenTelemetry span export URL. Should be http://localhost:4317 when running with an
/// OpenTelemetry collector sidecar. Spans are only exported if this and [OTEL_METRIC_EXPORT_URL] are set.
pub const OTEL_SPAN_EXPORT_URL: &str = "OTEL_SPAN_EXPORT_URL";
/// OpenTelemetry metrics export URL. Should be http://localhost:4317 when running with an
/// OpenTelemetry collector sidecar.
pub const OTEL_METRIC_EXPORT_URL: &str = "OTEL_METRIC_EXPORT_URL";

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";
