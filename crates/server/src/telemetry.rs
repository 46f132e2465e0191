use axum::{body::Body, http::Request, response::Response};
use opentelemetry::{
    global,
    trace::{SpanKind, TraceContextExt, Tracer},
    Context, KeyValue,
};
use opentelemetry_otlp::{WithExportConfig, WithTonicConfig};
use std::{
    future::Future,
    pin::Pin,
    sync::OnceLock,
    task::{Context as TaskContext, Poll},
};
use tower::{Layer, Service};

use crate::auth::CurrentUser;

const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Keep the LoggerProvider alive for the process lifetime.
static LOGGER_PROVIDER: OnceLock<opentelemetry_sdk::logs::SdkLoggerProvider> = OnceLock::new();

/// Failure while wiring the OTLP exporters.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("OTLP exporter: {0}")]
    Exporter(String),
    #[error("invalid SIGNOZ_INGESTION_KEY")]
    IngestionKey,
}

/// Point an OTLP gRPC exporter builder at the collector, with TLS for
/// `https://` endpoints and the SigNoz ingestion key when one is set.
fn configure_exporter<B>(builder: B, endpoint: &str) -> Result<B, TelemetryError>
where
    B: WithExportConfig + WithTonicConfig,
{
    let mut builder = builder.with_endpoint(endpoint);
    if endpoint.starts_with("https://") {
        builder = builder.with_tls_config(
            opentelemetry_otlp::tonic_types::transport::ClientTlsConfig::new().with_native_roots(),
        );
    }
    if let Some(key) = std::env::var("SIGNOZ_INGESTION_KEY").ok().filter(|k| !k.is_empty()) {
        let mut metadata = opentelemetry_otlp::tonic_types::metadata::MetadataMap::new();
        metadata.insert(
            "signoz-ingestion-key",
            key.parse().map_err(|_| TelemetryError::IngestionKey)?,
        );
        builder = builder.with_metadata(metadata);
    }
    Ok(builder)
}

/// Set up the OpenTelemetry tracer and logger providers.
///
/// Must be called from inside a Tokio runtime. Returns `Ok(false)` when
/// `OTEL_EXPORTER_OTLP_ENDPOINT` is unset.
///
/// Environment:
///   - `OTEL_EXPORTER_OTLP_ENDPOINT` collector gRPC address
///   - `OTEL_SERVICE_NAME` service name tag
///   - `SIGNOZ_INGESTION_KEY` cloud access token (optional)
///   - `APP_ENV` deployment environment tag
pub fn init_telemetry(default_service_name: &str) -> Result<bool, TelemetryError> {
    let Ok(endpoint) = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT") else {
        tracing::info!("OTEL_EXPORTER_OTLP_ENDPOINT not set, skipping OTLP telemetry");
        return Ok(false);
    };

    let service_name =
        std::env::var("OTEL_SERVICE_NAME").unwrap_or_else(|_| default_service_name.to_string());
    let environment = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

    let exporter = configure_exporter(
        opentelemetry_otlp::SpanExporter::builder().with_tonic(),
        &endpoint,
    )?
    .build()
    .map_err(|e| TelemetryError::Exporter(e.to_string()))?;

    let resource = opentelemetry_sdk::Resource::builder()
        .with_service_name(service_name)
        .with_attribute(KeyValue::new("service.version", APP_VERSION))
        .with_attribute(KeyValue::new("deployment.environment", environment))
        .build();

    let provider = opentelemetry_sdk::trace::SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(resource.clone())
        .build();
    global::set_tracer_provider(provider);

    let log_exporter = configure_exporter(
        opentelemetry_otlp::LogExporter::builder().with_tonic(),
        &endpoint,
    )?
    .build()
    .map_err(|e| TelemetryError::Exporter(e.to_string()))?;

    let logger_provider = LOGGER_PROVIDER.get_or_init(|| {
        opentelemetry_sdk::logs::SdkLoggerProvider::builder()
            .with_batch_exporter(log_exporter)
            .with_resource(resource)
            .build()
    });

    // `log` crate records go to OTLP; `tracing` keeps its own subscriber.
    let bridge = opentelemetry_appender_log::OpenTelemetryLogBridge::new(logger_provider);
    match log::set_boxed_logger(Box::new(bridge)) {
        Ok(()) => log::set_max_level(log::LevelFilter::Info),
        Err(_) => tracing::warn!("log bridge skipped, a `log` logger is already set"),
    }

    tracing::info!(endpoint = %endpoint, version = APP_VERSION, "telemetry initialized");
    Ok(true)
}

/// Collapse id segments so spans group by route: `/api/cases/<uuid>` becomes
/// `/api/cases/{id}`.
pub fn route_template(path: &str) -> String {
    path.split('/')
        .map(|seg| {
            if uuid::Uuid::parse_str(seg).is_ok() || (!seg.is_empty() && seg.chars().all(|c| c.is_ascii_digit())) {
                "{id}"
            } else {
                seg
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Tower layer that creates an OpenTelemetry span for each HTTP request.
///
/// Captures method, route, request ID, response status and the
/// authenticated user (if the auth middleware attached one).
#[derive(Clone)]
pub struct OtelTraceLayer;

impl<S> Layer<S> for OtelTraceLayer {
    type Service = OtelTraceService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        OtelTraceService { inner }
    }
}

#[derive(Clone)]
pub struct OtelTraceService<S> {
    inner: S,
}

impl<S> Service<Request<Body>> for OtelTraceService<S>
where
    S: Service<Request<Body>, Response = Response> + Send + Clone + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut TaskContext<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let tracer = global::tracer("chakshi");
        let method = req.method().to_string();
        let path = req.uri().path().to_string();
        let route = route_template(&path);

        let request_id = req
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let mut attributes = vec![
            KeyValue::new("http.method", method.clone()),
            KeyValue::new("http.target", path),
            KeyValue::new("http.route", route.clone()),
            KeyValue::new("http.request_id", request_id),
        ];
        match req.extensions().get::<CurrentUser>() {
            Some(user) => attributes.extend([
                KeyValue::new("user.id", user.id.to_string()),
                KeyValue::new("user.role", user.role.as_str()),
                KeyValue::new("auth.status", "authenticated"),
            ]),
            None => attributes.push(KeyValue::new("auth.status", "anonymous")),
        }

        let span = tracer
            .span_builder(format!("{method} {route}"))
            .with_kind(SpanKind::Server)
            .with_attributes(attributes)
            .start(&tracer);

        let cx = Context::current_with_span(span);
        let mut inner = self.inner.clone();

        let guard = cx.clone().attach();
        let future = inner.call(req);
        drop(guard);

        Box::pin(async move {
            let response = future.await?;

            let span = cx.span();
            let status = response.status();
            span.set_attribute(KeyValue::new("http.status_code", status.as_u16() as i64));

            if status.is_server_error() {
                span.set_status(opentelemetry::trace::Status::error(status.to_string()));
            } else if status.is_client_error() {
                span.set_attribute(KeyValue::new("error.type", "client_error"));
            }

            Ok(response)
        })
    }
}
