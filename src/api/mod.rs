use crate::{
    api::handlers::{health, root},
    chat::ChatProxy,
    otp::spawn_sweeper,
};
use anyhow::{anyhow, Context, Result};
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{header::CONTENT_TYPE, HeaderName, HeaderValue, Method, Request},
    routing::{get, options},
    Extension, Router,
};
use std::{sync::Arc, time::Duration};
use tokio::{net::TcpListener, signal};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::PropagateRequestIdLayer,
    set_header::SetRequestHeaderLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{error, info, info_span, Span};
use ulid::Ulid;
use url::Url;
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;

pub mod handlers;
mod openapi;

pub use handlers::AuthState;
pub use openapi::openapi;

const REQUEST_TIMEOUT_SECONDS: u64 = 60;

/// Build the API router with all documented routes registered.
#[must_use]
pub fn router() -> OpenApiRouter {
    openapi::api_router()
}

/// Assemble the complete application: documented routes, `/`, Swagger UI and
/// the middleware stack.
///
/// # Errors
/// Returns an error if an allowed origin is not a valid URL.
pub fn app(
    auth_state: Arc<AuthState>,
    chat: Arc<ChatProxy>,
    allowed_origins: &[String],
) -> Result<Router> {
    let cors = CorsLayer::new()
        .allow_headers([CONTENT_TYPE])
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_origin(AllowOrigin::list(cors_origins(allowed_origins)?))
        .allow_credentials(true);

    let (router, openapi) = router().split_for_parts();

    let app = router
        .route("/", get(root::root))
        .route("/health", options(health::health))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(TimeoutLayer::new(Duration::from_secs(
                    REQUEST_TIMEOUT_SECONDS,
                )))
                .layer(cors)
                .layer(Extension(auth_state))
                .layer(Extension(chat)),
        );

    Ok(app)
}

/// Start the server
/// # Errors
/// Return error if failed to start the server
pub async fn new(
    port: u16,
    allowed_origins: &[String],
    auth_state: Arc<AuthState>,
    chat: Arc<ChatProxy>,
    sweep_interval: Duration,
) -> Result<()> {
    let sweeper = spawn_sweeper(
        auth_state.otp().clone(),
        auth_state.grants().clone(),
        sweep_interval,
    );

    let app = app(auth_state, chat, allowed_origins)?;

    let listener = TcpListener::bind(format!("::0:{port}"))
        .await
        .with_context(|| format!("Failed to bind port {port}"))?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();

    Ok(())
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");

    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}

fn cors_origins(allowed_origins: &[String]) -> Result<Vec<HeaderValue>> {
    allowed_origins
        .iter()
        .map(String::as_str)
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(origin_header)
        .collect()
}

fn origin_header(origin: &str) -> Result<HeaderValue> {
    let parsed = Url::parse(origin).with_context(|| format!("Invalid allowed origin: {origin}"))?;

    let host = parsed
        .host_str()
        .ok_or_else(|| anyhow!("Allowed origin must include a valid host: {origin}"))?;

    let port = parsed
        .port()
        .map_or_else(String::new, |port| format!(":{port}"));

    let origin = format!("{}://{}{}", parsed.scheme(), host, port);

    HeaderValue::from_str(&origin).context("Failed to build origin header")
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Gracefully shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_header_strips_path() -> Result<()> {
        assert_eq!(
            origin_header("https://shop.example.com/")?,
            HeaderValue::from_static("https://shop.example.com")
        );
        assert_eq!(
            origin_header("http://localhost:3000")?,
            HeaderValue::from_static("http://localhost:3000")
        );
        Ok(())
    }

    #[test]
    fn origin_header_rejects_invalid() {
        assert!(origin_header("localhost:3000").is_err());
        assert!(origin_header("not a url").is_err());
    }

    #[test]
    fn cors_origins_skips_blank_entries() -> Result<()> {
        let origins = cors_origins(&[
            "http://localhost:3000".to_string(),
            " ".to_string(),
            " http://localhost:3001 ".to_string(),
        ])?;
        assert_eq!(origins.len(), 2);
        Ok(())
    }
}
