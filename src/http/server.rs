//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, timeout, translation)
//! - Dispatch requests to the routing table
//! - Forward requests to the search backend
//! - Bind server to listener and shut down gracefully

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use url::Url;

use crate::config::GatewayConfig;
use crate::geocoding::ResponseTranslator;
use crate::http::request::{MakeRequestUuidV4, RequestIdExt, X_REQUEST_ID};
use crate::http::response::{error_response, translate_response, RouteLabel, TranslationState};
use crate::observability::metrics;
use crate::routing::Router as RouteTable;
use crate::upstream::UpstreamClient;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<RouteTable>,
    pub upstream: UpstreamClient,
}

/// HTTP server for the geocoding gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    ///
    /// The configuration is expected to have passed validation; an unparsable
    /// backend URL is reported as an error rather than a panic.
    pub fn new(config: GatewayConfig) -> Result<Self, url::ParseError> {
        let base_url = Url::parse(&config.upstream.base_url)?;
        let upstream = UpstreamClient::new(
            base_url,
            Duration::from_secs(config.timeouts.upstream_secs),
            config.translation.max_body_bytes,
        );

        let state = AppState {
            routes: Arc::new(RouteTable::from_config(config.routes.clone())),
            upstream,
        };

        let translator = ResponseTranslator::new(
            config.translation.plus_code.clone(),
            config.translation.missing_features,
        );
        let translation = TranslationState::new(translator, config.translation.max_body_bytes);

        let router = Self::build_router(&config, state, translation);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, state: AppState, translation: TranslationState) -> Router {
        Router::new()
            .route("/healthz", get(health_handler))
            .fallback(forward_handler)
            .layer(middleware::from_fn_with_state(translation, translate_response))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuidV4))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
                    .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs))),
            )
    }

    /// The assembled router, for driving the gateway without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            routes = self.config.routes.len(),
            upstream = %self.config.upstream.base_url,
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Liveness probe answered by the gateway itself.
async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({ "status": "up" }))
}

/// Looks up the route and forwards the request to the backend.
async fn forward_handler(State(state): State<AppState>, request: Request) -> Response {
    let request_id = request.request_id().to_string();
    let path = request.uri().path().to_string();
    let method = request.method().clone();

    let Some(route) = state.routes.match_path(&path) else {
        tracing::warn!(request_id = %request_id, path = %path, "No route matched");
        let mut response = error_response(StatusCode::NOT_FOUND, "No matching route found");
        response.extensions_mut().insert(RouteLabel("none".to_string()));
        return response;
    };

    let upstream_path = route.upstream_path(&path);
    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %path,
        route = %route.name,
        upstream_path = %upstream_path,
        "Forwarding request"
    );

    let mut response = match state.upstream.forward(request, &upstream_path).await {
        Ok(response) => response.into_response(),
        Err(e) => {
            let kind = e.kind();
            tracing::error!(
                request_id = %request_id,
                route = %route.name,
                kind = kind.as_str(),
                error = %e,
                "Upstream request failed"
            );
            metrics::record_upstream_error(kind.as_str());
            e.into_response()
        }
    };
    response.extensions_mut().insert(RouteLabel(route.name.clone()));
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use tower::ServiceExt;

    fn server() -> HttpServer {
        let mut config = GatewayConfig::default();
        config.observability.metrics_enabled = false;
        HttpServer::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_healthz_passes_through_translation() {
        let response = server()
            .router()
            .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({"status": "up"}));
    }

    #[tokio::test]
    async fn test_unknown_path_is_404() {
        let response = server()
            .router()
            .oneshot(
                Request::builder()
                    .uri("/nothing/here")
                    .header("x-request-id", "fixed-id")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()["x-request-id"], "fixed-id");
    }

    #[test]
    fn test_rejects_unparsable_upstream() {
        let mut config = GatewayConfig::default();
        config.upstream.base_url = "not a url".into();
        assert!(HttpServer::new(config).is_err());
    }
}
