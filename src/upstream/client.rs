//! Forwarding client for the search backend.
//!
//! # Responsibilities
//! - Rewrite the client request onto the backend base URL
//! - Enforce the backend deadline over headers and body
//! - Classify transport failures into upstream error kinds
//!
//! # Design Decisions
//! - One Tokio timeout covers the request and the buffered body; an elapsed
//!   deadline is `timeout`
//! - Connect failures are `no_connections`, anything later `connection_fault`
//! - Hop-by-hop headers are dropped in both directions
//! - A failure becomes an ordinary geocoding envelope so the translation
//!   stage handles it like any backend answer

use std::time::Duration;

use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderName, Request, Response, StatusCode, Uri},
    response::{IntoResponse, Json},
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use thiserror::Error;
use url::Url;

use crate::geocoding::{Envelope, ErrorKind, UpstreamError};

/// Headers that describe one connection and are never forwarded.
static HOP_BY_HOP: [HeaderName; 9] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    HeaderName::from_static("proxy-connection"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// Why a backend call produced no response.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("backend did not answer within {0:?}")]
    Timeout(Duration),

    #[error("could not connect to backend: {0}")]
    Connect(#[source] hyper_util::client::legacy::Error),

    #[error("backend connection failed: {0}")]
    Transport(#[source] hyper_util::client::legacy::Error),

    #[error("backend response body could not be read: {0}")]
    Body(#[source] axum::Error),

    #[error("could not build backend request: {0}")]
    Request(String),
}

impl ForwardError {
    /// Upstream error kind reported to the translation stage.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ForwardError::Timeout(_) => ErrorKind::Timeout,
            ForwardError::Connect(_) => ErrorKind::NoConnections,
            ForwardError::Transport(_) | ForwardError::Body(_) => ErrorKind::ConnectionFault,
            ForwardError::Request(_) => ErrorKind::Unclassified,
        }
    }

    /// Envelope describing this failure, with no places.
    pub fn into_envelope(self) -> Envelope {
        Envelope::failed(UpstreamError::new(self.kind(), self.to_string()))
    }
}

impl IntoResponse for ForwardError {
    fn into_response(self) -> axum::response::Response {
        (StatusCode::BAD_GATEWAY, Json(self.into_envelope())).into_response()
    }
}

/// Remove hop-by-hop headers, including any named by `Connection`.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in HOP_BY_HOP.iter().chain(listed.iter()) {
        headers.remove(name);
    }
}

/// HTTP client bound to one backend.
#[derive(Clone)]
pub struct UpstreamClient {
    base_url: Url,
    timeout: Duration,
    max_body_bytes: usize,
    client: Client<HttpConnector, Body>,
}

impl UpstreamClient {
    pub fn new(base_url: Url, timeout: Duration, max_body_bytes: usize) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Self {
            base_url,
            timeout,
            max_body_bytes,
            client,
        }
    }

    /// Backend URI for `path`, keeping `query` and any base path.
    pub fn target_uri(&self, path: &str, query: Option<&str>) -> Result<Uri, ForwardError> {
        let mut url = self.base_url.clone();
        let joined = format!("{}{}", self.base_url.path().trim_end_matches('/'), path);
        url.set_path(&joined);
        url.set_query(query);
        url.as_str()
            .parse()
            .map_err(|e: axum::http::uri::InvalidUri| ForwardError::Request(e.to_string()))
    }

    /// Send `request` to the backend at `path` and buffer the answer.
    ///
    /// The deadline runs until the last body byte arrives, so a backend that
    /// stalls mid-body is a timeout like one that never answers.
    pub async fn forward(
        &self,
        request: Request<Body>,
        path: &str,
    ) -> Result<Response<Body>, ForwardError> {
        let (parts, body) = request.into_parts();
        let uri = self.target_uri(path, parts.uri.query())?;

        let mut headers = parts.headers;
        headers.remove(header::HOST);
        strip_hop_by_hop(&mut headers);

        let mut builder = Request::builder().method(parts.method).uri(uri);
        if let Some(outgoing) = builder.headers_mut() {
            *outgoing = headers;
        }
        let request = builder
            .body(body)
            .map_err(|e| ForwardError::Request(e.to_string()))?;

        let exchange = async {
            let response = self.client.request(request).await.map_err(|e| {
                if e.is_connect() {
                    ForwardError::Connect(e)
                } else {
                    ForwardError::Transport(e)
                }
            })?;

            let (mut parts, body) = response.into_parts();
            let bytes = axum::body::to_bytes(Body::new(body), self.max_body_bytes)
                .await
                .map_err(ForwardError::Body)?;
            strip_hop_by_hop(&mut parts.headers);
            Ok::<_, ForwardError>(Response::from_parts(parts, Body::from(bytes)))
        };

        match tokio::time::timeout(self.timeout, exchange).await {
            Ok(result) => result,
            Err(_) => Err(ForwardError::Timeout(self.timeout)),
        }
    }
}
