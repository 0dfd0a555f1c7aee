//! Upstream error kinds and their HTTP status classification.
//!
//! # Responsibilities
//! - Represent the error entries a search backend attaches to its envelope
//! - Map each kind to an HTTP status code
//! - Reduce a list of entries to a single response status
//!
//! # Design Decisions
//! - Kinds are tagged by the upstream boundary, never inferred from messages
//! - Unknown tags and bare strings fall into `Unclassified`
//! - Aggregation is the numeric maximum, not the first or most specific entry

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

/// Kind of an upstream error entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Request parameters failed validation.
    Parameter,
    /// The search service gave up waiting on its own backend.
    Timeout,
    /// The search engine client library reported a request timeout.
    RequestTimeout,
    /// No connection to the search engine was available.
    NoConnections,
    /// A connection to the search engine failed mid-flight.
    ConnectionFault,
    /// Anything else.
    #[serde(other)]
    Unclassified,
}

impl ErrorKind {
    /// HTTP status this kind maps to.
    pub fn status_code(self) -> StatusCode {
        match self {
            ErrorKind::Parameter => StatusCode::BAD_REQUEST,
            ErrorKind::Timeout
            | ErrorKind::RequestTimeout
            | ErrorKind::NoConnections
            | ErrorKind::ConnectionFault => StatusCode::BAD_GATEWAY,
            ErrorKind::Unclassified => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable label used in logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Parameter => "parameter",
            ErrorKind::Timeout => "timeout",
            ErrorKind::RequestTimeout => "request_timeout",
            ErrorKind::NoConnections => "no_connections",
            ErrorKind::ConnectionFault => "connection_fault",
            ErrorKind::Unclassified => "unclassified",
        }
    }
}

/// One entry of `geocoding.errors`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "WireError")]
pub struct UpstreamError {
    pub kind: ErrorKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl UpstreamError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: Some(message.into()),
        }
    }
}

/// Shapes an error entry may take on the wire.
#[derive(Deserialize)]
#[serde(untagged)]
enum WireError {
    Tagged {
        kind: ErrorKind,
        #[serde(default)]
        message: Option<String>,
    },
    Message(String),
    Other(serde_json::Value),
}

impl From<WireError> for UpstreamError {
    fn from(wire: WireError) -> Self {
        match wire {
            WireError::Tagged { kind, message } => Self { kind, message },
            WireError::Message(message) => Self {
                kind: ErrorKind::Unclassified,
                message: Some(message),
            },
            WireError::Other(_) => Self {
                kind: ErrorKind::Unclassified,
                message: None,
            },
        }
    }
}

/// Response status for a set of upstream errors: the highest of 200 and
/// every entry's mapped code.
pub fn aggregate_status(errors: &[UpstreamError]) -> StatusCode {
    errors
        .iter()
        .map(|e| e.kind.status_code())
        .chain(std::iter::once(StatusCode::OK))
        .max_by_key(|code| code.as_u16())
        .unwrap_or(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(kind: ErrorKind) -> UpstreamError {
        UpstreamError::new(kind, "boom")
    }

    #[test]
    fn test_kind_classification() {
        assert_eq!(ErrorKind::Parameter.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorKind::Timeout.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(ErrorKind::RequestTimeout.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(ErrorKind::NoConnections.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(ErrorKind::ConnectionFault.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(ErrorKind::Unclassified.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_no_errors_is_ok() {
        assert_eq!(aggregate_status(&[]), StatusCode::OK);
    }

    #[test]
    fn test_highest_code_wins() {
        let errors = vec![entry(ErrorKind::Parameter), entry(ErrorKind::ConnectionFault)];
        assert_eq!(aggregate_status(&errors), StatusCode::BAD_GATEWAY);

        // 500 beats 400 but loses to 502
        let errors = vec![entry(ErrorKind::Parameter), entry(ErrorKind::Unclassified)];
        assert_eq!(aggregate_status(&errors), StatusCode::INTERNAL_SERVER_ERROR);

        let errors = vec![entry(ErrorKind::Unclassified), entry(ErrorKind::Timeout)];
        assert_eq!(aggregate_status(&errors), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_wire_shapes() {
        let errors: Vec<UpstreamError> = serde_json::from_value(json!([
            {"kind": "parameter", "message": "'point.lat' is a required parameter"},
            {"kind": "no_connections"},
            {"kind": "disk_full", "message": "?"},
            "plain message",
            {"message": "no kind at all"},
            42
        ]))
        .unwrap();

        let kinds: Vec<ErrorKind> = errors.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ErrorKind::Parameter,
                ErrorKind::NoConnections,
                ErrorKind::Unclassified,
                ErrorKind::Unclassified,
                ErrorKind::Unclassified,
                ErrorKind::Unclassified,
            ]
        );
        assert_eq!(errors[3].message.as_deref(), Some("plain message"));
        assert_eq!(errors[1].message, None);
    }

    #[test]
    fn test_serialized_form_round_trips_kind() {
        let value = serde_json::to_value(entry(ErrorKind::RequestTimeout)).unwrap();
        assert_eq!(value, json!({"kind": "request_timeout", "message": "boom"}));
    }
}
