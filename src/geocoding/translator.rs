//! Backend-to-client response translation.
//!
//! # Responsibilities
//! - Decide whether a body is a geocoding result at all
//! - Derive the HTTP status from the embedded error entries
//! - Map every place feature into the client result schema
//!
//! # Design Decisions
//! - Pure and synchronous: no I/O, no shared mutable state
//! - Two outcomes only: delegate untouched, or respond with a built body
//! - Results are built even for error statuses; clients always get `results`

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geocoding::envelope::{DecodeError, Envelope};
use crate::geocoding::errors::aggregate_status;
use crate::geocoding::google::{GeocodeResponse, PlaceResult, PlusCode};

/// What to do when a geocoding body carries no `features` list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingFeatures {
    /// Fail the translation.
    #[default]
    Reject,
    /// Translate as if the list were empty.
    Empty,
}

#[derive(Debug, Error)]
pub enum TranslateError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("backend envelope has no features list")]
    MissingFeatures,
}

/// Result of running the translator over one response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Not a geocoding body; hand it on unchanged.
    Delegate,
    /// Send this body with this status.
    Respond {
        status: StatusCode,
        body: GeocodeResponse,
    },
}

/// Stateless translator, shared across requests.
#[derive(Debug, Clone)]
pub struct ResponseTranslator {
    plus_code: PlusCode,
    missing_features: MissingFeatures,
}

impl Default for ResponseTranslator {
    fn default() -> Self {
        Self::new(PlusCode::fallback(), MissingFeatures::default())
    }
}

impl ResponseTranslator {
    pub fn new(plus_code: PlusCode, missing_features: MissingFeatures) -> Self {
        Self {
            plus_code,
            missing_features,
        }
    }

    /// Translate a parsed backend body.
    ///
    /// Returns [`Outcome::Delegate`] when `geocoding` is absent or not an
    /// object. Otherwise the body is decoded and translated in full.
    pub fn translate(&self, body: &serde_json::Value) -> Result<Outcome, TranslateError> {
        let is_geocoding = body
            .get("geocoding")
            .is_some_and(serde_json::Value::is_object);
        if !is_geocoding {
            return Ok(Outcome::Delegate);
        }

        let envelope = Envelope::decode(body)?;
        self.translate_envelope(&envelope)
    }

    /// Translate an already-typed envelope.
    pub fn translate_envelope(&self, envelope: &Envelope) -> Result<Outcome, TranslateError> {
        let status = aggregate_status(envelope.errors());

        let results = match (&envelope.features, self.missing_features) {
            (Some(features), _) => features.iter().map(PlaceResult::from).collect(),
            (None, MissingFeatures::Empty) => Vec::new(),
            (None, MissingFeatures::Reject) => return Err(TranslateError::MissingFeatures),
        };

        Ok(Outcome::Respond {
            status,
            body: GeocodeResponse::new(self.plus_code.clone(), results),
        })
    }
}
