//! Geocoding response translation subsystem.
//!
//! # Data Flow
//! ```text
//! backend JSON body
//!     → translator.rs (guard: is there a `geocoding` object?)
//!     → envelope.rs (decode into typed features + error entries)
//!     → errors.rs (classify each error, take the numeric max)
//!     → google.rs (build the client-facing result schema)
//!     → Outcome::Respond { status, body } | Outcome::Delegate
//! ```
//!
//! # Design Decisions
//! - Error kinds are a closed enum assigned at the upstream boundary
//! - Malformed payloads fail in one explicit decode step
//! - The translator never touches the response; the caller applies the outcome

pub mod envelope;
pub mod errors;
pub mod google;
pub mod translator;

pub use envelope::{DecodeError, Envelope, Feature};
pub use errors::{aggregate_status, ErrorKind, UpstreamError};
pub use google::{GeocodeResponse, PlaceResult, PlusCode};
pub use translator::{MissingFeatures, Outcome, ResponseTranslator, TranslateError};
