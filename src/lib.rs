//! Geocoding API gateway.
//!
//! Forwards client requests to a search backend and rewrites its result
//! envelopes into the Google Geocoding API response shape.

pub mod config;
pub mod geocoding;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod upstream;

pub use config::schema::GatewayConfig;
pub use geocoding::{Outcome, ResponseTranslator};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
