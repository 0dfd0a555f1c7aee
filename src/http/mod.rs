//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID assigned or kept)
//!     → routing table picks the backend path
//!     → upstream client forwards to the search backend
//!     → response.rs (translate geocoding bodies, pass everything else)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{MakeRequestUuidV4, RequestIdExt, X_REQUEST_ID};
pub use response::{translate_response, RouteLabel, TranslationState};
pub use server::HttpServer;
