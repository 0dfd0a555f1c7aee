//! Search backend boundary.
//!
//! # Data Flow
//! ```text
//! matched route + client request
//!     → client.rs (rewrite URI, copy headers, send with deadline)
//!     → backend response, or ForwardError
//!     → ForwardError → 502 + geocoding envelope with one typed error
//! ```

pub mod client;

pub use client::{ForwardError, UpstreamClient};
