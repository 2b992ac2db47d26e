//! # Verso HTTP
//!
//! HTTP binding for the Verso version negotiation engine.
//!
//! Adapts `http` crate request types into the engine's
//! [`VersionedRequest`](verso_core::VersionedRequest) capability,
//! including `Accept`/`Content-Type` media-type parameters, and formats
//! the discovery and sunset response headers from engine outputs. The
//! decision logic itself lives in `verso-core`; this crate only
//! translates at the boundary.

mod media_type;
pub mod report;
mod surfaces;

pub use media_type::{parse_header, MediaType};
pub use surfaces::HttpSurfaces;
