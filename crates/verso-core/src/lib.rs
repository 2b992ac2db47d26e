//! # Verso Core
//!
//! Framework-independent API version negotiation and endpoint selection.
//!
//! One HTTP service can serve several API versions at once; this crate
//! decides, per request, which version the caller asked for and which of
//! the competing endpoint implementations should answer. It owns no
//! transport: hosts feed it request surfaces and candidate endpoints,
//! and read back a selection, typed errors, and deprecation metadata.
//!
//! The pieces, leaf first:
//!
//! - [`ApiVersion`]: the immutable version value type.
//! - [`VersionReader`] / [`VersionSource`]: multi-source extraction
//!   with cross-source ambiguity detection.
//! - [`ApiVersionModel`]: aggregated per-endpoint version sets.
//! - [`EndpointConventions`]: declarative and programmatic version
//!   assignment, built into an immutable snapshot.
//! - [`EndpointSelector`]: the matching engine.
//! - [`SunsetPolicyRegistry`]: deprecation metadata per version.
//!
//! Everything on the request path is pure and lock-free; all mutable
//! construction happens up front and publishes immutable values.

mod convention;
mod error;
mod model;
mod reader;
mod request;
mod select;
mod sunset;
mod version;

pub use convention::{
    ActionConvention, ApiVersionMap, ControllerConvention, DeclaredVersions, EndpointConventions,
    EndpointId, VersionByGroupName, VersionConvention,
};
pub use error::{ConventionError, ParseError, ReadError, SelectError};
pub use model::{ApiVersionModel, VersionMapping};
pub use reader::{VersionReader, VersionSource};
pub use request::{RequestSurfaces, VersionedRequest};
pub use select::{
    Candidate, EndpointSelector, Highest, HighestStable, Lowest, Selection, VersionPolicy,
};
pub use sunset::{LinkHint, SunsetPolicy, SunsetPolicyRegistry};
pub use version::{ApiVersion, GroupVersion};
