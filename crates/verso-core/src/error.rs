//! Error types for version negotiation and endpoint selection.

use crate::convention::EndpointId;
use crate::version::ApiVersion;
use std::fmt;
use thiserror::Error;

/// A raw version token could not be parsed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The token was empty or whitespace-only.
    #[error("empty version token")]
    Empty,

    /// The token matched none of the supported shapes.
    #[error("unrecognized version token {0:?}")]
    Malformed(String),

    /// A numeric component was not a non-negative integer, or overflowed.
    #[error("invalid numeric component {component:?} in version token {token:?}")]
    InvalidNumber { token: String, component: String },

    /// A calendar component was out of range.
    #[error("invalid calendar component {component:?} in version token {token:?}")]
    InvalidDate { token: String, component: String },

    /// A status label was empty or contained non-alphanumeric characters.
    #[error("invalid status label {status:?} in version token {token:?}")]
    InvalidStatus { token: String, status: String },

    /// The token combined a calendar version with a numeric version.
    #[error("version token {0:?} mixes calendar and numeric forms")]
    MixedComponents(String),
}

/// Reading the requested version from a request failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReadError {
    /// A token found by one of the configured sources failed to parse.
    #[error("cannot parse version token {token:?} from {origin}: {error}")]
    Parse {
        /// Description of the source the token came from.
        origin: String,
        /// The offending raw token.
        token: String,
        /// The underlying parse failure.
        #[source]
        error: ParseError,
    },

    /// Different sources named different versions on the same request.
    #[error("request names multiple distinct api versions: {}", comma_join(.candidates))]
    Ambiguous {
        /// All distinct versions found, sorted.
        candidates: Vec<ApiVersion>,
    },
}

/// Selecting an endpoint for a requested version failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SelectError {
    /// The candidate list was empty. This is a caller bug, not a version
    /// mismatch.
    #[error("no candidate endpoints were supplied")]
    NoCandidates,

    /// No candidate endpoint serves the requested version.
    #[error("no endpoint serves api version {}", requested_label(.requested.as_ref()))]
    Unmatched {
        /// The version the request resolved to, if any.
        requested: Option<ApiVersion>,
    },

    /// Two or more sibling endpoints claim the same version. This is a
    /// registration defect, not a client error.
    #[error(
        "multiple endpoints claim api version {}: {}",
        requested_label(.version.as_ref()),
        comma_join(.endpoints)
    )]
    AmbiguousMatch {
        /// The version the request resolved to, if any.
        version: Option<ApiVersion>,
        /// The conflicting endpoints, sorted.
        endpoints: Vec<EndpointId>,
    },
}

/// A declarative convention set could not be built into version models.
///
/// Raised at build time so misconfiguration surfaces before any traffic
/// is served.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConventionError {
    /// An endpoint was mapped to a version that neither it nor its
    /// controller declares.
    #[error("endpoint {endpoint} maps to api version {version}, which is not declared")]
    UnmappedVersion {
        endpoint: EndpointId,
        version: ApiVersion,
    },

    /// Two or more endpoints on the same route declare no versions, so a
    /// fallback match between them would be arbitrary.
    #[error(
        "route {route:?} has multiple endpoints without declared versions: {}",
        comma_join(.endpoints)
    )]
    AmbiguousImplicit {
        route: String,
        endpoints: Vec<EndpointId>,
    },
}

fn comma_join<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn requested_label(version: Option<&ApiVersion>) -> String {
    match version {
        Some(version) => version.to_string(),
        None => "(unspecified)".to_string(),
    }
}
