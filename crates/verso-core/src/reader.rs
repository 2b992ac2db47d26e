//! Multi-source version reading.
//!
//! A [`VersionReader`] runs an ordered set of [`VersionSource`] strategies
//! against a request and produces the single version the caller asked for,
//! nothing, or an ambiguity error. Every enabled source is always
//! consulted: two sources naming different versions on one request is a
//! hard error, never resolved by priority.

use crate::error::ReadError;
use crate::request::VersionedRequest;
use crate::version::ApiVersion;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::trace;

/// A single place a raw version token can be read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VersionSource {
    /// A query-string parameter, e.g. `?api-version=2.0`.
    Query { name: String },

    /// A request header, e.g. `x-api-version: 2.0`.
    Header { name: String },

    /// A media-type parameter on `Accept` or `Content-Type`, e.g.
    /// `application/json; v=2.0`.
    MediaTypeParam { name: String },

    /// A matched route-template segment, e.g. `/v{version}/orders`.
    UrlSegment { name: String },
}

impl VersionSource {
    /// Query-parameter source with the conventional name `api-version`.
    pub fn query() -> Self {
        Self::Query {
            name: "api-version".to_string(),
        }
    }

    /// Query-parameter source with a custom parameter name.
    pub fn query_named(name: impl Into<String>) -> Self {
        Self::Query { name: name.into() }
    }

    /// Header source with the conventional name `x-api-version`.
    pub fn header() -> Self {
        Self::Header {
            name: "x-api-version".to_string(),
        }
    }

    /// Header source with a custom header name.
    pub fn header_named(name: impl Into<String>) -> Self {
        Self::Header { name: name.into() }
    }

    /// Media-type parameter source with the conventional name `v`.
    pub fn media_type_param() -> Self {
        Self::MediaTypeParam {
            name: "v".to_string(),
        }
    }

    /// Media-type parameter source with a custom parameter name.
    pub fn media_type_param_named(name: impl Into<String>) -> Self {
        Self::MediaTypeParam { name: name.into() }
    }

    /// URL-segment source with the conventional segment name `version`.
    pub fn url_segment() -> Self {
        Self::UrlSegment {
            name: "version".to_string(),
        }
    }

    /// URL-segment source with a custom segment name.
    pub fn url_segment_named(name: impl Into<String>) -> Self {
        Self::UrlSegment { name: name.into() }
    }

    fn collect<'r, R>(&self, request: &'r R) -> Vec<&'r str>
    where
        R: VersionedRequest + ?Sized,
    {
        match self {
            Self::Query { name } => request.query_values(name),
            Self::Header { name } => request.header_values(name),
            Self::MediaTypeParam { name } => request.media_type_params(name),
            Self::UrlSegment { name } => request.route_value(name).into_iter().collect(),
        }
    }
}

impl fmt::Display for VersionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Query { name } => write!(f, "query parameter {name:?}"),
            Self::Header { name } => write!(f, "header {name:?}"),
            Self::MediaTypeParam { name } => write!(f, "media type parameter {name:?}"),
            Self::UrlSegment { name } => write!(f, "url segment {name:?}"),
        }
    }
}

/// Reads the requested API version from a request.
///
/// All configured sources run on every read. Raw tokens are deduplicated
/// case-sensitively before parsing; distinct spellings of the same
/// version (`"1"` and `"1.0"`) collapse to one value, while genuinely
/// different versions across sources raise [`ReadError::Ambiguous`].
///
/// The source list is serializable so hosts can load it from
/// configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionReader {
    sources: Vec<VersionSource>,
}

impl VersionReader {
    /// Reader with the default source: query parameter `api-version`.
    pub fn new() -> Self {
        Self {
            sources: vec![VersionSource::query()],
        }
    }

    /// Reader with no sources. Every read yields "unspecified" until
    /// sources are added.
    pub fn empty() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    /// Reader over an explicit source list, tried in order.
    pub fn with_sources(sources: Vec<VersionSource>) -> Self {
        Self { sources }
    }

    /// Append a source.
    pub fn source(mut self, source: VersionSource) -> Self {
        self.sources.push(source);
        self
    }

    /// The configured sources, in execution order.
    pub fn sources(&self) -> &[VersionSource] {
        &self.sources
    }

    /// Extract the requested version from `request`.
    ///
    /// Returns `Ok(None)` when no source finds a token, `Ok(Some(..))`
    /// when all found tokens parse to one distinct version, and
    /// [`ReadError::Ambiguous`] with every distinct candidate otherwise.
    pub fn read<R>(&self, request: &R) -> Result<Option<ApiVersion>, ReadError>
    where
        R: VersionedRequest + ?Sized,
    {
        let mut raw: Vec<(&VersionSource, &str)> = Vec::new();
        for source in &self.sources {
            for value in source.collect(request) {
                let value = value.trim();
                if value.is_empty() {
                    continue;
                }
                if !raw.iter().any(|(_, seen)| *seen == value) {
                    raw.push((source, value));
                }
            }
        }

        let mut candidates: Vec<ApiVersion> = Vec::new();
        for (source, token) in &raw {
            let version: ApiVersion =
                token.parse().map_err(|error| ReadError::Parse {
                    origin: source.to_string(),
                    token: (*token).to_string(),
                    error,
                })?;
            if !candidates.contains(&version) {
                candidates.push(version);
            }
        }

        match candidates.len() {
            0 => Ok(None),
            1 => {
                trace!(version = %candidates[0], "resolved requested api version");
                Ok(candidates.pop())
            }
            _ => {
                candidates.sort();
                Err(ReadError::Ambiguous { candidates })
            }
        }
    }
}

impl Default for VersionReader {
    fn default() -> Self {
        Self::new()
    }
}
