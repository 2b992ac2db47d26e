//! Request surface abstraction consumed by the version reader.
//!
//! The engine never touches a transport. Hosts expose the four surfaces a
//! version can travel in (query string, headers, media-type parameters,
//! and a matched route segment) through [`VersionedRequest`], and the
//! reader stays a pure function of those surfaces.

/// The request surfaces a version token can be read from.
///
/// Implementations must be cheap to query and side-effect free; the
/// reader may probe any surface any number of times.
pub trait VersionedRequest {
    /// All values of the named query parameter, in request order.
    /// Names are case-sensitive.
    fn query_values(&self, name: &str) -> Vec<&str>;

    /// All values of the named header, in request order. Name lookup is
    /// case-insensitive.
    fn header_values(&self, name: &str) -> Vec<&str>;

    /// All values of the named media-type parameter gathered from the
    /// `Accept` and `Content-Type` surfaces. Parameter name lookup is
    /// case-insensitive.
    fn media_type_params(&self, name: &str) -> Vec<&str>;

    /// The value matched for a named route-template segment, if the host
    /// router matched one.
    fn route_value(&self, name: &str) -> Option<&str>;
}

/// An owned, transport-free implementation of [`VersionedRequest`].
///
/// Hosts without an HTTP binding (and tests) build one of these from
/// whatever request representation they have.
///
/// # Example
///
/// ```rust
/// use verso_core::{RequestSurfaces, VersionReader};
///
/// let request = RequestSurfaces::new().query("api-version", "2.0");
/// let reader = VersionReader::new();
/// let version = reader.read(&request).unwrap();
/// assert_eq!(version.unwrap().to_string(), "2.0");
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestSurfaces {
    query: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    media_params: Vec<(String, String)>,
    route: Vec<(String, String)>,
}

impl RequestSurfaces {
    /// Create an empty set of surfaces.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a query parameter value. Call repeatedly for multi-valued
    /// parameters.
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Add a header value. Call repeatedly for multi-valued headers.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into().to_ascii_lowercase(), value.into()));
        self
    }

    /// Add a media-type parameter, as parsed from `Accept` or
    /// `Content-Type`.
    pub fn media_type_param(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.media_params
            .push((name.into().to_ascii_lowercase(), value.into()));
        self
    }

    /// Record the value matched for a route-template segment.
    pub fn route(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.route.push((name.into(), value.into()));
        self
    }
}

impl VersionedRequest for RequestSurfaces {
    fn query_values(&self, name: &str) -> Vec<&str> {
        self.query
            .iter()
            .filter(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
            .collect()
    }

    fn header_values(&self, name: &str) -> Vec<&str> {
        self.headers
            .iter()
            .filter(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
            .collect()
    }

    fn media_type_params(&self, name: &str) -> Vec<&str> {
        self.media_params
            .iter()
            .filter(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
            .collect()
    }

    fn route_value(&self, name: &str) -> Option<&str> {
        self.route
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}
