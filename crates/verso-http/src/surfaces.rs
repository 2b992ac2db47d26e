//! Version surfaces over `http` crate request types.

use crate::media_type;
use http::header::{ACCEPT, CONTENT_TYPE};
use http::request::Parts;
use http::HeaderMap;
use verso_core::VersionedRequest;

/// [`VersionedRequest`] over a borrowed `http::request::Parts`.
///
/// The query string and the media-type parameters of `Accept` and
/// `Content-Type` are parsed once at construction; headers are read
/// through on demand. Route-segment values come from the host router via
/// [`with_route_value`](Self::with_route_value), since `http` itself
/// knows nothing about route templates.
///
/// # Example
///
/// ```rust
/// use verso_core::VersionReader;
/// use verso_http::HttpSurfaces;
///
/// let request = http::Request::builder()
///     .uri("/orders?api-version=2.0")
///     .body(())
///     .unwrap();
/// let (parts, _) = request.into_parts();
///
/// let reader = VersionReader::new();
/// let version = reader.read(&HttpSurfaces::from_parts(&parts)).unwrap();
/// assert_eq!(version.unwrap().to_string(), "2.0");
/// ```
#[derive(Debug, Clone)]
pub struct HttpSurfaces<'r> {
    headers: &'r HeaderMap,
    query: Vec<(String, String)>,
    media_params: Vec<(String, String)>,
    route: Vec<(String, String)>,
}

impl<'r> HttpSurfaces<'r> {
    /// Build surfaces from request parts.
    pub fn from_parts(parts: &'r Parts) -> Self {
        let query = parts
            .uri
            .query()
            .and_then(|query| serde_urlencoded::from_str::<Vec<(String, String)>>(query).ok())
            .unwrap_or_default();

        let mut media_params = Vec::new();
        for header in [ACCEPT, CONTENT_TYPE] {
            for value in parts.headers.get_all(&header) {
                if let Ok(text) = value.to_str() {
                    for range in media_type::parse_header(text) {
                        media_params.extend_from_slice(range.parameters());
                    }
                }
            }
        }

        Self {
            headers: &parts.headers,
            query,
            media_params,
            route: Vec::new(),
        }
    }

    /// Attach the value the host router matched for a route-template
    /// segment, enabling URL-segment versioning.
    pub fn with_route_value(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.route.push((name.into(), value.into()));
        self
    }
}

impl VersionedRequest for HttpSurfaces<'_> {
    fn query_values(&self, name: &str) -> Vec<&str> {
        self.query
            .iter()
            .filter(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
            .collect()
    }

    fn header_values(&self, name: &str) -> Vec<&str> {
        self.headers
            .get_all(name)
            .iter()
            .filter_map(|value| value.to_str().ok())
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

#[cfg(test)]
mod tests {
    use super::*;
    use verso_core::{ApiVersion, VersionReader, VersionSource};

    fn parts(builder: http::request::Builder) -> Parts {
        let (parts, _) = builder.body(()).unwrap().into_parts();
        parts
    }

    #[test]
    fn test_query_values_are_percent_decoded() {
        let parts = parts(http::Request::builder().uri("/orders?api-version=2%2E0&other=x"));
        let surfaces = HttpSurfaces::from_parts(&parts);
        assert_eq!(surfaces.query_values("api-version"), vec!["2.0"]);
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let parts = parts(
            http::Request::builder()
                .uri("/orders")
                .header("X-Api-Version", "2.0"),
        );
        let surfaces = HttpSurfaces::from_parts(&parts);
        assert_eq!(surfaces.header_values("x-api-version"), vec!["2.0"]);
    }

    #[test]
    fn test_media_type_params_come_from_accept_and_content_type() {
        let parts = parts(
            http::Request::builder()
                .uri("/orders")
                .header("accept", "application/vnd.acme+json; v=2.0")
                .header("content-type", "application/json; v=2.0"),
        );
        let surfaces = HttpSurfaces::from_parts(&parts);
        assert_eq!(surfaces.media_type_params("v"), vec!["2.0", "2.0"]);
    }

    #[test]
    fn test_route_value_round_trip() {
        let parts = parts(http::Request::builder().uri("/v3/orders"));
        let surfaces = HttpSurfaces::from_parts(&parts).with_route_value("version", "3");
        assert_eq!(surfaces.route_value("version"), Some("3"));
    }

    #[test]
    fn test_reader_over_http_request() {
        let parts = parts(
            http::Request::builder()
                .uri("/orders")
                .header("accept", "application/vnd.acme+json; v=2.0"),
        );
        let reader = VersionReader::with_sources(vec![VersionSource::media_type_param()]);
        let version = reader.read(&HttpSurfaces::from_parts(&parts)).unwrap();
        assert_eq!(version, Some(ApiVersion::new(2, 0)));
    }
}
