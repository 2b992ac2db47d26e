//! Response-header formatting for discovery and deprecation metadata.
//!
//! The engine decides; these helpers turn its outputs into wire header
//! values: `api-supported-versions` / `api-deprecated-versions` for
//! discovery, and `Deprecation` / `Sunset` / `Link` for sunset policies.

use chrono::{DateTime, Utc};
use verso_core::{ApiVersion, ApiVersionModel, Selection, SunsetPolicy};

/// Header listing the versions an endpoint actively serves.
pub const API_SUPPORTED_VERSIONS: &str = "api-supported-versions";
/// Header listing the versions an endpoint still serves but deprecates.
pub const API_DEPRECATED_VERSIONS: &str = "api-deprecated-versions";
/// Header flagging that the answered version is deprecated.
pub const DEPRECATION: &str = "deprecation";
/// Header carrying the sunset instant, as an HTTP-date.
pub const SUNSET: &str = "sunset";
/// Header carrying sunset-related links.
pub const LINK: &str = "link";

/// `api-supported-versions` value for a model, or `None` when the model
/// supports nothing (neutral endpoints advertise no versions).
pub fn supported_versions(model: &ApiVersionModel) -> Option<String> {
    join(model.supported())
}

/// `api-deprecated-versions` value for a model.
pub fn deprecated_versions(model: &ApiVersionModel) -> Option<String> {
    join(model.deprecated())
}

/// `Deprecation` value for a selection: `"true"` when the answered
/// version is deprecated on the winning endpoint.
pub fn deprecation(selection: &Selection) -> Option<String> {
    selection.deprecated.then(|| "true".to_string())
}

/// `Sunset` value for a policy, as an RFC 7231 HTTP-date.
pub fn sunset(policy: &SunsetPolicy) -> Option<String> {
    policy.effective_at().map(http_date)
}

/// `Link` values for a policy's links, one per link, in policy order.
/// Each is an RFC 8288 web link with `rel="sunset"`.
pub fn sunset_links(policy: &SunsetPolicy) -> Vec<String> {
    policy
        .links()
        .iter()
        .map(|link| {
            let mut value = format!("<{}>; rel=\"sunset\"", link.target_str());
            if let Some(media_type) = link.media_type_str() {
                value.push_str("; type=\"");
                value.push_str(media_type);
                value.push('"');
            }
            if let Some(title) = link.title_str() {
                value.push_str("; title=\"");
                value.push_str(title);
                value.push('"');
            }
            value
        })
        .collect()
}

fn join(versions: &[ApiVersion]) -> Option<String> {
    if versions.is_empty() {
        return None;
    }
    Some(
        versions
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", "),
    )
}

fn http_date(at: DateTime<Utc>) -> String {
    at.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use verso_core::{EndpointId, LinkHint};

    fn v(major: u64, minor: u64) -> ApiVersion {
        ApiVersion::new(major, minor)
    }

    #[test]
    fn test_discovery_headers_list_sorted_versions() {
        let model = ApiVersionModel::new(
            vec![v(1, 0), v(2, 0)],
            vec![v(2, 0), v(1, 0)],
            vec![v(0, 9)],
            Vec::new(),
            Vec::new(),
        );
        assert_eq!(supported_versions(&model), Some("1.0, 2.0".to_string()));
        assert_eq!(deprecated_versions(&model), Some("0.9".to_string()));
    }

    #[test]
    fn test_neutral_model_reports_nothing() {
        let model = ApiVersionModel::neutral();
        assert_eq!(supported_versions(&model), None);
        assert_eq!(deprecated_versions(&model), None);
    }

    #[test]
    fn test_deprecation_flag() {
        let selection = Selection {
            endpoint: EndpointId::new("orders", "list"),
            version: Some(v(0, 9)),
            deprecated: true,
        };
        assert_eq!(deprecation(&selection), Some("true".to_string()));

        let current = Selection {
            deprecated: false,
            ..selection
        };
        assert_eq!(deprecation(&current), None);
    }

    #[test]
    fn test_sunset_http_date() {
        let policy = SunsetPolicy::new()
            .effective(Utc.with_ymd_and_hms(2027, 6, 1, 12, 0, 0).unwrap());
        assert_eq!(sunset(&policy), Some("Tue, 01 Jun 2027 12:00:00 GMT".to_string()));
    }

    #[test]
    fn test_sunset_link_formatting() {
        let policy = SunsetPolicy::new().link(
            LinkHint::new("https://example.com/retirement")
                .media_type("text/html")
                .title("Retirement plan"),
        );
        assert_eq!(
            sunset_links(&policy),
            vec![
                "<https://example.com/retirement>; rel=\"sunset\"; type=\"text/html\"; title=\"Retirement plan\""
                    .to_string()
            ]
        );
    }
}
