//! Sunset policies: deprecation metadata attached to versions.
//!
//! A [`SunsetPolicy`] says when a version stops being served and where to
//! read more. Policies attach to versions, not endpoints, and live in a
//! [`SunsetPolicyRegistry`] the host consults after selection to emit
//! deprecation response headers.

use crate::version::ApiVersion;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A typed link accompanying a sunset policy, in the shape of an RFC 8288
/// web link: a target, an optional media type, and an optional human
/// title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkHint {
    target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    media_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
}

impl LinkHint {
    /// A link to the given target URI.
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            media_type: None,
            title: None,
        }
    }

    /// Set the link's media type, e.g. `text/html`.
    pub fn media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }

    /// Set a human-readable title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// The link target URI.
    pub fn target_str(&self) -> &str {
        &self.target
    }

    /// The link's media type, if set.
    pub fn media_type_str(&self) -> Option<&str> {
        self.media_type.as_deref()
    }

    /// The link's title, if set.
    pub fn title_str(&self) -> Option<&str> {
        self.title.as_deref()
    }
}

/// Deprecation metadata for one version: an optional effective instant
/// and an ordered list of links.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SunsetPolicy {
    #[serde(skip_serializing_if = "Option::is_none")]
    effective: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    links: Vec<LinkHint>,
}

impl SunsetPolicy {
    /// A policy with no date and no links.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the instant the version stops being served.
    pub fn effective(mut self, at: DateTime<Utc>) -> Self {
        self.effective = Some(at);
        self
    }

    /// Append a link. Order is preserved.
    pub fn link(mut self, link: LinkHint) -> Self {
        self.links.push(link);
        self
    }

    /// The effective instant, if set.
    pub fn effective_at(&self) -> Option<DateTime<Utc>> {
        self.effective
    }

    /// The policy's links, in insertion order.
    pub fn links(&self) -> &[LinkHint] {
        &self.links
    }
}

/// Maps versions to sunset policies, with an optional API-wide default.
///
/// Resolution never merges: a version-specific policy wholly overrides
/// the default, field by field or not at all.
#[derive(Debug, Clone, Default)]
pub struct SunsetPolicyRegistry {
    by_version: BTreeMap<ApiVersion, SunsetPolicy>,
    default: Option<SunsetPolicy>,
}

impl SunsetPolicyRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a policy to a specific version.
    pub fn for_version(mut self, version: ApiVersion, policy: SunsetPolicy) -> Self {
        self.by_version.insert(version, policy);
        self
    }

    /// Set the API-wide default policy, used for any version without its
    /// own.
    pub fn for_default(mut self, policy: SunsetPolicy) -> Self {
        self.default = Some(policy);
        self
    }

    /// Resolve the effective policy for `version`. A `None` version (an
    /// unversioned selection) can only resolve the default.
    pub fn resolve(&self, version: Option<&ApiVersion>) -> Option<&SunsetPolicy> {
        match version {
            Some(version) => self.by_version.get(version).or(self.default.as_ref()),
            None => self.default.as_ref(),
        }
    }
}
