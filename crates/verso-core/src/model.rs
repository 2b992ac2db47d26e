//! Per-endpoint version models.
//!
//! An [`ApiVersionModel`] is the aggregated, read-only answer to "which
//! versions does this endpoint declare, serve, and advertise". Models are
//! built once by the convention builder and then shared by reference
//! across concurrent requests.

use crate::version::ApiVersion;

/// How an endpoint relates to a requested version.
///
/// This tri-state drives selection tie-breaking: endpoints that
/// explicitly claim a version beat undeclared catch-alls, and undeclared
/// catch-alls beat nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionMapping {
    /// The version appears in the endpoint's declared, implemented, or
    /// advertised sets, or the endpoint is version-neutral.
    Explicit,
    /// The endpoint declares no versions at all and acts as a catch-all.
    Implicit,
    /// The endpoint does not serve this version.
    None,
}

/// Aggregated version sets for one endpoint.
///
/// All sets are sorted by the version ordering and de-duplicated.
/// `implemented` is always `supported ∪ deprecated`. A version-neutral
/// model has every set empty and matches any request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiVersionModel {
    declared: Vec<ApiVersion>,
    supported: Vec<ApiVersion>,
    deprecated: Vec<ApiVersion>,
    advertised: Vec<ApiVersion>,
    deprecated_advertised: Vec<ApiVersion>,
    implemented: Vec<ApiVersion>,
    neutral: bool,
}

impl ApiVersionModel {
    /// Build a model from its raw sets. Input order and duplicates are
    /// irrelevant; every set is normalized.
    pub fn new(
        declared: Vec<ApiVersion>,
        supported: Vec<ApiVersion>,
        deprecated: Vec<ApiVersion>,
        advertised: Vec<ApiVersion>,
        deprecated_advertised: Vec<ApiVersion>,
    ) -> Self {
        let supported = normalize(supported);
        let deprecated = normalize(deprecated);
        let implemented = union(&supported, &deprecated);
        Self {
            declared: normalize(declared),
            supported,
            deprecated,
            advertised: normalize(advertised),
            deprecated_advertised: normalize(deprecated_advertised),
            implemented,
            neutral: false,
        }
    }

    /// The model of an endpoint with no version declarations. Matches
    /// implicitly as a catch-all.
    pub fn empty() -> Self {
        Self::new(Vec::new(), Vec::new(), Vec::new(), Vec::new(), Vec::new())
    }

    /// The model of a version-neutral endpoint. All sets are empty and
    /// every request matches explicitly.
    pub fn neutral() -> Self {
        Self {
            neutral: true,
            ..Self::empty()
        }
    }

    /// Versions explicitly attributed to this endpoint, not inherited.
    pub fn declared(&self) -> &[ApiVersion] {
        &self.declared
    }

    /// Versions the endpoint actively serves (own plus inherited).
    pub fn supported(&self) -> &[ApiVersion] {
        &self.supported
    }

    /// Versions still served but flagged obsolete.
    pub fn deprecated(&self) -> &[ApiVersion] {
        &self.deprecated
    }

    /// Versions advertised for discovery but not implemented here.
    pub fn advertised(&self) -> &[ApiVersion] {
        &self.advertised
    }

    /// Deprecated versions advertised for discovery but not implemented
    /// here.
    pub fn deprecated_advertised(&self) -> &[ApiVersion] {
        &self.deprecated_advertised
    }

    /// Everything this endpoint will actually answer for:
    /// `supported ∪ deprecated`.
    pub fn implemented(&self) -> &[ApiVersion] {
        &self.implemented
    }

    /// Whether this endpoint opts out of version matching entirely.
    pub fn is_neutral(&self) -> bool {
        self.neutral
    }

    /// Whether the endpoint has any declared versions.
    pub fn has_declared(&self) -> bool {
        !self.declared.is_empty()
    }

    /// Whether `version` is flagged obsolete on this endpoint.
    /// Deprecation wins over support for reporting.
    pub fn is_deprecated(&self, version: &ApiVersion) -> bool {
        self.deprecated.binary_search(version).is_ok()
    }

    /// Compute how this endpoint relates to a requested version, or to an
    /// unspecified request (`None`).
    pub fn map(&self, requested: Option<&ApiVersion>) -> VersionMapping {
        if self.neutral {
            return VersionMapping::Explicit;
        }
        match requested {
            Some(version) => {
                let explicit = self.declared.binary_search(version).is_ok()
                    || self.implemented.binary_search(version).is_ok()
                    || self.advertised.binary_search(version).is_ok()
                    || self.deprecated_advertised.binary_search(version).is_ok();
                if explicit {
                    VersionMapping::Explicit
                } else if self.declared.is_empty() {
                    VersionMapping::Implicit
                } else {
                    VersionMapping::None
                }
            }
            None => {
                if self.declared.is_empty() {
                    VersionMapping::Implicit
                } else {
                    VersionMapping::None
                }
            }
        }
    }
}

impl Default for ApiVersionModel {
    fn default() -> Self {
        Self::empty()
    }
}

/// Sort and de-duplicate a version set.
pub(crate) fn normalize(mut versions: Vec<ApiVersion>) -> Vec<ApiVersion> {
    versions.sort();
    versions.dedup();
    versions
}

/// Sorted, de-duplicated union of two version sets.
pub(crate) fn union(a: &[ApiVersion], b: &[ApiVersion]) -> Vec<ApiVersion> {
    let mut merged = Vec::with_capacity(a.len() + b.len());
    merged.extend_from_slice(a);
    merged.extend_from_slice(b);
    normalize(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn v(major: u64, minor: u64) -> ApiVersion {
        ApiVersion::new(major, minor)
    }

    #[test]
    fn test_sets_are_sorted_and_deduplicated() {
        let model = ApiVersionModel::new(
            vec![v(2, 0), v(1, 0), v(2, 0)],
            vec![v(2, 0), v(1, 0)],
            Vec::new(),
            Vec::new(),
            Vec::new(),
        );
        assert_eq!(model.declared(), &[v(1, 0), v(2, 0)]);
        assert_eq!(model.supported(), &[v(1, 0), v(2, 0)]);
    }

    #[test]
    fn test_implemented_is_union_of_supported_and_deprecated() {
        let model = ApiVersionModel::new(
            vec![v(1, 0), v(2, 0), v(3, 0)],
            vec![v(2, 0), v(3, 0)],
            vec![v(1, 0), v(2, 0)],
            Vec::new(),
            Vec::new(),
        );
        assert_eq!(model.implemented(), &[v(1, 0), v(2, 0), v(3, 0)]);
        // A version may sit in both sets; deprecation wins for reporting.
        assert!(model.is_deprecated(&v(2, 0)));
    }

    #[test]
    fn test_neutral_model_is_empty_and_always_explicit() {
        let model = ApiVersionModel::neutral();
        assert!(model.is_neutral());
        assert!(model.declared().is_empty());
        assert!(model.implemented().is_empty());
        assert_eq!(model.map(Some(&v(42, 0))), VersionMapping::Explicit);
        assert_eq!(model.map(None), VersionMapping::Explicit);
    }

    #[test]
    fn test_mapping_explicit_for_declared_version() {
        let model = ApiVersionModel::new(
            vec![v(1, 0)],
            vec![v(1, 0)],
            Vec::new(),
            Vec::new(),
            Vec::new(),
        );
        assert_eq!(model.map(Some(&v(1, 0))), VersionMapping::Explicit);
        assert_eq!(model.map(Some(&v(2, 0))), VersionMapping::None);
        assert_eq!(model.map(None), VersionMapping::None);
    }

    #[test]
    fn test_mapping_explicit_for_advertised_version() {
        let model = ApiVersionModel::new(
            vec![v(1, 0)],
            vec![v(1, 0)],
            Vec::new(),
            vec![v(2, 0)],
            Vec::new(),
        );
        assert_eq!(model.map(Some(&v(2, 0))), VersionMapping::Explicit);
    }

    #[test]
    fn test_mapping_implicit_when_nothing_declared() {
        let model = ApiVersionModel::empty();
        assert_eq!(model.map(Some(&v(9, 0))), VersionMapping::Implicit);
        assert_eq!(model.map(None), VersionMapping::Implicit);
    }

    fn version_set() -> impl Strategy<Value = Vec<ApiVersion>> {
        proptest::collection::vec((0u64..6, 0u64..4), 0..8)
            .prop_map(|pairs| pairs.into_iter().map(|(a, b)| v(a, b)).collect())
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_implemented_equals_union(
            supported in version_set(),
            deprecated in version_set(),
        ) {
            let model = ApiVersionModel::new(
                Vec::new(),
                supported.clone(),
                deprecated.clone(),
                Vec::new(),
                Vec::new(),
            );
            let expected = union(&normalize(supported), &normalize(deprecated));
            prop_assert_eq!(model.implemented(), expected.as_slice());
        }
    }
}
