//! Endpoint selection.
//!
//! Given the requested version (or none) and the sibling endpoints bound
//! to one route, [`EndpointSelector::select`] picks exactly one endpoint
//! or fails with a typed error. Selection is a pure function: the same
//! inputs always produce the same outcome, with no dependence on hash
//! iteration order, so it is safe from any number of concurrent requests.

use crate::convention::EndpointId;
use crate::error::SelectError;
use crate::model::{self, ApiVersionModel, VersionMapping};
use crate::version::ApiVersion;
use std::sync::Arc;
use tracing::trace;

/// One endpoint competing for a route, with its resolved model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// The endpoint's identity.
    pub id: EndpointId,
    /// The endpoint's aggregated version model.
    pub model: ApiVersionModel,
}

impl Candidate {
    /// Pair an endpoint with its model.
    pub fn new(id: EndpointId, model: ApiVersionModel) -> Self {
        Self { id, model }
    }
}

/// Strategy for choosing a concrete version when the request names none.
///
/// Receives the sorted union of every candidate's implemented versions;
/// returns `None` only when that union is empty.
pub trait VersionPolicy: std::fmt::Debug + Send + Sync {
    /// Choose a version from the implemented union.
    fn choose(&self, implemented: &[ApiVersion]) -> Option<ApiVersion>;
}

/// Picks the maximum version by the total order. A pre-release of a
/// higher version outranks any released lower one: given `{1.0, 2.0,
/// 3.0-beta}` this chooses `3.0-beta`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Highest;

impl VersionPolicy for Highest {
    fn choose(&self, implemented: &[ApiVersion]) -> Option<ApiVersion> {
        implemented.iter().max().cloned()
    }
}

/// Picks the maximum version that carries no status label, falling back
/// to [`Highest`] when every implemented version is a pre-release: given
/// `{1.0, 2.0, 3.0-beta}` this chooses `2.0`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HighestStable;

impl VersionPolicy for HighestStable {
    fn choose(&self, implemented: &[ApiVersion]) -> Option<ApiVersion> {
        implemented
            .iter()
            .filter(|version| !version.is_prerelease())
            .max()
            .cloned()
            .or_else(|| implemented.iter().max().cloned())
    }
}

/// Picks the minimum version by the total order.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lowest;

impl VersionPolicy for Lowest {
    fn choose(&self, implemented: &[ApiVersion]) -> Option<ApiVersion> {
        implemented.iter().min().cloned()
    }
}

/// The selection outcome: which endpoint won and which version the
/// request was answered for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// The winning endpoint.
    pub endpoint: EndpointId,
    /// The concrete version the selection resolved to. `None` only when
    /// a neutral or catch-all endpoint won a request with no version at
    /// all.
    pub version: Option<ApiVersion>,
    /// Whether the resolved version is flagged obsolete on the winner.
    pub deprecated: bool,
}

/// Chooses among sibling endpoints for one route.
///
/// An explicit match always beats the undeclared catch-all; a catch-all
/// beats nothing; everything else is a typed failure. When the request
/// names no version, the configured default applies, unless
/// [`assume_default_when_unspecified`](Self::assume_default_when_unspecified)
/// lets the [`VersionPolicy`] pick from everything the siblings implement.
///
/// # Example
///
/// ```rust
/// use verso_core::{
///     ApiVersion, ApiVersionModel, Candidate, EndpointId, EndpointSelector,
/// };
///
/// let v1 = ApiVersion::new(1, 0);
/// let candidates = vec![Candidate::new(
///     EndpointId::new("orders", "list"),
///     ApiVersionModel::new(vec![v1.clone()], vec![v1.clone()], vec![], vec![], vec![]),
/// )];
///
/// let selector = EndpointSelector::new();
/// let selection = selector.select(Some(&v1), &candidates).unwrap();
/// assert_eq!(selection.endpoint, EndpointId::new("orders", "list"));
/// ```
#[derive(Debug, Clone)]
pub struct EndpointSelector {
    default_version: ApiVersion,
    assume_default_when_unspecified: bool,
    policy: Arc<dyn VersionPolicy>,
}

impl EndpointSelector {
    /// Selector with default version `1.0`, no default assumption, and
    /// the [`Highest`] policy.
    pub fn new() -> Self {
        Self {
            default_version: ApiVersion::default(),
            assume_default_when_unspecified: false,
            policy: Arc::new(Highest),
        }
    }

    /// Set the process-wide default version used when a request names no
    /// version and default assumption is disabled.
    pub fn default_version(mut self, version: ApiVersion) -> Self {
        self.default_version = version;
        self
    }

    /// When enabled, an unspecified request resolves against whatever
    /// the sibling endpoints implement, via the configured policy,
    /// instead of the fixed default version.
    pub fn assume_default_when_unspecified(mut self, enabled: bool) -> Self {
        self.assume_default_when_unspecified = enabled;
        self
    }

    /// Set the version selection policy.
    pub fn policy(mut self, policy: impl VersionPolicy + 'static) -> Self {
        self.policy = Arc::new(policy);
        self
    }

    /// Select the one endpoint that should answer for `requested`.
    pub fn select(
        &self,
        requested: Option<&ApiVersion>,
        candidates: &[Candidate],
    ) -> Result<Selection, SelectError> {
        if candidates.is_empty() {
            return Err(SelectError::NoCandidates);
        }
        match requested {
            Some(version) => self.select_concrete(Some(version), candidates),
            None if !self.assume_default_when_unspecified => {
                self.select_concrete(Some(&self.default_version), candidates)
            }
            None => {
                let implemented = implemented_union(candidates);
                match self.policy.choose(&implemented) {
                    Some(version) => {
                        trace!(version = %version, "policy resolved unspecified request");
                        self.select_concrete(Some(&version), candidates)
                    }
                    // Nothing implemented anywhere: only neutral or
                    // catch-all candidates can still win.
                    None => self.select_concrete(None, candidates),
                }
            }
        }
    }

    fn select_concrete(
        &self,
        version: Option<&ApiVersion>,
        candidates: &[Candidate],
    ) -> Result<Selection, SelectError> {
        let mut explicit: Vec<&Candidate> = Vec::new();
        let mut implicit: Vec<&Candidate> = Vec::new();
        for candidate in candidates {
            match candidate.model.map(version) {
                VersionMapping::Explicit => explicit.push(candidate),
                VersionMapping::Implicit => implicit.push(candidate),
                VersionMapping::None => {}
            }
        }

        let winner = match (explicit.as_slice(), implicit.as_slice()) {
            ([only], _) => only,
            ([], [only]) => only,
            ([], []) => {
                return Err(SelectError::Unmatched {
                    requested: version.cloned(),
                })
            }
            ([], many) => {
                return Err(SelectError::AmbiguousMatch {
                    version: version.cloned(),
                    endpoints: sorted_ids(many),
                })
            }
            (many, _) => {
                return Err(SelectError::AmbiguousMatch {
                    version: version.cloned(),
                    endpoints: sorted_ids(many),
                })
            }
        };

        let deprecated = version
            .map(|version| winner.model.is_deprecated(version))
            .unwrap_or(false);
        trace!(endpoint = %winner.id, "selected endpoint");
        Ok(Selection {
            endpoint: winner.id.clone(),
            version: version.cloned(),
            deprecated,
        })
    }
}

impl Default for EndpointSelector {
    fn default() -> Self {
        Self::new()
    }
}

/// Sorted, de-duplicated union of everything the candidates implement.
fn implemented_union(candidates: &[Candidate]) -> Vec<ApiVersion> {
    let mut union = Vec::new();
    for candidate in candidates {
        union.extend_from_slice(candidate.model.implemented());
    }
    model::normalize(union)
}

fn sorted_ids(candidates: &[&Candidate]) -> Vec<EndpointId> {
    let mut ids: Vec<EndpointId> = candidates
        .iter()
        .map(|candidate| candidate.id.clone())
        .collect();
    ids.sort();
    ids
}
