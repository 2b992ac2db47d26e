//! Declarative version conventions and the model builder.
//!
//! Versions are assigned to endpoints in two ways: direct declarations on
//! a controller or action (attribute style), and programmatic
//! [`VersionConvention`]s that derive declarations from endpoint identity
//! when nothing was declared directly. [`EndpointConventions::build`]
//! aggregates both, controller to action, into one immutable
//! [`ApiVersionMap`] snapshot.
//!
//! # Example
//!
//! ```rust
//! use verso_core::{ActionConvention, ApiVersion, ControllerConvention, EndpointConventions};
//!
//! let models = EndpointConventions::new()
//!     .controller(
//!         ControllerConvention::new("orders")
//!             .has_api_version(ApiVersion::new(1, 0))
//!             .has_api_version(ApiVersion::new(2, 0))
//!             .action(ActionConvention::new("list"))
//!             .action(
//!                 ActionConvention::new("cancel")
//!                     .maps_to_api_version(ApiVersion::new(2, 0)),
//!             ),
//!     )
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(models.len(), 2);
//! ```

use crate::error::ConventionError;
use crate::model::{self, ApiVersionModel};
use crate::version::ApiVersion;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Opaque endpoint identity: the owning group (controller, service) and
/// the endpoint name (action, method).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EndpointId {
    group: String,
    name: String,
}

impl EndpointId {
    /// Create an endpoint identity.
    pub fn new(group: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            name: name.into(),
        }
    }

    /// The owning group.
    pub fn group(&self) -> &str {
        &self.group
    }

    /// The endpoint name within its group.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for EndpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.group, self.name)
    }
}

/// The immutable build output: one model per endpoint, deterministically
/// ordered. Hosts publish a snapshot of this map (typically behind an
/// `Arc`) and swap the whole reference on reload.
pub type ApiVersionMap = BTreeMap<EndpointId, ApiVersionModel>;

/// A mutable bag of version declarations for one endpoint or group.
///
/// Filled either by the fluent builders or by a [`VersionConvention`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeclaredVersions {
    supported: Vec<ApiVersion>,
    deprecated: Vec<ApiVersion>,
    advertised: Vec<ApiVersion>,
    deprecated_advertised: Vec<ApiVersion>,
    neutral: bool,
}

impl DeclaredVersions {
    /// An empty declaration bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an actively served version.
    pub fn has_api_version(&mut self, version: ApiVersion) -> &mut Self {
        self.supported.push(version);
        self
    }

    /// Declare a version that is still served but flagged obsolete.
    pub fn has_deprecated_api_version(&mut self, version: ApiVersion) -> &mut Self {
        self.deprecated.push(version);
        self
    }

    /// Advertise a version implemented elsewhere, for discovery only.
    pub fn advertises_api_version(&mut self, version: ApiVersion) -> &mut Self {
        self.advertised.push(version);
        self
    }

    /// Advertise a deprecated version implemented elsewhere.
    pub fn advertises_deprecated_api_version(&mut self, version: ApiVersion) -> &mut Self {
        self.deprecated_advertised.push(version);
        self
    }

    /// Opt out of version matching entirely.
    pub fn is_api_version_neutral(&mut self) -> &mut Self {
        self.neutral = true;
        self
    }

    /// Whether nothing has been declared.
    pub fn is_empty(&self) -> bool {
        !self.neutral
            && self.supported.is_empty()
            && self.deprecated.is_empty()
            && self.advertised.is_empty()
            && self.deprecated_advertised.is_empty()
    }
}

/// A programmatic source of version declarations.
///
/// Conventions are consulted, in registration order, only for controllers
/// that carry no direct declarations; the first convention that returns
/// `true` wins.
pub trait VersionConvention: fmt::Debug + Send + Sync {
    /// Derive declarations for the named controller. Return `true` when
    /// this convention produced a declaration.
    fn apply(&self, controller: &str, declarations: &mut DeclaredVersions) -> bool;
}

/// Derives a version from a trailing grouping token in the controller
/// name: `ordersV2` becomes `2.0`, `reports_v3_1` becomes `3.1`.
#[derive(Debug, Clone, Copy, Default)]
pub struct VersionByGroupName;

impl VersionByGroupName {
    /// Create the convention.
    pub fn new() -> Self {
        Self
    }
}

impl VersionConvention for VersionByGroupName {
    fn apply(&self, controller: &str, declarations: &mut DeclaredVersions) -> bool {
        match version_from_group_name(controller) {
            Some(version) => {
                declarations.has_api_version(version);
                true
            }
            None => false,
        }
    }
}

fn version_from_group_name(name: &str) -> Option<ApiVersion> {
    let idx = name.rfind(['v', 'V'])?;
    let tail = &name[idx + 1..];
    let (major, minor) = match tail.split_once('_') {
        Some((major, minor)) => (major, minor),
        None => (tail, "0"),
    };
    if major.is_empty()
        || minor.is_empty()
        || !major.bytes().all(|b| b.is_ascii_digit())
        || !minor.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }
    Some(ApiVersion::new(major.parse().ok()?, minor.parse().ok()?))
}

/// Fluent declaration builder for one controller and its actions.
#[derive(Debug, Clone)]
pub struct ControllerConvention {
    name: String,
    declarations: DeclaredVersions,
    actions: Vec<ActionConvention>,
}

impl ControllerConvention {
    /// Start declarations for the named controller.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declarations: DeclaredVersions::new(),
            actions: Vec::new(),
        }
    }

    /// Declare a version served by every action of this controller.
    pub fn has_api_version(mut self, version: ApiVersion) -> Self {
        self.declarations.has_api_version(version);
        self
    }

    /// Declare a deprecated version served by every action.
    pub fn has_deprecated_api_version(mut self, version: ApiVersion) -> Self {
        self.declarations.has_deprecated_api_version(version);
        self
    }

    /// Mark the whole controller version-neutral.
    pub fn is_api_version_neutral(mut self) -> Self {
        self.declarations.is_api_version_neutral();
        self
    }

    /// Register an action.
    pub fn action(mut self, action: ActionConvention) -> Self {
        self.actions.push(action);
        self
    }
}

/// Fluent declaration builder for one action.
#[derive(Debug, Clone)]
pub struct ActionConvention {
    name: String,
    declarations: DeclaredVersions,
    mapped_to: Vec<ApiVersion>,
    route: Option<String>,
}

impl ActionConvention {
    /// Start declarations for the named action.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declarations: DeclaredVersions::new(),
            mapped_to: Vec::new(),
            route: None,
        }
    }

    /// Declare a version served by this action in addition to anything
    /// inherited from its controller.
    pub fn has_api_version(mut self, version: ApiVersion) -> Self {
        self.declarations.has_api_version(version);
        self
    }

    /// Declare a deprecated version served by this action.
    pub fn has_deprecated_api_version(mut self, version: ApiVersion) -> Self {
        self.declarations.has_deprecated_api_version(version);
        self
    }

    /// Advertise a version for discovery without implementing it here.
    pub fn advertises_api_version(mut self, version: ApiVersion) -> Self {
        self.declarations.advertises_api_version(version);
        self
    }

    /// Advertise a deprecated version for discovery.
    pub fn advertises_deprecated_api_version(mut self, version: ApiVersion) -> Self {
        self.declarations.advertises_deprecated_api_version(version);
        self
    }

    /// Mark this action version-neutral.
    pub fn is_api_version_neutral(mut self) -> Self {
        self.declarations.is_api_version_neutral();
        self
    }

    /// Restrict this action to a subset of the versions its controller
    /// declares. The version must be declared somewhere; an unknown
    /// version fails the build.
    pub fn maps_to_api_version(mut self, version: ApiVersion) -> Self {
        self.mapped_to.push(version);
        self
    }

    /// Associate the route template this action is bound to. Used to
    /// reject configurations where several undeclared actions would
    /// compete as catch-alls on one route.
    pub fn route(mut self, template: impl Into<String>) -> Self {
        self.route = Some(template.into());
        self
    }
}

/// The declarative registry: controllers, actions, and programmatic
/// conventions, built into an immutable [`ApiVersionMap`].
///
/// Building is pure and idempotent: the same declarations always produce
/// an identical map, so hosts may rebuild on endpoint-table reload and
/// atomically swap the published snapshot.
#[derive(Debug, Clone, Default)]
pub struct EndpointConventions {
    controllers: Vec<ControllerConvention>,
    conventions: Vec<Arc<dyn VersionConvention>>,
}

impl EndpointConventions {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a controller and its actions.
    pub fn controller(mut self, controller: ControllerConvention) -> Self {
        self.controllers.push(controller);
        self
    }

    /// Register a programmatic convention, consulted for controllers
    /// with no direct declarations.
    pub fn convention(mut self, convention: impl VersionConvention + 'static) -> Self {
        self.conventions.push(Arc::new(convention));
        self
    }

    /// Aggregate all declarations into one model per endpoint.
    ///
    /// Fails fast on configuration defects: an action mapped to an
    /// undeclared version, or several undeclared actions sharing a route.
    pub fn build(&self) -> Result<ApiVersionMap, ConventionError> {
        let mut map = ApiVersionMap::new();
        let mut implicit_routes: BTreeMap<&str, Vec<EndpointId>> = BTreeMap::new();

        for controller in &self.controllers {
            let mut declarations = controller.declarations.clone();
            if declarations.is_empty() {
                for convention in &self.conventions {
                    let mut derived = DeclaredVersions::new();
                    if convention.apply(&controller.name, &mut derived) {
                        debug!(
                            controller = %controller.name,
                            "convention supplied version declarations"
                        );
                        declarations = derived;
                        break;
                    }
                }
            }

            if declarations.neutral {
                for action in &controller.actions {
                    let id = EndpointId::new(&controller.name, &action.name);
                    map.insert(id, ApiVersionModel::neutral());
                }
                continue;
            }

            let group_supported = model::normalize(declarations.supported.clone());
            let group_deprecated = model::normalize(declarations.deprecated.clone());
            let group_declared = model::union(&group_supported, &group_deprecated);

            for action in &controller.actions {
                let id = EndpointId::new(&controller.name, &action.name);

                if action.declarations.neutral {
                    map.insert(id, ApiVersionModel::neutral());
                    continue;
                }

                let own_supported = model::normalize(action.declarations.supported.clone());
                let own_deprecated = model::normalize(action.declarations.deprecated.clone());
                let own_declared = model::union(&own_supported, &own_deprecated);

                let (mut declared, mut supported, mut deprecated) = if own_declared.is_empty() {
                    (
                        group_declared.clone(),
                        group_supported.clone(),
                        group_deprecated.clone(),
                    )
                } else {
                    (
                        own_declared.clone(),
                        model::union(&own_supported, &group_supported),
                        model::union(&own_deprecated, &group_deprecated),
                    )
                };

                if !action.mapped_to.is_empty() {
                    let applicable = model::union(&own_declared, &group_declared);
                    if applicable.is_empty() {
                        // Mapping on an unversioned controller is vacuous;
                        // the action stays a catch-all.
                        declared = Vec::new();
                        supported = Vec::new();
                        deprecated = Vec::new();
                    } else {
                        let mapped = model::normalize(action.mapped_to.clone());
                        for version in &mapped {
                            if applicable.binary_search(version).is_err() {
                                return Err(ConventionError::UnmappedVersion {
                                    endpoint: id,
                                    version: version.clone(),
                                });
                            }
                        }
                        supported.retain(|v| mapped.binary_search(v).is_ok());
                        deprecated.retain(|v| mapped.binary_search(v).is_ok());
                        declared = mapped;
                    }
                }

                let built = ApiVersionModel::new(
                    declared,
                    supported,
                    deprecated,
                    action.declarations.advertised.clone(),
                    action.declarations.deprecated_advertised.clone(),
                );

                if !built.has_declared() {
                    warn!(endpoint = %id, "endpoint declares no api versions; it will match implicitly");
                    if let Some(route) = &action.route {
                        implicit_routes
                            .entry(route.as_str())
                            .or_default()
                            .push(id.clone());
                    }
                }
                debug!(
                    endpoint = %id,
                    declared = built.declared().len(),
                    supported = built.supported().len(),
                    deprecated = built.deprecated().len(),
                    "built api version model"
                );
                map.insert(id, built);
            }
        }

        for (route, mut endpoints) in implicit_routes {
            if endpoints.len() > 1 {
                endpoints.sort();
                return Err(ConventionError::AmbiguousImplicit {
                    route: route.to_string(),
                    endpoints,
                });
            }
        }

        Ok(map)
    }
}
