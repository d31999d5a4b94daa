//! Domain models for the dashboards module.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use modkit_security::SecurityContext;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AuthorizeError;

pub const GROUP: &str = "dashboards.cyberfabric.io";
pub const VERSION: &str = "v0alpha1";

pub const DASHBOARD_KIND: &str = "Dashboard";
pub const DASHBOARD_SUMMARY_KIND: &str = "DashboardSummary";

/// Static identity of a resource within an API group version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceInfo {
    pub group: &'static str,
    pub version: &'static str,
    /// Plural resource name, used as the storage path.
    pub resource: &'static str,
    pub singular: &'static str,
    pub kind: &'static str,
}

impl ResourceInfo {
    /// Storage path for the resource or one of its sub-resources
    /// (`"dashboards"`, `"dashboards/access"`).
    #[must_use]
    pub fn storage_path(&self, subresource: Option<&str>) -> String {
        match subresource {
            Some(sub) if !sub.is_empty() => format!("{}/{sub}", self.resource),
            _ => self.resource.to_owned(),
        }
    }

    #[must_use]
    pub fn group_version(&self) -> String {
        format!("{}/{}", self.group, self.version)
    }
}

pub const DASHBOARD_RESOURCE_INFO: ResourceInfo = ResourceInfo {
    group: GROUP,
    version: VERSION,
    resource: "dashboards",
    singular: "dashboard",
    kind: DASHBOARD_KIND,
};

pub const DASHBOARD_SUMMARY_RESOURCE_INFO: ResourceInfo = ResourceInfo {
    group: GROUP,
    version: VERSION,
    resource: "summary",
    singular: "summary",
    kind: DASHBOARD_SUMMARY_KIND,
};

/// Request verb as supplied by the host framework.
///
/// Anything outside the known vocabulary is kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Verb {
    Get,
    List,
    Create,
    Post,
    Update,
    Patch,
    Put,
    Delete,
    Other(String),
}

impl Verb {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Get => "get",
            Self::List => "list",
            Self::Create => "create",
            Self::Post => "post",
            Self::Update => "update",
            Self::Patch => "patch",
            Self::Put => "put",
            Self::Delete => "delete",
            Self::Other(verb) => verb,
        }
    }
}

impl From<&str> for Verb {
    fn from(verb: &str) -> Self {
        match verb {
            "get" => Self::Get,
            "list" => Self::List,
            "create" => Self::Create,
            "post" => Self::Post,
            "update" => Self::Update,
            "patch" => Self::Patch,
            "put" => Self::Put,
            "delete" => Self::Delete,
            other => Self::Other(other.to_owned()),
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the authorizer needs to know about one inbound request.
#[derive(Debug, Clone)]
pub struct RequestAttributes {
    pub verb: Verb,
    /// Resource kind (plural storage name), empty for non-resource requests.
    pub resource: String,
    /// Target object name; empty for collection-level operations.
    pub name: String,
    pub namespace: String,
    pub caller: SecurityContext,
    /// `false` for non-resource URLs (`/healthz`, discovery, ...).
    pub resource_request: bool,
}

impl RequestAttributes {
    /// A resource-scoped request on `resource` with no name or namespace yet.
    #[must_use]
    pub fn resource(caller: SecurityContext, verb: impl Into<Verb>, resource: &str) -> Self {
        Self {
            verb: verb.into(),
            resource: resource.to_owned(),
            name: String::new(),
            namespace: String::new(),
            caller,
            resource_request: true,
        }
    }

    /// A request against a non-resource URL.
    #[must_use]
    pub fn non_resource(caller: SecurityContext, verb: impl Into<Verb>) -> Self {
        Self {
            verb: verb.into(),
            resource: String::new(),
            name: String::new(),
            namespace: String::new(),
            caller,
            resource_request: false,
        }
    }

    #[must_use]
    pub fn with_namespace(mut self, namespace: &str) -> Self {
        namespace.clone_into(&mut self.namespace);
        self
    }

    #[must_use]
    pub fn with_name(mut self, name: &str) -> Self {
        name.clone_into(&mut self.name);
        self
    }
}

/// Tri-state outcome of an authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionOutcome {
    Allow,
    Deny,
    /// The engine does not govern this request; the host default policy applies.
    NoOpinion,
}

/// Authorization decision with a human-readable reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub outcome: DecisionOutcome,
    pub reason: String,
    pub error: Option<AuthorizeError>,
}

impl Decision {
    #[must_use]
    pub fn allow() -> Self {
        Self {
            outcome: DecisionOutcome::Allow,
            reason: String::new(),
            error: None,
        }
    }

    #[must_use]
    pub fn deny(reason: &str) -> Self {
        Self {
            outcome: DecisionOutcome::Deny,
            reason: reason.to_owned(),
            error: None,
        }
    }

    #[must_use]
    pub fn deny_with(reason: &str, error: impl Into<AuthorizeError>) -> Self {
        Self {
            outcome: DecisionOutcome::Deny,
            reason: reason.to_owned(),
            error: Some(error.into()),
        }
    }

    #[must_use]
    pub fn no_opinion(reason: &str) -> Self {
        Self {
            outcome: DecisionOutcome::NoOpinion,
            reason: reason.to_owned(),
            error: None,
        }
    }

    #[must_use]
    pub fn is_allowed(&self) -> bool {
        self.outcome == DecisionOutcome::Allow
    }
}

/// Standard object metadata shared by dashboards and summaries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    pub name: String,
    pub namespace: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<Uuid>,
    /// Opaque fingerprint owned by the store; used for optimistic concurrency.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

/// A persisted dashboard (or dashboard summary) record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardObject {
    pub kind: String,
    pub metadata: ObjectMeta,
    /// Dashboard JSON model; `title` and `tags` are the only fields read here.
    #[serde(default)]
    pub spec: serde_json::Value,
}

impl DashboardObject {
    #[must_use]
    pub fn new(namespace: &str, name: &str, spec: serde_json::Value) -> Self {
        Self {
            kind: DASHBOARD_KIND.to_owned(),
            metadata: ObjectMeta {
                name: name.to_owned(),
                namespace: namespace.to_owned(),
                ..ObjectMeta::default()
            },
            spec,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.metadata.namespace
    }

    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.spec.get("title").and_then(serde_json::Value::as_str)
    }

    /// Copy of this record without the store-owned resource version, suitable
    /// for writing into a different store.
    #[must_use]
    pub fn without_resource_version(&self) -> Self {
        let mut copy = self.clone();
        copy.metadata.resource_version = None;
        copy
    }
}

/// Collection filter accepted by `CrudBackend::list`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Exact-match label requirements; all must hold.
    pub label_selector: BTreeMap<String, String>,
    pub limit: Option<usize>,
}

impl ListOptions {
    #[must_use]
    pub fn with_label(mut self, key: &str, value: &str) -> Self {
        self.label_selector.insert(key.to_owned(), value.to_owned());
        self
    }

    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn matches(&self, meta: &ObjectMeta) -> bool {
        self.label_selector
            .iter()
            .all(|(k, v)| meta.labels.get(k) == Some(v))
    }
}

/// One row of a list view: name, title, created-at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub name: String,
    pub title: String,
    pub created_at: String,
}

impl TableRow {
    #[must_use]
    pub fn into_cells(self) -> [String; 3] {
        [self.name, self.title, self.created_at]
    }
}

/// Identifies the dashboard a sub-resource call targets.
#[derive(Debug, Clone)]
pub struct SubresourceRequest {
    pub namespace: String,
    pub name: String,
    /// Remainder of the URL after the sub-resource segment, e.g. `"3"` for
    /// `dashboards/<name>/versions/3`. Empty when absent.
    pub path: String,
    pub caller: SecurityContext,
}

impl SubresourceRequest {
    #[must_use]
    pub fn new(namespace: &str, name: &str, caller: SecurityContext) -> Self {
        Self {
            namespace: namespace.to_owned(),
            name: name.to_owned(),
            path: String::new(),
            caller,
        }
    }

    #[must_use]
    pub fn with_path(mut self, path: &str) -> Self {
        path.clone_into(&mut self.path);
        self
    }
}

/// One saved revision of a dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardVersionInfo {
    /// Revision number, starting at 1 and increasing with every save.
    pub version: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_version: Option<i64>,
    pub created: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
    /// Full dashboard model at this revision. Omitted from listings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec: Option<serde_json::Value>,
}

impl DashboardVersionInfo {
    /// Copy without the dashboard model, as shown in a version listing.
    #[must_use]
    pub fn without_spec(&self) -> Self {
        Self {
            spec: None,
            ..self.clone()
        }
    }
}

/// Revision history of one dashboard, served by `dashboards/versions`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardVersionsInfo {
    /// Newest first.
    pub versions: Vec<DashboardVersionInfo>,
}

/// Capabilities of the caller on one dashboard, served by `dashboards/access`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(clippy::struct_excessive_bools)]
pub struct DashboardAccessInfo {
    pub can_view: bool,
    pub can_save: bool,
    pub can_edit: bool,
    pub can_delete: bool,
}
