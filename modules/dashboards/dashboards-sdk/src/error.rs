//! Error types for the dashboards module.

use thiserror::Error;

/// The namespace string does not encode exactly one org.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NamespaceError {
    #[error("namespace is empty")]
    Empty,

    #[error("invalid namespace '{namespace}': {reason}")]
    Invalid { namespace: String, reason: String },
}

impl NamespaceError {
    pub(crate) fn invalid(namespace: &str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            namespace: namespace.to_owned(),
            reason: reason.into(),
        }
    }
}

/// Errors raised while building or querying a dashboard guardian.
///
/// `NotFound` and `Lookup` come from guardian construction (the dashboard
/// lookup), `Evaluation` from an individual capability check.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GuardianError {
    #[error("dashboard '{uid}' not found in org {org_id}")]
    NotFound { uid: String, org_id: i64 },

    #[error("dashboard lookup failed: {0}")]
    Lookup(String),

    #[error("permission evaluation failed: {0}")]
    Evaluation(String),
}

/// Error attached to a `Deny` decision for diagnostics.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthorizeError {
    #[error(transparent)]
    Namespace(#[from] NamespaceError),

    #[error(transparent)]
    Guardian(#[from] GuardianError),

    #[error("authorization cancelled before a decision was reached")]
    Cancelled,
}

/// Errors returned by [`crate::CrudBackend`] implementations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("{resource} \"{name}\" not found")]
    NotFound { resource: String, name: String },

    #[error("{resource} \"{name}\" already exists")]
    AlreadyExists { resource: String, name: String },

    #[error("conflict on \"{name}\": {reason}")]
    Conflict { name: String, reason: String },

    #[error("method not supported: {0}")]
    MethodNotSupported(String),

    #[error("invalid object: {0}")]
    Invalid(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("request cancelled")]
    Cancelled,

    #[error("internal error: {0}")]
    Internal(String),
}

impl StoreError {
    #[must_use]
    pub fn not_found(resource: impl Into<String>, name: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            name: name.into(),
        }
    }

    #[must_use]
    pub fn already_exists(resource: impl Into<String>, name: impl Into<String>) -> Self {
        Self::AlreadyExists {
            resource: resource.into(),
            name: name.into(),
        }
    }

    #[must_use]
    pub fn conflict(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Conflict {
            name: name.into(),
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Errors returned by sub-resource handlers.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SubresourceError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("request cancelled")]
    Cancelled,

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<NamespaceError> for SubresourceError {
    fn from(e: NamespaceError) -> Self {
        Self::BadRequest(e.to_string())
    }
}

impl From<GuardianError> for SubresourceError {
    fn from(e: GuardianError) -> Self {
        match e {
            GuardianError::NotFound { .. } => Self::NotFound(e.to_string()),
            GuardianError::Lookup(_) | GuardianError::Evaluation(_) => {
                Self::Internal(e.to_string())
            }
        }
    }
}

impl From<StoreError> for SubresourceError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound { .. } => Self::NotFound(e.to_string()),
            StoreError::Invalid(_) => Self::BadRequest(e.to_string()),
            StoreError::Cancelled => Self::Cancelled,
            StoreError::AlreadyExists { .. }
            | StoreError::Conflict { .. }
            | StoreError::MethodNotSupported(_)
            | StoreError::Unavailable(_)
            | StoreError::Internal(_) => Self::Internal(e.to_string()),
        }
    }
}
