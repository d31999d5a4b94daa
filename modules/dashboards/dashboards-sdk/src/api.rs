//! Public contracts of the dashboards module.

use async_trait::async_trait;
use modkit_security::SecurityContext;
use tokio_util::sync::CancellationToken;

use crate::error::{GuardianError, StoreError, SubresourceError};
use crate::models::{
    DashboardObject, DashboardVersionInfo, Decision, ListOptions, RequestAttributes,
    SubresourceRequest, TableRow,
};
use crate::namespace::NamespaceInfo;
use crate::patch::Patch;

/// Storage contract for one resource kind.
///
/// Implemented by the legacy SQL-backed store, the unified store, the
/// dual writer that bridges them, and read-only projections such as the
/// summary store. Every call receives the request's cancellation token;
/// implementations performing I/O should stop and return
/// [`StoreError::Cancelled`] once it fires.
#[async_trait]
pub trait CrudBackend: Send + Sync {
    /// # Errors
    ///
    /// - `AlreadyExists` if an object with the same name exists in the namespace
    /// - `Invalid` if the object is malformed
    async fn create(
        &self,
        cancel: &CancellationToken,
        obj: DashboardObject,
    ) -> Result<DashboardObject, StoreError>;

    /// # Errors
    ///
    /// - `NotFound` if no such object exists
    async fn get(
        &self,
        cancel: &CancellationToken,
        namespace: &str,
        name: &str,
    ) -> Result<DashboardObject, StoreError>;

    /// # Errors
    ///
    /// Backend failures only; an empty namespace yields an empty list.
    async fn list(
        &self,
        cancel: &CancellationToken,
        namespace: &str,
        options: &ListOptions,
    ) -> Result<Vec<DashboardObject>, StoreError>;

    /// # Errors
    ///
    /// - `NotFound` if no such object exists
    /// - `Conflict` if a `Patch::Replace` precondition no longer holds
    async fn update(
        &self,
        cancel: &CancellationToken,
        namespace: &str,
        name: &str,
        patch: Patch,
    ) -> Result<DashboardObject, StoreError>;

    /// # Errors
    ///
    /// - `NotFound` if no such object exists
    async fn delete(
        &self,
        cancel: &CancellationToken,
        namespace: &str,
        name: &str,
    ) -> Result<(), StoreError>;

    /// Project an object into a list-view row.
    ///
    /// # Errors
    ///
    /// - `Invalid` if the object is of a kind this store cannot render
    fn to_table_row(&self, obj: &DashboardObject) -> Result<TableRow, StoreError>;
}

/// Permission evaluator scoped to one dashboard, one org and one caller.
///
/// Each check is computed independently and may fail with
/// [`GuardianError::Evaluation`].
#[async_trait]
pub trait DashboardGuardian: Send + Sync {
    async fn can_view(&self) -> Result<bool, GuardianError>;
    async fn can_save(&self) -> Result<bool, GuardianError>;
    async fn can_edit(&self) -> Result<bool, GuardianError>;
    async fn can_delete(&self) -> Result<bool, GuardianError>;
}

/// Builds a [`DashboardGuardian`] for a single request.
///
/// Construction loads the dashboard (by uid and org) and its ACL data, which
/// is the most expensive step of authorization. Guardians are short-lived and
/// must not be cached across requests.
#[async_trait]
pub trait GuardianProvider: Send + Sync {
    /// # Errors
    ///
    /// - `NotFound` if the dashboard does not exist in the org
    /// - `Lookup` if the backing lookup fails
    async fn for_resource(
        &self,
        cancel: &CancellationToken,
        name: &str,
        tenant: &NamespaceInfo,
        caller: &SecurityContext,
    ) -> Result<Box<dyn DashboardGuardian>, GuardianError>;
}

/// Authorization hook invoked by the host framework before dispatch.
///
/// `Allow` proceeds, `Deny` rejects with the reason surfaced to the caller and
/// `NoOpinion` defers to the host's default policy.
#[async_trait]
pub trait Authorizer: Send + Sync {
    /// Decide on one request. Never fails: errors become `Deny` decisions
    /// carrying the underlying error.
    async fn authorize(&self, cancel: &CancellationToken, attrs: &RequestAttributes) -> Decision;
}

/// Handler for a `dashboards/<name>/<sub>` endpoint.
#[async_trait]
pub trait SubresourceHandler: Send + Sync {
    /// # Errors
    ///
    /// See [`SubresourceError`]; the variant determines the response status.
    async fn connect(
        &self,
        cancel: &CancellationToken,
        request: &SubresourceRequest,
    ) -> Result<serde_json::Value, SubresourceError>;
}

/// Saved revisions of dashboards, owned by the dashboard version service.
#[async_trait]
pub trait VersionHistory: Send + Sync {
    /// Every revision of one dashboard, in any order.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the dashboard has no history in the org
    async fn list_versions(
        &self,
        cancel: &CancellationToken,
        org_id: i64,
        uid: &str,
    ) -> Result<Vec<DashboardVersionInfo>, StoreError>;

    /// One revision, including its dashboard model.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the revision does not exist
    async fn get_version(
        &self,
        cancel: &CancellationToken,
        org_id: i64,
        uid: &str,
        version: i64,
    ) -> Result<DashboardVersionInfo, StoreError>;
}
