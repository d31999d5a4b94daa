//! `dashboards/versions`: saved revisions of one dashboard.
//!
//! An empty path lists every revision newest first, without the dashboard
//! model. `versions/<n>` returns revision `n` including its model.

use std::sync::Arc;

use async_trait::async_trait;
use dashboards_sdk::{
    DashboardVersionInfo, DashboardVersionsInfo, SubresourceError, SubresourceHandler,
    SubresourceRequest, VersionHistory, parse_namespace,
};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use super::until_cancelled;

pub struct VersionsHandler {
    history: Arc<dyn VersionHistory>,
}

impl VersionsHandler {
    #[must_use]
    pub fn new(history: Arc<dyn VersionHistory>) -> Self {
        Self { history }
    }
}

fn parse_version(path: &str) -> Result<Option<i64>, SubresourceError> {
    let path = path.trim_matches('/');
    if path.is_empty() {
        return Ok(None);
    }
    match path.parse::<i64>() {
        Ok(version) if version > 0 => Ok(Some(version)),
        _ => Err(SubresourceError::BadRequest(format!("invalid version '{path}'"))),
    }
}

fn to_body(value: &impl Serialize) -> Result<serde_json::Value, SubresourceError> {
    serde_json::to_value(value).map_err(|e| SubresourceError::Internal(e.to_string()))
}

#[async_trait]
impl SubresourceHandler for VersionsHandler {
    #[tracing::instrument(
        skip_all,
        fields(namespace = %request.namespace, name = %request.name, path = %request.path)
    )]
    async fn connect(
        &self,
        cancel: &CancellationToken,
        request: &SubresourceRequest,
    ) -> Result<serde_json::Value, SubresourceError> {
        let tenant = parse_namespace(&request.namespace)?;

        if let Some(version) = parse_version(&request.path)? {
            let lookup = self
                .history
                .get_version(cancel, tenant.org_id, &request.name, version);
            let info = until_cancelled(cancel, lookup)
                .await
                .ok_or(SubresourceError::Cancelled)??;
            return to_body(&info);
        }

        let lookup = self
            .history
            .list_versions(cancel, tenant.org_id, &request.name);
        let mut versions = until_cancelled(cancel, lookup)
            .await
            .ok_or(SubresourceError::Cancelled)??;
        versions.sort_unstable_by(|a, b| b.version.cmp(&a.version));
        to_body(&DashboardVersionsInfo {
            versions: versions.iter().map(DashboardVersionInfo::without_spec).collect(),
        })
    }
}
