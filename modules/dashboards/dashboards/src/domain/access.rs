//! `dashboards/access`: the caller's capabilities on one dashboard.

use std::sync::Arc;

use async_trait::async_trait;
use dashboards_sdk::{
    DashboardAccessInfo, GuardianProvider, SubresourceError, SubresourceHandler,
    SubresourceRequest, parse_namespace,
};
use tokio_util::sync::CancellationToken;

use super::until_cancelled;

pub struct AccessHandler {
    guardians: Arc<dyn GuardianProvider>,
}

impl AccessHandler {
    #[must_use]
    pub fn new(guardians: Arc<dyn GuardianProvider>) -> Self {
        Self { guardians }
    }

    async fn access_info(
        &self,
        cancel: &CancellationToken,
        request: &SubresourceRequest,
    ) -> Result<DashboardAccessInfo, SubresourceError> {
        let tenant = parse_namespace(&request.namespace)?;
        let lookup = self
            .guardians
            .for_resource(cancel, &request.name, &tenant, &request.caller);
        let guardian = until_cancelled(cancel, lookup)
            .await
            .ok_or(SubresourceError::Cancelled)??;

        let checks = async {
            tokio::try_join!(
                guardian.can_view(),
                guardian.can_save(),
                guardian.can_edit(),
                guardian.can_delete(),
            )
        };
        let (can_view, can_save, can_edit, can_delete) = until_cancelled(cancel, checks)
            .await
            .ok_or(SubresourceError::Cancelled)??;

        if !can_view {
            return Err(SubresourceError::Forbidden("can not view dashboard".to_owned()));
        }
        Ok(DashboardAccessInfo {
            can_view,
            can_save,
            can_edit,
            can_delete,
        })
    }
}

#[async_trait]
impl SubresourceHandler for AccessHandler {
    #[tracing::instrument(skip_all, fields(namespace = %request.namespace, name = %request.name))]
    async fn connect(
        &self,
        cancel: &CancellationToken,
        request: &SubresourceRequest,
    ) -> Result<serde_json::Value, SubresourceError> {
        let info = self.access_info(cancel, request).await?;
        serde_json::to_value(info).map_err(|e| SubresourceError::Internal(e.to_string()))
    }
}
