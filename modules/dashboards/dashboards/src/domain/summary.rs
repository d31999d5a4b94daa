//! Read-only summary projection over the dashboards store.

use std::sync::Arc;

use async_trait::async_trait;
use dashboards_sdk::{
    CrudBackend, DASHBOARD_SUMMARY_KIND, DashboardObject, ListOptions, Patch, StoreError,
    TableConvertor, TableRow,
};
use serde_json::{Map, Value};
use tokio_util::sync::CancellationToken;

/// Serves `summary`: each dashboard reduced to its title and tags.
pub struct SummaryStore {
    dashboards: Arc<dyn CrudBackend>,
    table: TableConvertor,
}

impl SummaryStore {
    #[must_use]
    pub fn new(dashboards: Arc<dyn CrudBackend>) -> Self {
        Self {
            dashboards,
            table: TableConvertor::dashboards(),
        }
    }

    fn project(obj: DashboardObject) -> DashboardObject {
        let mut spec = Map::new();
        for key in ["title", "tags"] {
            if let Some(value) = obj.spec.get(key) {
                spec.insert(key.to_owned(), value.clone());
            }
        }
        DashboardObject {
            kind: DASHBOARD_SUMMARY_KIND.to_owned(),
            metadata: obj.metadata,
            spec: Value::Object(spec),
        }
    }
}

#[async_trait]
impl CrudBackend for SummaryStore {
    async fn create(
        &self,
        _cancel: &CancellationToken,
        _obj: DashboardObject,
    ) -> Result<DashboardObject, StoreError> {
        Err(StoreError::MethodNotSupported("create summary".to_owned()))
    }

    async fn get(
        &self,
        cancel: &CancellationToken,
        namespace: &str,
        name: &str,
    ) -> Result<DashboardObject, StoreError> {
        self.dashboards
            .get(cancel, namespace, name)
            .await
            .map(Self::project)
    }

    async fn list(
        &self,
        cancel: &CancellationToken,
        namespace: &str,
        options: &ListOptions,
    ) -> Result<Vec<DashboardObject>, StoreError> {
        let items = self.dashboards.list(cancel, namespace, options).await?;
        Ok(items.into_iter().map(Self::project).collect())
    }

    async fn update(
        &self,
        _cancel: &CancellationToken,
        _namespace: &str,
        _name: &str,
        _patch: Patch,
    ) -> Result<DashboardObject, StoreError> {
        Err(StoreError::MethodNotSupported("update summary".to_owned()))
    }

    async fn delete(
        &self,
        _cancel: &CancellationToken,
        _namespace: &str,
        _name: &str,
    ) -> Result<(), StoreError> {
        Err(StoreError::MethodNotSupported("delete summary".to_owned()))
    }

    fn to_table_row(&self, obj: &DashboardObject) -> Result<TableRow, StoreError> {
        self.table.row(obj)
    }
}
