//! Projection of records into list-view rows.

use std::fmt;
use std::sync::Arc;

use chrono::SecondsFormat;

use crate::error::StoreError;
use crate::models::{DASHBOARD_KIND, DASHBOARD_SUMMARY_KIND, DashboardObject, TableRow};

/// Column metadata for list views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableColumnDefinition {
    pub name: &'static str,
    pub column_type: &'static str,
    pub format: &'static str,
    pub description: &'static str,
}

type RowFn = dyn Fn(&DashboardObject) -> Result<TableRow, StoreError> + Send + Sync;

/// Column definitions plus the function producing one row per record.
#[derive(Clone)]
pub struct TableConvertor {
    columns: Vec<TableColumnDefinition>,
    row: Arc<RowFn>,
}

impl TableConvertor {
    pub fn new<F>(columns: Vec<TableColumnDefinition>, row: F) -> Self
    where
        F: Fn(&DashboardObject) -> Result<TableRow, StoreError> + Send + Sync + 'static,
    {
        Self {
            columns,
            row: Arc::new(row),
        }
    }

    /// Convertor shared by the dashboard and summary resources.
    #[must_use]
    pub fn dashboards() -> Self {
        Self::new(
            vec![
                TableColumnDefinition {
                    name: "Name",
                    column_type: "string",
                    format: "name",
                    description: "",
                },
                TableColumnDefinition {
                    name: "Title",
                    column_type: "string",
                    format: "string",
                    description: "The dashboard name",
                },
                TableColumnDefinition {
                    name: "Created At",
                    column_type: "date",
                    format: "",
                    description: "",
                },
            ],
            dashboard_row,
        )
    }

    #[must_use]
    pub fn columns(&self) -> &[TableColumnDefinition] {
        &self.columns
    }

    /// Project one record into a row.
    ///
    /// # Errors
    ///
    /// Whatever the row function rejects; for [`TableConvertor::dashboards`]
    /// that is any kind other than a dashboard or summary.
    pub fn row(&self, obj: &DashboardObject) -> Result<TableRow, StoreError> {
        (self.row)(obj)
    }
}

impl fmt::Debug for TableConvertor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableConvertor")
            .field("columns", &self.columns)
            .finish_non_exhaustive()
    }
}

fn dashboard_row(obj: &DashboardObject) -> Result<TableRow, StoreError> {
    if obj.kind != DASHBOARD_KIND && obj.kind != DASHBOARD_SUMMARY_KIND {
        return Err(StoreError::Invalid("expected dashboard or summary".to_owned()));
    }
    Ok(TableRow {
        name: obj.metadata.name.clone(),
        title: obj.title().unwrap_or_default().to_owned(),
        created_at: obj
            .metadata
            .creation_timestamp
            .map(|ts| ts.to_rfc3339_opts(SecondsFormat::Secs, true))
            .unwrap_or_default(),
    })
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    use super::*;

    #[test]
    fn dashboard_row_has_name_title_and_created_at() {
        let mut obj = DashboardObject::new("default", "abc", json!({"title": "Latency"}));
        obj.metadata.creation_timestamp = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 0).single();

        let row = TableConvertor::dashboards().row(&obj).unwrap();
        assert_eq!(
            row.into_cells(),
            [
                "abc".to_owned(),
                "Latency".to_owned(),
                "2024-03-09T14:05:00Z".to_owned()
            ]
        );
    }

    #[test]
    fn summary_rows_use_their_own_name() {
        let mut obj = DashboardObject::new("default", "sum-1", json!({"title": "S"}));
        obj.kind = DASHBOARD_SUMMARY_KIND.to_owned();

        let row = TableConvertor::dashboards().row(&obj).unwrap();
        assert_eq!(row.name, "sum-1");
        assert_eq!(row.title, "S");
        assert!(row.created_at.is_empty());
    }

    #[test]
    fn other_kinds_are_rejected() {
        let mut obj = DashboardObject::new("default", "x", json!({}));
        obj.kind = "Folder".to_owned();

        let err = TableConvertor::dashboards().row(&obj).unwrap_err();
        assert_eq!(err, StoreError::Invalid("expected dashboard or summary".to_owned()));
    }

    #[test]
    fn exposes_three_columns() {
        let names: Vec<_> = TableConvertor::dashboards()
            .columns()
            .iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, ["Name", "Title", "Created At"]);
    }
}
