#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Dashboards SDK
//!
//! This crate provides the public contracts of the `dashboards` module:
//!
//! - [`CrudBackend`] - Storage contract implemented by legacy and unified stores
//! - [`GuardianProvider`], [`DashboardGuardian`] - Per-dashboard permission evaluation
//! - [`SubresourceHandler`] - Contract for `dashboards/<sub>` endpoints
//! - [`VersionHistory`] - Saved revisions behind `dashboards/versions`
//! - [`Authorizer`] - Hook the host framework calls before dispatch
//! - [`RequestAttributes`], [`Decision`] - Authorization input and output
//! - [`parse_namespace`], [`NamespaceMapper`] - Namespace ⇄ org grammar
//! - [`TableConvertor`] - Projection of records into list-view rows
//!
//! ## Usage
//!
//! ```ignore
//! use dashboards_sdk::{CrudBackend, ListOptions, parse_namespace};
//!
//! let info = parse_namespace("org-5")?;
//! assert_eq!(info.org_id, 5);
//!
//! let items = store.list(&cancel, &info.value, &ListOptions::default()).await?;
//! ```

pub mod api;
pub mod error;
pub mod models;
pub mod namespace;
pub mod patch;
pub mod table;

// Re-export main types at crate root
pub use api::{
    Authorizer, CrudBackend, DashboardGuardian, GuardianProvider, SubresourceHandler,
    VersionHistory,
};
pub use error::{AuthorizeError, GuardianError, NamespaceError, StoreError, SubresourceError};
pub use models::{
    DASHBOARD_KIND, DASHBOARD_RESOURCE_INFO, DASHBOARD_SUMMARY_KIND,
    DASHBOARD_SUMMARY_RESOURCE_INFO, DashboardAccessInfo, DashboardObject, DashboardVersionInfo,
    DashboardVersionsInfo, Decision, DecisionOutcome, ListOptions, ObjectMeta, RequestAttributes,
    ResourceInfo, SubresourceRequest, TableRow, Verb,
};
pub use namespace::{NamespaceInfo, NamespaceMapper, parse_namespace};
pub use patch::{Patch, apply_merge_patch};
pub use table::{TableColumnDefinition, TableConvertor};
