//! Dashboards Module
//!
//! Tenant-scoped authorization for dashboard requests and the storage wiring
//! of the dashboards API group, including the legacy/unified dual writer.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
pub mod domain;
pub mod module;

pub use config::{DashboardsConfig, DualWriterConfig, SecondaryWriteMode};
pub use domain::{
    AccessHandler, Capability, DashboardAuthorizer, DualWriteOutcome, DualWriter,
    DualWriterMetrics, DualWriterMetricsSnapshot, Handler, ResourceRegistry, SecondaryOutcome,
    SummaryStore, VersionsHandler,
};
pub use module::{ApiRegistrar, DashboardsApiBuilder, DashboardsDeps, register_api_service};

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod test_support;
