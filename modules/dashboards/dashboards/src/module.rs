//! Dashboards API group registration.

use std::sync::Arc;

use anyhow::bail;
use dashboards_sdk::{
    Authorizer, CrudBackend, DASHBOARD_RESOURCE_INFO, DASHBOARD_SUMMARY_RESOURCE_INFO,
    GuardianProvider, NamespaceMapper, SubresourceHandler, VersionHistory,
};
use tracing::info;

use crate::config::DashboardsConfig;
use crate::domain::{
    AccessHandler, DashboardAuthorizer, DualWriter, DualWriterMetrics, ResourceRegistry,
    SummaryStore, VersionsHandler,
};

/// Host-side sink for API group builders.
pub trait ApiRegistrar: Send + Sync {
    fn register(&self, builder: Arc<DashboardsApiBuilder>);
}

/// External collaborators the module needs at startup.
pub struct DashboardsDeps {
    /// The SQL-backed store every deployment has.
    pub legacy_store: Arc<dyn CrudBackend>,
    pub guardians: Arc<dyn GuardianProvider>,
    /// Saved revisions, served by `dashboards/versions`.
    pub versions: Arc<dyn VersionHistory>,
}

/// Build and register the dashboards API group.
///
/// Returns `None` without touching `registrar` unless `experimental_apis` is
/// enabled; the flag is only read here.
pub fn register_api_service(
    config: &DashboardsConfig,
    registrar: &dyn ApiRegistrar,
    deps: DashboardsDeps,
) -> Option<Arc<DashboardsApiBuilder>> {
    if !config.experimental_apis {
        info!("Experimental APIs disabled, skipping dashboards API registration");
        return None;
    }

    let builder = Arc::new(DashboardsApiBuilder::new(config.clone(), deps));
    registrar.register(builder.clone());
    info!(
        group_version = %builder.group_version(),
        "Dashboards API group registered"
    );
    Some(builder)
}

/// Assembles the dashboards API group: storage, authorizer and namespacing.
pub struct DashboardsApiBuilder {
    config: DashboardsConfig,
    legacy_store: Arc<dyn CrudBackend>,
    guardians: Arc<dyn GuardianProvider>,
    versions: Arc<dyn VersionHistory>,
    namespacer: NamespaceMapper,
    authorizer: Arc<DashboardAuthorizer>,
    dual_writer_metrics: Arc<DualWriterMetrics>,
}

impl DashboardsApiBuilder {
    #[must_use]
    pub fn new(config: DashboardsConfig, deps: DashboardsDeps) -> Self {
        let authorizer = Arc::new(DashboardAuthorizer::new(
            deps.guardians.clone(),
            &config.restricted_list_resource,
        ));
        Self {
            namespacer: NamespaceMapper::new(config.stack_id.clone()),
            config,
            legacy_store: deps.legacy_store,
            guardians: deps.guardians,
            versions: deps.versions,
            authorizer,
            dual_writer_metrics: Arc::new(DualWriterMetrics::default()),
        }
    }

    #[must_use]
    pub fn group_version(&self) -> String {
        DASHBOARD_RESOURCE_INFO.group_version()
    }

    #[must_use]
    pub fn namespacer(&self) -> &NamespaceMapper {
        &self.namespacer
    }

    #[must_use]
    pub fn authorizer(&self) -> Arc<dyn Authorizer> {
        self.authorizer.clone()
    }

    /// Counters of every dual writer this builder has produced.
    #[must_use]
    pub fn dual_writer_metrics(&self) -> Arc<DualWriterMetrics> {
        self.dual_writer_metrics.clone()
    }

    /// Build the storage registry for the group.
    ///
    /// `dashboards` is served by the legacy store alone, or by a
    /// [`DualWriter`] mirroring into `unified_store` when one is supplied.
    /// `dashboards/access`, `dashboards/versions` and `summary` are
    /// registered either way.
    ///
    /// # Errors
    ///
    /// Fails if `unified_store` is the legacy store itself.
    pub fn api_group_storage(
        &self,
        unified_store: Option<Arc<dyn CrudBackend>>,
    ) -> anyhow::Result<ResourceRegistry> {
        let dashboards: Arc<dyn CrudBackend> = match unified_store {
            Some(unified) => {
                if std::ptr::addr_eq(Arc::as_ptr(&unified), Arc::as_ptr(&self.legacy_store)) {
                    bail!("unified dashboards store must differ from the legacy store");
                }
                info!(
                    prefer_secondary_reads = self.config.dual_write.prefer_secondary_reads,
                    secondary_writes = ?self.config.dual_write.secondary_writes,
                    "Dashboards storage in dual-write mode"
                );
                Arc::new(
                    DualWriter::new(self.legacy_store.clone(), unified, self.config.dual_write)
                        .with_metrics(self.dual_writer_metrics.clone()),
                )
            }
            None => self.legacy_store.clone(),
        };

        let access: Arc<dyn SubresourceHandler> =
            Arc::new(AccessHandler::new(self.guardians.clone()));
        let versions: Arc<dyn SubresourceHandler> =
            Arc::new(VersionsHandler::new(self.versions.clone()));

        let mut registry = ResourceRegistry::new(
            DASHBOARD_RESOURCE_INFO.group,
            DASHBOARD_RESOURCE_INFO.version,
        );
        registry.register(
            &DASHBOARD_RESOURCE_INFO,
            dashboards.clone(),
            [("access", access), ("versions", versions)],
        );
        registry.register(
            &DASHBOARD_SUMMARY_RESOURCE_INFO,
            Arc::new(SummaryStore::new(dashboards)),
            [],
        );
        Ok(registry)
    }
}
