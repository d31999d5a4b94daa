//! Storage bridge writing to the legacy store and mirroring into the unified one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use dashboards_sdk::{CrudBackend, DashboardObject, ListOptions, Patch, StoreError, TableRow};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::{DualWriterConfig, SecondaryWriteMode};

/// What happened to the mirrored write on the secondary store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecondaryOutcome {
    Applied,
    /// Recorded and logged only; never surfaced to the caller.
    Failed(StoreError),
    /// The primary write failed, so nothing was mirrored.
    Skipped,
    /// Queued for the background mirror worker; the result lands in the metrics.
    Deferred,
}

/// Full result of a dual write.
///
/// `primary` is exactly what the caller of the plain `CrudBackend` method sees.
#[derive(Debug, Clone, PartialEq)]
pub struct DualWriteOutcome<T> {
    pub primary: Result<T, StoreError>,
    pub secondary: SecondaryOutcome,
}

impl<T> DualWriteOutcome<T> {
    /// # Errors
    ///
    /// Returns the primary store's error, if any.
    pub fn into_result(self) -> Result<T, StoreError> {
        self.primary
    }
}

/// Secondary write counters, shared between a writer and its background tasks.
#[derive(Debug, Default)]
pub struct DualWriterMetrics {
    secondary_ok: AtomicU64,
    secondary_failed: AtomicU64,
    secondary_skipped: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DualWriterMetricsSnapshot {
    pub secondary_ok: u64,
    pub secondary_failed: u64,
    pub secondary_skipped: u64,
}

impl DualWriterMetrics {
    #[must_use]
    pub fn snapshot(&self) -> DualWriterMetricsSnapshot {
        DualWriterMetricsSnapshot {
            secondary_ok: self.secondary_ok.load(Ordering::Relaxed),
            secondary_failed: self.secondary_failed.load(Ordering::Relaxed),
            secondary_skipped: self.secondary_skipped.load(Ordering::Relaxed),
        }
    }
}

/// A write to replay on the secondary store.
enum Mirror {
    Create(DashboardObject),
    Update {
        namespace: String,
        name: String,
        obj: DashboardObject,
    },
    Delete {
        namespace: String,
        name: String,
    },
}

impl Mirror {
    fn op(&self) -> &'static str {
        match self {
            Self::Create(_) => "create",
            Self::Update { .. } => "update",
            Self::Delete { .. } => "delete",
        }
    }

    fn target(&self) -> (&str, &str) {
        match self {
            Self::Create(obj) => (obj.namespace(), obj.name()),
            Self::Update {
                namespace, name, ..
            }
            | Self::Delete { namespace, name } => (namespace, name),
        }
    }

    async fn apply(
        &self,
        secondary: &dyn CrudBackend,
        cancel: &CancellationToken,
    ) -> Result<(), StoreError> {
        match self {
            Self::Create(obj) => secondary.create(cancel, obj.clone()).await.map(drop),
            Self::Update {
                namespace,
                name,
                obj,
            } => {
                match secondary
                    .update(cancel, namespace, name, Patch::Replace(obj.clone()))
                    .await
                {
                    // Record predates the unified store
                    Err(e) if e.is_not_found() => {
                        secondary.create(cancel, obj.clone()).await.map(drop)
                    }
                    other => other.map(drop),
                }
            }
            Self::Delete { namespace, name } => {
                match secondary.delete(cancel, namespace, name).await {
                    Err(e) if e.is_not_found() => Ok(()),
                    other => other,
                }
            }
        }
    }

    fn settle(
        &self,
        metrics: &DualWriterMetrics,
        result: Result<(), StoreError>,
    ) -> SecondaryOutcome {
        let (namespace, name) = self.target();
        match result {
            Ok(()) => {
                metrics.secondary_ok.fetch_add(1, Ordering::Relaxed);
                debug!(op = self.op(), namespace, name, "secondary write applied");
                SecondaryOutcome::Applied
            }
            Err(e) => {
                metrics.secondary_failed.fetch_add(1, Ordering::Relaxed);
                warn!(
                    op = self.op(),
                    namespace,
                    name,
                    error = %e,
                    "secondary write failed"
                );
                SecondaryOutcome::Failed(e)
            }
        }
    }
}

/// Replays queued mirrors one at a time, in the order they were queued.
///
/// Runs until every sender is dropped, then drains what is left.
async fn drain_mirrors(
    mut queue: mpsc::UnboundedReceiver<Mirror>,
    secondary: Arc<dyn CrudBackend>,
    metrics: Arc<DualWriterMetrics>,
) {
    // Outlives the requests that queued the work, so it cannot share their tokens
    let cancel = CancellationToken::new();
    while let Some(mirror) = queue.recv().await {
        let result = mirror.apply(secondary.as_ref(), &cancel).await;
        mirror.settle(&metrics, result);
    }
    debug!("secondary mirror queue closed");
}

/// `CrudBackend` over a legacy (primary) and a unified (secondary) store.
///
/// Writes go to the primary first and only the primary's result is returned.
/// A successful primary write is then replayed on the secondary; secondary
/// failures are logged and counted but never fail or roll back the request.
///
/// In background mode the replays of one writer go through a single queue,
/// so the secondary sees writes in the order the primary acknowledged them.
pub struct DualWriter {
    primary: Arc<dyn CrudBackend>,
    secondary: Arc<dyn CrudBackend>,
    config: DualWriterConfig,
    metrics: Arc<DualWriterMetrics>,
    /// Sender side of the mirror worker; the worker is spawned on first use.
    queue: OnceLock<mpsc::UnboundedSender<Mirror>>,
}

impl DualWriter {
    #[must_use]
    pub fn new(
        primary: Arc<dyn CrudBackend>,
        secondary: Arc<dyn CrudBackend>,
        config: DualWriterConfig,
    ) -> Self {
        Self {
            primary,
            secondary,
            config,
            metrics: Arc::new(DualWriterMetrics::default()),
            queue: OnceLock::new(),
        }
    }

    /// Report into an externally owned set of counters.
    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<DualWriterMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    #[must_use]
    pub fn metrics(&self) -> Arc<DualWriterMetrics> {
        self.metrics.clone()
    }

    fn reader(&self) -> &dyn CrudBackend {
        if self.config.prefer_secondary_reads {
            self.secondary.as_ref()
        } else {
            self.primary.as_ref()
        }
    }

    async fn finish<T>(
        &self,
        cancel: &CancellationToken,
        primary: Result<T, StoreError>,
        mirror: impl FnOnce(&T) -> Mirror,
    ) -> DualWriteOutcome<T> {
        let secondary = match &primary {
            Ok(value) => self.mirror(cancel, mirror(value)).await,
            Err(_) => {
                self.metrics
                    .secondary_skipped
                    .fetch_add(1, Ordering::Relaxed);
                SecondaryOutcome::Skipped
            }
        };
        DualWriteOutcome { primary, secondary }
    }

    async fn mirror(&self, cancel: &CancellationToken, mirror: Mirror) -> SecondaryOutcome {
        match self.config.secondary_writes {
            SecondaryWriteMode::Inline => {
                let result = mirror.apply(self.secondary.as_ref(), cancel).await;
                mirror.settle(&self.metrics, result)
            }
            SecondaryWriteMode::Background => match self.mirror_queue().send(mirror) {
                Ok(()) => SecondaryOutcome::Deferred,
                Err(mpsc::error::SendError(mirror)) => mirror.settle(
                    &self.metrics,
                    Err(StoreError::Unavailable(
                        "secondary mirror worker stopped".to_owned(),
                    )),
                ),
            },
        }
    }

    fn mirror_queue(&self) -> &mpsc::UnboundedSender<Mirror> {
        self.queue.get_or_init(|| {
            let (tx, rx) = mpsc::unbounded_channel();
            tokio::spawn(drain_mirrors(
                rx,
                self.secondary.clone(),
                self.metrics.clone(),
            ));
            tx
        })
    }

    #[tracing::instrument(skip_all, fields(namespace = %obj.namespace(), name = %obj.name()))]
    pub async fn create_with_outcome(
        &self,
        cancel: &CancellationToken,
        obj: DashboardObject,
    ) -> DualWriteOutcome<DashboardObject> {
        let result = self.primary.create(cancel, obj).await;
        self.finish(cancel, result, |created| {
            Mirror::Create(created.without_resource_version())
        })
        .await
    }

    #[tracing::instrument(skip_all, fields(namespace = %namespace, name = %name))]
    pub async fn update_with_outcome(
        &self,
        cancel: &CancellationToken,
        namespace: &str,
        name: &str,
        patch: Patch,
    ) -> DualWriteOutcome<DashboardObject> {
        let result = self.primary.update(cancel, namespace, name, patch).await;
        self.finish(cancel, result, |updated| Mirror::Update {
            namespace: namespace.to_owned(),
            name: name.to_owned(),
            obj: updated.without_resource_version(),
        })
        .await
    }

    #[tracing::instrument(skip_all, fields(namespace = %namespace, name = %name))]
    pub async fn delete_with_outcome(
        &self,
        cancel: &CancellationToken,
        namespace: &str,
        name: &str,
    ) -> DualWriteOutcome<()> {
        let result = self.primary.delete(cancel, namespace, name).await;
        self.finish(cancel, result, |&()| Mirror::Delete {
            namespace: namespace.to_owned(),
            name: name.to_owned(),
        })
        .await
    }
}

#[async_trait]
impl CrudBackend for DualWriter {
    async fn create(
        &self,
        cancel: &CancellationToken,
        obj: DashboardObject,
    ) -> Result<DashboardObject, StoreError> {
        self.create_with_outcome(cancel, obj).await.into_result()
    }

    async fn get(
        &self,
        cancel: &CancellationToken,
        namespace: &str,
        name: &str,
    ) -> Result<DashboardObject, StoreError> {
        self.reader().get(cancel, namespace, name).await
    }

    async fn list(
        &self,
        cancel: &CancellationToken,
        namespace: &str,
        options: &ListOptions,
    ) -> Result<Vec<DashboardObject>, StoreError> {
        self.reader().list(cancel, namespace, options).await
    }

    async fn update(
        &self,
        cancel: &CancellationToken,
        namespace: &str,
        name: &str,
        patch: Patch,
    ) -> Result<DashboardObject, StoreError> {
        self.update_with_outcome(cancel, namespace, name, patch)
            .await
            .into_result()
    }

    async fn delete(
        &self,
        cancel: &CancellationToken,
        namespace: &str,
        name: &str,
    ) -> Result<(), StoreError> {
        self.delete_with_outcome(cancel, namespace, name)
            .await
            .into_result()
    }

    fn to_table_row(&self, obj: &DashboardObject) -> Result<TableRow, StoreError> {
        self.primary.to_table_row(obj)
    }
}
