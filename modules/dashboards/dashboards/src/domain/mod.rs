//! Domain layer for the dashboards module.

use std::future::Future;

use tokio_util::sync::CancellationToken;

pub mod access;
pub mod authorizer;
pub mod dual_writer;
pub mod registry;
pub mod summary;
pub mod versions;

pub use access::AccessHandler;
pub use authorizer::{Capability, DashboardAuthorizer};
pub use dual_writer::{
    DualWriteOutcome, DualWriter, DualWriterMetrics, DualWriterMetricsSnapshot, SecondaryOutcome,
};
pub use registry::{Handler, ResourceRegistry};
pub use summary::SummaryStore;
pub use versions::VersionsHandler;

/// Drive `fut` until it completes or `cancel` fires, whichever comes first.
///
/// Returns `None` on cancellation; the future is dropped at that point, which
/// aborts any lookup it was awaiting.
pub(crate) async fn until_cancelled<F: Future>(
    cancel: &CancellationToken,
    fut: F,
) -> Option<F::Output> {
    tokio::select! {
        biased;
        () = cancel.cancelled() => None,
        out = fut => Some(out),
    }
}
