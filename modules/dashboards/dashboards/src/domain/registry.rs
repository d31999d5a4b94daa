//! Storage-path keyed handler registry for one API group version.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use dashboards_sdk::{CrudBackend, ResourceInfo, SubresourceHandler};
use tracing::warn;

/// What serves a storage path.
#[derive(Clone)]
pub enum Handler {
    Store(Arc<dyn CrudBackend>),
    Subresource(Arc<dyn SubresourceHandler>),
}

impl Handler {
    #[must_use]
    pub fn as_store(&self) -> Option<&Arc<dyn CrudBackend>> {
        match self {
            Self::Store(store) => Some(store),
            Self::Subresource(_) => None,
        }
    }

    #[must_use]
    pub fn as_subresource(&self) -> Option<&Arc<dyn SubresourceHandler>> {
        match self {
            Self::Subresource(handler) => Some(handler),
            Self::Store(_) => None,
        }
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Store(_) => f.write_str("Handler::Store"),
            Self::Subresource(_) => f.write_str("Handler::Subresource"),
        }
    }
}

/// Maps storage paths (`dashboards`, `dashboards/access`, `summary`) to handlers.
///
/// Built once at startup and read-only afterwards.
#[derive(Debug)]
pub struct ResourceRegistry {
    group: &'static str,
    version: &'static str,
    handlers: HashMap<String, Handler>,
}

impl ResourceRegistry {
    #[must_use]
    pub fn new(group: &'static str, version: &'static str) -> Self {
        Self {
            group,
            version,
            handlers: HashMap::new(),
        }
    }

    #[must_use]
    pub fn group_version(&self) -> String {
        format!("{}/{}", self.group, self.version)
    }

    /// Register a resource's store together with its sub-resource handlers.
    pub fn register(
        &mut self,
        info: &ResourceInfo,
        store: Arc<dyn CrudBackend>,
        subresources: impl IntoIterator<Item = (&'static str, Arc<dyn SubresourceHandler>)>,
    ) {
        self.insert(info.storage_path(None), Handler::Store(store));
        for (sub, handler) in subresources {
            self.insert(info.storage_path(Some(sub)), Handler::Subresource(handler));
        }
    }

    /// Bind `path` to `handler`; an existing binding is replaced.
    pub fn insert(&mut self, path: String, handler: Handler) {
        if self.handlers.contains_key(&path) {
            warn!(
                group_version = %self.group_version(),
                path = %path,
                "storage path registered twice, replacing previous handler"
            );
        }
        self.handlers.insert(path, handler);
    }

    #[must_use]
    pub fn lookup(&self, resource: &str, subresource: Option<&str>) -> Option<&Handler> {
        match subresource {
            Some(sub) if !sub.is_empty() => self.handlers.get(&format!("{resource}/{sub}")),
            _ => self.handlers.get(resource),
        }
    }

    /// Shorthand for the store bound to a top-level resource.
    #[must_use]
    pub fn store(&self, resource: &str) -> Option<Arc<dyn CrudBackend>> {
        self.lookup(resource, None)
            .and_then(Handler::as_store)
            .cloned()
    }

    /// Registered storage paths, sorted.
    #[must_use]
    pub fn paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        paths.sort_unstable();
        paths
    }
}
