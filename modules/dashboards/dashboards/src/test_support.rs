#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use dashboards_sdk::{
    CrudBackend, DashboardGuardian, DashboardObject, DashboardVersionInfo, GuardianError,
    GuardianProvider, ListOptions, NamespaceInfo, Patch, StoreError, TableConvertor, TableRow,
    VersionHistory, apply_merge_patch,
};
use modkit_security::SecurityContext;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

#[must_use]
pub fn user_ctx() -> SecurityContext {
    SecurityContext::builder()
        .subject_id(Uuid::new_v4())
        .org_id(5)
        .build()
}

#[must_use]
pub fn admin_ctx() -> SecurityContext {
    SecurityContext::builder()
        .subject_id(Uuid::new_v4())
        .server_admin(true)
        .build()
}

/// Capabilities a scripted guardian grants.
#[derive(Debug, Clone, Copy, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct Grants {
    pub view: bool,
    pub save: bool,
    pub edit: bool,
    pub delete: bool,
}

impl Grants {
    pub fn all() -> Self {
        Self {
            view: true,
            save: true,
            edit: true,
            delete: true,
        }
    }

    pub fn view_only() -> Self {
        Self {
            view: true,
            ..Self::default()
        }
    }
}

enum Script {
    Grants(Grants),
    LookupFails(GuardianError),
    EvaluationFails,
    Hangs,
}

/// Guardian provider answering from a fixed script keyed by (org, uid).
///
/// Unknown dashboards yield `GuardianError::NotFound`, like a real lookup.
#[derive(Default)]
pub struct ScriptedGuardians {
    scripts: HashMap<(i64, String), Script>,
    lookups: AtomicUsize,
}

impl ScriptedGuardians {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant(mut self, org_id: i64, uid: &str, grants: Grants) -> Self {
        self.scripts
            .insert((org_id, uid.to_owned()), Script::Grants(grants));
        self
    }

    pub fn failing_lookup(mut self, org_id: i64, uid: &str, err: GuardianError) -> Self {
        self.scripts
            .insert((org_id, uid.to_owned()), Script::LookupFails(err));
        self
    }

    pub fn failing_evaluation(mut self, org_id: i64, uid: &str) -> Self {
        self.scripts
            .insert((org_id, uid.to_owned()), Script::EvaluationFails);
        self
    }

    pub fn hanging(mut self, org_id: i64, uid: &str) -> Self {
        self.scripts.insert((org_id, uid.to_owned()), Script::Hangs);
        self
    }

    /// Number of guardian constructions so far.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GuardianProvider for ScriptedGuardians {
    async fn for_resource(
        &self,
        _cancel: &CancellationToken,
        name: &str,
        tenant: &NamespaceInfo,
        _caller: &SecurityContext,
    ) -> Result<Box<dyn DashboardGuardian>, GuardianError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        match self.scripts.get(&(tenant.org_id, name.to_owned())) {
            None => Err(GuardianError::NotFound {
                uid: name.to_owned(),
                org_id: tenant.org_id,
            }),
            Some(Script::Grants(grants)) => Ok(Box::new(ScriptedGuardian {
                grants: Some(*grants),
            })),
            Some(Script::LookupFails(err)) => Err(err.clone()),
            Some(Script::EvaluationFails) => Ok(Box::new(ScriptedGuardian { grants: None })),
            Some(Script::Hangs) => std::future::pending().await,
        }
    }
}

struct ScriptedGuardian {
    /// `None` makes every check fail with an evaluation error.
    grants: Option<Grants>,
}

impl ScriptedGuardian {
    fn check(&self, pick: fn(&Grants) -> bool) -> Result<bool, GuardianError> {
        self.grants
            .as_ref()
            .map(pick)
            .ok_or_else(|| GuardianError::Evaluation("permission store unreachable".to_owned()))
    }
}

#[async_trait]
impl DashboardGuardian for ScriptedGuardian {
    async fn can_view(&self) -> Result<bool, GuardianError> {
        self.check(|g| g.view)
    }

    async fn can_save(&self) -> Result<bool, GuardianError> {
        self.check(|g| g.save)
    }

    async fn can_edit(&self) -> Result<bool, GuardianError> {
        self.check(|g| g.edit)
    }

    async fn can_delete(&self) -> Result<bool, GuardianError> {
        self.check(|g| g.delete)
    }
}

/// In-memory `CrudBackend` with call recording and injectable failures.
#[derive(Default)]
pub struct MemoryStore {
    objects: Mutex<BTreeMap<(String, String), DashboardObject>>,
    version: AtomicU64,
    failure: Mutex<Option<StoreError>>,
    create_delay: Mutex<Option<Duration>>,
    calls: Mutex<Vec<&'static str>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every call fails as if the network were down.
    pub fn unreachable() -> Self {
        let store = Self::default();
        store.fail_with(StoreError::Unavailable("connection refused".to_owned()));
        store
    }

    pub fn fail_with(&self, err: StoreError) {
        *self.failure.lock() = Some(err);
    }

    /// Make every `create` take at least `delay` before touching the data.
    pub fn slow_creates(&self, delay: Duration) {
        *self.create_delay.lock() = Some(delay);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().clone()
    }

    pub fn object(&self, namespace: &str, name: &str) -> Option<DashboardObject> {
        self.objects
            .lock()
            .get(&(namespace.to_owned(), name.to_owned()))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.objects.lock().len()
    }

    /// Insert directly, bypassing call recording.
    pub fn seed(&self, mut obj: DashboardObject) -> DashboardObject {
        obj.metadata.resource_version = Some(self.next_version());
        obj.metadata.creation_timestamp.get_or_insert_with(Utc::now);
        obj.metadata.uid.get_or_insert_with(Uuid::new_v4);
        self.objects.lock().insert(
            (obj.metadata.namespace.clone(), obj.metadata.name.clone()),
            obj.clone(),
        );
        obj
    }

    fn begin(&self, call: &'static str, cancel: &CancellationToken) -> Result<(), StoreError> {
        self.calls.lock().push(call);
        if cancel.is_cancelled() {
            return Err(StoreError::Cancelled);
        }
        match self.failure.lock().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn next_version(&self) -> String {
        (self.version.fetch_add(1, Ordering::SeqCst) + 1).to_string()
    }
}

#[async_trait]
impl CrudBackend for MemoryStore {
    async fn create(
        &self,
        cancel: &CancellationToken,
        obj: DashboardObject,
    ) -> Result<DashboardObject, StoreError> {
        let delay = *self.create_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.begin("create", cancel)?;
        let key = (obj.metadata.namespace.clone(), obj.metadata.name.clone());
        if self.objects.lock().contains_key(&key) {
            return Err(StoreError::already_exists("dashboards", &key.1));
        }
        Ok(self.seed(obj))
    }

    async fn get(
        &self,
        cancel: &CancellationToken,
        namespace: &str,
        name: &str,
    ) -> Result<DashboardObject, StoreError> {
        self.begin("get", cancel)?;
        self.object(namespace, name)
            .ok_or_else(|| StoreError::not_found("dashboards", name))
    }

    async fn list(
        &self,
        cancel: &CancellationToken,
        namespace: &str,
        options: &ListOptions,
    ) -> Result<Vec<DashboardObject>, StoreError> {
        self.begin("list", cancel)?;
        let objects = self.objects.lock();
        let matching = objects
            .values()
            .filter(|o| o.metadata.namespace == namespace && options.matches(&o.metadata))
            .take(options.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect();
        Ok(matching)
    }

    async fn update(
        &self,
        cancel: &CancellationToken,
        namespace: &str,
        name: &str,
        patch: Patch,
    ) -> Result<DashboardObject, StoreError> {
        self.begin("update", cancel)?;
        let mut objects = self.objects.lock();
        let key = (namespace.to_owned(), name.to_owned());
        let existing = objects
            .get(&key)
            .cloned()
            .ok_or_else(|| StoreError::not_found("dashboards", name))?;

        let mut updated = match patch {
            Patch::Replace(replacement) => {
                if let Some(expected) = &replacement.metadata.resource_version
                    && existing.metadata.resource_version.as_ref() != Some(expected)
                {
                    return Err(StoreError::conflict(name, "resource version mismatch"));
                }
                let mut obj = replacement;
                obj.metadata.name = existing.metadata.name.clone();
                obj.metadata.namespace = existing.metadata.namespace.clone();
                obj.metadata.uid = existing.metadata.uid;
                obj.metadata.creation_timestamp = existing.metadata.creation_timestamp;
                obj
            }
            Patch::Merge(merge) => {
                let mut obj = existing;
                apply_merge_patch(&mut obj.spec, &merge);
                obj
            }
        };
        updated.metadata.resource_version = Some(self.next_version());
        objects.insert(key, updated.clone());
        Ok(updated)
    }

    async fn delete(
        &self,
        cancel: &CancellationToken,
        namespace: &str,
        name: &str,
    ) -> Result<(), StoreError> {
        self.begin("delete", cancel)?;
        self.objects
            .lock()
            .remove(&(namespace.to_owned(), name.to_owned()))
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found("dashboards", name))
    }

    fn to_table_row(&self, obj: &DashboardObject) -> Result<TableRow, StoreError> {
        TableConvertor::dashboards().row(obj)
    }
}

/// In-memory `VersionHistory` keyed by (org, uid).
#[derive(Default)]
pub struct MemoryHistory {
    revisions: Mutex<Vec<(i64, String, DashboardVersionInfo)>>,
    failure: Mutex<Option<StoreError>>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(
        &self,
        org_id: i64,
        uid: &str,
        version: i64,
        message: &str,
        spec: serde_json::Value,
    ) {
        let info = DashboardVersionInfo {
            version,
            parent_version: (version > 1).then_some(version - 1),
            created: Utc::now(),
            message: message.to_owned(),
            spec: Some(spec),
        };
        self.revisions.lock().push((org_id, uid.to_owned(), info));
    }

    pub fn fail_with(&self, err: StoreError) {
        *self.failure.lock() = Some(err);
    }

    fn matching(&self, org_id: i64, uid: &str) -> Result<Vec<DashboardVersionInfo>, StoreError> {
        if let Some(err) = self.failure.lock().clone() {
            return Err(err);
        }
        Ok(self
            .revisions
            .lock()
            .iter()
            .filter(|(org, id, _)| *org == org_id && id == uid)
            .map(|(_, _, info)| info.clone())
            .collect())
    }
}

#[async_trait]
impl VersionHistory for MemoryHistory {
    async fn list_versions(
        &self,
        _cancel: &CancellationToken,
        org_id: i64,
        uid: &str,
    ) -> Result<Vec<DashboardVersionInfo>, StoreError> {
        let versions = self.matching(org_id, uid)?;
        if versions.is_empty() {
            return Err(StoreError::not_found("versions", uid));
        }
        Ok(versions)
    }

    async fn get_version(
        &self,
        _cancel: &CancellationToken,
        org_id: i64,
        uid: &str,
        version: i64,
    ) -> Result<DashboardVersionInfo, StoreError> {
        self.matching(org_id, uid)?
            .into_iter()
            .find(|v| v.version == version)
            .ok_or_else(|| StoreError::not_found("versions", format!("{uid}@{version}")))
    }
}
