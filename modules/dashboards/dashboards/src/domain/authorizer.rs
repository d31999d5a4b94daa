//! Tenant-scoped authorization decisions for dashboard requests.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use dashboards_sdk::{
    AuthorizeError, Authorizer, DashboardGuardian, Decision, GuardianError, GuardianProvider,
    RequestAttributes, Verb, parse_namespace,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::until_cancelled;

/// Reason attached when a non-admin lists the restricted collection.
pub const RESTRICTED_LIST_REASON: &str = "list summary objects (or connect admin)";

const LOOKUP_FAILED_REASON: &str = "error loading dashboard";

/// Permission a request needs on the target dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    View,
    Save,
    Edit,
    Delete,
}

impl Capability {
    /// Map a request verb to the capability it requires.
    ///
    /// `create`/`post` both need save and `update`/`patch`/`put` all need
    /// edit. `None` for verbs outside the vocabulary (and for `list`, which
    /// never targets a single dashboard).
    #[must_use]
    pub fn for_verb(verb: &Verb) -> Option<Self> {
        match verb {
            Verb::Get => Some(Self::View),
            Verb::Create | Verb::Post => Some(Self::Save),
            Verb::Update | Verb::Patch | Verb::Put => Some(Self::Edit),
            Verb::Delete => Some(Self::Delete),
            Verb::List | Verb::Other(_) => None,
        }
    }

    #[must_use]
    pub fn denied_reason(self) -> &'static str {
        match self {
            Self::View => "can not view dashboard",
            Self::Save => "can not save dashboard",
            Self::Edit => "can not edit dashboard",
            Self::Delete => "can not delete dashboard",
        }
    }

    /// Ask `guardian` whether this capability is granted.
    ///
    /// # Errors
    ///
    /// Propagates `GuardianError::Evaluation` from the guardian.
    pub async fn evaluate(self, guardian: &dyn DashboardGuardian) -> Result<bool, GuardianError> {
        match self {
            Self::View => guardian.can_view().await,
            Self::Save => guardian.can_save().await,
            Self::Edit => guardian.can_edit().await,
            Self::Delete => guardian.can_delete().await,
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::View => "view",
            Self::Save => "save",
            Self::Edit => "edit",
            Self::Delete => "delete",
        })
    }
}

/// Decision engine for the dashboards API group.
///
/// Holds no per-request state; one instance serves every request.
pub struct DashboardAuthorizer {
    guardians: Arc<dyn GuardianProvider>,
    restricted_list_resource: String,
}

impl DashboardAuthorizer {
    #[must_use]
    pub fn new(guardians: Arc<dyn GuardianProvider>, restricted_list_resource: &str) -> Self {
        Self {
            guardians,
            restricted_list_resource: restricted_list_resource.to_owned(),
        }
    }

    async fn decide(&self, cancel: &CancellationToken, attrs: &RequestAttributes) -> Decision {
        if !attrs.resource_request {
            return Decision::no_opinion("");
        }

        if attrs.name.is_empty() {
            if attrs.verb == Verb::List
                && !attrs.caller.is_server_admin()
                && attrs.resource == self.restricted_list_resource
            {
                return Decision::deny(RESTRICTED_LIST_REASON);
            }
            return Decision::no_opinion("");
        }

        if attrs.namespace.is_empty() {
            return Decision::deny("expected namespace");
        }

        let tenant = match parse_namespace(&attrs.namespace) {
            Ok(tenant) => tenant,
            Err(e) => return Decision::deny_with("error reading org from namespace", e),
        };

        let lookup = self
            .guardians
            .for_resource(cancel, &attrs.name, &tenant, &attrs.caller);
        let guardian = match until_cancelled(cancel, lookup).await {
            None => {
                return Decision::deny_with(LOOKUP_FAILED_REASON, AuthorizeError::Cancelled);
            }
            Some(Err(e)) => return Decision::deny_with(LOOKUP_FAILED_REASON, e),
            Some(Ok(guardian)) => guardian,
        };

        let Some(capability) = Capability::for_verb(&attrs.verb) else {
            info!(verb = %attrs.verb, "unknown verb");
            return Decision::no_opinion("unsupported verb");
        };

        let reason = capability.denied_reason();
        match until_cancelled(cancel, capability.evaluate(guardian.as_ref())).await {
            None => Decision::deny_with(reason, AuthorizeError::Cancelled),
            Some(Ok(true)) => Decision::allow(),
            Some(Ok(false)) => Decision::deny(reason),
            Some(Err(e)) => Decision::deny_with(reason, e),
        }
    }
}

#[async_trait]
impl Authorizer for DashboardAuthorizer {
    #[tracing::instrument(
        skip_all,
        fields(verb = %attrs.verb, resource = %attrs.resource, name = %attrs.name)
    )]
    async fn authorize(&self, cancel: &CancellationToken, attrs: &RequestAttributes) -> Decision {
        let decision = self.decide(cancel, attrs).await;
        debug!(
            outcome = ?decision.outcome,
            reason = %decision.reason,
            "authorization decision"
        );
        decision
    }
}
