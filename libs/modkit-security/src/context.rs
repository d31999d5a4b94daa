use uuid::Uuid;

/// Org id assigned to callers that carry no explicit home organization.
pub const DEFAULT_ORG_ID: i64 = 1;

/// `SecurityContext` is the caller identity attached to a request.
///
/// Built by authentication and passed through unchanged to authorization and
/// storage. Authorization code treats it as opaque apart from the
/// server-admin flag, which only matters for collection-level list requests.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SecurityContext {
    /// The authenticated user or service account.
    subject_id: Uuid,
    /// The org the subject signed in to.
    org_id: i64,
    /// Server-wide administrator (crosses org boundaries).
    #[serde(default)]
    is_server_admin: bool,
}

impl SecurityContext {
    /// Create a new `SecurityContext` builder
    #[must_use]
    pub fn builder() -> SecurityContextBuilder {
        SecurityContextBuilder::default()
    }

    #[must_use]
    pub fn subject_id(&self) -> Uuid {
        self.subject_id
    }

    /// Home org of the subject. This is not necessarily the org a request targets;
    /// the target org comes from the request namespace.
    #[must_use]
    pub fn org_id(&self) -> i64 {
        self.org_id
    }

    /// Whether the subject is a server-wide administrator.
    #[must_use]
    pub fn is_server_admin(&self) -> bool {
        self.is_server_admin
    }
}

#[derive(Default)]
pub struct SecurityContextBuilder {
    subject_id: Option<Uuid>,
    org_id: Option<i64>,
    is_server_admin: bool,
}

impl SecurityContextBuilder {
    #[must_use]
    pub fn subject_id(mut self, subject_id: Uuid) -> Self {
        self.subject_id = Some(subject_id);
        self
    }

    #[must_use]
    pub fn org_id(mut self, org_id: i64) -> Self {
        self.org_id = Some(org_id);
        self
    }

    #[must_use]
    pub fn server_admin(mut self, is_server_admin: bool) -> Self {
        self.is_server_admin = is_server_admin;
        self
    }

    /// Missing fields fall back to the nil subject and [`DEFAULT_ORG_ID`].
    #[must_use]
    pub fn build(self) -> SecurityContext {
        SecurityContext {
            subject_id: self.subject_id.unwrap_or_default(),
            org_id: self.org_id.unwrap_or(DEFAULT_ORG_ID),
            is_server_admin: self.is_server_admin,
        }
    }
}
