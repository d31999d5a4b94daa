//! Namespace ⇄ org grammar.
//!
//! | namespace      | org | stack |
//! |----------------|-----|-------|
//! | `default`      | 1   | -     |
//! | `org-<n>`      | n   | -     |
//! | `stack-<id>`   | 1   | id    |
//!
//! `org-1` and zero-padded ids such as `org-05` are rejected: `default` is
//! the only spelling for org 1 and `org-5` the only one for org 5, so every
//! org has exactly one namespace. Anything else is a hard error; there is no
//! implicit default tenant.

use crate::error::NamespaceError;

const DEFAULT_NAMESPACE: &str = "default";
const ORG_PREFIX: &str = "org-";
const STACK_PREFIX: &str = "stack-";
const DEFAULT_ORG_ID: i64 = 1;

/// Tenant resolved from a namespace string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceInfo {
    /// The namespace as given.
    pub value: String,
    pub org_id: i64,
    /// Set for hosted stacks; the org is always 1 there.
    pub stack_id: Option<String>,
}

/// Resolve a namespace string to exactly one org.
///
/// # Errors
///
/// - [`NamespaceError::Empty`] for an empty string
/// - [`NamespaceError::Invalid`] when the string does not follow the grammar
pub fn parse_namespace(ns: &str) -> Result<NamespaceInfo, NamespaceError> {
    if ns.is_empty() {
        return Err(NamespaceError::Empty);
    }

    if ns == DEFAULT_NAMESPACE {
        return Ok(NamespaceInfo {
            value: ns.to_owned(),
            org_id: DEFAULT_ORG_ID,
            stack_id: None,
        });
    }

    if let Some(raw) = ns.strip_prefix(ORG_PREFIX) {
        if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(NamespaceError::invalid(ns, "org id must be a positive integer"));
        }
        if raw.len() > 1 && raw.starts_with('0') {
            return Err(NamespaceError::invalid(ns, "org id must not be zero-padded"));
        }
        let org_id: i64 = raw
            .parse()
            .map_err(|_| NamespaceError::invalid(ns, "org id out of range"))?;
        if org_id < 1 {
            return Err(NamespaceError::invalid(ns, "org id must be a positive integer"));
        }
        if org_id == DEFAULT_ORG_ID {
            return Err(NamespaceError::invalid(ns, "use 'default' rather than 'org-1'"));
        }
        return Ok(NamespaceInfo {
            value: ns.to_owned(),
            org_id,
            stack_id: None,
        });
    }

    if let Some(stack) = ns.strip_prefix(STACK_PREFIX) {
        if stack.len() < 2 {
            return Err(NamespaceError::invalid(ns, "invalid stack id"));
        }
        return Ok(NamespaceInfo {
            value: ns.to_owned(),
            org_id: DEFAULT_ORG_ID,
            stack_id: Some(stack.to_owned()),
        });
    }

    Err(NamespaceError::invalid(
        ns,
        "expected 'default', 'org-<id>' or 'stack-<id>'",
    ))
}

/// Maps an org id to its namespace string.
///
/// With a stack configured every org maps to `stack-<id>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceMapper {
    stack_id: Option<String>,
}

impl NamespaceMapper {
    #[must_use]
    pub fn new(stack_id: Option<String>) -> Self {
        Self {
            stack_id: stack_id.filter(|s| !s.is_empty()),
        }
    }

    #[must_use]
    pub fn namespace_for(&self, org_id: i64) -> String {
        match &self.stack_id {
            Some(stack) => format!("{STACK_PREFIX}{stack}"),
            None if org_id == DEFAULT_ORG_ID => DEFAULT_NAMESPACE.to_owned(),
            None => format!("{ORG_PREFIX}{org_id}"),
        }
    }
}
