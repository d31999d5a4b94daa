//! Configuration for the dashboards module.

use std::path::Path;

use figment::Figment;
use figment::providers::{Env, Format, Yaml};
use serde::Deserialize;

/// Prefix for environment overrides; `__` separates nested keys
/// (`DASHBOARDS__DUAL_WRITE__PREFER_SECONDARY_READS=true`).
pub const ENV_PREFIX: &str = "DASHBOARDS__";

/// Module configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardsConfig {
    /// Register the dashboards API group at all. Checked once at startup.
    pub experimental_apis: bool,

    /// Hosted stack id; when set every org maps to `stack-<id>`.
    pub stack_id: Option<String>,

    /// Resource whose collection `list` is reserved for server admins.
    pub restricted_list_resource: String,

    /// Legacy/unified dual-write behaviour.
    pub dual_write: DualWriterConfig,
}

impl Default for DashboardsConfig {
    fn default() -> Self {
        Self {
            experimental_apis: false,
            stack_id: None,
            restricted_list_resource: "summary".to_owned(),
            dual_write: DualWriterConfig::default(),
        }
    }
}

impl DashboardsConfig {
    /// Load from an optional YAML file, then apply `DASHBOARDS__*` environment overrides.
    ///
    /// # Errors
    ///
    /// Returns a `figment::Error` if the file cannot be parsed or contains unknown keys.
    pub fn load(path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::new();
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
    }
}

/// Where writes to the unified store are executed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecondaryWriteMode {
    /// Mirror within the request, after the legacy write returns.
    #[default]
    Inline,
    /// Queue the mirror for an ordered background worker; the response does
    /// not wait for it.
    Background,
}

/// Dual-writer configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DualWriterConfig {
    /// Serve `get`/`list` from the unified store instead of the legacy one.
    pub prefer_secondary_reads: bool,
    pub secondary_writes: SecondaryWriteMode,
}
