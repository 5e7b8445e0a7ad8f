//! Configuration for a consolidation run
//!
//! Values come from built-in defaults, an optional TOML file and finally
//! command line overrides applied by the binary.

use crate::error::{ConsolidationError, ConsolidationResult};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming a TOML configuration file
pub const CONFIG_ENV_VAR: &str = "SCHEMA_CONSOLIDATOR_CONFIG";

pub const DEFAULT_SCHEMA_DIR: &str = "schema";
pub const DEFAULT_ROOT: &str = "workflow.json";
pub const DEFAULT_OUTPUT: &str = "consolidated_workflow_schema.json";

/// Which documents contribute their `definitions` block to the output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HarvestScope {
    /// Every `*.json` file in the schema directory, reachable or not
    #[default]
    All,
    /// Only documents touched while resolving the root
    Reachable,
}

/// What happens when a harvested key already exists in the root's
/// own `definitions`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CollisionPolicy {
    /// Harvested entry overwrites the root entry
    #[default]
    LibraryWins,
    /// Root entry is kept, harvested entry is dropped
    RootWins,
    /// The run fails
    Reject,
}

/// Which document an internal `#/definitions/<name>` reference is
/// namespaced against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RewriteMode {
    /// The document that authored the reference, tracked during resolution
    #[default]
    Provenance,
    /// The document named at the rewrite call site (root for the resolved
    /// tree, the harvested file for definitions). Mis-namespaces internal
    /// references carried in through multi-hop chains.
    CallSite,
}

/// Consolidation run configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsolidatorConfig {
    /// Directory holding the interlinked schema documents
    pub schema_dir: PathBuf,
    /// Root document filename, relative to `schema_dir`
    pub root: String,
    /// Where the consolidated schema is written
    pub output: PathBuf,
    pub harvest_scope: HarvestScope,
    pub collision_policy: CollisionPolicy,
    pub rewrite_mode: RewriteMode,
}

impl Default for ConsolidatorConfig {
    fn default() -> Self {
        Self {
            schema_dir: PathBuf::from(DEFAULT_SCHEMA_DIR),
            root: DEFAULT_ROOT.to_string(),
            output: PathBuf::from(DEFAULT_OUTPUT),
            harvest_scope: HarvestScope::default(),
            collision_policy: CollisionPolicy::default(),
            rewrite_mode: RewriteMode::default(),
        }
    }
}

impl ConsolidatorConfig {
    /// Config for `root` inside `schema_dir`, everything else defaulted
    pub fn for_directory<P: Into<PathBuf>, S: Into<String>>(schema_dir: P, root: S) -> Self {
        Self {
            schema_dir: schema_dir.into(),
            root: root.into(),
            ..Self::default()
        }
    }

    /// Load configuration from a TOML file. Missing keys take their defaults.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> ConsolidationResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ConsolidationError::config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        let config: ConsolidatorConfig = toml::from_str(&content)?;
        config.validate()?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load from the file named by `SCHEMA_CONSOLIDATOR_CONFIG`, or defaults
    pub fn load_from_env() -> ConsolidationResult<Self> {
        match std::env::var(CONFIG_ENV_VAR) {
            Ok(path) if !path.trim().is_empty() => Self::load_from_file(path),
            _ => Ok(Self::default()),
        }
    }

    /// Reject configurations that cannot name a root document
    pub fn validate(&self) -> ConsolidationResult<()> {
        if self.root.trim().is_empty() {
            return Err(ConsolidationError::config("Root schema filename is empty"));
        }
        let root_path = Path::new(&self.root);
        if root_path.file_name().is_none() || root_path.components().count() != 1 {
            return Err(ConsolidationError::config(format!(
                "Root schema '{}' must be a plain filename inside the schema directory",
                self.root
            )));
        }
        if self.output.as_os_str().is_empty() {
            return Err(ConsolidationError::config("Output path is empty"));
        }
        Ok(())
    }
}
