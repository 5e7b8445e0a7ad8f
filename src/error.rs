use std::io;

/// Unified error type for a consolidation run.
///
/// Only conditions that abort the run are represented here. Degraded
/// references (missing documents, dangling pointers, cycles) are logged as
/// warnings and counted in the run report instead.
#[derive(Debug, thiserror::Error)]
pub enum ConsolidationError {
    /// The root document could not be loaded; the only fatal resolution path
    #[error("Could not load root schema '{file}': {reason}")]
    RootNotLoadable { file: String, reason: String },

    /// IO errors (directory enumeration, writing the artifact)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML configuration parsing errors
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// A harvested definition collided with a root-level definition under
    /// the `reject` collision policy
    #[error("Definition collision: {0}")]
    DefinitionCollision(String),

    /// The external validator process could not be run
    #[error("Validator error: {0}")]
    Validator(String),
}

impl ConsolidationError {
    /// Create a root-not-loadable error with context
    pub fn root_not_loadable<F: Into<String>, R: Into<String>>(file: F, reason: R) -> Self {
        Self::RootNotLoadable {
            file: file.into(),
            reason: reason.into(),
        }
    }

    /// Create a configuration error with context
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Whether this error was raised before any output could be produced
    /// because the root document itself is unusable.
    pub fn is_root_failure(&self) -> bool {
        matches!(self, Self::RootNotLoadable { .. })
    }
}

/// Result type alias for operations that can result in a ConsolidationError
pub type ConsolidationResult<T> = Result<T, ConsolidationError>;
