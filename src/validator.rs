//! Boundary to an external validator process.
//!
//! The validator is any program that takes a file path as its last argument
//! and signals acceptance through its exit status.

use crate::error::{ConsolidationError, ConsolidationResult};
use log::{info, warn};
use std::path::Path;
use std::process::{Command, Stdio};

/// Verdict of one validator invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub success: bool,
    /// Captured stdout followed by stderr
    pub logs: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalValidator {
    program: String,
    args: Vec<String>,
}

impl ExternalValidator {
    pub fn new<S: Into<String>>(program: S) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Arguments passed before the file path
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Run the validator against `path`. A non-zero exit is a failed
    /// validation, not an error; only failing to run the program is.
    pub fn validate(&self, path: &Path) -> ConsolidationResult<ValidationReport> {
        info!("Validating {} with {}", path.display(), self.program);
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| {
                ConsolidationError::Validator(format!(
                    "failed to run validator ({}): {}",
                    self.program, e
                ))
            })?;

        let mut logs = String::from_utf8_lossy(&output.stdout).into_owned();
        logs.push_str(&String::from_utf8_lossy(&output.stderr));
        let success = output.status.success();
        if success {
            info!("Validator accepted {}", path.display());
        } else {
            warn!(
                "Validator rejected {} ({})",
                path.display(),
                output.status
            );
        }

        Ok(ValidationReport { success, logs })
    }
}
