use crate::error::ConsolidationResult;
use log::info;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

/// Serialize a schema the way it is written to disk: two-space indented JSON
pub fn to_pretty_json(schema: &Value) -> ConsolidationResult<String> {
    Ok(serde_json::to_string_pretty(schema)?)
}

/// SHA-256 hex digest of the serialized schema
pub fn content_digest(schema: &Value) -> ConsolidationResult<String> {
    let formatted = to_pretty_json(schema)?;
    Ok(digest_bytes(formatted.as_bytes()))
}

fn digest_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Write the consolidated schema to `path`, creating parent directories.
/// Returns the digest of the bytes written.
pub fn write_consolidated_schema(schema: &Value, path: &Path) -> ConsolidationResult<String> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let formatted = to_pretty_json(schema)?;
    fs::write(path, &formatted)?;
    let digest = digest_bytes(formatted.as_bytes());

    info!(
        "Consolidated schema saved to: {} (sha256 {})",
        path.display(),
        digest
    );
    Ok(digest)
}
