use super::consolidator::SchemaConsolidator;
use super::reference::DEFINITIONS_KEY;
use super::rewriter::rewrite_local_refs;
use crate::config::RewriteMode;
use log::{debug, warn};
use serde_json::Value;

impl SchemaConsolidator {
    /// Add every entry of `document["definitions"]` to the definition table
    /// under `<stem of filename>_<name>`, with external references resolved
    /// and internal ones namespaced.
    ///
    /// A document is harvested at most once per run. It is marked before its
    /// entries are processed so documents whose definitions reference each
    /// other terminate.
    pub(crate) fn harvest(&mut self, document: &Value, filename: &str) {
        if !self.harvested.insert(filename.to_string()) {
            return;
        }
        let entries = match document.get(DEFINITIONS_KEY) {
            Some(Value::Object(entries)) => entries,
            Some(_) => {
                warn!("'{}' in {} is not an object; skipped", DEFINITIONS_KEY, filename);
                return;
            }
            None => return,
        };
        debug!("Harvesting {} definitions from {}", entries.len(), filename);

        // Each definition is resolved on its own, not as part of whatever
        // chain triggered this harvest
        let outer_frames = std::mem::take(&mut self.resolving);
        for (name, value) in entries {
            let resolved = self.resolve_external_refs(value, filename);
            let value = match self.config.rewrite_mode {
                RewriteMode::CallSite => rewrite_local_refs(&resolved, filename),
                RewriteMode::Provenance => resolved,
            };
            self.definitions.insert(filename, name, value);
        }
        self.resolving = outer_frames;
    }
}
