use super::consolidator::SchemaConsolidator;
use super::reference::{
    namespaced_definition_ref, navigate, pointer_segments, ref_marker, SchemaRef,
};
use super::rewriter::{namespace_marker, with_marker};
use crate::config::RewriteMode;
use log::{debug, warn};
use serde_json::Value;

impl SchemaConsolidator {
    /// Replace every external reference in `node` with the content it points
    /// at. `origin` is the document `node` was authored in.
    ///
    /// References that cannot be followed are returned unchanged and logged;
    /// the run carries on.
    pub(crate) fn resolve_external_refs(&mut self, node: &Value, origin: &str) -> Value {
        match node {
            Value::Object(map) => match ref_marker(node) {
                Some(marker) => self.resolve_reference(node, marker, origin),
                None => Value::Object(
                    map.iter()
                        .map(|(key, value)| (key.clone(), self.resolve_external_refs(value, origin)))
                        .collect(),
                ),
            },
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|item| self.resolve_external_refs(item, origin))
                    .collect(),
            ),
            scalar => scalar.clone(),
        }
    }

    fn resolve_reference(&mut self, node: &Value, marker: &str, origin: &str) -> Value {
        let reference = SchemaRef::parse(marker);
        if reference.is_internal_to(origin) {
            if reference.file().is_some() && reference.definition_name().is_none() {
                // Only definitions survive under a namespaced key
                warn!(
                    "Self-reference {} in {} does not address a definition; left unresolved",
                    marker, origin
                );
                self.report.unresolved_references += 1;
                return node.clone();
            }
            return match self.config.rewrite_mode {
                RewriteMode::Provenance => match namespace_marker(marker, origin) {
                    Some(rewritten) => with_marker(node, rewritten),
                    None => node.clone(),
                },
                RewriteMode::CallSite => node.clone(),
            };
        }

        let definition = reference.definition_name();
        let SchemaRef::External { file, pointer } = reference else {
            return node.clone();
        };

        let frame = (file.clone(), pointer.clone());
        if self.resolving.contains(&frame) {
            return self.break_cycle(node, marker, &file, definition.as_deref());
        }

        let document = self.store.load(&file);
        if self.store.is_missing(&file) {
            // The store has already warned about the file itself
            debug!(
                "Reference {} in {} points at unavailable schema {}",
                marker, origin, file
            );
            self.report.unresolved_references += 1;
            return node.clone();
        }
        if document.as_object().is_some_and(|map| map.is_empty()) {
            warn!(
                "Reference {} in {} points at empty schema {}",
                marker, origin, file
            );
            self.report.unresolved_references += 1;
            return node.clone();
        }

        let Some(target) = navigate(&document, &pointer_segments(&pointer)) else {
            warn!(
                "Path {} not found in {} (referenced from {})",
                pointer, file, origin
            );
            self.report.unresolved_references += 1;
            return node.clone();
        };

        debug!("Inlining {} into {}", marker, origin);
        self.resolving.push(frame);
        let resolved = self.resolve_external_refs(target, &file);
        self.resolving.pop();
        self.report.references_inlined += 1;

        // The whole target document contributes its definitions, not only the
        // fragment that was inlined
        self.harvest(&document, &file);

        resolved
    }

    /// A reference back into a frame that is still being inlined cannot be
    /// expanded. Definitions are reachable through the merged table instead.
    fn break_cycle(
        &mut self,
        node: &Value,
        marker: &str,
        file: &str,
        definition: Option<&str>,
    ) -> Value {
        self.report.cycles_broken += 1;
        match (definition, self.config.rewrite_mode) {
            (Some(name), RewriteMode::Provenance) => {
                let local = namespaced_definition_ref(file, name);
                warn!("Reference cycle through {}; pointing at {}", marker, local);
                with_marker(node, local)
            }
            _ => {
                warn!("Reference cycle through {}; left unresolved", marker);
                node.clone()
            }
        }
    }
}
