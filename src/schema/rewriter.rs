//! Points internal references at the namespaced entries of the merged
//! definition table.

use super::reference::{namespaced_definition_ref, ref_marker, SchemaRef, REF_KEY};
use serde_json::Value;

/// Rewrite a marker authored in `filename` if it is internal to that document.
///
/// `#/definitions/<name>` (or `<filename>#/definitions/<name>`) becomes
/// `#/definitions/<stem>_<name>`. Other pointers, including self-references
/// outside `definitions`, are left alone.
pub fn namespace_marker(marker: &str, filename: &str) -> Option<String> {
    let reference = SchemaRef::parse(marker);
    if !reference.is_internal_to(filename) {
        return None;
    }
    reference
        .definition_name()
        .map(|name| namespaced_definition_ref(filename, &name))
}

/// Copy of a reference node with its marker replaced; sibling keys are kept.
pub fn with_marker(node: &Value, marker: String) -> Value {
    let mut node = node.clone();
    if let Value::Object(map) = &mut node {
        map.insert(REF_KEY.to_string(), Value::String(marker));
    }
    node
}

/// Rewrite every internal definition reference in `node` as authored by
/// `filename`. Reference nodes are not descended into.
pub fn rewrite_local_refs(node: &Value, filename: &str) -> Value {
    match node {
        Value::Object(map) => {
            if let Some(marker) = ref_marker(node) {
                return match namespace_marker(marker, filename) {
                    Some(rewritten) => with_marker(node, rewritten),
                    None => node.clone(),
                };
            }
            Value::Object(
                map.iter()
                    .map(|(key, value)| (key.clone(), rewrite_local_refs(value, filename)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| rewrite_local_refs(item, filename))
                .collect(),
        ),
        scalar => scalar.clone(),
    }
}
