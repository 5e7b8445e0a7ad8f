//! `$ref` marker parsing and pointer navigation

use serde_json::Value;

/// Field holding a reference marker
pub const REF_KEY: &str = "$ref";

/// Field holding a document's reusable definitions
pub const DEFINITIONS_KEY: &str = "definitions";

const DEFINITIONS_PREFIX: &str = "/definitions/";

/// A parsed reference marker.
///
/// `"common.json#/definitions/metadata"` is external with a pointer,
/// `"common.json"` is external without one and `"#/definitions/metadata"`
/// is local.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaRef {
    Local { pointer: String },
    External { file: String, pointer: String },
}

impl SchemaRef {
    /// Parse a marker, splitting on the first `#`
    pub fn parse(marker: &str) -> Self {
        let (file, pointer) = match marker.split_once('#') {
            Some((file, pointer)) => (file, pointer),
            None => (marker, ""),
        };
        if file.is_empty() {
            SchemaRef::Local {
                pointer: pointer.to_string(),
            }
        } else {
            SchemaRef::External {
                file: file.to_string(),
                pointer: pointer.to_string(),
            }
        }
    }

    pub fn pointer(&self) -> &str {
        match self {
            SchemaRef::Local { pointer } | SchemaRef::External { pointer, .. } => pointer,
        }
    }

    pub fn file(&self) -> Option<&str> {
        match self {
            SchemaRef::Local { .. } => None,
            SchemaRef::External { file, .. } => Some(file),
        }
    }

    /// Local markers and markers naming `origin` itself both point inside
    /// the document being processed.
    pub fn is_internal_to(&self, origin: &str) -> bool {
        match self {
            SchemaRef::Local { .. } => true,
            SchemaRef::External { file, .. } => file == origin,
        }
    }

    /// Unescaped definition name for `#/definitions/<name>` pointers
    pub fn definition_name(&self) -> Option<String> {
        self.pointer()
            .strip_prefix(DEFINITIONS_PREFIX)
            .filter(|name| !name.is_empty())
            .map(unescape_segment)
    }
}

/// Read the reference marker of a node, if it is an object carrying one
pub fn ref_marker(node: &Value) -> Option<&str> {
    node.as_object()?.get(REF_KEY)?.as_str()
}

/// Split a pointer into unescaped path segments. `""` and `"/"` address the
/// whole document.
pub fn pointer_segments(pointer: &str) -> Vec<String> {
    let trimmed = pointer.trim_matches('/');
    if trimmed.is_empty() {
        return Vec::new();
    }
    trimmed
        .split('/')
        .map(unescape_segment)
        .collect()
}

fn unescape_segment(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}

fn escape_segment(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

/// Walk `segments` from `document`, indexing object keys or array positions.
/// Returns `None` at the first segment that is absent.
pub fn navigate<'a>(document: &'a Value, segments: &[String]) -> Option<&'a Value> {
    segments
        .iter()
        .try_fold(document, |target, segment| match target {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
}

/// Filename with its final extension removed. Directory components are
/// kept, so `sub/a.json` and `a.json` get distinct stems.
pub fn document_stem(filename: &str) -> &str {
    let name_start = filename.rfind('/').map(|i| i + 1).unwrap_or(0);
    match filename[name_start..].rfind('.') {
        Some(dot) if dot > 0 => &filename[..name_start + dot],
        _ => filename,
    }
}

/// Globally unique definition table key for `name` declared in `filename`
pub fn namespaced_key(filename: &str, name: &str) -> String {
    format!("{}_{}", document_stem(filename), name)
}

/// Local marker addressing a namespaced entry of the merged definitions
pub fn namespaced_definition_ref(filename: &str, name: &str) -> String {
    format!(
        "#{}{}",
        DEFINITIONS_PREFIX,
        escape_segment(&namespaced_key(filename, name))
    )
}

/// Every reference marker in `node` that still names a file
pub fn external_markers(node: &Value) -> Vec<String> {
    let mut found = Vec::new();
    collect_external_markers(node, &mut found);
    found
}

fn collect_external_markers(node: &Value, found: &mut Vec<String>) {
    match node {
        Value::Object(map) => {
            if let Some(marker) = ref_marker(node) {
                if SchemaRef::parse(marker).file().is_some() {
                    found.push(marker.to_string());
                }
            }
            for value in map.values() {
                collect_external_markers(value, found);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_external_markers(item, found);
            }
        }
        _ => {}
    }
}
