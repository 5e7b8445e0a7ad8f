//! Shared fixtures for the consolidation integration tests
//!
//! A fixture is a temporary schema directory populated with JSON documents.
#![allow(dead_code)]

use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub struct SchemaFixture {
    pub dir: TempDir,
}

impl SchemaFixture {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("Failed to create temp directory"),
        }
    }

    /// Fixture holding the given `(filename, document)` pairs
    pub fn with_documents(documents: &[(&str, Value)]) -> Self {
        let fixture = Self::new();
        for (name, document) in documents {
            fixture.write(name, document);
        }
        fixture
    }

    pub fn write(&self, name: &str, document: &Value) {
        let content =
            serde_json::to_string_pretty(document).expect("Failed to serialize fixture document");
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create fixture subdirectory");
        }
        fs::write(path, content).expect("Failed to write fixture document");
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Output location inside the fixture directory, outside the schema set
    pub fn output_path(&self) -> PathBuf {
        self.dir.path().join("out").join("consolidated.json")
    }
}

/// Every `$ref` marker in `value`
pub fn all_markers(value: &Value) -> Vec<String> {
    let mut markers = Vec::new();
    collect(value, &mut markers);
    markers
}

fn collect(value: &Value, markers: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(marker)) = map.get("$ref") {
                markers.push(marker.clone());
            }
            map.values().for_each(|v| collect(v, markers));
        }
        Value::Array(items) => items.iter().for_each(|v| collect(v, markers)),
        _ => {}
    }
}
