use crate::error::{ConsolidationError, ConsolidationResult};
use log::{info, warn};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Why a document could not be read
#[derive(Debug, Clone, PartialEq, Eq)]
enum LoadFailure {
    NotFound,
    Unreadable(String),
    Unparsable(String),
}

/// Parsed schema documents of one directory, memoized by filename.
///
/// Documents that cannot be read are cached as empty objects so that every
/// reference into them degrades the same way and the warning is logged once.
pub struct DocumentStore {
    schema_dir: PathBuf,
    documents: HashMap<String, Rc<Value>>,
    failures: HashMap<String, LoadFailure>,
}

impl DocumentStore {
    pub fn new<P: Into<PathBuf>>(schema_dir: P) -> Self {
        Self {
            schema_dir: schema_dir.into(),
            documents: HashMap::new(),
            failures: HashMap::new(),
        }
    }

    pub fn schema_dir(&self) -> &Path {
        &self.schema_dir
    }

    /// Load a document, reading it from disk on first use only.
    pub fn load(&mut self, filename: &str) -> Rc<Value> {
        if let Some(document) = self.documents.get(filename) {
            return Rc::clone(document);
        }

        let document = match self.read_document(filename) {
            Ok(value) => {
                info!("Loaded schema: {}", filename);
                value
            }
            Err(failure) => {
                match &failure {
                    LoadFailure::NotFound => {
                        warn!("Schema file not found: {}", filename)
                    }
                    LoadFailure::Unreadable(reason) => {
                        warn!("Schema file {} could not be read: {}", filename, reason)
                    }
                    LoadFailure::Unparsable(reason) => {
                        warn!("Schema file {} is not valid JSON: {}", filename, reason)
                    }
                }
                self.failures.insert(filename.to_string(), failure);
                Value::Object(Map::new())
            }
        };

        let document = Rc::new(document);
        self.documents
            .insert(filename.to_string(), Rc::clone(&document));
        document
    }

    /// Load the root document. Unlike [`load`](Self::load) any failure is
    /// fatal, and the root must be a JSON object.
    pub fn load_root(&mut self, filename: &str) -> ConsolidationResult<Rc<Value>> {
        let document = self.load(filename);
        if let Some(failure) = self.failures.get(filename) {
            let reason = match failure {
                LoadFailure::NotFound => format!(
                    "file not found in {}",
                    self.schema_dir.display()
                ),
                LoadFailure::Unreadable(reason) => reason.clone(),
                LoadFailure::Unparsable(reason) => format!("invalid JSON: {}", reason),
            };
            return Err(ConsolidationError::root_not_loadable(filename, reason));
        }
        if !document.is_object() {
            return Err(ConsolidationError::root_not_loadable(
                filename,
                "root schema is not a JSON object",
            ));
        }
        Ok(document)
    }

    /// Every `*.json` filename in the schema directory, sorted
    pub fn list_documents(&self) -> ConsolidationResult<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.schema_dir)? {
            let path = entry?.path();
            if !path.is_file() || path.extension().map(|e| e != "json").unwrap_or(true) {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Whether `filename` was requested and could not be loaded
    pub fn is_missing(&self, filename: &str) -> bool {
        self.failures.contains_key(filename)
    }

    /// Number of documents successfully parsed so far
    pub fn loaded_count(&self) -> usize {
        self.documents.len() - self.failures.len()
    }

    fn read_document(&self, filename: &str) -> Result<Value, LoadFailure> {
        let path = self.schema_dir.join(filename);
        let content = fs::read_to_string(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                LoadFailure::NotFound
            } else {
                LoadFailure::Unreadable(e.to_string())
            }
        })?;
        serde_json::from_str(&content).map_err(|e| LoadFailure::Unparsable(e.to_string()))
    }
}
