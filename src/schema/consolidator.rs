use super::definitions::{DefinitionTable, MergeOutcome};
use super::reference::external_markers;
use super::rewriter::rewrite_local_refs;
use super::store::DocumentStore;
use crate::config::{ConsolidatorConfig, HarvestScope, RewriteMode};
use crate::error::ConsolidationResult;
use log::{info, warn};
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;

/// Counters collected over one consolidation run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsolidationReport {
    pub root: String,
    pub documents_loaded: usize,
    pub definitions: usize,
    pub references_inlined: usize,
    /// External references left in place because their target was missing
    pub unresolved_references: usize,
    pub cycles_broken: usize,
    pub merge: MergeOutcome,
    /// Markers in the output that still carry a filename component
    pub residual_external_refs: Vec<String>,
}

/// Output of a successful run
#[derive(Debug, Clone)]
pub struct Consolidation {
    pub schema: Value,
    pub report: ConsolidationReport,
}

/// Context of a single consolidation run.
///
/// Owns the document cache, the definition table and the bookkeeping the
/// resolver and harvester share. A consolidator is consumed by
/// [`consolidate`](Self::consolidate), so no state outlives its run.
pub struct SchemaConsolidator {
    pub(super) config: ConsolidatorConfig,
    pub(super) store: DocumentStore,
    pub(super) definitions: DefinitionTable,
    /// Documents whose definitions were already harvested this run
    pub(super) harvested: HashSet<String>,
    /// `(file, pointer)` frames currently being inlined
    pub(super) resolving: Vec<(String, String)>,
    pub(super) report: ConsolidationReport,
}

impl SchemaConsolidator {
    pub fn new(config: ConsolidatorConfig) -> Self {
        let store = DocumentStore::new(config.schema_dir.clone());
        let report = ConsolidationReport {
            root: config.root.clone(),
            ..ConsolidationReport::default()
        };
        Self {
            config,
            store,
            definitions: DefinitionTable::new(),
            harvested: HashSet::new(),
            resolving: Vec::new(),
            report,
        }
    }

    pub fn config(&self) -> &ConsolidatorConfig {
        &self.config
    }

    /// Run the three passes and assemble the consolidated schema.
    ///
    /// Fails only when the configuration is invalid, the root document cannot
    /// be loaded, the schema directory cannot be listed, or a definition
    /// collides under [`CollisionPolicy::Reject`](crate::CollisionPolicy::Reject).
    pub fn consolidate(mut self) -> ConsolidationResult<Consolidation> {
        self.config.validate()?;
        let root = self.config.root.clone();
        info!(
            "Starting consolidation from {} in {}",
            root,
            self.store.schema_dir().display()
        );

        let root_document = self.store.load_root(&root)?;

        match self.config.harvest_scope {
            HarvestScope::All => {
                info!("Collecting definitions from all schemas");
                for filename in self.store.list_documents()? {
                    let document = self.store.load(&filename);
                    self.harvest(&document, &filename);
                }
            }
            HarvestScope::Reachable => {
                info!("Collecting definitions from the root schema only");
                self.harvest(&root_document, &root);
            }
        }

        info!("Resolving external references");
        let resolved = self.resolve_external_refs(&root_document, &root);

        let mut schema = match self.config.rewrite_mode {
            RewriteMode::CallSite => {
                info!("Updating internal references");
                rewrite_local_refs(&resolved, &root)
            }
            // Internal references were namespaced by their authoring document
            // while being resolved
            RewriteMode::Provenance => resolved,
        };

        let merge = self
            .definitions
            .merge_into(&mut schema, self.config.collision_policy)?;

        self.report.documents_loaded = self.store.loaded_count();
        self.report.definitions = self.definitions.len();
        self.report.merge = merge;
        self.report.residual_external_refs = external_markers(&schema);

        for marker in &self.report.residual_external_refs {
            warn!("Unresolved external reference remains in output: {}", marker);
        }
        info!(
            "Consolidation complete: {} definitions, {} references inlined, {} unresolved",
            self.report.definitions,
            self.report.references_inlined,
            self.report.unresolved_references
        );

        Ok(Consolidation {
            schema,
            report: self.report,
        })
    }
}

/// Consolidate `root` inside `schema_dir` with default settings
pub fn consolidate_directory<P: AsRef<Path>>(
    schema_dir: P,
    root: &str,
) -> ConsolidationResult<Consolidation> {
    SchemaConsolidator::new(ConsolidatorConfig::for_directory(
        schema_dir.as_ref(),
        root,
    ))
    .consolidate()
}
