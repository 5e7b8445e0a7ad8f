pub mod consolidator;
pub mod definitions;
pub mod file_operations;
mod harvester;
pub mod reference;
mod resolver;
pub mod rewriter;
pub mod store;

pub use consolidator::{consolidate_directory, Consolidation, ConsolidationReport, SchemaConsolidator};
pub use definitions::{DefinitionTable, MergeOutcome};
pub use file_operations::{content_digest, write_consolidated_schema};
pub use reference::SchemaRef;
pub use store::DocumentStore;
