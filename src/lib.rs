//! JSON Schema consolidation.
//!
//! Takes a directory of JSON Schema documents that point at each other
//! through `$ref` markers and produces one self-contained document: every
//! cross-file reference is inlined and every document's `definitions` block
//! is merged under `<document-stem>_<name>` keys.

pub mod config;
pub mod error;
pub mod logging;
pub mod schema;
pub mod validator;

pub use config::{CollisionPolicy, ConsolidatorConfig, HarvestScope, RewriteMode};
pub use error::{ConsolidationError, ConsolidationResult};
pub use schema::{
    consolidate_directory, Consolidation, ConsolidationReport, DefinitionTable, DocumentStore,
    SchemaConsolidator, SchemaRef,
};
pub use validator::{ExternalValidator, ValidationReport};
