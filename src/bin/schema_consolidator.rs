use clap::{Parser, ValueEnum};
use log::{error, info, warn};
use schema_consolidator::schema::write_consolidated_schema;
use schema_consolidator::{
    logging, CollisionPolicy, ConsolidatorConfig, ExternalValidator, HarvestScope, RewriteMode,
    SchemaConsolidator,
};
use std::path::PathBuf;
use std::process::ExitCode;

/// Exit status when `--strict-validation` is set and the validator rejects
/// the consolidated schema or cannot be run
const VALIDATION_FAILED: u8 = 2;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML configuration file (defaults to $SCHEMA_CONSOLIDATOR_CONFIG)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding the schema documents
    #[arg(short, long)]
    schema_dir: Option<PathBuf>,

    /// Root schema filename inside the schema directory
    #[arg(short, long)]
    root: Option<String>,

    /// Path of the consolidated schema to write
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Which documents contribute their definitions
    #[arg(long, value_enum)]
    harvest: Option<CliHarvestScope>,

    /// How root definitions colliding with harvested ones are settled
    #[arg(long, value_enum)]
    collision: Option<CliCollisionPolicy>,

    /// How internal references are namespaced
    #[arg(long, value_enum)]
    rewrite: Option<CliRewriteMode>,

    /// Program run against the written schema, with the output path appended
    #[arg(long, value_name = "PROGRAM")]
    validate_with: Option<String>,

    /// Argument passed to the validator before the output path (repeatable)
    #[arg(long = "validator-arg", value_name = "ARG", allow_hyphen_values = true)]
    validator_args: Vec<String>,

    /// Exit with status 2 when the validator rejects the schema or fails to run
    #[arg(long, requires = "validate_with")]
    strict_validation: bool,

    /// Log every added definition and inlined reference
    #[arg(short, long)]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliHarvestScope {
    /// Every *.json file in the schema directory
    All,
    /// Only documents reached from the root
    Reachable,
}

impl From<CliHarvestScope> for HarvestScope {
    fn from(scope: CliHarvestScope) -> Self {
        match scope {
            CliHarvestScope::All => HarvestScope::All,
            CliHarvestScope::Reachable => HarvestScope::Reachable,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliCollisionPolicy {
    /// Harvested definitions overwrite root definitions
    LibraryWins,
    /// Root definitions are kept
    RootWins,
    /// Fail the run on any collision
    Reject,
}

impl From<CliCollisionPolicy> for CollisionPolicy {
    fn from(policy: CliCollisionPolicy) -> Self {
        match policy {
            CliCollisionPolicy::LibraryWins => CollisionPolicy::LibraryWins,
            CliCollisionPolicy::RootWins => CollisionPolicy::RootWins,
            CliCollisionPolicy::Reject => CollisionPolicy::Reject,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliRewriteMode {
    /// Namespace by the document that authored each reference
    Provenance,
    /// Namespace by the document at the rewrite call site
    CallSite,
}

impl From<CliRewriteMode> for RewriteMode {
    fn from(mode: CliRewriteMode) -> Self {
        match mode {
            CliRewriteMode::Provenance => RewriteMode::Provenance,
            CliRewriteMode::CallSite => RewriteMode::CallSite,
        }
    }
}

fn build_config(cli: &Cli) -> Result<ConsolidatorConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => ConsolidatorConfig::load_from_file(path)?,
        None => ConsolidatorConfig::load_from_env()?,
    };

    if let Some(dir) = &cli.schema_dir {
        config.schema_dir = dir.clone();
    }
    if let Some(root) = &cli.root {
        config.root = root.clone();
    }
    if let Some(output) = &cli.output {
        config.output = output.clone();
    }
    if let Some(scope) = cli.harvest {
        config.harvest_scope = scope.into();
    }
    if let Some(policy) = cli.collision {
        config.collision_policy = policy.into();
    }
    if let Some(mode) = cli.rewrite {
        config.rewrite_mode = mode.into();
    }

    config.validate()?;
    Ok(config)
}

fn run(cli: Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let config = build_config(&cli)?;
    let output = config.output.clone();

    let consolidation = SchemaConsolidator::new(config).consolidate()?;
    write_consolidated_schema(&consolidation.schema, &output)?;

    let report = &consolidation.report;
    info!(
        "Total definitions consolidated: {} ({} documents loaded, {} cycles broken)",
        report.definitions, report.documents_loaded, report.cycles_broken
    );

    if let Some(program) = &cli.validate_with {
        let validator = ExternalValidator::new(program.as_str())
            .with_args(cli.validator_args.iter().cloned());
        let verdict = match validator.validate(&output) {
            Ok(verdict) => verdict,
            Err(e) if cli.strict_validation => {
                error!("{}", e);
                return Ok(ExitCode::from(VALIDATION_FAILED));
            }
            Err(e) => {
                warn!("{}; consolidated schema left unvalidated", e);
                return Ok(ExitCode::SUCCESS);
            }
        };
        if !verdict.logs.trim().is_empty() {
            info!("Validator output:\n{}", verdict.logs.trim_end());
        }
        if !verdict.success && cli.strict_validation {
            error!("Consolidated schema rejected by {}", validator.program());
            return Ok(ExitCode::from(VALIDATION_FAILED));
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(logging::level_for(cli.verbose, cli.quiet)).ok();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error during consolidation: {}", e);
            ExitCode::FAILURE
        }
    }
}
