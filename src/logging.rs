use log::LevelFilter;
use std::io::Write;

/// Install the stderr logger used by the command line tool.
///
/// `RUST_LOG` takes precedence over `level` when set. Calling this more
/// than once is harmless: the first logger stays installed.
pub fn init(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(level)
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .format(|buf, record| writeln!(buf, "{} - {}", record.level(), record.args()));
    builder.try_init()
}

/// Map the CLI verbosity flags onto a level filter
pub fn level_for(verbose: bool, quiet: bool) -> LevelFilter {
    match (verbose, quiet) {
        (true, _) => LevelFilter::Debug,
        (false, true) => LevelFilter::Warn,
        (false, false) => LevelFilter::Info,
    }
}
