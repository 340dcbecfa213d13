use std::io::Write;

use crate::config::Environment;

const LOG_PREFIX: &str = "[VoiceIQ]";

/// Log level for an environment: Debug in development, Info in production
pub fn level_for(environment: Environment) -> log::LevelFilter {
    if environment.is_production() {
        log::LevelFilter::Info
    } else {
        log::LevelFilter::Debug
    }
}

/// Creates the logger builder for the application
///
/// Every line is prefixed with `[VoiceIQ]`. `RUST_LOG`, when set, overrides
/// the environment's default level.
pub fn create_builder(environment: Environment) -> env_logger::Builder {
    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(level_for(environment))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} {:<5} {}",
                LOG_PREFIX,
                record.level(),
                record.args()
            )
        })
        .parse_default_env();
    builder
}

/// Install the logger. Safe to call more than once; later calls are ignored.
pub fn init(environment: Environment) {
    if create_builder(environment).try_init().is_err() {
        log::debug!("Logger already initialized");
    }
}
