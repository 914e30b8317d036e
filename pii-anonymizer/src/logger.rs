// pii-anonymizer/src/logger.rs
//! Logging setup for the CLI.
//!
//! Logs go to stderr so they never mix with anonymized output on stdout.
//! `RUST_LOG` is honored unless a level is forced from the command line.

use env_logger::{Builder, Env, Target};
use log::LevelFilter;
use std::io::Write;

/// Default filter when neither a flag nor `RUST_LOG` says otherwise.
pub const DEFAULT_FILTER: &str = "warn";

/// Installs the global logger. Calling it twice is harmless.
pub fn init_logger(level: Option<LevelFilter>) {
    let mut builder = Builder::from_env(Env::default().default_filter_or(DEFAULT_FILTER));
    if let Some(level) = level {
        builder.filter_level(level);
    }
    builder
        .target(Target::Stderr)
        .format(|buf, record| writeln!(buf, "[{}] {}: {}", record.level(), record.target(), record.args()));

    let _ = builder.try_init();
}

/// Maps the `--quiet`/`--debug` flags to a forced level.
pub fn level_from_flags(quiet: bool, debug: bool) -> Option<LevelFilter> {
    if quiet {
        Some(LevelFilter::Off)
    } else if debug {
        Some(LevelFilter::Debug)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_from_flags() {
        assert_eq!(level_from_flags(true, true), Some(LevelFilter::Off));
        assert_eq!(level_from_flags(false, true), Some(LevelFilter::Debug));
        assert_eq!(level_from_flags(false, false), None);
    }
}
