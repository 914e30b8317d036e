// pii-anonymizer/src/main.rs
//! pii-anonymizer entry point.
//!
//! Parses arguments, sets up logging and runs the anonymize command. Errors
//! are printed once to stderr and turned into exit code 1; argument errors
//! exit with clap's code 2.

use std::process::ExitCode;

use pii_anonymizer::cli::Cli;
use pii_anonymizer::commands::anonymize::{self, AnonymizeOptions};
use pii_anonymizer::logger;
use pii_anonymizer::ui::output_format::error_msg;
use pii_anonymizer_core::default_registry;

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse_args();
    logger::init_logger(logger::level_from_flags(cli.quiet, cli.debug));

    let registry = default_registry();
    let result = if cli.list_models {
        anonymize::list_models(registry.provider())
    } else {
        anonymize::run(&AnonymizeOptions::from(&cli), registry)
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error_msg(format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}
