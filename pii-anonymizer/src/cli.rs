// pii-anonymizer/src/cli.rs
//! This file defines the command-line interface (CLI) for the pii-anonymizer
//! application.
//! License: MIT OR APACHE 2.0

use clap::error::ErrorKind;
use clap::parser::ValueSource;
use clap::{CommandFactory, FromArgMatches, Parser};
use std::ffi::OsString;
use std::path::PathBuf;

use pii_anonymizer_core::DEFAULT_MODEL;

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(
    name = "pii-anonymizer",
    version = env!("CARGO_PKG_VERSION"),
    about = "Redact personally identifiable information from text",
    long_about = "pii-anonymizer reads text from a file or stdin, replaces names, locations, email addresses, phone numbers and other personally identifiable information with placeholders such as <PERSON>, and writes the result to a file or stdout. Everything that is not PII is copied through unchanged."
)]
pub struct Cli {
    /// Model identifier selecting the language pack.
    #[arg(
        long,
        short = 'm',
        value_name = "MODEL",
        env = "PII_ANONYMIZER_MODEL",
        default_value = DEFAULT_MODEL,
        help = "Model to use, e.g. en_core_web_sm or de_core_news_sm."
    )]
    pub model: String,

    /// Language code; selects that language's small model. Takes precedence
    /// over a model set through `PII_ANONYMIZER_MODEL`, but cannot be combined
    /// with `--model` on the command line.
    #[arg(
        long,
        short = 'l',
        value_name = "CODE",
        help = "Language code (en, de, es, fr, nl); selects that language's small model."
    )]
    pub language: Option<String>,

    /// Path to an input file (reads from stdin if not provided).
    #[arg(long, short = 'i', value_name = "FILE", help = "Read input from a specified file instead of stdin.")]
    pub input: Option<PathBuf>,

    /// Write anonymized output to this file instead of stdout.
    #[arg(long, short = 'o', value_name = "FILE", help = "Write output to a specified file instead of stdout.")]
    pub output: Option<PathBuf>,

    /// Path to a YAML file with additional or overriding pattern rules.
    #[arg(long = "rules", value_name = "FILE", help = "Merge pattern rules from a YAML file over the built-in ones.")]
    pub rules: Option<PathBuf>,

    /// List the supported model identifiers and exit.
    #[arg(long = "list-models", help = "List the supported models and exit.")]
    pub list_models: bool,

    /// Disable informational messages
    #[arg(long, short = 'q', conflicts_with = "debug", help = "Suppress all informational and debug messages.")]
    pub quiet: bool,

    /// Enable debug logging (overrides RUST_LOG)
    #[arg(long, short = 'd', help = "Enable debug logging.")]
    pub debug: bool,
}

impl Cli {
    /// Parses `std::env::args_os()`, exiting with a usage error on failure.
    pub fn parse_args() -> Self {
        Self::try_parse_args_from(std::env::args_os()).unwrap_or_else(|e| e.exit())
    }

    /// Parses `args`. `--language` together with a `--model` given on the
    /// command line is an argument conflict; a model coming from the
    /// environment or the default simply loses to the language.
    pub fn try_parse_args_from<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let mut cmd = Self::command();
        let matches = cmd.try_get_matches_from_mut(args)?;
        let cli = Self::from_arg_matches(&matches).map_err(|e| e.format(&mut cmd))?;

        if cli.language.is_some() && matches.value_source("model") == Some(ValueSource::CommandLine) {
            return Err(cmd.error(
                ErrorKind::ArgumentConflict,
                "the argument '--language <CODE>' cannot be used with '--model <MODEL>'",
            ));
        }
        Ok(cli)
    }

    /// The identifier to resolve: the language code when given, else the model.
    pub fn model_selector(&self) -> &str {
        self.language.as_deref().unwrap_or(&self.model)
    }
}
