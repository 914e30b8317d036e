//! errors.rs - Custom error types for the pii-anonymizer-core library.
//!
//! Configuration and provisioning failures get their own enums so callers can
//! tell "this model identifier is wrong" apart from "the model could not be
//! made available". Everything else is folded into [`AnonymizerError`].
//!
//! License: MIT OR APACHE 2.0

use std::path::PathBuf;
use thiserror::Error;

/// Rejected model selections.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Model identifier is empty")]
    EmptyIdentifier,

    #[error("Unsupported model '{model}'. Supported models: {supported}")]
    UnsupportedModel { model: String, supported: String },

    #[error("No baseline model is registered for language '{0}'")]
    UnsupportedLanguage(String),
}

/// Failures while making a model's language pack available locally.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ProvisionError {
    #[error("Model '{model}' is not available locally and no download URL is configured (set PII_ANONYMIZER_MODEL_URL)")]
    NoDownloadSource { model: String },

    #[error("Model '{model}' is not available locally and downloads are disabled (offline mode)")]
    Offline { model: String },

    #[error("Failed to download model '{model}' from {url}: {source}")]
    Download {
        model: String,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Download of model '{model}' from {url} returned HTTP {status}")]
    HttpStatus { model: String, url: String, status: u16 },

    #[error("I/O error while provisioning model '{model}' at {}: {source}", path.display())]
    Io {
        model: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Language pack for model '{model}' is malformed: {reason}")]
    Malformed { model: String, reason: String },

    #[error("Language pack mismatch: expected model '{expected}', found '{found}'")]
    Mismatch { expected: String, found: String },
}

/// This enum represents all possible error types in the `pii-anonymizer-core` library.
///
/// By using `#[non_exhaustive]`, we signal to consumers of this library that
/// new variants may be added in future versions.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AnonymizerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Provision(#[from] ProvisionError),

    #[error("Failed to compile recognizer rule '{0}': {1}")]
    RuleCompilationError(String, regex::Error),

    #[error("Rule '{0}': pattern length ({1}) exceeds maximum allowed ({2})")]
    PatternLengthExceeded(String, usize, usize),

    #[error("Failed to build gazetteer '{0}': {1}")]
    GazetteerBuild(String, String),

    #[error("Finding {entity_type} [{start}..{end}] is outside the text ({len} chars)")]
    InvalidFinding {
        entity_type: String,
        start: usize,
        end: usize,
        len: usize,
    },

    #[error("Analyzer is bound to language '{bound}' but '{requested}' was requested")]
    LanguageMismatch { bound: String, requested: String },

    #[error("A critical system error occurred: {0}")]
    AnyhowWrapper(#[from] anyhow::Error),

    #[error("A fatal error occurred: {0}")]
    Fatal(String),
}

/// Convenience alias used throughout the core crate.
pub type Result<T, E = AnonymizerError> = std::result::Result<T, E>;
