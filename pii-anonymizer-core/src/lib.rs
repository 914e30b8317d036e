// pii-anonymizer-core/src/lib.rs
//! # PII Anonymizer Core Library
//!
//! `pii-anonymizer-core` detects personally identifiable information in free
//! text and replaces each detected span with a placeholder such as
//! `<PERSON>` or `<EMAIL_ADDRESS>`, copying every other character through
//! unchanged.
//!
//! ## Modules
//!
//! * `models`: The registry of supported model identifiers and `AnonymizerConfig`.
//! * `provider`: Explicit provisioning of a model's language pack (cache, bundled, HTTP).
//! * `nlp`: Tokenization and byte/character offset mapping.
//! * `recognizer`: The `EntityRecognizer` trait.
//! * `recognizers`: Pattern, person-name and gazetteer recognizers.
//! * `config`: YAML pattern rules, loading, merging and validation.
//! * `validators`: Programmatic checks (Luhn, SSN, NINO, IPv4, IBAN).
//! * `analyzer`: `AnalyzerEngine`, which runs recognizers and scores findings.
//! * `redactor`: `RedactionEngine`, which resolves conflicts and substitutes placeholders.
//! * `anonymizer`: The `PiiAnonymizer` facade.
//! * `registry`: Shared per-model instances and the `anonymize_text` convenience call.
//! * `finding`: The `Finding` type and PII-safe debug logging.
//! * `errors`: Typed errors.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use pii_anonymizer_core::{anonymize_text, PiiAnonymizer, DEFAULT_MODEL};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // One-off call through the shared, per-model registry.
//!     let redacted = anonymize_text("Hello, my name is John Doe", DEFAULT_MODEL)?;
//!     println!("{}", redacted);
//!
//!     // Or own an instance directly.
//!     let anonymizer = PiiAnonymizer::new("de_core_news_sm")?;
//!     assert_eq!(anonymizer.language(), "de");
//!     println!("{}", anonymizer.anonymize("Mein Name ist Hans Müller.")?);
//!     Ok(())
//! }
//! ```
//!
//! ## Model Provisioning
//!
//! The small English and German packs are compiled in. Other models are read
//! from `PII_ANONYMIZER_MODELS_DIR` or fetched from `PII_ANONYMIZER_MODEL_URL`
//! on first use; `PII_ANONYMIZER_OFFLINE=true` disables fetching.
//!
//! ## Error Handling
//!
//! Library operations return [`AnonymizerError`], which wraps the more
//! specific [`ConfigError`] and [`ProvisionError`]. Rule file loading uses
//! `anyhow::Result` with context.
//!
//! ---
//! License: MIT OR APACHE 2.0

pub mod analyzer;
pub mod anonymizer;
pub mod config;
pub mod errors;
pub mod finding;
pub mod models;
pub mod nlp;
pub mod provider;
pub mod recognizer;
pub mod recognizers;
pub mod redactor;
pub mod registry;
pub mod validators;

/// Re-exports the facade and the shared-instance helpers.
pub use anonymizer::PiiAnonymizer;
pub use registry::{anonymize_text, default_registry, get_anonymizer, AnonymizerRegistry};

/// Re-exports model selection and provisioning.
pub use models::{
    language_code_from_identifier,
    AnonymizerConfig,
    ModelRegistry,
    ModelSize,
    ModelSpec,
    DEFAULT_MODEL,
};
pub use provider::{LanguagePack, ModelProvider, PackSource, ProviderSettings};

/// Re-exports the detection and redaction engines.
pub use analyzer::AnalyzerEngine;
pub use finding::{redact_sensitive, Finding};
pub use nlp::{NlpArtifacts, NlpPipeline};
pub use recognizer::EntityRecognizer;
pub use recognizers::gazetteer::GazetteerRecognizer;
pub use recognizers::pattern::PatternRecognizer;
pub use recognizers::person::PersonRecognizer;
pub use redactor::{placeholder, AnonymizedText, RedactionEngine, ReplacedItem};

/// Re-exports the rule configuration types.
pub use config::{merge_rules, RecognizerConfig, RecognizerRule, RuleConfigNotFoundError, Validation, MAX_PATTERN_LENGTH};
pub use recognizers::compiler::{compile_rules, CompiledRule, CompiledRules};

/// Re-exports the error types.
pub use errors::{AnonymizerError, ConfigError, ProvisionError};
