// pii-anonymizer-core/src/recognizer.rs
//! Defines the `EntityRecognizer` trait.
//!
//! A recognizer looks at one annotated text and reports the PII spans it is
//! responsible for. The [`AnalyzerEngine`](crate::analyzer::AnalyzerEngine)
//! runs a list of recognizers behind this trait, so pattern, name and
//! gazetteer detection can be combined or replaced independently.
//!
//! License: MIT OR APACHE 2.0

use std::fmt::Debug;

use crate::errors::Result;
use crate::finding::Finding;
use crate::nlp::NlpArtifacts;

pub trait EntityRecognizer: Debug + Send + Sync {
    /// Stable name, recorded on every finding the recognizer produces.
    fn name(&self) -> &str;

    /// Entity labels this recognizer can emit.
    fn supported_entities(&self) -> Vec<String>;

    /// Whether the recognizer should run for texts in `language`.
    fn supports_language(&self, _language: &str) -> bool {
        true
    }

    /// Finds PII in the annotated text. Offsets are character offsets into
    /// `artifacts.text`.
    fn analyze(&self, artifacts: &NlpArtifacts<'_>) -> Result<Vec<Finding>>;
}
