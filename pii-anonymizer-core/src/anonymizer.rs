// pii-anonymizer-core/src/anonymizer.rs
//! The `PiiAnonymizer` facade: one analyzer and one redaction engine bound to
//! a single model and its language.
//!
//! License: MIT OR APACHE 2.0

use log::{debug, info};
use std::sync::Arc;

use crate::analyzer::AnalyzerEngine;
use crate::errors::{AnonymizerError, ProvisionError, Result};
use crate::finding::Finding;
use crate::models::AnonymizerConfig;
use crate::nlp::NlpPipeline;
use crate::provider::ModelProvider;
use crate::redactor::{AnonymizedText, RedactionEngine};

/// Detects and redacts PII for one model. Immutable once built, so a single
/// instance can be shared across threads behind an `Arc`.
#[derive(Debug)]
pub struct PiiAnonymizer {
    config: AnonymizerConfig,
    analyzer: AnalyzerEngine,
    redactor: RedactionEngine,
}

impl PiiAnonymizer {
    /// Resolves `model`, provisions it through a provider configured from the
    /// environment and builds the engines.
    pub fn new(model: &str) -> Result<Self> {
        let config = AnonymizerConfig::new(model)?;
        Self::with_provider(config, &ModelProvider::from_env())
    }

    pub fn with_provider(config: AnonymizerConfig, provider: &ModelProvider) -> Result<Self> {
        let pipeline = provider.load(config.spec())?;
        Self::from_pipeline(config, pipeline)
    }

    /// Builds from an already provisioned pipeline.
    pub fn from_pipeline(config: AnonymizerConfig, pipeline: NlpPipeline) -> Result<Self> {
        if pipeline.model() != config.model() {
            return Err(ProvisionError::Mismatch {
                expected: config.model().to_string(),
                found: pipeline.model().to_string(),
            }
            .into());
        }
        let analyzer = AnalyzerEngine::new(Arc::new(pipeline))?;
        Self::from_analyzer(config, analyzer)
    }

    /// Builds around a caller-assembled analyzer, for custom rules or
    /// recognizers.
    pub fn from_analyzer(config: AnonymizerConfig, analyzer: AnalyzerEngine) -> Result<Self> {
        if analyzer.language() != config.language() {
            return Err(AnonymizerError::LanguageMismatch {
                bound: config.language().to_string(),
                requested: analyzer.language().to_string(),
            });
        }
        info!("Anonymizer ready for model '{}' (language '{}').", config.model(), config.language());
        Ok(Self {
            config,
            analyzer,
            redactor: RedactionEngine::new(),
        })
    }

    pub fn config(&self) -> &AnonymizerConfig {
        &self.config
    }

    pub fn model(&self) -> &'static str {
        self.config.model()
    }

    /// The language code the recognizers are bound to.
    pub fn language(&self) -> &'static str {
        self.config.language()
    }

    pub fn analyzer(&self) -> &AnalyzerEngine {
        &self.analyzer
    }

    /// Detection only.
    pub fn analyze(&self, text: &str) -> Result<Vec<Finding>> {
        self.analyzer.analyze(text, self.language())
    }

    /// Returns `text` with every detected PII span replaced by a placeholder.
    /// Text without findings comes back unchanged.
    pub fn anonymize(&self, text: &str) -> Result<String> {
        if text.is_empty() {
            return Ok(String::new());
        }
        let findings = self.analyze(text)?;
        if findings.is_empty() {
            debug!("No PII found; returning input unchanged.");
            return Ok(text.to_string());
        }
        Ok(self.redactor.redact(text, &findings)?.text)
    }

    /// Like [`anonymize`](Self::anonymize), also reporting each replacement.
    pub fn anonymize_detailed(&self, text: &str) -> Result<AnonymizedText> {
        if text.is_empty() {
            return Ok(AnonymizedText { text: String::new(), items: Vec::new() });
        }
        let findings = self.analyze(text)?;
        self.redactor.redact(text, &findings)
    }
}
