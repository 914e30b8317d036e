// pii-anonymizer-core/src/recognizers/pattern.rs
//! An `EntityRecognizer` that uses regular expressions, optionally backed by
//! a programmatic validator, to find structured PII (emails, phone numbers,
//! card numbers and the like).
//! License: MIT OR APACHE 2.0

use std::sync::Arc;

use crate::config::RecognizerConfig;
use crate::errors::Result;
use crate::finding::Finding;
use crate::nlp::NlpArtifacts;
use crate::recognizer::EntityRecognizer;
use crate::recognizers::compiler::{get_or_compile_rules, CompiledRule, CompiledRules};
use crate::validators;

pub const PATTERN_RECOGNIZER_NAME: &str = "PatternRecognizer";

#[derive(Debug)]
pub struct PatternRecognizer {
    compiled_rules: Arc<CompiledRules>,
    language: String,
}

impl PatternRecognizer {
    /// Builds a recognizer from the rules of `config` that apply to `language`.
    pub fn new(config: &RecognizerConfig, language: &str) -> Result<Self> {
        let compiled_rules = get_or_compile_rules(&config.for_language(language))?;
        Ok(Self {
            compiled_rules,
            language: language.to_string(),
        })
    }

    /// The embedded default rules for `language`.
    pub fn with_default_rules(language: &str) -> Result<Self> {
        let config = RecognizerConfig::load_default_rules()?;
        Self::new(&config, language)
    }

    pub fn compiled_rules(&self) -> &CompiledRules {
        &self.compiled_rules
    }

    fn passes_validation(compiled_rule: &CompiledRule, candidate: &str) -> bool {
        compiled_rule
            .validation
            .map_or(true, |v| validators::validate(v, candidate))
    }
}

impl EntityRecognizer for PatternRecognizer {
    fn name(&self) -> &str {
        PATTERN_RECOGNIZER_NAME
    }

    fn supported_entities(&self) -> Vec<String> {
        let mut entities: Vec<String> = self
            .compiled_rules
            .rules
            .iter()
            .map(|r| r.entity_type.clone())
            .collect();
        entities.sort();
        entities.dedup();
        entities
    }

    fn supports_language(&self, language: &str) -> bool {
        self.language.eq_ignore_ascii_case(language)
    }

    fn analyze(&self, artifacts: &NlpArtifacts<'_>) -> Result<Vec<Finding>> {
        let mut findings = Vec::new();

        for compiled_rule in &self.compiled_rules.rules {
            for m in compiled_rule.regex.find_iter(artifacts.text) {
                if !Self::passes_validation(compiled_rule, m.as_str()) {
                    continue;
                }
                findings.push(
                    Finding::new(
                        compiled_rule.entity_type.clone(),
                        artifacts.offsets.char_index(m.start()),
                        artifacts.offsets.char_index(m.end()),
                        compiled_rule.score,
                    )
                    .with_recognizer(format!("{}:{}", PATTERN_RECOGNIZER_NAME, compiled_rule.name)),
                );
            }
        }

        Ok(findings)
    }
}
