// pii-anonymizer-core/src/analyzer.rs
//! The `AnalyzerEngine` runs every registered recognizer over a text and turns
//! their raw output into one ordered list of findings.
//!
//! After the recognizers run, the engine
//!
//! 1. raises the score of findings preceded by a context word from the
//!    language pack ("phone" before a number, "email" before an address),
//! 2. drops findings scoring below the configured threshold,
//! 3. collapses exact duplicates, keeping the highest score,
//! 4. sorts by start offset, longest span first.
//!
//! License: MIT OR APACHE 2.0

use log::{debug, trace};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::config::RecognizerConfig;
use crate::errors::{AnonymizerError, Result};
use crate::finding::{log_finding_debug, Finding};
use crate::nlp::{NlpArtifacts, NlpPipeline};
use crate::recognizer::EntityRecognizer;
use crate::recognizers::gazetteer::GazetteerRecognizer;
use crate::recognizers::pattern::PatternRecognizer;
use crate::recognizers::person::PersonRecognizer;

/// Added to a finding's score when a context word precedes it.
pub const CONTEXT_SIMILARITY_FACTOR: f64 = 0.35;
/// A finding with supporting context never scores below this.
pub const MIN_SCORE_WITH_CONTEXT: f64 = 0.4;
/// Number of words before a finding searched for context.
pub const CONTEXT_WINDOW: usize = 5;

#[derive(Debug)]
pub struct AnalyzerEngine {
    pipeline: Arc<NlpPipeline>,
    recognizers: Vec<Box<dyn EntityRecognizer>>,
    context: HashMap<String, HashSet<String>>,
    score_threshold: f64,
}

impl AnalyzerEngine {
    /// Engine with the built-in recognizers and default pattern rules.
    pub fn new(pipeline: Arc<NlpPipeline>) -> Result<Self> {
        let rules = RecognizerConfig::load_default_rules()?;
        Self::with_rules(pipeline, &rules)
    }

    /// Engine with the built-in recognizers, running `rules` as pattern rules.
    pub fn with_rules(pipeline: Arc<NlpPipeline>, rules: &RecognizerConfig) -> Result<Self> {
        let language = pipeline.language().to_string();
        let pack = pipeline.pack();

        let recognizers: Vec<Box<dyn EntityRecognizer>> = vec![
            Box::new(PatternRecognizer::new(rules, &language)?),
            Box::new(PersonRecognizer::new(pack)),
            Box::new(GazetteerRecognizer::locations(pack)?),
            Box::new(GazetteerRecognizer::nrp(pack)?),
        ];

        let mut engine = Self::empty(pipeline);
        engine.recognizers = recognizers;
        debug!(
            "AnalyzerEngine for '{}' ready with {} recognizers.",
            language,
            engine.recognizers.len()
        );
        Ok(engine)
    }

    /// Engine with no recognizers; add them with [`add_recognizer`](Self::add_recognizer).
    pub fn empty(pipeline: Arc<NlpPipeline>) -> Self {
        let context = pipeline
            .pack()
            .context
            .iter()
            .map(|(entity, words)| {
                let words: HashSet<String> = words.iter().map(|w| w.to_lowercase()).collect();
                (entity.clone(), words)
            })
            .collect();

        Self {
            pipeline,
            recognizers: Vec::new(),
            context,
            score_threshold: 0.0,
        }
    }

    pub fn add_recognizer(&mut self, recognizer: Box<dyn EntityRecognizer>) {
        debug!("Registering recognizer '{}'.", recognizer.name());
        self.recognizers.push(recognizer);
    }

    pub fn with_score_threshold(mut self, threshold: f64) -> Self {
        self.score_threshold = threshold;
        self
    }

    pub fn score_threshold(&self) -> f64 {
        self.score_threshold
    }

    pub fn language(&self) -> &str {
        self.pipeline.language()
    }

    pub fn pipeline(&self) -> &NlpPipeline {
        &self.pipeline
    }

    pub fn recognizers(&self) -> &[Box<dyn EntityRecognizer>] {
        &self.recognizers
    }

    /// Every entity label some recognizer can report, sorted.
    pub fn supported_entities(&self) -> Vec<String> {
        let mut entities: Vec<String> = self
            .recognizers
            .iter()
            .flat_map(|r| r.supported_entities())
            .collect();
        entities.sort();
        entities.dedup();
        entities
    }

    /// Finds PII in `text`. `language` must match the language the engine's
    /// pipeline was built for.
    pub fn analyze(&self, text: &str, language: &str) -> Result<Vec<Finding>> {
        if !self.language().eq_ignore_ascii_case(language) {
            return Err(AnonymizerError::LanguageMismatch {
                bound: self.language().to_string(),
                requested: language.to_string(),
            });
        }
        if text.is_empty() {
            return Ok(Vec::new());
        }

        let artifacts = self.pipeline.process(text);
        let mut findings = Vec::new();
        for recognizer in self.recognizers.iter().filter(|r| r.supports_language(language)) {
            let found = recognizer.analyze(&artifacts)?;
            trace!("Recognizer '{}' returned {} findings.", recognizer.name(), found.len());
            findings.extend(found);
        }

        self.enhance_with_context(&artifacts, &mut findings);
        findings.retain(|f| f.score >= self.score_threshold);
        let findings = dedupe_and_sort(findings);

        if log::log_enabled!(log::Level::Debug) {
            for finding in &findings {
                let snippet: String = text.chars().skip(finding.start).take(finding.len()).collect();
                log_finding_debug(module_path!(), finding, &snippet);
            }
        }
        debug!("Analysis produced {} findings.", findings.len());
        Ok(findings)
    }

    fn enhance_with_context(&self, artifacts: &NlpArtifacts<'_>, findings: &mut [Finding]) {
        if self.context.is_empty() {
            return;
        }
        for finding in findings.iter_mut() {
            let Some(words) = self.context.get(&finding.entity_type) else { continue };
            let idx = artifacts.token_at_or_after(finding.start);
            let has_context = artifacts
                .words_before(idx, CONTEXT_WINDOW)
                .iter()
                .any(|w| words.contains(*w));
            if has_context {
                let boosted = (finding.score + CONTEXT_SIMILARITY_FACTOR).min(1.0);
                finding.score = boosted.max(MIN_SCORE_WITH_CONTEXT);
            }
        }
    }
}

/// Collapses findings with the same span and label, keeping the best score,
/// and orders the rest by start, longest first.
fn dedupe_and_sort(findings: Vec<Finding>) -> Vec<Finding> {
    let mut best: HashMap<(usize, usize, String), Finding> = HashMap::new();
    for finding in findings {
        let key = (finding.start, finding.end, finding.entity_type.clone());
        match best.get(&key) {
            Some(existing) if existing.score >= finding.score => {}
            _ => {
                best.insert(key, finding);
            }
        }
    }

    let mut out: Vec<Finding> = best.into_values().collect();
    out.sort_by(|a, b| {
        a.start
            .cmp(&b.start)
            .then(b.end.cmp(&a.end))
            .then(b.score.total_cmp(&a.score))
            .then(a.entity_type.cmp(&b.entity_type))
    });
    out
}
