// pii-anonymizer-core/src/recognizers/gazetteer.rs
//! Dictionary lookup recognizer.
//!
//! Terms from a language pack (city and country names, nationalities) are
//! compiled into a double-array Aho-Corasick automaton and matched
//! leftmost-longest, so "New York City" wins over "New York". Matches must sit
//! on word boundaries: "Rome" is not found inside "Romeo".
//!
//! License: MIT OR APACHE 2.0

use daachorse::{DoubleArrayAhoCorasick, DoubleArrayAhoCorasickBuilder, MatchKind};
use log::debug;
use std::collections::HashSet;
use std::fmt;

use crate::errors::{AnonymizerError, Result};
use crate::finding::Finding;
use crate::nlp::NlpArtifacts;
use crate::provider::LanguagePack;
use crate::recognizer::EntityRecognizer;

pub const LOCATION_ENTITY: &str = "LOCATION";
pub const NRP_ENTITY: &str = "NRP";

const LOCATION_SCORE: f64 = 0.85;
const NRP_SCORE: f64 = 0.7;

pub struct GazetteerRecognizer {
    name: String,
    entity_type: String,
    language: String,
    score: f64,
    automaton: Option<DoubleArrayAhoCorasick<usize>>,
    term_count: usize,
}

impl fmt::Debug for GazetteerRecognizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GazetteerRecognizer")
            .field("name", &self.name)
            .field("entity_type", &self.entity_type)
            .field("language", &self.language)
            .field("terms", &self.term_count)
            .finish()
    }
}

impl GazetteerRecognizer {
    /// Builds a recognizer reporting `entity_type` for every term. Blank and
    /// duplicate terms are ignored; an empty list yields a recognizer that
    /// never matches.
    pub fn new(
        name: &str,
        entity_type: &str,
        language: &str,
        terms: &[String],
        score: f64,
    ) -> Result<Self> {
        let mut seen = HashSet::new();
        let patterns: Vec<&str> = terms
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty() && seen.insert(*t))
            .collect();

        let automaton = if patterns.is_empty() {
            None
        } else {
            let built = DoubleArrayAhoCorasickBuilder::new()
                .match_kind(MatchKind::LeftmostLongest)
                .build(&patterns)
                .map_err(|e| AnonymizerError::GazetteerBuild(name.to_string(), e.to_string()))?;
            Some(built)
        };
        debug!("Gazetteer '{}' built with {} terms.", name, patterns.len());

        Ok(Self {
            name: name.to_string(),
            entity_type: entity_type.to_string(),
            language: language.to_string(),
            score,
            automaton,
            term_count: patterns.len(),
        })
    }

    pub fn locations(pack: &LanguagePack) -> Result<Self> {
        Self::new("LocationRecognizer", LOCATION_ENTITY, &pack.language, &pack.locations, LOCATION_SCORE)
    }

    pub fn nrp(pack: &LanguagePack) -> Result<Self> {
        Self::new("NrpRecognizer", NRP_ENTITY, &pack.language, &pack.nrp, NRP_SCORE)
    }

    pub fn term_count(&self) -> usize {
        self.term_count
    }
}

fn on_word_boundary(text: &str, start: usize, end: usize) -> bool {
    let before_ok = text[..start].chars().next_back().map_or(true, |c| !c.is_alphanumeric());
    let after_ok = text[end..].chars().next().map_or(true, |c| !c.is_alphanumeric());
    before_ok && after_ok
}

impl EntityRecognizer for GazetteerRecognizer {
    fn name(&self) -> &str {
        &self.name
    }

    fn supported_entities(&self) -> Vec<String> {
        vec![self.entity_type.clone()]
    }

    fn supports_language(&self, language: &str) -> bool {
        self.language.eq_ignore_ascii_case(language)
    }

    fn analyze(&self, artifacts: &NlpArtifacts<'_>) -> Result<Vec<Finding>> {
        let Some(automaton) = &self.automaton else {
            return Ok(Vec::new());
        };

        let text = artifacts.text;
        let findings = automaton
            .leftmost_find_iter(text)
            .filter(|m| on_word_boundary(text, m.start(), m.end()))
            .map(|m| {
                Finding::new(
                    self.entity_type.clone(),
                    artifacts.offsets.char_index(m.start()),
                    artifacts.offsets.char_index(m.end()),
                    self.score,
                )
                .with_recognizer(self.name.clone())
            })
            .collect();

        Ok(findings)
    }
}
