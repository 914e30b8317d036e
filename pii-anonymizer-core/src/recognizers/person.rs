// pii-anonymizer-core/src/recognizers/person.rs
//! Detects person names.
//!
//! Candidates are runs of capitalized, non-stop words joined by single spaces
//! or hyphens ("John Doe", "Jean-Luc Picard"). A run becomes a `PERSON`
//! finding when it contains a known first name, when it directly follows a
//! person cue ("my name is", "Mr.", "Dr."), or both. A cue alone never
//! makes a name out of words written entirely in capitals ("README", "NASA").
//!
//! License: MIT OR APACHE 2.0

use log::debug;
use std::collections::HashSet;

use crate::errors::Result;
use crate::finding::Finding;
use crate::nlp::{NlpArtifacts, Token, TokenKind};
use crate::provider::LanguagePack;
use crate::recognizer::EntityRecognizer;

pub const PERSON_RECOGNIZER_NAME: &str = "PersonRecognizer";
pub const PERSON_ENTITY: &str = "PERSON";

const SCORE_NAME_AND_CUE: f64 = 0.95;
const SCORE_NAME: f64 = 0.85;
const SCORE_CUE: f64 = 0.6;

fn lower_set(words: &[String]) -> HashSet<String> {
    words.iter().map(|w| w.trim().to_lowercase()).filter(|w| !w.is_empty()).collect()
}

#[derive(Debug)]
pub struct PersonRecognizer {
    language: String,
    first_names: HashSet<String>,
    ambiguous_first_names: HashSet<String>,
    /// Cue phrases split into lowercase words, punctuation dropped.
    cues: Vec<Vec<String>>,
    longest_cue: usize,
}

impl PersonRecognizer {
    pub fn new(pack: &LanguagePack) -> Self {
        let cues: Vec<Vec<String>> = pack
            .person_cues
            .iter()
            .map(|cue| {
                cue.split(|c: char| !c.is_alphanumeric() && c != '\'')
                    .filter(|w| !w.is_empty())
                    .map(str::to_lowercase)
                    .collect::<Vec<_>>()
            })
            .filter(|words| !words.is_empty())
            .collect();
        let longest_cue = cues.iter().map(Vec::len).max().unwrap_or(0);

        debug!(
            "PersonRecognizer for '{}': {} first names, {} cues.",
            pack.language,
            pack.first_names.len(),
            cues.len()
        );

        Self {
            language: pack.language.clone(),
            first_names: lower_set(&pack.first_names),
            ambiguous_first_names: lower_set(&pack.ambiguous_first_names),
            cues,
            longest_cue,
        }
    }

    fn is_candidate(token: &Token<'_>) -> bool {
        token.is_word() && token.is_title && !token.is_stop
    }

    /// Collects runs of candidate tokens as lists of token indices.
    fn candidate_runs(tokens: &[Token<'_>]) -> Vec<Vec<usize>> {
        let mut runs = Vec::new();
        let mut current: Vec<usize> = Vec::new();
        let mut i = 0;

        while i < tokens.len() {
            if Self::is_candidate(&tokens[i]) {
                current.push(i);
                // A single space or hyphen may join the next candidate.
                let joined = tokens.get(i + 1).is_some_and(|sep| match sep.kind {
                    TokenKind::Whitespace => sep.text == " ",
                    TokenKind::Punct => sep.text == "-",
                    TokenKind::Word => false,
                }) && tokens.get(i + 2).is_some_and(Self::is_candidate);
                if joined {
                    i += 2;
                    continue;
                }
            }
            if !current.is_empty() {
                runs.push(std::mem::take(&mut current));
            }
            i += 1;
        }
        if !current.is_empty() {
            runs.push(current);
        }
        runs
    }

    /// True when the token has at least two letters and all of them are uppercase.
    fn is_all_caps(token: &Token<'_>) -> bool {
        let mut letters = 0;
        for c in token.text.chars().filter(|c| c.is_alphabetic()) {
            if !c.is_uppercase() {
                return false;
            }
            letters += 1;
        }
        letters > 1
    }

    fn is_first_name(&self, token: &Token<'_>, run_len: usize) -> bool {
        if self.first_names.contains(&token.lower) {
            return true;
        }
        run_len > 1 && self.ambiguous_first_names.contains(&token.lower)
    }

    fn follows_cue(&self, artifacts: &NlpArtifacts<'_>, token_idx: usize) -> bool {
        if self.cues.is_empty() {
            return false;
        }
        let before = artifacts.words_before(token_idx, self.longest_cue);
        self.cues.iter().any(|cue| {
            before.len() >= cue.len()
                && before[before.len() - cue.len()..]
                    .iter()
                    .zip(cue)
                    .all(|(w, c)| *w == c.as_str())
        })
    }
}

impl EntityRecognizer for PersonRecognizer {
    fn name(&self) -> &str {
        PERSON_RECOGNIZER_NAME
    }

    fn supported_entities(&self) -> Vec<String> {
        vec![PERSON_ENTITY.to_string()]
    }

    fn supports_language(&self, language: &str) -> bool {
        self.language.eq_ignore_ascii_case(language)
    }

    fn analyze(&self, artifacts: &NlpArtifacts<'_>) -> Result<Vec<Finding>> {
        let tokens = &artifacts.tokens;
        let mut findings = Vec::new();

        for run in Self::candidate_runs(tokens) {
            let first_name_at = run.iter().position(|&idx| self.is_first_name(&tokens[idx], run.len()));
            let cued = self.follows_cue(artifacts, run[0]);

            // Without a cue, capitalized words ahead of the first name
            // ("Yesterday John Doe") are not part of the name.
            let (from, score) = match (first_name_at, cued) {
                (Some(_), true) => (0, SCORE_NAME_AND_CUE),
                (Some(pos), false) => (pos, SCORE_NAME),
                (None, true) if !run.iter().all(|&idx| Self::is_all_caps(&tokens[idx])) => {
                    (0, SCORE_CUE)
                }
                (None, _) => continue,
            };

            let (Some(&first), Some(&last)) = (run.get(from), run.last()) else { continue };
            findings.push(
                Finding::new(PERSON_ENTITY, tokens[first].char_start, tokens[last].char_end, score)
                    .with_recognizer(PERSON_RECOGNIZER_NAME),
            );
        }

        Ok(findings)
    }
}
