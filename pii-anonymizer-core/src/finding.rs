// pii-anonymizer-core/src/finding.rs
//! Provides the `Finding` type produced by recognizers and the PII-safe
//! debug logging helpers used wherever matched text would otherwise be logged.

use serde::{Serialize, Deserialize};
use log::debug;

use lazy_static::lazy_static;
use sha2::{Sha256, Digest};
use hex;

lazy_static! {
    /// Initialized once: whether raw PII may appear in debug logs.
    static ref PII_DEBUG_ALLOWED: bool = {
        std::env::var("PII_ANONYMIZER_ALLOW_DEBUG_PII")
            .map(|s| s.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    };
}

/// A detected PII span. Offsets are character indices into the analyzed text,
/// `end` exclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub entity_type: String,
    pub start: usize,
    pub end: usize,
    pub score: f64,
    #[serde(default)]
    pub recognizer: String,
}

impl Finding {
    pub fn new(entity_type: impl Into<String>, start: usize, end: usize, score: f64) -> Self {
        Self {
            entity_type: entity_type.into(),
            start,
            end,
            score,
            recognizer: String::new(),
        }
    }

    pub fn with_recognizer(mut self, recognizer: impl Into<String>) -> Self {
        self.recognizer = recognizer.into();
        self
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, other: &Finding) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub fn overlaps(&self, other: &Finding) -> bool {
        self.start < other.end && other.start < self.end
    }
}

pub fn redact_sensitive(s: &str) -> String {
    const MAX_LEN: usize = 8;
    let len = s.chars().count();
    if len <= MAX_LEN {
        "[REDACTED]".to_string()
    } else {
        format!("[REDACTED: {} chars]", len)
    }
}

fn get_loggable_content(sensitive_content: &str) -> String {
    if *PII_DEBUG_ALLOWED {
        sensitive_content.to_string()
    } else {
        redact_sensitive(sensitive_content)
    }
}

pub fn canonical_sample_hash(entity_type: &str, snippet: &str) -> String {
    let normalized = snippet
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    let mut hasher = Sha256::new();
    hasher.update(entity_type.as_bytes());
    hasher.update(b":");
    hasher.update(normalized.as_bytes());
    hex::encode(hasher.finalize())
}

pub fn log_finding_debug(module_path: &str, finding: &Finding, original_sensitive_content: &str) {
    if !log::log_enabled!(log::Level::Debug) {
        return;
    }
    let hash = canonical_sample_hash(&finding.entity_type, original_sensitive_content);
    debug!(
        "{} Finding {} [{}..{}] score={:.2} by '{}': '{}' (sample {})",
        module_path,
        finding.entity_type,
        finding.start,
        finding.end,
        finding.score,
        finding.recognizer,
        get_loggable_content(original_sensitive_content),
        &hash[..12]
    );
}

pub fn log_replacement_debug(
    module_path: &str,
    original_sensitive_content: &str,
    placeholder: &str,
) {
    debug!(
        "{} Replacement: Original='{}', Placeholder='{}'",
        module_path,
        get_loggable_content(original_sensitive_content),
        placeholder
    );
}
