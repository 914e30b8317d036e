// pii-anonymizer-core/src/redactor.rs
//! Replaces detected spans with `<ENTITY_TYPE>` placeholders.
//!
//! Findings from different recognizers routinely overlap, so conflicts are
//! resolved before any text is rewritten:
//!
//! * a finding inside another finding with an equal or higher score is dropped,
//! * partially overlapping findings are merged into their union, labelled with
//!   the entity type of the higher-scoring one,
//! * findings of the same type separated only by spaces or tabs are merged.
//!   Line breaks are never absorbed, so line-oriented input keeps its lines.
//!
//! Everything outside the surviving spans is copied through unchanged.
//!
//! License: MIT OR APACHE 2.0

use log::debug;
use serde::{Deserialize, Serialize};

use crate::errors::{AnonymizerError, Result};
use crate::finding::{log_replacement_debug, Finding};
use crate::nlp::OffsetMapper;

/// One replaced span. Offsets are character offsets into the output text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplacedItem {
    pub entity_type: String,
    pub start: usize,
    pub end: usize,
    pub placeholder: String,
}

/// The output of [`RedactionEngine::redact`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnonymizedText {
    pub text: String,
    pub items: Vec<ReplacedItem>,
}

/// The placeholder written in place of an `entity_type` span.
pub fn placeholder(entity_type: &str) -> String {
    format!("<{}>", entity_type)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RedactionEngine;

impl RedactionEngine {
    pub fn new() -> Self {
        Self
    }

    /// Rewrites `text`, replacing every finding after conflict resolution.
    pub fn redact(&self, text: &str, findings: &[Finding]) -> Result<AnonymizedText> {
        let offsets = OffsetMapper::new(text);
        let char_len = offsets.char_len();

        for f in findings {
            if f.start > f.end || f.end > char_len {
                return Err(AnonymizerError::InvalidFinding {
                    entity_type: f.entity_type.clone(),
                    start: f.start,
                    end: f.end,
                    len: char_len,
                });
            }
        }

        let spans = resolve_conflicts(text, &offsets, findings);
        debug!("{} findings resolved to {} replacements.", findings.len(), spans.len());

        let mut out = String::with_capacity(text.len());
        let mut out_chars = 0usize;
        let mut items = Vec::with_capacity(spans.len());
        let mut cursor = 0usize;

        for span in &spans {
            let start = offsets.byte_index(span.start);
            let end = offsets.byte_index(span.end);

            let kept = &text[cursor..start];
            out.push_str(kept);
            out_chars += kept.chars().count();

            let replacement = placeholder(&span.entity_type);
            log_replacement_debug(module_path!(), &text[start..end], &replacement);
            let replacement_chars = replacement.chars().count();
            items.push(ReplacedItem {
                entity_type: span.entity_type.clone(),
                start: out_chars,
                end: out_chars + replacement_chars,
                placeholder: replacement.clone(),
            });
            out.push_str(&replacement);
            out_chars += replacement_chars;
            cursor = end;
        }
        out.push_str(&text[cursor..]);

        Ok(AnonymizedText { text: out, items })
    }
}

fn is_horizontal_space(c: char) -> bool {
    c.is_whitespace() && !matches!(c, '\n' | '\r' | '\u{0B}' | '\u{0C}' | '\u{85}' | '\u{2028}' | '\u{2029}')
}

/// Drops contained findings, then merges overlapping ones and same-type ones
/// separated by horizontal whitespace. Returns non-overlapping spans in ascending order.
fn resolve_conflicts(text: &str, offsets: &OffsetMapper, findings: &[Finding]) -> Vec<Finding> {
    let candidates: Vec<&Finding> = findings.iter().filter(|f| !f.is_empty()).collect();

    let dominated = |i: usize, f: &Finding| {
        candidates.iter().enumerate().any(|(j, other)| {
            j != i
                && other.contains(f)
                && (other.score > f.score
                    || (other.score == f.score && (other.len() > f.len() || j < i)))
        })
    };
    let mut kept: Vec<Finding> = candidates
        .iter()
        .enumerate()
        .filter(|&(i, f)| !dominated(i, *f))
        .map(|(_, f)| Finding::clone(f))
        .collect();
    kept.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

    let mut merged: Vec<Finding> = Vec::with_capacity(kept.len());
    for next in kept {
        let Some(current) = merged.last_mut() else {
            merged.push(next);
            continue;
        };

        if current.overlaps(&next) {
            if next.score > current.score {
                current.entity_type = next.entity_type.clone();
                current.recognizer = next.recognizer.clone();
                current.score = next.score;
            }
            current.end = current.end.max(next.end);
        } else if current.entity_type == next.entity_type
            && text[offsets.byte_index(current.end)..offsets.byte_index(next.start)]
                .chars()
                .all(is_horizontal_space)
        {
            current.end = next.end;
            current.score = current.score.max(next.score);
        } else {
            merged.push(next);
        }
    }
    merged
}
