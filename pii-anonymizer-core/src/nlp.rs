//! nlp.rs - Tokenization and lexical annotation.
//!
//! The pipeline splits text on Unicode word boundaries and annotates each
//! token with its byte and character offsets plus a few lexical flags that
//! the recognizers rely on. Findings are reported in character offsets, so
//! this module also owns the byte/char [`OffsetMapper`].

use std::collections::HashSet;
use std::sync::Arc;
use unicode_segmentation::UnicodeSegmentation;

use crate::provider::LanguagePack;

/// Converts between byte offsets and character offsets of one string.
#[derive(Debug, Clone)]
pub struct OffsetMapper {
    char_starts: Vec<usize>,
    byte_len: usize,
}

impl OffsetMapper {
    pub fn new(text: &str) -> Self {
        Self {
            char_starts: text.char_indices().map(|(i, _)| i).collect(),
            byte_len: text.len(),
        }
    }

    /// Character index of the char starting at (or containing) `byte`.
    pub fn char_index(&self, byte: usize) -> usize {
        match self.char_starts.binary_search(&byte) {
            Ok(idx) | Err(idx) => idx,
        }
    }

    /// Byte offset of the `char_idx`-th character; the text length past the end.
    pub fn byte_index(&self, char_idx: usize) -> usize {
        self.char_starts.get(char_idx).copied().unwrap_or(self.byte_len)
    }

    pub fn char_len(&self) -> usize {
        self.char_starts.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Word,
    Whitespace,
    Punct,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub text: &'a str,
    pub lower: String,
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
    pub char_start: usize,
    pub char_end: usize,
    /// First letter is uppercase.
    pub is_title: bool,
    pub is_stop: bool,
}

impl Token<'_> {
    pub fn is_word(&self) -> bool {
        self.kind == TokenKind::Word
    }
}

/// The annotated form of one input text.
#[derive(Debug)]
pub struct NlpArtifacts<'a> {
    pub text: &'a str,
    pub language: &'a str,
    pub tokens: Vec<Token<'a>>,
    pub offsets: OffsetMapper,
}

impl<'a> NlpArtifacts<'a> {
    /// Index of the first token starting at or after character `char_pos`.
    pub fn token_at_or_after(&self, char_pos: usize) -> usize {
        self.tokens.partition_point(|t| t.char_start < char_pos)
    }

    /// Lowercase forms of up to `n` word tokens before token `idx`, nearest last.
    pub fn words_before(&self, idx: usize, n: usize) -> Vec<&str> {
        let mut words: Vec<&str> = self.tokens[..idx.min(self.tokens.len())]
            .iter()
            .rev()
            .filter(|t| t.is_word())
            .take(n)
            .map(|t| t.lower.as_str())
            .collect();
        words.reverse();
        words
    }
}

/// A language-bound tokenizer built from a provisioned [`LanguagePack`].
#[derive(Debug)]
pub struct NlpPipeline {
    pack: Arc<LanguagePack>,
    stop_words: HashSet<String>,
}

impl NlpPipeline {
    pub fn new(pack: LanguagePack) -> Self {
        let stop_words = pack.stop_words.iter().map(|w| w.to_lowercase()).collect();
        Self { pack: Arc::new(pack), stop_words }
    }

    pub fn language(&self) -> &str {
        &self.pack.language
    }

    pub fn model(&self) -> &str {
        &self.pack.model
    }

    pub fn pack(&self) -> &LanguagePack {
        &self.pack
    }

    pub fn is_stop_word(&self, lower: &str) -> bool {
        self.stop_words.contains(lower)
    }

    pub fn process<'a>(&'a self, text: &'a str) -> NlpArtifacts<'a> {
        let mut tokens = Vec::new();
        let mut char_pos = 0usize;

        for (start, segment) in text.split_word_bound_indices() {
            let char_count = segment.chars().count();
            let kind = if segment.chars().all(char::is_whitespace) {
                TokenKind::Whitespace
            } else if segment.chars().any(char::is_alphanumeric) {
                TokenKind::Word
            } else {
                TokenKind::Punct
            };
            let lower = segment.to_lowercase();
            let is_title = kind == TokenKind::Word
                && segment.chars().next().is_some_and(char::is_uppercase);
            let is_stop = kind == TokenKind::Word && self.is_stop_word(&lower);

            tokens.push(Token {
                text: segment,
                lower,
                kind,
                start,
                end: start + segment.len(),
                char_start: char_pos,
                char_end: char_pos + char_count,
                is_title,
                is_stop,
            });
            char_pos += char_count;
        }

        NlpArtifacts {
            text,
            language: self.language(),
            tokens,
            offsets: OffsetMapper::new(text),
        }
    }
}
