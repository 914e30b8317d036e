//! Recognizer rule configuration for `pii-anonymizer-core`.
//!
//! This module defines the pattern rules the [`PatternRecognizer`] runs. It
//! handles deserialization of YAML rule files and provides utilities for
//! loading the embedded defaults, merging user rules over them and
//! validating them.
//!
//! [`PatternRecognizer`]: crate::recognizers::pattern::PatternRecognizer
//!
//! License: MIT OR APACHE 2.0

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use log::{debug, info};
use std::fmt;
use regex::Regex;
use std::hash::{Hash, Hasher};

/// Maximum allowed length for a regex pattern string.
pub const MAX_PATTERN_LENGTH: usize = 500;

/// Programmatic checks applied to a regex match before it becomes a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Validation {
    Luhn,
    UsSsn,
    UkNino,
    Ipv4,
    Iban,
}

/// A single pattern rule.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RecognizerRule {
    /// Unique identifier for the rule (e.g., "email_address").
    pub name: String,
    /// Entity label reported for matches (e.g., "EMAIL_ADDRESS").
    pub entity_type: String,
    pub description: Option<String>,
    pub pattern: Option<String>,
    /// Base confidence of a match, in `[0, 1]`.
    pub score: f64,
    pub validation: Option<Validation>,
    /// Language codes the rule applies to. `None` means every language.
    pub languages: Option<Vec<String>>,
    pub case_insensitive: bool,
    /// Explicit override for enabling/disabling the rule.
    pub enabled: Option<bool>,
}

impl Hash for RecognizerRule {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.entity_type.hash(state);
        self.description.hash(state);
        self.pattern.hash(state);
        self.score.to_bits().hash(state);
        self.validation.hash(state);
        self.languages.hash(state);
        self.case_insensitive.hash(state);
        self.enabled.hash(state);
    }
}

impl Default for RecognizerRule {
    fn default() -> Self {
        Self {
            name: String::new(),
            entity_type: String::new(),
            description: None,
            pattern: None,
            score: 0.5,
            validation: None,
            languages: None,
            case_insensitive: false,
            enabled: None,
        }
    }
}

impl RecognizerRule {
    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }

    pub fn applies_to(&self, language: &str) -> bool {
        self.languages
            .as_ref()
            .map_or(true, |langs| langs.iter().any(|l| l.eq_ignore_ascii_case(language)))
    }
}

/// A set of pattern rules.
#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
pub struct RecognizerConfig {
    pub rules: Vec<RecognizerRule>,
}

/// Error type for missing rule configurations.
#[derive(Debug)]
pub struct RuleConfigNotFoundError {
    pub config_name: String,
}

impl fmt::Display for RuleConfigNotFoundError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Rule configuration '{}' not found.", self.config_name)
    }
}

impl std::error::Error for RuleConfigNotFoundError {}

impl RecognizerConfig {
    /// Loads recognizer rules from a YAML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading custom rules from: {}", path.display());
        if !path.exists() {
            return Err(RuleConfigNotFoundError { config_name: path.display().to_string() }.into());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: RecognizerConfig = serde_yml::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        validate_rules(&config.rules)?;
        info!("Loaded {} rules from file {}.", config.rules.len(), path.display());

        Ok(config)
    }

    /// Loads the default recognizer rules from the embedded configuration.
    pub fn load_default_rules() -> Result<Self> {
        debug!("Loading default rules from embedded string...");
        let default_yaml = include_str!("../config/default_recognizers.yaml");
        let config: RecognizerConfig = serde_yml::from_str(default_yaml)
            .context("Failed to parse default rules")?;

        debug!("Loaded {} default rules.", config.rules.len());
        Ok(config)
    }

    /// Keeps only enabled rules that apply to `language`.
    pub fn for_language(&self, language: &str) -> RecognizerConfig {
        let rules: Vec<RecognizerRule> = self
            .rules
            .iter()
            .filter(|r| r.is_enabled() && r.applies_to(language))
            .cloned()
            .collect();
        debug!("{} of {} rules apply to language '{}'.", rules.len(), self.rules.len(), language);
        RecognizerConfig { rules }
    }

    pub fn entity_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.rules.iter().map(|r| r.entity_type.clone()).collect();
        types.sort();
        types.dedup();
        types
    }
}

/// Merges user-defined rules over the defaults; a user rule replaces the
/// default rule with the same name.
pub fn merge_rules(
    default_config: RecognizerConfig,
    user_config: Option<RecognizerConfig>,
) -> RecognizerConfig {
    debug!("merge_rules called. Initial default rules count: {}", default_config.rules.len());

    let mut order: Vec<String> = default_config.rules.iter().map(|r| r.name.clone()).collect();
    let mut final_rules_map: HashMap<String, RecognizerRule> = default_config.rules.into_iter()
        .map(|rule| (rule.name.clone(), rule))
        .collect();

    if let Some(user_cfg) = user_config {
        debug!("User config provided. Merging {} user rules.", user_cfg.rules.len());
        for user_rule in user_cfg.rules {
            if !final_rules_map.contains_key(&user_rule.name) {
                order.push(user_rule.name.clone());
            }
            final_rules_map.insert(user_rule.name.clone(), user_rule);
        }
    }

    let final_rules: Vec<RecognizerRule> = order
        .into_iter()
        .filter_map(|name| final_rules_map.remove(&name))
        .collect();
    debug!("Final total rules after merge: {}", final_rules.len());

    RecognizerConfig { rules: final_rules }
}

/// Validates rule integrity (names, entity labels, regex compilation, scores).
pub fn validate_rules(rules: &[RecognizerRule]) -> Result<()> {
    let mut rule_names = HashSet::new();
    let mut errors = Vec::new();

    for rule in rules {
        if rule.name.is_empty() {
            errors.push("A rule has an empty `name` field.".to_string());
        } else if !rule_names.insert(rule.name.clone()) {
            errors.push(format!("Duplicate rule name found: '{}'.", rule.name));
        }

        if rule.entity_type.trim().is_empty() {
            errors.push(format!("Rule '{}' has an empty `entity_type` field.", rule.name));
        }

        if !(0.0..=1.0).contains(&rule.score) {
            errors.push(format!("Rule '{}' has a score outside [0, 1]: {}", rule.name, rule.score));
        }

        let pattern = match &rule.pattern {
            Some(p) => p,
            None => {
                errors.push(format!("Rule '{}' is missing the `pattern` field.", rule.name));
                continue;
            }
        };

        if pattern.is_empty() {
            errors.push(format!("Rule '{}' has an empty `pattern` field.", rule.name));
        } else if pattern.len() > MAX_PATTERN_LENGTH {
            errors.push(format!(
                "Rule '{}': pattern length ({}) exceeds maximum allowed ({}).",
                rule.name, pattern.len(), MAX_PATTERN_LENGTH
            ));
        } else if let Err(e) = Regex::new(pattern) {
            errors.push(format!("Rule '{}' has an invalid regex pattern: {}", rule.name, e));
        }
    }

    if !errors.is_empty() {
        let full_error_message = format!("Rule validation failed:\n{}", errors.join("\n"));
        Err(anyhow!(full_error_message))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(name: &str, pattern: &str) -> RecognizerRule {
        RecognizerRule {
            name: name.to_string(),
            entity_type: "TEST".to_string(),
            pattern: Some(pattern.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_default_rules_are_valid() {
        let config = RecognizerConfig::load_default_rules().unwrap();
        validate_rules(&config.rules).unwrap();
        let types = config.entity_types();
        for expected in ["EMAIL_ADDRESS", "PHONE_NUMBER", "CREDIT_CARD", "US_SSN", "IP_ADDRESS"] {
            assert!(types.iter().any(|t| t == expected), "missing {}", expected);
        }
    }

    #[test]
    fn test_for_language_filters_rules() {
        let mut en_only = rule("en_only", "x");
        en_only.languages = Some(vec!["en".to_string()]);
        let mut disabled = rule("disabled", "y");
        disabled.enabled = Some(false);
        let config = RecognizerConfig { rules: vec![en_only, disabled, rule("all", "z")] };

        let names = |c: RecognizerConfig| c.rules.into_iter().map(|r| r.name).collect::<Vec<_>>();
        assert_eq!(names(config.for_language("en")), vec!["en_only", "all"]);
        assert_eq!(names(config.for_language("de")), vec!["all"]);
    }

    #[test]
    fn test_validate_rules_reports_every_problem() {
        let mut bad_score = rule("bad_score", "a");
        bad_score.score = 1.5;
        let rules = vec![rule("dup", "a"), rule("dup", "b"), rule("broken", "("), bad_score];
        let err = validate_rules(&rules).unwrap_err().to_string();
        assert!(err.contains("Duplicate rule name found: 'dup'"));
        assert!(err.contains("Rule 'broken' has an invalid regex pattern"));
        assert!(err.contains("score outside [0, 1]"));
    }

    #[test]
    fn test_validate_rules_rejects_long_patterns() {
        let long = "a".repeat(MAX_PATTERN_LENGTH + 1);
        let err = validate_rules(&[rule("long", &long)]).unwrap_err().to_string();
        assert!(err.contains("exceeds maximum allowed"));
    }
}
