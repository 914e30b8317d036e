//! compiler.rs - Manages the compilation and caching of recognizer rules.
//!
//! This module provides a thread-safe, cached mechanism to convert a
//! `RecognizerConfig` into `CompiledRules`. Anonymizers for the same language
//! share one compiled set through a global cache keyed by the config hash.
//!
//! License: MIT OR APACHE 2.0

use log::{debug, warn};
use regex::{Regex, RegexBuilder};
use lazy_static::lazy_static;
use std::sync::{Arc, RwLock};
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::collections::hash_map::DefaultHasher;

use crate::config::{RecognizerRule, RecognizerConfig, Validation, MAX_PATTERN_LENGTH};
use crate::errors::{AnonymizerError, Result};

/// A single compiled pattern rule.
#[derive(Debug)]
pub struct CompiledRule {
    pub regex: Regex,
    pub name: String,
    pub entity_type: String,
    pub score: f64,
    pub validation: Option<Validation>,
}

/// All compiled rules of one configuration, in configuration order.
#[derive(Debug)]
pub struct CompiledRules {
    pub rules: Vec<CompiledRule>,
}

lazy_static! {
    /// Global cache of compiled rules keyed by a hash of the `RecognizerConfig`.
    static ref COMPILED_RULES_CACHE: RwLock<HashMap<u64, Arc<CompiledRules>>> = RwLock::new(HashMap::new());
}

fn hash_config(config: &RecognizerConfig) -> u64 {
    let mut hasher = DefaultHasher::new();
    config.rules.hash(&mut hasher);
    hasher.finish()
}

/// Compiles a list of `RecognizerRule`s. All failures are collected and
/// reported together.
pub fn compile_rules(rules_to_compile: Vec<RecognizerRule>) -> Result<CompiledRules> {
    debug!("Starting compilation of {} rules.", rules_to_compile.len());

    let mut compiled_rules = Vec::new();
    let mut compilation_errors = Vec::new();

    for rule in rules_to_compile {
        let Some(pattern) = rule.pattern.as_ref() else {
            warn!("Skipping rule '{}' because its pattern is missing.", &rule.name);
            continue;
        };

        if pattern.len() > MAX_PATTERN_LENGTH {
            compilation_errors.push(AnonymizerError::PatternLengthExceeded(
                rule.name,
                pattern.len(),
                MAX_PATTERN_LENGTH,
            ));
            continue;
        }

        let regex_result = RegexBuilder::new(pattern)
            .case_insensitive(rule.case_insensitive)
            .size_limit(10 * (1 << 20))
            .build();

        match regex_result {
            Ok(regex) => {
                log::debug!(
                    target: "pii_anonymizer_core::recognizers",
                    "Rule '{}' compiled successfully.",
                    &rule.name
                );
                compiled_rules.push(CompiledRule {
                    regex,
                    name: rule.name,
                    entity_type: rule.entity_type,
                    score: rule.score,
                    validation: rule.validation,
                });
            }
            Err(e) => {
                compilation_errors.push(AnonymizerError::RuleCompilationError(rule.name, e));
            }
        }
    }

    if !compilation_errors.is_empty() {
        let error_message = compilation_errors.iter()
            .map(|e| e.to_string())
            .collect::<Vec<String>>()
            .join("\n");
        Err(AnonymizerError::Fatal(format!("Failed to compile {} rule(s):\n{}", compilation_errors.len(), error_message)))
    } else {
        debug!("Finished compiling rules. Total compiled: {}.", compiled_rules.len());
        Ok(CompiledRules { rules: compiled_rules })
    }
}

/// Gets a `CompiledRules` instance from the cache or compiles it.
pub fn get_or_compile_rules(config: &RecognizerConfig) -> Result<Arc<CompiledRules>> {
    let cache_key = hash_config(config);

    {
        let cache = COMPILED_RULES_CACHE
            .read()
            .map_err(|_| AnonymizerError::Fatal("compiled rule cache lock poisoned".to_string()))?;
        if let Some(rules) = cache.get(&cache_key) {
            debug!("Serving compiled rules from cache for key: {}", &cache_key);
            return Ok(Arc::clone(rules));
        }
    }

    debug!("Compiled rules not found in cache. Compiling now.");
    let compiled_arc = Arc::new(compile_rules(config.rules.clone())?);

    let mut cache = COMPILED_RULES_CACHE
        .write()
        .map_err(|_| AnonymizerError::Fatal("compiled rule cache lock poisoned".to_string()))?;
    // Another thread may have compiled the same config meanwhile; keep the first.
    let cached = cache.entry(cache_key).or_insert(compiled_arc);

    debug!("Successfully compiled and cached rules for key: {}", &cache_key);
    Ok(Arc::clone(cached))
}
