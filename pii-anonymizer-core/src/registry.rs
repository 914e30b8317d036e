// pii-anonymizer-core/src/registry.rs
//! Shared anonymizer instances, one per model.
//!
//! Building an anonymizer provisions a model and compiles its recognizers, so
//! callers that anonymize repeatedly should reuse instances. The registry maps
//! each canonical model identifier to its own instance. Construction is
//! single-flight per model: concurrent first requests for the same model build
//! it once, while requests for other models are not blocked by it.
//!
//! License: MIT OR APACHE 2.0

use log::debug;
use once_cell::sync::{Lazy, OnceCell};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::anonymizer::PiiAnonymizer;
use crate::errors::{AnonymizerError, Result};
use crate::models::AnonymizerConfig;
use crate::provider::ModelProvider;

type Slot = Arc<OnceCell<Arc<PiiAnonymizer>>>;

#[derive(Debug)]
pub struct AnonymizerRegistry {
    provider: ModelProvider,
    slots: Mutex<HashMap<&'static str, Slot>>,
}

impl AnonymizerRegistry {
    pub fn new(provider: ModelProvider) -> Self {
        Self {
            provider,
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub fn provider(&self) -> &ModelProvider {
        &self.provider
    }

    fn slot(&self, model: &'static str) -> Result<Slot> {
        let mut slots = self
            .slots
            .lock()
            .map_err(|_| AnonymizerError::Fatal("anonymizer registry lock poisoned".to_string()))?;
        Ok(Arc::clone(slots.entry(model).or_default()))
    }

    /// Returns the instance for `model`, building it on first use. Aliases
    /// such as `"en"` share the instance of the model they resolve to. A failed
    /// build is not cached.
    pub fn get(&self, model: &str) -> Result<Arc<PiiAnonymizer>> {
        let config = AnonymizerConfig::new(model)?;
        let slot = self.slot(config.model())?;

        // The map lock is released here; only this model's slot blocks.
        let anonymizer = slot.get_or_try_init(|| {
            debug!("Building anonymizer for model '{}'.", config.model());
            PiiAnonymizer::with_provider(config.clone(), &self.provider).map(Arc::new)
        })?;
        Ok(Arc::clone(anonymizer))
    }

    /// Model identifiers with a built instance, sorted.
    pub fn loaded_models(&self) -> Vec<&'static str> {
        let Ok(slots) = self.slots.lock() else {
            return Vec::new();
        };
        let mut models: Vec<&'static str> = slots
            .iter()
            .filter(|(_, slot)| slot.get().is_some())
            .map(|(model, _)| *model)
            .collect();
        models.sort_unstable();
        models
    }
}

impl Default for AnonymizerRegistry {
    fn default() -> Self {
        Self::new(ModelProvider::from_env())
    }
}

static DEFAULT_REGISTRY: Lazy<AnonymizerRegistry> = Lazy::new(AnonymizerRegistry::default);

/// The process-wide registry behind [`get_anonymizer`] and [`anonymize_text`].
pub fn default_registry() -> &'static AnonymizerRegistry {
    &DEFAULT_REGISTRY
}

/// Shared instance for `model` from the process-wide registry.
pub fn get_anonymizer(model: &str) -> Result<Arc<PiiAnonymizer>> {
    default_registry().get(model)
}

/// Anonymizes `text` with the shared instance for `model`.
pub fn anonymize_text(text: &str, model: &str) -> Result<String> {
    get_anonymizer(model)?.anonymize(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ConfigError;
    use crate::provider::ProviderSettings;
    use std::thread;

    fn registry() -> AnonymizerRegistry {
        AnonymizerRegistry::new(ModelProvider::new(ProviderSettings {
            models_dir: None,
            model_url: None,
            offline: true,
        }))
    }

    #[test]
    fn test_same_model_is_reused() {
        let registry = registry();
        let a = registry.get("en_core_web_sm").unwrap();
        let b = registry.get(" en ").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(registry.loaded_models(), vec!["en_core_web_sm"]);
    }

    #[test]
    fn test_models_get_their_own_instances() {
        let registry = registry();
        let en = registry.get("en_core_web_sm").unwrap();
        let de = registry.get("de_core_news_sm").unwrap();
        assert_eq!(en.language(), "en");
        assert_eq!(de.language(), "de");
        assert!(!Arc::ptr_eq(&en, &de));
        assert_eq!(registry.get("en_core_web_sm").unwrap().language(), "en");
    }

    #[test]
    fn test_failures_are_not_cached() {
        let registry = registry();
        let err = registry.get("fr_core_news_sm").unwrap_err();
        assert!(matches!(err, AnonymizerError::Provision(_)));
        assert!(registry.loaded_models().is_empty());

        let err = registry.get("klingon").unwrap_err();
        assert!(matches!(err, AnonymizerError::Config(ConfigError::UnsupportedModel { .. })));
    }

    #[test]
    fn test_concurrent_first_use_builds_once() {
        let registry = Arc::new(registry());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || registry.get("en_core_web_sm").unwrap())
            })
            .collect();
        let instances: Vec<Arc<PiiAnonymizer>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(instances.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }
}
