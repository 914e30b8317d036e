//! provider.rs - Model provisioning.
//!
//! A model's assets live in a YAML language pack. Provisioning makes the pack
//! available and is an explicit step, separate from building an anonymizer,
//! so a missing model is reported on its own instead of surfacing halfway
//! through the first anonymization.
//!
//! Resolution order for a model identifier:
//!
//! 1. `<models_dir>/<id>.yaml` in the local cache,
//! 2. the pack bundled into the binary (small English and German models),
//! 3. `<model_url>/<id>.yaml` fetched over HTTP and written to the cache.
//!
//! License: MIT OR APACHE 2.0

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::{ProvisionError, Result};
use crate::models::ModelSpec;
use crate::nlp::NlpPipeline;

pub const MODELS_DIR_ENV: &str = "PII_ANONYMIZER_MODELS_DIR";
pub const MODEL_URL_ENV: &str = "PII_ANONYMIZER_MODEL_URL";
pub const OFFLINE_ENV: &str = "PII_ANONYMIZER_OFFLINE";

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(120);

/// The provisioned assets of one model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguagePack {
    pub model: String,
    pub language: String,
    pub stop_words: Vec<String>,
    pub first_names: Vec<String>,
    /// First names that are also common words. They only count inside a
    /// multi-word name.
    pub ambiguous_first_names: Vec<String>,
    /// Lowercase phrases that introduce a person's name ("my name is", "mr").
    pub person_cues: Vec<String>,
    pub locations: Vec<String>,
    /// Nationalities, religious and political groups.
    pub nrp: Vec<String>,
    /// Lowercase words that raise the score of a nearby finding, per entity type.
    pub context: BTreeMap<String, Vec<String>>,
}

impl LanguagePack {
    pub fn from_yaml(model: &str, text: &str) -> std::result::Result<Self, ProvisionError> {
        serde_yml::from_str(text).map_err(|e| ProvisionError::Malformed {
            model: model.to_string(),
            reason: e.to_string(),
        })
    }

    /// Checks the pack belongs to `spec`.
    pub fn validate_for(&self, spec: &ModelSpec) -> std::result::Result<(), ProvisionError> {
        if self.model != spec.id {
            return Err(ProvisionError::Mismatch {
                expected: spec.id.to_string(),
                found: self.model.clone(),
            });
        }
        if self.language != spec.language {
            return Err(ProvisionError::Malformed {
                model: spec.id.to_string(),
                reason: format!("declares language '{}', expected '{}'", self.language, spec.language),
            });
        }
        if self.stop_words.is_empty() {
            return Err(ProvisionError::Malformed {
                model: spec.id.to_string(),
                reason: "stop word list is empty".to_string(),
            });
        }
        Ok(())
    }
}

/// Where a provisioned pack came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackSource {
    Cache(PathBuf),
    Bundled,
    Downloaded(String),
}

/// Provider settings, usually read from the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderSettings {
    pub models_dir: Option<PathBuf>,
    pub model_url: Option<String>,
    pub offline: bool,
}

impl ProviderSettings {
    pub fn from_env() -> Self {
        let models_dir = std::env::var_os(MODELS_DIR_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .or_else(|| dirs::data_dir().map(|d| d.join("pii-anonymizer").join("models")));
        let model_url = std::env::var(MODEL_URL_ENV)
            .ok()
            .map(|u| u.trim().trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty());
        let offline = std::env::var(OFFLINE_ENV)
            .map(|s| s.eq_ignore_ascii_case("true") || s == "1")
            .unwrap_or(false);

        Self { models_dir, model_url, offline }
    }
}

fn bundled_pack(id: &str) -> Option<&'static str> {
    match id {
        "en_core_web_sm" => Some(include_str!("../models/en_core_web_sm.yaml")),
        "de_core_news_sm" => Some(include_str!("../models/de_core_news_sm.yaml")),
        _ => None,
    }
}

/// Makes language packs available and turns them into NLP pipelines.
#[derive(Debug, Clone, Default)]
pub struct ModelProvider {
    settings: ProviderSettings,
}

impl ModelProvider {
    pub fn new(settings: ProviderSettings) -> Self {
        Self { settings }
    }

    pub fn from_env() -> Self {
        Self::new(ProviderSettings::from_env())
    }

    pub fn settings(&self) -> &ProviderSettings {
        &self.settings
    }

    fn cache_path(&self, spec: &ModelSpec) -> Option<PathBuf> {
        self.settings
            .models_dir
            .as_ref()
            .map(|dir| dir.join(format!("{}.yaml", spec.id)))
    }

    /// True when provisioning `spec` needs no network access.
    pub fn is_available(&self, spec: &ModelSpec) -> bool {
        bundled_pack(spec.id).is_some() || self.cache_path(spec).is_some_and(|p| p.is_file())
    }

    /// Resolves the pack for `spec`, fetching it when it is not present locally.
    pub fn provision(&self, spec: &ModelSpec) -> std::result::Result<(LanguagePack, PackSource), ProvisionError> {
        if let Some(path) = self.cache_path(spec).filter(|p| p.is_file()) {
            debug!("Loading model '{}' from cache {}", spec.id, path.display());
            let text = read_pack(spec, &path)?;
            let pack = LanguagePack::from_yaml(spec.id, &text)?;
            pack.validate_for(spec)?;
            return Ok((pack, PackSource::Cache(path)));
        }

        if let Some(text) = bundled_pack(spec.id) {
            debug!("Loading bundled model '{}'", spec.id);
            let pack = LanguagePack::from_yaml(spec.id, text)?;
            pack.validate_for(spec)?;
            return Ok((pack, PackSource::Bundled));
        }

        let (text, url) = self.download(spec)?;
        let pack = LanguagePack::from_yaml(spec.id, &text)?;
        pack.validate_for(spec)?;
        self.store(spec, &text);
        Ok((pack, PackSource::Downloaded(url)))
    }

    /// Provisions `spec` and builds its NLP pipeline.
    pub fn load(&self, spec: &ModelSpec) -> Result<NlpPipeline> {
        let (pack, source) = self.provision(spec)?;
        debug!("Model '{}' provisioned from {:?}", spec.id, source);
        Ok(NlpPipeline::new(pack))
    }

    fn download(&self, spec: &ModelSpec) -> std::result::Result<(String, String), ProvisionError> {
        if self.settings.offline {
            return Err(ProvisionError::Offline { model: spec.id.to_string() });
        }
        let Some(base) = self.settings.model_url.as_deref() else {
            return Err(ProvisionError::NoDownloadSource { model: spec.id.to_string() });
        };

        let url = format!("{}/{}.yaml", base, spec.id);
        info!("Downloading model '{}' from {}", spec.id, url);

        let download_err = |source: reqwest::Error| ProvisionError::Download {
            model: spec.id.to_string(),
            url: url.clone(),
            source,
        };

        let client = reqwest::blocking::Client::builder()
            .timeout(DOWNLOAD_TIMEOUT)
            .build()
            .map_err(download_err)?;
        let response = client.get(&url).send().map_err(download_err)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProvisionError::HttpStatus {
                model: spec.id.to_string(),
                url,
                status: status.as_u16(),
            });
        }

        let text = response.text().map_err(download_err)?;
        info!("Downloaded model '{}' ({} bytes)", spec.id, text.len());
        Ok((text, url))
    }

    // A failed cache write only costs a re-download next time.
    fn store(&self, spec: &ModelSpec, text: &str) {
        let Some(path) = self.cache_path(spec) else { return };
        let written = path
            .parent()
            .map_or(Ok(()), |dir| fs::create_dir_all(dir))
            .and_then(|_| fs::write(&path, text));
        match written {
            Ok(()) => debug!("Cached model '{}' at {}", spec.id, path.display()),
            Err(e) => warn!("Could not cache model '{}' at {}: {}", spec.id, path.display(), e),
        }
    }
}

fn read_pack(spec: &ModelSpec, path: &Path) -> std::result::Result<String, ProvisionError> {
    fs::read_to_string(path).map_err(|source| ProvisionError::Io {
        model: spec.id.to_string(),
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AnonymizerError;
    use crate::models::ModelRegistry;
    use tempfile::tempdir;

    fn offline_provider(dir: &Path) -> ModelProvider {
        ModelProvider::new(ProviderSettings {
            models_dir: Some(dir.to_path_buf()),
            model_url: None,
            offline: true,
        })
    }

    #[test]
    fn test_bundled_packs_are_valid() {
        let dir = tempdir().unwrap();
        let provider = offline_provider(dir.path());
        for id in ["en_core_web_sm", "de_core_news_sm"] {
            let spec = ModelRegistry::lookup(id).unwrap();
            assert!(provider.is_available(spec));
            let (pack, source) = provider.provision(spec).unwrap();
            assert_eq!(source, PackSource::Bundled);
            assert_eq!(pack.model, id);
            assert!(!pack.first_names.is_empty());
            assert!(!pack.locations.is_empty());
        }
    }

    #[test]
    fn test_cache_takes_precedence_over_bundle() {
        let dir = tempdir().unwrap();
        let yaml = "model: en_core_web_sm\nlanguage: en\nstop_words: [the]\nfirst_names: [Zed]\n";
        fs::write(dir.path().join("en_core_web_sm.yaml"), yaml).unwrap();

        let provider = offline_provider(dir.path());
        let spec = ModelRegistry::lookup("en_core_web_sm").unwrap();
        let (pack, source) = provider.provision(spec).unwrap();
        assert!(matches!(source, PackSource::Cache(_)));
        assert_eq!(pack.first_names, vec!["Zed".to_string()]);
    }

    #[test]
    fn test_missing_model_offline_is_an_error() {
        let dir = tempdir().unwrap();
        let provider = offline_provider(dir.path());
        let spec = ModelRegistry::lookup("en_core_web_lg").unwrap();
        assert!(!provider.is_available(spec));
        let err = provider.provision(spec).unwrap_err();
        assert!(matches!(err, ProvisionError::Offline { .. }));
    }

    #[test]
    fn test_missing_model_without_url_is_an_error() {
        let dir = tempdir().unwrap();
        let provider = ModelProvider::new(ProviderSettings {
            models_dir: Some(dir.path().to_path_buf()),
            model_url: None,
            offline: false,
        });
        let spec = ModelRegistry::lookup("fr_core_news_sm").unwrap();
        let err = provider.provision(spec).unwrap_err();
        assert!(matches!(err, ProvisionError::NoDownloadSource { .. }));
        assert!(err.to_string().contains(MODEL_URL_ENV));
    }

    #[test]
    fn test_mismatched_cached_pack_is_rejected() {
        let dir = tempdir().unwrap();
        let yaml = "model: de_core_news_sm\nlanguage: de\nstop_words: [der]\n";
        fs::write(dir.path().join("en_core_web_md.yaml"), yaml).unwrap();

        let provider = offline_provider(dir.path());
        let spec = ModelRegistry::lookup("en_core_web_md").unwrap();
        let err = provider.provision(spec).unwrap_err();
        assert!(matches!(err, ProvisionError::Mismatch { .. }));
    }

    #[test]
    fn test_malformed_cached_pack_is_rejected() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("nl_core_news_sm.yaml"), "model: [unterminated").unwrap();

        let provider = offline_provider(dir.path());
        let spec = ModelRegistry::lookup("nl_core_news_sm").unwrap();
        let err = provider.provision(spec).unwrap_err();
        assert!(matches!(err, ProvisionError::Malformed { .. }));
    }

    #[test]
    fn test_unreadable_cached_pack_is_an_io_error() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("en_core_web_lg.yaml"), [0xff, 0xfe, 0x00]).unwrap();

        let provider = offline_provider(dir.path());
        let spec = ModelRegistry::lookup("en_core_web_lg").unwrap();
        let err = provider.provision(spec).unwrap_err();
        assert!(matches!(err, ProvisionError::Io { .. }));

        let wrapped: AnonymizerError = err.into();
        assert!(matches!(wrapped, AnonymizerError::Provision(ProvisionError::Io { .. })));
    }
}
