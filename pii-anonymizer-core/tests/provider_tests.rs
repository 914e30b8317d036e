// pii-anonymizer-core/tests/provider_tests.rs
use anyhow::Result;
use std::fs;
use tempfile::tempdir;

use pii_anonymizer_core::{
    AnonymizerConfig, AnonymizerError, ModelProvider, ModelRegistry, PackSource, PiiAnonymizer,
    ProvisionError, ProviderSettings,
};

const FRENCH_PACK: &str = r#"
model: fr_core_news_sm
language: fr
stop_words: [je, le, la, les, et, est, mon, ma, suis, de]
first_names: [Camille, Pierre]
person_cues: ["je m'appelle", "m.", "mme"]
locations: [Paris, Lyon]
context:
  PHONE_NUMBER: [téléphone, portable]
"#;

#[test]
fn test_cached_pack_builds_an_anonymizer() -> Result<()> {
    let dir = tempdir()?;
    fs::write(dir.path().join("fr_core_news_sm.yaml"), FRENCH_PACK)?;
    let provider = ModelProvider::new(ProviderSettings {
        models_dir: Some(dir.path().to_path_buf()),
        model_url: None,
        offline: true,
    });

    let spec = ModelRegistry::lookup("fr")?;
    assert!(provider.is_available(spec));
    let (_, source) = provider.provision(spec)?;
    assert!(matches!(source, PackSource::Cache(_)));

    let anonymizer = PiiAnonymizer::with_provider(AnonymizerConfig::new("fr_core_news_sm")?, &provider)?;
    assert_eq!(anonymizer.language(), "fr");
    assert_eq!(
        anonymizer.anonymize("Pierre Dupont habite à Lyon.")?,
        "<PERSON> habite à <LOCATION>."
    );
    Ok(())
}

#[test]
fn test_missing_model_fails_before_anonymizing() -> Result<()> {
    let dir = tempdir()?;
    let provider = ModelProvider::new(ProviderSettings {
        models_dir: Some(dir.path().to_path_buf()),
        model_url: None,
        offline: false,
    });

    let err = PiiAnonymizer::with_provider(AnonymizerConfig::new("es_core_news_md")?, &provider).unwrap_err();
    assert!(matches!(
        err,
        AnonymizerError::Provision(ProvisionError::NoDownloadSource { ref model }) if model == "es_core_news_md"
    ));
    assert!(err.to_string().contains("PII_ANONYMIZER_MODEL_URL"));
    Ok(())
}

#[test]
fn test_unreachable_mirror_is_a_download_error() -> Result<()> {
    let dir = tempdir()?;
    let provider = ModelProvider::new(ProviderSettings {
        models_dir: Some(dir.path().to_path_buf()),
        // Port 9 (discard) on localhost; nothing listens there in CI.
        model_url: Some("http://127.0.0.1:9".to_string()),
        offline: false,
    });

    let spec = ModelRegistry::lookup("nl_core_news_sm")?;
    let err = provider.provision(spec).unwrap_err();
    assert!(matches!(err, ProvisionError::Download { .. }));
    assert!(!dir.path().join("nl_core_news_sm.yaml").exists());
    Ok(())
}
