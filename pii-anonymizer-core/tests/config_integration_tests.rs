// pii-anonymizer-core/tests/config_integration_tests.rs
use anyhow::Result;
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;

use pii_anonymizer_core::config::{self, RecognizerConfig, RecognizerRule, Validation};
use pii_anonymizer_core::{
    AnalyzerEngine, AnonymizerConfig, ModelProvider, ModelRegistry, PiiAnonymizer, ProviderSettings,
};

#[test]
fn test_load_default_rules() {
    let config = RecognizerConfig::load_default_rules().unwrap();
    assert!(!config.rules.is_empty());
    let card = config.rules.iter().find(|r| r.name == "credit_card").unwrap();
    assert_eq!(card.validation, Some(Validation::Luhn));
    assert!(card.is_enabled());
}

#[test]
fn test_load_from_file() -> Result<()> {
    let yaml_content = r#"
rules:
  - name: employee_id
    entity_type: EMPLOYEE_ID
    pattern: 'EMP-\d{6}'
    score: 0.9
    description: "Internal employee numbers"
"#;
    let mut file = NamedTempFile::new()?;
    file.write_all(yaml_content.as_bytes())?;
    let config = RecognizerConfig::load_from_file(file.path())?;
    assert_eq!(config.rules.len(), 1);
    assert_eq!(config.rules[0].entity_type, "EMPLOYEE_ID");
    assert_eq!(config.rules[0].score, 0.9);
    assert!(config.rules[0].languages.is_none());
    Ok(())
}

#[test]
fn test_load_from_missing_file() {
    let err = RecognizerConfig::load_from_file("definitely/not/here.yaml").unwrap_err();
    assert!(err.downcast_ref::<config::RuleConfigNotFoundError>().is_some());
}

#[test]
fn test_load_from_file_rejects_invalid_rules() -> Result<()> {
    let yaml_content = r#"
rules:
  - name: broken
    entity_type: BROKEN
    pattern: '(unclosed'
"#;
    let mut file = NamedTempFile::new()?;
    file.write_all(yaml_content.as_bytes())?;
    let err = RecognizerConfig::load_from_file(file.path()).unwrap_err();
    assert!(err.to_string().contains("Rule 'broken' has an invalid regex pattern"));
    Ok(())
}

#[test]
fn test_merge_rules_overrides_by_name() {
    let defaults = RecognizerConfig::load_default_rules().unwrap();
    let default_count = defaults.rules.len();
    let user = RecognizerConfig {
        rules: vec![
            RecognizerRule {
                name: "url".to_string(),
                entity_type: "URL".to_string(),
                pattern: Some("x".to_string()),
                enabled: Some(false),
                ..Default::default()
            },
            RecognizerRule {
                name: "employee_id".to_string(),
                entity_type: "EMPLOYEE_ID".to_string(),
                pattern: Some(r"EMP-\d{6}".to_string()),
                ..Default::default()
            },
        ],
    };

    let merged = config::merge_rules(defaults, Some(user));
    assert_eq!(merged.rules.len(), default_count + 1);
    let url = merged.rules.iter().find(|r| r.name == "url").unwrap();
    assert!(!url.is_enabled());
    assert_eq!(merged.rules.last().unwrap().name, "employee_id");
}

#[test]
fn test_custom_rules_flow_into_the_anonymizer() -> Result<()> {
    let provider = ModelProvider::new(ProviderSettings {
        models_dir: None,
        model_url: None,
        offline: true,
    });
    let spec = ModelRegistry::lookup("en_core_web_sm")?;
    let pipeline = Arc::new(provider.load(spec)?);

    let user = RecognizerConfig {
        rules: vec![RecognizerRule {
            name: "employee_id".to_string(),
            entity_type: "EMPLOYEE_ID".to_string(),
            pattern: Some(r"\bEMP-\d{6}\b".to_string()),
            score: 0.9,
            ..Default::default()
        }],
    };
    let rules = config::merge_rules(RecognizerConfig::load_default_rules()?, Some(user));
    let analyzer = AnalyzerEngine::with_rules(pipeline, &rules)?;
    let anonymizer = PiiAnonymizer::from_analyzer(AnonymizerConfig::new("en_core_web_sm")?, analyzer)?;

    assert_eq!(
        anonymizer.anonymize("Badge EMP-123456, mail ops@example.org")?,
        "Badge <EMPLOYEE_ID>, mail <EMAIL_ADDRESS>"
    );
    Ok(())
}
