// pii-anonymizer/src/commands/anonymize.rs
//! The anonymize command: read all input, provision the model, anonymize,
//! write the result.
//!
//! Input is read completely before the model is provisioned or the output
//! file is created, so a bad input path fails without side effects.

use anyhow::{Context, Result};
use is_terminal::IsTerminal;
use log::{debug, info};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use pii_anonymizer_core::{
    config, AnalyzerEngine, AnonymizerConfig, AnonymizerRegistry, ModelProvider, ModelRegistry,
    PiiAnonymizer, RecognizerConfig,
};

use crate::cli::Cli;
use crate::ui::output_format::{info_msg, warn_msg};

/// Options for one anonymize run, detached from clap.
#[derive(Debug, Clone, Default)]
pub struct AnonymizeOptions {
    pub model: String,
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub rules: Option<PathBuf>,
    pub quiet: bool,
}

impl From<&Cli> for AnonymizeOptions {
    fn from(cli: &Cli) -> Self {
        Self {
            model: cli.model_selector().to_string(),
            input: cli.input.clone(),
            output: cli.output.clone(),
            rules: cli.rules.clone(),
            quiet: cli.quiet,
        }
    }
}

/// Reads the whole input source as UTF-8 text.
pub fn read_input(path: Option<&Path>, quiet: bool) -> Result<String> {
    match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file: {}", path.display())),
        None => {
            let mut stdin = io::stdin();
            if stdin.is_terminal() && !quiet {
                info_msg("Reading from stdin. Press Ctrl-D when done.");
            }
            let mut buf = String::new();
            stdin.read_to_string(&mut buf).context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

/// Builds an anonymizer whose pattern rules are the built-in ones with the
/// rules from `rules` merged over them by name.
pub fn build_with_rules(
    config: AnonymizerConfig,
    rules: &Path,
    provider: &ModelProvider,
) -> Result<PiiAnonymizer> {
    let pipeline = provider
        .load(config.spec())
        .with_context(|| format!("Failed to provision model '{}'", config.model()))?;

    let user = RecognizerConfig::load_from_file(rules)?;
    let rule_config = config::merge_rules(RecognizerConfig::load_default_rules()?, Some(user));
    let analyzer = AnalyzerEngine::with_rules(Arc::new(pipeline), &rule_config)
        .context("Failed to build the recognizers")?;

    PiiAnonymizer::from_analyzer(config, analyzer).context("Failed to build the anonymizer")
}

/// Resolves and provisions the model and returns the anonymizer for it.
///
/// Without custom rules the shared instance from `registry` is used; custom
/// rules get a private instance.
pub fn prepare_anonymizer(
    model: &str,
    rules: Option<&Path>,
    registry: &AnonymizerRegistry,
    quiet: bool,
) -> Result<Arc<PiiAnonymizer>> {
    let config = AnonymizerConfig::new(model).with_context(|| format!("Invalid model selection '{}'", model))?;

    let provider = registry.provider();
    if !provider.is_available(config.spec()) && !quiet {
        info_msg(format!("Model '{}' is not available locally; fetching it.", config.model()));
    }

    match rules {
        Some(path) => build_with_rules(config, path, provider).map(Arc::new),
        None => registry
            .get(config.model())
            .with_context(|| format!("Failed to provision model '{}'", config.model())),
    }
}

/// Writes `content` as-is, with no trailing newline added.
pub fn write_output(path: Option<&Path>, content: &str) -> Result<()> {
    match path {
        Some(path) => fs::write(path, content)
            .with_context(|| format!("Failed to write output file: {}", path.display())),
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            writer.write_all(content.as_bytes()).context("Failed to write to stdout")?;
            writer.flush().context("Failed to flush stdout")
        }
    }
}

/// The main operation runner for the anonymize command.
pub fn run(opts: &AnonymizeOptions, registry: &AnonymizerRegistry) -> Result<()> {
    info!("Starting anonymization with model selector '{}'.", opts.model);

    let input = read_input(opts.input.as_deref(), opts.quiet)?;
    debug!("Read {} bytes of input.", input.len());
    if input.is_empty() && !opts.quiet {
        warn_msg("Input is empty; nothing to anonymize.");
    }

    let anonymizer = prepare_anonymizer(&opts.model, opts.rules.as_deref(), registry, opts.quiet)?;
    let anonymized = anonymizer.anonymize(&input).context("Anonymization failed")?;
    debug!(
        "Anonymized with '{}'. Input length: {}, output length: {}",
        anonymizer.model(),
        input.len(),
        anonymized.len()
    );

    write_output(opts.output.as_deref(), &anonymized)?;
    if let Some(path) = &opts.output {
        if !opts.quiet {
            info_msg(format!("Anonymized output written to {}", path.display()));
        }
    }
    Ok(())
}

/// Prints the supported models, one per line.
pub fn list_models(provider: &ModelProvider) -> Result<()> {
    let stdout = io::stdout();
    let mut writer = stdout.lock();
    for spec in ModelRegistry::all() {
        let availability = if provider.is_available(spec) { "available" } else { "downloadable" };
        writeln!(writer, "{:<18} {:<3} {:<12} {}", spec.id, spec.language, spec.size, availability)?;
    }
    Ok(())
}
