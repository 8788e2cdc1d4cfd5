//! stitchsort — categorizes PES embroidery files by rendering each design
//! to an image, asking a vision model which category it belongs to, and
//! filing the original into a localized category folder.

mod category;
mod classifier;
mod cli;
mod config;
mod convert;
mod error;
mod openai;
mod pipeline;
mod repository;
mod run_log;
mod ui;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;
use clap::Parser;
use console::Style;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use category::{CategoryRegistry, Locale};
use classifier::{ImageClassifier, OpenAiClassifier};
use cli::{Cli, Command};
use config::StitchsortConfig;
use convert::{DesignConverter, StitchRenderer};
use error::ConfigError;
use openai::OpenAiClient;
use pipeline::{CategorizationPipeline, RunConfiguration};
use repository::FsRepository;
use run_log::RunLog;
use ui::BatchProgress;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (before anything else).
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Initialize logging based on verbosity.
    let default_filter = if cli.verbose {
        "stitchsort=debug"
    } else {
        "stitchsort=warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = StitchsortConfig::load()?;

    match cli.command {
        Command::Categorize {
            source_dir,
            output,
            language,
            dry_run,
            start_after,
        } => {
            categorize(
                &config,
                source_dir,
                output,
                language.into(),
                dry_run,
                start_after.unwrap_or(0),
            )
            .await
        }
        Command::Convert { file, output } => convert_single(&config, &file, output),
        Command::Check => check(&config).await,
    }
}

/// Build the collaborators and run the batch pipeline. Per-item failures
/// are reported in the summary and do not fail the invocation; only
/// configuration problems produce a non-zero exit.
async fn categorize(
    config: &StitchsortConfig,
    source_dir: PathBuf,
    output: Option<PathBuf>,
    locale: Locale,
    dry_run: bool,
    start_after: u32,
) -> Result<()> {
    if config.api_key.is_empty() {
        return Err(ConfigError::MissingApiKey.into());
    }

    let mut run_config = RunConfiguration::new(source_dir, output, locale);
    run_config.dry_run = dry_run;
    run_config.start_after = start_after;

    if dry_run {
        println!("🔍 Dry-run mode enabled - no files will be copied");
    }

    let client = OpenAiClient::new(config.api_key.clone(), config.request_timeout_secs);
    let classifier = OpenAiClassifier::new(
        client,
        config.model.clone(),
        config.max_retries,
        config.base_delay_ms,
    );
    let converter = StitchRenderer::new(config.image_width, config.image_height);
    let registry = CategoryRegistry::with_synonyms(&config.synonyms);

    // Ctrl-C requests a stop at the next item boundary; the in-flight
    // item is allowed to finish or fail whole.
    let cancel = Arc::new(AtomicBool::new(false));
    {
        let cancel = Arc::clone(&cancel);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("\n  interrupt received, finishing the current item...");
                cancel.store(true, Ordering::Relaxed);
            }
        });
    }

    let log = RunLog::open(Path::new(&config.log_file))?;
    let mut pipeline = CategorizationPipeline::new(converter, classifier, FsRepository::new(), registry)
        .with_cancel_flag(cancel)
        .with_run_log(log);

    let progress = BatchProgress::start(&run_config.source_dir.display().to_string());
    let summary = pipeline.run(&run_config).await?;
    progress.finish(&summary, &run_config);

    Ok(())
}

/// Convert a single design file without classifying or placing it.
fn convert_single(config: &StitchsortConfig, file: &Path, output: Option<PathBuf>) -> Result<()> {
    let output = output.unwrap_or_else(|| file.with_extension("jpg"));
    println!("🔄 Converting {} ...", file.display());

    let converter = StitchRenderer::new(config.image_width, config.image_height);
    converter.convert(file, &output)?;

    println!("✓ Conversion completed: {}", output.display());
    Ok(())
}

/// Validate credentials and classifier availability without processing
/// any files.
async fn check(config: &StitchsortConfig) -> Result<()> {
    println!("🔍 Checking stitchsort configuration...");
    let green = Style::new().green();
    let red = Style::new().red();
    let mut all_ok = true;

    if config.api_key.is_empty() {
        println!("  {} OPENAI_API_KEY not configured", red.apply_to("✗"));
        println!("     Set it in the environment or as `api_key` in stitchsort.toml");
        all_ok = false;
    } else {
        println!("  {} API key configured", green.apply_to("✓"));

        let client = OpenAiClient::new(config.api_key.clone(), config.request_timeout_secs);
        let classifier = OpenAiClassifier::new(
            client,
            config.model.clone(),
            config.max_retries,
            config.base_delay_ms,
        );
        if classifier.is_available().await {
            println!("  {} Classifier reachable ({})", green.apply_to("✓"), config.model);
        } else {
            println!("  {} Classifier not reachable", red.apply_to("✗"));
            all_ok = false;
        }
    }

    if all_ok {
        println!("\n✓ Everything configured correctly");
        Ok(())
    } else {
        anyhow::bail!("configuration check failed");
    }
}
