//! Resume screener: rank resumes against a job description with an AI service

use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use resume_screener::cli::{self, Cli, Commands, ConfigAction};
use resume_screener::config::Config;
use resume_screener::error::{Result, ScreenerError};
use resume_screener::input::InputManager;
use resume_screener::llm::GeminiClient;
use resume_screener::output::formatter::{save_report_to_file, ReportGenerator};
use resume_screener::output::{export, ReportMetadata, ScreeningReport};
use resume_screener::processing::candidate::{CandidateResult, ResultStatus};
use resume_screener::processing::document::JobDescription;
use resume_screener::processing::pipeline::RunCounts;
use resume_screener::processing::{
    CancelFlag, ProgressObserver, Screener, ScreeningContext, ScreeningOptions, ShortlistFilter,
};
use std::path::PathBuf;
use std::process;
use std::time::Instant;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    if let Err(e) = run(cli).await {
        error!("{:#}", e);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    run_command(cli.command, cli.config, config).await
}

struct ScreenArgs {
    job: Option<PathBuf>,
    job_text: Option<String>,
    resumes: Vec<PathBuf>,
    dir: Option<PathBuf>,
    location: Option<String>,
    min_score: Option<u8>,
    output: Option<String>,
    save: Option<PathBuf>,
    export: Option<PathBuf>,
    model: Option<String>,
    max_attempts: Option<u32>,
    detailed: bool,
}

async fn run_command(command: Commands, config_path: Option<PathBuf>, config: Config) -> anyhow::Result<()> {
    match command {
        Commands::Screen {
            job,
            job_text,
            resumes,
            dir,
            location,
            min_score,
            output,
            save,
            export,
            model,
            max_attempts,
            detailed,
        } => {
            let args = ScreenArgs {
                job,
                job_text,
                resumes,
                dir,
                location,
                min_score,
                output,
                save,
                export,
                model,
                max_attempts,
                detailed,
            };
            run_screen(args, config).await.context("Screening failed")
        }

        Commands::Config { action } => {
            let path = config_path.unwrap_or_else(Config::config_path);
            match action {
                Some(ConfigAction::Show) | None => {
                    println!("⚙️  Current Configuration ({})\n", path.display());
                    let rendered = toml::to_string_pretty(&config).context("Failed to render configuration")?;
                    println!("{}", rendered);
                    let key_state = if config.ai.resolve_api_key().is_some() { "set" } else { "not set" };
                    println!("API key ({}): {}", config.ai.api_key_env, key_state);
                }

                Some(ConfigAction::Path) => {
                    println!("{}", path.display());
                }

                Some(ConfigAction::Reset) => {
                    println!("🔄 Resetting configuration to defaults...");
                    Config::default()
                        .save_to(&path)
                        .with_context(|| format!("Cannot write {}", path.display()))?;
                    println!("✅ Configuration reset successfully!");
                }

                Some(ConfigAction::Set { key, value }) => {
                    let mut config = config;
                    config
                        .set_value(&key, &value)
                        .with_context(|| format!("Cannot set {}", key))?;
                    config
                        .save_to(&path)
                        .with_context(|| format!("Cannot write {}", path.display()))?;
                    println!("✅ Set {} = {}", key, value);
                }
            }
            Ok(())
        }
    }
}

async fn run_screen(args: ScreenArgs, mut config: Config) -> Result<()> {
    let started = Instant::now();

    // Command-line values win over the configuration file.
    if let Some(model) = args.model {
        config.ai.model = model;
    }
    if let Some(max_attempts) = args.max_attempts {
        config.ai.max_attempts = max_attempts;
    }
    if let Some(output) = &args.output {
        config.output.format = cli::parse_output_format(output).map_err(ScreenerError::InvalidInput)?;
    }
    if args.location.is_some() {
        config.filter.location = args.location;
    }
    if args.min_score.is_some() {
        config.filter.min_score = args.min_score;
    }
    config.validate()?;

    if !config.output.color_output {
        colored::control::set_override(false);
    }

    let input = InputManager::new(config.input.clone());

    let (job, job_source) = match (&args.job, args.job_text) {
        (_, Some(text)) => (JobDescription::new(text)?, "inline text".to_string()),
        (Some(path), None) => (input.read_job_description(path).await?, path.display().to_string()),
        (None, None) => {
            return Err(ScreenerError::InvalidInput(
                "Please provide a job description with --job or --job-text".to_string(),
            ))
        }
    };

    let mut paths = args.resumes;
    if let Some(dir) = &args.dir {
        paths.extend(input.discover(dir).await?);
    }
    let documents = input.load_documents(&paths).await?;

    let scorer = GeminiClient::new(&config.ai)?;

    println!("🚀 Resume screening");
    println!("💼 Job Description: {} ({} words)", job_source, job.word_count());
    println!("📄 Resumes: {}", documents.len());
    println!("🤖 Model: {}", config.ai.model);

    let cancel = CancelFlag::new();
    let handler_flag = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted: finishing the current resume, skipping the rest");
            handler_flag.cancel();
        }
    });

    let screener = Screener::new(scorer, InputManager::new(config.input.clone()), ScreeningOptions::from(&config.ai));
    let context = ScreeningContext::with_cancel(job, cancel);
    let progress = CliProgress::new();

    let run = screener.screen(&context, &documents, &progress).await;

    let filter = ShortlistFilter::from(&config.filter);
    let shortlist = run.results.view(&filter);
    let metadata = ReportMetadata::new(&config.ai.model, job_source, context.job.word_count())
        .with_processing_time(started.elapsed().as_millis() as u64);
    let report = ScreeningReport::new(&shortlist, &run.counts, metadata);

    let generator = ReportGenerator::with_options(config.output.color_output, args.detailed, true, true);
    let rendered = generator.generate_report(&report, &config.output.format)?;
    println!("{}", rendered);

    if let Some(save_path) = &args.save {
        // Saved reports never carry terminal colour codes.
        let plain = ReportGenerator::with_options(false, true, true, true);
        save_report_to_file(&plain.generate_report(&report, &config.output.format)?, save_path)?;
        println!("💾 Report saved to {}", save_path.display());
    }

    if let Some(export_path) = args.export.or(config.output.export_path) {
        let format = export(&report.table, &export_path)?;
        println!(
            "📊 Exported {} candidate(s) as {:?} to {}",
            report.table.len(),
            format,
            export_path.display()
        );
    }

    info!("Screening completed in {}ms", started.elapsed().as_millis());
    println!("\n{}", summary(&run.counts));
    Ok(())
}

fn summary(counts: &RunCounts) -> String {
    let line = counts.to_string();
    if counts.failed > 0 || counts.cancelled > 0 {
        format!("⚠️  {}", line.yellow())
    } else {
        format!("✅ {}", line.green())
    }
}

/// Progress bar plus one line per finished resume.
struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template("{spinner} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        Self { bar }
    }
}

impl ProgressObserver for CliProgress {
    fn on_start(&self, total: usize) {
        self.bar.set_length(total as u64);
    }

    fn on_document(&self, _index: usize, name: &str) {
        self.bar.set_message(format!("scoring {}", name));
    }

    fn on_result(&self, result: &CandidateResult) {
        let line = match result.status {
            ResultStatus::Scored => format!("✅ {} - {} ({})", result.file_name, result.score, result.display_name()),
            ResultStatus::Cancelled => format!("⏹️  {} - cancelled", result.file_name),
            ResultStatus::ExtractionFailed | ResultStatus::ScoringFailed => {
                format!("❌ {} - {}", result.file_name, result.explanation)
            }
        };
        self.bar.println(line);
        self.bar.inc(1);
    }

    fn on_finish(&self, _counts: &RunCounts) {
        self.bar.finish_and_clear();
    }
}
