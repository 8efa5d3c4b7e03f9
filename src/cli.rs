//! CLI interface for the resume screener

use crate::config::OutputFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "resume-screener")]
#[command(about = "AI-powered resume screening against a job description")]
#[command(long_about = "Score a batch of resumes (PDF, DOCX, TXT, Markdown or images) against one job description \
with a generative-AI service, then filter, rank and export the shortlist")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Score resumes against a job description and rank them
    Screen {
        /// Path to the job description (TXT, MD, PDF, DOCX)
        #[arg(short, long, conflicts_with = "job_text", required_unless_present = "job_text")]
        job: Option<PathBuf>,

        /// Job description given inline
        #[arg(long)]
        job_text: Option<String>,

        /// Resume files (PDF, DOCX, TXT, MD, PNG, JPG, WEBP)
        resumes: Vec<PathBuf>,

        /// Also screen every supported file in this folder
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Keep candidates whose location contains this text
        #[arg(short, long)]
        location: Option<String>,

        /// Keep candidates scoring at least this much (0-100)
        #[arg(long, value_parser = parse_min_score)]
        min_score: Option<u8>,

        /// Output format: console, json, markdown, html
        #[arg(short, long)]
        output: Option<String>,

        /// Save the rendered report to a file
        #[arg(short, long)]
        save: Option<PathBuf>,

        /// Export the shortlist to a spreadsheet (.xlsx or .csv)
        #[arg(short, long)]
        export: Option<PathBuf>,

        /// AI model to score with
        #[arg(short, long)]
        model: Option<String>,

        /// Attempts per resume for transient AI failures
        #[arg(long)]
        max_attempts: Option<u32>,

        /// Also list each candidate's file and status below the table
        #[arg(long)]
        detailed: bool,
    },

    /// Show or change configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Print the configuration file location
    Path,

    /// Reset configuration to defaults
    Reset,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., "filter.min_score")
        key: String,

        /// Configuration value
        value: String,
    },
}

/// Parse and validate output format
pub fn parse_output_format(format: &str) -> Result<OutputFormat, String> {
    match format.to_lowercase().as_str() {
        "console" => Ok(OutputFormat::Console),
        "json" => Ok(OutputFormat::Json),
        "markdown" | "md" => Ok(OutputFormat::Markdown),
        "html" => Ok(OutputFormat::Html),
        _ => Err(format!(
            "Invalid output format: {}. Supported: console, json, markdown, html",
            format
        )),
    }
}

/// Minimum score must be a whole number from 0 to 100
pub fn parse_min_score(value: &str) -> Result<u8, String> {
    let score: u8 = value
        .trim()
        .parse()
        .map_err(|_| format!("Minimum score must be a whole number from 0 to 100, got '{}'", value))?;
    if score > 100 {
        return Err(format!("Minimum score must be between 0 and 100, got {}", score));
    }
    Ok(score)
}
