//! Command-line entry point: Call Audit.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Parse arguments.
//! 3. Load [`AppConfig`] (defaults on first run) and apply overrides.
//! 4. Resolve the API key, transcript and criteria.
//! 5. Run one audit through [`AuditEngine`] and print the report.
//!
//! # Exit codes
//!
//! | Code | Meaning                                             |
//! |------|-----------------------------------------------------|
//! | 0    | Report printed                                      |
//! | 2    | Bad input (arguments, transcript, criteria, key)    |
//! | 3    | Completion service failed; try again later          |
//! | 4    | Unusable service response; raw payload on stderr    |

use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{ArgGroup, Parser, ValueEnum};

use call_audit::{
    audit::{resolve_rubric, AnalysisError, AuditEngine, ErrorCategory, Transcript},
    config::AppConfig,
    llm::{Credential, OpenAiCompletion},
    render::render_text,
};

// ---------------------------------------------------------------------------
// Arguments
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "call-audit")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Score a customer-support call transcript with an LLM", long_about = None)]
#[command(group(ArgGroup::new("source").required(true).args(["transcript", "text"])))]
struct Cli {
    /// Transcript file to audit (`-` reads stdin)
    #[arg(short, long)]
    transcript: Option<PathBuf>,

    /// Transcript text given inline
    #[arg(long)]
    text: Option<String>,

    /// Custom criteria as a JSON object of name → question
    #[arg(long, conflicts_with = "criteria_file")]
    criteria: Option<String>,

    /// File holding custom criteria JSON
    #[arg(long)]
    criteria_file: Option<PathBuf>,

    /// API key for the completion service
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Model to use instead of the configured one
    #[arg(short, long)]
    model: Option<String>,

    /// Settings file instead of the platform default
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Append the transcript to text output
    #[arg(long)]
    show_transcript: bool,
}

// ---------------------------------------------------------------------------
// Input resolution
// ---------------------------------------------------------------------------

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => AppConfig::load().unwrap_or_else(|e| {
            log::warn!("Failed to load config ({e}); using defaults");
            AppConfig::default()
        }),
    };

    if let Some(model) = &cli.model {
        config.completion.model = model.clone();
    }
    Ok(config)
}

fn resolve_credential(cli: &Cli, config: &AppConfig) -> Result<Credential> {
    let key = cli
        .api_key
        .clone()
        .or_else(|| config.completion.api_key.clone())
        .map(Credential::new);

    match key {
        Some(credential) if !credential.is_blank() => Ok(credential),
        _ => bail!("an API key is required (--api-key, OPENAI_API_KEY, or completion.api_key)"),
    }
}

fn read_transcript(cli: &Cli, limit: usize) -> Result<Transcript> {
    let transcript = match (&cli.transcript, &cli.text) {
        (Some(path), _) if path.as_os_str() == "-" => {
            let mut text = String::new();
            std::io::stdin()
                .take(limit as u64 + 1)
                .read_to_string(&mut text)
                .context("failed to read transcript from stdin")?;
            Transcript::new(text, limit)?
        }
        (Some(path), _) => Transcript::from_file(path, limit)
            .with_context(|| format!("transcript file {}", path.display()))?,
        (None, Some(text)) => Transcript::new(text.clone(), limit)?,
        (None, None) => bail!("no transcript provided"),
    };
    Ok(transcript)
}

fn read_criteria(cli: &Cli) -> Result<Option<String>> {
    match (&cli.criteria, &cli.criteria_file) {
        (Some(text), _) => Ok(Some(text.clone())),
        (None, Some(path)) => std::fs::read_to_string(path)
            .map(Some)
            .with_context(|| format!("failed to read criteria file {}", path.display())),
        (None, None) => Ok(None),
    }
}

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------

fn exit_status_for(err: &AnalysisError) -> u8 {
    match err.category() {
        ErrorCategory::FixInput => 2,
        ErrorCategory::RetryLater => 3,
        ErrorCategory::ContactSupport => 4,
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = load_config(&cli)?;
    let credential = resolve_credential(&cli, &config)?;
    let transcript = read_transcript(&cli, config.audit.max_transcript_bytes)?;
    let criteria = read_criteria(&cli)?;
    let rubric = resolve_rubric(criteria.as_deref()).context("invalid custom criteria")?;

    let engine = AuditEngine::new(
        Arc::new(OpenAiCompletion::from_config(&config.completion)),
        config.audit.clone(),
    );

    match engine.analyze(&transcript, &rubric, &credential).await {
        Ok(report) => {
            let output = match cli.format {
                OutputFormat::Json => serde_json::to_string_pretty(&report)?,
                OutputFormat::Text => {
                    let shown = cli.show_transcript.then_some(&transcript);
                    render_text(&report, &rubric, shown)
                }
            };
            println!("{output}");
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            eprintln!("Analysis error: {err}");
            match err.category() {
                ErrorCategory::FixInput => eprintln!("Please fix the input and try again."),
                ErrorCategory::RetryLater => eprintln!("The service is unavailable; try again later."),
                ErrorCategory::ContactSupport => {
                    eprintln!("Unexpected response from the service. Raw payload follows:");
                    if let Some(raw) = err.raw_response() {
                        eprintln!("{raw}");
                    }
                }
            }
            Ok(ExitCode::from(exit_status_for(&err)))
        }
    }
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(2)
        }
    }
}
