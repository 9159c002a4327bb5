// DeepTrust - Command Line Entry Point

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use deeptrust::commands::{self, ExportFormat};
use deeptrust::models::response::{AnalysisReport, CommandResponse};
use deeptrust::models::settings::SettingsUpdate;
use deeptrust::state::AppState;
use deeptrust_core::{MediaType, Sensitivity};

#[derive(Parser)]
#[command(name = "deeptrust")]
#[command(about = "Analyze image, video and audio files for signs of manipulation", long_about = None)]
struct Cli {
    /// Print command output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a media file
    Analyze {
        file: PathBuf,
        #[arg(long, value_parser = clap::value_parser!(MediaType))]
        media_type: MediaType,
        /// Defaults to the configured sensitivity
        #[arg(long, value_parser = clap::value_parser!(Sensitivity))]
        sensitivity: Option<Sensitivity>,
        /// Also write report artifacts for the new entry
        #[arg(long, value_enum)]
        report: Vec<ExportFormat>,
    },
    /// List recent analyses, newest first
    History {
        #[arg(long, value_parser = clap::value_parser!(MediaType))]
        media_type: Option<MediaType>,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Show dashboard counters
    Stats {
        #[arg(long, value_parser = clap::value_parser!(MediaType))]
        media_type: Option<MediaType>,
    },
    /// Export a stored analysis as PDF and/or JSON
    Export {
        id: String,
        #[arg(long)]
        out: Option<PathBuf>,
        /// Defaults to both formats
        #[arg(long, value_enum)]
        format: Vec<ExportFormat>,
    },
    /// Read or change settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the current configuration
    Show,
    /// Toggle demo mode (primary provider disabled)
    SetDemo { enabled: bool },
    /// Store or clear (empty string) a provider API key
    SetKey {
        #[arg(value_enum)]
        provider: KeySlot,
        key: String,
    },
    /// Per-attempt provider timeout in seconds
    SetTimeout { seconds: u64 },
    /// Default export directory
    SetExportDir { dir: PathBuf },
}

#[derive(Clone, Copy, ValueEnum)]
enum KeySlot {
    Primary,
    Secondary,
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_env("DEEPTRUST_LOG").unwrap_or_else(|_| "info".into());
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

/// Print the JSON envelope, or hand the data to `human` on success.
fn emit<T: Serialize>(
    response: CommandResponse<T>,
    json: bool,
    human: impl FnOnce(&T),
) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    }
    match (response.data, response.error) {
        (Some(data), _) => {
            if !json {
                human(&data);
            }
            Ok(())
        }
        (None, error) => anyhow::bail!(error.unwrap_or_else(|| "command failed".to_string())),
    }
}

fn print_analysis(report: &AnalysisReport) {
    println!("Entry:      {}", report.entry_id);
    println!("File:       {} ({})", report.filename, report.media_type);
    println!("Score:      {}/100", report.score);
    println!("Risk level: {}", report.risk_level.as_str().to_uppercase());
    println!("Source:     {}", report.tier);
    if !report.real_analysis {
        println!("            no provider answered; this is a synthetic demonstration result");
    }
    for attempt in report.rejected_attempts() {
        println!(
            "Rejected:   {} result from {}: {}",
            attempt.tier,
            attempt.provider,
            attempt.detail.as_deref().unwrap_or("risk level contradicts score")
        );
    }
    if report.signals.is_empty() {
        println!("No signals detected.");
    } else {
        println!("Signals:");
        for signal in &report.signals {
            println!(
                "- {} ({}%): {}",
                signal.kind,
                signal.confidence_percent(),
                signal.description
            );
        }
    }
    for path in &report.exports {
        println!("Wrote {}", path.display());
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let state = AppState::initialize().context("failed to initialize DeepTrust state")?;
    let json = cli.json;

    match cli.command {
        Commands::Analyze {
            file,
            media_type,
            sensitivity,
            report,
        } => {
            let response =
                commands::analyze_file(&state, &file, media_type, sensitivity, &report).await;
            emit(response, json, print_analysis)?;
        }
        Commands::History { media_type, limit } => {
            emit(commands::list_history(&state, media_type, limit), json, |entries| {
                if entries.is_empty() {
                    println!("No analyses recorded yet.");
                    return;
                }
                for entry in entries {
                    let verdict = match entry.result() {
                        Some(result) => format!("{:>3}/100 {}", result.score(), result.risk_level()),
                        None => "failed".to_string(),
                    };
                    println!(
                        "{}  {}  {:<5}  {}  {}",
                        entry.id(),
                        entry.created_at().format("%Y-%m-%d %H:%M"),
                        entry.media_type(),
                        verdict,
                        entry.filename()
                    );
                }
            })?;
        }
        Commands::Stats { media_type } => {
            emit(commands::get_stats(&state, media_type), json, |summary| {
                println!("This month: {}", summary.monthly);
                println!("Total:      {}", summary.total);
                println!("High risk:  {}", summary.high_risk);
            })?;
        }
        Commands::Export { id, out, format } => {
            let formats = if format.is_empty() {
                ExportFormat::both()
            } else {
                format
            };
            let response = commands::export_report(&state, &id, out.as_deref(), &formats).await;
            emit(response, json, |paths| {
                for path in paths {
                    println!("Wrote {}", path.display());
                }
            })?;
        }
        Commands::Config { action } => {
            let response = match action {
                ConfigAction::Show => commands::get_settings(&state).await,
                ConfigAction::SetDemo { enabled } => {
                    let update = SettingsUpdate {
                        demo_mode: Some(enabled),
                        ..Default::default()
                    };
                    commands::update_settings(&state, update).await
                }
                ConfigAction::SetKey { provider, key } => {
                    let update = match provider {
                        KeySlot::Primary => SettingsUpdate {
                            primary_api_key: Some(key),
                            ..Default::default()
                        },
                        KeySlot::Secondary => SettingsUpdate {
                            secondary_api_key: Some(key),
                            ..Default::default()
                        },
                    };
                    commands::update_settings(&state, update).await
                }
                ConfigAction::SetTimeout { seconds } => {
                    let update = SettingsUpdate {
                        provider_timeout_secs: Some(seconds),
                        ..Default::default()
                    };
                    commands::update_settings(&state, update).await
                }
                ConfigAction::SetExportDir { dir } => {
                    let update = SettingsUpdate {
                        export_dir: Some(dir),
                        ..Default::default()
                    };
                    commands::update_settings(&state, update).await
                }
            };
            emit(response, json, |config| {
                match serde_json::to_string_pretty(config) {
                    Ok(text) => println!("{}", text),
                    Err(e) => eprintln!("failed to render config: {}", e),
                }
            })?;
        }
    }

    Ok(())
}
