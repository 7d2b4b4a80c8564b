mod api;
mod comments;
mod fetch;
mod media;
mod pipeline;
mod report;
mod server;
mod store;
mod transcribe;
mod vision;

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use account_insight::config::AnalyzerConfig;
use account_insight::{format_number, AnalysisMode};

use crate::pipeline::{run_analysis, Clients, PipelineOptions};

#[derive(Parser)]
#[command(name = "account-insight", about = "Short-video account analysis pipeline")]
struct Cli {
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    Analyze(AnalyzeArgs),
    Serve(ServeArgs),
}

#[derive(Args, Debug, Clone)]
struct AnalyzeArgs {
    /// Account handle or profile URL to analyze
    account: String,
    /// Competitor handles for the comparison table
    #[arg(long)]
    competitor: Vec<String>,
    /// Analysis mode: success, improve, concept, competitive, or new
    #[arg(long, default_value = "success")]
    mode: String,
    /// Skip transcription even when an API key is configured
    #[arg(long)]
    no_transcribe: bool,
    #[arg(long)]
    visual: bool,
    #[arg(long)]
    comments: bool,
    #[arg(long)]
    save: bool,
    /// Extra context passed to the report prompt
    #[arg(long)]
    supplement: Option<String>,
}

#[derive(Args, Debug, Clone)]
struct ServeArgs {
    #[arg(long, default_value = "127.0.0.1")]
    host: String,
    #[arg(long, default_value_t = 8787)]
    port: u16,
}

#[tokio::main]
async fn main() {
    load_dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    let cli = Cli::parse();
    let config = AnalyzerConfig::load(cli.config)?;

    match cli.command {
        Command::Analyze(args) => run_analyze(config, args).await,
        Command::Serve(args) => server::serve(config, args.host, args.port).await,
    }
}

async fn run_analyze(config: AnalyzerConfig, args: AnalyzeArgs) -> Result<(), String> {
    let mode = AnalysisMode::from_str(&args.mode)
        .ok_or_else(|| format!("invalid analysis mode: {}", args.mode))?;

    let options = PipelineOptions {
        account: args.account,
        competitors: args.competitor,
        mode,
        transcribe: !args.no_transcribe,
        visual: args.visual,
        comments: args.comments,
        save: args.save,
        supplement: args.supplement,
    };

    let clients = Clients::from_env(&config);
    let progress = |stage: &str, message: &str| {
        eprintln!("[{}] {}", stage, message);
    };

    let outcome = run_analysis(&config, &clients, &options, &progress).await?;

    println!("Account: @{} ({})", outcome.username, mode.label());
    if let Some(profile) = &outcome.profile {
        if let Some(followers) = &profile.followers {
            println!("Followers: {}", followers.display());
        }
    }
    println!();

    println!("Rank | Views | Likes | Comments | Date | Title");
    for row in &outcome.table {
        println!(
            "{:>4} | {:>10} | {:>8} | {:>8} | {:>10} | {}",
            row.rank,
            format_number(row.view_count as f64),
            format_number(row.like_count as f64),
            format_number(row.comment_count as f64),
            if row.upload_date.is_empty() {
                "-"
            } else {
                row.upload_date.as_str()
            },
            row.title
        );
    }

    println!("\n{}", outcome.sample_overview);

    if !outcome.trend_text.is_empty() {
        println!("\n{}", outcome.trend_text);
    }
    if !outcome.comparison_text.is_empty() {
        println!("\n{}", outcome.comparison_text);
    }

    if let Some(report) = &outcome.report {
        println!("\n---\n\n{}", report);
    }
    if let Some(path) = &outcome.saved_path {
        println!("\nSaved rows to {}", path.display());
    }

    if !outcome.warnings.is_empty() {
        eprintln!();
        for warning in &outcome.warnings {
            eprintln!("Warning: {}", warning);
        }
    }

    Ok(())
}

fn load_dotenv() {
    let _ = dotenvy::dotenv();
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let manifest_path = Path::new(manifest_dir).join(".env");
    let _ = dotenvy::from_path(manifest_path);
}
