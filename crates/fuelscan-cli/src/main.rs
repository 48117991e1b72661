//! CLI application for fuel receipt extraction.

mod commands;

use std::future::Future;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{config, engines, process};

/// Fuel receipt scanner - Extract structured data from Brazilian fuel receipts
#[derive(Parser)]
#[command(name = "fuelscan")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract fields from a single receipt (PDF or image)
    Process(process::ProcessArgs),

    /// Show the OCR backend and languages available on this machine
    Engines(engines::EnginesArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    // Logs go to stderr so stdout stays machine-readable.
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config_path = cli.config.as_deref();
    block_on_detached(async {
        match cli.command {
            Commands::Process(args) => process::run(args, config_path).await,
            Commands::Engines(args) => engines::run(args, config_path).await,
            Commands::Config(args) => config::run(args, config_path).await,
        }
    })
}

/// Run `future` to completion without joining leftover blocking tasks.
///
/// A timed-out extraction keeps its `spawn_blocking` thread busy; the
/// runtime is shut down in the background so the process exits on time.
fn block_on_detached<T>(future: impl Future<Output = anyhow::Result<T>>) -> anyhow::Result<T> {
    let runtime = tokio::runtime::Runtime::new()?;
    let result = runtime.block_on(future);
    runtime.shutdown_background();
    result
}
