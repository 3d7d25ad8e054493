mod commands;
mod http;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use serde_json::Value;
use std::process;

use commands::schedule::ScheduleArgs;
use commands::verify::VerifyArgs;

/// Recompute and verify loan amortization schedules
#[derive(Parser)]
#[command(
    name = "lpv",
    version,
    about = "Recompute and verify loan amortization schedules",
    long_about = "Independently recomputes the expected amortization schedule for an \
                  annuity loan with decimal precision, and checks a loan service's \
                  generated repayment plan against it field by field."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the expected amortization schedule locally
    Schedule(ScheduleArgs),
    /// Fetch a loan service's plan and verify it against the recomputed schedule
    Verify(VerifyArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result: Result<Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Schedule(args) => commands::schedule::run_schedule(args),
        Commands::Verify(args) => commands::verify::run_verify(args),
        Commands::Version => {
            println!("lpv {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            // A verification that ran to completion but found mismatches.
            if value.get("passed").and_then(Value::as_bool) == Some(false) {
                process::exit(2);
            }
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
