mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use simple_logger::SimpleLogger;
use std::process;

use commands::analyze::AnalyzeArgs;
use commands::loan::LoanArgs;

/// Rental cash-flow and yield analysis
#[derive(Parser)]
#[command(
    name = "rentroi",
    version,
    about = "Rental cash-flow and yield analysis",
    long_about = "Turns an estimated monthly rent and a purchase price into a full \
                  cash-flow statement with decimal precision: mortgage payment, \
                  operating costs, net cash flow, cash-on-cash return, gross yield \
                  and an investment verdict."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log request handling to stderr
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyse rent and, with a purchase price, the investment cash flow
    Analyze(AnalyzeArgs),
    /// Monthly payment and lifetime totals for a fixed-rate loan
    Payment(LoanArgs),
    /// Yearly amortization schedule for a fixed-rate loan
    Amortize(LoanArgs),
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
    let cli = Cli::parse();

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    if let Err(e) = SimpleLogger::new().with_level(level).init() {
        eprintln!("{}: logger unavailable: {}", "warning".yellow().bold(), e);
    }

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Analyze(args) => commands::analyze::run_analyze(args),
        Commands::Payment(args) => commands::loan::run_payment(args),
        Commands::Amortize(args) => commands::loan::run_amortize(args),
        Commands::Version => {
            println!("rentroi {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            log::debug!("command failed: {e:?}");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
