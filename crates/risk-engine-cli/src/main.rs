mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::correlation_sweep::CorrelationSweepArgs;
use commands::gbm::GbmArgs;
use commands::portfolio_risk::PortfolioRiskArgs;
use commands::var::VarArgs;

/// Monte Carlo and closed-form portfolio risk
#[derive(Parser)]
#[command(
    name = "riskmc",
    version,
    about = "Monte Carlo and closed-form portfolio risk",
    long_about = "Estimate Value-at-Risk and variance for single- and multi-asset \
                  portfolios, analytically and by seeded Monte Carlo simulation \
                  (normal or Student-t returns), and simulate GBM price paths."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Emit debug logs on stderr
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Single-asset VaR: parametric normal vs Monte Carlo percentile
    Var(VarArgs),
    /// Correlated multi-asset portfolio variance and VaR
    PortfolioRisk(PortfolioRiskArgs),
    /// Geometric Brownian Motion price paths
    Gbm(GbmArgs),
    /// Two-asset portfolio volatility across a correlation grid
    CorrelationSweep(CorrelationSweepArgs),
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

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("warning: logging already initialised");
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Var(args) => commands::var::run_var(args),
        Commands::PortfolioRisk(args) => commands::portfolio_risk::run_portfolio_risk(args),
        Commands::Gbm(args) => commands::gbm::run_gbm(args),
        Commands::CorrelationSweep(args) => {
            commands::correlation_sweep::run_correlation_sweep(args)
        }
        Commands::Version => {
            println!("riskmc {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
