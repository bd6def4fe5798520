mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing::debug;

use commands::allocation::AllocateArgs;
use commands::cash_flow::CashFlowArgs;

/// Real-estate pre-sales cash-flow schedules
#[derive(Parser)]
#[command(
    name = "presales",
    version,
    about = "Real-estate pre-sales cash-flow schedules",
    long_about = "Assigns sale months to a list of units from a monthly absorption rate, \
                  derives reservation installments and a lump-sum disbursement per unit, \
                  and aggregates everything into a month-by-month cash-flow table."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log progress to stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the monthly cash-flow table for a unit list
    CashFlow(CashFlowArgs),
    /// Assign sale months only
    Allocate(AllocateArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
    Chart,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::CashFlow(args) => commands::cash_flow::run_cash_flow(args),
        Commands::Allocate(args) => commands::allocation::run_allocate(args),
        Commands::Version => {
            println!("presales {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            debug!(format = ?cli.output, "Rendering output");
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}

/// Initialise the `tracing` subscriber on stderr.
///
/// `RUST_LOG` wins over `-v`; `PRESALES_LOG_JSON` switches to JSON lines.
fn init_logging(verbosity: u8) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = match verbosity {
        0 => "presales=warn",
        1 => "presales=info",
        _ => "presales=debug",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    if std::env::var("PRESALES_LOG_JSON").is_ok() {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_target(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_target(true)
            .init();
    }
}
