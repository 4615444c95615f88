use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use nbprates::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for nbprates::AppCommand {
    fn from(cmd: Commands) -> nbprates::AppCommand {
        match cmd {
            Commands::Browse { date } => nbprates::AppCommand::Browse { date },
            Commands::Show { date } => nbprates::AppCommand::Show { date },
            Commands::Copy { code, date } => nbprates::AppCommand::Copy { code, date },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Browse rates interactively (default)
    Browse {
        /// Date to start from, YYYY-MM-DD (defaults to today)
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },
    /// Print the rate table for a date
    Show {
        /// Date of the table, YYYY-MM-DD (defaults to today)
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },
    /// Copy the rate of one currency to the clipboard
    Copy {
        /// Three-letter currency code, e.g. EUR
        code: String,
        /// Date of the table, YYYY-MM-DD (defaults to today)
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let command = cli.command.unwrap_or(Commands::Browse { date: None });
    let result = match command {
        Commands::Setup => nbprates::cli::setup::setup(),
        cmd => nbprates::run_command(cmd.into(), cli.config_path.as_deref()).await,
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
