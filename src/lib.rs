pub mod cli;
pub mod core;
pub mod providers;

use crate::core::config::AppConfig;
use crate::core::{RatesProvider, TerminalClipboard};
use anyhow::Result;
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, info};

pub enum AppCommand {
    Browse { date: Option<NaiveDate> },
    Show { date: Option<NaiveDate> },
    Copy { code: String, date: Option<NaiveDate> },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("nbprates starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let provider: Arc<dyn RatesProvider> =
        Arc::new(providers::NbpProvider::from_config(&config.providers.nbp));
    let today = cli::browse::today();

    match command {
        AppCommand::Browse { date } => {
            cli::browse::run(
                provider,
                Arc::new(TerminalClipboard::new()),
                &config.ui,
                date.unwrap_or(today),
            )
            .await
        }
        AppCommand::Show { date } => {
            let output = cli::show::show(provider, date.unwrap_or(today)).await?;
            println!("{output}");
            Ok(())
        }
        AppCommand::Copy { code, date } => {
            let output = cli::show::copy(
                provider,
                Arc::new(TerminalClipboard::new()),
                &config.ui,
                date.unwrap_or(today),
                &code,
            )
            .await?;
            println!("{output}");
            Ok(())
        }
    }
}
