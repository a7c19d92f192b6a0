use bot::BotService;
use cli::{Cli, Commands};
use config::{AppConfig, LogConfig, PrinterConfig};
use error::BotResult;
use state::AppState;

extern crate pretty_env_logger;
#[macro_use]
extern crate log;
#[macro_use]
extern crate rust_i18n;

i18n!("locales", fallback = "en");

mod bot;
mod cli;
mod command;
mod config;
mod error;
mod format;
mod handler;
mod logging;
mod printer;
mod service;
mod state;

#[cfg(test)]
mod tests;

#[tokio::main]
async fn main() -> BotResult<()> {
    let cli = Cli::parse_args();

    // The logger needs LOG_* from .env, and config warnings need the logger.
    let dotenv = config::load_dotenv();
    logging::init(&LogConfig::from_env()?)?;
    match dotenv {
        Ok(Some(path)) => info!("Loaded environment from {}", path.display()),
        Ok(None) => info!("No .env file found, using process environment"),
        Err(e) => warn!("Failed to read .env file: {}", e),
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run().await,
        Commands::CodepageTables { codes } => {
            let config = PrinterConfig::from_env().inspect_err(|e| error!("Invalid printer configuration: {}", e))?;
            printer::print_codepage_tables(&config, &codes)?;
            Ok(())
        }
    }
}

async fn run() -> BotResult<()> {
    info!("Starting thermal printer bot...");

    let config = AppConfig::from_env().inspect_err(|e| error!("Invalid configuration: {}", e))?;
    let printer = printer::connect(&config.printer)?;
    let state = AppState::new(config, printer);

    let bot_service = BotService::new(state)?;
    info!("Bot instance created");

    bot_service.start().await.map_err(|e| anyhow::anyhow!(e))?;

    Ok(())
}
