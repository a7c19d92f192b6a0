use clap::{Parser, Subcommand};

use crate::printer::TableSelector;

#[derive(Parser)]
#[command(name = "thermal-printer-bot")]
#[command(author, version, about = "Telegram bot that prints messages on an ESC/POS thermal printer", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the bot (default)
    Run,

    /// Print every byte of the given code tables to find the right CODEPAGE_ID
    CodepageTables {
        /// Table ids (`17`) or names (`USA`, `PC866`, `WPC1251`)
        #[arg(default_value = "USA")]
        codes: Vec<TableSelector>,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
