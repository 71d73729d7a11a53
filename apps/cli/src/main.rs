//! Civis CLI: ingest Chamber of Deputies roll-call votes into a JSON dataset.
//!
//! Fetches plenary-voted propositions and their roll calls from the
//! SitCamaraWS web service and writes motions, deputies and a roll-call index.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
