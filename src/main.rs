mod application;
mod domain;
mod infrastructure;
mod presentation;

use crate::infrastructure::config::{app_dir, JsonConfigStore};
use crate::infrastructure::http_client::HyperHttpClient;
use crate::infrastructure::logging::init_tracing;
use crate::infrastructure::output::ConsoleSink;
use crate::infrastructure::persistence::ArtifactStore;
use crate::presentation::cli::{AppContext, Cli};
use clap::Parser;
use colored::Colorize;
use std::sync::Arc;

/// reqsmith: build curl commands from saved settings, or run them.
///
/// Settings live in `~/.reqsmith/config.json` (or `$REQSMITH_HOME`). Each run
/// either renders the equivalent curl command line or executes the request
/// and prints the response.
#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli).await {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{}", format!("Error: {:#}", err).red());
            std::process::exit(1);
        }
    }
}

async fn run(cli: &Cli) -> anyhow::Result<i32> {
    let dir = app_dir()?;
    let store = JsonConfigStore::in_dir(&dir);
    let artifacts = ArtifactStore::new(&dir);
    let ctx = AppContext {
        store: &store,
        artifacts: &artifacts,
        sink: &ConsoleSink,
        transport: Arc::new(HyperHttpClient::new()),
    };
    cli.run(&ctx).await
}
