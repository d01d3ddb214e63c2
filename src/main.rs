//! Thicket CLI entry point.

use clap::Parser;

use thicket::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json = cli.json;

    if let Err(err) = thicket::cli::run(cli).await {
        thicket::cli::handle_error(err, json);
    }
}
