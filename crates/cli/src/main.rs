use clap::Parser;
use tracing::error;

use slingshot_cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = slingshot_cli::run(cli).await {
        error!("{e}");
        std::process::exit(1);
    }
}
