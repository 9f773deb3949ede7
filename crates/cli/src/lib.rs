//! Slingshot CLI
//!
//! The `slingshot-stats` binary: turns the storage market state of a Lotus
//! node (or a saved snapshot) into the competition rollup files.

pub mod app;
pub mod args;
pub mod output;
pub mod rollup;

pub use app::{App, AppBuilder};
pub use args::{Cli, Command, LedgerArgs, RollupArgs};
pub use output::OutputDir;

use std::path::PathBuf;

use thiserror::Error;

pub const SERVICE: &str = "slingshot-stats";

#[derive(Error, Debug)]
pub enum CliError {
    #[error("unable to proceed: supplied stat target '{0}' already exists")]
    OutputExists(PathBuf),
    #[error("failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("output encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("settings error: {0}")]
    Settings(#[from] slingshot_settings::SettingsError),
    #[error("loading sources failed: {0}")]
    Source(#[from] slingshot_sources::SourceError),
    #[error("ledger error: {0}")]
    Ledger(#[from] slingshot_lotus::LotusError),
    #[error("rollup failed: {0}")]
    Rollup(#[from] slingshot_rollup::RollupError),
}

pub type Result<T> = std::result::Result<T, CliError>;

/// Entry point shared by the binary and the integration tests.
pub async fn run(cli: Cli) -> Result<()> {
    let mut builder = AppBuilder::new(SERVICE).verbose(cli.verbose);
    if let Some(path) = &cli.config {
        builder = builder.config_path(path);
    }
    let app = builder.build()?;

    match cli.command {
        Command::Rollup(args) => {
            rollup::execute(&cli.ledger, &args, app.settings.into_config()).await?;
        }
    }
    Ok(())
}
