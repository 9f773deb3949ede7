use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use slingshot_lotus::TipSetRef;

#[derive(Debug, Parser)]
#[command(name = "slingshot-stats")]
#[command(version, about = "Misc tooling for https://slingshot.filecoin.io/")]
pub struct Cli {
    #[command(flatten)]
    pub ledger: LedgerArgs,

    /// Rollup settings file (JSON), which must exist. Without it
    /// `$XDG_CONFIG_HOME/slingshot-stats/settings.json` is used, created on first run.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Where market state comes from.
#[derive(Debug, Clone, Args)]
pub struct LedgerArgs {
    /// Lotus repo holding the `api` and `token` files.
    #[arg(long, env = "LOTUS_PATH", default_value = "~/.lotus", global = true)]
    pub repo: String,

    /// `token:/ip4/<host>/tcp/<port>/http` or an http(s) URL.
    #[arg(long, env = "FULLNODE_API_INFO", global = true)]
    pub api_url: Option<String>,

    /// Read market state from a saved snapshot instead of a node.
    #[arg(long, global = true)]
    pub snapshot: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Translate current lotus state into the rollups understood by https://slingshot.filecoin.io/
    Rollup(RollupArgs),
}

#[derive(Debug, Clone, Args)]
pub struct RollupArgs {
    /// Non-existent directory to write results to.
    pub out_dir: PathBuf,

    /// Source (URL or file) of currently registered projects.
    pub project_list: String,

    /// Source (URL or file) of recovery-list clients.
    pub restore_list: String,

    /// Tipset as comma separated cids, `@<height>` or `@head`
    /// [default: epoch_lookback epochs behind head]
    #[arg(long)]
    pub tipset: Option<TipSetRef>,

    /// Overrides the configured phase start when > 0.
    #[arg(long)]
    pub phasestart_epoch: Option<i64>,
}
