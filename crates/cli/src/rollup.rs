//! The `rollup` command.

use slingshot_lotus::{
    resolve_clients, snapshot_tipset, types::into_snapshot, ApiInfo, LedgerApi, LotusRpcClient,
    SnapshotLedger,
};
use slingshot_rollup::{RollupConfig, RollupEngine, RollupOutput};
use slingshot_settings::expand_path;
use slingshot_sources::{load_project_list, load_restore_list};
use tracing::info;

use crate::args::{LedgerArgs, RollupArgs};
use crate::output::OutputDir;
use crate::Result;

/// Open the configured ledger: a snapshot file when given, else a Lotus node.
pub fn connect(ledger: &LedgerArgs) -> Result<Box<dyn LedgerApi>> {
    if let Some(path) = &ledger.snapshot {
        info!(snapshot = %path.display(), "using offline market snapshot");
        return Ok(Box::new(SnapshotLedger::load(path)?));
    }
    let info = ApiInfo::discover(ledger.api_url.as_deref(), &expand_path(&ledger.repo))?;
    let client = LotusRpcClient::new(info)?;
    info!(url = client.url(), "connected to lotus");
    Ok(Box::new(client))
}

/// Run one rollup and write its files into `args.out_dir`.
pub async fn execute(ledger: &LedgerArgs, args: &RollupArgs, config: RollupConfig) -> Result<RollupOutput> {
    let config = config.with_phase_start(args.phasestart_epoch.unwrap_or(0));
    config.validate()?;

    let out = OutputDir::create(&args.out_dir)?;

    let projects =
        load_project_list(&args.project_list, out.path(), &config.excluded_datasets).await?;
    let restore = load_restore_list(&args.restore_list, out.path()).await?;

    let api = connect(ledger)?;
    let ts = snapshot_tipset(api.as_ref(), args.tipset.as_ref(), config.epoch_lookback).await?;
    let deals = into_snapshot(api.state_market_deals(&ts.key()).await?)?;
    info!(height = ts.height, deals = deals.len(), "market state loaded");

    let wallets = resolve_clients(api.as_ref(), &deals, ts.height, &ts.key()).await;

    let engine = RollupEngine::new(config, &projects, &restore, &wallets)?;
    let output = engine.run(&deals, ts.height)?;
    info!(summary = ?output.summary, "classification summary");

    out.write_rollup(&output)?;
    Ok(output)
}
