//! Restore-client list: `{ "payload": ["f1...", "f3..."] }`.

use std::path::Path;

use serde::Deserialize;
use slingshot_core::WalletId;
use slingshot_rollup::RecoveryList;
use tracing::info;

use crate::fetch::{fetch_source, save_copy};
use crate::Result;

pub const RESTORE_LIST_COPY: &str = "restore_client_list.json";

#[derive(Debug, Deserialize)]
struct RestoreList {
    payload: Vec<WalletId>,
}

pub fn parse_restore_list(bytes: &[u8]) -> Result<RecoveryList> {
    let list: RestoreList = serde_json::from_slice(bytes)?;
    let recovery: RecoveryList = list.payload.into_iter().collect();
    info!(wallets = recovery.len(), "loaded restore list");
    Ok(recovery)
}

/// Fetch, copy into `save_to_dir`, and parse the restore list.
pub async fn load_restore_list(source_name: &str, save_to_dir: &Path) -> Result<RecoveryList> {
    let bytes = fetch_source(source_name).await?;
    save_copy(save_to_dir, RESTORE_LIST_COPY, &bytes)?;
    parse_restore_list(&bytes)
}
