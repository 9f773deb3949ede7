//! The ledger capability consumed by the rollup command.

use std::collections::HashMap;

use slingshot_core::ChainEpoch;

use crate::types::{MarketDealJson, TipSet, TipSetKey};
use crate::Result;

/// The subset of the full-node API the rollup needs.
#[async_trait::async_trait]
pub trait LedgerApi: Send + Sync {
    async fn chain_head(&self) -> Result<TipSet>;

    async fn chain_get_tipset(&self, key: &TipSetKey) -> Result<TipSet>;

    /// Tipset at `height`, walking back from the tipset identified by `anchor`.
    async fn chain_get_tipset_by_height(&self, height: ChainEpoch, anchor: &TipSetKey) -> Result<TipSet>;

    /// Every deal in the market actor state at `key`, keyed by deal id.
    async fn state_market_deals(&self, key: &TipSetKey) -> Result<HashMap<String, MarketDealJson>>;

    /// Account-key address that `address` resolves to at `key`.
    async fn state_account_key(&self, address: &str, key: &TipSetKey) -> Result<String>;
}
