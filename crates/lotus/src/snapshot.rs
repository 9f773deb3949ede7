//! Offline ledger backed by a saved market snapshot.
//!
//! ```json
//! { "height": 1700000,
//!   "deals": { "<deal id>": <StateMarketDeals entry>, ... },
//!   "account_keys": { "f01234": "f1..." } }
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use slingshot_core::{ChainEpoch, WalletId};

use crate::api::LedgerApi;
use crate::types::{CidRef, MarketDealJson, TipSet, TipSetKey};
use crate::{LotusError, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotFile {
    pub height: ChainEpoch,
    pub deals: HashMap<String, MarketDealJson>,
    #[serde(default)]
    pub account_keys: HashMap<String, String>,
}

/// Serves a single tipset. Account-key addresses (`f1`/`f3`) resolve to
/// themselves; other handles must appear in `account_keys`.
#[derive(Debug, Clone)]
pub struct SnapshotLedger {
    tipset: TipSet,
    snapshot: SnapshotFile,
}

impl SnapshotLedger {
    pub fn new(snapshot: SnapshotFile) -> Self {
        let tipset = TipSet {
            cids: vec![CidRef::from(format!("snapshot-{}", snapshot.height).as_str())],
            height: snapshot.height,
        };
        Self { tipset, snapshot }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|source| LotusError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(serde_json::from_slice(&bytes)?))
    }
}

#[async_trait::async_trait]
impl LedgerApi for SnapshotLedger {
    async fn chain_head(&self) -> Result<TipSet> {
        Ok(self.tipset.clone())
    }

    async fn chain_get_tipset(&self, key: &TipSetKey) -> Result<TipSet> {
        if *key != self.tipset.key() {
            return Err(LotusError::NotFound("tipset not in snapshot".into()));
        }
        Ok(self.tipset.clone())
    }

    async fn chain_get_tipset_by_height(&self, height: ChainEpoch, _anchor: &TipSetKey) -> Result<TipSet> {
        // a snapshot has no history: the lookback collapses onto its own height
        if height > self.tipset.height {
            return Err(LotusError::NotFound(format!(
                "snapshot holds height {} only, asked for {height}",
                self.tipset.height
            )));
        }
        Ok(self.tipset.clone())
    }

    async fn state_market_deals(&self, _key: &TipSetKey) -> Result<HashMap<String, MarketDealJson>> {
        Ok(self.snapshot.deals.clone())
    }

    async fn state_account_key(&self, address: &str, _key: &TipSetKey) -> Result<String> {
        if let Some(key) = self.snapshot.account_keys.get(address) {
            return Ok(key.clone());
        }
        match address.parse::<WalletId>() {
            Ok(w) if w.is_account_key() => Ok(w.to_string()),
            _ => Err(LotusError::NotFound(format!("actor not found: {address}"))),
        }
    }
}
