//! Client handle pre-resolution.
//!
//! The engine is synchronous, so every distinct client of the live deals is
//! resolved against the ledger up front. Failures are kept and surface as
//! per-deal skips inside the engine.

use std::collections::{BTreeSet, HashMap};

use slingshot_core::{ChainEpoch, WalletId};
use slingshot_rollup::sequencer::is_live;
use slingshot_rollup::{DealSnapshot, ResolveError, WalletResolver};
use tracing::{info, warn};

use crate::api::LedgerApi;
use crate::types::TipSetKey;

/// Outcome of resolving each client handle once, at one tipset.
#[derive(Debug, Clone, Default)]
pub struct ResolvedWallets {
    resolved: HashMap<String, std::result::Result<WalletId, String>>,
}

impl ResolvedWallets {
    pub fn len(&self) -> usize {
        self.resolved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }

    pub fn failures(&self) -> usize {
        self.resolved.values().filter(|r| r.is_err()).count()
    }
}

impl WalletResolver for ResolvedWallets {
    fn resolve(&self, client: &str) -> std::result::Result<WalletId, ResolveError> {
        match self.resolved.get(client) {
            Some(Ok(wallet)) => Ok(wallet.clone()),
            Some(Err(reason)) => Err(ResolveError::unresolvable(client, reason.clone())),
            None => Err(ResolveError::unresolvable(client, "not pre-resolved")),
        }
    }
}

/// Resolve the clients of every deal live at `chain_height`.
pub async fn resolve_clients<A>(
    api: &A,
    snapshot: &DealSnapshot,
    chain_height: ChainEpoch,
    key: &TipSetKey,
) -> ResolvedWallets
where
    A: LedgerApi + ?Sized,
{
    let clients: BTreeSet<&str> = snapshot
        .values()
        .filter(|d| is_live(&d.state, chain_height))
        .map(|d| d.proposal.client.as_str())
        .collect();

    info!(clients = clients.len(), "resolving client wallets");

    let mut resolved = HashMap::with_capacity(clients.len());
    for client in clients {
        let outcome = match api.state_account_key(client, key).await {
            Ok(addr) => addr.parse::<WalletId>().map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };
        if let Err(reason) = &outcome {
            warn!(client, error = %reason, "client resolution failed");
        }
        resolved.insert(client.to_string(), outcome);
    }

    let wallets = ResolvedWallets { resolved };
    info!(
        resolved = wallets.len() - wallets.failures(),
        failed = wallets.failures(),
        "client wallets resolved"
    );
    wallets
}
