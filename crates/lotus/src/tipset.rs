//! Choosing the tipset a rollup is computed at.

use std::fmt;
use std::str::FromStr;

use slingshot_core::ChainEpoch;
use tracing::info;

use crate::api::LedgerApi;
use crate::types::{CidRef, TipSet, TipSetKey};
use crate::{LotusError, Result};

/// User-supplied tipset: `@head`, `@<height>`, or comma separated block CIDs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TipSetRef {
    Head,
    Height(ChainEpoch),
    Key(Vec<String>),
}

impl FromStr for TipSetRef {
    type Err = LotusError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some(height) = s.strip_prefix('@') {
            if height == "head" {
                return Ok(Self::Head);
            }
            return height
                .parse::<ChainEpoch>()
                .ok()
                .filter(|h| *h >= 0)
                .map(Self::Height)
                .ok_or_else(|| LotusError::InvalidTipSetRef(s.to_string()));
        }
        let cids: Vec<String> = s
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(String::from)
            .collect();
        if cids.is_empty() {
            return Err(LotusError::InvalidTipSetRef(s.to_string()));
        }
        Ok(Self::Key(cids))
    }
}

impl fmt::Display for TipSetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Head => f.write_str("@head"),
            Self::Height(h) => write!(f, "@{h}"),
            Self::Key(cids) => f.write_str(&cids.join(",")),
        }
    }
}

/// Resolve the tipset to snapshot. Without an explicit reference, take the
/// tipset `lookback` epochs behind head so the state is settled.
pub async fn snapshot_tipset<A>(api: &A, tipset: Option<&TipSetRef>, lookback: ChainEpoch) -> Result<TipSet>
where
    A: LedgerApi + ?Sized,
{
    let ts = match tipset {
        None => {
            let head = api.chain_head().await?;
            api.chain_get_tipset_by_height(head.height - lookback, &head.key())
                .await?
        }
        Some(TipSetRef::Head) => api.chain_head().await?,
        Some(TipSetRef::Height(height)) => {
            let head = api.chain_head().await?;
            api.chain_get_tipset_by_height(*height, &head.key()).await?
        }
        Some(TipSetRef::Key(cids)) => {
            let key = TipSetKey(cids.iter().map(|c| CidRef::from(c.as_str())).collect());
            api.chain_get_tipset(&key).await?
        }
    };
    info!(height = ts.height, "selected snapshot tipset");
    Ok(ts)
}
