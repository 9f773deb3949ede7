//! Lotus JSON wire types and their conversion into core types.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use slingshot_core::{
    parse_address, parse_cid, ChainEpoch, CoreError, DealProposal, DealState, MarketDeal,
};
use slingshot_rollup::DealSnapshot;

use crate::{LotusError, Result};

/// IPLD link form of a CID: `{"/": "bafy..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CidRef {
    #[serde(rename = "/")]
    pub cid: String,
}

impl From<&str> for CidRef {
    fn from(cid: &str) -> Self {
        Self { cid: cid.to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TipSetKey(pub Vec<CidRef>);

impl TipSetKey {
    /// The empty key, meaning chain head to the node.
    pub fn head() -> Self {
        Self(Vec::new())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TipSet {
    #[serde(rename = "Cids")]
    pub cids: Vec<CidRef>,
    #[serde(rename = "Height")]
    pub height: ChainEpoch,
}

impl TipSet {
    pub fn key(&self) -> TipSetKey {
        TipSetKey(self.cids.clone())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarketDealJson {
    #[serde(rename = "Proposal")]
    pub proposal: DealProposalJson,
    #[serde(rename = "State")]
    pub state: DealStateJson,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DealProposalJson {
    #[serde(rename = "PieceCID")]
    pub piece_cid: CidRef,
    pub piece_size: u64,
    pub verified_deal: bool,
    pub client: String,
    pub provider: String,
    #[serde(default)]
    pub label: String,
    pub start_epoch: ChainEpoch,
    pub end_epoch: ChainEpoch,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DealStateJson {
    pub sector_start_epoch: ChainEpoch,
    pub last_updated_epoch: ChainEpoch,
    pub slash_epoch: ChainEpoch,
}

impl TryFrom<MarketDealJson> for MarketDeal {
    type Error = CoreError;

    fn try_from(d: MarketDealJson) -> std::result::Result<Self, Self::Error> {
        Ok(MarketDeal {
            proposal: DealProposal {
                piece_cid: parse_cid(&d.proposal.piece_cid.cid)?,
                piece_size: d.proposal.piece_size,
                verified_deal: d.proposal.verified_deal,
                client: d.proposal.client,
                provider: parse_address(&d.proposal.provider)?,
                label: d.proposal.label,
                start_epoch: d.proposal.start_epoch,
                end_epoch: d.proposal.end_epoch,
            },
            state: DealState {
                sector_start_epoch: d.state.sector_start_epoch,
                last_updated_epoch: d.state.last_updated_epoch,
                slash_epoch: d.state.slash_epoch,
            },
        })
    }
}

/// Convert the node's deal map. A deal with a malformed piece CID or provider
/// fails the whole snapshot.
pub fn into_snapshot(deals: HashMap<String, MarketDealJson>) -> Result<DealSnapshot> {
    deals
        .into_iter()
        .map(|(id, d)| match MarketDeal::try_from(d) {
            Ok(deal) => Ok((id, deal)),
            Err(source) => Err(LotusError::InvalidDeal { deal: id, source }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEAL: &str = r#"{
        "Proposal": {
            "PieceCID": {"/": "baga6ea4seaqao7s73y24kcutaosvacpdjgfe5pw76ooefnyqw4ynr3d2y6x2mpq"},
            "PieceSize": 34359738368,
            "VerifiedDeal": true,
            "Client": "f01234",
            "Provider": "f05678",
            "Label": "bafybeigdyrzt5sfp7udm7hu76uh7y26nf3efuylqabf3oclgtqy55fbzdi",
            "StartEpoch": 1700000,
            "EndEpoch": 3250000,
            "StoragePricePerEpoch": "0",
            "ProviderCollateral": "4366474813614736",
            "ClientCollateral": "0"
        },
        "State": {"SectorStartEpoch": 1690000, "LastUpdatedEpoch": -1, "SlashEpoch": -1}
    }"#;

    #[test]
    fn test_market_deal_conversion() {
        let json: MarketDealJson = serde_json::from_str(DEAL).unwrap();
        let deal = MarketDeal::try_from(json).unwrap();
        assert_eq!(
            deal.proposal.piece_cid.to_string(),
            "baga6ea4seaqao7s73y24kcutaosvacpdjgfe5pw76ooefnyqw4ynr3d2y6x2mpq"
        );
        assert_eq!(deal.proposal.provider.to_string(), "f05678");
        assert_eq!(deal.proposal.piece_size, 34_359_738_368);
        assert!(deal.proposal.verified_deal);
        assert_eq!(deal.proposal.duration(), 1_550_000);
        assert_eq!(deal.state.sector_start_epoch, 1_690_000);
        assert_eq!(deal.state.slash_epoch, -1);
    }

    #[test]
    fn test_tipset_key_wire_form() {
        let ts: TipSet =
            serde_json::from_str(r#"{"Cids": [{"/": "bafy2a"}, {"/": "bafy2b"}], "Blocks": [], "Height": 42}"#)
                .unwrap();
        assert_eq!(ts.height, 42);
        let key = serde_json::to_string(&ts.key()).unwrap();
        assert_eq!(key, r#"[{"/":"bafy2a"},{"/":"bafy2b"}]"#);
        assert_eq!(serde_json::to_string(&TipSetKey::head()).unwrap(), "[]");
    }

    #[test]
    fn test_malformed_deal_fails_snapshot() {
        let good: MarketDealJson = serde_json::from_str(DEAL).unwrap();
        let mut bad_piece = good.clone();
        bad_piece.proposal.piece_cid = CidRef::from("baga-not-a-cid");
        let mut bad_provider = good.clone();
        bad_provider.proposal.provider = "miner-7".into();

        let ok = into_snapshot(HashMap::from([("1".to_string(), good.clone())])).unwrap();
        assert_eq!(ok.len(), 1);

        for bad in [bad_piece, bad_provider] {
            let deals = HashMap::from([("1".to_string(), good.clone()), ("2".to_string(), bad)]);
            match into_snapshot(deals) {
                Err(LotusError::InvalidDeal { deal, .. }) => assert_eq!(deal, "2"),
                other => panic!("expected invalid deal, got {other:?}"),
            }
        }
    }
}
