//! Aggregated statistics and the aggregator that builds them.
//!
//! Accumulation is one set insert or counter bump per deal. Everything that
//! depends on the complete pass (cardinalities, per-participant maxima, deal
//! list order) is derived once in [`Aggregator::finalize`].

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use slingshot_core::{Address, ChainEpoch, Cid, DealId, MarketDeal, ParticipantId, RecoveryType, WalletId};

use crate::payload::PayloadCid;
use crate::sequencer;

/// Program-wide totals over every counted deal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalTotals {
    #[serde(rename = "total_unique_cids")]
    pub unique_cids: usize,
    #[serde(rename = "total_unique_providers")]
    pub unique_providers: usize,
    #[serde(rename = "total_unique_projects")]
    pub unique_projects: usize,
    #[serde(rename = "total_unique_clients")]
    pub unique_clients: usize,
    #[serde(rename = "total_num_deals")]
    pub total_deals: usize,
    #[serde(rename = "total_stored_data_size")]
    pub total_bytes: u64,
    #[serde(rename = "filplus_total_num_deals")]
    pub verified_deals: usize,
    #[serde(rename = "filplus_total_stored_data_size")]
    pub verified_bytes: u64,

    #[serde(skip)]
    seen_projects: HashSet<ParticipantId>,
    #[serde(skip)]
    seen_clients: HashSet<WalletId>,
    #[serde(skip)]
    seen_providers: HashSet<Address>,
    #[serde(skip)]
    seen_piece_cids: HashSet<Cid>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantStats {
    pub project_id: ParticipantId,
    #[serde(rename = "max_data_size_stored_with_single_provider")]
    pub max_bytes_single_provider: u64,
    #[serde(rename = "max_same_cid_deals")]
    pub max_same_piece_deals: usize,
    pub total_data_size: u64,
    pub total_num_cids: usize,
    pub total_num_deals: usize,
    pub total_num_providers: usize,
    pub clients: BTreeMap<String, WalletStats>,

    #[serde(skip)]
    bytes_per_provider: HashMap<Address, u64>,
    #[serde(skip)]
    times_seen_piece: HashMap<Cid, usize>,
    #[serde(skip)]
    times_seen_piece_all_time: HashMap<Cid, usize>,
}

impl ParticipantStats {
    fn new(project_id: ParticipantId) -> Self {
        Self {
            project_id,
            ..Default::default()
        }
    }

    /// How many deals for `piece_cid` this participant had in the whole
    /// observed history, counted or not.
    pub fn all_time_piece_count(&self, piece_cid: &Cid) -> usize {
        self.times_seen_piece_all_time.get(piece_cid).copied().unwrap_or(0)
    }

    /// How many counted deals carried `piece_cid`.
    pub fn counted_piece_count(&self, piece_cid: &Cid) -> usize {
        self.times_seen_piece.get(piece_cid).copied().unwrap_or(0)
    }

    fn finalize(&mut self) {
        self.total_num_cids = self.times_seen_piece.len();
        self.total_num_providers = self.bytes_per_provider.len();
        self.max_same_piece_deals = self.times_seen_piece.values().copied().max().unwrap_or(0);
        self.max_bytes_single_provider =
            self.bytes_per_provider.values().copied().max().unwrap_or(0);
        for wallet in self.clients.values_mut() {
            wallet.finalize();
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletStats {
    pub client: String,
    pub total_data_size: u64,
    pub total_num_cids: usize,
    pub total_num_deals: usize,
    pub total_num_providers: usize,

    #[serde(skip)]
    providers: HashSet<Address>,
    #[serde(skip)]
    piece_cids: HashSet<Cid>,
}

impl WalletStats {
    fn finalize(&mut self) {
        self.total_num_cids = self.piece_cids.len();
        self.total_num_providers = self.providers.len();
    }
}

/// One counted deal as listed for its participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DealListEntry {
    pub project_id: ParticipantId,
    pub client: String,
    pub deal_id: DealId,
    /// Sector activation epoch.
    pub deal_start_epoch: ChainEpoch,
    pub miner_id: String,
    pub payload_cid: String,
    pub data_size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveredDeal {
    pub deal_id: DealId,
    pub client_address: String,
    pub miner_id: String,
    pub piece_cid: String,
    pub label: String,
    /// CIDv1 form of the label, or `unknown`.
    pub payload_cid: String,
    pub padded_piece_size: u64,
    pub data_size: u64,
    pub deal_start_epoch: ChainEpoch,
    pub deal_end_epoch: ChainEpoch,
    pub recovery: RecoveryType,
}

/// Accumulates classified deals for one run.
#[derive(Debug, Default)]
pub struct Aggregator {
    totals: GlobalTotals,
    participants: BTreeMap<ParticipantId, ParticipantStats>,
    deal_lists: BTreeMap<ParticipantId, Vec<DealListEntry>>,
    recovered: Vec<RecoveredDeal>,
}

/// Finalized aggregator contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregates {
    pub totals: GlobalTotals,
    pub participants: BTreeMap<ParticipantId, ParticipantStats>,
    pub deal_lists: BTreeMap<ParticipantId, Vec<DealListEntry>>,
    pub recovered: Vec<RecoveredDeal>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_recovery(
        &mut self,
        deal_id: &DealId,
        deal: &MarketDeal,
        wallet: &WalletId,
        payload: &PayloadCid,
        recovery: RecoveryType,
    ) {
        let proposal = &deal.proposal;
        self.recovered.push(RecoveredDeal {
            deal_id: deal_id.clone(),
            client_address: wallet.to_string(),
            miner_id: proposal.provider.to_string(),
            piece_cid: proposal.piece_cid.to_string(),
            label: proposal.label.clone(),
            payload_cid: payload.base32.clone(),
            padded_piece_size: proposal.piece_size,
            data_size: proposal.piece_size,
            deal_start_epoch: proposal.start_epoch,
            deal_end_epoch: proposal.end_epoch,
            recovery,
        });
    }

    /// Bump the participant's all-time count for `piece_cid` and return the
    /// new value. Creates the participant entry on first sight.
    pub fn tally_all_time(&mut self, participant: &ParticipantId, piece_cid: &Cid) -> usize {
        let entry = self
            .participants
            .entry(participant.clone())
            .or_insert_with(|| ParticipantStats::new(participant.clone()));
        let seen = entry
            .times_seen_piece_all_time
            .entry(*piece_cid)
            .or_insert(0);
        *seen += 1;
        *seen
    }

    /// Mark the participant as active in the current phase.
    pub fn mark_participant(&mut self, participant: &ParticipantId) {
        if !self.totals.seen_projects.contains(participant) {
            self.totals.seen_projects.insert(participant.clone());
        }
    }

    /// Credit a counted deal to every statistic level.
    pub fn credit(
        &mut self,
        participant: &ParticipantId,
        wallet: &WalletId,
        deal_id: &DealId,
        deal: &MarketDeal,
        payload: &PayloadCid,
    ) {
        let proposal = &deal.proposal;
        let size = proposal.piece_size;

        let totals = &mut self.totals;
        totals.seen_clients.insert(wallet.clone());
        totals.seen_providers.insert(proposal.provider);
        totals.seen_piece_cids.insert(proposal.piece_cid);
        totals.total_bytes += size;
        totals.total_deals += 1;
        if proposal.verified_deal {
            totals.verified_deals += 1;
            totals.verified_bytes += size;
        }

        let project = self
            .participants
            .entry(participant.clone())
            .or_insert_with(|| ParticipantStats::new(participant.clone()));
        project.total_data_size += size;
        project.total_num_deals += 1;
        *project
            .bytes_per_provider
            .entry(proposal.provider)
            .or_insert(0) += size;
        *project
            .times_seen_piece
            .entry(proposal.piece_cid)
            .or_insert(0) += 1;

        let client = project
            .clients
            .entry(wallet.to_string())
            .or_insert_with(|| WalletStats {
                client: wallet.to_string(),
                ..Default::default()
            });
        client.total_data_size += size;
        client.total_num_deals += 1;
        client.providers.insert(proposal.provider);
        client.piece_cids.insert(proposal.piece_cid);

        self.deal_lists
            .entry(participant.clone())
            .or_default()
            .push(DealListEntry {
                project_id: participant.clone(),
                client: wallet.to_string(),
                deal_id: deal_id.clone(),
                deal_start_epoch: deal.state.sector_start_epoch,
                miner_id: proposal.provider.to_string(),
                payload_cid: payload.original.clone(),
                data_size: size,
            });
    }

    /// Derive the whole-pass summaries. Must run after the last deal.
    pub fn finalize(mut self) -> Aggregates {
        let totals = &mut self.totals;
        totals.unique_cids = totals.seen_piece_cids.len();
        totals.unique_clients = totals.seen_clients.len();
        totals.unique_providers = totals.seen_providers.len();
        totals.unique_projects = totals.seen_projects.len();

        for stats in self.participants.values_mut() {
            stats.finalize();
        }
        for list in self.deal_lists.values_mut() {
            sequencer::sort_deal_list(list);
        }

        Aggregates {
            totals: self.totals,
            participants: self.participants,
            deal_lists: self.deal_lists,
            recovered: self.recovered,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cid::multihash::Multihash;
    use slingshot_core::{parse_address, DealProposal, DealState};

    const WALLET_A: &str = "f1hdh5of5kujpspb4f54ewcarzj75l4yvrlnmu3aa";
    const WALLET_B: &str = "f1zfdvtvhn5foog5ouzuwo2g4thz26rugd736p5vq";

    fn piece(n: u8) -> Cid {
        Cid::new_v1(0xf101, Multihash::wrap(0x1012, &[n; 32]).unwrap())
    }

    fn deal(provider: &str, piece_cid: Cid, size: u64, verified: bool) -> MarketDeal {
        MarketDeal {
            proposal: DealProposal {
                piece_cid,
                piece_size: size,
                verified_deal: verified,
                client: "f01000".into(),
                provider: parse_address(provider).unwrap(),
                label: String::new(),
                start_epoch: 10,
                end_epoch: 2_000_000,
            },
            state: DealState {
                sector_start_epoch: 10,
                last_updated_epoch: -1,
                slash_epoch: -1,
            },
        }
    }

    fn wallet(s: &str) -> WalletId {
        s.parse().unwrap()
    }

    #[test]
    fn test_finalize_derives_summaries() {
        let mut agg = Aggregator::new();
        let p = "proj".to_string();
        let unknown = PayloadCid::unknown();

        let deals = [
            ("1", wallet(WALLET_A), deal("f0100", piece(1), 100, true)),
            ("2", wallet(WALLET_A), deal("f0100", piece(1), 100, false)),
            ("3", wallet(WALLET_B), deal("f0200", piece(2), 300, false)),
        ];
        for (id, w, d) in &deals {
            agg.tally_all_time(&p, &d.proposal.piece_cid);
            agg.mark_participant(&p);
            agg.credit(&p, w, &id.to_string(), d, &unknown);
        }

        let out = agg.finalize();
        assert_eq!(out.totals.total_deals, 3);
        assert_eq!(out.totals.total_bytes, 500);
        assert_eq!(out.totals.verified_deals, 1);
        assert_eq!(out.totals.verified_bytes, 100);
        assert_eq!(out.totals.unique_cids, 2);
        assert_eq!(out.totals.unique_providers, 2);
        assert_eq!(out.totals.unique_clients, 2);
        assert_eq!(out.totals.unique_projects, 1);

        let stats = &out.participants["proj"];
        assert_eq!(stats.total_data_size, 500);
        assert_eq!(stats.total_num_deals, 3);
        assert_eq!(stats.total_num_cids, 2);
        assert_eq!(stats.total_num_providers, 2);
        assert_eq!(stats.max_bytes_single_provider, 300);
        assert_eq!(stats.max_same_piece_deals, 2);
        assert_eq!(stats.all_time_piece_count(&piece(1)), 2);

        let a = &stats.clients[WALLET_A];
        assert_eq!(a.total_num_deals, 2);
        assert_eq!(a.total_num_cids, 1);
        assert_eq!(a.total_num_providers, 1);

        let ids: Vec<&str> = out.deal_lists["proj"].iter().map(|e| e.deal_id.as_str()).collect();
        assert_eq!(ids, vec!["3", "1", "2"]);
    }

    #[test]
    fn test_piece_identity_ignores_encoding() {
        let mut agg = Aggregator::new();
        let p = "proj".to_string();
        let base32 = slingshot_core::parse_cid(
            "baga6ea4seaqc24iwik3snmceafrhzkp3vqzplsctb6yzapge3mbclbyxsineqai",
        )
        .unwrap();
        let base58 =
            slingshot_core::parse_cid("zz5p6wDPnxpxgcZJoJjfE6JcK858aFUxGGYXyMqYXfhLwdgc4Ka8g").unwrap();

        for (id, cid) in [("1", base32), ("2", base58)] {
            agg.tally_all_time(&p, &cid);
            agg.mark_participant(&p);
            agg.credit(&p, &wallet(WALLET_A), &id.to_string(), &deal("f0100", cid, 64, false), &PayloadCid::unknown());
        }

        let out = agg.finalize();
        assert_eq!(out.totals.unique_cids, 1);
        assert_eq!(out.participants["proj"].max_same_piece_deals, 2);
        assert_eq!(out.participants["proj"].all_time_piece_count(&base32), 2);
    }

    #[test]
    fn test_tally_creates_empty_entry() {
        let mut agg = Aggregator::new();
        let p = "quiet".to_string();
        assert_eq!(agg.tally_all_time(&p, &piece(7)), 1);
        assert_eq!(agg.tally_all_time(&p, &piece(7)), 2);

        let out = agg.finalize();
        let stats = &out.participants["quiet"];
        assert_eq!(stats.total_num_deals, 0);
        assert_eq!(stats.max_same_piece_deals, 0);
        assert_eq!(stats.all_time_piece_count(&piece(7)), 2);
        assert!(!out.deal_lists.contains_key("quiet"));
        assert_eq!(out.totals.unique_projects, 0);
    }

    #[test]
    fn test_stats_json_field_names() {
        let mut agg = Aggregator::new();
        let p = "proj".to_string();
        agg.tally_all_time(&p, &piece(3));
        agg.mark_participant(&p);
        agg.credit(
            &p,
            &wallet(WALLET_A),
            &"7".to_string(),
            &deal("f0100", piece(3), 64, true),
            &PayloadCid::unknown(),
        );
        let out = agg.finalize();

        let totals = serde_json::to_value(&out.totals).unwrap();
        assert_eq!(totals["total_num_deals"], 1);
        assert_eq!(totals["filplus_total_stored_data_size"], 64);
        assert!(totals.get("seen_projects").is_none());

        let stats = serde_json::to_value(&out.participants["proj"]).unwrap();
        assert_eq!(stats["max_data_size_stored_with_single_provider"], 64);
        assert_eq!(stats["max_same_cid_deals"], 1);
        assert_eq!(stats["clients"][WALLET_A]["total_num_cids"], 1);
        assert_eq!(out.deal_lists["proj"][0].miner_id, "f0100");
    }
}
