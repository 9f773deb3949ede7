//! One rollup pass over a market snapshot.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use slingshot_core::{ChainEpoch, DealId, MarketDeal, ParticipantId, RecoveryType, WalletId};
use tracing::{debug, info, warn};

use crate::classifier::{self, Exclusion, Membership, Verdict};
use crate::config::RollupConfig;
use crate::payload::PayloadCid;
use crate::registry::{ParticipantRegistry, RecoveryRegistry, WalletResolver};
use crate::sequencer;
use crate::stats::{Aggregator, DealListEntry, GlobalTotals, ParticipantStats, RecoveredDeal};
use crate::RollupError;

/// Market state keyed by deal id, as returned by the ledger.
pub type DealSnapshot = HashMap<DealId, MarketDeal>;

/// Where every observed deal ended up. Recovery is tracked on its own since
/// it does not end a deal's path through the totals chain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClassificationSummary {
    pub observed: usize,
    pub not_live: usize,
    pub unresolvable: usize,
    pub recovered: usize,
    pub excluded_wallet: usize,
    pub no_participant: usize,
    pub before_phase: usize,
    pub too_short: usize,
    pub piece_capped: usize,
    pub counted: usize,
}

impl ClassificationSummary {
    fn exclude(&mut self, reason: Exclusion) {
        let slot = match reason {
            Exclusion::NotLive => &mut self.not_live,
            Exclusion::Unresolvable => &mut self.unresolvable,
            Exclusion::ExcludedWallet => &mut self.excluded_wallet,
            Exclusion::NoParticipant => &mut self.no_participant,
            Exclusion::BeforePhase => &mut self.before_phase,
            Exclusion::TooShort => &mut self.too_short,
            Exclusion::PieceCapped => &mut self.piece_capped,
        };
        *slot += 1;
    }
}

/// Everything a run produces, ready for the caller to serialize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollupOutput {
    pub chain_height: ChainEpoch,
    pub totals: GlobalTotals,
    pub participants: BTreeMap<ParticipantId, ParticipantStats>,
    /// Per participant, largest deals first.
    pub deal_lists: BTreeMap<ParticipantId, Vec<DealListEntry>>,
    /// In classification order.
    pub recovered: Vec<RecoveredDeal>,
    pub summary: ClassificationSummary,
}

/// Classification and aggregation engine bound to one set of registries.
pub struct RollupEngine<'a, P: ?Sized, R: ?Sized, W: ?Sized> {
    config: RollupConfig,
    participants: &'a P,
    recovery: &'a R,
    resolver: &'a W,
}

impl<'a, P, R, W> RollupEngine<'a, P, R, W>
where
    P: ParticipantRegistry + ?Sized,
    R: RecoveryRegistry + ?Sized,
    W: WalletResolver + ?Sized,
{
    pub fn new(
        config: RollupConfig,
        participants: &'a P,
        recovery: &'a R,
        resolver: &'a W,
    ) -> Result<Self, RollupError> {
        config.validate()?;
        Ok(Self {
            config,
            participants,
            recovery,
            resolver,
        })
    }

    pub fn config(&self) -> &RollupConfig {
        &self.config
    }

    /// Classify and aggregate every deal of `snapshot` as of `chain_height`.
    ///
    /// Deterministic for a given snapshot and registries regardless of the
    /// snapshot's iteration order.
    pub fn run<'s, I>(&self, snapshot: I, chain_height: ChainEpoch) -> Result<RollupOutput, RollupError>
    where
        I: IntoIterator<Item = (&'s DealId, &'s MarketDeal)>,
    {
        if chain_height <= 0 {
            return Err(RollupError::InvalidHeight(chain_height));
        }

        let mut summary = ClassificationSummary::default();
        let deals: Vec<_> = snapshot.into_iter().collect();
        summary.observed = deals.len();

        let ordered = sequencer::order_live_deals(deals, chain_height);
        summary.not_live = summary.observed - ordered.len();

        info!(
            chain_height,
            observed = summary.observed,
            live = ordered.len(),
            phase_start = self.config.phase_start_epoch,
            "classifying deals"
        );

        let mut wallets: HashMap<&str, WalletId> = HashMap::new();
        let mut agg = Aggregator::new();

        for (deal_id, deal) in ordered {
            let client = deal.proposal.client.as_str();
            let wallet = match wallets.get(client) {
                Some(w) => w.clone(),
                None => match self.resolver.resolve(client) {
                    Ok(w) => {
                        wallets.insert(client, w.clone());
                        w
                    }
                    Err(e) => {
                        warn!(deal = %deal_id, error = %e, "skipping deal");
                        summary.exclude(Exclusion::Unresolvable);
                        continue;
                    }
                },
            };

            let payload = PayloadCid::from_label(&deal.proposal.label);

            if classifier::is_recoverable(deal, &wallet, self.recovery, &self.config) {
                agg.record_recovery(deal_id, deal, &wallet, &payload, RecoveryType::Restore);
                summary.recovered += 1;
            }

            let participant = match classifier::membership(deal, &wallet, self.participants, &self.config) {
                Membership::Participant(p) => p,
                Membership::Excluded(reason) => {
                    summary.exclude(reason);
                    continue;
                }
            };

            let seen = agg.tally_all_time(&participant, &deal.proposal.piece_cid);
            let verdict = classifier::gate(deal, seen, &self.config);
            if verdict.marks_participant() {
                agg.mark_participant(&participant);
            }

            match verdict {
                Verdict::Counted => {
                    agg.credit(&participant, &wallet, deal_id, deal, &payload);
                    summary.counted += 1;
                }
                Verdict::Excluded(reason) => {
                    if reason == Exclusion::PieceCapped {
                        debug!(
                            deal = %deal_id,
                            participant = %participant,
                            piece = %deal.proposal.piece_cid,
                            seen,
                            "piece repeat cap reached"
                        );
                    }
                    summary.exclude(reason);
                }
            }
        }

        let aggregates = agg.finalize();

        info!(
            counted = summary.counted,
            recovered = summary.recovered,
            unresolvable = summary.unresolvable,
            projects = aggregates.totals.unique_projects,
            total_bytes = aggregates.totals.total_bytes,
            "rollup complete"
        );

        Ok(RollupOutput {
            chain_height,
            totals: aggregates.totals,
            participants: aggregates.participants,
            deal_lists: aggregates.deal_lists,
            recovered: aggregates.recovered,
            summary,
        })
    }
}
