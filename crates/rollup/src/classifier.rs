//! Per-deal eligibility decisions.
//!
//! Two predicates run against every live deal: the recovery predicate and the
//! totals chain. They do not short-circuit each other, so a deal can land on
//! the recovery list and still be excluded from totals, or the reverse.

use slingshot_core::{MarketDeal, ParticipantId, WalletId};

use crate::config::RollupConfig;
use crate::registry::{ParticipantRegistry, RecoveryRegistry};

/// Why a deal did not contribute to totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Exclusion {
    NotLive,
    Unresolvable,
    ExcludedWallet,
    NoParticipant,
    BeforePhase,
    TooShort,
    PieceCapped,
}

impl Exclusion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotLive => "not_live",
            Self::Unresolvable => "unresolvable",
            Self::ExcludedWallet => "excluded_wallet",
            Self::NoParticipant => "no_participant",
            Self::BeforePhase => "before_phase",
            Self::TooShort => "too_short",
            Self::PieceCapped => "piece_capped",
        }
    }
}

/// Outcome of the membership stage of the totals chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Membership {
    Participant(ParticipantId),
    Excluded(Exclusion),
}

/// Outcome of the gates that follow the all-time tally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Counted,
    Excluded(Exclusion),
}

impl Verdict {
    /// Whether the deal makes its participant count as active this phase.
    /// True for capped deals as well: the cap limits credit, not activity.
    pub fn marks_participant(&self) -> bool {
        matches!(
            self,
            Self::Counted | Self::Excluded(Exclusion::PieceCapped)
        )
    }
}

/// Recovery track: restore-listed wallet, sector started on or after the
/// recovery start, and a proposal lasting strictly longer than the minimum.
pub fn is_recoverable<R>(
    deal: &MarketDeal,
    wallet: &WalletId,
    recovery: &R,
    config: &RollupConfig,
) -> bool
where
    R: RecoveryRegistry + ?Sized,
{
    recovery.contains(wallet)
        && deal.state.sector_start_epoch >= config.recovery_start_epoch
        && deal.proposal.duration() > config.recovery_min_duration()
}

/// Totals chain up to the tally: per-run wallet exclusion, then registry
/// membership of a participant that is not disqualified.
pub fn membership<P>(
    deal: &MarketDeal,
    wallet: &WalletId,
    participants: &P,
    config: &RollupConfig,
) -> Membership
where
    P: ParticipantRegistry + ?Sized,
{
    if config.excluded_wallets.contains(wallet)
        && deal.state.sector_start_epoch >= config.recovery_start_epoch
    {
        return Membership::Excluded(Exclusion::ExcludedWallet);
    }

    match participants.lookup(wallet) {
        Some(participant) if !participants.is_disqualified(&participant) => {
            Membership::Participant(participant)
        }
        _ => Membership::Excluded(Exclusion::NoParticipant),
    }
}

/// Totals chain after the tally. `times_seen` is the participant's all-time
/// count for this piece, including the current deal.
pub fn gate(deal: &MarketDeal, times_seen: usize, config: &RollupConfig) -> Verdict {
    if deal.state.sector_start_epoch < config.phase_start_epoch {
        return Verdict::Excluded(Exclusion::BeforePhase);
    }
    if deal.proposal.duration() < config.min_deal_duration() {
        return Verdict::Excluded(Exclusion::TooShort);
    }
    if times_seen >= config.max_piece_repeats {
        return Verdict::Excluded(Exclusion::PieceCapped);
    }
    Verdict::Counted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{ProjectRegistry, RecoveryList};
    use slingshot_core::{days, parse_address, parse_cid, DealProposal, DealState};
    use std::collections::BTreeSet;

    const PHASE: i64 = 1_623_840;
    const RECOVERY: i64 = 1_381_920;

    fn deal(sector_start: i64, duration: i64) -> MarketDeal {
        MarketDeal {
            proposal: DealProposal {
                piece_cid: parse_cid("baga6ea4seaqdii22fric4oiz2pyav5o2xod4wwfo6rlgweddd4vf3okjkdv76pi").unwrap(),
                piece_size: 34_359_738_368,
                verified_deal: true,
                client: "f01000".into(),
                provider: parse_address("f02000").unwrap(),
                label: String::new(),
                start_epoch: sector_start,
                end_epoch: sector_start + duration,
            },
            state: DealState {
                sector_start_epoch: sector_start,
                last_updated_epoch: -1,
                slash_epoch: -1,
            },
        }
    }

    fn wallet(s: &str) -> WalletId {
        s.parse().unwrap()
    }

    #[test]
    fn test_recovery_duration_is_strict() {
        let cfg = RollupConfig::default();
        let list: RecoveryList = [wallet("f1xh7gjfvi46kpbjq7mwxln2zqszbnx27kyhjiy4i")].into_iter().collect();

        assert!(!is_recoverable(&deal(RECOVERY, days(499)), &wallet("f1xh7gjfvi46kpbjq7mwxln2zqszbnx27kyhjiy4i"), &list, &cfg));
        assert!(is_recoverable(&deal(RECOVERY, days(499) + 1), &wallet("f1xh7gjfvi46kpbjq7mwxln2zqszbnx27kyhjiy4i"), &list, &cfg));
        assert!(!is_recoverable(&deal(RECOVERY - 1, days(540)), &wallet("f1xh7gjfvi46kpbjq7mwxln2zqszbnx27kyhjiy4i"), &list, &cfg));
        assert!(!is_recoverable(&deal(RECOVERY, days(540)), &wallet("f1xibvmyu5unsak2labzpewekltkr33y4g3kq2fny"), &list, &cfg));
    }

    #[test]
    fn test_membership() {
        let cfg = RollupConfig::default();
        let mut reg = ProjectRegistry::new(BTreeSet::from(["landsat-8".to_string()]));
        reg.register(wallet("f1hdh5of5kujpspb4f54ewcarzj75l4yvrlnmu3aa"), "proj-a".into(), ["gaia"]);
        reg.register(wallet("f1zfdvtvhn5foog5ouzuwo2g4thz26rugd736p5vq"), "proj-b".into(), ["landsat-8"]);

        assert_eq!(
            membership(&deal(PHASE, days(400)), &wallet("f1hdh5of5kujpspb4f54ewcarzj75l4yvrlnmu3aa"), &reg, &cfg),
            Membership::Participant("proj-a".into())
        );
        assert_eq!(
            membership(&deal(PHASE, days(400)), &wallet("f1zfdvtvhn5foog5ouzuwo2g4thz26rugd736p5vq"), &reg, &cfg),
            Membership::Excluded(Exclusion::NoParticipant)
        );
        assert_eq!(
            membership(&deal(PHASE, days(400)), &wallet("f14egxegrirzhnmeusnm2vr4cy5jslo2dihxin4kq"), &reg, &cfg),
            Membership::Excluded(Exclusion::NoParticipant)
        );
    }

    #[test]
    fn test_excluded_wallet_only_after_recovery_start() {
        let mut cfg = RollupConfig::default();
        cfg.excluded_wallets = BTreeSet::from([wallet("f1hdh5of5kujpspb4f54ewcarzj75l4yvrlnmu3aa")]);
        let mut reg = ProjectRegistry::new(BTreeSet::new());
        reg.register(wallet("f1hdh5of5kujpspb4f54ewcarzj75l4yvrlnmu3aa"), "proj-a".into(), Vec::<String>::new());

        assert_eq!(
            membership(&deal(RECOVERY, days(400)), &wallet("f1hdh5of5kujpspb4f54ewcarzj75l4yvrlnmu3aa"), &reg, &cfg),
            Membership::Excluded(Exclusion::ExcludedWallet)
        );
        assert_eq!(
            membership(&deal(RECOVERY - 1, days(400)), &wallet("f1hdh5of5kujpspb4f54ewcarzj75l4yvrlnmu3aa"), &reg, &cfg),
            Membership::Participant("proj-a".into())
        );
    }

    #[test]
    fn test_gate_boundaries_are_inclusive() {
        let cfg = RollupConfig::default();
        assert_eq!(gate(&deal(PHASE, days(360)), 1, &cfg), Verdict::Counted);
        assert_eq!(
            gate(&deal(PHASE - 1, days(360)), 1, &cfg),
            Verdict::Excluded(Exclusion::BeforePhase)
        );
        assert_eq!(
            gate(&deal(PHASE, days(360) - 1), 1, &cfg),
            Verdict::Excluded(Exclusion::TooShort)
        );
    }

    #[test]
    fn test_gate_piece_cap() {
        let cfg = RollupConfig::default();
        assert_eq!(gate(&deal(PHASE, days(400)), 9, &cfg), Verdict::Counted);
        let capped = gate(&deal(PHASE, days(400)), 10, &cfg);
        assert_eq!(capped, Verdict::Excluded(Exclusion::PieceCapped));
        assert!(capped.marks_participant());
        assert!(!Verdict::Excluded(Exclusion::TooShort).marks_participant());
    }
}
