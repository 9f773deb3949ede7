//! Deterministic ordering of the snapshot.
//!
//! The market state arrives as an unordered map, so every tie has to be
//! broken explicitly or repeated runs would emit different totals.

use std::cmp::Ordering;

use slingshot_core::{ChainEpoch, DealId, DealState, MarketDeal};

use crate::stats::DealListEntry;

/// A deal counts only once its sector has started, on or before `chain_height`,
/// and was never terminated. A zero start is treated as uninitialized.
pub fn is_live(state: &DealState, chain_height: ChainEpoch) -> bool {
    state.sector_start_epoch > 0
        && state.sector_start_epoch <= chain_height
        && state.slash_epoch < 0
}

/// Numeric sort key of a deal id. Ids that are not decimal integers sort as 0.
pub fn numeric_id(id: &str) -> i64 {
    id.parse().unwrap_or(0)
}

/// Classification order: sector start, then proposal start, then numeric id.
/// The raw id breaks the remaining ties between unparseable ids.
pub fn compare(a: (&DealId, &MarketDeal), b: (&DealId, &MarketDeal)) -> Ordering {
    let (id_a, deal_a) = a;
    let (id_b, deal_b) = b;
    deal_a
        .state
        .sector_start_epoch
        .cmp(&deal_b.state.sector_start_epoch)
        .then(deal_a.proposal.start_epoch.cmp(&deal_b.proposal.start_epoch))
        .then(numeric_id(id_a).cmp(&numeric_id(id_b)))
        .then_with(|| id_a.cmp(id_b))
}

/// Drop deals that are not live at `chain_height` and order the rest.
pub fn order_live_deals<'a, I>(deals: I, chain_height: ChainEpoch) -> Vec<(&'a DealId, &'a MarketDeal)>
where
    I: IntoIterator<Item = (&'a DealId, &'a MarketDeal)>,
{
    let mut ordered: Vec<_> = deals
        .into_iter()
        .filter(|(_, deal)| is_live(&deal.state, chain_height))
        .collect();
    ordered.sort_by(|a, b| compare(*a, *b));
    ordered
}

/// Largest deals first. Stable, so equal sizes keep classification order.
pub fn sort_deal_list(list: &mut [DealListEntry]) {
    list.sort_by(|a, b| b.data_size.cmp(&a.data_size));
}

#[cfg(test)]
mod tests {
    use super::*;
    use slingshot_core::{parse_address, parse_cid, DealProposal};

    fn deal(sector_start: ChainEpoch, start: ChainEpoch, slash: ChainEpoch) -> MarketDeal {
        MarketDeal {
            proposal: DealProposal {
                piece_cid: parse_cid("baga6ea4seaqdpkhoyhhbs2d5cmx6fecr3stctule4lcjlc5bihk7iez2gpygqdy").unwrap(),
                piece_size: 1 << 30,
                verified_deal: false,
                client: "f01000".into(),
                provider: parse_address("f02000").unwrap(),
                label: String::new(),
                start_epoch: start,
                end_epoch: start + 1_000_000,
            },
            state: DealState {
                sector_start_epoch: sector_start,
                last_updated_epoch: -1,
                slash_epoch: slash,
            },
        }
    }

    #[test]
    fn test_is_live() {
        assert!(is_live(&deal(100, 90, -1).state, 100));
        assert!(is_live(&deal(1, 1, -1).state, 100));
        assert!(!is_live(&deal(0, 90, -1).state, 100));
        assert!(!is_live(&deal(-1, 90, -1).state, 100));
        assert!(!is_live(&deal(101, 90, -1).state, 100));
        assert!(!is_live(&deal(50, 40, 0).state, 100));
        assert!(!is_live(&deal(50, 40, 70).state, 100));
    }

    #[test]
    fn test_numeric_id() {
        assert_eq!(numeric_id("12345"), 12345);
        assert_eq!(numeric_id("abc"), 0);
        assert_eq!(numeric_id(""), 0);
    }

    #[test]
    fn test_order_live_deals() {
        let deals = vec![
            ("9".to_string(), deal(20, 10, -1)),
            ("10".to_string(), deal(20, 10, -1)),
            ("3".to_string(), deal(20, 5, -1)),
            ("1".to_string(), deal(30, 1, -1)),
            ("2".to_string(), deal(10, 9, -1)),
            ("4".to_string(), deal(10, 9, 15)),
            ("5".to_string(), deal(999, 9, -1)),
        ];
        let ordered = order_live_deals(deals.iter().map(|(id, d)| (id, d)), 100);
        let ids: Vec<&str> = ordered.iter().map(|(id, _)| id.as_str()).collect();
        // numeric, not lexicographic: 9 before 10
        assert_eq!(ids, vec!["2", "3", "9", "10", "1"]);
    }

    #[test]
    fn test_unparseable_ids_sort_as_zero() {
        let deals = vec![
            ("7".to_string(), deal(20, 10, -1)),
            ("x-b".to_string(), deal(20, 10, -1)),
            ("x-a".to_string(), deal(20, 10, -1)),
        ];
        let ordered = order_live_deals(deals.iter().map(|(id, d)| (id, d)), 100);
        let ids: Vec<&str> = ordered.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["x-a", "x-b", "7"]);
    }

    #[test]
    fn test_sort_deal_list_is_stable() {
        let entry = |id: &str, size: u64| DealListEntry {
            project_id: "p".into(),
            client: "f1hdh5of5kujpspb4f54ewcarzj75l4yvrlnmu3aa".into(),
            deal_id: id.into(),
            deal_start_epoch: 1,
            miner_id: "f02000".into(),
            payload_cid: "unknown".into(),
            data_size: size,
        };
        let mut list = vec![entry("a", 10), entry("b", 30), entry("c", 10), entry("d", 30)];
        sort_deal_list(&mut list);
        let ids: Vec<&str> = list.iter().map(|e| e.deal_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "d", "a", "c"]);
    }
}
