//! Capabilities the engine consumes: participant lookup, recovery membership
//! and client-handle resolution. In-memory implementations live here too.

use std::collections::{BTreeSet, HashMap, HashSet};

use slingshot_core::{ParticipantId, WalletId};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("failed to resolve id '{client}' to wallet address: {reason}")]
    Unresolvable { client: String, reason: String },
}

impl ResolveError {
    pub fn unresolvable(client: &str, reason: impl Into<String>) -> Self {
        Self::Unresolvable {
            client: client.to_string(),
            reason: reason.into(),
        }
    }
}

/// Maps a wallet to the participant it is registered under.
pub trait ParticipantRegistry {
    fn lookup(&self, wallet: &WalletId) -> Option<ParticipantId>;
    fn is_disqualified(&self, participant: &ParticipantId) -> bool;
}

/// Wallets eligible for the recovery track.
pub trait RecoveryRegistry {
    fn contains(&self, wallet: &WalletId) -> bool;
}

/// Resolves an on-chain client handle to its canonical wallet, as of the
/// snapshot being rolled up.
pub trait WalletResolver {
    fn resolve(&self, client: &str) -> Result<WalletId, ResolveError>;
}

/// Participant registry built from the published project list.
#[derive(Debug, Clone, Default)]
pub struct ProjectRegistry {
    wallets: HashMap<WalletId, ParticipantId>,
    datasets: HashMap<ParticipantId, BTreeSet<String>>,
    excluded_datasets: BTreeSet<String>,
}

impl ProjectRegistry {
    pub fn new(excluded_datasets: BTreeSet<String>) -> Self {
        Self {
            excluded_datasets,
            ..Default::default()
        }
    }

    /// Register a wallet under a participant, with the dataset tags declared
    /// by that entry. Tags accumulate per participant.
    pub fn register<I, S>(&mut self, wallet: WalletId, participant: ParticipantId, datasets: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.datasets
            .entry(participant.clone())
            .or_default()
            .extend(datasets.into_iter().map(Into::into));
        self.wallets.insert(wallet, participant);
    }

    /// Number of registered wallets whose participant is not disqualified.
    pub fn eligible_wallet_count(&self) -> usize {
        self.wallets
            .values()
            .filter(|p| !self.is_disqualified(p))
            .count()
    }

    /// Disqualified participants, sorted.
    pub fn disqualified(&self) -> Vec<&ParticipantId> {
        let mut out: Vec<_> = self
            .datasets
            .keys()
            .filter(|p| self.is_disqualified(p))
            .collect();
        out.sort();
        out
    }

    pub fn len(&self) -> usize {
        self.wallets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wallets.is_empty()
    }
}

impl ParticipantRegistry for ProjectRegistry {
    fn lookup(&self, wallet: &WalletId) -> Option<ParticipantId> {
        self.wallets.get(wallet).cloned()
    }

    fn is_disqualified(&self, participant: &ParticipantId) -> bool {
        self.datasets
            .get(participant)
            .is_some_and(|tags| tags.iter().any(|t| self.excluded_datasets.contains(t)))
    }
}

/// Wallets published on the restore list.
#[derive(Debug, Clone, Default)]
pub struct RecoveryList(HashSet<WalletId>);

impl RecoveryList {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<WalletId> for RecoveryList {
    fn from_iter<T: IntoIterator<Item = WalletId>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl RecoveryRegistry for RecoveryList {
    fn contains(&self, wallet: &WalletId) -> bool {
        self.0.contains(wallet)
    }
}

/// Resolver backed by a fixed handle -> wallet table.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver(HashMap<String, WalletId>);

impl StaticResolver {
    pub fn insert(&mut self, client: impl Into<String>, wallet: WalletId) {
        self.0.insert(client.into(), wallet);
    }
}

impl FromIterator<(String, WalletId)> for StaticResolver {
    fn from_iter<T: IntoIterator<Item = (String, WalletId)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl WalletResolver for StaticResolver {
    fn resolve(&self, client: &str) -> Result<WalletId, ResolveError> {
        self.0
            .get(client)
            .cloned()
            .ok_or_else(|| ResolveError::unresolvable(client, "not in resolution table"))
    }
}

impl<R: WalletResolver + ?Sized> WalletResolver for &R {
    fn resolve(&self, client: &str) -> Result<WalletId, ResolveError> {
        (**self).resolve(client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AAA: &str = "f1hdh5of5kujpspb4f54ewcarzj75l4yvrlnmu3aa";
    const BBB: &str = "f1zfdvtvhn5foog5ouzuwo2g4thz26rugd736p5vq";
    const CCC: &str = "f14egxegrirzhnmeusnm2vr4cy5jslo2dihxin4kq";
    const BLS: &str = "f3lyi4q5m7e4mvvwsue5rkz7i3ac3mhqt6rxpgpmbsbhrf4eszv4d5fjvkz2g6nomw7tmy3kvggsc4lwkus5jq";

    fn wallet(s: &str) -> WalletId {
        s.parse().unwrap()
    }

    fn excluded() -> BTreeSet<String> {
        BTreeSet::from(["landsat-8".to_string()])
    }

    #[test]
    fn test_project_lookup() {
        let mut reg = ProjectRegistry::new(excluded());
        reg.register(wallet(AAA), "proj-a".into(), ["sentinel-2"]);
        reg.register(wallet(BBB), "proj-a".into(), Vec::<String>::new());

        assert_eq!(reg.lookup(&wallet(AAA)), Some("proj-a".to_string()));
        assert_eq!(reg.lookup(&wallet(BBB)), Some("proj-a".to_string()));
        assert_eq!(reg.lookup(&wallet(CCC)), None);
        assert!(!reg.is_disqualified(&"proj-a".to_string()));
        assert_eq!(reg.eligible_wallet_count(), 2);
    }

    #[test]
    fn test_disqualified_dataset_taints_whole_participant() {
        let mut reg = ProjectRegistry::new(excluded());
        reg.register(wallet(AAA), "proj-a".into(), ["gaia"]);
        reg.register(wallet(BBB), "proj-a".into(), ["landsat-8"]);
        reg.register(wallet(CCC), "proj-b".into(), ["Landsat-8"]);

        assert!(reg.is_disqualified(&"proj-a".to_string()));
        // exact, case-sensitive match only
        assert!(!reg.is_disqualified(&"proj-b".to_string()));
        assert_eq!(reg.eligible_wallet_count(), 1);
        assert_eq!(reg.disqualified(), vec![&"proj-a".to_string()]);
    }

    #[test]
    fn test_recovery_list() {
        let list: RecoveryList = [wallet(AAA), wallet(BLS)].into_iter().collect();
        assert!(list.contains(&wallet(BLS)));
        assert!(!list.contains(&wallet(CCC)));
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_static_resolver() {
        let mut r = StaticResolver::default();
        r.insert("f01000", wallet(AAA));
        assert_eq!(r.resolve("f01000").unwrap(), wallet(AAA));
        assert!(matches!(
            r.resolve("f01001"),
            Err(ResolveError::Unresolvable { .. })
        ));
    }

    #[test]
    fn test_lookup_ignores_network_prefix() {
        let mut reg = ProjectRegistry::new(excluded());
        reg.register(wallet(&AAA.replacen('f', "t", 1)), "proj-a".into(), ["gaia"]);
        assert_eq!(reg.lookup(&wallet(AAA)), Some("proj-a".to_string()));

        let list: RecoveryList = [wallet(BLS)].into_iter().collect();
        assert!(list.contains(&wallet(&BLS.replacen('f', "t", 1))));
    }
}
