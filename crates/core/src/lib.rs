//! Slingshot Core
//!
//! Ledger types, identifiers, and errors shared by the rollup engine and its
//! I/O collaborators.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

pub use cid::Cid;
pub use fvm_shared::address::{Address, Protocol};

use fvm_shared::address::Network;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid address '{0}': {1}")]
    InvalidAddress(String, String),
    #[error("invalid cid '{0}': {1}")]
    InvalidCid(String, String),
    #[error("unknown recovery type {0}")]
    UnknownRecoveryType(u8),
}

/// Ledger height, in epochs.
pub type ChainEpoch = i64;

/// Epochs per day at a 30 second block time.
pub const EPOCHS_IN_DAY: ChainEpoch = 2880;

/// Number of epochs spanning `days` days.
pub const fn days(days: i64) -> ChainEpoch {
    EPOCHS_IN_DAY * days
}

/// Opaque deal identifier as keyed in the market state. Usually a decimal string.
pub type DealId = String;

/// Registered participant (project) identifier.
pub type ParticipantId = String;

/// Parse a Filecoin address written for either network. `f1..` and `t1..`
/// spellings of the same key yield equal addresses.
pub fn parse_address(s: &str) -> Result<Address, CoreError> {
    Network::Mainnet
        .parse_address(s)
        .or_else(|_| Network::Testnet.parse_address(s))
        .map_err(|e| CoreError::InvalidAddress(s.to_string(), e.to_string()))
}

pub fn parse_cid(s: &str) -> Result<Cid, CoreError> {
    Cid::try_from(s).map_err(|e| CoreError::InvalidCid(s.to_string(), e.to_string()))
}

/// Resolved identity of a deal client.
///
/// Compares by address payload, so the network prefix it was written with
/// does not matter. Displays with the mainnet `f` prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WalletId(Address);

impl WalletId {
    pub fn address(&self) -> &Address {
        &self.0
    }

    /// Secp256k1 and BLS addresses are account keys; ID and actor
    /// addresses still need resolving.
    pub fn is_account_key(&self) -> bool {
        matches!(self.0.protocol(), Protocol::Secp256k1 | Protocol::BLS)
    }
}

impl From<Address> for WalletId {
    fn from(address: Address) -> Self {
        Self(address)
    }
}

impl Ord for WalletId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.to_bytes().cmp(&other.0.to_bytes())
    }
}

impl PartialOrd for WalletId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for WalletId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for WalletId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_address(s.trim()).map(Self)
    }
}

impl TryFrom<String> for WalletId {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<WalletId> for String {
    fn from(id: WalletId) -> Self {
        id.to_string()
    }
}

/// Storage deal terms agreed between a client and a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DealProposal {
    pub piece_cid: Cid,
    /// Padded piece size in bytes.
    pub piece_size: u64,
    pub verified_deal: bool,
    /// On-chain client handle; usually an ID address that must be resolved.
    pub client: String,
    pub provider: Address,
    /// Arbitrary client chosen label, often the payload CID.
    pub label: String,
    pub start_epoch: ChainEpoch,
    pub end_epoch: ChainEpoch,
}

impl DealProposal {
    pub fn duration(&self) -> ChainEpoch {
        self.end_epoch - self.start_epoch
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DealState {
    pub sector_start_epoch: ChainEpoch, // -1 if not yet included in proven sector
    pub last_updated_epoch: ChainEpoch, // -1 if deal state never updated
    pub slash_epoch: ChainEpoch,        // -1 if deal never slashed
}

impl Default for DealState {
    fn default() -> Self {
        Self {
            sector_start_epoch: -1,
            last_updated_epoch: -1,
            slash_epoch: -1,
        }
    }
}

/// One entry of the market state: proposal plus on-chain progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketDeal {
    pub proposal: DealProposal,
    pub state: DealState,
}

/// Why a deal made it onto the recovery list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum RecoveryType {
    Restore = 1,
    Repair = 2,
}

impl RecoveryType {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Restore),
            2 => Some(Self::Repair),
            _ => None,
        }
    }
}

impl TryFrom<u8> for RecoveryType {
    type Error = CoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_u8(value).ok_or(CoreError::UnknownRecoveryType(value))
    }
}

impl From<RecoveryType> for u8 {
    fn from(t: RecoveryType) -> Self {
        t as u8
    }
}
