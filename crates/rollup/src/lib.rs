//! Slingshot Rollup
//!
//! Classifies every live storage deal of a market snapshot and folds the
//! qualifying ones into global, per-participant and per-wallet statistics.
//! A second, independent predicate extracts deals for the recovery list.
//!
//! The engine does no I/O: the snapshot, registries and wallet resolutions
//! are supplied by the caller, and the results come back as plain values.

pub mod classifier;
pub mod config;
pub mod engine;
pub mod payload;
pub mod registry;
pub mod sequencer;
pub mod stats;

pub use classifier::{Exclusion, Membership, Verdict};
pub use config::RollupConfig;
pub use engine::{ClassificationSummary, DealSnapshot, RollupEngine, RollupOutput};
pub use payload::{PayloadCid, UNKNOWN_PAYLOAD};
pub use registry::{
    ParticipantRegistry, ProjectRegistry, RecoveryList, RecoveryRegistry, ResolveError,
    StaticResolver, WalletResolver,
};
pub use stats::{DealListEntry, GlobalTotals, ParticipantStats, RecoveredDeal, WalletStats};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RollupError {
    #[error("invalid rollup config: {0}")]
    InvalidConfig(String),
    #[error("chain height {0} is not a valid snapshot height")]
    InvalidHeight(i64),
}
