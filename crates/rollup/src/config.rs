//! Per-run thresholds and exclusion sets.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use slingshot_core::{days, ChainEpoch, WalletId};

use crate::RollupError;

/// Start of the current incentive phase (Fri Mar 11 18:00:00 UTC 2022).
pub const DEFAULT_PHASE_START: ChainEpoch = 1_623_840;
/// Start of the recovery track (Fri Dec 17 18:00:00 UTC 2021).
pub const DEFAULT_RECOVERY_START: ChainEpoch = 1_381_920;
/// How many epochs behind head the default snapshot is taken.
pub const DEFAULT_EPOCH_LOOKBACK: ChainEpoch = 10;

/// Everything the engine needs to know about one rollup run.
///
/// Replaces what used to be mutable process-wide knobs, so two runs with
/// different thresholds can coexist in one process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RollupConfig {
    /// Deals whose sector started before this epoch only feed the all-time tally.
    pub phase_start_epoch: ChainEpoch,
    pub recovery_start_epoch: ChainEpoch,
    pub epoch_lookback: ChainEpoch,
    /// Minimum proposal duration, in days, for a deal to be counted.
    pub min_deal_days: i64,
    /// Recovery deals must last strictly longer than this many days.
    pub recovery_min_days: i64,
    /// A participant is credited for the same piece at most `max_piece_repeats - 1` times.
    pub max_piece_repeats: usize,
    /// Wallets kept out of totals once their sector starts at or after `recovery_start_epoch`.
    pub excluded_wallets: BTreeSet<WalletId>,
    /// Dataset tags that disqualify a participant.
    pub excluded_datasets: BTreeSet<String>,
}

impl Default for RollupConfig {
    fn default() -> Self {
        let mut excluded_wallets = BTreeSet::new();
        if let Ok(wallet) = "f17ia7m5mvizrdug3sqtevqw3tifiqvxqr3kdaeuq".parse() {
            excluded_wallets.insert(wallet);
        }
        Self {
            phase_start_epoch: DEFAULT_PHASE_START,
            recovery_start_epoch: DEFAULT_RECOVERY_START,
            epoch_lookback: DEFAULT_EPOCH_LOOKBACK,
            min_deal_days: 360,
            recovery_min_days: 499,
            max_piece_repeats: 10,
            excluded_wallets,
            excluded_datasets: BTreeSet::from(["landsat-8".to_string()]),
        }
    }
}

impl RollupConfig {
    pub fn min_deal_duration(&self) -> ChainEpoch {
        days(self.min_deal_days)
    }

    pub fn recovery_min_duration(&self) -> ChainEpoch {
        days(self.recovery_min_days)
    }

    /// Override the phase start; non-positive values leave it untouched.
    pub fn with_phase_start(mut self, epoch: ChainEpoch) -> Self {
        if epoch > 0 {
            self.phase_start_epoch = epoch;
        }
        self
    }

    pub fn validate(&self) -> Result<(), RollupError> {
        if self.phase_start_epoch <= 0 {
            return Err(RollupError::InvalidConfig(format!(
                "phase_start_epoch must be positive, got {}",
                self.phase_start_epoch
            )));
        }
        if self.recovery_start_epoch <= 0 {
            return Err(RollupError::InvalidConfig(format!(
                "recovery_start_epoch must be positive, got {}",
                self.recovery_start_epoch
            )));
        }
        if self.epoch_lookback < 0 {
            return Err(RollupError::InvalidConfig(format!(
                "epoch_lookback must not be negative, got {}",
                self.epoch_lookback
            )));
        }
        if self.min_deal_days < 0 || self.recovery_min_days < 0 {
            return Err(RollupError::InvalidConfig(
                "deal duration thresholds must not be negative".into(),
            ));
        }
        if self.max_piece_repeats == 0 {
            return Err(RollupError::InvalidConfig(
                "max_piece_repeats must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
