//! Rollup output files.
//!
//! Every file is one JSON document `{"epoch", "endpoint", "payload"}`
//! followed by a newline. Maps are ordered, so reruns over the same
//! snapshot are byte-identical.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use slingshot_core::ChainEpoch;
use slingshot_rollup::RollupOutput;
use tracing::{debug, info};

use crate::{CliError, Result};

pub const BASIC_STATS: &str = "basic_stats.json";
pub const CLIENT_STATS: &str = "client_stats.json";
pub const RECOVERY_LIST: &str = "recovery_deallist.json";

pub const ENDPOINT_TOTALS: &str = "COMPETITION_TOTALS";
pub const ENDPOINT_PROJECT_STATS: &str = "PROJECT_DEAL_STATS";
pub const ENDPOINT_DEAL_LIST: &str = "DEAL_LIST";
pub const ENDPOINT_RECOVERED: &str = "RECOVERED_DEALS_LIST";

#[derive(Serialize)]
struct Envelope<'a, T: ?Sized> {
    epoch: ChainEpoch,
    endpoint: &'a str,
    payload: &'a T,
}

/// `deals_list_<participant>.json`, with path separators neutralised.
pub fn deal_list_file_name(participant: &str) -> String {
    let safe: String = participant
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect();
    format!("deals_list_{safe}.json")
}

/// A freshly created output directory.
#[derive(Debug, Clone)]
pub struct OutputDir {
    path: PathBuf,
}

impl OutputDir {
    /// Create `path`, refusing to reuse anything that already exists.
    pub fn create(path: &Path) -> Result<Self> {
        if path.exists() {
            return Err(CliError::OutputExists(path.to_path_buf()));
        }
        fs::create_dir_all(path).map_err(|source| CliError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write<T: Serialize + ?Sized>(
        &self,
        file_name: &str,
        endpoint: &str,
        epoch: ChainEpoch,
        payload: &T,
    ) -> Result<PathBuf> {
        let path = self.path.join(file_name);
        let mut bytes = serde_json::to_vec(&Envelope {
            epoch,
            endpoint,
            payload,
        })?;
        bytes.push(b'\n');
        fs::write(&path, &bytes).map_err(|source| CliError::Write {
            path: path.clone(),
            source,
        })?;
        debug!(file = %path.display(), bytes = bytes.len(), "wrote output");
        Ok(path)
    }

    /// Write every rollup artifact of `output`.
    pub fn write_rollup(&self, output: &RollupOutput) -> Result<()> {
        let epoch = output.chain_height;

        for (participant, deals) in &output.deal_lists {
            self.write(&deal_list_file_name(participant), ENDPOINT_DEAL_LIST, epoch, deals)?;
        }
        self.write(BASIC_STATS, ENDPOINT_TOTALS, epoch, &output.totals)?;
        self.write(RECOVERY_LIST, ENDPOINT_RECOVERED, epoch, &output.recovered)?;
        self.write(CLIENT_STATS, ENDPOINT_PROJECT_STATS, epoch, &output.participants)?;

        info!(
            dir = %self.path.display(),
            deal_lists = output.deal_lists.len(),
            recovered = output.recovered.len(),
            "rollup written"
        );
        Ok(())
    }
}
