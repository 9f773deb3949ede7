//! Payload CID recovery from the free-form deal label.

use cid::Cid;
use tracing::trace;

/// Placeholder emitted when the label does not decode to a CID.
pub const UNKNOWN_PAYLOAD: &str = "unknown";

/// Payload CID carried in a deal label, in two textual forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadCid {
    /// The CID as the client wrote it (v0 stays base58btc).
    pub original: String,
    /// The same codec and multihash re-encoded as CIDv1 (base32).
    pub base32: String,
}

impl PayloadCid {
    pub fn from_label(label: &str) -> Self {
        match Cid::try_from(label) {
            Ok(c) => Self {
                original: c.to_string(),
                base32: Cid::new_v1(c.codec(), *c.hash()).to_string(),
            },
            Err(e) => {
                trace!(label, error = %e, "label is not a payload cid");
                Self::unknown()
            }
        }
    }

    pub fn unknown() -> Self {
        Self {
            original: UNKNOWN_PAYLOAD.to_string(),
            base32: UNKNOWN_PAYLOAD.to_string(),
        }
    }

    pub fn is_known(&self) -> bool {
        self.original != UNKNOWN_PAYLOAD
    }
}
