//! Slingshot Lotus
//!
//! Ledger access for the rollup: the [`LedgerApi`] capability, a Lotus
//! JSON-RPC implementation, an offline snapshot-file implementation, tipset
//! selection and client-wallet pre-resolution.

pub mod api;
pub mod endpoint;
pub mod rpc;
pub mod snapshot;
pub mod tipset;
pub mod types;
pub mod wallets;

pub use api::LedgerApi;
pub use endpoint::ApiInfo;
pub use rpc::LotusRpcClient;
pub use snapshot::{SnapshotFile, SnapshotLedger};
pub use tipset::{snapshot_tipset, TipSetRef};
pub use types::{CidRef, TipSet, TipSetKey};
pub use wallets::{resolve_clients, ResolvedWallets};

use std::path::PathBuf;

use slingshot_core::CoreError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LotusError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("rpc error {code} calling {method}: {message}")]
    Rpc {
        method: String,
        code: i64,
        message: String,
    },
    #[error("empty result calling {0}")]
    MissingResult(String),
    #[error("invalid tipset reference '{0}'")]
    InvalidTipSetRef(String),
    #[error("invalid api info '{0}'")]
    InvalidApiInfo(String),
    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed market deal {deal}: {source}")]
    InvalidDeal {
        deal: String,
        #[source]
        source: CoreError,
    },
    #[error("{0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, LotusError>;
