//! Slingshot Sources
//!
//! Loads the registered-project list and the restore-client list from an
//! HTTP(S) URL or a local file, keeps a verbatim copy next to the rollup
//! output, and parses them into the engine's registries.

pub mod fetch;
pub mod project_list;
pub mod restore_list;

pub use fetch::{fetch_source, is_remote, save_copy};
pub use project_list::{load_project_list, parse_project_list, PROJECT_LIST_COPY};
pub use restore_list::{load_restore_list, parse_restore_list, RESTORE_LIST_COPY};

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("non-200 response: {0}")]
    Status(u16),
    #[error("failed to open '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed list: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid entry: {0}")]
    InvalidEntry(#[from] slingshot_core::CoreError),
    #[error("no active projects/clients found in '{0}': unable to continue")]
    NoEligibleParticipants(String),
}

pub type Result<T> = std::result::Result<T, SourceError>;
