//! Raw list retrieval.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::{Result, SourceError};

/// Whether `name` is fetched over HTTP rather than read from disk.
pub fn is_remote(name: &str) -> bool {
    name.starts_with("http://") || name.starts_with("https://")
}

/// Read a list from an `http(s)://` URL or a local path.
pub async fn fetch_source(name: &str) -> Result<Vec<u8>> {
    if is_remote(name) {
        info!(url = name, "downloading list");
        let resp = reqwest::get(name).await?;
        if resp.status() != reqwest::StatusCode::OK {
            return Err(SourceError::Status(resp.status().as_u16()));
        }
        Ok(resp.bytes().await?.to_vec())
    } else {
        debug!(path = name, "reading list");
        tokio::fs::read(name).await.map_err(|source| SourceError::Read {
            path: PathBuf::from(name),
            source,
        })
    }
}

/// Store a verbatim copy of a fetched list under `dir`.
pub fn save_copy(dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
    let path = dir.join(file_name);
    std::fs::write(&path, bytes).map_err(|source| SourceError::Write {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_remote() {
        assert!(is_remote("https://example.org/list.json"));
        assert!(is_remote("http://localhost:8080/x"));
        assert!(!is_remote("/tmp/list.json"));
        assert!(!is_remote("ftp://example.org/list.json"));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let err = fetch_source("/definitely/not/here.json").await.unwrap_err();
        assert!(matches!(err, SourceError::Read { .. }));
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }
}
