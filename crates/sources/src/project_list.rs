//! Registered-project list.
//!
//! ```json
//! { "payload": [
//!     { "project": "5fb5f5b3ad3275e236287ce3",
//!       "address": "f3w3r2c6iukyh3u6f6kx62s5g6n2gf54aqp33ukqrqhje2y6xhf7k55przg4xqgahpcdal6laljz6zonma5pka",
//!       "curatedDataset": ["sentinel-2"] }
//! ] }
//! ```

use std::collections::BTreeSet;
use std::path::Path;

use serde::Deserialize;
use slingshot_core::WalletId;
use slingshot_rollup::ProjectRegistry;
use tracing::{info, warn};

use crate::fetch::{fetch_source, save_copy};
use crate::{Result, SourceError};

/// File name of the verbatim copy kept in the output directory.
pub const PROJECT_LIST_COPY: &str = "client_list.json";

#[derive(Debug, Deserialize)]
struct ProjectList {
    payload: Vec<ProjectEntry>,
}

#[derive(Debug, Deserialize)]
struct ProjectEntry {
    project: String,
    address: String,
    #[serde(rename = "curatedDataset", default)]
    curated_dataset: Vec<String>,
}

/// Parse the list into a registry. Fails on any malformed address, and when
/// no wallet is left that maps to an eligible participant.
pub fn parse_project_list(
    source_name: &str,
    bytes: &[u8],
    excluded_datasets: &BTreeSet<String>,
) -> Result<ProjectRegistry> {
    let list: ProjectList = serde_json::from_slice(bytes)?;
    let mut registry = ProjectRegistry::new(excluded_datasets.clone());

    for entry in list.payload {
        let wallet: WalletId = entry.address.parse()?;
        registry.register(wallet, entry.project, entry.curated_dataset);
    }

    for participant in registry.disqualified() {
        warn!(participant = %participant, "participant disqualified by dataset tag");
    }

    if registry.eligible_wallet_count() == 0 {
        return Err(SourceError::NoEligibleParticipants(source_name.to_string()));
    }

    info!(
        wallets = registry.len(),
        eligible = registry.eligible_wallet_count(),
        "loaded project list"
    );
    Ok(registry)
}

/// Fetch, copy into `save_to_dir`, and parse the project list.
pub async fn load_project_list(
    source_name: &str,
    save_to_dir: &Path,
    excluded_datasets: &BTreeSet<String>,
) -> Result<ProjectRegistry> {
    let bytes = fetch_source(source_name).await?;
    save_copy(save_to_dir, PROJECT_LIST_COPY, &bytes)?;
    parse_project_list(source_name, &bytes, excluded_datasets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use slingshot_rollup::ParticipantRegistry;

    fn excluded() -> BTreeSet<String> {
        BTreeSet::from(["landsat-8".to_string()])
    }

    #[test]
    fn test_parse_project_list() {
        let json = br#"{"payload": [
            {"project": "p1", "address": "f1hdh5of5kujpspb4f54ewcarzj75l4yvrlnmu3aa", "curatedDataset": ["gaia"]},
            {"project": "p1", "address": "f1zfdvtvhn5foog5ouzuwo2g4thz26rugd736p5vq"},
            {"project": "p2", "address": "f3yrqihkzqf7z5x33trbssc7i2zxi6krgvdynha7s4lfs4ia7wcrapavlruhwz2rn42fqbp3lviymozwpxmasa", "curatedDataset": ["landsat-8", "gaia"]}
        ]}"#;
        let reg = parse_project_list("inline", json, &excluded()).unwrap();

        assert_eq!(reg.len(), 3);
        assert_eq!(reg.eligible_wallet_count(), 2);
        assert_eq!(reg.lookup(&"f1zfdvtvhn5foog5ouzuwo2g4thz26rugd736p5vq".parse().unwrap()), Some("p1".to_string()));
        assert!(reg.is_disqualified(&"p2".to_string()));
    }

    #[test]
    fn test_invalid_address_is_fatal() {
        for address in ["not-an-address", "f1ABC", "f0abc", "f1ddh5of5kujpspb4f54ewcarzj75l4yvrlnmu3aa"] {
            let json = format!(r#"{{"payload": [{{"project": "p1", "address": "{address}"}}]}}"#);
            let err = parse_project_list("inline", json.as_bytes(), &excluded()).unwrap_err();
            assert!(matches!(err, SourceError::InvalidEntry(_)), "{address} accepted");
        }
    }

    #[test]
    fn test_no_eligible_participants_is_fatal() {
        let json = br#"{"payload": [{"project": "p2", "address": "f3yrqihkzqf7z5x33trbssc7i2zxi6krgvdynha7s4lfs4ia7wcrapavlruhwz2rn42fqbp3lviymozwpxmasa", "curatedDataset": ["landsat-8"]}]}"#;
        let err = parse_project_list("list.json", json, &excluded()).unwrap_err();
        assert!(matches!(err, SourceError::NoEligibleParticipants(_)));
        assert!(err.to_string().contains("list.json"));

        let err = parse_project_list("list.json", br#"{"payload": []}"#, &excluded()).unwrap_err();
        assert!(matches!(err, SourceError::NoEligibleParticipants(_)));
    }

    #[test]
    fn test_missing_payload_is_malformed() {
        let err = parse_project_list("inline", br#"{"projects": []}"#, &excluded()).unwrap_err();
        assert!(matches!(err, SourceError::Json(_)));
    }
}
