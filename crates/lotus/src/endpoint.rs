//! Full-node endpoint discovery.
//!
//! Precedence: explicit API info (`token:multiaddr`, a bare multiaddr, or an
//! http(s) URL), then the `api`/`token` files of a Lotus repo.

use std::path::Path;

use multiaddr::{Multiaddr, Protocol};
use tracing::debug;

use crate::{LotusError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiInfo {
    pub url: String,
    pub token: Option<String>,
}

impl ApiInfo {
    /// Parse `token:/ip4/127.0.0.1/tcp/1234/http`, `/ip4/...`, or `http://...`.
    pub fn parse(info: &str) -> Result<Self> {
        let info = info.trim();
        if info.starts_with("http://") || info.starts_with("https://") {
            return Ok(Self {
                url: info.to_string(),
                token: None,
            });
        }
        let (token, addr) = match info.split_once(":/") {
            Some((token, rest)) => (Some(token.to_string()), format!("/{rest}")),
            None => (None, info.to_string()),
        };
        Ok(Self {
            url: multiaddr_to_url(&addr)?,
            token: token.filter(|t| !t.is_empty()),
        })
    }

    /// Read `<repo>/api` and, when present, `<repo>/token`.
    pub fn from_repo(repo: &Path) -> Result<Self> {
        let api_path = repo.join("api");
        let addr = std::fs::read_to_string(&api_path).map_err(|source| LotusError::Io {
            path: api_path.clone(),
            source,
        })?;
        let token = std::fs::read_to_string(repo.join("token"))
            .ok()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        debug!(repo = %repo.display(), has_token = token.is_some(), "using repo api endpoint");
        Ok(Self {
            url: multiaddr_to_url(addr.trim())?,
            token,
        })
    }

    pub fn discover(api_info: Option<&str>, repo: &Path) -> Result<Self> {
        match api_info {
            Some(info) if !info.trim().is_empty() => Self::parse(info),
            _ => Self::from_repo(repo),
        }
    }
}

/// `/ip4/h/tcp/p[/http|/https|/ws|/wss]` (also `ip6`, `dns`, `dns4`, `dns6`)
/// to the node's HTTP RPC URL. Anything after the scheme is rejected.
fn multiaddr_to_url(addr: &str) -> Result<String> {
    let invalid = || LotusError::InvalidApiInfo(addr.to_string());
    let addr: Multiaddr = addr.parse().map_err(|_| invalid())?;
    let mut protocols = addr.iter();

    let host = match protocols.next() {
        Some(Protocol::Ip4(ip)) => ip.to_string(),
        Some(Protocol::Ip6(ip)) => format!("[{ip}]"),
        Some(Protocol::Dns(host) | Protocol::Dns4(host) | Protocol::Dns6(host)) => host.into_owned(),
        _ => return Err(invalid()),
    };
    let Some(Protocol::Tcp(port)) = protocols.next() else {
        return Err(invalid());
    };
    let scheme = match protocols.next() {
        None | Some(Protocol::Http) | Some(Protocol::Ws(_)) => "http",
        Some(Protocol::Https) | Some(Protocol::Wss(_)) => "https",
        Some(_) => return Err(invalid()),
    };
    if protocols.next().is_some() {
        return Err(invalid());
    }
    Ok(format!("{scheme}://{host}:{port}/rpc/v0"))
}
