//! Lotus JSON-RPC 2.0 client.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use slingshot_core::ChainEpoch;
use tracing::debug;

use crate::api::LedgerApi;
use crate::endpoint::ApiInfo;
use crate::types::{MarketDealJson, TipSet, TipSetKey};
use crate::{LotusError, Result};

/// Lotus rejects `null` params, so argument-less calls send `[]`.
const NO_PARAMS: [u8; 0] = [];

#[derive(Serialize)]
struct Request<'a, P> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: P,
}

#[derive(Deserialize)]
struct Envelope<T> {
    result: Option<T>,
    error: Option<RpcErrorBody>,
}

#[derive(Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

/// Full-node client over HTTP.
pub struct LotusRpcClient {
    http: reqwest::Client,
    url: String,
    token: Option<String>,
    next_id: AtomicU64,
}

impl LotusRpcClient {
    pub fn new(info: ApiInfo) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            url: info.url,
            token: info.token,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Call `Filecoin.<method>` with positional `params`.
    pub async fn call<P, T>(&self, method: &str, params: P) -> Result<T>
    where
        P: Serialize + Send,
        T: DeserializeOwned,
    {
        let method = format!("Filecoin.{method}");
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        debug!(method = %method, id, "rpc call");

        let mut req = self.http.post(&self.url).json(&Request {
            jsonrpc: "2.0",
            id,
            method: &method,
            params,
        });
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }

        let envelope: Envelope<T> = req.send().await?.error_for_status()?.json().await?;
        if let Some(err) = envelope.error {
            return Err(LotusError::Rpc {
                method,
                code: err.code,
                message: err.message,
            });
        }
        envelope.result.ok_or(LotusError::MissingResult(method))
    }
}

#[async_trait::async_trait]
impl LedgerApi for LotusRpcClient {
    async fn chain_head(&self) -> Result<TipSet> {
        self.call("ChainHead", NO_PARAMS).await
    }

    async fn chain_get_tipset(&self, key: &TipSetKey) -> Result<TipSet> {
        self.call("ChainGetTipSet", (key,)).await
    }

    async fn chain_get_tipset_by_height(&self, height: ChainEpoch, anchor: &TipSetKey) -> Result<TipSet> {
        self.call("ChainGetTipSetByHeight", (height, anchor)).await
    }

    async fn state_market_deals(&self, key: &TipSetKey) -> Result<HashMap<String, MarketDealJson>> {
        self.call("StateMarketDeals", (key,)).await
    }

    async fn state_account_key(&self, address: &str, key: &TipSetKey) -> Result<String> {
        self.call("StateAccountKey", (address, key)).await
    }
}
