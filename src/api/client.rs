use crate::core::config::RpcConfig;
use crate::core::error::TransportError;
use crate::models::peer::{PeerObservation, Transfer};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::trace;

/// Source of active transfers and their peers
#[async_trait]
pub trait PeerSource: Send + Sync {
    async fn list_active_transfers(&self) -> Result<Vec<Transfer>, TransportError>;

    async fn list_peers(&self, transfer_id: &str) -> Result<Vec<PeerObservation>, TransportError>;
}

/// JSON-RPC client for aria2
pub struct Aria2Client {
    client: reqwest::Client,
    endpoint: String,
    token: Option<String>,
}

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: &'static str,
    method: &'a str,
    params: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

impl Aria2Client {
    pub fn new(endpoint: String, token: Option<String>, timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(TransportError::Request)?;

        Ok(Self {
            client,
            endpoint,
            token,
        })
    }

    pub fn from_config(config: &RpcConfig) -> Result<Self, TransportError> {
        Self::new(config.endpoint.clone(), config.token(), config.timeout())
    }

    /// Perform one JSON-RPC call, prepending the secret token to `params`
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<T, TransportError> {
        let mut full_params = Vec::with_capacity(params.len() + 1);
        if let Some(token) = &self.token {
            full_params.push(Value::String(token.clone()));
        }
        full_params.extend(params);

        let request = RpcRequest {
            jsonrpc: "2.0",
            id: "inspect",
            method,
            params: full_params,
        };

        trace!(method = method, endpoint = %self.endpoint, "Sending RPC request");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(TransportError::Status(response.status().as_u16()));
        }

        let body = response.json::<RpcResponse>().await?;

        if let Some(error) = body.error {
            return Err(TransportError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        let result = body
            .result
            .ok_or_else(|| TransportError::MalformedResponse(format!("{} returned no result", method)))?;

        serde_json::from_value(result)
            .map_err(|e| TransportError::MalformedResponse(format!("{}: {}", method, e)))
    }
}

#[async_trait]
impl PeerSource for Aria2Client {
    async fn list_active_transfers(&self) -> Result<Vec<Transfer>, TransportError> {
        self.call("aria2.tellActive", vec![json!(["gid"])]).await
    }

    async fn list_peers(&self, transfer_id: &str) -> Result<Vec<PeerObservation>, TransportError> {
        self.call("aria2.getPeers", vec![json!(transfer_id)]).await
    }
}
