use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use super::errors::RelayError;

/// Creates the HTTP client shared by the node, bundler and paymaster endpoints:
///
/// - `timeout`: 30 seconds, covering slow gas estimation.
/// - `pool_idle_timeout`: 90 seconds.
/// - `pool_max_idle_per_host`: 32.
pub(super) fn get_client() -> Result<reqwest::Client, RelayError> {
    Ok(reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .pool_idle_timeout(Duration::from_secs(90))
        .pool_max_idle_per_host(32)
        .build()?)
}

#[derive(Serialize)]
struct RpcRequest<'a, P> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: P,
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: serde_json::Value,
    error: Option<RpcErrorObject>,
}

#[derive(Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// JSON-RPC 2.0 over HTTP POST.
#[derive(Debug)]
pub(crate) struct JsonRpcClient {
    url: String,
    client: reqwest::Client,
    next_id: AtomicU64,
}

impl JsonRpcClient {
    pub(crate) fn new(url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            url: url.into(),
            client,
            next_id: AtomicU64::new(1),
        }
    }

    pub(crate) fn url(&self) -> &str {
        &self.url
    }

    /// Calls `method` and decodes its `result`.
    ///
    /// A `null` result decodes into `Option::None` when `R` is an `Option`.
    pub(crate) async fn request<P, R>(&self, method: &str, params: P) -> Result<R, RelayError>
    where
        P: Serialize + Send,
        R: DeserializeOwned,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = RpcRequest {
            jsonrpc: "2.0",
            id,
            method,
            params,
        };

        tracing::debug!("JSON-RPC {} -> {} (id {})", method, self.url, id);

        let response: RpcResponse = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await?
            .json()
            .await?;

        if let Some(error) = response.error {
            tracing::error!(
                "JSON-RPC {} failed with {}: {}",
                method,
                error.code,
                error.message
            );
            return Err(RelayError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        serde_json::from_value(response.result).map_err(|e| {
            RelayError::InvalidResponse(format!("Unexpected result for {method}: {e}"))
        })
    }
}
