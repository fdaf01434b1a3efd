//! Axum-based mock of the node, bundler and paymaster JSON-RPC endpoints
//!
//! A single server runs on a fixed port for the whole test run and records
//! every call it receives, so tests can inspect what the library submitted.

use alloy_primitives::{Address, address, hex};
use axum::{Router, extract::State, response::Json, routing::post};
use passkey_mint::{AbiToken, encode, function_selector};
use serde_json::{Value, json};
use std::{
    sync::{Arc, LazyLock, Mutex},
    thread,
    time::Duration,
};

/// Fixed port for the mock JSON-RPC server, matching `.env_test`
pub const MOCK_RPC_PORT: u16 = 9877;
pub const MOCK_RPC_URL: &str = "http://127.0.0.1:9877";

pub const MOCK_CHAIN_ID: u64 = 11155111;
pub const MOCK_ENTRY_POINT: Address = address!("5ff137d4b0fdcd49dca30c7cf57e578a026d2789");
/// Address the signer factory reports for every passkey
pub const MOCK_SIGNER: Address = address!("5157000000000000000000000000000000005157");
pub const MOCK_USER_OP_HASH: &str =
    "0xabababababababababababababababababababababababababababababababab";
pub const MOCK_PAYMASTER_AND_DATA: &str = "0x0000000000325602a77416a16136fdafd04b299fdeadbeef";
pub const MOCK_PROXY_CREATION_CODE: [u8; 5] = [0x60, 0x80, 0x60, 0x40, 0x52];

/// A JSON-RPC call as the mock server received it
#[derive(Clone, Debug)]
pub struct RecordedCall {
    pub endpoint: &'static str,
    pub method: String,
    pub params: Value,
}

#[derive(Clone, Default)]
pub struct MockRpcState {
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockRpcState {
    fn record(&self, endpoint: &'static str, method: &str, params: &Value) {
        self.calls.lock().unwrap().push(RecordedCall {
            endpoint,
            method: method.to_string(),
            params: params.clone(),
        });
    }
}

pub struct MockRpcServer {
    pub base_url: String,
    pub state: MockRpcState,
    _thread_handle: thread::JoinHandle<()>,
}

impl MockRpcServer {
    fn new() -> Self {
        let state = MockRpcState::default();
        let state_clone = state.clone();

        println!("🔧 Starting mock JSON-RPC server on port {MOCK_RPC_PORT}...");

        let thread_handle = thread::spawn(move || {
            let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
            rt.block_on(async {
                let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{MOCK_RPC_PORT}"))
                    .await
                    .expect("Failed to bind mock JSON-RPC server");
                if let Err(e) = axum::serve(listener, create_mock_app(state_clone)).await {
                    println!("❌ Mock JSON-RPC server error: {e}");
                }
            });
        });

        wait_for_server_ready();

        MockRpcServer {
            base_url: MOCK_RPC_URL.to_string(),
            state,
            _thread_handle: thread_handle,
        }
    }

    /// Calls of `method` received so far, oldest first.
    pub fn calls(&self, method: &str) -> Vec<RecordedCall> {
        self.state
            .calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.method == method)
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.state.calls.lock().unwrap().clear();
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

static MOCK_RPC_SERVER: LazyLock<MockRpcServer> = LazyLock::new(MockRpcServer::new);

/// Get the global mock server, starting it on first use
pub fn get_mock_rpc_server() -> &'static MockRpcServer {
    &MOCK_RPC_SERVER
}

fn wait_for_server_ready() {
    for _ in 0..50 {
        if std::net::TcpStream::connect(format!("127.0.0.1:{MOCK_RPC_PORT}")).is_ok() {
            println!("✅ Mock JSON-RPC server is ready");
            return;
        }
        thread::sleep(Duration::from_millis(100));
    }
    panic!("❌ Mock JSON-RPC server failed to start within timeout");
}

fn create_mock_app(state: MockRpcState) -> Router {
    Router::new()
        .route("/rpc", post(node_rpc))
        .route("/bundler", post(bundler_rpc))
        .route("/paymaster", post(paymaster_rpc))
        .route("/failing", post(failing_rpc))
        .with_state(state)
}

type RpcResult = Result<Value, (i64, String)>;

fn envelope(request: &Value, result: RpcResult) -> Json<Value> {
    let id = request["id"].clone();
    Json(match result {
        Ok(result) => json!({"jsonrpc": "2.0", "id": id, "result": result}),
        Err((code, message)) => {
            json!({"jsonrpc": "2.0", "id": id, "error": {"code": code, "message": message}})
        }
    })
}

fn method_not_found(method: &str) -> RpcResult {
    Err((-32601, format!("Method not found: {method}")))
}

fn selector_hex(signature: &str) -> String {
    format!("0x{}", hex::encode(function_selector(signature)))
}

fn word_hex(address: Address) -> String {
    format!("0x{}", hex::encode(address.into_word()))
}

async fn node_rpc(State(state): State<MockRpcState>, Json(request): Json<Value>) -> Json<Value> {
    let method = request["method"].as_str().unwrap_or_default();
    let params = &request["params"];
    state.record("node", method, params);

    let result = match method {
        "eth_chainId" => Ok(json!(format!("0x{MOCK_CHAIN_ID:x}"))),
        "eth_call" => {
            let data = params[0]["data"].as_str().unwrap_or_default();
            if data.starts_with(&selector_hex("getSigner(uint256,uint256,uint176)")) {
                Ok(json!(word_hex(MOCK_SIGNER)))
            } else if data.starts_with(&selector_hex("proxyCreationCode()")) {
                let encoded = encode(&[AbiToken::Bytes(MOCK_PROXY_CREATION_CODE.to_vec())]);
                Ok(json!(format!("0x{}", hex::encode(encoded))))
            } else if data.starts_with(&selector_hex("getNonce(address,uint192)")) {
                Ok(json!(format!("0x{}", "00".repeat(32))))
            } else {
                Err((-32000, "execution reverted".to_string()))
            }
        }
        "eth_getCode" => Ok(json!("0x")),
        "eth_getBlockByNumber" => Ok(json!({
            "number": "0x10",
            "baseFeePerGas": "0x3b9aca00"
        })),
        "eth_maxPriorityFeePerGas" => Ok(json!("0x59682f00")),
        other => method_not_found(other),
    };

    envelope(&request, result)
}

async fn bundler_rpc(State(state): State<MockRpcState>, Json(request): Json<Value>) -> Json<Value> {
    let method = request["method"].as_str().unwrap_or_default();
    let params = &request["params"];
    state.record("bundler", method, params);

    let result = match method {
        "eth_supportedEntryPoints" => Ok(json!([MOCK_ENTRY_POINT])),
        "eth_estimateUserOperationGas" => Ok(json!({
            "preVerificationGas": "0xc350",
            "verificationGasLimit": "0x61a80",
            "callGasLimit": "0x186a0"
        })),
        "eth_sendUserOperation" => Ok(json!(MOCK_USER_OP_HASH)),
        "eth_getUserOperationReceipt" => {
            if params[0].as_str() == Some(MOCK_USER_OP_HASH) {
                Ok(json!({
                    "userOpHash": MOCK_USER_OP_HASH,
                    "entryPoint": MOCK_ENTRY_POINT,
                    "sender": "0x00000000000000000000000000000000000000aa",
                    "nonce": "0x0",
                    "paymaster": "0x0000000000325602a77416a16136fdafd04b299f",
                    "actualGasCost": "0x1234",
                    "actualGasUsed": "0x5678",
                    "success": true,
                    "logs": [],
                    "receipt": {
                        "transactionHash": format!("0x{}", "cd".repeat(32)),
                        "blockNumber": "0x11",
                        "status": "0x1"
                    }
                }))
            } else {
                Ok(Value::Null)
            }
        }
        other => method_not_found(other),
    };

    envelope(&request, result)
}

async fn paymaster_rpc(
    State(state): State<MockRpcState>,
    Json(request): Json<Value>,
) -> Json<Value> {
    let method = request["method"].as_str().unwrap_or_default();
    let params = &request["params"];
    state.record("paymaster", method, params);

    let result = match method {
        "pm_sponsorUserOperation" => Ok(json!({
            "paymasterAndData": MOCK_PAYMASTER_AND_DATA,
            "preVerificationGas": "0xd6d8",
            "verificationGasLimit": "0x7a120",
            "callGasLimit": "0x30d40"
        })),
        other => method_not_found(other),
    };

    envelope(&request, result)
}

async fn failing_rpc(State(state): State<MockRpcState>, Json(request): Json<Value>) -> Json<Value> {
    let method = request["method"].as_str().unwrap_or_default();
    state.record("failing", method, &request["params"]);

    envelope(&request, Err((-32500, "sponsorship denied".to_string())))
}
