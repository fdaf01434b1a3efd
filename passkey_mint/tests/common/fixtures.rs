//! Shared setup for integration tests

use alloy_primitives::{Address, address};
use passkey_mint::{MintSettings, SafeContracts, SoftwareAuthenticator};
use std::sync::{Arc, Once};

use super::mock_rpc_server::get_mock_rpc_server;

/// Safe that receives minted NFTs in tests
pub const RECIPIENT: Address = address!("00000000000000000000000000000000000000aa");
pub const TEST_ORIGIN: &str = "http://localhost:3000";

/// Loads `.env_test` once and makes sure the mock server is up
pub fn init_test_environment() {
    static ENV_INIT: Once = Once::new();
    ENV_INIT.call_once(|| {
        if dotenvy::from_filename(".env_test").is_err() {
            dotenvy::dotenv().ok();
        }
    });
    get_mock_rpc_server();
}

pub fn test_authenticator() -> Arc<SoftwareAuthenticator> {
    Arc::new(SoftwareAuthenticator::new(TEST_ORIGIN))
}

/// Mint settings pointing at the mock server
pub fn mock_settings() -> MintSettings {
    let server = get_mock_rpc_server();
    MintSettings {
        rpc_url: server.url("rpc"),
        bundler_url: server.url("bundler"),
        paymaster_url: server.url("paymaster"),
        paymaster_address: address!("0000000000325602a77416a16136fdafd04b299f"),
        nft_address: address!("bb9ebb7b8ee75cdbf64e5ce124731a89c2bc4a07"),
        sponsorship_policy_id: None,
        contracts: SafeContracts::from_env(),
    }
}
