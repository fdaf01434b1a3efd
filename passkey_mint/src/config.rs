//! Central configuration for the passkey_mint crate

use std::{env, sync::LazyLock};

use alloy_primitives::Address;

/// Storage slot holding the JSON array of created passkeys
///
/// Default: "safe_passkey_list"
pub static STORAGE_PASSKEY_LIST_KEY: LazyLock<String> = LazyLock::new(|| {
    env::var("STORAGE_PASSKEY_LIST_KEY").unwrap_or_else(|_| "safe_passkey_list".to_string())
});

/// JSON-RPC endpoint of the chain node
pub static RPC_URL: LazyLock<String> =
    LazyLock::new(|| env::var("RPC_URL").expect("RPC_URL must be set"));

/// JSON-RPC endpoint of the ERC-4337 bundler
pub static BUNDLER_URL: LazyLock<String> =
    LazyLock::new(|| env::var("BUNDLER_URL").expect("BUNDLER_URL must be set"));

/// JSON-RPC endpoint of the sponsoring paymaster
pub static PAYMASTER_URL: LazyLock<String> =
    LazyLock::new(|| env::var("PAYMASTER_URL").expect("PAYMASTER_URL must be set"));

pub static PAYMASTER_ADDRESS: LazyLock<Address> =
    LazyLock::new(|| required_address("PAYMASTER_ADDRESS"));

/// Address of the NFT contract exposing `safeMint(address,uint256)`
pub static NFT_ADDRESS: LazyLock<Address> = LazyLock::new(|| required_address("NFT_ADDRESS"));

/// Optional paymaster sponsorship policy forwarded with `pm_sponsorUserOperation`
pub static SPONSORSHIP_POLICY_ID: LazyLock<Option<String>> = LazyLock::new(|| {
    env::var("SPONSORSHIP_POLICY_ID")
        .ok()
        .filter(|v| !v.is_empty())
});

fn required_address(name: &str) -> Address {
    let value = env::var(name).unwrap_or_else(|_| panic!("{name} must be set"));
    value
        .parse()
        .unwrap_or_else(|e| panic!("{name} is not a valid address ({value}): {e}"))
}

/// Reads an address from the environment, falling back to `default`.
///
/// An unparsable override is logged and ignored.
pub(crate) fn address_or(name: &str, default: Address) -> Address {
    match env::var(name) {
        Ok(v) => match v.parse::<Address>() {
            Ok(addr) => addr,
            Err(e) => {
                tracing::warn!("Invalid {}: {} ({}). Using default {}", name, v, e, default);
                default
            }
        },
        Err(_) => default,
    }
}
