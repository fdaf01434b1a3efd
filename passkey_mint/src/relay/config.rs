use std::{env, sync::LazyLock, time::Duration};

use alloy_primitives::{Address, address};

use crate::config::address_or;

/// EntryPoint v0.6
pub(super) static ENTRY_POINT_ADDRESS: LazyLock<Address> = LazyLock::new(|| {
    address_or(
        "ENTRY_POINT_ADDRESS",
        address!("5ff137d4b0fdcd49dca30c7cf57e578a026d2789"),
    )
});

/// Safe4337Module v0.2.0, also installed as the Safe fallback handler
pub(super) static SAFE_4337_MODULE_ADDRESS: LazyLock<Address> = LazyLock::new(|| {
    address_or(
        "SAFE_4337_MODULE_ADDRESS",
        address!("a581c4a4db7175302464ff3c06380bc3270b4037"),
    )
});

pub(super) static SAFE_MODULE_SETUP_ADDRESS: LazyLock<Address> = LazyLock::new(|| {
    address_or(
        "SAFE_MODULE_SETUP_ADDRESS",
        address!("8ecd4ec46d4d2a6b64fe960b3d64e8b94b2234eb"),
    )
});

/// SafeL2 v1.4.1 singleton
pub(super) static SAFE_SINGLETON_ADDRESS: LazyLock<Address> = LazyLock::new(|| {
    address_or(
        "SAFE_SINGLETON_ADDRESS",
        address!("29fcb43b46531bca003ddc8fcb67ffe91900c762"),
    )
});

pub(super) static SAFE_PROXY_FACTORY_ADDRESS: LazyLock<Address> = LazyLock::new(|| {
    address_or(
        "SAFE_PROXY_FACTORY_ADDRESS",
        address!("4e1dcf7ad4e460cfd30791ccc4f9c8a4f820ec67"),
    )
});

pub(super) static MULTI_SEND_ADDRESS: LazyLock<Address> = LazyLock::new(|| {
    address_or(
        "MULTI_SEND_ADDRESS",
        address!("38869bf66a61cf6bdb996a6ae40d5853fd43b526"),
    )
});

pub(super) static WEBAUTHN_SIGNER_FACTORY_ADDRESS: LazyLock<Address> = LazyLock::new(|| {
    address_or(
        "WEBAUTHN_SIGNER_FACTORY_ADDRESS",
        address!("1d31f259ee307358a26dfb23eb365939e8641195"),
    )
});

/// Fallback Solidity P-256 verifier used when a passkey names none
pub(super) static P256_VERIFIER_ADDRESS: LazyLock<Address> = LazyLock::new(|| {
    address_or(
        "P256_VERIFIER_ADDRESS",
        address!("445a0683e494ea0c5af3e83c5159fbe47cf9e765"),
    )
});

/// RIP-7212 precompile, tried before the verifier contract
pub(super) static P256_PRECOMPILE_ADDRESS: LazyLock<Address> = LazyLock::new(|| {
    address_or(
        "P256_PRECOMPILE_ADDRESS",
        address!("0000000000000000000000000000000000000100"),
    )
});

/// Delay between `eth_getUserOperationReceipt` polls, in seconds
///
/// Default: 2
pub(super) static RECEIPT_POLL_INTERVAL: LazyLock<Duration> = LazyLock::new(|| {
    let secs = env::var("RECEIPT_POLL_INTERVAL")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(2);
    Duration::from_secs(secs)
});
