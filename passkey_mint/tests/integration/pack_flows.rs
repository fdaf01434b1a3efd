use alloy_primitives::{Address, Bytes, U256, address};
use passkey_mint::{
    MetaTransactionData, OperationType, PaymasterOptions, RelayError, Safe4337InitOptions,
    Safe4337Pack, SafeContracts, SafeOptions, SoftwareAuthenticator, create_passkey,
    function_selector,
};
use serial_test::serial;
use std::sync::Arc;
use std::time::Duration;

use crate::common::mock_rpc_server::{
    MOCK_CHAIN_ID, MOCK_PAYMASTER_AND_DATA, MOCK_SIGNER, MOCK_USER_OP_HASH,
};
use crate::common::{
    RECIPIENT, get_mock_rpc_server, init_test_environment, mock_settings, test_authenticator,
};

const TOKEN: Address = address!("1c7d4b196cb0c7b01d743fbc6116a902379c7238");

async fn init_options(
    authenticator: Arc<SoftwareAuthenticator>,
    options: SafeOptions,
    paymaster_options: Option<PaymasterOptions>,
) -> Safe4337InitOptions {
    let settings = mock_settings();
    let signer = create_passkey(authenticator.as_ref())
        .await
        .expect("passkey creation");
    Safe4337InitOptions {
        provider: settings.rpc_url,
        signer,
        authenticator,
        bundler_url: settings.bundler_url,
        paymaster_options,
        options,
        contracts: settings.contracts,
    }
}

fn predicted(salt_nonce: u64) -> SafeOptions {
    SafeOptions::Predicted {
        owners: vec![],
        threshold: 1,
        salt_nonce: U256::from(salt_nonce),
    }
}

fn sponsored() -> Option<PaymasterOptions> {
    let settings = mock_settings();
    Some(PaymasterOptions::sponsored(
        settings.paymaster_address,
        settings.paymaster_url,
    ))
}

fn mint_call(token_id: u64) -> MetaTransactionData {
    let data = passkey_mint::encode_safe_mint_data(RECIPIENT, Some(U256::from(token_id)))
        .expect("safeMint data");
    MetaTransactionData::call(mock_settings().nft_address, U256::ZERO, data)
}

#[tokio::test]
#[serial]
async fn test_init_with_existing_safe() {
    init_test_environment();
    get_mock_rpc_server().clear();

    let options = init_options(
        test_authenticator(),
        SafeOptions::Existing {
            safe_address: RECIPIENT,
        },
        None,
    )
    .await;

    let pack = Safe4337Pack::init(options).await.expect("init");

    assert_eq!(pack.safe_address(), RECIPIENT);
    assert_eq!(pack.chain_id(), MOCK_CHAIN_ID);
    assert_eq!(pack.signer_address(), MOCK_SIGNER);
    assert!(!pack.is_deployment_pending());
}

#[tokio::test]
#[serial]
async fn test_init_predicts_counterfactual_safe() {
    init_test_environment();
    get_mock_rpc_server().clear();
    let authenticator = test_authenticator();

    // Given the same passkey and salt twice, and a different salt once
    let first = init_options(authenticator.clone(), predicted(0), None).await;
    let signer = first.signer.clone();
    let first = Safe4337Pack::init(first).await.unwrap();

    let mut second = init_options(authenticator.clone(), predicted(0), None).await;
    second.signer = signer.clone();
    let second = Safe4337Pack::init(second).await.unwrap();

    let mut salted = init_options(authenticator.clone(), predicted(7), None).await;
    salted.signer = signer;
    let salted = Safe4337Pack::init(salted).await.unwrap();

    // Then the address is deterministic in the salt
    assert_eq!(first.safe_address(), second.safe_address());
    assert_ne!(first.safe_address(), salted.safe_address());
    assert_ne!(first.safe_address(), Address::ZERO);

    // And the undeployed Safe is deployed by the first operation
    assert!(first.is_deployment_pending());
    let code_queries = get_mock_rpc_server().calls("eth_getCode");
    assert_eq!(code_queries.len(), 3);
}

#[tokio::test]
#[serial]
async fn test_init_rejects_unreachable_threshold() {
    init_test_environment();

    let options = init_options(
        test_authenticator(),
        SafeOptions::Predicted {
            owners: vec![],
            threshold: 2,
            salt_nonce: U256::ZERO,
        },
        None,
    )
    .await;

    let result = Safe4337Pack::init(options).await;

    assert!(matches!(result, Err(RelayError::Config(_))));
}

#[tokio::test]
#[serial]
async fn test_init_rejects_unsupported_entry_point() {
    init_test_environment();
    let unsupported = address!("0000000071727de22e5e9d8baf0edac6f37da032");

    let mut options = init_options(test_authenticator(), predicted(0), None).await;
    options.contracts = SafeContracts {
        entry_point: unsupported,
        ..options.contracts
    };

    let result = Safe4337Pack::init(options).await;

    match result {
        Err(RelayError::UnsupportedEntryPoint(entry_point)) => {
            assert_eq!(entry_point, unsupported)
        }
        other => panic!("Expected UnsupportedEntryPoint, got {:?}", other.err()),
    }
}

#[tokio::test]
#[serial]
async fn test_init_requires_url_for_sponsored_paymaster() {
    init_test_environment();

    let paymaster = PaymasterOptions {
        paymaster_url: None,
        ..sponsored().unwrap()
    };
    let options = init_options(test_authenticator(), predicted(0), Some(paymaster)).await;

    let result = Safe4337Pack::init(options).await;

    assert!(matches!(result, Err(RelayError::Config(_))));
}

#[tokio::test]
#[serial]
async fn test_create_transaction_batches_through_multisend() {
    init_test_environment();
    let server = get_mock_rpc_server();

    let options = init_options(test_authenticator(), predicted(0), sponsored()).await;
    let pack = Safe4337Pack::init(options).await.unwrap();
    server.clear();

    // When creating an operation with two mints
    let operation = pack
        .create_transaction(vec![mint_call(1), mint_call(2)])
        .await
        .expect("create_transaction");

    let user_op = &operation.user_operation;
    let contracts = SafeContracts::from_env();

    // Then the Safe delegatecalls MultiSend
    let call_data = &user_op.call_data;
    assert_eq!(
        &call_data[..4],
        function_selector("executeUserOp(address,uint256,bytes,uint8)")
    );
    assert_eq!(&call_data[16..36], contracts.multi_send.as_slice());
    assert_eq!(call_data[4 + 127], OperationType::DelegateCall as u8);

    // Gas comes from the paymaster, fees from the node
    assert_eq!(user_op.call_gas_limit, U256::from(0x30d40u64));
    assert_eq!(
        user_op.max_fee_per_gas,
        U256::from(2 * 0x3b9aca00u64 + 0x59682f00u64)
    );
    assert_eq!(
        user_op.paymaster_and_data,
        MOCK_PAYMASTER_AND_DATA.parse::<Bytes>().unwrap()
    );

    // The operation is unsigned and bound to this Safe and chain
    assert!(user_op.signature.is_empty());
    assert!(operation.signatures.is_empty());
    assert_eq!(operation.safe_address(), pack.safe_address());
    assert_eq!(operation.chain_id, MOCK_CHAIN_ID);
    assert_eq!(operation.module_address, contracts.safe_4337_module);
    assert_eq!(server.calls("eth_estimateUserOperationGas").len(), 1);
}

#[tokio::test]
#[serial]
async fn test_create_transaction_with_token_paymaster() {
    init_test_environment();
    let server = get_mock_rpc_server();
    let paymaster_address = mock_settings().paymaster_address;

    // Given a paymaster that charges in an ERC-20 instead of sponsoring
    let paymaster = PaymasterOptions {
        is_sponsored: false,
        paymaster_address,
        paymaster_url: None,
        sponsorship_policy_id: None,
        paymaster_token_address: Some(TOKEN),
        amount_to_approve: Some(U256::from(1_000_000u64)),
    };
    let options = init_options(test_authenticator(), predicted(0), Some(paymaster)).await;
    let pack = Safe4337Pack::init(options).await.unwrap();
    server.clear();

    let operation = pack.create_transaction(vec![mint_call(1)]).await.unwrap();
    let user_op = &operation.user_operation;

    // Then the paymaster address is used as-is and no sponsorship is requested
    assert_eq!(&user_op.paymaster_and_data[..], paymaster_address.as_slice());
    assert!(server.calls("pm_sponsorUserOperation").is_empty());
    assert_eq!(user_op.call_gas_limit, U256::from(0x186a0u64));

    // And the approval turns the single mint into a MultiSend batch
    assert_eq!(
        user_op.call_data[4 + 127],
        OperationType::DelegateCall as u8
    );
    let approve = function_selector("approve(address,uint256)");
    assert!(user_op.call_data.windows(4).any(|w| w == approve));
}

#[tokio::test]
#[serial]
async fn test_sign_and_execute() {
    init_test_environment();
    let server = get_mock_rpc_server();

    let options = init_options(test_authenticator(), predicted(0), sponsored()).await;
    let pack = Safe4337Pack::init(options).await.unwrap();
    server.clear();

    let operation = pack.create_transaction(vec![mint_call(1)]).await.unwrap();

    // Executing before signing is refused
    let unsigned = pack.execute_transaction(operation.clone()).await;
    assert!(matches!(unsigned, Err(RelayError::Signing(_))));
    assert!(server.calls("eth_sendUserOperation").is_empty());

    // Signing adds the passkey signer's contract signature
    let signed = pack.sign_safe_operation(operation).await.expect("sign");
    let signature = signed.signatures.get(&MOCK_SIGNER).expect("signer entry");
    assert!(signature.is_contract_signature);
    assert_eq!(signed.signatures.len(), 1);

    let hash = pack.execute_transaction(signed).await.expect("execute");
    assert_eq!(hash, MOCK_USER_OP_HASH);
    assert_eq!(server.calls("eth_sendUserOperation").len(), 1);
}

#[tokio::test]
#[serial]
async fn test_user_operation_receipts() {
    init_test_environment();

    let options = init_options(
        test_authenticator(),
        SafeOptions::Existing {
            safe_address: RECIPIENT,
        },
        None,
    )
    .await;
    let pack = Safe4337Pack::init(options).await.unwrap();

    // A known hash has a receipt
    let receipt = pack
        .get_user_operation_receipt(MOCK_USER_OP_HASH)
        .await
        .unwrap()
        .expect("receipt");
    assert!(receipt.success);
    assert_eq!(receipt.sender, RECIPIENT);

    let waited = pack
        .wait_for_user_operation_receipt(MOCK_USER_OP_HASH, Duration::from_secs(5))
        .await
        .unwrap();
    assert_eq!(waited, receipt);

    // An unknown hash has none, and waiting for it times out
    let unknown = format!("0x{}", "12".repeat(32));
    assert!(
        pack.get_user_operation_receipt(&unknown)
            .await
            .unwrap()
            .is_none()
    );
    let result = pack
        .wait_for_user_operation_receipt(&unknown, Duration::from_secs(1))
        .await;
    assert!(matches!(result, Err(RelayError::Timeout(hash)) if hash == unknown));
}
