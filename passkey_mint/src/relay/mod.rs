//! Safe smart account operations over ERC-4337: user operation construction,
//! passkey signing and submission through a bundler.

mod account;
mod config;
mod errors;
mod multisend;
mod pack;
mod rpc;
mod safe_op;
mod signature;
mod types;

pub use errors::RelayError;
pub use pack::{Safe4337Pack, get_user_operation_receipt};
pub use types::{
    GasEstimate, MetaTransactionData, OperationType, PaymasterOptions, Safe4337InitOptions,
    SafeContracts, SafeOperation, SafeOptions, SafeSignature, SponsoredUserOperation,
    TransactionReceipt, UserOperation, UserOperationReceipt,
};
