mod assertion;
mod authenticator;
mod config;
mod errors;
mod register;
mod software;
mod storage;
mod types;

pub use authenticator::CredentialsContainer;
pub use errors::PasskeyError;
pub use register::{create_passkey, extract_passkey_data};
pub use software::{SoftwareAuthenticator, SoftwareCredential};
pub use storage::PasskeyStore;
pub use types::{
    AssertionCredential, AttestationCredential, AuthenticatorAssertionResponse,
    AuthenticatorAttestationResponse, COSE_ALG_ES256, CredentialCreationOptions,
    CredentialRequestOptions, PasskeyArgs, PasskeyCoordinates, PubKeyCredParam,
    PublicKeyCredentialUserEntity, RelyingParty,
};

pub(crate) use assertion::{WebAuthnSignatureData, parse_assertion};

/// Options for an assertion over `challenge`, restricted to `passkey`.
pub(crate) fn request_options_for(
    passkey: &PasskeyArgs,
    challenge: &[u8],
) -> Result<CredentialRequestOptions, PasskeyError> {
    Ok(CredentialRequestOptions {
        challenge: challenge.to_vec(),
        rp_id: config::PASSKEY_RP_ID.to_string(),
        allow_credentials: vec![passkey.raw_id_bytes()?],
        user_verification: config::PASSKEY_USER_VERIFICATION.to_string(),
        timeout: (*config::PASSKEY_TIMEOUT) * 1000,
    })
}

pub(crate) async fn init() -> Result<(), PasskeyError> {
    config::rp_id_from_origin(&config::ORIGIN)?;

    crate::storage::init().await?;

    Ok(())
}
