use async_trait::async_trait;

use super::errors::PasskeyError;
use super::types::{
    AssertionCredential, AttestationCredential, CredentialCreationOptions,
    CredentialRequestOptions,
};

/// The platform credential API.
///
/// Mirrors `navigator.credentials`. Both ceremonies may complete without
/// producing a credential, which is reported as `Ok(None)`.
#[async_trait]
pub trait CredentialsContainer: Send + Sync {
    /// Run a creation ceremony and return the new public-key credential.
    async fn create(
        &self,
        options: &CredentialCreationOptions,
    ) -> Result<Option<AttestationCredential>, PasskeyError>;

    /// Run an assertion ceremony, signing over the challenge.
    async fn get(
        &self,
        options: &CredentialRequestOptions,
    ) -> Result<Option<AssertionCredential>, PasskeyError>;
}
