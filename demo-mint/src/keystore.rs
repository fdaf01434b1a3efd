use passkey_mint::{SoftwareAuthenticator, SoftwareCredential};
use std::path::Path;

/// Restores the authenticator's keys from `path`, if the file exists.
pub(crate) async fn load(
    authenticator: &SoftwareAuthenticator,
    path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    if !path.exists() {
        tracing::debug!("No keystore at {}, starting empty", path.display());
        return Ok(());
    }

    let contents = std::fs::read_to_string(path)?;
    let credentials: Vec<SoftwareCredential> = serde_json::from_str(&contents)?;
    tracing::debug!("Loaded {} credentials from {}", credentials.len(), path.display());
    authenticator.import_credentials(credentials).await?;
    Ok(())
}

/// Writes every key the authenticator holds to `path`.
pub(crate) async fn save(
    authenticator: &SoftwareAuthenticator,
    path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let credentials = authenticator.export_credentials().await;
    std::fs::write(path, serde_json::to_string_pretty(&credentials)?)?;
    tracing::debug!("Saved {} credentials to {}", credentials.len(), path.display());
    Ok(())
}
