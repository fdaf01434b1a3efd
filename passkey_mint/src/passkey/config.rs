use std::{env, sync::LazyLock};

use super::errors::PasskeyError;

pub(super) static ORIGIN: LazyLock<String> = LazyLock::new(|| {
    env::var("ORIGIN").unwrap_or_else(|_| "http://localhost:3000".to_string())
});

pub(super) static PASSKEY_RP_ID: LazyLock<String> =
    LazyLock::new(|| rp_id_from_origin(&ORIGIN).expect("Could not extract RP ID from ORIGIN"));

/// The RP id is the host of the origin.
pub(super) fn rp_id_from_origin(origin: &str) -> Result<String, PasskeyError> {
    url::Url::parse(origin)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_string()))
        .ok_or_else(|| PasskeyError::Config(format!("ORIGIN {origin} has no host")))
}

pub(super) static PASSKEY_RP_NAME: LazyLock<String> = LazyLock::new(|| {
    env::var("PASSKEY_RP_NAME").unwrap_or_else(|_| "Safe SmartAccount".to_string())
});

/// Name shown for the passkey owner. Every created passkey uses the same one.
pub(super) static PASSKEY_USER_DISPLAY_NAME: LazyLock<String> = LazyLock::new(|| {
    env::var("PASSKEY_USER_DISPLAY_NAME").unwrap_or_else(|_| "Safe Owner".to_string())
});

/// Ceremony timeout in seconds
pub(super) static PASSKEY_TIMEOUT: LazyLock<u32> = LazyLock::new(|| {
    env::var("PASSKEY_TIMEOUT")
        .ok()
        .and_then(|secs| secs.parse().ok())
        .unwrap_or(60)
});

/// `userVerification` requested for assertions: required, preferred or discouraged
pub(super) static PASSKEY_USER_VERIFICATION: LazyLock<String> = LazyLock::new(|| {
    let Ok(value) = env::var("PASSKEY_USER_VERIFICATION") else {
        return "required".to_string();
    };
    let value = value.to_lowercase();
    if ["required", "preferred", "discouraged"].contains(&value.as_str()) {
        value
    } else {
        tracing::warn!(
            "PASSKEY_USER_VERIFICATION={} is not a WebAuthn value, requiring verification",
            value
        );
        "required".to_string()
    }
});
