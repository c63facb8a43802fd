use chrono::{DateTime, Utc};
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};

use crate::error::SubscriptionError;

// Token signed by the billing server; the client presents it to unlock publishing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionToken {
    pub account_id: String,
    pub valid_until: DateTime<Utc>,
    pub signature: Vec<u8>,
}

// payload = account_id || valid_until (rfc3339)
fn signing_payload(account_id: &str, valid_until: &DateTime<Utc>) -> Vec<u8> {
    let mut payload = Vec::new();
    payload.extend_from_slice(account_id.as_bytes());
    payload.extend_from_slice(valid_until.to_rfc3339().as_bytes());
    payload
}

/// Verify a token's expiry and signature against the billing server key.
pub fn verify_subscription(
    token: &SubscriptionToken,
    server_pubkey: &[u8; 32],
    now: DateTime<Utc>,
) -> Result<(), SubscriptionError> {
    if now > token.valid_until {
        return Err(SubscriptionError::Expired);
    }

    let verifying_key =
        VerifyingKey::from_bytes(server_pubkey).map_err(|_| SubscriptionError::InvalidServerKey)?;

    let signature = Signature::from_slice(&token.signature)
        .map_err(|_| SubscriptionError::InvalidSignature)?;

    let payload = signing_payload(&token.account_id, &token.valid_until);
    verifying_key
        .verify(&payload, &signature)
        .map_err(|_| SubscriptionError::InvalidSignature)
}

pub fn check_subscription_status(token: &SubscriptionToken, server_pubkey: &[u8; 32]) -> bool {
    verify_subscription(token, server_pubkey, Utc::now()).is_ok()
}

pub fn create_subscription_token(
    account_id: &str,
    valid_until: DateTime<Utc>,
    server_signing_key: &ed25519_dalek::SigningKey,
) -> SubscriptionToken {
    use ed25519_dalek::Signer;

    let payload = signing_payload(account_id, &valid_until);
    let signature = server_signing_key.sign(&payload);

    SubscriptionToken {
        account_id: account_id.to_string(),
        valid_until,
        signature: signature.to_bytes().to_vec(),
    }
}

/// Parse a 64-character hex string into a 32-byte public key.
pub fn parse_hex_pubkey(hex_str: &str) -> Result<[u8; 32], String> {
    let bytes = hex::decode(hex_str.trim()).map_err(|e| e.to_string())?;
    if bytes.len() != 32 {
        return Err(format!("expected 32 bytes, got {}", bytes.len()));
    }
    let mut key = [0u8; 32];
    key.copy_from_slice(&bytes);
    Ok(key)
}
