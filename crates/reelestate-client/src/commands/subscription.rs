use chrono::Utc;
use serde::Serialize;
use tracing::info;

use reelestate_shared::error::SubscriptionError;
use reelestate_shared::subscription::{verify_subscription, SubscriptionToken};

use crate::error::ClientError;
use crate::state::AppState;

#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionStatus {
    pub is_active: bool,
    pub required: bool,
    pub valid_until: Option<String>,
}

pub fn sign_in(state: &AppState, account_id: String) -> Result<(), String> {
    let account_id = account_id.trim().to_string();
    if account_id.is_empty() {
        return Err("Account id is empty".into());
    }

    let mut account = state
        .account_id
        .lock()
        .map_err(|e| format!("Lock poisoned: {e}"))?;
    if account.as_deref() != Some(account_id.as_str()) {
        // A subscription belongs to the account that activated it.
        let mut sub = state
            .subscription
            .lock()
            .map_err(|e| format!("Lock poisoned: {e}"))?;
        sub.valid_until = None;
    }
    info!(account = %account_id, "Account signed in");
    *account = Some(account_id);
    Ok(())
}

pub fn check_subscription(state: &AppState) -> Result<SubscriptionStatus, String> {
    let sub = state
        .subscription
        .lock()
        .map_err(|e| format!("Lock poisoned: {e}"))?;

    Ok(SubscriptionStatus {
        is_active: sub.is_active(Utc::now()),
        required: state.config.subscription_required,
        valid_until: sub.valid_until.map(|t| t.to_rfc3339()),
    })
}

pub fn activate_subscription(
    state: &AppState,
    token_json: String,
) -> Result<SubscriptionStatus, String> {
    let token: SubscriptionToken =
        serde_json::from_str(&token_json).map_err(|e| format!("Invalid token JSON: {e}"))?;

    // Held until the subscription is written so a concurrent sign-in cannot
    // inherit this account's token. Same lock order as `sign_in`.
    let account = state
        .account_id
        .lock()
        .map_err(|e| format!("Lock poisoned: {e}"))?;
    let Some(signed_in) = account.as_deref() else {
        return Err(ClientError::NotSignedIn.to_string());
    };
    if token.account_id != signed_in {
        return Err(SubscriptionError::AccountMismatch.to_string());
    }

    verify_subscription(&token, &state.config.billing_server_pubkey, Utc::now())
        .map_err(|e| e.to_string())?;

    let mut sub = state
        .subscription
        .lock()
        .map_err(|e| format!("Lock poisoned: {e}"))?;
    sub.valid_until = Some(token.valid_until);
    drop(sub);
    drop(account);

    info!(
        valid_until = %token.valid_until.to_rfc3339(),
        "Subscription activated"
    );

    Ok(SubscriptionStatus {
        is_active: true,
        required: state.config.subscription_required,
        valid_until: Some(token.valid_until.to_rfc3339()),
    })
}

/// Refuse publishing when a subscription is required but not active.
pub(crate) fn ensure_can_publish(state: &AppState) -> Result<(), ClientError> {
    if !state.config.subscription_required {
        return Ok(());
    }
    let sub = state.subscription.lock()?;
    if sub.is_active(Utc::now()) {
        Ok(())
    } else {
        Err(ClientError::SubscriptionRequired)
    }
}
