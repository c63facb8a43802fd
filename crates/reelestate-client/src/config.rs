//! Client configuration loaded from environment variables.
//!
//! Every setting has a default so the app starts with zero configuration
//! against a local backend.

use std::time::Duration;

use reelestate_feed::driver::FeedVariant;
use reelestate_feed::FeedConfig;
use reelestate_shared::constants::{
    DEFAULT_API_BASE_URL, DEFAULT_DRAG_THRESHOLD_PX, DEFAULT_PREFETCH_THRESHOLD,
    DEFAULT_RETAIN_AHEAD, DEFAULT_RETAIN_BEHIND, DEFAULT_SAMPLE_INTERVAL_MS,
    DEFAULT_VISIBILITY_THRESHOLD,
};
use reelestate_shared::subscription::parse_hex_pubkey;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend root for listing and upload requests.
    /// Env: `API_BASE_URL`
    /// Default: `http://localhost:8080`
    pub api_base_url: String,

    /// Visible fraction at which a feed row counts as on screen.
    /// Env: `VISIBILITY_THRESHOLD`
    /// Default: `0.8`
    pub visibility_threshold: f32,

    /// Progress clock cadence.
    /// Env: `SAMPLE_INTERVAL_MS`
    /// Default: `100`
    pub sample_interval: Duration,

    /// Env: `DRAG_THRESHOLD_PX`
    /// Default: `4.0`
    pub drag_threshold: f64,

    /// Env: `RETAIN_BEHIND` / `RETAIN_AHEAD`
    /// Default: `1` / `2`
    pub retain_behind: usize,
    pub retain_ahead: usize,

    /// Env: `PREFETCH_THRESHOLD`
    /// Default: `3`
    pub prefetch_threshold: usize,

    /// Whether publishing needs an active subscription.
    /// Env: `SUBSCRIPTION_REQUIRED` (true/false)
    /// Default: `true`
    pub subscription_required: bool,

    /// Ed25519 public key of the billing server (hex-encoded, 64 chars).
    /// Env: `BILLING_SERVER_PUBKEY`
    /// Default: all-zeros (development only).
    pub billing_server_pubkey: [u8; 32],
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            visibility_threshold: DEFAULT_VISIBILITY_THRESHOLD,
            sample_interval: Duration::from_millis(DEFAULT_SAMPLE_INTERVAL_MS),
            drag_threshold: DEFAULT_DRAG_THRESHOLD_PX,
            retain_behind: DEFAULT_RETAIN_BEHIND,
            retain_ahead: DEFAULT_RETAIN_AHEAD,
            prefetch_threshold: DEFAULT_PREFETCH_THRESHOLD,
            subscription_required: true,
            billing_server_pubkey: [0u8; 32],
        }
    }
}

fn parse_flag(val: &str) -> bool {
    val != "false" && val != "0"
}

impl ClientConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] over an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = lookup("API_BASE_URL") {
            let url = url.trim().trim_end_matches('/');
            if !url.is_empty() {
                config.api_base_url = url.to_string();
            }
        }

        if let Some(val) = lookup("VISIBILITY_THRESHOLD") {
            match val.parse::<f32>() {
                Ok(t) if t > 0.0 && t <= 1.0 => config.visibility_threshold = t,
                _ => tracing::warn!(value = %val, "Invalid VISIBILITY_THRESHOLD, using default"),
            }
        }

        if let Some(val) = lookup("SAMPLE_INTERVAL_MS") {
            match val.parse::<u64>() {
                Ok(ms) if ms > 0 => config.sample_interval = Duration::from_millis(ms),
                _ => tracing::warn!(value = %val, "Invalid SAMPLE_INTERVAL_MS, using default"),
            }
        }

        if let Some(val) = lookup("DRAG_THRESHOLD_PX") {
            match val.parse::<f64>() {
                Ok(px) if px.is_finite() && px >= 0.0 => config.drag_threshold = px,
                _ => tracing::warn!(value = %val, "Invalid DRAG_THRESHOLD_PX, using default"),
            }
        }

        if let Some(n) = lookup("RETAIN_BEHIND").and_then(|v| v.parse::<usize>().ok()) {
            config.retain_behind = n;
        }

        if let Some(n) = lookup("RETAIN_AHEAD").and_then(|v| v.parse::<usize>().ok()) {
            config.retain_ahead = n;
        }

        if let Some(n) = lookup("PREFETCH_THRESHOLD").and_then(|v| v.parse::<usize>().ok()) {
            config.prefetch_threshold = n;
        }

        if let Some(val) = lookup("SUBSCRIPTION_REQUIRED") {
            config.subscription_required = parse_flag(&val);
        }

        if let Some(hex_key) = lookup("BILLING_SERVER_PUBKEY") {
            match parse_hex_pubkey(&hex_key) {
                Ok(key) => config.billing_server_pubkey = key,
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        "Invalid BILLING_SERVER_PUBKEY, using default (dev-only)"
                    );
                }
            }
        }

        config
    }

    /// Feed controller settings for one screen.
    pub fn feed_config(&self, variant: FeedVariant) -> FeedConfig {
        FeedConfig {
            variant,
            visibility_threshold: self.visibility_threshold,
            sample_interval: self.sample_interval,
            drag_threshold: self.drag_threshold,
            retain_behind: self.retain_behind,
            retain_ahead: self.retain_ahead,
            prefetch_threshold: self.prefetch_threshold,
        }
    }
}
