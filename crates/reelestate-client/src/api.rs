//! HTTP backend for listings and uploads.

use reqwest::multipart::{Form, Part};
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use tracing::{debug, info, warn};

use reelestate_shared::timecode::parse_mm_ss;
use reelestate_shared::{FeedItem, FeedPreferences, HighlightMarker, ItemId};
use reelestate_upload::{FieldErrors, UploadCollaborator, UploadError, UploadReceipt, UploadRequest};

use crate::error::{ClientError, Result};
use crate::preferences::ListingSource;

#[derive(Debug, Deserialize)]
struct PublicHighlight {
    room: String,
    start_time: String,
}

#[derive(Debug, Deserialize)]
struct PublicVideo {
    id: String,
    video_url: String,
    #[serde(default)]
    duration: Option<f64>,
    #[serde(default)]
    highlights: Vec<PublicHighlight>,
}

impl PublicVideo {
    fn into_item(self) -> FeedItem {
        let highlights = self
            .highlights
            .into_iter()
            .filter_map(|h| match parse_mm_ss(&h.start_time) {
                Ok(timestamp) => Some(HighlightMarker {
                    label: h.room,
                    timestamp,
                }),
                Err(e) => {
                    warn!(video = %self.id, error = %e, "Skipping malformed highlight");
                    None
                }
            })
            .collect();
        FeedItem {
            id: ItemId(self.id),
            media_uri: self.video_url,
            duration: self.duration,
            highlights,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    errors: FieldErrors,
    #[serde(default)]
    error: Option<String>,
}

/// Map a failed upload response onto the wizard's error model. Validation
/// statuses with a field map become a rejection; everything else is a
/// transport failure carrying the server's message if it sent one.
fn upload_error(status: StatusCode, body: &str) -> UploadError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let validation = status == StatusCode::BAD_REQUEST || status == StatusCode::UNPROCESSABLE_ENTITY;
    if validation && !parsed.errors.is_empty() {
        return UploadError::Rejected(parsed.errors);
    }
    let message = parsed
        .error
        .unwrap_or_else(|| format!("server responded {status}"));
    UploadError::Transport(message)
}

fn local_path(media_uri: &str) -> &str {
    media_uri.strip_prefix("file://").unwrap_or(media_uri)
}

#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Public listing URL for a set of filters. Unset filters are omitted.
    pub fn listing_url(&self, preferences: &FeedPreferences, offset: usize) -> Result<Url> {
        let mut params = vec![(
            "transaction_type",
            preferences.transaction_type.as_query().to_string(),
        )];
        if let Some(city) = preferences.location.as_deref().filter(|c| !c.is_empty()) {
            params.push(("city", city.to_string()));
        }
        if !preferences.lifestyle_tags.is_empty() {
            let tags: Vec<&str> = preferences.lifestyle_tags.iter().map(String::as_str).collect();
            params.push(("lifestyle", tags.join(",")));
        }
        if offset > 0 {
            params.push(("offset", offset.to_string()));
        }

        let endpoint = format!("{}/api/public-videos", self.base_url);
        Url::parse_with_params(&endpoint, &params).map_err(|e| ClientError::InvalidUrl(e.to_string()))
    }

    pub fn upload_url(&self) -> String {
        format!("{}/api/videos", self.base_url)
    }

    async fn send_upload(&self, request: UploadRequest) -> std::result::Result<UploadReceipt, UploadError> {
        let path = local_path(&request.media_uri).to_string();
        let data = tokio::fs::read(&path)
            .await
            .map_err(|e| UploadError::Transport(format!("Failed to read video: {e}")))?;

        let file_name = std::path::Path::new(&path)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("listing.mp4")
            .to_string();
        let size = data.len();

        let video = Part::bytes(data)
            .file_name(file_name)
            .mime_str("video/mp4")
            .map_err(|e| UploadError::Transport(e.to_string()))?;

        let listing = serde_json::to_string(&request.listing)
            .map_err(|e| UploadError::Transport(format!("Serialization failed: {e}")))?;
        let highlights = serde_json::to_string(&request.highlights)
            .map_err(|e| UploadError::Transport(format!("Serialization failed: {e}")))?;

        let mut form = Form::new()
            .text("draft_id", request.draft_id.to_string())
            .part("video", video)
            .text("listing", listing)
            .text("highlights", highlights);
        if let Some(overlay) = &request.overlay {
            let overlay = serde_json::to_string(overlay)
                .map_err(|e| UploadError::Transport(format!("Serialization failed: {e}")))?;
            form = form.text("overlay", overlay);
        }

        debug!(draft = %request.draft_id, size, "Uploading listing video");

        let resp = self
            .client
            .post(self.upload_url())
            .multipart(form)
            .send()
            .await
            .map_err(|e| UploadError::Transport(format!("Could not reach server: {e}")))?;

        let status = resp.status();
        if status.is_success() {
            let receipt: UploadReceipt = resp
                .json()
                .await
                .map_err(|e| UploadError::Transport(format!("Invalid server response: {e}")))?;
            info!(draft = %request.draft_id, video = %receipt.video_id, "Upload accepted");
            return Ok(receipt);
        }

        let body = resp.text().await.unwrap_or_default();
        Err(upload_error(status, &body))
    }
}

impl ListingSource for HttpBackend {
    async fn fetch(&self, preferences: &FeedPreferences, offset: usize) -> Result<Vec<FeedItem>> {
        let url = self.listing_url(preferences, offset)?;
        debug!(url = %url, "Fetching listings");

        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.error)
                .unwrap_or(body);
            return Err(ClientError::Server {
                status: status.as_u16(),
                message,
            });
        }

        let videos: Vec<PublicVideo> = resp
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;
        Ok(videos.into_iter().map(PublicVideo::into_item).collect())
    }
}

impl UploadCollaborator for HttpBackend {
    async fn upload(&self, request: UploadRequest) -> std::result::Result<UploadReceipt, UploadError> {
        self.send_upload(request).await
    }
}
