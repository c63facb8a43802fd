//! Platform and backend seams the wizard talks to.
//!
//! Implementations live outside this crate: the mobile shell provides the
//! permission dialogs and pickers, and the client crate provides an HTTP
//! [`UploadCollaborator`].

use std::collections::BTreeMap;
use std::future::Future;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use reelestate_shared::DraftId;

use crate::overlay::TextOverlay;

/// Field name → user-facing messages, shown field by field on the details
/// step exactly as the server sent them.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaSource {
    Camera,
    Library,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

pub trait PermissionProvider {
    fn request_camera(&self) -> impl Future<Output = PermissionStatus> + Send;

    fn request_media_library(&self) -> impl Future<Output = PermissionStatus> + Send;
}

/// Records or picks a video. `None` means the user backed out.
pub trait MediaPicker {
    fn pick(&self, source: MediaSource) -> impl Future<Output = Option<String>> + Send;
}

/// Highlight as the upload API expects it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightPayload {
    pub room: String,
    /// `MM:SS`
    pub start_time: String,
    pub end_time: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ListingPayload {
    Ready {
        title: String,
        price: u64,
        property_type: String,
        bedrooms: u8,
        bathrooms: u8,
        size_sqft: f64,
        emirate: String,
        district: String,
        building: String,
        area: String,
    },
    OffPlan {
        project_id: String,
        project_title: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadRequest {
    pub draft_id: DraftId,
    pub media_uri: String,
    pub overlay: Option<TextOverlay>,
    pub listing: ListingPayload,
    pub highlights: Vec<HighlightPayload>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub video_id: String,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum UploadError {
    /// The server refused the listing, with per-field reasons.
    #[error("Upload rejected: {0:?}")]
    Rejected(FieldErrors),

    #[error("Upload transport error: {0}")]
    Transport(String),
}

pub trait UploadCollaborator {
    fn upload(
        &self,
        request: UploadRequest,
    ) -> impl Future<Output = Result<UploadReceipt, UploadError>> + Send;
}
