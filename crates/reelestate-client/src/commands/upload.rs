//! Upload wizard commands.
//!
//! Every mutating command returns the refreshed [`WizardView`] so the shell
//! can re-render the current step from a single payload.

use serde::{Deserialize, Serialize};
use tracing::info;

use reelestate_shared::ListingCategory;
use reelestate_upload::collaborators::HighlightPayload;
use reelestate_upload::details::{CategoryDetails, PropertyType};
use reelestate_upload::highlights::HighlightEntry;
use reelestate_upload::overlay::TextOverlay;
use reelestate_upload::wizard::{SelectOutcome, ShareChoice};
use reelestate_upload::{
    FieldErrors, MediaPicker, MediaSource, PermissionProvider, StepKind, UploadCollaborator,
    UploadReceipt, UploadWizard, WizardError, WizardStep,
};

use crate::commands::subscription::ensure_can_publish;
use crate::state::AppState;

#[derive(Debug, Clone, Serialize)]
pub struct WizardView {
    pub step: StepKind,
    pub media_uri: Option<String>,
    pub overlay: Option<TextOverlay>,
    pub share_prompt: bool,
    /// Source whose permission was refused, for the retry prompt.
    pub denied_source: Option<MediaSource>,
    pub room_suggestions: Vec<&'static str>,
    pub rooms: Vec<String>,
    pub selected_room: Option<String>,
    pub highlights: Vec<HighlightPayload>,
    pub details: Option<CategoryDetails>,
    pub field_errors: FieldErrors,
    pub last_error: Option<String>,
}

fn payloads(entries: &[HighlightEntry]) -> Vec<HighlightPayload> {
    entries
        .iter()
        .map(|e| HighlightPayload {
            room: e.room.clone(),
            start_time: e.start_timecode(),
            end_time: 0,
        })
        .collect()
}

fn wizard_view(wizard: &UploadWizard) -> WizardView {
    let draft = wizard.draft();
    let mut view = WizardView {
        step: wizard.step_kind(),
        media_uri: draft.map(|d| d.media_uri.clone()),
        overlay: draft.and_then(|d| d.overlay.clone()),
        share_prompt: false,
        denied_source: wizard.denied_source(),
        room_suggestions: Vec::new(),
        rooms: Vec::new(),
        selected_room: None,
        highlights: Vec::new(),
        details: None,
        field_errors: FieldErrors::new(),
        last_error: None,
    };

    match wizard.step() {
        WizardStep::Select { .. } => {}
        WizardStep::Edit { share_prompt, .. } => view.share_prompt = *share_prompt,
        WizardStep::SelectHighlights { editor, .. } => {
            view.room_suggestions = editor.suggestions().to_vec();
            view.rooms = editor.rooms().to_vec();
            view.selected_room = editor.selected_room().map(str::to_string);
            view.highlights = payloads(editor.entries());
        }
        WizardStep::Details {
            highlights,
            form,
            errors,
            last_error,
            ..
        } => {
            view.highlights = payloads(highlights);
            view.details = Some(form.clone());
            view.field_errors = errors.clone();
            view.last_error = last_error.clone();
        }
    }
    view
}

async fn apply(
    state: &AppState,
    action: impl FnOnce(&mut UploadWizard) -> Result<(), WizardError>,
) -> Result<WizardView, String> {
    let mut wizard = state.wizard.lock().await;
    action(&mut wizard).map_err(|e| e.to_string())?;
    Ok(wizard_view(&wizard))
}

pub async fn get_wizard(state: &AppState) -> Result<WizardView, String> {
    let wizard = state.wizard.lock().await;
    Ok(wizard_view(&wizard))
}

pub async fn select_source<P, M>(
    state: &AppState,
    source: MediaSource,
    permissions: &P,
    picker: &M,
) -> Result<WizardView, String>
where
    P: PermissionProvider,
    M: MediaPicker,
{
    let mut wizard = state.wizard.lock().await;
    let outcome = wizard
        .select_source(source, permissions, picker)
        .await
        .map_err(|e| e.to_string())?;
    if outcome == SelectOutcome::PermissionDenied {
        info!(source = ?source, "Waiting for the user to grant media access");
    }
    Ok(wizard_view(&wizard))
}

pub async fn set_overlay(state: &AppState, overlay: TextOverlay) -> Result<WizardView, String> {
    apply(state, |w| w.set_overlay(overlay)).await
}

pub async fn skip_text(state: &AppState) -> Result<WizardView, String> {
    apply(state, |w| w.skip_text()).await
}

pub async fn delete_video(state: &AppState) -> Result<WizardView, String> {
    apply(state, |w| w.delete_video()).await
}

pub async fn continue_to_share(state: &AppState) -> Result<WizardView, String> {
    apply(state, |w| w.continue_to_share()).await
}

pub async fn choose_share(state: &AppState, choice: ShareChoice) -> Result<WizardView, String> {
    apply(state, |w| w.choose_share(choice).map(|_| ())).await
}

pub async fn add_room(state: &AppState, base: String) -> Result<WizardView, String> {
    apply(state, |w| w.add_room(&base).map(|_| ())).await
}

pub async fn select_room(state: &AppState, label: String) -> Result<WizardView, String> {
    apply(state, |w| w.select_room(&label)).await
}

pub async fn mark_highlight(state: &AppState, timestamp: f64) -> Result<WizardView, String> {
    apply(state, |w| w.mark_highlight(timestamp).map(|_| ())).await
}

pub async fn remove_highlight(state: &AppState, label: String) -> Result<WizardView, String> {
    apply(state, |w| w.remove_highlight(&label)).await
}

pub async fn finish_highlights(state: &AppState) -> Result<WizardView, String> {
    apply(state, |w| w.finish_highlights()).await
}

pub async fn back(state: &AppState) -> Result<WizardView, String> {
    apply(state, |w| w.back().map(|_| ())).await
}

pub async fn edit_highlights(state: &AppState) -> Result<WizardView, String> {
    apply(state, |w| w.edit_highlights()).await
}

pub async fn set_category(
    state: &AppState,
    category: ListingCategory,
) -> Result<WizardView, String> {
    apply(state, |w| w.set_category(category)).await
}

/// Partial update of the READY form; absent fields are left alone.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReadyFieldsUpdate {
    pub title: Option<String>,
    pub price: Option<u64>,
    pub property_type: Option<PropertyType>,
    pub bedrooms: Option<u8>,
    pub bathrooms: Option<u8>,
    pub size_sqft: Option<f64>,
}

pub async fn update_ready_fields(
    state: &AppState,
    update: ReadyFieldsUpdate,
) -> Result<WizardView, String> {
    apply(state, |w| {
        let ready = w.ready_mut()?;
        if let Some(title) = update.title {
            ready.title = title;
        }
        if update.price.is_some() {
            ready.price = update.price;
        }
        if update.property_type.is_some() {
            ready.property_type = update.property_type;
        }
        if update.bedrooms.is_some() {
            ready.bedrooms = update.bedrooms;
        }
        if update.bathrooms.is_some() {
            ready.bathrooms = update.bathrooms;
        }
        if update.size_sqft.is_some() {
            ready.size_sqft = update.size_sqft;
        }
        Ok(())
    })
    .await
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationLevel {
    Emirate,
    District,
    Building,
    Area,
}

pub async fn select_location(
    state: &AppState,
    level: LocationLevel,
    value: String,
) -> Result<WizardView, String> {
    apply(state, |w| {
        let location = &mut w.ready_mut()?.location;
        match level {
            LocationLevel::Emirate => {
                location.set_emirate(value);
                Ok(())
            }
            LocationLevel::District => location.set_district(value),
            LocationLevel::Building => location.set_building(value),
            LocationLevel::Area => location.set_area(value),
        }
    })
    .await
}

pub async fn select_project(
    state: &AppState,
    project_id: String,
    project_title: String,
) -> Result<WizardView, String> {
    apply(state, |w| w.select_project(project_id, project_title)).await
}

pub async fn discard(state: &AppState) -> Result<WizardView, String> {
    let mut wizard = state.wizard.lock().await;
    wizard.discard();
    Ok(wizard_view(&wizard))
}

/// Publish the draft. Refused up front when a subscription is required and
/// missing; on any failure the draft stays on the details step.
pub async fn publish<U: UploadCollaborator>(
    state: &AppState,
    uploader: &U,
) -> Result<UploadReceipt, String> {
    let mut wizard = state.wizard.lock().await;
    if let Err(e) = ensure_can_publish(state) {
        let message = e.to_string();
        wizard.refuse_publish(message.clone()).map_err(|e| e.to_string())?;
        return Err(message);
    }
    wizard.publish(uploader).await.map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use reelestate_upload::collaborators::ListingPayload;
    use reelestate_upload::{PermissionStatus, UploadError, UploadRequest};

    use super::*;
    use crate::config::ClientConfig;
    use crate::state::testing::test_state;

    struct Granted;

    impl PermissionProvider for Granted {
        async fn request_camera(&self) -> PermissionStatus {
            PermissionStatus::Granted
        }

        async fn request_media_library(&self) -> PermissionStatus {
            PermissionStatus::Granted
        }
    }

    struct Denied;

    impl PermissionProvider for Denied {
        async fn request_camera(&self) -> PermissionStatus {
            PermissionStatus::Denied
        }

        async fn request_media_library(&self) -> PermissionStatus {
            PermissionStatus::Denied
        }
    }

    struct Picker;

    impl MediaPicker for Picker {
        async fn pick(&self, _source: MediaSource) -> Option<String> {
            Some("file:///tmp/tour.mp4".into())
        }
    }

    #[derive(Default)]
    struct RecordingUploader {
        requests: Mutex<Vec<UploadRequest>>,
    }

    impl UploadCollaborator for RecordingUploader {
        async fn upload(&self, request: UploadRequest) -> Result<UploadReceipt, UploadError> {
            self.requests.lock().unwrap().push(request);
            Ok(UploadReceipt {
                video_id: "vid-9".into(),
            })
        }
    }

    fn open_config() -> ClientConfig {
        ClientConfig {
            subscription_required: false,
            ..Default::default()
        }
    }

    async fn to_details(state: &AppState) {
        select_source(state, MediaSource::Camera, &Granted, &Picker)
            .await
            .unwrap();
        skip_text(state).await.unwrap();
        continue_to_share(state).await.unwrap();
        choose_share(state, ShareChoice::Skip).await.unwrap();
        add_room(state, "Kitchen".into()).await.unwrap();
        mark_highlight(state, 12.0).await.unwrap();
        let view = finish_highlights(state).await.unwrap();
        assert_eq!(view.step, StepKind::Details);
    }

    #[tokio::test]
    async fn test_off_plan_publish_through_commands() {
        let (state, _) = test_state(open_config());
        to_details(&state).await;
        set_category(&state, ListingCategory::OffPlan).await.unwrap();
        select_project(&state, "X123".into(), "Creek Rise".into())
            .await
            .unwrap();

        let uploader = RecordingUploader::default();
        let receipt = publish(&state, &uploader).await.unwrap();
        assert_eq!(receipt.video_id, "vid-9");
        assert_eq!(get_wizard(&state).await.unwrap().step, StepKind::Select);

        let sent = uploader.requests.lock().unwrap();
        assert_eq!(sent[0].highlights[0].start_time, "00:12");
        assert!(matches!(
            &sent[0].listing,
            ListingPayload::OffPlan { project_id, .. } if project_id == "X123"
        ));
    }

    #[tokio::test]
    async fn test_publish_requires_subscription() {
        let (state, _) = test_state(ClientConfig::default());
        to_details(&state).await;
        set_category(&state, ListingCategory::OffPlan).await.unwrap();
        select_project(&state, "X123".into(), "Creek Rise".into())
            .await
            .unwrap();

        let uploader = RecordingUploader::default();
        let err = publish(&state, &uploader).await.unwrap_err();
        assert_eq!(err, "Active subscription required to publish listings");
        assert!(uploader.requests.lock().unwrap().is_empty());
        let view = get_wizard(&state).await.unwrap();
        assert_eq!(view.step, StepKind::Details);
        assert_eq!(
            view.last_error.as_deref(),
            Some("Active subscription required to publish listings")
        );
    }

    #[tokio::test]
    async fn test_ready_form_and_gated_location() {
        let (state, _) = test_state(open_config());
        to_details(&state).await;

        let err = select_location(&state, LocationLevel::District, "Marina".into())
            .await
            .unwrap_err();
        assert_eq!(err, "district requires emirate to be selected first");

        select_location(&state, LocationLevel::Emirate, "Dubai".into())
            .await
            .unwrap();
        select_location(&state, LocationLevel::District, "Marina".into())
            .await
            .unwrap();
        let view = update_ready_fields(
            &state,
            ReadyFieldsUpdate {
                title: Some("Marina loft".into()),
                price: Some(900_000),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        match view.details {
            Some(CategoryDetails::Ready(ready)) => {
                assert_eq!(ready.title, "Marina loft");
                assert_eq!(ready.price, Some(900_000));
                assert_eq!(ready.location.district(), Some("Marina"));
            }
            other => panic!("unexpected details {other:?}"),
        }

        // Publishing the half-filled form keeps it and lists what is missing.
        let err = publish(&state, &RecordingUploader::default())
            .await
            .unwrap_err();
        assert_eq!(err, "Listing details are incomplete");
        let view = get_wizard(&state).await.unwrap();
        assert!(view.field_errors.contains_key("building"));
        assert!(!view.field_errors.contains_key("title"));
    }

    #[tokio::test]
    async fn test_denied_permission_view() {
        let (state, _) = test_state(open_config());
        let view = select_source(&state, MediaSource::Library, &Denied, &Picker)
            .await
            .unwrap();
        assert_eq!(view.step, StepKind::Select);
        assert_eq!(view.denied_source, Some(MediaSource::Library));
    }

    #[tokio::test]
    async fn test_highlight_view_and_discard() {
        let (state, _) = test_state(open_config());
        select_source(&state, MediaSource::Camera, &Granted, &Picker)
            .await
            .unwrap();
        continue_to_share(&state).await.unwrap();
        choose_share(&state, ShareChoice::Skip).await.unwrap();
        add_room(&state, "Kitchen".into()).await.unwrap();
        let view = add_room(&state, "Kitchen".into()).await.unwrap();
        assert_eq!(view.rooms, vec!["Kitchen".to_string(), "Kitchen 2".to_string()]);
        assert_eq!(view.selected_room.as_deref(), Some("Kitchen 2"));
        assert_eq!(view.room_suggestions.len(), 4);

        let view = discard(&state).await.unwrap();
        assert_eq!(view.step, StepKind::Select);
        assert_eq!(view.media_uri, None);
    }
}
