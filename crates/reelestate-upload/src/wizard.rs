use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use reelestate_shared::timecode::format_mm_ss;
use reelestate_shared::{DraftId, ListingCategory};

use crate::collaborators::{
    FieldErrors, HighlightPayload, MediaPicker, MediaSource, PermissionProvider, PermissionStatus,
    UploadCollaborator, UploadError, UploadReceipt, UploadRequest,
};
use crate::details::{CategoryDetails, OffPlanDetails, ProjectRef, ReadyDetails};
use crate::error::{Result, WizardError};
use crate::highlights::{entries_from_map, HighlightEditor, HighlightEntry};
use crate::overlay::TextOverlay;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Select,
    Edit,
    SelectHighlights,
    Details,
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StepKind::Select => "select",
            StepKind::Edit => "edit",
            StepKind::SelectHighlights => "highlights",
            StepKind::Details => "details",
        };
        f.write_str(name)
    }
}

/// The recorded or picked video plus everything attached to it before the
/// details form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftMedia {
    pub id: DraftId,
    pub media_uri: String,
    pub source: MediaSource,
    pub overlay: Option<TextOverlay>,
    /// Room → start seconds captured when tagging was left without
    /// finishing. Only read as an OFF_PLAN fallback.
    pub recorded_highlights: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShareChoice {
    Share,
    Skip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectOutcome {
    Selected,
    PermissionDenied,
    Cancelled,
}

/// Details form parked while the user goes back to re-tag highlights.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailsResume {
    pub form: CategoryDetails,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WizardStep {
    Select {
        /// Source whose permission was refused last, for a retry prompt.
        denied: Option<MediaSource>,
    },
    Edit {
        draft: DraftMedia,
        share_prompt: bool,
    },
    SelectHighlights {
        draft: DraftMedia,
        editor: HighlightEditor,
        resume: Option<Box<DetailsResume>>,
    },
    Details {
        draft: DraftMedia,
        highlights: Vec<HighlightEntry>,
        form: CategoryDetails,
        errors: FieldErrors,
        last_error: Option<String>,
    },
}

impl Default for WizardStep {
    fn default() -> Self {
        WizardStep::Select { denied: None }
    }
}

impl WizardStep {
    pub fn kind(&self) -> StepKind {
        match self {
            WizardStep::Select { .. } => StepKind::Select,
            WizardStep::Edit { .. } => StepKind::Edit,
            WizardStep::SelectHighlights { .. } => StepKind::SelectHighlights,
            WizardStep::Details { .. } => StepKind::Details,
        }
    }

    pub fn draft(&self) -> Option<&DraftMedia> {
        match self {
            WizardStep::Select { .. } => None,
            WizardStep::Edit { draft, .. }
            | WizardStep::SelectHighlights { draft, .. }
            | WizardStep::Details { draft, .. } => Some(draft),
        }
    }
}

fn invalid(action: &'static str, step: &WizardStep) -> WizardError {
    WizardError::InvalidAction {
        action,
        step: step.kind(),
    }
}

/// Drives one draft at a time from media selection to publish.
#[derive(Debug, Default)]
pub struct UploadWizard {
    step: WizardStep,
}

impl UploadWizard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> &WizardStep {
        &self.step
    }

    pub fn step_kind(&self) -> StepKind {
        self.step.kind()
    }

    pub fn draft(&self) -> Option<&DraftMedia> {
        self.step.draft()
    }

    pub fn denied_source(&self) -> Option<MediaSource> {
        match &self.step {
            WizardStep::Select { denied } => *denied,
            _ => None,
        }
    }

    pub fn highlight_editor(&self) -> Option<&HighlightEditor> {
        match &self.step {
            WizardStep::SelectHighlights { editor, .. } => Some(editor),
            _ => None,
        }
    }

    pub fn details(&self) -> Option<&CategoryDetails> {
        match &self.step {
            WizardStep::Details { form, .. } => Some(form),
            _ => None,
        }
    }

    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match &self.step {
            WizardStep::Details { errors, .. } => Some(errors),
            _ => None,
        }
    }

    pub fn last_error(&self) -> Option<&str> {
        match &self.step {
            WizardStep::Details { last_error, .. } => last_error.as_deref(),
            _ => None,
        }
    }

    /// Abandon the current draft. Nothing is saved.
    pub fn discard(&mut self) {
        if let Some(draft) = self.step.draft() {
            info!(draft = %draft.id, step = %self.step.kind(), "Draft discarded");
        }
        self.step = WizardStep::default();
    }

    // Select

    pub async fn select_source<P, M>(
        &mut self,
        source: MediaSource,
        permissions: &P,
        picker: &M,
    ) -> Result<SelectOutcome>
    where
        P: PermissionProvider,
        M: MediaPicker,
    {
        if !matches!(self.step, WizardStep::Select { .. }) {
            return Err(invalid("select a video", &self.step));
        }

        let status = match source {
            MediaSource::Camera => permissions.request_camera().await,
            MediaSource::Library => permissions.request_media_library().await,
        };
        if status == PermissionStatus::Denied {
            warn!(source = ?source, "Media permission denied");
            self.step = WizardStep::Select {
                denied: Some(source),
            };
            return Ok(SelectOutcome::PermissionDenied);
        }

        let Some(media_uri) = picker.pick(source).await else {
            debug!(source = ?source, "Media picker cancelled");
            self.step = WizardStep::default();
            return Ok(SelectOutcome::Cancelled);
        };

        let draft = DraftMedia {
            id: DraftId::new(),
            media_uri,
            source,
            overlay: None,
            recorded_highlights: BTreeMap::new(),
        };
        info!(draft = %draft.id, source = ?source, "Draft started");
        self.step = WizardStep::Edit {
            draft,
            share_prompt: false,
        };
        Ok(SelectOutcome::Selected)
    }

    // Edit

    pub fn set_overlay(&mut self, overlay: TextOverlay) -> Result<()> {
        match &mut self.step {
            WizardStep::Edit { draft, .. } => {
                if overlay.text.trim().is_empty() {
                    return Err(WizardError::EmptyOverlayText);
                }
                draft.overlay = Some(overlay);
                Ok(())
            }
            other => Err(invalid("set the overlay", other)),
        }
    }

    pub fn skip_text(&mut self) -> Result<()> {
        match &mut self.step {
            WizardStep::Edit { draft, .. } => {
                draft.overlay = None;
                Ok(())
            }
            other => Err(invalid("skip the overlay", other)),
        }
    }

    /// Throw the video away and go back to source selection.
    pub fn delete_video(&mut self) -> Result<()> {
        match std::mem::take(&mut self.step) {
            WizardStep::Edit { draft, .. } => {
                info!(draft = %draft.id, "Draft video deleted");
                Ok(())
            }
            other => {
                let err = invalid("delete the video", &other);
                self.step = other;
                Err(err)
            }
        }
    }

    pub fn continue_to_share(&mut self) -> Result<()> {
        match &mut self.step {
            WizardStep::Edit { share_prompt, .. } => {
                *share_prompt = true;
                Ok(())
            }
            other => Err(invalid("continue", other)),
        }
    }

    pub fn dismiss_share_prompt(&mut self) -> Result<()> {
        match &mut self.step {
            WizardStep::Edit { share_prompt, .. } => {
                *share_prompt = false;
                Ok(())
            }
            other => Err(invalid("dismiss the share prompt", other)),
        }
    }

    /// `Skip` goes to highlight tagging, `Share` straight to the details form.
    pub fn choose_share(&mut self, choice: ShareChoice) -> Result<StepKind> {
        match std::mem::take(&mut self.step) {
            WizardStep::Edit {
                draft,
                share_prompt: true,
            } => {
                self.step = match choice {
                    ShareChoice::Skip => {
                        let editor = if draft.recorded_highlights.is_empty() {
                            HighlightEditor::new()
                        } else {
                            HighlightEditor::from_entries(entries_from_map(
                                &draft.recorded_highlights,
                            ))
                        };
                        WizardStep::SelectHighlights {
                            draft,
                            editor,
                            resume: None,
                        }
                    }
                    ShareChoice::Share => WizardStep::Details {
                        draft,
                        highlights: Vec::new(),
                        form: CategoryDetails::default(),
                        errors: FieldErrors::new(),
                        last_error: None,
                    },
                };
                debug!(choice = ?choice, next = %self.step.kind(), "Share prompt answered");
                Ok(self.step.kind())
            }
            other @ WizardStep::Edit { .. } => {
                self.step = other;
                Err(WizardError::SharePromptClosed)
            }
            other => {
                let err = invalid("answer the share prompt", &other);
                self.step = other;
                Err(err)
            }
        }
    }

    // SelectHighlights

    fn editor_mut(&mut self, action: &'static str) -> Result<&mut HighlightEditor> {
        match &mut self.step {
            WizardStep::SelectHighlights { editor, .. } => Ok(editor),
            other => Err(invalid(action, other)),
        }
    }

    pub fn add_room(&mut self, base: &str) -> Result<String> {
        self.editor_mut("add a room")?.add_room(base)
    }

    pub fn select_room(&mut self, label: &str) -> Result<()> {
        self.editor_mut("select a room")?.select_room(label)
    }

    pub fn mark_highlight(&mut self, timestamp: f64) -> Result<HighlightEntry> {
        let entry = self.editor_mut("mark a highlight")?.mark(timestamp)?.clone();
        debug!(room = %entry.room, start = entry.start, "Highlight marked");
        Ok(entry)
    }

    pub fn remove_highlight(&mut self, label: &str) -> Result<()> {
        self.editor_mut("remove a highlight")?.remove_room(label)
    }

    /// Commit the tagged highlights and move to the details form. At least
    /// one highlight is required.
    pub fn finish_highlights(&mut self) -> Result<()> {
        match std::mem::take(&mut self.step) {
            WizardStep::SelectHighlights {
                draft,
                editor,
                resume,
            } => {
                if editor.is_empty() {
                    self.step = WizardStep::SelectHighlights {
                        draft,
                        editor,
                        resume,
                    };
                    return Err(WizardError::NoHighlights);
                }
                let highlights = editor.into_entries();
                info!(draft = %draft.id, count = highlights.len(), "Highlights committed");
                let form = resume.map(|r| r.form).unwrap_or_default();
                self.step = WizardStep::Details {
                    draft,
                    highlights,
                    form,
                    errors: FieldErrors::new(),
                    last_error: None,
                };
                Ok(())
            }
            other => {
                let err = invalid("finish highlights", &other);
                self.step = other;
                Err(err)
            }
        }
    }

    /// Step back one screen. Leaving tagging unfinished keeps what was
    /// marked in the draft's recorded map.
    pub fn back(&mut self) -> Result<StepKind> {
        match std::mem::take(&mut self.step) {
            WizardStep::SelectHighlights {
                mut draft,
                editor,
                resume,
            } => {
                draft.recorded_highlights = editor.timestamp_map();
                self.step = match resume {
                    Some(resume) => {
                        let highlights = editor.into_entries();
                        WizardStep::Details {
                            draft,
                            highlights,
                            form: resume.form,
                            errors: FieldErrors::new(),
                            last_error: None,
                        }
                    }
                    None => WizardStep::Edit {
                        draft,
                        share_prompt: false,
                    },
                };
            }
            WizardStep::Details {
                mut draft,
                highlights,
                ..
            } => {
                if !highlights.is_empty() {
                    draft.recorded_highlights =
                        highlights.into_iter().map(|e| (e.room, e.start)).collect();
                }
                self.step = WizardStep::Edit {
                    draft,
                    share_prompt: false,
                };
            }
            other => {
                let err = invalid("go back", &other);
                self.step = other;
                return Err(err);
            }
        }
        Ok(self.step.kind())
    }

    // Details

    fn form_mut(&mut self, action: &'static str) -> Result<&mut CategoryDetails> {
        match &mut self.step {
            WizardStep::Details { form, .. } => Ok(form),
            other => Err(invalid(action, other)),
        }
    }

    /// Pick READY or OFF_PLAN. Switching wipes the other category's fields
    /// and any errors shown for them.
    pub fn set_category(&mut self, category: ListingCategory) -> Result<()> {
        match &mut self.step {
            WizardStep::Details { form, errors, .. } => {
                if form.switch_to(category) {
                    errors.clear();
                    debug!(category = category.label(), "Listing category switched");
                }
                Ok(())
            }
            other => Err(invalid("set the category", other)),
        }
    }

    pub fn ready_mut(&mut self) -> Result<&mut ReadyDetails> {
        self.form_mut("edit listing details")?.ready_mut()
    }

    pub fn off_plan_mut(&mut self) -> Result<&mut OffPlanDetails> {
        self.form_mut("edit listing details")?.off_plan_mut()
    }

    pub fn select_project(&mut self, id: impl Into<String>, title: impl Into<String>) -> Result<()> {
        self.off_plan_mut()?.project = Some(ProjectRef {
            id: id.into(),
            title: title.into(),
        });
        Ok(())
    }

    /// Re-open highlight tagging from the details form, keeping the form.
    pub fn edit_highlights(&mut self) -> Result<()> {
        match std::mem::take(&mut self.step) {
            WizardStep::Details {
                draft,
                highlights,
                form,
                ..
            } => {
                let editor = if highlights.is_empty() {
                    HighlightEditor::from_entries(entries_from_map(&draft.recorded_highlights))
                } else {
                    HighlightEditor::from_entries(highlights)
                };
                self.step = WizardStep::SelectHighlights {
                    draft,
                    editor,
                    resume: Some(Box::new(DetailsResume { form })),
                };
                Ok(())
            }
            other => {
                let err = invalid("edit highlights", &other);
                self.step = other;
                Err(err)
            }
        }
    }

    fn build_request(&self) -> Result<UploadRequest> {
        let WizardStep::Details {
            draft,
            highlights,
            form,
            ..
        } = &self.step
        else {
            return Err(invalid("publish", &self.step));
        };

        let mut errors = form.validate();

        // OFF_PLAN listings fall back to the room map captured during an
        // unfinished tagging pass. Every listing needs at least one highlight.
        let entries = match form.category() {
            ListingCategory::OffPlan if highlights.is_empty() => {
                entries_from_map(&draft.recorded_highlights)
            }
            _ => highlights.clone(),
        };
        if entries.is_empty() {
            errors
                .entry("highlights".to_string())
                .or_default()
                .push("Mark at least one highlight".to_string());
        }

        let listing = match form.to_payload() {
            Some(listing) if errors.is_empty() => listing,
            _ => return Err(WizardError::Validation(errors)),
        };

        Ok(UploadRequest {
            draft_id: draft.id,
            media_uri: draft.media_uri.clone(),
            overlay: draft.overlay.clone(),
            listing,
            highlights: entries
                .iter()
                .map(|e| HighlightPayload {
                    room: e.room.clone(),
                    start_time: format_mm_ss(e.start),
                    end_time: 0,
                })
                .collect(),
        })
    }

    /// Show a publish refusal decided outside the wizard on the details
    /// form. Field errors are left as they are.
    pub fn refuse_publish(&mut self, message: impl Into<String>) -> Result<()> {
        match &mut self.step {
            WizardStep::Details { last_error, .. } => {
                *last_error = Some(message.into());
                Ok(())
            }
            other => Err(invalid("publish", other)),
        }
    }

    fn record_failure(&mut self, field_errors: FieldErrors, message: Option<String>) {
        if let WizardStep::Details {
            errors, last_error, ..
        } = &mut self.step
        {
            *errors = field_errors;
            *last_error = message;
        }
    }

    /// Validate and hand the draft to `uploader`. Success resets the wizard;
    /// any failure leaves the details form as it was, with errors attached.
    /// There is no automatic retry.
    pub async fn publish<U: UploadCollaborator>(&mut self, uploader: &U) -> Result<UploadReceipt> {
        let request = match self.build_request() {
            Ok(request) => request,
            Err(WizardError::Validation(errors)) => {
                debug!(fields = errors.len(), "Publish blocked by validation");
                self.record_failure(errors.clone(), None);
                return Err(WizardError::Validation(errors));
            }
            Err(e) => return Err(e),
        };

        let draft_id = request.draft_id;
        info!(
            draft = %draft_id,
            highlights = request.highlights.len(),
            "Publishing listing video"
        );

        match uploader.upload(request).await {
            Ok(receipt) => {
                info!(draft = %draft_id, video = %receipt.video_id, "Listing video published");
                self.step = WizardStep::default();
                Ok(receipt)
            }
            Err(UploadError::Rejected(errors)) => {
                warn!(draft = %draft_id, fields = errors.len(), "Upload rejected");
                self.record_failure(errors.clone(), None);
                Err(WizardError::Rejected(errors))
            }
            Err(UploadError::Transport(message)) => {
                warn!(draft = %draft_id, error = %message, "Upload failed");
                self.record_failure(FieldErrors::new(), Some(message.clone()));
                Err(WizardError::Upload(message))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::details::PropertyType;
    use crate::overlay::{OverlayColor, OverlaySize};

    struct FakePermissions {
        camera: PermissionStatus,
        library: PermissionStatus,
    }

    impl FakePermissions {
        fn granted() -> Self {
            Self {
                camera: PermissionStatus::Granted,
                library: PermissionStatus::Granted,
            }
        }
    }

    impl PermissionProvider for FakePermissions {
        async fn request_camera(&self) -> PermissionStatus {
            self.camera
        }

        async fn request_media_library(&self) -> PermissionStatus {
            self.library
        }
    }

    struct FakePicker(Option<&'static str>);

    impl MediaPicker for FakePicker {
        async fn pick(&self, _source: MediaSource) -> Option<String> {
            self.0.map(str::to_string)
        }
    }

    struct FakeUploader {
        requests: Mutex<Vec<UploadRequest>>,
        response: std::result::Result<UploadReceipt, UploadError>,
    }

    impl FakeUploader {
        fn ok() -> Self {
            Self {
                requests: Mutex::new(Vec::new()),
                response: Ok(UploadReceipt {
                    video_id: "vid-1".into(),
                }),
            }
        }

        fn failing(err: UploadError) -> Self {
            Self {
                requests: Mutex::new(Vec::new()),
                response: Err(err),
            }
        }

        fn sent(&self) -> Vec<UploadRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl UploadCollaborator for FakeUploader {
        async fn upload(
            &self,
            request: UploadRequest,
        ) -> std::result::Result<UploadReceipt, UploadError> {
            self.requests.lock().unwrap().push(request);
            self.response.clone()
        }
    }

    async fn wizard_in_edit() -> UploadWizard {
        let mut wizard = UploadWizard::new();
        let outcome = wizard
            .select_source(
                MediaSource::Camera,
                &FakePermissions::granted(),
                &FakePicker(Some("file:///tmp/tour.mp4")),
            )
            .await
            .unwrap();
        assert_eq!(outcome, SelectOutcome::Selected);
        wizard
    }

    async fn wizard_in_highlights() -> UploadWizard {
        let mut wizard = wizard_in_edit().await;
        wizard.continue_to_share().unwrap();
        wizard.choose_share(ShareChoice::Skip).unwrap();
        wizard
    }

    fn fill_ready(wizard: &mut UploadWizard) {
        let ready = wizard.ready_mut().unwrap();
        ready.title = "Marina view 2BR".into();
        ready.price = Some(1_850_000);
        ready.property_type = Some(PropertyType::Apartment);
        ready.bedrooms = Some(2);
        ready.bathrooms = Some(2);
        ready.size_sqft = Some(1_240.0);
        ready.location.set_emirate("Dubai");
        ready.location.set_district("Dubai Marina").unwrap();
        ready.location.set_building("Marina Gate 1").unwrap();
        ready.location.set_area("Tower A").unwrap();
    }

    #[tokio::test]
    async fn test_end_to_end_off_plan_publish() {
        let mut wizard = wizard_in_edit().await;
        assert_eq!(wizard.step_kind(), StepKind::Edit);
        wizard.skip_text().unwrap();
        wizard.continue_to_share().unwrap();
        assert_eq!(
            wizard.choose_share(ShareChoice::Skip).unwrap(),
            StepKind::SelectHighlights
        );

        wizard.add_room("Kitchen").unwrap();
        wizard.mark_highlight(12.0).unwrap();
        wizard.finish_highlights().unwrap();
        assert_eq!(wizard.step_kind(), StepKind::Details);

        wizard.set_category(ListingCategory::OffPlan).unwrap();
        wizard.select_project("X123", "Creek Rise").unwrap();

        let uploader = FakeUploader::ok();
        let receipt = wizard.publish(&uploader).await.unwrap();
        assert_eq!(receipt.video_id, "vid-1");
        assert_eq!(wizard.step_kind(), StepKind::Select);

        let sent = uploader.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(
            sent[0].highlights,
            vec![HighlightPayload {
                room: "Kitchen".into(),
                start_time: "00:12".into(),
                end_time: 0,
            }]
        );
        match &sent[0].listing {
            crate::collaborators::ListingPayload::OffPlan { project_id, .. } => {
                assert_eq!(project_id, "X123")
            }
            other => panic!("unexpected listing {other:?}"),
        }
        assert_eq!(sent[0].overlay, None);
    }

    #[tokio::test]
    async fn test_permission_denied_stays_on_select() {
        let mut wizard = UploadWizard::new();
        let perms = FakePermissions {
            camera: PermissionStatus::Denied,
            library: PermissionStatus::Granted,
        };
        let outcome = wizard
            .select_source(MediaSource::Camera, &perms, &FakePicker(Some("x")))
            .await
            .unwrap();
        assert_eq!(outcome, SelectOutcome::PermissionDenied);
        assert_eq!(wizard.step_kind(), StepKind::Select);
        assert_eq!(wizard.denied_source(), Some(MediaSource::Camera));

        // Retrying with the other source clears the prompt.
        let outcome = wizard
            .select_source(MediaSource::Library, &perms, &FakePicker(Some("x")))
            .await
            .unwrap();
        assert_eq!(outcome, SelectOutcome::Selected);
        assert_eq!(wizard.denied_source(), None);
    }

    #[tokio::test]
    async fn test_cancelled_picker_stays_on_select() {
        let mut wizard = UploadWizard::new();
        let outcome = wizard
            .select_source(
                MediaSource::Library,
                &FakePermissions::granted(),
                &FakePicker(None),
            )
            .await
            .unwrap();
        assert_eq!(outcome, SelectOutcome::Cancelled);
        assert!(wizard.draft().is_none());
    }

    #[tokio::test]
    async fn test_delete_video_discards_media_and_overlay() {
        let mut wizard = wizard_in_edit().await;
        wizard
            .set_overlay(
                TextOverlay::new("Sea view")
                    .with_size(OverlaySize::Large)
                    .with_color(OverlayColor::Yellow),
            )
            .unwrap();
        wizard.delete_video().unwrap();
        assert_eq!(wizard.step(), &WizardStep::default());
        assert!(wizard.draft().is_none());
        assert!(matches!(
            wizard.delete_video(),
            Err(WizardError::InvalidAction { .. })
        ));
    }

    #[tokio::test]
    async fn test_empty_overlay_rejected() {
        let mut wizard = wizard_in_edit().await;
        assert_eq!(
            wizard.set_overlay(TextOverlay::new("  ")).unwrap_err(),
            WizardError::EmptyOverlayText
        );
    }

    #[tokio::test]
    async fn test_share_choice_requires_prompt() {
        let mut wizard = wizard_in_edit().await;
        assert_eq!(
            wizard.choose_share(ShareChoice::Share).unwrap_err(),
            WizardError::SharePromptClosed
        );
        assert_eq!(wizard.step_kind(), StepKind::Edit);
        wizard.continue_to_share().unwrap();
        assert_eq!(
            wizard.choose_share(ShareChoice::Share).unwrap(),
            StepKind::Details
        );
    }

    #[tokio::test]
    async fn test_finish_requires_a_highlight() {
        let mut wizard = wizard_in_highlights().await;
        wizard.add_room("Kitchen").unwrap();
        assert_eq!(
            wizard.finish_highlights().unwrap_err(),
            WizardError::NoHighlights
        );
        assert_eq!(wizard.step_kind(), StepKind::SelectHighlights);

        wizard.mark_highlight(3.0).unwrap();
        wizard.finish_highlights().unwrap();
        assert_eq!(wizard.step_kind(), StepKind::Details);
    }

    #[tokio::test]
    async fn test_room_dedup_through_wizard() {
        let mut wizard = wizard_in_highlights().await;
        assert_eq!(wizard.add_room("Kitchen").unwrap(), "Kitchen");
        assert_eq!(wizard.add_room("Kitchen").unwrap(), "Kitchen 2");
        assert_eq!(wizard.add_room("Kitchen").unwrap(), "Kitchen 3");
    }

    #[tokio::test]
    async fn test_category_switch_clears_ready_fields() {
        let mut wizard = wizard_in_highlights().await;
        wizard.add_room("Kitchen").unwrap();
        wizard.mark_highlight(12.0).unwrap();
        wizard.finish_highlights().unwrap();
        fill_ready(&mut wizard);

        wizard.set_category(ListingCategory::OffPlan).unwrap();
        wizard.set_category(ListingCategory::Ready).unwrap();
        assert_eq!(
            wizard.details(),
            Some(&CategoryDetails::Ready(ReadyDetails::default()))
        );

        wizard.set_category(ListingCategory::OffPlan).unwrap();
        wizard.select_project("X123", "Creek Rise").unwrap();
        wizard.set_category(ListingCategory::Ready).unwrap();
        wizard.set_category(ListingCategory::OffPlan).unwrap();
        assert_eq!(
            wizard.details(),
            Some(&CategoryDetails::OffPlan(OffPlanDetails::default()))
        );
    }

    #[tokio::test]
    async fn test_validation_failure_keeps_details() {
        let mut wizard = wizard_in_highlights().await;
        wizard.add_room("Kitchen").unwrap();
        wizard.mark_highlight(12.0).unwrap();
        wizard.finish_highlights().unwrap();
        wizard.ready_mut().unwrap().title = "Half done".into();

        let uploader = FakeUploader::ok();
        let err = wizard.publish(&uploader).await.unwrap_err();
        assert!(matches!(err, WizardError::Validation(ref e) if e.contains_key("price")));
        assert!(uploader.sent().is_empty());
        assert_eq!(wizard.step_kind(), StepKind::Details);
        assert!(wizard.field_errors().unwrap().contains_key("price"));
        assert_eq!(
            wizard.details().map(|d| match d {
                CategoryDetails::Ready(r) => r.title.clone(),
                CategoryDetails::OffPlan(_) => String::new(),
            }),
            Some("Half done".to_string())
        );
    }

    #[tokio::test]
    async fn test_rejected_field_errors_surface_verbatim() {
        let mut wizard = wizard_in_highlights().await;
        wizard.add_room("Bedroom").unwrap();
        wizard.mark_highlight(40.0).unwrap();
        wizard.finish_highlights().unwrap();
        fill_ready(&mut wizard);

        let mut server_errors = FieldErrors::new();
        server_errors.insert("price".into(), vec!["Price looks too low".into()]);
        let uploader = FakeUploader::failing(UploadError::Rejected(server_errors.clone()));

        let err = wizard.publish(&uploader).await.unwrap_err();
        assert_eq!(err, WizardError::Rejected(server_errors.clone()));
        assert_eq!(wizard.step_kind(), StepKind::Details);
        assert_eq!(wizard.field_errors(), Some(&server_errors));
        assert_eq!(uploader.sent().len(), 1);

        // Data survives the failure; a second attempt sends the same listing.
        let retry = FakeUploader::ok();
        wizard.publish(&retry).await.unwrap();
        assert_eq!(retry.sent()[0].listing, uploader.sent()[0].listing);
    }

    #[tokio::test]
    async fn test_transport_error_sets_general_message() {
        let mut wizard = wizard_in_highlights().await;
        wizard.add_room("Living room").unwrap();
        wizard.mark_highlight(4.0).unwrap();
        wizard.finish_highlights().unwrap();
        fill_ready(&mut wizard);

        let uploader = FakeUploader::failing(UploadError::Transport("timed out".into()));
        let err = wizard.publish(&uploader).await.unwrap_err();
        assert_eq!(err, WizardError::Upload("timed out".into()));
        assert_eq!(wizard.last_error(), Some("timed out"));
    }

    #[tokio::test]
    async fn test_refused_publish_shows_on_details() {
        let mut wizard = wizard_in_highlights().await;
        assert!(wizard.refuse_publish("no plan").is_err());
        wizard.add_room("Living room").unwrap();
        wizard.mark_highlight(4.0).unwrap();
        wizard.finish_highlights().unwrap();

        wizard.refuse_publish("no plan").unwrap();
        assert_eq!(wizard.last_error(), Some("no plan"));
        assert_eq!(wizard.step_kind(), StepKind::Details);
    }

    #[tokio::test]
    async fn test_off_plan_falls_back_to_recorded_map() {
        let mut wizard = wizard_in_highlights().await;
        wizard.add_room("Kitchen").unwrap();
        wizard.mark_highlight(75.0).unwrap();
        // Leave tagging without finishing, then take the share path.
        assert_eq!(wizard.back().unwrap(), StepKind::Edit);
        wizard.continue_to_share().unwrap();
        wizard.choose_share(ShareChoice::Share).unwrap();

        wizard.set_category(ListingCategory::OffPlan).unwrap();
        wizard.select_project("P9", "Harbour Point").unwrap();
        let uploader = FakeUploader::ok();
        wizard.publish(&uploader).await.unwrap();
        assert_eq!(uploader.sent()[0].highlights[0].start_time, "01:15");
    }

    #[tokio::test]
    async fn test_ready_does_not_use_recorded_map() {
        let mut wizard = wizard_in_highlights().await;
        wizard.add_room("Kitchen").unwrap();
        wizard.mark_highlight(75.0).unwrap();
        wizard.back().unwrap();
        wizard.continue_to_share().unwrap();
        wizard.choose_share(ShareChoice::Share).unwrap();
        fill_ready(&mut wizard);

        let uploader = FakeUploader::ok();
        let err = wizard.publish(&uploader).await.unwrap_err();
        assert!(matches!(err, WizardError::Validation(ref e) if e.contains_key("highlights")));
        assert!(uploader.sent().is_empty());

        // Re-opening tagging picks the recorded marks back up.
        wizard.edit_highlights().unwrap();
        wizard.finish_highlights().unwrap();
        wizard.publish(&uploader).await.unwrap();
        assert_eq!(uploader.sent()[0].highlights[0].room, "Kitchen");
    }

    #[tokio::test]
    async fn test_off_plan_without_any_highlight_is_rejected() {
        let mut wizard = wizard_in_edit().await;
        wizard.continue_to_share().unwrap();
        wizard.choose_share(ShareChoice::Share).unwrap();
        wizard.set_category(ListingCategory::OffPlan).unwrap();
        wizard.select_project("P9", "Harbour Point").unwrap();

        let err = wizard.publish(&FakeUploader::ok()).await.unwrap_err();
        assert!(matches!(err, WizardError::Validation(ref e) if e.contains_key("highlights")));
    }

    #[tokio::test]
    async fn test_edit_highlights_keeps_form() {
        let mut wizard = wizard_in_highlights().await;
        wizard.add_room("Kitchen").unwrap();
        wizard.mark_highlight(12.0).unwrap();
        wizard.finish_highlights().unwrap();
        wizard.set_category(ListingCategory::OffPlan).unwrap();
        wizard.select_project("X123", "Creek Rise").unwrap();

        wizard.edit_highlights().unwrap();
        assert_eq!(wizard.highlight_editor().unwrap().entries().len(), 1);
        wizard.add_room("Bedroom").unwrap();
        wizard.mark_highlight(30.0).unwrap();
        wizard.finish_highlights().unwrap();

        let uploader = FakeUploader::ok();
        wizard.publish(&uploader).await.unwrap();
        let sent = uploader.sent();
        assert_eq!(sent[0].highlights.len(), 2);
        assert_eq!(sent[0].highlights[1].room, "Bedroom");
    }

    #[tokio::test]
    async fn test_discard_from_any_step() {
        let mut wizard = wizard_in_highlights().await;
        wizard.add_room("Kitchen").unwrap();
        wizard.discard();
        assert_eq!(wizard.step_kind(), StepKind::Select);
        assert!(wizard.draft().is_none());
    }

    #[tokio::test]
    async fn test_actions_on_wrong_step() {
        let mut wizard = UploadWizard::new();
        assert_eq!(
            wizard.add_room("Kitchen").unwrap_err(),
            WizardError::InvalidAction {
                action: "add a room",
                step: StepKind::Select
            }
        );
        assert!(wizard.publish(&FakeUploader::ok()).await.is_err());
        assert!(wizard.back().is_err());
    }
}
