//! # reelestate-upload
//!
//! The "record, annotate, publish" wizard for new listing videos.
//!
//! [`wizard::UploadWizard`] walks a draft through
//! `Select → Edit → SelectHighlights → Details` and hands the finished
//! payload to an [`collaborators::UploadCollaborator`]. Each step is an enum
//! variant carrying only that step's data, so nothing entered on one step
//! can leak into a later one by accident.

pub mod collaborators;
pub mod details;
pub mod error;
pub mod highlights;
pub mod overlay;
pub mod wizard;

pub use collaborators::{
    FieldErrors, MediaPicker, MediaSource, PermissionProvider, PermissionStatus,
    UploadCollaborator, UploadError, UploadReceipt, UploadRequest,
};
pub use error::WizardError;
pub use wizard::{StepKind, UploadWizard, WizardStep};
