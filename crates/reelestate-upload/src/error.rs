use thiserror::Error;

use crate::collaborators::FieldErrors;
use crate::wizard::StepKind;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum WizardError {
    #[error("Cannot {action} while on the {step} step")]
    InvalidAction {
        action: &'static str,
        step: StepKind,
    },

    #[error("Open the share prompt before choosing how to continue")]
    SharePromptClosed,

    #[error("Overlay text is empty; use skip instead")]
    EmptyOverlayText,

    #[error("Room label is empty")]
    EmptyRoomLabel,

    #[error("No more numbered rooms can be added for {0}")]
    RoomSuffixExhausted(String),

    #[error("Unknown room: {0}")]
    UnknownRoom(String),

    #[error("Select a room before marking a highlight")]
    NoRoomSelected,

    #[error("Invalid highlight timestamp: {0}")]
    InvalidTimestamp(f64),

    #[error("Mark at least one highlight before continuing")]
    NoHighlights,

    #[error("The {0} listing fields are not active")]
    WrongCategory(&'static str),

    #[error("{field} requires {parent} to be selected first")]
    ParentNotSelected {
        field: &'static str,
        parent: &'static str,
    },

    #[error("Listing details are incomplete")]
    Validation(FieldErrors),

    #[error("Upload rejected by server")]
    Rejected(FieldErrors),

    #[error("Upload failed: {0}")]
    Upload(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, WizardError>;
