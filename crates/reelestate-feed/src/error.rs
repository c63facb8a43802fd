use thiserror::Error;

use reelestate_shared::ItemId;

/// Errors produced by the feed controller.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum FeedError {
    /// The id is not part of the current list snapshot.
    #[error("Unknown feed item: {0}")]
    UnknownItem(ItemId),

    /// The item is in the list but has no mounted player right now.
    #[error("Feed item not mounted: {0}")]
    NotMounted(ItemId),

    /// Two entries in one list snapshot share an id.
    #[error("Duplicate feed item id: {0}")]
    DuplicateItem(ItemId),

    /// Scrubbing before the track has been measured.
    #[error("Scrub track not measured for item: {0}")]
    TrackNotMeasured(ItemId),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, FeedError>;
