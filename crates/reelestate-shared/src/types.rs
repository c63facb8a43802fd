use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Listing identifier as handed out by the backend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct ItemId(pub String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A named timestamp inside a listing video ("Kitchen" at 12s).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HighlightMarker {
    pub label: String,
    /// Seconds from the start of the video.
    pub timestamp: f64,
}

/// One playable listing in a paged feed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeedItem {
    pub id: ItemId,
    pub media_uri: String,
    /// Filled in once the player has loaded metadata.
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub highlights: Vec<HighlightMarker>,
}

impl FeedItem {
    pub fn new(id: impl Into<String>, media_uri: impl Into<String>) -> Self {
        Self {
            id: ItemId::new(id),
            media_uri: media_uri.into(),
            duration: None,
            highlights: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ListingCategory {
    Ready,
    OffPlan,
}

impl ListingCategory {
    pub fn label(self) -> &'static str {
        match self {
            ListingCategory::Ready => "Ready",
            ListingCategory::OffPlan => "Off-plan",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    #[default]
    Buy,
    Rent,
    OffPlan,
}

impl TransactionType {
    pub fn as_query(self) -> &'static str {
        match self {
            TransactionType::Buy => "buy",
            TransactionType::Rent => "rent",
            TransactionType::OffPlan => "off_plan",
        }
    }
}

/// Filters that reshape which listings the feed shows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedPreferences {
    pub transaction_type: TransactionType,
    /// City or emirate; `None` means anywhere.
    pub location: Option<String>,
    pub lifestyle_tags: BTreeSet<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct DraftId(pub Uuid);

impl DraftId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DraftId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DraftId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_category_wire_names() {
        assert_eq!(
            serde_json::to_string(&ListingCategory::OffPlan).unwrap(),
            "\"OFF_PLAN\""
        );
        assert_eq!(
            serde_json::to_string(&ListingCategory::Ready).unwrap(),
            "\"READY\""
        );
    }

    #[test]
    fn test_feed_item_defaults_when_fields_missing() {
        let item: FeedItem =
            serde_json::from_str(r#"{"id":"abc","media_uri":"https://cdn/v.mp4"}"#).unwrap();
        assert_eq!(item.id, ItemId::from("abc"));
        assert!(item.duration.is_none());
        assert!(item.highlights.is_empty());
    }
}
