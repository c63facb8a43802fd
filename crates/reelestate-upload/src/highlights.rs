//! Room highlight tagging.
//!
//! A draft collects `(room, start)` pairs. Room labels are unique within a
//! draft: adding a label that already exists appends a numeric suffix one
//! above the largest suffix in use for that base (`Kitchen`, `Kitchen 2`,
//! `Kitchen 3`, ...).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use reelestate_shared::constants::DEFAULT_ROOMS;
use reelestate_shared::timecode::format_mm_ss;

use crate::error::{Result, WizardError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighlightEntry {
    pub room: String,
    /// Seconds from the start of the video.
    pub start: f64,
}

impl HighlightEntry {
    pub fn start_timecode(&self) -> String {
        format_mm_ss(self.start)
    }
}

/// Suffix a label carries for `base`: 1 for the bare base, `n` for
/// `"base n"`, `None` when it belongs to another base.
fn suffix_for(label: &str, base: &str) -> Option<u64> {
    if label == base {
        return Some(1);
    }
    let rest = label.strip_prefix(base)?.strip_prefix(' ')?;
    rest.parse::<u64>().ok().filter(|n| *n >= 2)
}

/// The label to use when adding `base` next to `existing` labels. `None`
/// when the largest suffix in use has no successor.
pub fn next_room_label<'a>(
    existing: impl IntoIterator<Item = &'a str>,
    base: &str,
) -> Option<String> {
    let max = existing
        .into_iter()
        .filter_map(|label| suffix_for(label, base))
        .max();
    match max {
        None => Some(base.to_string()),
        Some(n) => n.checked_add(1).map(|next| format!("{base} {next}")),
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HighlightEditor {
    rooms: Vec<String>,
    selected: Option<String>,
    entries: Vec<HighlightEntry>,
}

impl HighlightEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-open an editor over highlights committed earlier.
    pub fn from_entries(entries: Vec<HighlightEntry>) -> Self {
        Self {
            rooms: entries.iter().map(|e| e.room.clone()).collect(),
            selected: None,
            entries,
        }
    }

    /// Room presets offered before the user types their own.
    pub fn suggestions(&self) -> &'static [&'static str] {
        &DEFAULT_ROOMS
    }

    pub fn rooms(&self) -> &[String] {
        &self.rooms
    }

    pub fn selected_room(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn entries(&self) -> &[HighlightEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add a room (preset or user typed) and select it. Returns the label
    /// actually used after de-duplication.
    pub fn add_room(&mut self, base: &str) -> Result<String> {
        let base = base.trim();
        if base.is_empty() {
            return Err(WizardError::EmptyRoomLabel);
        }
        let label = next_room_label(self.rooms.iter().map(String::as_str), base)
            .ok_or_else(|| WizardError::RoomSuffixExhausted(base.to_string()))?;
        debug!(room = %label, "Room added to draft");
        self.rooms.push(label.clone());
        self.selected = Some(label.clone());
        Ok(label)
    }

    pub fn select_room(&mut self, label: &str) -> Result<()> {
        if !self.rooms.iter().any(|r| r == label) {
            return Err(WizardError::UnknownRoom(label.to_string()));
        }
        self.selected = Some(label.to_string());
        Ok(())
    }

    /// Set the selected room's start time. Marking the same room again
    /// overwrites its previous timestamp in place.
    pub fn mark(&mut self, timestamp: f64) -> Result<&HighlightEntry> {
        if !timestamp.is_finite() || timestamp < 0.0 {
            return Err(WizardError::InvalidTimestamp(timestamp));
        }
        let room = self.selected.clone().ok_or(WizardError::NoRoomSelected)?;

        let index = match self.entries.iter().position(|e| e.room == room) {
            Some(i) => {
                self.entries[i].start = timestamp;
                i
            }
            None => {
                self.entries.push(HighlightEntry {
                    room,
                    start: timestamp,
                });
                self.entries.len() - 1
            }
        };
        Ok(&self.entries[index])
    }

    /// Drop a room and its highlight.
    pub fn remove_room(&mut self, label: &str) -> Result<()> {
        let before = self.rooms.len();
        self.rooms.retain(|r| r != label);
        if self.rooms.len() == before {
            return Err(WizardError::UnknownRoom(label.to_string()));
        }
        self.entries.retain(|e| e.room != label);
        if self.selected.as_deref() == Some(label) {
            self.selected = None;
        }
        Ok(())
    }

    /// Room → start map of everything marked so far.
    pub fn timestamp_map(&self) -> BTreeMap<String, f64> {
        self.entries
            .iter()
            .map(|e| (e.room.clone(), e.start))
            .collect()
    }

    pub fn into_entries(self) -> Vec<HighlightEntry> {
        self.entries
    }
}

/// Ordered highlights rebuilt from a room → start map, earliest first.
pub fn entries_from_map(map: &BTreeMap<String, f64>) -> Vec<HighlightEntry> {
    let mut entries: Vec<HighlightEntry> = map
        .iter()
        .map(|(room, start)| HighlightEntry {
            room: room.clone(),
            start: *start,
        })
        .collect();
    entries.sort_by(|a, b| {
        a.start
            .partial_cmp(&b.start)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    entries
}
