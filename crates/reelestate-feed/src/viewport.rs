//! Viewport tracking.
//!
//! Turns the host list control's per-row visibility reports into the set of
//! visible item ids. The set is replaced wholesale on every report, never
//! merged, so an id missing from a report is no longer visible.

use std::collections::HashSet;

use serde::Serialize;
use tracing::debug;

use reelestate_shared::constants::DEFAULT_VISIBILITY_THRESHOLD;
use reelestate_shared::ItemId;

/// The ids currently on screen. Read-only outside the tracker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewportState {
    visible: HashSet<ItemId>,
}

impl ViewportState {
    pub fn contains(&self, id: &ItemId) -> bool {
        self.visible.contains(id)
    }

    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }

    pub fn len(&self) -> usize {
        self.visible.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ItemId> {
        self.visible.iter()
    }
}

/// Ids that changed visibility in one report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ViewportChange {
    pub entered: Vec<ItemId>,
    pub left: Vec<ItemId>,
}

impl ViewportChange {
    pub fn is_empty(&self) -> bool {
        self.entered.is_empty() && self.left.is_empty()
    }
}

/// Computes [`ViewportState`] from visibility fractions.
#[derive(Debug, Clone)]
pub struct ViewportTracker {
    threshold: f32,
    state: ViewportState,
}

impl ViewportTracker {
    /// Create a tracker. The threshold is clamped into `(0, 1]`; a
    /// non-finite value falls back to the default.
    pub fn new(threshold: f32) -> Self {
        let threshold = if threshold.is_finite() {
            threshold.clamp(f32::EPSILON, 1.0)
        } else {
            DEFAULT_VISIBILITY_THRESHOLD
        };
        Self {
            threshold,
            state: ViewportState::default(),
        }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn state(&self) -> &ViewportState {
        &self.state
    }

    /// Replace the visible set from `(id, visible_fraction)` reports.
    ///
    /// # Arguments
    ///
    /// * `reports` - Every row the list control currently knows about, with
    ///   the fraction of its area inside the viewport
    pub fn observe(&mut self, reports: &[(ItemId, f32)]) -> ViewportChange {
        let next: HashSet<ItemId> = reports
            .iter()
            .filter(|(_, fraction)| *fraction >= self.threshold)
            .map(|(id, _)| id.clone())
            .collect();

        let mut change = ViewportChange {
            entered: next.difference(&self.state.visible).cloned().collect(),
            left: self.state.visible.difference(&next).cloned().collect(),
        };
        change.entered.sort();
        change.left.sort();

        if !change.is_empty() {
            debug!(
                entered = ?change.entered,
                left = ?change.left,
                visible = next.len(),
                "Viewport changed"
            );
        }

        self.state.visible = next;
        change
    }

    /// Forget everything, e.g. when the list is replaced.
    pub fn clear(&mut self) -> ViewportChange {
        let mut left: Vec<ItemId> = self.state.visible.drain().collect();
        left.sort();
        ViewportChange {
            entered: Vec::new(),
            left,
        }
    }
}

impl Default for ViewportTracker {
    fn default() -> Self {
        Self::new(DEFAULT_VISIBILITY_THRESHOLD)
    }
}
