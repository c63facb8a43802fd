//! Feed playback controller.
//!
//! Owns the current list snapshot, the viewport tracker and one
//! [`FeedEntry`] per mounted row. Rows are mounted in a small window around
//! the active index so the next video is ready before it scrolls in, and
//! unmounted (dropping their player) once they fall outside that window.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use tracing::{debug, info, warn};

use reelestate_shared::constants::{
    DEFAULT_DRAG_THRESHOLD_PX, DEFAULT_PREFETCH_THRESHOLD, DEFAULT_RETAIN_AHEAD,
    DEFAULT_RETAIN_BEHIND, DEFAULT_SAMPLE_INTERVAL_MS, DEFAULT_VISIBILITY_THRESHOLD,
    EMPTY_FEED_MESSAGE,
};
use reelestate_shared::{FeedItem, ItemId};

use crate::driver::{FeedVariant, PlaybackSession};
use crate::entry::FeedEntry;
use crate::error::{FeedError, Result};
use crate::player::PlayerFactory;
use crate::sampler::ProgressSnapshot;
use crate::scrub::{FillMode, ScrubUpdate, SeekCommand, TrackGeometry};
use crate::viewport::{ViewportChange, ViewportState, ViewportTracker};

#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub variant: FeedVariant,
    pub visibility_threshold: f32,
    pub sample_interval: Duration,
    pub drag_threshold: f64,
    /// Rows kept mounted before the active one.
    pub retain_behind: usize,
    /// Rows mounted ahead of the active one.
    pub retain_ahead: usize,
    /// Remaining rows after the active one that ask the host for more.
    pub prefetch_threshold: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            variant: FeedVariant::Feed,
            visibility_threshold: DEFAULT_VISIBILITY_THRESHOLD,
            sample_interval: Duration::from_millis(DEFAULT_SAMPLE_INTERVAL_MS),
            drag_threshold: DEFAULT_DRAG_THRESHOLD_PX,
            retain_behind: DEFAULT_RETAIN_BEHIND,
            retain_ahead: DEFAULT_RETAIN_AHEAD,
            prefetch_threshold: DEFAULT_PREFETCH_THRESHOLD,
        }
    }
}

pub struct FeedController<F: PlayerFactory> {
    config: FeedConfig,
    factory: F,
    items: Vec<FeedItem>,
    positions: HashMap<ItemId, usize>,
    tracker: ViewportTracker,
    entries: HashMap<ItemId, FeedEntry<F::Player>>,
    active_index: Option<usize>,
    muted: bool,
}

impl<F: PlayerFactory> FeedController<F> {
    pub fn new(config: FeedConfig, factory: F) -> Self {
        let tracker = ViewportTracker::new(config.visibility_threshold);
        Self {
            config,
            factory,
            items: Vec::new(),
            positions: HashMap::new(),
            tracker,
            entries: HashMap::new(),
            active_index: None,
            muted: false,
        }
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    pub fn items(&self) -> &[FeedItem] {
        &self.items
    }

    pub fn viewport(&self) -> &ViewportState {
        self.tracker.state()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Text for the empty-state view, when there is nothing to show.
    pub fn empty_state(&self) -> Option<&'static str> {
        self.is_empty().then_some(EMPTY_FEED_MESSAGE)
    }

    pub fn active_item(&self) -> Option<&FeedItem> {
        self.active_index.and_then(|i| self.items.get(i))
    }

    pub fn is_mounted(&self, id: &ItemId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn mounted_count(&self) -> usize {
        self.entries.len()
    }

    /// Replace the list snapshot (new fetch or filter). Every mounted row
    /// is dropped along with its player.
    pub fn replace_items(&mut self, items: Vec<FeedItem>) -> Result<()> {
        let mut positions = HashMap::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            if positions.insert(item.id.clone(), i).is_some() {
                return Err(FeedError::DuplicateItem(item.id.clone()));
            }
        }

        let unmounted = self.entries.len();
        self.entries.clear();
        self.tracker.clear();
        self.active_index = None;
        self.items = items;
        self.positions = positions;

        info!(items = self.items.len(), unmounted, "Feed list replaced");
        Ok(())
    }

    /// Append a page of items, skipping ids already in the snapshot.
    pub fn append_items(&mut self, items: Vec<FeedItem>) -> usize {
        let mut added = 0;
        for item in items {
            if self.positions.contains_key(&item.id) {
                warn!(id = %item.id, "Skipping duplicate feed item in page");
                continue;
            }
            self.positions.insert(item.id.clone(), self.items.len());
            self.items.push(item);
            added += 1;
        }
        debug!(added, total = self.items.len(), "Feed page appended");
        added
    }

    /// Apply a visibility report from the host list control.
    ///
    /// Visibility reaches every affected row (and its sampler is started or
    /// cancelled) before this returns, so the next
    /// [`FeedController::sample_tick`] never reads a hidden row's player.
    pub fn apply_viewport(&mut self, reports: &[(ItemId, f32)]) -> ViewportChange {
        let known: Vec<(ItemId, f32)> = reports
            .iter()
            .filter(|(id, _)| self.positions.contains_key(id))
            .cloned()
            .collect();
        if known.len() != reports.len() {
            debug!(
                ignored = reports.len() - known.len(),
                "Viewport report mentions items outside the snapshot"
            );
        }

        let change = self.tracker.observe(&known);

        for id in &change.left {
            if let Some(entry) = self.entries.get_mut(id) {
                entry.set_visible(false);
            }
        }

        if let Some(first_visible) = self
            .tracker
            .state()
            .iter()
            .filter_map(|id| self.positions.get(id).copied())
            .min()
        {
            self.active_index = Some(first_visible);
        }

        self.remount_window();

        for id in &change.entered {
            if let Some(entry) = self.entries.get_mut(id) {
                entry.set_visible(true);
            }
        }

        change
    }

    // Mount rows inside the retained window and drop the rest.
    fn remount_window(&mut self) {
        let mut wanted: HashSet<ItemId> = self.tracker.state().iter().cloned().collect();
        if let Some(active) = self.active_index {
            let start = active.saturating_sub(self.config.retain_behind);
            let end = (active + self.config.retain_ahead).min(self.items.len().saturating_sub(1));
            for item in self.items.iter().take(end + 1).skip(start) {
                wanted.insert(item.id.clone());
            }
        }

        let before = self.entries.len();
        self.entries.retain(|id, _| wanted.contains(id));
        let dropped = before - self.entries.len();

        let mut mounted = 0;
        for id in wanted {
            if self.entries.contains_key(&id) {
                continue;
            }
            let Some(item) = self.positions.get(&id).and_then(|&i| self.items.get(i)) else {
                continue;
            };
            let player = self.factory.create(item);
            let entry = FeedEntry::new(
                player,
                self.config.variant,
                self.muted,
                self.config.sample_interval,
                self.config.drag_threshold,
            );
            self.entries.insert(id, entry);
            mounted += 1;
        }

        if mounted > 0 || dropped > 0 {
            debug!(mounted, dropped, total = self.entries.len(), "Retained window updated");
        }
    }

    /// One sampler cadence: poll every visible row's player.
    pub fn sample_tick(&mut self) -> usize {
        let mut changed = 0;
        for (id, entry) in self.entries.iter_mut() {
            if !entry.tick() {
                continue;
            }
            changed += 1;

            let duration = entry.progress().duration;
            if duration.is_finite() && duration > 0.0 {
                if let Some(item) = self.positions.get(id).and_then(|&i| self.items.get_mut(i)) {
                    if item.duration.is_none() {
                        item.duration = Some(duration);
                    }
                }
            }
        }
        changed
    }

    /// Record a duration reported by metadata loading.
    pub fn set_duration(&mut self, id: &ItemId, seconds: f64) -> Result<()> {
        let index = *self
            .positions
            .get(id)
            .ok_or_else(|| FeedError::UnknownItem(id.clone()))?;
        self.items[index].duration = Some(seconds);
        Ok(())
    }

    /// Whether the host should page in more items.
    pub fn needs_more(&self) -> bool {
        match self.active_index {
            Some(active) => {
                self.items.len().saturating_sub(active + 1) <= self.config.prefetch_threshold
            }
            None => false,
        }
    }

    fn entry_mut(&mut self, id: &ItemId) -> Result<&mut FeedEntry<F::Player>> {
        if !self.positions.contains_key(id) {
            return Err(FeedError::UnknownItem(id.clone()));
        }
        self.entries
            .get_mut(id)
            .ok_or_else(|| FeedError::NotMounted(id.clone()))
    }

    pub fn toggle_pause(&mut self, id: &ItemId) -> Result<bool> {
        Ok(self.entry_mut(id)?.driver_mut().toggle_pause())
    }

    pub fn press_boost(&mut self, id: &ItemId) -> Result<bool> {
        Ok(self.entry_mut(id)?.driver_mut().press_boost())
    }

    pub fn release_boost(&mut self, id: &ItemId) -> Result<()> {
        self.entry_mut(id)?.driver_mut().release_boost();
        Ok(())
    }

    /// Mute applies to every mounted row and to rows mounted later.
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        for entry in self.entries.values_mut() {
            entry.driver_mut().set_muted(muted);
        }
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn set_track_geometry(&mut self, id: &ItemId, geometry: TrackGeometry) -> Result<()> {
        self.entry_mut(id)?.set_track_geometry(geometry);
        Ok(())
    }

    fn measured_entry_mut(&mut self, id: &ItemId) -> Result<&mut FeedEntry<F::Player>> {
        let entry = self.entry_mut(id)?;
        if entry.scrub().geometry().is_none() {
            return Err(FeedError::TrackNotMeasured(id.clone()));
        }
        Ok(entry)
    }

    pub fn scrub_down(&mut self, id: &ItemId, x: f64) -> Result<Option<ScrubUpdate>> {
        Ok(self.measured_entry_mut(id)?.scrub_down(x))
    }

    pub fn scrub_move(&mut self, id: &ItemId, x: f64) -> Result<Option<ScrubUpdate>> {
        Ok(self.measured_entry_mut(id)?.scrub_move(x))
    }

    pub fn scrub_up(&mut self, id: &ItemId, x: f64) -> Result<Option<SeekCommand>> {
        let command = self.measured_entry_mut(id)?.scrub_up(x);
        if let Some(cmd) = command {
            debug!(id = %id, time = cmd.time, "Seek issued from scrub bar");
        }
        Ok(command)
    }

    pub fn scrub_cancel(&mut self, id: &ItemId) -> Result<()> {
        self.entry_mut(id)?.scrub_cancel();
        Ok(())
    }

    pub fn progress(&self, id: &ItemId) -> Option<ProgressSnapshot> {
        self.entries.get(id).map(|e| e.progress())
    }

    pub fn fill_mode(&self, id: &ItemId) -> Option<FillMode> {
        self.entries.get(id).map(|e| e.fill_mode())
    }

    pub fn session(&self, id: &ItemId) -> Option<PlaybackSession> {
        self.entries.get(id).map(|e| e.session())
    }

    /// Ids of mounted rows that are currently playing.
    pub fn playing_ids(&self) -> Vec<ItemId> {
        let mut ids: Vec<ItemId> = self
            .entries
            .iter()
            .filter(|(_, e)| e.driver().is_playing())
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        ids
    }
}
