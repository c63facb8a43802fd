//! Feed screen commands: filters, viewport reports, gestures and the scrub
//! bar.

use serde::{Deserialize, Serialize};
use tracing::info;

use reelestate_feed::driver::PlaybackSession;
use reelestate_feed::scrub::{FillMode, ScrubUpdate, SeekCommand, TrackGeometry};
use reelestate_feed::viewport::ViewportChange;
use reelestate_shared::{FeedItem, FeedPreferences, ItemId};

use crate::preferences::ListingSource;
use crate::state::{AppState, SharedFeed};

#[derive(Debug, Clone, Serialize)]
pub struct FeedView {
    pub items: Vec<FeedItem>,
    pub active: Option<ItemId>,
    /// Set when there is nothing to show.
    pub empty_message: Option<&'static str>,
    pub needs_more: bool,
}

fn feed_view(feed: &SharedFeed) -> FeedView {
    FeedView {
        items: feed.items().to_vec(),
        active: feed.active_item().map(|item| item.id.clone()),
        empty_message: feed.empty_state(),
        needs_more: feed.needs_more(),
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct VisibilityReport {
    pub id: ItemId,
    /// Visible fraction of the row, 0 to 1.
    pub fraction: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProgressView {
    pub current_time: f64,
    pub duration: f64,
    pub fraction: f64,
    pub fill_mode: FillMode,
    pub session: PlaybackSession,
}

pub fn get_feed(state: &AppState) -> Result<FeedView, String> {
    let feed = state.feed.lock().map_err(|e| format!("Lock poisoned: {e}"))?;
    Ok(feed_view(&feed))
}

pub fn get_preferences(state: &AppState) -> Result<FeedPreferences, String> {
    let prefs = state
        .preferences
        .lock()
        .map_err(|e| format!("Lock poisoned: {e}"))?;
    Ok(prefs.get())
}

/// Fetch the listings for new filters and swap them into the feed. Every
/// mounted player is dropped with the old list. The filters are stored only
/// once the feed shows their results; a failed fetch keeps the old ones.
pub async fn apply_filters<L: ListingSource>(
    state: &AppState,
    source: &L,
    preferences: FeedPreferences,
) -> Result<FeedView, String> {
    let items = source
        .fetch(&preferences, 0)
        .await
        .map_err(|e| format!("Failed to load listings: {e}"))?;

    let mut feed = state.feed.lock().map_err(|e| format!("Lock poisoned: {e}"))?;
    feed.replace_items(items).map_err(|e| e.to_string())?;
    state
        .preferences
        .lock()
        .map_err(|e| format!("Lock poisoned: {e}"))?
        .set(preferences.clone());

    info!(
        transaction_type = preferences.transaction_type.as_query(),
        count = feed.items().len(),
        "Feed filters applied"
    );

    Ok(feed_view(&feed))
}

/// Fetch the next page for the stored filters, starting after the rows
/// already in the feed, and append anything new.
pub async fn load_more<L: ListingSource>(state: &AppState, source: &L) -> Result<FeedView, String> {
    let preferences = get_preferences(state)?;
    let offset = {
        let feed = state.feed.lock().map_err(|e| format!("Lock poisoned: {e}"))?;
        feed.items().len()
    };
    let items = source
        .fetch(&preferences, offset)
        .await
        .map_err(|e| format!("Failed to load listings: {e}"))?;

    let mut feed = state.feed.lock().map_err(|e| format!("Lock poisoned: {e}"))?;
    let added = feed.append_items(items);
    info!(added, total = feed.items().len(), "Feed extended");
    Ok(feed_view(&feed))
}

pub fn report_viewport(
    state: &AppState,
    reports: Vec<VisibilityReport>,
) -> Result<ViewportChange, String> {
    let reports: Vec<(ItemId, f32)> = reports.into_iter().map(|r| (r.id, r.fraction)).collect();
    let mut feed = state.feed.lock().map_err(|e| format!("Lock poisoned: {e}"))?;
    Ok(feed.apply_viewport(&reports))
}

pub fn toggle_pause(state: &AppState, id: String) -> Result<bool, String> {
    let mut feed = state.feed.lock().map_err(|e| format!("Lock poisoned: {e}"))?;
    feed.toggle_pause(&ItemId(id)).map_err(|e| e.to_string())
}

pub fn press_boost(state: &AppState, id: String) -> Result<bool, String> {
    let mut feed = state.feed.lock().map_err(|e| format!("Lock poisoned: {e}"))?;
    feed.press_boost(&ItemId(id)).map_err(|e| e.to_string())
}

pub fn release_boost(state: &AppState, id: String) -> Result<(), String> {
    let mut feed = state.feed.lock().map_err(|e| format!("Lock poisoned: {e}"))?;
    feed.release_boost(&ItemId(id)).map_err(|e| e.to_string())
}

pub fn set_muted(state: &AppState, muted: bool) -> Result<(), String> {
    let mut feed = state.feed.lock().map_err(|e| format!("Lock poisoned: {e}"))?;
    feed.set_muted(muted);
    Ok(())
}

pub fn set_duration(state: &AppState, id: String, seconds: f64) -> Result<(), String> {
    let mut feed = state.feed.lock().map_err(|e| format!("Lock poisoned: {e}"))?;
    feed.set_duration(&ItemId(id), seconds)
        .map_err(|e| e.to_string())
}

/// Record the scrub track's measured position after layout.
pub fn set_track_geometry(
    state: &AppState,
    id: String,
    left_x: f64,
    width: f64,
) -> Result<(), String> {
    let mut feed = state.feed.lock().map_err(|e| format!("Lock poisoned: {e}"))?;
    feed.set_track_geometry(&ItemId(id), TrackGeometry::new(left_x, width))
        .map_err(|e| e.to_string())
}

pub fn scrub_down(state: &AppState, id: String, x: f64) -> Result<Option<ScrubUpdate>, String> {
    let mut feed = state.feed.lock().map_err(|e| format!("Lock poisoned: {e}"))?;
    feed.scrub_down(&ItemId(id), x).map_err(|e| e.to_string())
}

pub fn scrub_move(state: &AppState, id: String, x: f64) -> Result<Option<ScrubUpdate>, String> {
    let mut feed = state.feed.lock().map_err(|e| format!("Lock poisoned: {e}"))?;
    feed.scrub_move(&ItemId(id), x).map_err(|e| e.to_string())
}

pub fn scrub_up(state: &AppState, id: String, x: f64) -> Result<Option<SeekCommand>, String> {
    let mut feed = state.feed.lock().map_err(|e| format!("Lock poisoned: {e}"))?;
    feed.scrub_up(&ItemId(id), x).map_err(|e| e.to_string())
}

pub fn scrub_cancel(state: &AppState, id: String) -> Result<(), String> {
    let mut feed = state.feed.lock().map_err(|e| format!("Lock poisoned: {e}"))?;
    feed.scrub_cancel(&ItemId(id)).map_err(|e| e.to_string())
}

/// Scrub bar state for one row. `None` when the row is not mounted.
pub fn get_progress(state: &AppState, id: String) -> Result<Option<ProgressView>, String> {
    let feed = state.feed.lock().map_err(|e| format!("Lock poisoned: {e}"))?;
    let id = ItemId(id);
    let (Some(progress), Some(fill_mode), Some(session)) =
        (feed.progress(&id), feed.fill_mode(&id), feed.session(&id))
    else {
        return Ok(None);
    };
    Ok(Some(ProgressView {
        current_time: progress.current_time,
        duration: progress.duration,
        fraction: progress.fraction(),
        fill_mode,
        session,
    }))
}
