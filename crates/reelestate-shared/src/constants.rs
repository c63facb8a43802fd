/// Application name
pub const APP_NAME: &str = "Reelestate";

/// Fraction of a feed row that must intersect the viewport before the item
/// counts as visible.
pub const DEFAULT_VISIBILITY_THRESHOLD: f32 = 0.8;

/// Progress clock polling cadence in milliseconds (coarse, ~100ms resolution)
pub const DEFAULT_SAMPLE_INTERVAL_MS: u64 = 100;

/// Pointer travel in pixels that turns a tap on the scrub track into a drag
pub const DEFAULT_DRAG_THRESHOLD_PX: f64 = 4.0;

/// Playback rates
pub const NORMAL_RATE: f64 = 1.0;
pub const BOOSTED_RATE: f64 = 2.0;

/// Mounted-item window around the active feed index
pub const DEFAULT_RETAIN_BEHIND: usize = 1;
pub const DEFAULT_RETAIN_AHEAD: usize = 2;

/// Remaining items after the active one that trigger a page fetch
pub const DEFAULT_PREFETCH_THRESHOLD: usize = 3;

/// Room labels offered before the user adds their own
pub const DEFAULT_ROOMS: [&str; 4] = ["Kitchen", "Living room", "Bedroom", "Bathroom"];

/// Default backend base URL (local development)
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";

/// Text shown when a filtered feed has no items
pub const EMPTY_FEED_MESSAGE: &str = "No properties match your filters yet.";
