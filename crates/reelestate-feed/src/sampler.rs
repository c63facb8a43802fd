//! Progress clock sampler.
//!
//! Players are polled on a fixed cadence rather than trusted to push
//! progress events, so the published clock is coarse (about one interval of
//! resolution). A sampler only runs while its row is visible; once
//! cancelled it never touches its player again.

use std::time::Duration;

use serde::Serialize;
use tracing::trace;

use reelestate_shared::constants::DEFAULT_SAMPLE_INTERVAL_MS;

use crate::player::MediaPlayer;
use crate::scrub::ScrubState;

/// Clock values published to the scrub bar.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ProgressSnapshot {
    pub current_time: f64,
    pub duration: f64,
}

impl ProgressSnapshot {
    /// Played fraction in `[0, 1]`; zero while the duration is unknown.
    pub fn fraction(&self) -> f64 {
        if !self.duration.is_finite() || self.duration <= 0.0 {
            return 0.0;
        }
        (self.current_time / self.duration).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone)]
pub struct ClockSampler {
    interval: Duration,
    active: bool,
    published: ProgressSnapshot,
}

impl ClockSampler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            active: false,
            published: ProgressSnapshot::default(),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn published(&self) -> ProgressSnapshot {
        self.published
    }

    pub fn start(&mut self) {
        self.active = true;
    }

    pub fn cancel(&mut self) {
        self.active = false;
    }

    /// Poll the player once. Returns whether the published value changed.
    ///
    /// Does nothing while cancelled or while the user is dragging the
    /// scrub bar for this row.
    pub fn tick<P: MediaPlayer>(&mut self, player: &P, scrub: &ScrubState) -> bool {
        if !self.active || scrub.is_dragging {
            return false;
        }
        let next = ProgressSnapshot {
            current_time: player.current_time(),
            duration: player.duration(),
        };
        if next == self.published {
            return false;
        }
        trace!(
            current_time = next.current_time,
            duration = next.duration,
            "Progress sampled"
        );
        self.published = next;
        true
    }

    /// Publish a time right away (seek or active drag) so the bar never
    /// shows the stale pre-seek value until the next tick.
    pub fn publish_time(&mut self, current_time: f64) {
        self.published.current_time = current_time;
    }

    pub fn publish_duration(&mut self, duration: f64) {
        self.published.duration = duration;
    }
}

impl Default for ClockSampler {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_SAMPLE_INTERVAL_MS))
    }
}
