//! Per-item playback driver.
//!
//! Each mounted feed row owns one driver and, through it, one native
//! player. Play/pause follows viewport membership plus (on the reels
//! screen) an explicit pause toggle; the press-and-hold speed boost is a
//! rate sub-state layered on top.
//!
//! Only one row should be playing at a time. That is not enforced here: it
//! falls out of every row reacting to its own visibility, and a brief
//! overlap during a fast fling corrects itself on the next viewport report.

use serde::Serialize;
use tracing::debug;

use crate::player::{apply_rate, MediaPlayer, PlaybackRate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum PlaybackPhase {
    /// Not visible.
    #[default]
    Idle,
    Playing,
    /// Visible but explicitly paused by the user.
    Paused,
}

/// Which screen the row lives on. Reels adds tap-to-pause and the edge
/// press speed boost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum FeedVariant {
    #[default]
    Feed,
    Reels,
}

impl FeedVariant {
    pub fn has_gestures(self) -> bool {
        matches!(self, FeedVariant::Reels)
    }
}

/// Observable per-item player state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaybackSession {
    pub phase: PlaybackPhase,
    pub playing: bool,
    pub muted: bool,
    pub looping: bool,
    pub rate: PlaybackRate,
    pub current_time: f64,
    pub duration: f64,
}

pub struct PlaybackDriver<P: MediaPlayer> {
    player: P,
    variant: FeedVariant,
    phase: PlaybackPhase,
    rate: PlaybackRate,
    visible: bool,
    paused_by_user: bool,
    muted: bool,
}

impl<P: MediaPlayer> PlaybackDriver<P> {
    pub fn new(mut player: P, variant: FeedVariant, muted: bool) -> Self {
        player.set_loop(true);
        player.set_muted(muted);
        player.pause();
        Self {
            player,
            variant,
            phase: PlaybackPhase::Idle,
            rate: PlaybackRate::Normal,
            visible: false,
            paused_by_user: false,
            muted,
        }
    }

    pub fn phase(&self) -> PlaybackPhase {
        self.phase
    }

    pub fn rate(&self) -> PlaybackRate {
        self.rate
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_playing(&self) -> bool {
        self.phase == PlaybackPhase::Playing
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut P {
        &mut self.player
    }

    /// Apply viewport membership.
    ///
    /// Leaving the viewport always forces the rate back to normal, even if
    /// the boost release never arrived (it may not fire once the row has
    /// scrolled away).
    pub fn set_visible(&mut self, visible: bool) {
        if visible == self.visible {
            return;
        }
        self.visible = visible;

        if visible {
            self.player.set_loop(true);
            if self.paused_by_user {
                self.phase = PlaybackPhase::Paused;
            } else {
                self.phase = PlaybackPhase::Playing;
                self.player.play();
            }
        } else {
            self.phase = PlaybackPhase::Idle;
            self.player.pause();
            self.rate = PlaybackRate::Normal;
            apply_rate(&mut self.player, PlaybackRate::Normal);
        }

        debug!(visible, phase = ?self.phase, "Playback visibility applied");
    }

    /// Tap-to-pause. Returns whether anything changed; a no-op while hidden
    /// or on the plain feed.
    pub fn toggle_pause(&mut self) -> bool {
        if !self.variant.has_gestures() || !self.visible {
            return false;
        }
        match self.phase {
            PlaybackPhase::Playing => {
                self.paused_by_user = true;
                self.phase = PlaybackPhase::Paused;
                self.player.pause();
            }
            PlaybackPhase::Paused => {
                self.paused_by_user = false;
                self.phase = PlaybackPhase::Playing;
                self.player.play();
            }
            PlaybackPhase::Idle => return false,
        }
        true
    }

    /// Press-and-hold on a screen edge. Returns whether the boost is active.
    pub fn press_boost(&mut self) -> bool {
        if !self.variant.has_gestures() || !self.visible {
            return false;
        }
        self.rate = PlaybackRate::Boosted;
        if !apply_rate(&mut self.player, PlaybackRate::Boosted) {
            debug!("Player has no variable rate, boost ignored by platform");
        }
        true
    }

    pub fn release_boost(&mut self) {
        if self.rate == PlaybackRate::Normal {
            return;
        }
        self.rate = PlaybackRate::Normal;
        apply_rate(&mut self.player, PlaybackRate::Normal);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        self.player.set_muted(muted);
    }

    pub fn session(&self, current_time: f64, duration: f64) -> PlaybackSession {
        PlaybackSession {
            phase: self.phase,
            playing: self.is_playing(),
            muted: self.muted,
            looping: true,
            rate: self.rate,
            current_time,
            duration,
        }
    }
}
