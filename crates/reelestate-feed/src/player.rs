//! Native video player seam.
//!
//! Every setter is best effort: the platform player may silently ignore a
//! value. Variable rate is a queried capability rather than a call that can
//! fail, so drivers only call [`MediaPlayer::set_rate`] after
//! [`MediaPlayer::supports_rate`] said yes.

use reelestate_shared::constants::{BOOSTED_RATE, NORMAL_RATE};
use reelestate_shared::FeedItem;
use serde::Serialize;

pub trait MediaPlayer {
    fn play(&mut self);
    fn pause(&mut self);
    fn set_muted(&mut self, muted: bool);
    fn set_loop(&mut self, looping: bool);

    /// Whether the platform player honours [`MediaPlayer::set_rate`].
    fn supports_rate(&self) -> bool {
        false
    }

    fn set_rate(&mut self, _rate: f64) {}

    /// Current position in seconds.
    fn current_time(&self) -> f64;

    /// Total length in seconds; zero or non-finite until metadata is loaded.
    fn duration(&self) -> f64;

    fn seek(&mut self, seconds: f64);
}

impl<T: MediaPlayer + ?Sized> MediaPlayer for Box<T> {
    fn play(&mut self) {
        (**self).play()
    }

    fn pause(&mut self) {
        (**self).pause()
    }

    fn set_muted(&mut self, muted: bool) {
        (**self).set_muted(muted)
    }

    fn set_loop(&mut self, looping: bool) {
        (**self).set_loop(looping)
    }

    fn supports_rate(&self) -> bool {
        (**self).supports_rate()
    }

    fn set_rate(&mut self, rate: f64) {
        (**self).set_rate(rate)
    }

    fn current_time(&self) -> f64 {
        (**self).current_time()
    }

    fn duration(&self) -> f64 {
        (**self).duration()
    }

    fn seek(&mut self, seconds: f64) {
        (**self).seek(seconds)
    }
}

/// Creates the native player when a feed row mounts.
pub trait PlayerFactory {
    type Player: MediaPlayer;

    fn create(&mut self, item: &FeedItem) -> Self::Player;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum PlaybackRate {
    #[default]
    Normal,
    Boosted,
}

impl PlaybackRate {
    pub fn value(self) -> f64 {
        match self {
            PlaybackRate::Normal => NORMAL_RATE,
            PlaybackRate::Boosted => BOOSTED_RATE,
        }
    }
}

/// Apply a rate if the player can take it; otherwise do nothing.
pub(crate) fn apply_rate<P: MediaPlayer>(player: &mut P, rate: PlaybackRate) -> bool {
    if player.supports_rate() {
        player.set_rate(rate.value());
        true
    } else {
        false
    }
}
