//! A mounted feed row: its player driver, clock sampler and scrub bar.

use std::time::Duration;

use crate::driver::{FeedVariant, PlaybackDriver, PlaybackSession};
use crate::player::MediaPlayer;
use crate::sampler::{ClockSampler, ProgressSnapshot};
use crate::scrub::{FillMode, ScrubControl, ScrubUpdate, SeekCommand, TrackGeometry};

pub struct FeedEntry<P: MediaPlayer> {
    driver: PlaybackDriver<P>,
    sampler: ClockSampler,
    scrub: ScrubControl,
}

impl<P: MediaPlayer> FeedEntry<P> {
    pub fn new(
        player: P,
        variant: FeedVariant,
        muted: bool,
        sample_interval: Duration,
        drag_threshold: f64,
    ) -> Self {
        Self {
            driver: PlaybackDriver::new(player, variant, muted),
            sampler: ClockSampler::new(sample_interval),
            scrub: ScrubControl::new(drag_threshold),
        }
    }

    pub fn driver(&self) -> &PlaybackDriver<P> {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut PlaybackDriver<P> {
        &mut self.driver
    }

    pub fn sampler(&self) -> &ClockSampler {
        &self.sampler
    }

    pub fn scrub(&self) -> &ScrubControl {
        &self.scrub
    }

    /// Apply visibility to the driver first, then start or cancel the
    /// sampler, so no later tick reads a hidden row's player.
    pub fn set_visible(&mut self, visible: bool) {
        self.driver.set_visible(visible);
        if visible {
            self.sampler.start();
        } else {
            self.sampler.cancel();
            self.scrub.cancel();
        }
    }

    pub fn tick(&mut self) -> bool {
        self.sampler.tick(self.driver.player(), &self.scrub.state())
    }

    pub fn progress(&self) -> ProgressSnapshot {
        self.sampler.published()
    }

    pub fn fill_mode(&self) -> FillMode {
        self.scrub.fill_mode()
    }

    pub fn session(&self) -> PlaybackSession {
        let progress = self.sampler.published();
        self.driver.session(progress.current_time, progress.duration)
    }

    pub fn set_track_geometry(&mut self, geometry: TrackGeometry) {
        self.scrub.set_geometry(geometry);
    }

    fn duration(&self) -> f64 {
        self.driver.player().duration()
    }

    fn publish_update(&mut self, update: Option<ScrubUpdate>) -> Option<ScrubUpdate> {
        if let Some(time) = update.and_then(|u| u.time) {
            self.sampler.publish_time(time);
        }
        update
    }

    pub fn scrub_down(&mut self, x: f64) -> Option<ScrubUpdate> {
        let duration = self.duration();
        let update = self.scrub.pointer_down(x, duration);
        self.publish_update(update)
    }

    pub fn scrub_move(&mut self, x: f64) -> Option<ScrubUpdate> {
        let duration = self.duration();
        let update = self.scrub.pointer_move(x, duration);
        self.publish_update(update)
    }

    /// Finish the gesture, seek the player and publish the new time before
    /// the next tick can overwrite it.
    pub fn scrub_up(&mut self, x: f64) -> Option<SeekCommand> {
        let duration = self.duration();
        let command = self.scrub.pointer_up(x, duration)?;
        self.driver.player_mut().seek(command.time);
        self.sampler.publish_time(command.time);
        self.sampler.publish_duration(duration);
        Some(command)
    }

    pub fn scrub_cancel(&mut self) {
        self.scrub.cancel();
    }
}
