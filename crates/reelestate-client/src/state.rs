//! Application state shared across all commands.
//!
//! The [`AppState`] is created once at startup and handed around as an
//! [`Arc`]. The feed and the upload wizard sit behind separate locks so a
//! publish in flight never stalls the playback clock.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use reelestate_feed::driver::FeedVariant;
use reelestate_feed::{FeedController, MediaPlayer, PlayerFactory};
use reelestate_shared::FeedItem;
use reelestate_upload::UploadWizard;

use crate::config::ClientConfig;
use crate::engagement::{Engagement, IdSetStore, MemoryIdSet};
use crate::preferences::{MemoryPreferences, PreferencesStore};

/// Native player handle as created by the host platform.
pub type BoxedPlayer = Box<dyn MediaPlayer + Send>;

/// [`PlayerFactory`] over a host-supplied constructor.
pub struct BoxedPlayerFactory {
    create: Box<dyn FnMut(&FeedItem) -> BoxedPlayer + Send>,
}

impl BoxedPlayerFactory {
    pub fn new(create: impl FnMut(&FeedItem) -> BoxedPlayer + Send + 'static) -> Self {
        Self {
            create: Box::new(create),
        }
    }
}

impl PlayerFactory for BoxedPlayerFactory {
    type Player = BoxedPlayer;

    fn create(&mut self, item: &FeedItem) -> BoxedPlayer {
        (self.create)(item)
    }
}

pub type SharedFeed = FeedController<BoxedPlayerFactory>;
pub type SharedEngagement = Engagement<Box<dyn IdSetStore + Send>>;

/// Subscription as last verified on this device.
#[derive(Debug, Clone, Default)]
pub struct SubscriptionState {
    pub valid_until: Option<DateTime<Utc>>,
}

impl SubscriptionState {
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.valid_until.is_some_and(|until| now <= until)
    }
}

/// Central application state.
pub struct AppState {
    /// Settings loaded at startup.
    pub config: ClientConfig,

    /// Playback controller for the feed currently on screen.
    /// Never held across an `.await`.
    pub feed: Mutex<SharedFeed>,

    /// The upload wizard. Held across the publish request, which is why it
    /// has its own async lock.
    pub wizard: tokio::sync::Mutex<UploadWizard>,

    /// Like/save membership.
    pub engagement: Mutex<SharedEngagement>,

    /// Current feed filters.
    pub preferences: Mutex<Box<dyn PreferencesStore + Send>>,

    /// Signed-in account. `None` until the host signs the user in.
    pub account_id: Mutex<Option<String>>,

    pub subscription: Mutex<SubscriptionState>,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    /// State with in-memory engagement and preference stores.
    pub fn new(config: ClientConfig, variant: FeedVariant, players: BoxedPlayerFactory) -> Self {
        let engagement: SharedEngagement =
            Engagement::new(Box::new(MemoryIdSet::new()), Box::new(MemoryIdSet::new()));
        Self::with_stores(
            config,
            variant,
            players,
            engagement,
            Box::new(MemoryPreferences::default()),
        )
    }

    pub fn with_stores(
        config: ClientConfig,
        variant: FeedVariant,
        players: BoxedPlayerFactory,
        engagement: SharedEngagement,
        preferences: Box<dyn PreferencesStore + Send>,
    ) -> Self {
        let feed = FeedController::new(config.feed_config(variant), players);
        Self {
            config,
            feed: Mutex::new(feed),
            wizard: tokio::sync::Mutex::new(UploadWizard::new()),
            engagement: Mutex::new(engagement),
            preferences: Mutex::new(preferences),
            account_id: Mutex::new(None),
            subscription: Mutex::new(SubscriptionState::default()),
        }
    }

    pub fn shared(self) -> SharedState {
        Arc::new(self)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Thread-safe fake player for the client tests.

    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use reelestate_shared::ItemId;

    use super::*;

    #[derive(Debug, Default)]
    pub struct ClockRecord {
        pub current_time: f64,
        pub duration: f64,
        pub playing: bool,
        pub seeks: Vec<f64>,
    }

    #[derive(Clone, Default)]
    pub struct SharedClock(pub Arc<Mutex<ClockRecord>>);

    impl SharedClock {
        pub fn set_time(&self, t: f64) {
            self.0.lock().unwrap().current_time = t;
        }

        pub fn playing(&self) -> bool {
            self.0.lock().unwrap().playing
        }
    }

    impl MediaPlayer for SharedClock {
        fn play(&mut self) {
            self.0.lock().unwrap().playing = true;
        }

        fn pause(&mut self) {
            self.0.lock().unwrap().playing = false;
        }

        fn set_muted(&mut self, _muted: bool) {}

        fn set_loop(&mut self, _looping: bool) {}

        fn current_time(&self) -> f64 {
            self.0.lock().unwrap().current_time
        }

        fn duration(&self) -> f64 {
            self.0.lock().unwrap().duration
        }

        fn seek(&mut self, seconds: f64) {
            let mut record = self.0.lock().unwrap();
            record.seeks.push(seconds);
            record.current_time = seconds;
        }
    }

    /// Clocks of every player the factory created, by item id.
    #[derive(Clone, Default)]
    pub struct ClockRegistry(Arc<Mutex<HashMap<ItemId, SharedClock>>>);

    impl ClockRegistry {
        pub fn clock(&self, id: &str) -> SharedClock {
            self.0.lock().unwrap()[&ItemId::from(id)].clone()
        }
    }

    pub fn clock_factory(duration: f64) -> (BoxedPlayerFactory, ClockRegistry) {
        let registry = ClockRegistry::default();
        let handle = registry.clone();
        let factory = BoxedPlayerFactory::new(move |item| {
            let clock = SharedClock::default();
            clock.0.lock().unwrap().duration = duration;
            handle.0.lock().unwrap().insert(item.id.clone(), clock.clone());
            Box::new(clock) as BoxedPlayer
        });
        (factory, registry)
    }

    pub fn test_state(config: ClientConfig) -> (SharedState, ClockRegistry) {
        let (factory, clocks) = clock_factory(60.0);
        (
            AppState::new(config, FeedVariant::Reels, factory).shared(),
            clocks,
        )
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn test_subscription_state_expiry() {
        let now = Utc::now();
        let mut sub = SubscriptionState::default();
        assert!(!sub.is_active(now));
        sub.valid_until = Some(now + Duration::days(1));
        assert!(sub.is_active(now));
        assert!(!sub.is_active(now + Duration::days(2)));
    }

    #[test]
    fn test_state_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AppState>();
    }
}
