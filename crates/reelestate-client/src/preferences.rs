//! Feed filter preferences and the listing source they reshape.

use std::future::Future;

use reelestate_shared::{FeedItem, FeedPreferences};

use crate::error::Result;

pub trait PreferencesStore {
    fn get(&self) -> FeedPreferences;
    fn set(&mut self, preferences: FeedPreferences);
}

impl<T: PreferencesStore + ?Sized> PreferencesStore for Box<T> {
    fn get(&self) -> FeedPreferences {
        (**self).get()
    }

    fn set(&mut self, preferences: FeedPreferences) {
        (**self).set(preferences)
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryPreferences {
    current: FeedPreferences,
}

impl PreferencesStore for MemoryPreferences {
    fn get(&self) -> FeedPreferences {
        self.current.clone()
    }

    fn set(&mut self, preferences: FeedPreferences) {
        self.current = preferences;
    }
}

/// Produces the ordered list the feed shows for a set of filters.
pub trait ListingSource {
    /// Listings matching `preferences`, starting `offset` rows into the
    /// ordered result.
    fn fetch(
        &self,
        preferences: &FeedPreferences,
        offset: usize,
    ) -> impl Future<Output = Result<Vec<FeedItem>>> + Send;
}
