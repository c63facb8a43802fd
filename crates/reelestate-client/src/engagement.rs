//! Like and save toggles.
//!
//! Membership lives in an [`IdSetStore`] injected at startup, so tests and
//! alternative backends can swap the in-memory set for their own.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::debug;

use reelestate_shared::ItemId;

pub trait IdSetStore {
    fn contains(&self, id: &ItemId) -> bool;

    /// Returns `false` if the id was already present.
    fn insert(&mut self, id: ItemId) -> bool;

    /// Returns `false` if the id was not present.
    fn remove(&mut self, id: &ItemId) -> bool;

    fn ids(&self) -> Vec<ItemId>;
}

impl<T: IdSetStore + ?Sized> IdSetStore for Box<T> {
    fn contains(&self, id: &ItemId) -> bool {
        (**self).contains(id)
    }

    fn insert(&mut self, id: ItemId) -> bool {
        (**self).insert(id)
    }

    fn remove(&mut self, id: &ItemId) -> bool {
        (**self).remove(id)
    }

    fn ids(&self) -> Vec<ItemId> {
        (**self).ids()
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryIdSet {
    ids: BTreeSet<ItemId>,
}

impl MemoryIdSet {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdSetStore for MemoryIdSet {
    fn contains(&self, id: &ItemId) -> bool {
        self.ids.contains(id)
    }

    fn insert(&mut self, id: ItemId) -> bool {
        self.ids.insert(id)
    }

    fn remove(&mut self, id: &ItemId) -> bool {
        self.ids.remove(id)
    }

    fn ids(&self) -> Vec<ItemId> {
        self.ids.iter().cloned().collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EngagementStatus {
    pub liked: bool,
    pub saved: bool,
}

pub struct Engagement<S: IdSetStore> {
    likes: S,
    saves: S,
}

fn toggle<S: IdSetStore>(store: &mut S, id: &ItemId) -> bool {
    if store.remove(id) {
        false
    } else {
        store.insert(id.clone());
        true
    }
}

impl<S: IdSetStore> Engagement<S> {
    pub fn new(likes: S, saves: S) -> Self {
        Self { likes, saves }
    }

    /// Flip the like flag. Returns the new state.
    pub fn toggle_like(&mut self, id: &ItemId) -> bool {
        let liked = toggle(&mut self.likes, id);
        debug!(item = %id, liked, "Like toggled");
        liked
    }

    /// Flip the saved flag. Returns the new state.
    pub fn toggle_save(&mut self, id: &ItemId) -> bool {
        let saved = toggle(&mut self.saves, id);
        debug!(item = %id, saved, "Save toggled");
        saved
    }

    pub fn status(&self, id: &ItemId) -> EngagementStatus {
        EngagementStatus {
            liked: self.likes.contains(id),
            saved: self.saves.contains(id),
        }
    }

    pub fn saved_ids(&self) -> Vec<ItemId> {
        self.saves.ids()
    }

    pub fn liked_ids(&self) -> Vec<ItemId> {
        self.likes.ids()
    }
}

impl Default for Engagement<MemoryIdSet> {
    fn default() -> Self {
        Self::new(MemoryIdSet::new(), MemoryIdSet::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_like_flips_membership() {
        let mut engagement = Engagement::<MemoryIdSet>::default();
        let id = ItemId::from("villa-7");
        assert!(engagement.toggle_like(&id));
        assert!(engagement.status(&id).liked);
        assert!(!engagement.toggle_like(&id));
        assert!(!engagement.status(&id).liked);
    }

    #[test]
    fn test_likes_and_saves_are_independent() {
        let mut engagement = Engagement::<MemoryIdSet>::default();
        let id = ItemId::from("villa-7");
        engagement.toggle_save(&id);
        assert_eq!(
            engagement.status(&id),
            EngagementStatus {
                liked: false,
                saved: true
            }
        );
        assert_eq!(engagement.saved_ids(), vec![id]);
        assert!(engagement.liked_ids().is_empty());
    }

    #[test]
    fn test_boxed_store() {
        let mut engagement: Engagement<Box<dyn IdSetStore + Send>> =
            Engagement::new(Box::new(MemoryIdSet::new()), Box::new(MemoryIdSet::new()));
        let id = ItemId::from("a");
        assert!(engagement.toggle_like(&id));
        assert!(engagement.status(&id).liked);
    }
}
