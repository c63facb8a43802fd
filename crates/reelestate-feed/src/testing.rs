//! Scripted player used by the unit tests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use reelestate_shared::{FeedItem, ItemId};

use crate::player::{MediaPlayer, PlayerFactory};

#[derive(Debug, Clone, Default)]
pub struct PlayerRecord {
    pub playing: bool,
    pub muted: bool,
    pub looping: bool,
    pub rate: f64,
    pub current_time: f64,
    pub duration: f64,
    pub seeks: Vec<f64>,
    pub reads: usize,
}

#[derive(Debug, Clone)]
pub struct FakePlayer {
    pub record: Rc<RefCell<PlayerRecord>>,
    pub rate_supported: bool,
}

impl FakePlayer {
    pub fn new(duration: f64) -> Self {
        Self {
            record: Rc::new(RefCell::new(PlayerRecord {
                rate: 1.0,
                duration,
                ..Default::default()
            })),
            rate_supported: true,
        }
    }

    pub fn without_rate(duration: f64) -> Self {
        Self {
            rate_supported: false,
            ..Self::new(duration)
        }
    }

    pub fn advance_to(&self, t: f64) {
        self.record.borrow_mut().current_time = t;
    }

    pub fn snapshot(&self) -> PlayerRecord {
        self.record.borrow().clone()
    }
}

impl MediaPlayer for FakePlayer {
    fn play(&mut self) {
        self.record.borrow_mut().playing = true;
    }

    fn pause(&mut self) {
        self.record.borrow_mut().playing = false;
    }

    fn set_muted(&mut self, muted: bool) {
        self.record.borrow_mut().muted = muted;
    }

    fn set_loop(&mut self, looping: bool) {
        self.record.borrow_mut().looping = looping;
    }

    fn supports_rate(&self) -> bool {
        self.rate_supported
    }

    fn set_rate(&mut self, rate: f64) {
        self.record.borrow_mut().rate = rate;
    }

    fn current_time(&self) -> f64 {
        let mut record = self.record.borrow_mut();
        record.reads += 1;
        record.current_time
    }

    fn duration(&self) -> f64 {
        self.record.borrow().duration
    }

    fn seek(&mut self, seconds: f64) {
        let mut record = self.record.borrow_mut();
        record.seeks.push(seconds);
        record.current_time = seconds;
    }
}

/// Hands out [`FakePlayer`]s and keeps a handle on every one it created.
#[derive(Debug, Default)]
pub struct FakeFactory {
    pub duration: f64,
    pub created: HashMap<ItemId, FakePlayer>,
}

impl FakeFactory {
    pub fn with_duration(duration: f64) -> Self {
        Self {
            duration,
            created: HashMap::new(),
        }
    }

    pub fn player(&self, id: &str) -> FakePlayer {
        self.created
            .get(&ItemId::from(id))
            .cloned()
            .expect("player was never created")
    }
}

impl PlayerFactory for FakeFactory {
    type Player = FakePlayer;

    fn create(&mut self, item: &FeedItem) -> FakePlayer {
        let player = FakePlayer::new(self.duration);
        self.created.insert(item.id.clone(), player.clone());
        player
    }
}

pub fn items(ids: &[&str]) -> Vec<FeedItem> {
    ids.iter()
        .map(|id| FeedItem::new(*id, format!("https://cdn.example/{id}.mp4")))
        .collect()
}
