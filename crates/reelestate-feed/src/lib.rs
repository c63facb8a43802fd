//! # reelestate-feed
//!
//! Playback controller for the vertically paged listing feed.
//!
//! The host list control reports per-row visibility; the controller decides
//! which item plays, drives each item's native player through the
//! [`player::MediaPlayer`] trait, polls the active player's clock for the
//! scrub bar and turns pointer gestures on the scrub track into seeks.

pub mod controller;
pub mod driver;
pub mod entry;
pub mod error;
pub mod player;
pub mod sampler;
pub mod scrub;
pub mod viewport;

#[cfg(test)]
pub(crate) mod testing;

pub use controller::{FeedConfig, FeedController};
pub use error::FeedError;
pub use player::{MediaPlayer, PlayerFactory};
