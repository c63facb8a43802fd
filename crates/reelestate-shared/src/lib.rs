//! # reelestate-shared
//!
//! Domain types, constants and helpers shared by the feed, upload and
//! client crates.

pub mod constants;
pub mod error;
pub mod subscription;
pub mod timecode;
pub mod types;

pub use error::SharedError;
pub use types::*;
