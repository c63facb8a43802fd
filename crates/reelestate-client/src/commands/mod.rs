//! Command handlers invoked by the mobile shell.
//!
//! Each sub-module groups related commands by domain. Every command takes
//! the shared [`AppState`](crate::state::AppState) and returns
//! `Result<T, String>` so errors cross the bridge as user-facing text.

pub mod engagement;
pub mod feed;
pub mod subscription;
pub mod upload;
