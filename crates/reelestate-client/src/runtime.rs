//! Background task driving the progress clock.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, trace};

use crate::state::SharedState;

/// Ticks the feed's samplers on a fixed cadence until stopped. Dropping the
/// handle stops the task as well.
pub struct SamplerRuntime {
    handle: JoinHandle<()>,
}

impl SamplerRuntime {
    /// Start ticking at the configured sample interval.
    pub fn start(state: SharedState) -> Self {
        let interval = state.config.sample_interval;
        Self::start_with_interval(state, interval)
    }

    pub fn start_with_interval(state: SharedState, period: Duration) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            debug!(interval_ms = period.as_millis() as u64, "Sampler runtime started");

            loop {
                ticker.tick().await;
                let changed = match state.feed.lock() {
                    Ok(mut feed) => feed.sample_tick(),
                    Err(e) => {
                        error!(error = %e, "Feed lock poisoned, stopping sampler");
                        break;
                    }
                };
                if changed > 0 {
                    trace!(changed, "Progress sampled");
                }
            }
        });
        Self { handle }
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    pub fn stop(self) {
        self.handle.abort();
    }
}

impl Drop for SamplerRuntime {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use reelestate_shared::{FeedItem, ItemId};

    use super::*;
    use crate::config::ClientConfig;
    use crate::state::testing::test_state;

    #[tokio::test(start_paused = true)]
    async fn test_runtime_publishes_sampled_time() {
        let (state, clocks) = test_state(ClientConfig::default());
        let id = ItemId::from("a");
        {
            let mut feed = state.feed.lock().unwrap();
            feed.replace_items(vec![FeedItem::new("a", "https://cdn/a.mp4")])
                .unwrap();
            feed.apply_viewport(&[(id.clone(), 1.0)]);
        }
        clocks.clock("a").set_time(7.5);

        let runtime = SamplerRuntime::start(state.clone());
        tokio::time::sleep(Duration::from_millis(350)).await;

        let progress = state.feed.lock().unwrap().progress(&id).unwrap();
        assert_eq!(progress.current_time, 7.5);
        assert_eq!(progress.duration, 60.0);
        assert_eq!(
            state.feed.lock().unwrap().items()[0].duration,
            Some(60.0)
        );
        runtime.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_stopped_runtime_no_longer_samples() {
        let (state, clocks) = test_state(ClientConfig::default());
        let id = ItemId::from("a");
        {
            let mut feed = state.feed.lock().unwrap();
            feed.replace_items(vec![FeedItem::new("a", "https://cdn/a.mp4")])
                .unwrap();
            feed.apply_viewport(&[(id.clone(), 1.0)]);
        }

        let runtime = SamplerRuntime::start_with_interval(state.clone(), Duration::from_millis(100));
        clocks.clock("a").set_time(1.0);
        tokio::time::sleep(Duration::from_millis(250)).await;
        runtime.stop();
        tokio::task::yield_now().await;

        clocks.clock("a").set_time(9.0);
        tokio::time::sleep(Duration::from_millis(500)).await;
        let progress = state.feed.lock().unwrap().progress(&id).unwrap();
        assert_eq!(progress.current_time, 1.0);
    }
}
