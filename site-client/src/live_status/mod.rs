use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::api::{ApiError, SiteApi};
use crate::config::Config;
use site_types::LiveStatus;

pub mod backoff;

pub use backoff::Backoff;

/// Periodically asks the streaming platform whether the channel is live.
///
/// A failed poll is logged and leaves the last known status in place.
pub struct LiveStatusPoller {
    api: Arc<dyn SiteApi>,
    channel: String,
    interval: Duration,
    max_backoff: Duration,
    state: watch::Sender<LiveStatus>,
}

impl LiveStatusPoller {
    pub fn new(
        api: Arc<dyn SiteApi>,
        channel: impl Into<String>,
        interval: Duration,
        max_backoff: Duration,
    ) -> Self {
        let (state, _) = watch::channel(LiveStatus::default());
        Self {
            api,
            channel: channel.into(),
            interval,
            max_backoff,
            state,
        }
    }

    pub fn from_config(api: Arc<dyn SiteApi>, config: &Config) -> Self {
        Self::new(
            api,
            config.kick_channel.clone(),
            config.live_poll_interval,
            config.live_poll_max_backoff,
        )
    }

    pub fn status(&self) -> LiveStatus {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<LiveStatus> {
        self.state.subscribe()
    }

    pub async fn poll_once(&self) -> Result<LiveStatus, ApiError> {
        let channel = self.api.channel_status(&self.channel).await.map_err(|e| {
            error!("Error fetching live status for {}: {}", self.channel, e);
            e
        })?;

        let status = site_core::live_status_from(&channel);
        let changed = self.state.send_if_modified(|current| {
            if *current == status {
                return false;
            }
            *current = status;
            true
        });
        if changed {
            info!(
                "{} is now {} (viewers: {:?})",
                self.channel,
                if status.is_live { "live" } else { "offline" },
                status.viewer_count
            );
        }
        Ok(status)
    }

    /// Polls immediately, then once per interval until the handle is shut
    /// down or dropped.
    pub fn spawn(self: Arc<Self>) -> PollerHandle {
        let (shutdown, stop) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            let poller = self;
            let run = async {
                let mut backoff = Backoff::new_with_limits(poller.interval, poller.max_backoff);
                loop {
                    match poller.poll_once().await {
                        Ok(_) => backoff.record_success(),
                        Err(_) => backoff.record_failure(),
                    }
                    let delay = backoff.next_delay();
                    debug!(
                        "Next live status poll in {:?} ({} consecutive failures)",
                        delay,
                        backoff.failures()
                    );
                    tokio::time::sleep(delay).await;
                }
            };

            tokio::select! {
                _ = stop => info!("Live status poller stopped"),
                _ = run => {}
            }
        });

        PollerHandle {
            shutdown: Some(shutdown),
            task,
        }
    }
}

pub struct PollerHandle {
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl PollerHandle {
    pub async fn shutdown(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        let _ = (&mut self.task).await;
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
