use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::api::SiteApi;
use crate::store::StateCell;
use site_types::{LeaderboardPeriod, LeaderboardPlayer, PrizeTier};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeaderboardState {
    pub period: LeaderboardPeriod,
    /// Server order; never sorted locally.
    pub players: Vec<LeaderboardPlayer>,
    pub loading: bool,
    pub error: Option<String>,
}

impl LeaderboardState {
    /// First three entries with their prize tier, by position only.
    pub fn podium(&self) -> Vec<(PrizeTier, &LeaderboardPlayer)> {
        site_core::podium(&self.players)
    }
}

pub struct LeaderboardStore {
    api: Arc<dyn SiteApi>,
    state: StateCell<LeaderboardState>,
}

impl LeaderboardStore {
    pub fn new(api: Arc<dyn SiteApi>) -> Self {
        Self {
            api,
            state: StateCell::new(LeaderboardState::default()),
        }
    }

    pub fn snapshot(&self) -> LeaderboardState {
        self.state.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<LeaderboardState> {
        self.state.subscribe()
    }

    /// Fetches the standings for `period`.
    ///
    /// Success replaces the whole list and clears the error; failure keeps the
    /// previous list and records the error. Only the most recently issued
    /// fetch may write; an older response arriving late is dropped.
    pub async fn fetch_leaderboard(&self, period: LeaderboardPeriod) {
        let epoch = self.state.begin();
        self.state.update(|state| state.loading = true);
        debug!("Fetching {} leaderboard (epoch {})", period.as_str(), epoch);

        let result = self.api.leaderboard(period).await;

        let summary = match &result {
            Ok(players) => format!("{} players", players.len()),
            Err(e) => format!("error: {}", e),
        };
        let applied = self.state.apply_if_current(epoch, |state| {
            state.loading = false;
            match result {
                Ok(players) => {
                    state.period = period;
                    state.players = players;
                    state.error = None;
                }
                Err(e) => {
                    state.error = Some(e.user_message("Failed to fetch leaderboard"));
                }
            }
        });

        if applied {
            info!("Leaderboard updated ({})", summary);
        } else {
            warn!("Discarded stale leaderboard response (epoch {}, {})", epoch, summary);
        }
    }
}
