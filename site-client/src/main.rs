use std::sync::Arc;

use tokio::signal;
use tracing::info;

use site_client::{
    Config, GuessStore, HttpApi, LeaderboardStore, LiveStatusPoller, SessionState, SiteApi,
};
use site_persistence::DatabaseManager;
use site_types::{LeaderboardPeriod, User};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("Starting site client...");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let db = match DatabaseManager::open(&config.database_url).await {
        Ok(db) => db,
        Err(e) => {
            tracing::error!("Failed to open local storage database: {}", e);
            std::process::exit(1);
        }
    };
    let session = Arc::new(SessionState::restore(Arc::new(db.local_storage())).await);

    // A credential handed over by the login flow replaces whatever was stored
    if let (Ok(token), Ok(user_json)) = (
        std::env::var("SESSION_TOKEN"),
        std::env::var("SESSION_USER"),
    ) {
        match serde_json::from_str::<User>(&user_json) {
            Ok(user) => {
                if let Err(e) = session.login(token, user).await {
                    tracing::error!("Failed to persist session: {}", e);
                }
            }
            Err(e) => tracing::error!("SESSION_USER is not a valid user: {}", e),
        }
    }

    let api: Arc<dyn SiteApi> = match HttpApi::new(&config) {
        Ok(api) => Arc::new(api),
        Err(e) => {
            tracing::error!("Failed to build HTTP client: {}", e);
            std::process::exit(1);
        }
    };

    let leaderboard = Arc::new(LeaderboardStore::new(api.clone()));
    let guesses = Arc::new(GuessStore::new(api.clone(), session.clone()));
    let live_status = Arc::new(LiveStatusPoller::from_config(api.clone(), &config));

    // Render leaderboard changes
    let mut leaderboard_updates = leaderboard.subscribe();
    tokio::spawn(async move {
        while leaderboard_updates.changed().await.is_ok() {
            let state = leaderboard_updates.borrow_and_update().clone();
            if let Some(error) = &state.error {
                tracing::warn!("Failed to load leaderboard: {}", error);
            }
            for (tier, player) in state.podium() {
                info!(
                    "{}: {} (${:.2} wagered, prize ${})",
                    tier.label(),
                    player.username,
                    player.wager,
                    tier.reward()
                );
            }
        }
    });

    // Render guess game changes
    let mut guess_updates = guesses.subscribe();
    tokio::spawn(async move {
        while guess_updates.changed().await.is_ok() {
            let state = guess_updates.borrow_and_update().clone();
            if !state.message.is_empty() {
                info!("Guess game: {}", state.message);
            }
            if let Some(winner) = state.winner() {
                info!("Winner: {} with {}", winner.username, winner.guessed_number);
            }
            info!(
                "{} guesses this round, status {:?}",
                state.guesses.len(),
                state.status
            );
        }
    });

    leaderboard.fetch_leaderboard(LeaderboardPeriod::Monthly).await;

    if let Some(user) = session.user() {
        info!("Signed in as {}", user.username);
        guesses.fetch_guesses().await;
        if session.is_admin() {
            guesses.fetch_current_balance().await;
        }
    } else {
        info!("Not signed in; guess game is read-only");
    }

    let poller = live_status.clone().spawn();

    // Keep the round fresh while signed in
    let refresh_guesses = guesses.clone();
    let refresh_session = session.clone();
    let guess_poll_interval = config.guess_poll_interval;
    let refresher = tokio::spawn(async move {
        let mut interval = tokio::time::interval(guess_poll_interval);
        interval.tick().await;
        loop {
            interval.tick().await;
            if refresh_session.user().is_some() {
                refresh_guesses.fetch_guesses().await;
            }
        }
    });

    // Wait for SIGINT (Ctrl+C) or SIGTERM
    #[cfg(unix)]
    {
        match (
            signal::unix::signal(signal::unix::SignalKind::interrupt()),
            signal::unix::signal(signal::unix::SignalKind::terminate()),
        ) {
            (Ok(mut sigint), Ok(mut sigterm)) => {
                tokio::select! {
                    _ = sigint.recv() => {
                        info!("Received SIGINT, shutting down...");
                    }
                    _ = sigterm.recv() => {
                        info!("Received SIGTERM, shutting down...");
                    }
                }
            }
            _ => {
                tracing::error!("Failed to install signal handlers");
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl+c: {}", e);
        }
        info!("Received Ctrl+C, shutting down...");
    }

    refresher.abort();
    poller.shutdown().await;
    info!("Site client stopped.");
}
