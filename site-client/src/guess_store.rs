use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{Mutex, watch};
use tracing::{debug, info, warn};

use crate::api::{ApiError, SiteApi};
use crate::session::{Session, SessionState};
use crate::store::StateCell;
use site_core::{derive_status, has_guess_from, parse_whole_number};
use site_types::{Guess, GuessGame, SubmissionStatus, UserId};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuessState {
    /// Latest round document the server reported (create/reset responses).
    pub game: Option<GuessGame>,
    pub guesses: Vec<Guess>,
    pub status: SubmissionStatus,
    /// User that `status` was derived for.
    pub viewer: Option<UserId>,
    /// Admin view of the secret balance.
    pub correct_balance: Option<i64>,
    /// Single status line; the last write wins.
    pub message: String,
    pub loading: bool,
}

impl GuessState {
    pub fn winner(&self) -> Option<&Guess> {
        self.game.as_ref().and_then(|game| game.winner.as_ref())
    }

    fn has_submitted(&self, user_id: &str) -> bool {
        self.status == SubmissionStatus::Submitted && self.viewer.as_deref() == Some(user_id)
    }
}

enum Fetched {
    Applied,
    Stale,
    Failed(ApiError),
}

/// Keeps `loading` raised while at least one operation is running.
struct Loading<'a> {
    state: &'a StateCell<GuessState>,
}

impl<'a> Loading<'a> {
    fn start(state: &'a StateCell<GuessState>) -> Self {
        state.update(|s| {
            state.enter();
            s.loading = true;
        });
        Self { state }
    }
}

impl Drop for Loading<'_> {
    fn drop(&mut self) {
        self.state.update(|s| s.loading = self.state.leave() > 0);
    }
}

/// Guess-the-balance round cache and submission protocol.
///
/// Credential and user id come from the session at call time. Responses are
/// dropped when the session changed, when a newer fetch has begun, or when the
/// round was invalidated while they were in flight. Everything cached for one
/// session, the admin balance included, is dropped once the session changes.
pub struct GuessStore {
    api: Arc<dyn SiteApi>,
    session: Arc<SessionState>,
    state: StateCell<GuessState>,
    round: AtomicU64,
    /// Session generation the cached state belongs to.
    session_generation: AtomicU64,
    submission: Mutex<()>,
}

impl GuessStore {
    pub fn new(api: Arc<dyn SiteApi>, session: Arc<SessionState>) -> Self {
        Self {
            api,
            session_generation: AtomicU64::new(session.generation()),
            session,
            state: StateCell::new(GuessState::default()),
            round: AtomicU64::new(0),
            submission: Mutex::new(()),
        }
    }

    pub fn snapshot(&self) -> GuessState {
        self.follow_session();
        self.state.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<GuessState> {
        self.follow_session();
        self.state.subscribe()
    }

    /// Clears the cached round if the session changed since it was filled.
    fn follow_session(&self) {
        let current = self.session.generation();
        let seen = self.session_generation.swap(current, Ordering::SeqCst);
        if seen != current {
            debug!("Session changed, dropping cached round");
            self.invalidate_round(None, String::new(), None);
        }
    }

    fn set_message(&self, message: impl Into<String>) {
        let message = message.into();
        self.state.update(|state| state.message = message);
    }

    fn require_session(&self) -> Option<Session> {
        let session = self.session.snapshot();
        if session.is_none() {
            self.set_message(ApiError::NotLoggedIn.to_string());
        }
        session
    }

    fn is_live(&self, session: &Session, round: u64) -> bool {
        self.session.is_current(session.generation) && self.round.load(Ordering::SeqCst) == round
    }

    /// Loads the current round's guesses and derives the viewer's status.
    pub async fn fetch_guesses(&self) {
        self.follow_session();
        let Some(session) = self.require_session() else {
            return;
        };
        let _loading = Loading::start(&self.state);

        if let Fetched::Failed(e) = self.load_guesses(&session).await {
            self.set_message(e.user_message("Error fetching guesses"));
        }
    }

    async fn load_guesses(&self, session: &Session) -> Fetched {
        let epoch = self.state.begin();
        let result = self.api.list_guesses(&session.credential).await;

        if !self.session.is_current(session.generation) {
            debug!("Dropping guesses fetched under a previous session");
            return Fetched::Stale;
        }

        let guesses = match result {
            Ok(guesses) => guesses,
            Err(e) if self.state.is_current(epoch) => {
                warn!("Failed to fetch guesses: {}", e);
                return Fetched::Failed(e);
            }
            Err(_) => return Fetched::Stale,
        };

        let count = guesses.len();
        let status = derive_status(&guesses, &session.user.id);
        let viewer = session.user.id.clone();
        let applied = self.state.apply_if_current(epoch, |state| {
            state.guesses = guesses;
            state.status = status;
            state.viewer = Some(viewer);
        });

        if applied {
            info!(
                "Loaded {} guesses, {} is {:?}",
                count, session.user.username, status
            );
            Fetched::Applied
        } else {
            debug!("Discarded stale guess list (epoch {})", epoch);
            Fetched::Stale
        }
    }

    /// Submits the signed-in user's guess for the current round.
    ///
    /// Input is validated locally first. A user already marked as submitted,
    /// or a second submission while one is in flight, is refused without a
    /// request. Status only becomes `Submitted` once the server accepts.
    pub async fn submit_guess(&self, input: &str) {
        self.follow_session();
        let guessed_number = match parse_whole_number(input) {
            Ok(number) => number,
            Err(e) => {
                warn!("Guess rejected before sending: {}", e);
                self.set_message(ApiError::from(e).user_message("Error submitting guess"));
                return;
            }
        };
        let Some(session) = self.require_session() else {
            return;
        };
        if self.state.snapshot().has_submitted(&session.user.id) {
            self.set_message("You have already submitted a guess for this round");
            return;
        }
        let Ok(_submission) = self.submission.try_lock() else {
            self.set_message("A guess submission is already in progress");
            return;
        };
        let _loading = Loading::start(&self.state);
        let round = self.round.load(Ordering::SeqCst);

        let result = self
            .api
            .submit_guess(&session.credential, guessed_number)
            .await;

        if !self.is_live(&session, round) {
            debug!("Dropping submit result for a previous session or round");
            return;
        }

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                warn!("Guess submission rejected: {}", e);
                self.set_message(e.user_message("Error submitting guess"));
                return;
            }
        };

        info!(
            "{} submitted guess {}",
            session.user.username, guessed_number
        );
        let message = response
            .message
            .unwrap_or_else(|| "Guess submitted!".to_string());
        let viewer = session.user.id.clone();
        self.state.update(|state| {
            state.status = SubmissionStatus::Submitted;
            state.viewer = Some(viewer);
            state.message = message;
        });

        let refreshed = self.load_guesses(&session).await;
        if !self.is_live(&session, round) {
            return;
        }
        let fallback = match refreshed {
            Fetched::Failed(e) => {
                warn!("Could not refresh guesses after submitting: {}", e);
                response.guess
            }
            Fetched::Applied | Fetched::Stale => None,
        };
        self.state.update(|state| {
            if let Some(guess) = fallback {
                if !has_guess_from(&state.guesses, &guess.user) {
                    state.guesses.push(guess);
                }
            }
            state.status = SubmissionStatus::Submitted;
        });
    }

    /// Admin: opens a new round with `input` as the secret balance.
    pub async fn create_game(&self, input: &str) {
        self.follow_session();
        let correct_balance = match parse_whole_number(input) {
            Ok(number) => number,
            Err(e) => {
                self.set_message(ApiError::from(e).user_message("Error creating game"));
                return;
            }
        };
        let Some(session) = self.require_session() else {
            return;
        };
        let _loading = Loading::start(&self.state);

        let result = self
            .api
            .create_game(&session.credential, correct_balance)
            .await;
        if !self.session.is_current(session.generation) {
            return;
        }

        match result {
            Ok(response) => {
                info!("{} opened a new round", session.user.username);
                let message = response
                    .message
                    .unwrap_or_else(|| format!("Correct balance set: {}", correct_balance));
                self.invalidate_round(response.game, message, Some(correct_balance));
                self.refetch(&session).await;
            }
            Err(e) => {
                warn!("Create game rejected: {}", e);
                self.set_message(e.user_message("Error creating game"));
            }
        }
    }

    /// Admin: ends the current round.
    pub async fn reset_game(&self) {
        self.follow_session();
        let Some(session) = self.require_session() else {
            return;
        };
        let _loading = Loading::start(&self.state);

        let result = self.api.reset_game(&session.credential).await;
        if !self.session.is_current(session.generation) {
            return;
        }

        match result {
            Ok(response) => {
                info!("{} reset the round", session.user.username);
                let message = response.message.unwrap_or_else(|| "Game reset".to_string());
                self.invalidate_round(response.game, message, None);
                self.refetch(&session).await;
            }
            Err(e) => {
                warn!("Reset game rejected: {}", e);
                self.set_message(e.user_message("Error resetting game"));
            }
        }
    }

    /// Admin: loads the secret balance of the active round.
    pub async fn fetch_current_balance(&self) {
        self.follow_session();
        let Some(session) = self.require_session() else {
            return;
        };
        let _loading = Loading::start(&self.state);
        let round = self.round.load(Ordering::SeqCst);

        let result = self.api.current_balance(&session.credential).await;
        if !self.is_live(&session, round) {
            return;
        }

        match result {
            Ok(balance) => self.state.update(|state| state.correct_balance = Some(balance)),
            Err(e) => self.set_message(e.user_message("Error fetching current balance")),
        }
    }

    /// Drops everything cached for the current round. Fetches and
    /// submissions still in flight will not write their results.
    pub fn clear(&self) {
        self.invalidate_round(None, String::new(), None);
    }

    fn invalidate_round(&self, game: Option<GuessGame>, message: String, balance: Option<i64>) {
        let round = self.round.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.begin();
        self.state.update(|state| {
            state.game = game;
            state.guesses.clear();
            state.status = SubmissionStatus::Unknown;
            state.viewer = None;
            state.correct_balance = balance;
            state.message = message;
        });
        debug!("Invalidated cached round, now round {}", round);
    }

    async fn refetch(&self, session: &Session) {
        if let Fetched::Failed(e) = self.load_guesses(session).await {
            self.set_message(e.user_message("Error fetching guesses"));
        }
    }
}
