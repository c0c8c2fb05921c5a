use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::storage::DurableStorage;
use crate::store::StateCell;
use site_types::User;

/// Storage key holding the bearer credential.
pub const CREDENTIAL_KEY: &str = "token";
/// Storage key holding the JSON-encoded user snapshot.
pub const USER_KEY: &str = "user";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub credential: String,
    pub user: User,
    /// Bumped on every login and logout; results of requests issued under an
    /// older generation must not be applied.
    pub generation: u64,
}

/// Process-wide holder of the signed-in user and credential.
pub struct SessionState {
    storage: Arc<dyn DurableStorage>,
    state: StateCell<Option<Session>>,
}

impl SessionState {
    pub fn new(storage: Arc<dyn DurableStorage>) -> Self {
        Self {
            storage,
            state: StateCell::new(None),
        }
    }

    /// Creates the session state and loads any session left in storage.
    pub async fn restore(storage: Arc<dyn DurableStorage>) -> Self {
        let session = Self::new(storage);
        session.load().await;
        session
    }

    async fn load(&self) {
        let credential = match self.storage.get_item(CREDENTIAL_KEY).await {
            Ok(Some(credential)) => credential,
            Ok(None) => {
                debug!("No stored credential, starting signed out");
                return;
            }
            Err(e) => {
                error!("Failed to read stored credential: {}", e);
                return;
            }
        };

        if site_core::is_expired(&credential) {
            info!("Stored credential has expired, clearing it");
            self.purge().await;
            return;
        }

        let user = match self.storage.get_item(USER_KEY).await {
            Ok(Some(json)) => match serde_json::from_str::<User>(&json) {
                Ok(user) => user,
                Err(e) => {
                    warn!("Stored user is unreadable, clearing session: {}", e);
                    self.purge().await;
                    return;
                }
            },
            Ok(None) => {
                warn!("Stored credential has no user, clearing it");
                self.purge().await;
                return;
            }
            Err(e) => {
                error!("Failed to read stored user: {}", e);
                return;
            }
        };

        info!("Restored session for {}", user.username);
        self.set(Some((credential, user)));
    }

    async fn purge(&self) {
        for key in [CREDENTIAL_KEY, USER_KEY] {
            if let Err(e) = self.storage.remove_item(key).await {
                error!("Failed to remove '{}' from storage: {}", key, e);
            }
        }
    }

    fn set(&self, session: Option<(String, User)>) -> u64 {
        let generation = self.state.begin();
        self.state.update(|current| {
            *current = session.map(|(credential, user)| Session {
                credential,
                user,
                generation,
            });
        });
        generation
    }

    /// Binds `credential` and `user` until `logout`. The in-memory session
    /// changes even if persisting it fails.
    pub async fn login(&self, credential: impl Into<String>, user: User) -> anyhow::Result<()> {
        let credential = credential.into();
        let user_json = serde_json::to_string(&user)?;
        info!("Logged in as {} ({:?})", user.username, user.role);
        self.set(Some((credential.clone(), user)));

        self.storage.set_item(CREDENTIAL_KEY, &credential).await?;
        self.storage.set_item(USER_KEY, &user_json).await?;
        Ok(())
    }

    /// Clears the session. Requests already in flight still complete, but the
    /// stores drop their results.
    pub async fn logout(&self) -> anyhow::Result<()> {
        self.set(None);
        info!("Logged out");

        self.storage.remove_item(CREDENTIAL_KEY).await?;
        self.storage.remove_item(USER_KEY).await?;
        Ok(())
    }

    pub fn snapshot(&self) -> Option<Session> {
        self.state.snapshot()
    }

    pub fn user(&self) -> Option<User> {
        self.snapshot().map(|session| session.user)
    }

    pub fn credential(&self) -> Option<String> {
        self.snapshot().map(|session| session.credential)
    }

    /// Presentation only: decides whether admin controls are shown. The
    /// server authorizes every admin request on its own.
    pub fn is_admin(&self) -> bool {
        self.snapshot().is_some_and(|session| session.user.is_admin())
    }

    /// Advances on every login and logout, signed in or not.
    pub fn generation(&self) -> u64 {
        self.state.current()
    }

    /// Whether a session captured at `generation` is still the active one.
    pub fn is_current(&self, generation: u64) -> bool {
        self.state.is_current(generation) && self.snapshot().is_some()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.state.subscribe()
    }
}
