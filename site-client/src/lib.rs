pub mod api;
pub mod config;
pub mod guess_store;
pub mod leaderboard;
pub mod live_status;
pub mod session;
pub mod storage;
mod store;

pub use api::{ApiError, HttpApi, SiteApi};
pub use config::{Config, ConfigError};
pub use guess_store::{GuessState, GuessStore};
pub use leaderboard::{LeaderboardState, LeaderboardStore};
pub use live_status::{LiveStatusPoller, PollerHandle};
pub use session::{Session, SessionState};
pub use storage::{DurableStorage, MemoryStorage};
