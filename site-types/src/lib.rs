pub mod errors;
pub mod guess;
pub mod leaderboard;
pub mod live;
pub mod user;

// Re-export all types
pub use errors::*;
pub use guess::*;
pub use leaderboard::*;
pub use live::*;
pub use user::*;
