use site_types::{Guess, LeaderboardPlayer};

/// Creates a guess for the given user id
pub fn create_test_guess(user: &str, number: i64) -> Guess {
    Guess {
        user: user.to_string(),
        username: format!("{}-name", user),
        guessed_number: number,
        created_at: "2025-03-01T10:00:00Z".to_string(),
    }
}

/// Creates a leaderboard entry
pub fn create_test_player(username: &str, wager: f64) -> LeaderboardPlayer {
    LeaderboardPlayer {
        username: username.to_string(),
        wager,
    }
}
