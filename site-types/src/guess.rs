use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::UserId;

/// One player's submission within a round.
///
/// The server may send `user` either as a bare id or as a populated user
/// document; both normalize to the id, and a populated `kickUsername` fills
/// in a missing `username`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", from = "RawGuess")]
#[ts(export)]
pub struct Guess {
    pub user: UserId,
    pub username: String,
    #[ts(type = "number")]
    pub guessed_number: i64,
    pub created_at: String, // ISO 8601 string
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawGuess {
    user: GuessAuthor,
    #[serde(default)]
    username: Option<String>,
    guessed_number: i64,
    #[serde(default)]
    created_at: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum GuessAuthor {
    Id(String),
    Populated {
        #[serde(rename = "_id", alias = "id")]
        id: String,
        #[serde(rename = "kickUsername", default)]
        kick_username: Option<String>,
    },
}

impl From<RawGuess> for Guess {
    fn from(raw: RawGuess) -> Self {
        let (user, kick_username) = match raw.user {
            GuessAuthor::Id(id) => (id, None),
            GuessAuthor::Populated { id, kick_username } => (id, kick_username),
        };

        Guess {
            username: raw.username.or(kick_username).unwrap_or_default(),
            user,
            guessed_number: raw.guessed_number,
            created_at: raw.created_at.unwrap_or_default(),
        }
    }
}

/// One round of the guess-the-balance game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct GuessGame {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    /// Only present in responses to admin requests.
    #[serde(default)]
    #[ts(type = "number | null")]
    pub correct_balance: Option<i64>,
    pub is_active: bool,
    #[serde(default)]
    pub guesses: Vec<Guess>,
    #[serde(default)]
    pub winner: Option<Guess>,
    #[serde(default)]
    pub created_at: String,
}

/// Per-user position in the submission protocol for the current round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum SubmissionStatus {
    /// Guesses have not been fetched for this user and round.
    #[default]
    Unknown,
    Open,
    Submitted,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SubmitGuessRequest {
    #[ts(type = "number")]
    pub guessed_number: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreateGameRequest {
    #[ts(type = "number")]
    pub correct_balance: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CurrentBalanceResponse {
    #[ts(type = "number")]
    pub correct_balance: i64,
}

/// Body of create/reset responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub game: Option<GuessGame>,
}

/// Body of a successful submit: a message alongside the stored guess fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmitGuessResponse {
    pub message: Option<String>,
    pub guess: Option<Guess>,
}
