use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::Config;
use site_core::InputError;
use site_types::{
    ChannelResponse, CreateGameRequest, CurrentBalanceResponse, ErrorBody, Guess,
    LeaderboardPeriod, LeaderboardPlayer, MessageResponse, SubmitGuessRequest,
    SubmitGuessResponse,
};

#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// Rejected before any request was sent.
    #[error("{0}")]
    Validation(String),
    #[error("You must be logged in")]
    NotLoggedIn,
    #[error("{message}")]
    Unauthorized { message: String },
    #[error("{message}")]
    Forbidden { message: String },
    #[error("{message}")]
    Conflict { message: String },
    #[error("{message}")]
    Rejected { status: u16, message: String },
    #[error("Request timed out, please try again")]
    Timeout,
    #[error("network error: {0}")]
    Transport(String),
    #[error("invalid response: {0}")]
    Decode(String),
}

impl ApiError {
    fn from_status(status: StatusCode, message: String) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized { message },
            StatusCode::FORBIDDEN => ApiError::Forbidden { message },
            StatusCode::CONFLICT => ApiError::Conflict { message },
            _ => ApiError::Rejected {
                status: status.as_u16(),
                message,
            },
        }
    }

    fn from_transport(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            ApiError::Timeout
        } else if error.is_decode() {
            ApiError::Decode(error.to_string())
        } else {
            ApiError::Transport(error.to_string())
        }
    }

    /// Timeouts, transport failures and 5xx answers may succeed on a retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Timeout | ApiError::Transport(_) => true,
            ApiError::Rejected { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Text for the store's status line. Server and validation messages pass
    /// through verbatim; transport and decode failures collapse to `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Transport(_) | ApiError::Decode(_) => fallback.to_string(),
            other => other.to_string(),
        }
    }
}

impl From<InputError> for ApiError {
    fn from(error: InputError) -> Self {
        ApiError::Validation(error.to_string())
    }
}

/// Operations the stores need from the outside world.
#[async_trait]
pub trait SiteApi: Send + Sync {
    async fn list_guesses(&self, credential: &str) -> Result<Vec<Guess>, ApiError>;

    async fn submit_guess(
        &self,
        credential: &str,
        guessed_number: i64,
    ) -> Result<SubmitGuessResponse, ApiError>;

    async fn create_game(
        &self,
        credential: &str,
        correct_balance: i64,
    ) -> Result<MessageResponse, ApiError>;

    async fn reset_game(&self, credential: &str) -> Result<MessageResponse, ApiError>;

    async fn current_balance(&self, credential: &str) -> Result<i64, ApiError>;

    async fn leaderboard(
        &self,
        period: LeaderboardPeriod,
    ) -> Result<Vec<LeaderboardPlayer>, ApiError>;

    async fn channel_status(&self, channel: &str) -> Result<ChannelResponse, ApiError>;
}

/// `SiteApi` over HTTP JSON.
pub struct HttpApi {
    client: Client,
    api_url: String,
    leaderboard_url: String,
    kick_api_url: String,
}

impl HttpApi {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(ApiError::from_transport)?;

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            leaderboard_url: config.leaderboard_url.clone(),
            kick_api_url: config.kick_api_url.trim_end_matches('/').to_string(),
        })
    }

    fn guess_url(&self, path: &str) -> String {
        format!("{}/guess/{}", self.api_url, path)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        fallback: &str,
    ) -> Result<T, ApiError> {
        let response = self.read(request, fallback).await?;
        serde_json::from_slice(&response).map_err(|e| {
            tracing::error!("Failed to parse response body: {:?}", e);
            ApiError::Decode(e.to_string())
        })
    }

    /// Sends `request` and returns the success body. Non-success statuses
    /// become errors carrying the server's `message`, or `fallback`.
    async fn read(&self, request: RequestBuilder, fallback: &str) -> Result<Vec<u8>, ApiError> {
        let response = request.send().await.map_err(|e| {
            tracing::error!("Request failed: {:?}", e);
            ApiError::from_transport(e)
        })?;

        let status = response.status();
        let body = response.bytes().await.map_err(ApiError::from_transport)?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&body)
                .ok()
                .and_then(ErrorBody::into_message)
                .unwrap_or_else(|| fallback.to_string());
            tracing::warn!("Server rejected request with {}: {}", status, message);
            return Err(ApiError::from_status(status, message));
        }

        Ok(body.to_vec())
    }
}

/// Reads `{ message, game? }` leniently: a game document we cannot parse is
/// dropped instead of failing a request the server already accepted.
fn message_response(body: serde_json::Value) -> MessageResponse {
    let message = body
        .get("message")
        .and_then(|m| m.as_str())
        .map(str::to_string);
    let game = body
        .get("game")
        .cloned()
        .and_then(|game| serde_json::from_value(game).ok());
    MessageResponse { message, game }
}

#[async_trait]
impl SiteApi for HttpApi {
    async fn list_guesses(&self, credential: &str) -> Result<Vec<Guess>, ApiError> {
        let request = self
            .client
            .get(self.guess_url("guesses"))
            .bearer_auth(credential);
        self.send(request, "Error fetching guesses").await
    }

    async fn submit_guess(
        &self,
        credential: &str,
        guessed_number: i64,
    ) -> Result<SubmitGuessResponse, ApiError> {
        let request = self
            .client
            .post(self.guess_url("submit"))
            .bearer_auth(credential)
            .json(&SubmitGuessRequest { guessed_number });
        let body: serde_json::Value = self.send(request, "Error submitting guess").await?;

        let message = body
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string);
        let guess = serde_json::from_value::<Guess>(body).ok();
        Ok(SubmitGuessResponse { message, guess })
    }

    async fn create_game(
        &self,
        credential: &str,
        correct_balance: i64,
    ) -> Result<MessageResponse, ApiError> {
        let request = self
            .client
            .post(self.guess_url("create"))
            .bearer_auth(credential)
            .json(&CreateGameRequest { correct_balance });
        let body = self.send(request, "Error creating game").await?;
        Ok(message_response(body))
    }

    async fn reset_game(&self, credential: &str) -> Result<MessageResponse, ApiError> {
        let request = self
            .client
            .post(self.guess_url("reset"))
            .bearer_auth(credential);
        let body = self.send(request, "Error resetting game").await?;
        Ok(message_response(body))
    }

    async fn current_balance(&self, credential: &str) -> Result<i64, ApiError> {
        let request = self
            .client
            .get(self.guess_url("balance/current"))
            .bearer_auth(credential);
        let response: CurrentBalanceResponse = self
            .send(request, "Error fetching current balance")
            .await?;
        Ok(response.correct_balance)
    }

    async fn leaderboard(
        &self,
        period: LeaderboardPeriod,
    ) -> Result<Vec<LeaderboardPlayer>, ApiError> {
        let request = self
            .client
            .get(&self.leaderboard_url)
            .query(&[("period", period.as_str())]);
        self.send(request, "Failed to fetch leaderboard").await
    }

    async fn channel_status(&self, channel: &str) -> Result<ChannelResponse, ApiError> {
        let url = format!("{}/channels/{}", self.kick_api_url, channel);
        self.send(self.client.get(url), "Error fetching live status")
            .await
    }
}
