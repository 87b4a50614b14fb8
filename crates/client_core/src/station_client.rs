use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use shared::{
    domain::{CandidateId, VoterId},
    error::{ApiError, ApiException},
    protocol::{
        CastVoteRequest, MessageResponse, SessionStatusResponse, StartSessionResponse,
        VoterTokenResponse,
    },
};
use thiserror::Error;
use tracing::{info, warn};
use url::Url;

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("vote rejected: {0}")]
    Rejected(#[from] ApiException),
    #[error("unexpected server response: {0}")]
    UnexpectedStatus(StatusCode),
    #[error("failed to reach vote server: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Destination for a confirmed selection.
#[async_trait]
pub trait VoteSink: Send + Sync {
    async fn submit(&self, candidate_id: &CandidateId) -> Result<(), SubmitError>;
}

/// HTTP client for the station's vote integrity service.
#[derive(Debug, Clone)]
pub struct StationClient {
    http: Client,
    server_url: String,
    voter_id: Option<VoterId>,
}

impl StationClient {
    pub fn new(server_url: &str) -> Result<Self> {
        let parsed = Url::parse(server_url).with_context(|| format!("invalid server url '{server_url}'"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(anyhow!("unsupported server url scheme '{}'", parsed.scheme()));
        }
        Ok(Self {
            http: Client::new(),
            server_url: server_url.trim_end_matches('/').to_string(),
            voter_id: None,
        })
    }

    /// Voter whose ballot this client submits.
    pub fn with_voter(mut self, voter_id: VoterId) -> Self {
        self.voter_id = Some(voter_id);
        self
    }

    pub async fn start_session(&self) -> Result<StartSessionResponse> {
        let response = self
            .http
            .post(format!("{}/session/start", self.server_url))
            .send()
            .await?;
        Ok(parse_json(response).await?)
    }

    pub async fn reset_session(&self) -> Result<MessageResponse> {
        let response = self
            .http
            .post(format!("{}/session/reset", self.server_url))
            .send()
            .await?;
        Ok(parse_json(response).await?)
    }

    pub async fn session_status(&self) -> Result<SessionStatusResponse> {
        let response = self
            .http
            .get(format!("{}/session/status", self.server_url))
            .send()
            .await?;
        Ok(parse_json(response).await?)
    }

    pub async fn voter_token(&self) -> Result<String, SubmitError> {
        let response = self
            .http
            .get(format!("{}/session/token", self.server_url))
            .send()
            .await?;
        let token: VoterTokenResponse = parse_json(response).await?;
        Ok(token.token)
    }
}

#[async_trait]
impl VoteSink for StationClient {
    async fn submit(&self, candidate_id: &CandidateId) -> Result<(), SubmitError> {
        let session_token = self.voter_token().await?;
        let request = CastVoteRequest {
            voter_id: self.voter_id.clone(),
            candidate_id: Some(candidate_id.clone()),
            session_token: Some(session_token),
        };
        let response = self
            .http
            .post(format!("{}/vote/cast", self.server_url))
            .json(&request)
            .send()
            .await?;
        let ack: MessageResponse = parse_json(response).await?;
        info!(message = %ack.message, "vote acknowledged by server");
        Ok(())
    }
}

async fn parse_json<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, SubmitError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }
    match response.json::<ApiError>().await {
        Ok(err) => {
            warn!(%status, code = ?err.code, "server rejected request");
            Err(SubmitError::Rejected(err.into()))
        }
        Err(_) => Err(SubmitError::UnexpectedStatus(status)),
    }
}

#[cfg(test)]
#[path = "tests/station_client_tests.rs"]
mod tests;
