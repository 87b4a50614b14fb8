//! Vote integrity service: station session lifecycle, voter tokens and the
//! single guarded write that casts a vote.

use chrono::Utc;
use shared::{
    domain::{CandidateId, Role, VoterId},
    error::{ApiError, ErrorCode},
    protocol::{
        CastVoteRequest, MessageResponse, OfficerLoginRequest, OfficerLoginResponse,
        SessionStatusResponse, StartSessionResponse, VoterTokenResponse, VOTE_CAST_MESSAGE,
    },
};
use storage::{Storage, VoteCommit};
use thiserror::Error;
use tracing::{error, info, warn};

pub mod station;
pub mod vote_hash;
pub mod voter_token;

pub use station::{StationSession, StationSessionStore};
pub use voter_token::{mint_voter_token, verify_voter_token, VoterClaims, VoterTokenConfig};

#[derive(Debug, Clone)]
pub struct OfficerCredentials {
    pub officer_id: String,
    pub password: String,
}

#[derive(Clone)]
pub struct ApiContext {
    pub storage: Storage,
    pub stations: StationSessionStore,
    pub tokens: VoterTokenConfig,
    pub vote_secret: String,
    pub officer: OfficerCredentials,
}

#[derive(Debug, Error)]
pub enum VoteError {
    #[error("Invalid vote request")]
    InvalidRequest,
    #[error("Session already active")]
    SessionAlreadyActive,
    #[error("No active voting session")]
    NoActiveSession,
    #[error("Invalid session token")]
    InvalidToken,
    #[error("Voter not found")]
    VoterNotFound,
    #[error("Duplicate vote detected")]
    DuplicateVote,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Server error")]
    Internal(#[source] anyhow::Error),
}

impl VoteError {
    pub fn code(&self) -> ErrorCode {
        match self {
            VoteError::InvalidRequest => ErrorCode::InvalidRequest,
            VoteError::SessionAlreadyActive => ErrorCode::Conflict,
            VoteError::NoActiveSession => ErrorCode::NoActiveSession,
            VoteError::InvalidToken => ErrorCode::InvalidToken,
            VoteError::VoterNotFound => ErrorCode::VoterNotFound,
            VoteError::DuplicateVote => ErrorCode::DuplicateVote,
            VoteError::InvalidCredentials => ErrorCode::Unauthorized,
            VoteError::Internal(_) => ErrorCode::Internal,
        }
    }
}

impl From<VoteError> for ApiError {
    fn from(value: VoteError) -> Self {
        // Internal details stay in the logs.
        ApiError::new(value.code(), value.to_string())
    }
}

pub async fn officer_login(
    ctx: &ApiContext,
    req: OfficerLoginRequest,
) -> Result<OfficerLoginResponse, VoteError> {
    if req.officer_id != ctx.officer.officer_id || req.password != ctx.officer.password {
        warn!(officer_id = %req.officer_id, "officer login rejected");
        return Err(VoteError::InvalidCredentials);
    }
    info!(officer_id = %req.officer_id, "officer logged in");
    Ok(OfficerLoginResponse {
        message: "Login successful".to_string(),
        role: Role::PollingOfficer.as_str().to_string(),
    })
}

pub async fn start_station_session(ctx: &ApiContext) -> Result<StartSessionResponse, VoteError> {
    let session = ctx.stations.start().await?;
    Ok(StartSessionResponse {
        message: "Voting session started".to_string(),
        session_id: session.session_id,
    })
}

pub async fn reset_station_session(ctx: &ApiContext) -> MessageResponse {
    ctx.stations.reset().await;
    MessageResponse::new("Session reset successfully")
}

pub async fn station_session_status(ctx: &ApiContext) -> SessionStatusResponse {
    match ctx.stations.active().await {
        Some(session) => SessionStatusResponse {
            active: true,
            session_id: Some(session.session_id),
            started_at: Some(session.started_at),
        },
        None => SessionStatusResponse {
            active: false,
            session_id: None,
            started_at: None,
        },
    }
}

pub async fn issue_voter_token(ctx: &ApiContext) -> Result<VoterTokenResponse, VoteError> {
    let session = ctx
        .stations
        .active()
        .await
        .ok_or(VoteError::NoActiveSession)?;
    let token = mint_voter_token(&ctx.tokens, &session.session_id).map_err(|err| {
        error!(error = %err, "voter token mint failed");
        VoteError::Internal(err)
    })?;
    Ok(VoterTokenResponse { token })
}

/// Casts one vote. Checks run in order: request shape, active station
/// session, voter existence, token, then the atomic duplicate guard that
/// also appends the record.
pub async fn cast_vote(ctx: &ApiContext, req: CastVoteRequest) -> Result<MessageResponse, VoteError> {
    let (voter_id, candidate_id, session_token) = validate_cast_request(req)?;

    let session = ctx
        .stations
        .active()
        .await
        .ok_or(VoteError::NoActiveSession)?;

    ctx.storage
        .find_voter(&voter_id)
        .await
        .map_err(internal)?
        .ok_or(VoteError::VoterNotFound)?;

    verify_voter_token(&ctx.tokens, &session_token, &session.session_id)?;

    let cast_at = Utc::now();
    let vote_hash = vote_hash::vote_hash(
        ctx.vote_secret.as_bytes(),
        &candidate_id,
        &session.session_id,
        cast_at,
    )
    .map_err(internal)?;

    match ctx
        .storage
        .commit_vote(&voter_id, &vote_hash, cast_at)
        .await
        .map_err(internal)?
    {
        VoteCommit::Recorded { record_id } => {
            info!(record_id, session_id = %session.session_id, "vote recorded");
            Ok(MessageResponse::new(VOTE_CAST_MESSAGE))
        }
        VoteCommit::AlreadyVoted => {
            warn!(session_id = %session.session_id, "duplicate vote rejected");
            Err(VoteError::DuplicateVote)
        }
        VoteCommit::VoterNotFound => Err(VoteError::VoterNotFound),
    }
}

fn validate_cast_request(
    req: CastVoteRequest,
) -> Result<(VoterId, CandidateId, String), VoteError> {
    let voter_id = req
        .voter_id
        .filter(|id| !id.as_str().trim().is_empty())
        .ok_or(VoteError::InvalidRequest)?;
    let candidate_id = req
        .candidate_id
        .filter(|id| !id.as_str().trim().is_empty())
        .ok_or(VoteError::InvalidRequest)?;
    let session_token = req
        .session_token
        .filter(|token| !token.trim().is_empty())
        .ok_or(VoteError::InvalidRequest)?;
    Ok((voter_id, candidate_id, session_token))
}

fn internal(err: anyhow::Error) -> VoteError {
    error!(error = %err, "vote integrity storage failure");
    VoteError::Internal(err)
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
