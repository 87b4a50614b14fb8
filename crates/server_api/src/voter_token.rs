use anyhow::{anyhow, Context};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use shared::domain::{Role, SessionId};
use tracing::debug;

use crate::VoteError;

#[derive(Debug, Clone)]
pub struct VoterTokenConfig {
    pub secret: String,
    pub ttl_seconds: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoterClaims {
    pub role: String,
    /// Station session the token was issued under.
    pub sid: String,
    pub iat: i64,
    pub exp: i64,
}

pub fn mint_voter_token(cfg: &VoterTokenConfig, session_id: &SessionId) -> anyhow::Result<String> {
    let now = Utc::now();
    let exp = Duration::try_seconds(cfg.ttl_seconds)
        .and_then(|ttl| now.checked_add_signed(ttl))
        .ok_or_else(|| anyhow!("voter token ttl of {}s is out of range", cfg.ttl_seconds))?;
    let claims = VoterClaims {
        role: Role::Voter.as_str().to_string(),
        sid: session_id.to_string(),
        iat: now.timestamp(),
        exp: exp.timestamp(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(cfg.secret.as_bytes()),
    )
    .context("failed to sign voter token")
}

/// Checks signature, expiry, role and that the token belongs to
/// `active_session`.
pub fn verify_voter_token(
    cfg: &VoterTokenConfig,
    token: &str,
    active_session: &SessionId,
) -> Result<VoterClaims, VoteError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    let decoded = decode::<VoterClaims>(
        token,
        &DecodingKey::from_secret(cfg.secret.as_bytes()),
        &validation,
    )
    .map_err(|error| {
        debug!(%error, "voter token rejected");
        VoteError::InvalidToken
    })?;

    let claims = decoded.claims;
    if claims.role != Role::Voter.as_str() {
        debug!(role = %claims.role, "voter token has wrong role");
        return Err(VoteError::InvalidToken);
    }
    if claims.sid != active_session.as_str() {
        debug!("voter token issued under a different station session");
        return Err(VoteError::InvalidToken);
    }
    Ok(claims)
}

#[cfg(test)]
#[path = "tests/voter_token_tests.rs"]
mod tests;
