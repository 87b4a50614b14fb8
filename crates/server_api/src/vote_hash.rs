use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use shared::domain::{CandidateId, SessionId};

type HmacSha256 = Hmac<Sha256>;

const FIELD_SEPARATOR: &[u8] = b"\x1f";

/// Pseudonymous digest of one cast ballot:
/// `HMAC-SHA256(secret, candidate || session || cast_at_millis)`, hex encoded.
///
/// The voter is not an input, so the digest cannot be tied back to one.
pub fn vote_hash(
    secret: &[u8],
    candidate_id: &CandidateId,
    session_id: &SessionId,
    cast_at: DateTime<Utc>,
) -> Result<String> {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(secret)
        .map_err(|e| anyhow!("invalid vote secret: {e}"))?;
    mac.update(candidate_id.as_str().as_bytes());
    mac.update(FIELD_SEPARATOR);
    mac.update(session_id.as_str().as_bytes());
    mac.update(FIELD_SEPARATOR);
    mac.update(cast_at.timestamp_millis().to_string().as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}
