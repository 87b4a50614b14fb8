use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use shared::domain::SessionId;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use crate::VoteError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationSession {
    pub session_id: SessionId,
    pub started_at: DateTime<Utc>,
}

/// Owns the single active station session of this process.
///
/// Cloning shares the same slot; start and reset are serialized by the
/// inner mutex.
#[derive(Clone)]
pub struct StationSessionStore {
    active: Arc<Mutex<Option<StationSession>>>,
    ttl: Option<Duration>,
}

impl StationSessionStore {
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            active: Arc::new(Mutex::new(None)),
            ttl,
        }
    }

    pub async fn start(&self) -> Result<StationSession, VoteError> {
        self.start_at(Utc::now()).await
    }

    pub async fn active(&self) -> Option<StationSession> {
        self.active_at(Utc::now()).await
    }

    /// Clears the active session, if any. Returns the session that was
    /// cleared.
    pub async fn reset(&self) -> Option<StationSession> {
        let cleared = self.active.lock().await.take();
        if let Some(session) = &cleared {
            info!(session_id = %session.session_id, "station session reset");
        }
        cleared
    }

    pub(crate) async fn start_at(&self, now: DateTime<Utc>) -> Result<StationSession, VoteError> {
        let mut slot = self.active.lock().await;
        self.expire_locked(&mut slot, now);
        if slot.is_some() {
            return Err(VoteError::SessionAlreadyActive);
        }

        let session = StationSession {
            session_id: SessionId(Uuid::new_v4().to_string()),
            started_at: now,
        };
        info!(session_id = %session.session_id, "station session started");
        *slot = Some(session.clone());
        Ok(session)
    }

    pub(crate) async fn active_at(&self, now: DateTime<Utc>) -> Option<StationSession> {
        let mut slot = self.active.lock().await;
        self.expire_locked(&mut slot, now);
        slot.clone()
    }

    fn expire_locked(&self, slot: &mut Option<StationSession>, now: DateTime<Utc>) {
        let (Some(ttl), Some(session)) = (self.ttl, slot.as_ref()) else {
            return;
        };
        if now - session.started_at >= ttl {
            info!(session_id = %session.session_id, "station session expired");
            *slot = None;
        }
    }
}

#[cfg(test)]
#[path = "tests/station_tests.rs"]
mod tests;
