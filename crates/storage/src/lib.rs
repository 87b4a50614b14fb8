use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use shared::domain::VoterId;

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredVoter {
    pub voter_id: VoterId,
    pub has_voted: bool,
}

#[derive(Debug, Clone)]
pub struct StoredVoteRecord {
    pub record_id: i64,
    pub vote_hash: String,
    pub cast_at: DateTime<Utc>,
}

/// Result of trying to commit one ballot for one voter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoteCommit {
    Recorded { record_id: i64 },
    VoterNotFound,
    AlreadyVoted,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        // Every connection to `sqlite::memory:` opens its own empty database.
        let max_connections = if is_in_memory(database_url) { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(connect_options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    /// Adds a voter to the roll. Returns `false` when the voter was already
    /// registered; the existing `has_voted` flag is left untouched.
    pub async fn register_voter(&self, voter_id: &VoterId) -> Result<bool> {
        let result = sqlx::query(
            "INSERT INTO voters (voter_id, has_voted) VALUES (?, 0)
             ON CONFLICT(voter_id) DO NOTHING",
        )
        .bind(voter_id.as_str())
        .execute(&self.pool)
        .await
        .with_context(|| format!("failed to register voter '{voter_id}'"))?;
        Ok(result.rows_affected() == 1)
    }

    pub async fn find_voter(&self, voter_id: &VoterId) -> Result<Option<StoredVoter>> {
        let row = sqlx::query("SELECT voter_id, has_voted FROM voters WHERE voter_id = ?")
            .bind(voter_id.as_str())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| StoredVoter {
            voter_id: VoterId(r.get::<String, _>(0)),
            has_voted: r.get::<bool, _>(1),
        }))
    }

    /// Flips the voter's `has_voted` flag and appends the vote record in one
    /// transaction. The flag is claimed with a conditional update, so of two
    /// concurrent commits for the same voter exactly one is `Recorded`.
    ///
    /// Any error leaves both tables untouched.
    pub async fn commit_vote(
        &self,
        voter_id: &VoterId,
        vote_hash: &str,
        cast_at: DateTime<Utc>,
    ) -> Result<VoteCommit> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("failed to open vote transaction")?;

        // No timestamp on the voter row: it would line up with cast_at.
        let claimed = sqlx::query("UPDATE voters SET has_voted = 1 WHERE voter_id = ? AND has_voted = 0")
            .bind(voter_id.as_str())
            .execute(&mut *tx)
            .await
            .context("failed to claim voter")?;

        if claimed.rows_affected() == 0 {
            let exists = sqlx::query("SELECT 1 FROM voters WHERE voter_id = ?")
                .bind(voter_id.as_str())
                .fetch_optional(&mut *tx)
                .await?
                .is_some();
            tx.rollback().await?;
            return Ok(if exists {
                VoteCommit::AlreadyVoted
            } else {
                VoteCommit::VoterNotFound
            });
        }

        let rec = sqlx::query("INSERT INTO vote_records (vote_hash, cast_at) VALUES (?, ?) RETURNING id")
            .bind(vote_hash)
            .bind(cast_at)
            .fetch_one(&mut *tx)
            .await
            .context("failed to append vote record")?;
        let record_id = rec.get::<i64, _>(0);

        tx.commit()
            .await
            .context("failed to commit vote transaction")?;
        Ok(VoteCommit::Recorded { record_id })
    }

    pub async fn count_vote_records(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM vote_records")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn list_vote_records(&self, limit: u32) -> Result<Vec<StoredVoteRecord>> {
        let rows = sqlx::query(
            "SELECT id, vote_hash, cast_at FROM vote_records ORDER BY id ASC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|r| StoredVoteRecord {
                record_id: r.get::<i64, _>(0),
                vote_hash: r.get::<String, _>(1),
                cast_at: r.get::<DateTime<Utc>, _>(2),
            })
            .collect())
    }
}

fn is_in_memory(database_url: &str) -> bool {
    database_url.starts_with("sqlite::memory:") || database_url.contains("mode=memory")
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if is_in_memory(database_url) || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
