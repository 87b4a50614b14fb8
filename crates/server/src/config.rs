use std::{collections::HashMap, path::Path};

use anyhow::Context;
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use tracing::warn;

pub const DEV_JWT_SECRET: &str = "dev-jwt-secret";
pub const DEV_VOTE_SECRET: &str = "dev-vote-secret";
/// Upper bound for both token and station session lifetimes: one week.
pub const MAX_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub bind_addr: String,
    pub database_url: String,
    pub jwt_secret: String,
    pub vote_secret: String,
    pub voter_token_ttl_seconds: i64,
    pub station_session_ttl_seconds: Option<i64>,
    pub officer_id: String,
    pub officer_password: String,
    pub max_request_bytes: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:5000".into(),
            database_url: "sqlite://./data/voting.db".into(),
            jwt_secret: DEV_JWT_SECRET.into(),
            vote_secret: DEV_VOTE_SECRET.into(),
            voter_token_ttl_seconds: 600,
            station_session_ttl_seconds: None,
            officer_id: "officer123".into(),
            officer_password: "admin123".into(),
            max_request_bytes: 16 * 1024,
        }
    }
}

impl Settings {
    pub fn uses_dev_secrets(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET || self.vote_secret == DEV_VOTE_SECRET
    }
}

pub fn load_settings() -> anyhow::Result<Settings> {
    let env: HashMap<String, String> = std::env::vars().collect();
    let settings = load_settings_from(Path::new("server.toml"), &env)?;
    if settings.uses_dev_secrets() {
        warn!("JWT_SECRET or VOTE_SECRET not set; using development secrets");
    }
    Ok(settings)
}

/// Layers defaults, the optional TOML file, `APP__*` variables and finally
/// the plain legacy variable names.
pub(crate) fn load_settings_from(
    file: &Path,
    env: &HashMap<String, String>,
) -> anyhow::Result<Settings> {
    let mut settings: Settings = Config::builder()
        .add_source(File::from(file).format(FileFormat::Toml).required(false))
        .add_source(
            Environment::with_prefix("APP")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .source(Some(env.clone().into_iter().collect())),
        )
        .build()
        .with_context(|| format!("failed to read settings from '{}'", file.display()))?
        .try_deserialize()
        .context("invalid server settings")?;

    if let Some(v) = env.get("SERVER_BIND") {
        settings.bind_addr = v.clone();
    }
    if let Some(v) = env.get("DATABASE_URL") {
        settings.database_url = v.clone();
    }
    if let Some(v) = env.get("JWT_SECRET") {
        settings.jwt_secret = v.clone();
    }
    if let Some(v) = env.get("VOTE_SECRET") {
        settings.vote_secret = v.clone();
    }

    settings.database_url = normalize_database_url(&settings.database_url);
    validate_ttl("voter_token_ttl_seconds", settings.voter_token_ttl_seconds)?;
    if let Some(ttl) = settings.station_session_ttl_seconds {
        validate_ttl("station_session_ttl_seconds", ttl)?;
    }
    Ok(settings)
}

fn validate_ttl(name: &str, seconds: i64) -> anyhow::Result<()> {
    if !(1..=MAX_TTL_SECONDS).contains(&seconds) {
        anyhow::bail!("{name} must be between 1 and {MAX_TTL_SECONDS} seconds, got {seconds}");
    }
    Ok(())
}

pub(crate) fn normalize_database_url(raw_database_url: &str) -> String {
    let raw_database_url = raw_database_url.trim();

    if raw_database_url.is_empty() {
        return Settings::default().database_url;
    }

    if raw_database_url.starts_with("sqlite::memory:") || raw_database_url.contains("://") {
        return raw_database_url.to_string();
    }

    if let Some(path) = raw_database_url.strip_prefix("sqlite:") {
        return format!("sqlite://{}", path.replace('\\', "/"));
    }

    format!("sqlite://{}", raw_database_url.replace('\\', "/"))
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
