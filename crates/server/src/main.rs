use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use server_api::{
    cast_vote, issue_voter_token, officer_login, reset_station_session, start_station_session,
    station_session_status, ApiContext, OfficerCredentials, StationSessionStore, VoteError,
    VoterTokenConfig,
};
use shared::{
    error::{ApiError, ErrorCode},
    protocol::{
        CastVoteRequest, MessageResponse, OfficerLoginRequest, OfficerLoginResponse,
        SessionStatusResponse, StartSessionResponse, VoterTokenResponse,
    },
};
use storage::Storage;
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

mod app_state;
mod config;

use app_state::AppState;
use config::load_settings;

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = load_settings()?;
    let database_url = settings.database_url.clone();
    let storage = Storage::new(&database_url).await.map_err(|error| {
        error!(
            %database_url,
            %error,
            "failed to open SQLite database; verify parent directory exists and permissions are correct"
        );
        error
    })?;
    let api = ApiContext {
        storage,
        stations: StationSessionStore::new(
            settings
                .station_session_ttl_seconds
                .and_then(chrono::Duration::try_seconds),
        ),
        tokens: VoterTokenConfig {
            secret: settings.jwt_secret,
            ttl_seconds: settings.voter_token_ttl_seconds,
        },
        vote_secret: settings.vote_secret,
        officer: OfficerCredentials {
            officer_id: settings.officer_id,
            password: settings.officer_password,
        },
    };

    let state = AppState {
        api,
        max_request_bytes: settings.max_request_bytes,
    };
    let app = build_router(Arc::new(state));

    let addr: SocketAddr = settings.bind_addr.parse()?;
    info!(%addr, "voting server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    let body_limit = state.max_request_bytes;
    Router::new()
        .route("/healthz", get(healthz))
        .route("/officer/login", post(http_officer_login))
        .route("/session/start", post(http_start_session))
        .route("/session/reset", post(http_reset_session))
        .route("/session/status", get(http_session_status))
        .route("/session/token", get(http_voter_token))
        .route("/vote/cast", post(http_cast_vote))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .with_state(state)
}

fn status_for(err: &VoteError) -> StatusCode {
    match err {
        VoteError::InvalidRequest | VoteError::SessionAlreadyActive => StatusCode::BAD_REQUEST,
        VoteError::InvalidToken | VoteError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        VoteError::NoActiveSession | VoteError::DuplicateVote => StatusCode::FORBIDDEN,
        VoteError::VoterNotFound => StatusCode::NOT_FOUND,
        VoteError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn reject(err: VoteError) -> (StatusCode, Json<ApiError>) {
    (status_for(&err), Json(ApiError::from(err)))
}

fn malformed_body(rejection: JsonRejection) -> (StatusCode, Json<ApiError>) {
    debug!(%rejection, "malformed request body");
    let status = match rejection.status() {
        StatusCode::PAYLOAD_TOO_LARGE => StatusCode::PAYLOAD_TOO_LARGE,
        _ => StatusCode::BAD_REQUEST,
    };
    (status, Json(ApiError::from(VoteError::InvalidRequest)))
}

async fn healthz(State(state): State<Arc<AppState>>) -> Result<&'static str, (StatusCode, Json<ApiError>)> {
    state.api.storage.health_check().await.map_err(|e| {
        error!(error = %e, "health check failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiError::new(ErrorCode::Internal, "Server error")),
        )
    })?;
    Ok("ok")
}

async fn http_officer_login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<OfficerLoginRequest>, JsonRejection>,
) -> ApiResult<OfficerLoginResponse> {
    let Json(req) = payload.map_err(malformed_body)?;
    officer_login(&state.api, req).await.map(Json).map_err(reject)
}

async fn http_start_session(State(state): State<Arc<AppState>>) -> ApiResult<StartSessionResponse> {
    start_station_session(&state.api)
        .await
        .map(Json)
        .map_err(reject)
}

async fn http_reset_session(State(state): State<Arc<AppState>>) -> Json<MessageResponse> {
    Json(reset_station_session(&state.api).await)
}

async fn http_session_status(State(state): State<Arc<AppState>>) -> Json<SessionStatusResponse> {
    Json(station_session_status(&state.api).await)
}

async fn http_voter_token(State(state): State<Arc<AppState>>) -> ApiResult<VoterTokenResponse> {
    issue_voter_token(&state.api).await.map(Json).map_err(reject)
}

async fn http_cast_vote(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CastVoteRequest>, JsonRejection>,
) -> ApiResult<MessageResponse> {
    let Json(req) = payload.map_err(malformed_body)?;
    cast_vote(&state.api, req).await.map(Json).map_err(reject)
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
