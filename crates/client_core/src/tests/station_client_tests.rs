use super::*;
use axum::{
    extract::State,
    http::StatusCode as HttpStatus,
    routing::{get, post},
    Json, Router,
};
use server_api::{
    cast_vote, issue_voter_token, reset_station_session, start_station_session,
    station_session_status, ApiContext, OfficerCredentials, StationSessionStore, VoteError,
    VoterTokenConfig,
};
use shared::error::ErrorCode;
use storage::Storage;
use tokio::net::TcpListener;

type Rejection = (HttpStatus, Json<ApiError>);

fn reject(err: VoteError) -> Rejection {
    let status = match err {
        VoteError::InvalidRequest | VoteError::SessionAlreadyActive => HttpStatus::BAD_REQUEST,
        VoteError::InvalidToken | VoteError::InvalidCredentials => HttpStatus::UNAUTHORIZED,
        VoteError::NoActiveSession | VoteError::DuplicateVote => HttpStatus::FORBIDDEN,
        VoteError::VoterNotFound => HttpStatus::NOT_FOUND,
        VoteError::Internal(_) => HttpStatus::INTERNAL_SERVER_ERROR,
    };
    (status, Json(ApiError::from(err)))
}

async fn spawn_station() -> Result<(String, ApiContext)> {
    let storage = Storage::new("sqlite::memory:").await?;
    storage.register_voter(&VoterId::new("V1")).await?;
    let ctx = ApiContext {
        storage,
        stations: StationSessionStore::new(None),
        tokens: VoterTokenConfig {
            secret: "jwt".into(),
            ttl_seconds: 600,
        },
        vote_secret: "vote".into(),
        officer: OfficerCredentials {
            officer_id: "officer".into(),
            password: "pw".into(),
        },
    };

    let app = Router::new()
        .route(
            "/session/start",
            post(|State(ctx): State<ApiContext>| async move {
                start_station_session(&ctx).await.map(Json).map_err(reject)
            }),
        )
        .route(
            "/session/reset",
            post(|State(ctx): State<ApiContext>| async move {
                Json(reset_station_session(&ctx).await)
            }),
        )
        .route(
            "/session/status",
            get(|State(ctx): State<ApiContext>| async move {
                Json(station_session_status(&ctx).await)
            }),
        )
        .route(
            "/session/token",
            get(|State(ctx): State<ApiContext>| async move {
                issue_voter_token(&ctx).await.map(Json).map_err(reject)
            }),
        )
        .route(
            "/vote/cast",
            post(
                |State(ctx): State<ApiContext>, Json(req): Json<CastVoteRequest>| async move {
                    cast_vote(&ctx, req).await.map(Json).map_err(reject)
                },
            ),
        )
        .with_state(ctx.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}/"), ctx))
}

#[test]
fn rejects_non_http_urls() {
    assert!(StationClient::new("not a url").is_err());
    assert!(StationClient::new("ftp://station.local").is_err());
    assert!(StationClient::new("http://127.0.0.1:5000/").is_ok());
}

#[tokio::test]
async fn session_lifecycle_over_http() -> Result<()> {
    let (url, _ctx) = spawn_station().await?;
    let client = StationClient::new(&url)?;

    assert!(!client.session_status().await?.active);
    let started = client.start_session().await?;
    let status = client.session_status().await?;
    assert!(status.active);
    assert_eq!(status.session_id, Some(started.session_id));

    let err = client.start_session().await.expect_err("second start");
    let err = err.downcast::<SubmitError>().expect("submit error");
    assert!(matches!(
        err,
        SubmitError::Rejected(ApiException {
            code: ErrorCode::Conflict,
            ..
        })
    ));

    client.reset_session().await?;
    assert!(!client.session_status().await?.active);
    Ok(())
}

#[tokio::test]
async fn submit_casts_exactly_one_vote() -> Result<()> {
    let (url, ctx) = spawn_station().await?;
    let client = StationClient::new(&url)?.with_voter(VoterId::new("V1"));
    client.start_session().await?;

    client.submit(&CandidateId::new("C2")).await?;
    assert_eq!(ctx.storage.count_vote_records().await?, 1);

    let err = client
        .submit(&CandidateId::new("C3"))
        .await
        .expect_err("duplicate");
    match err {
        SubmitError::Rejected(ApiException { code, message }) => {
            assert_eq!(code, ErrorCode::DuplicateVote);
            assert_eq!(message, "Duplicate vote detected");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(ctx.storage.count_vote_records().await?, 1);
    Ok(())
}

#[tokio::test]
async fn submit_without_station_session_is_rejected() -> Result<()> {
    let (url, ctx) = spawn_station().await?;
    let client = StationClient::new(&url)?.with_voter(VoterId::new("V1"));

    let err = client
        .submit(&CandidateId::new("C1"))
        .await
        .expect_err("no session");
    assert!(matches!(
        err,
        SubmitError::Rejected(ApiException {
            code: ErrorCode::NoActiveSession,
            ..
        })
    ));
    assert_eq!(ctx.storage.count_vote_records().await?, 0);
    Ok(())
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() -> Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);

    let client = StationClient::new(&format!("http://{addr}"))?.with_voter(VoterId::new("V1"));
    let err = client
        .submit(&CandidateId::new("C1"))
        .await
        .expect_err("nothing listening");
    assert!(matches!(err, SubmitError::Transport(_)));
    Ok(())
}
