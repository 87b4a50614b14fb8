use super::*;

fn config(ttl_seconds: i64) -> VoterTokenConfig {
    VoterTokenConfig {
        secret: "test-jwt-secret".into(),
        ttl_seconds,
    }
}

#[test]
fn token_round_trips_for_its_own_session() {
    let cfg = config(600);
    let session = SessionId::new("session-a");
    let token = mint_voter_token(&cfg, &session).expect("token");

    let claims = verify_voter_token(&cfg, &token, &session).expect("verify");
    assert_eq!(claims.role, "voter");
    assert_eq!(claims.sid, "session-a");
    assert_eq!(claims.exp - claims.iat, 600);
}

#[test]
fn token_from_another_session_is_rejected() {
    let cfg = config(600);
    let token = mint_voter_token(&cfg, &SessionId::new("session-a")).expect("token");

    let err = verify_voter_token(&cfg, &token, &SessionId::new("session-b"))
        .expect_err("should fail");
    assert!(matches!(err, VoteError::InvalidToken));
}

#[test]
fn expired_token_is_rejected() {
    let cfg = config(-5);
    let session = SessionId::new("session-a");
    let token = mint_voter_token(&cfg, &session).expect("token");

    let err = verify_voter_token(&cfg, &token, &session).expect_err("should fail");
    assert!(matches!(err, VoteError::InvalidToken));
}

#[test]
fn token_signed_with_other_secret_is_rejected() {
    let session = SessionId::new("session-a");
    let token = mint_voter_token(&config(600), &session).expect("token");
    let other = VoterTokenConfig {
        secret: "different".into(),
        ttl_seconds: 600,
    };

    assert!(matches!(
        verify_voter_token(&other, &token, &session),
        Err(VoteError::InvalidToken)
    ));
}

#[test]
fn garbage_token_is_rejected() {
    assert!(matches!(
        verify_voter_token(&config(600), "not-a-jwt", &SessionId::new("s")),
        Err(VoteError::InvalidToken)
    ));
}

#[test]
fn out_of_range_ttl_is_an_error_not_a_panic() {
    let session = SessionId::new("session-a");
    for ttl in [i64::MAX, i64::MIN] {
        let err = mint_voter_token(&config(ttl), &session).expect_err("ttl out of range");
        assert!(err.to_string().contains("out of range"), "{err}");
    }
}
