//! Token lifecycle service.
//!
//! Tokens move through `issued → valid → (expired | revoked) → rejected`.
//! A refresh token is long-lived and exchanged only for access tokens; an
//! access token is short-lived and authorizes individual calls. A successful
//! login clears the user's revocation marker, re-authorizing validation of
//! freshly issued tokens.

use chrono::{Duration, Utc};
use tracing::{debug, info};

use super::store::CredentialStore;
use super::token::{TokenClaims, TokenType, decode_token, encode_token};
use super::{AuthError, TokenError, password};

fn new_claims(username: &str, typ: TokenType, ttl: Duration) -> TokenClaims {
    let now = Utc::now();
    TokenClaims {
        sub: username.to_string(),
        typ,
        iat: now.timestamp(),
        exp: (now + ttl).timestamp(),
    }
}

/// Pure claim checks shared by every validation path. Checked in order:
/// type first, then expiry, then revocation. A revoked user presenting the
/// wrong token kind still learns as little as possible.
pub fn check_claims(
    claims: &TokenClaims,
    required: TokenType,
    now: i64,
    revoked: bool,
) -> Result<(), TokenError> {
    if claims.typ != required {
        return Err(TokenError::WrongType);
    }
    if claims.exp <= now {
        return Err(TokenError::Expired);
    }
    if revoked {
        return Err(TokenError::Revoked);
    }
    Ok(())
}

/// Authenticate with username + password and issue a refresh token.
///
/// A successful login clears the revocation marker.
pub async fn issue_refresh_token<S: CredentialStore>(
    store: &S,
    username: &str,
    password_attempt: &str,
    secret: &[u8],
    ttl: Duration,
) -> Result<String, AuthError> {
    let hash = store
        .password_hash(username)
        .await?
        .ok_or(AuthError::NotFound)?;

    if !password::verify_password(password_attempt, &hash)? {
        debug!(username, "refresh token refused: bad credentials");
        return Err(AuthError::InvalidCredentials);
    }

    store.set_revoked(username, false).await?;

    let token = encode_token(&new_claims(username, TokenType::Refresh, ttl), secret)?;
    info!(username, "issued refresh token");
    Ok(token)
}

/// Exchange a valid refresh token for a short-lived access token.
pub async fn issue_access_token<S: CredentialStore>(
    store: &S,
    refresh_token: &str,
    secret: &[u8],
    ttl: Duration,
) -> Result<String, AuthError> {
    let username = validate(store, refresh_token, TokenType::Refresh, secret).await?;
    let token = mint_access_token(&username, secret, ttl)?;
    info!(username, "issued access token");
    Ok(token)
}

/// Mint an access token for an already-validated subject.
pub fn mint_access_token(
    username: &str,
    secret: &[u8],
    ttl: Duration,
) -> Result<String, AuthError> {
    encode_token(&new_claims(username, TokenType::Access, ttl), secret)
}

/// Validate a token against a required type, returning the subject username.
///
/// Fails with a distinct [`TokenError`] for each of: bad signature, malformed
/// token, wrong type, expiry, and revocation. A token whose subject no longer
/// exists is treated as revoked.
pub async fn validate<S: CredentialStore>(
    store: &S,
    token: &str,
    required: TokenType,
    secret: &[u8],
) -> Result<String, AuthError> {
    let claims = decode_token(token, secret)?;
    let revoked = store.is_revoked(&claims.sub).await?.unwrap_or(true);
    check_claims(&claims, required, Utc::now().timestamp(), revoked)?;
    Ok(claims.sub)
}

/// Invalidate every outstanding token for a user, regardless of expiry.
pub async fn revoke_all<S: CredentialStore>(store: &S, username: &str) -> Result<(), AuthError> {
    if !store.set_revoked(username, true).await? {
        return Err(AuthError::NotFound);
    }
    info!(username, "revoked all tokens");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::store::StoreError;

    const SECRET: &[u8] = b"service-test-secret";

    /// In-memory credential store: username → (password hash, revoked).
    struct MemStore {
        users: Mutex<HashMap<String, (String, bool)>>,
    }

    impl MemStore {
        fn with_user(username: &str, password: &str) -> Self {
            let hash = password::hash_password(password).unwrap();
            let mut users = HashMap::new();
            users.insert(username.to_string(), (hash, false));
            Self {
                users: Mutex::new(users),
            }
        }
    }

    #[async_trait]
    impl CredentialStore for MemStore {
        async fn password_hash(&self, username: &str) -> Result<Option<String>, StoreError> {
            Ok(self
                .users
                .lock()
                .unwrap()
                .get(username)
                .map(|(hash, _)| hash.clone()))
        }

        async fn is_revoked(&self, username: &str) -> Result<Option<bool>, StoreError> {
            Ok(self
                .users
                .lock()
                .unwrap()
                .get(username)
                .map(|(_, revoked)| *revoked))
        }

        async fn set_revoked(&self, username: &str, revoked: bool) -> Result<bool, StoreError> {
            Ok(self
                .users
                .lock()
                .unwrap()
                .get_mut(username)
                .map(|entry| entry.1 = revoked)
                .is_some())
        }
    }

    fn token_err(err: AuthError) -> TokenError {
        match err {
            AuthError::Token(e) => e,
            other => panic!("expected token error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn full_lifecycle_round_trips() {
        let store = MemStore::with_user("alice", "hunter22");

        let refresh =
            issue_refresh_token(&store, "alice", "hunter22", SECRET, Duration::days(30))
                .await
                .unwrap();
        let access = issue_access_token(&store, &refresh, SECRET, Duration::minutes(15))
            .await
            .unwrap();

        let subject = validate(&store, &access, TokenType::Access, SECRET)
            .await
            .unwrap();
        assert_eq!(subject, "alice");
    }

    #[tokio::test]
    async fn bad_password_is_invalid_credentials() {
        let store = MemStore::with_user("alice", "hunter22");
        let err = issue_refresh_token(&store, "alice", "wrong", SECRET, Duration::days(30))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let store = MemStore::with_user("alice", "hunter22");
        let err = issue_refresh_token(&store, "bob", "hunter22", SECRET, Duration::days(30))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::NotFound));
    }

    #[tokio::test]
    async fn wrong_type_both_directions() {
        let store = MemStore::with_user("alice", "hunter22");
        let refresh =
            issue_refresh_token(&store, "alice", "hunter22", SECRET, Duration::days(30))
                .await
                .unwrap();
        let access = issue_access_token(&store, &refresh, SECRET, Duration::minutes(15))
            .await
            .unwrap();

        let err = validate(&store, &refresh, TokenType::Access, SECRET)
            .await
            .unwrap_err();
        assert_eq!(token_err(err), TokenError::WrongType);

        let err = validate(&store, &access, TokenType::Refresh, SECRET)
            .await
            .unwrap_err();
        assert_eq!(token_err(err), TokenError::WrongType);
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        let store = MemStore::with_user("alice", "hunter22");
        let refresh =
            issue_refresh_token(&store, "alice", "hunter22", SECRET, Duration::seconds(-1))
                .await
                .unwrap();
        let err = validate(&store, &refresh, TokenType::Refresh, SECRET)
            .await
            .unwrap_err();
        assert_eq!(token_err(err), TokenError::Expired);
    }

    #[tokio::test]
    async fn revoke_all_kills_outstanding_tokens_until_next_login() {
        let store = MemStore::with_user("alice", "hunter22");
        let refresh =
            issue_refresh_token(&store, "alice", "hunter22", SECRET, Duration::days(30))
                .await
                .unwrap();
        let access = issue_access_token(&store, &refresh, SECRET, Duration::minutes(15))
            .await
            .unwrap();

        revoke_all(&store, "alice").await.unwrap();

        // Every previously issued token is dead, even though unexpired.
        let err = validate(&store, &refresh, TokenType::Refresh, SECRET)
            .await
            .unwrap_err();
        assert_eq!(token_err(err), TokenError::Revoked);
        let err = validate(&store, &access, TokenType::Access, SECRET)
            .await
            .unwrap_err();
        assert_eq!(token_err(err), TokenError::Revoked);

        // A fresh login re-authorizes validation.
        let fresh = issue_refresh_token(&store, "alice", "hunter22", SECRET, Duration::days(30))
            .await
            .unwrap();
        let subject = validate(&store, &fresh, TokenType::Refresh, SECRET)
            .await
            .unwrap();
        assert_eq!(subject, "alice");
    }

    #[tokio::test]
    async fn revoke_all_for_unknown_user_is_not_found() {
        let store = MemStore::with_user("alice", "hunter22");
        assert!(matches!(
            revoke_all(&store, "bob").await.unwrap_err(),
            AuthError::NotFound
        ));
    }

    #[tokio::test]
    async fn deleted_subject_is_treated_as_revoked() {
        let store = MemStore::with_user("alice", "hunter22");
        let refresh =
            issue_refresh_token(&store, "alice", "hunter22", SECRET, Duration::days(30))
                .await
                .unwrap();
        store.users.lock().unwrap().remove("alice");

        let err = validate(&store, &refresh, TokenType::Refresh, SECRET)
            .await
            .unwrap_err();
        assert_eq!(token_err(err), TokenError::Revoked);
    }

    #[test]
    fn check_claims_order_is_type_then_expiry_then_revocation() {
        let claims = TokenClaims {
            sub: "alice".into(),
            typ: TokenType::Refresh,
            iat: 0,
            exp: 1,
        };
        // Expired, revoked, and the wrong type: type wins.
        assert_eq!(
            check_claims(&claims, TokenType::Access, 100, true).unwrap_err(),
            TokenError::WrongType
        );
        // Expired and revoked: expiry wins.
        assert_eq!(
            check_claims(&claims, TokenType::Refresh, 100, true).unwrap_err(),
            TokenError::Expired
        );
    }
}
