use std::sync::Arc;
use std::time::Duration;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;
use tokio::time::timeout;

use crate::application::repos::{CreateUserParams, RepoError, UsersRepo};
use crate::domain::entities::UserRecord;

/// Issued tokens expire this long after signing.
pub const TOKEN_TTL: Duration = Duration::from_secs(15 * 60);

const REGISTER_TIMEOUT: Duration = Duration::from_secs(3);
const LOGIN_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token signature mismatch")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("malformed token")]
    Malformed,
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            _ => TokenError::Malformed,
        }
    }
}

/// JWT claim set. `sub` carries the decimal user id.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
}

/// The verified identity attached to a request by the auth middleware.
/// Handlers take it as a typed extension and treat it as authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: i64,
}

/// Stateless HS256 signer/verifier built once from the configured secret.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenService {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }

    pub fn issue(&self, user_id: i64) -> Result<String, TokenError> {
        let now = OffsetDateTime::now_utc();
        let expires_at = now + TOKEN_TTL;
        let claims = Claims {
            sub: user_id.to_string(),
            exp: expires_at.unix_timestamp(),
            iat: now.unix_timestamp(),
        };
        let token = jsonwebtoken::encode(&Header::default(), &claims, &self.encoding)?;
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> Result<i64, TokenError> {
        let mut validation = Validation::default();
        // The default validation grants 60 seconds of leeway; expiry here
        // is exact.
        validation.leeway = 0;
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &validation)?;
        data.claims
            .sub
            .parse::<i64>()
            .map_err(|_| TokenError::Malformed)
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("username and password are mandatory")]
    MissingCredentials,
    #[error("username is already taken")]
    UsernameTaken,
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("password hashing failed: {0}")]
    Hash(String),
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error("authentication store timeout")]
    Timeout,
    #[error(transparent)]
    Repo(RepoError),
}

impl From<RepoError> for AuthError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Duplicate { .. } => AuthError::UsernameTaken,
            RepoError::Timeout => AuthError::Timeout,
            other => AuthError::Repo(other),
        }
    }
}

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UsersRepo>,
    tokens: Arc<TokenService>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UsersRepo>, tokens: Arc<TokenService>) -> Self {
        Self { users, tokens }
    }

    pub async fn register(&self, username: &str, password: &str) -> Result<UserRecord, AuthError> {
        let username = username.trim();
        if username.is_empty() || password.trim().is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let password_hash = Self::hash_password(password)?;
        let params = CreateUserParams {
            username: username.to_string(),
            password_hash,
        };

        let created = timeout(REGISTER_TIMEOUT, self.users.create_user(params))
            .await
            .map_err(|_| AuthError::Timeout)??;
        Ok(created)
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<String, AuthError> {
        let user = timeout(LOGIN_TIMEOUT, self.users.find_user_by_username(username.trim()))
            .await
            .map_err(|_| AuthError::Timeout)??
            .ok_or(AuthError::InvalidCredentials)?;

        if !Self::verify_password(&user.password_hash, password)? {
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.tokens.issue(user.id)?;
        Ok(token)
    }

    fn hash_password(password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|err| AuthError::Hash(err.to_string()))?;
        Ok(hash.to_string())
    }

    fn verify_password(stored: &str, candidate: &str) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(stored).map_err(|err| AuthError::Hash(err.to_string()))?;
        Ok(Argon2::default()
            .verify_password(candidate.as_bytes(), &parsed)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_verifies_to_the_same_user() {
        let tokens = TokenService::new(b"unit-test-secret");
        let token = tokens.issue(42).expect("issue token");
        assert_eq!(tokens.verify(&token).expect("verify token"), 42);
    }

    #[test]
    fn token_signed_with_other_key_is_rejected() {
        let tokens = TokenService::new(b"unit-test-secret");
        let rogue = TokenService::new(b"another-secret");
        let token = rogue.issue(42).expect("issue token");
        assert!(matches!(
            tokens.verify(&token),
            Err(TokenError::InvalidSignature)
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let tokens = TokenService::new(b"unit-test-secret");
        let past = OffsetDateTime::now_utc().unix_timestamp() - 60;
        let claims = Claims {
            sub: "42".to_string(),
            exp: past,
            iat: past - 60,
        };
        let token = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"unit-test-secret"),
        )
        .expect("sign token");

        assert!(matches!(tokens.verify(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn garbage_token_is_malformed() {
        let tokens = TokenService::new(b"unit-test-secret");
        assert!(matches!(
            tokens.verify("not-a-jwt"),
            Err(TokenError::Malformed)
        ));
    }

    #[test]
    fn non_numeric_subject_is_malformed() {
        let tokens = TokenService::new(b"unit-test-secret");
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let claims = Claims {
            sub: "alice".to_string(),
            exp: now + 600,
            iat: now,
        };
        let token = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"unit-test-secret"),
        )
        .expect("sign token");

        assert!(matches!(tokens.verify(&token), Err(TokenError::Malformed)));
    }

    #[test]
    fn password_hash_round_trip() {
        let hash = AuthService::hash_password("abhi@123").expect("hash password");
        assert!(hash.starts_with("$argon2"));
        assert!(AuthService::verify_password(&hash, "abhi@123").expect("verify"));
        assert!(!AuthService::verify_password(&hash, "wrong").expect("verify"));
    }
}
