//! Token issuance and password hashing.
//!
//! Bearer tokens are HS256-signed JWTs carrying the user id and email with a
//! fixed two-hour lifetime. Passwords are stored as
//! `base64(sha256(password + salt))` next to a per-user random salt.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::RngCore;
use rand::rngs::OsRng;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::{AppError, AuthError, AuthProvider, ConfigError, TokenClaims, User, UserId};

/// Token lifetime.
const TOKEN_TTL_HOURS: i64 = 2;

/// Length of the random per-user salt before encoding.
const SALT_BYTES: usize = 32;

/// Signing configuration for issued tokens.
pub struct JwtConfig {
    /// Symmetric signing key. Must be long enough to resist brute force.
    pub key: SecretString,
    pub issuer: String,
    pub audience: String,
}

impl JwtConfig {
    /// Reads `JWT_KEY` (required), `JWT_ISSUER` and `JWT_AUDIENCE` (both
    /// default to `kickstash`).
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` when the key is missing or shorter than 32
    /// bytes.
    pub fn from_env() -> Result<Self, ConfigError> {
        let key = std::env::var("JWT_KEY")
            .map_err(|_| ConfigError::MissingEnvVar("JWT_KEY".to_string()))?;
        if key.len() < 32 {
            return Err(ConfigError::InvalidValue {
                key: "JWT_KEY".to_string(),
                message: "must be at least 32 bytes".to_string(),
            });
        }

        Ok(Self {
            key: SecretString::from(key),
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "kickstash".to_string()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "kickstash".to_string()),
        })
    }
}

/// Wire shape of the token payload.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    email: String,
    iss: String,
    aud: String,
    exp: i64,
}

/// [`AuthProvider`] backed by HS256 JWTs and salted SHA-256 password hashes.
pub struct JwtAuthProvider {
    config: JwtConfig,
}

impl JwtAuthProvider {
    #[must_use]
    pub fn new(config: JwtConfig) -> Self {
        Self { config }
    }

    fn signing_key(&self) -> &[u8] {
        self.config.key.expose_secret().as_bytes()
    }
}

impl AuthProvider for JwtAuthProvider {
    fn issue_token(&self, user: &User) -> Result<String, AppError> {
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
            exp: (Utc::now() + Duration::hours(TOKEN_TTL_HOURS)).timestamp(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.signing_key()),
        )
        .map_err(|e| AppError::Auth(AuthError::TokenSigning(e.to_string())))
    }

    fn verify_token(&self, token: &str) -> Result<TokenClaims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_audience(&[&self.config.audience]);

        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.signing_key()),
            &validation,
        )
        .map_err(|e| AppError::Auth(AuthError::InvalidToken(e.to_string())))?;

        let user_id: UserId = data.claims.sub.parse().map_err(|_| {
            AppError::Auth(AuthError::InvalidToken("malformed subject claim".to_string()))
        })?;

        Ok(TokenClaims {
            user_id,
            email: data.claims.email,
        })
    }

    fn verify_password(&self, user: &User, password: &str) -> bool {
        hash_with_salt(password, &user.salt) == user.password_hash
    }

    fn compute_password_hash(&self, password: &str) -> (String, String) {
        let mut salt_bytes = [0u8; SALT_BYTES];
        OsRng.fill_bytes(&mut salt_bytes);
        let salt = BASE64.encode(salt_bytes);
        (hash_with_salt(password, &salt), salt)
    }
}

fn hash_with_salt(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hasher.update(salt.as_bytes());
    BASE64.encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> JwtAuthProvider {
        JwtAuthProvider::new(JwtConfig {
            key: SecretString::from("an-obviously-test-only-signing-key-0001"),
            issuer: "kickstash-test".to_string(),
            audience: "kickstash-test".to_string(),
        })
    }

    fn sample_user() -> User {
        User::create(
            "user@example.com".to_string(),
            "hash".to_string(),
            "salt".to_string(),
        )
    }

    #[test]
    fn test_issue_and_verify_round_trip() {
        let provider = provider();
        let user = sample_user();

        let token = provider.issue_token(&user).unwrap();
        assert!(!token.is_empty());

        let claims = provider.verify_token(&token).unwrap();
        assert_eq!(claims.user_id, user.id);
        assert_eq!(claims.email, user.email);
    }

    #[test]
    fn test_verify_rejects_garbage() {
        let provider = provider();
        let result = provider.verify_token("not.a.token");
        assert!(matches!(
            result,
            Err(AppError::Auth(AuthError::InvalidToken(_)))
        ));
    }

    #[test]
    fn test_verify_rejects_foreign_signature() {
        let issuing = provider();
        let verifying = JwtAuthProvider::new(JwtConfig {
            key: SecretString::from("a-different-test-only-signing-key-0002"),
            issuer: "kickstash-test".to_string(),
            audience: "kickstash-test".to_string(),
        });

        let token = issuing.issue_token(&sample_user()).unwrap();
        assert!(verifying.verify_token(&token).is_err());
    }

    #[test]
    fn test_verify_rejects_wrong_audience() {
        let issuing = provider();
        let verifying = JwtAuthProvider::new(JwtConfig {
            key: SecretString::from("an-obviously-test-only-signing-key-0001"),
            issuer: "kickstash-test".to_string(),
            audience: "someone-else".to_string(),
        });

        let token = issuing.issue_token(&sample_user()).unwrap();
        assert!(verifying.verify_token(&token).is_err());
    }

    #[test]
    fn test_password_hash_round_trip() {
        let provider = provider();
        let (hash, salt) = provider.compute_password_hash("password123");

        let user = User::create("u@example.com".to_string(), hash, salt);
        assert!(provider.verify_password(&user, "password123"));
        assert!(!provider.verify_password(&user, "password124"));
    }

    #[test]
    fn test_salts_are_unique_per_hash() {
        let provider = provider();
        let (hash_a, salt_a) = provider.compute_password_hash("password123");
        let (hash_b, salt_b) = provider.compute_password_hash("password123");

        assert_ne!(salt_a, salt_b);
        assert_ne!(hash_a, hash_b);
    }
}
