//! Domain traits defining contracts for external collaborators.

use async_trait::async_trait;

use super::error::AppError;
use super::types::{Sneaker, SneakerId, TokenClaims, User, UserId};

/// Persistence contract for users.
///
/// Reads hit the backing store directly; `add` only stages the new user.
/// Nothing becomes visible until [`UnitOfWork::commit`] runs.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Look up a user by id.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, AppError>;

    /// Look up a user by email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Whether a user with this id exists.
    async fn exists(&self, id: UserId) -> Result<bool, AppError>;

    /// Whether no committed user carries this email.
    async fn is_email_unique(&self, email: &str) -> Result<bool, AppError>;

    /// Stage a new user for the next commit.
    async fn add(&self, user: &User) -> Result<(), AppError>;
}

/// Persistence contract for sneakers. Same staging discipline as [`UserStore`].
#[async_trait]
pub trait SneakerStore: Send + Sync {
    /// All sneakers owned by the given user.
    async fn list_by_owner(&self, user_id: UserId) -> Result<Vec<Sneaker>, AppError>;

    /// A single sneaker, visible only through its owner.
    async fn find_by_owner_and_id(
        &self,
        user_id: UserId,
        sneaker_id: SneakerId,
    ) -> Result<Option<Sneaker>, AppError>;

    /// Stage a new sneaker for the next commit.
    async fn add(&self, sneaker: &Sneaker) -> Result<(), AppError>;

    /// Stage a full-field update for the next commit.
    async fn update(&self, sneaker: &Sneaker) -> Result<(), AppError>;

    /// Stage a removal for the next commit.
    async fn remove(&self, sneaker: &Sneaker) -> Result<(), AppError>;
}

/// Atomic commit point for all staged changes.
///
/// A use case stages any number of adds/updates/removes and then commits
/// exactly once; either every staged change persists or none does.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// Persist all staged changes atomically.
    async fn commit(&self) -> Result<(), AppError>;

    /// Ping the backing store.
    async fn health_check(&self) -> Result<(), AppError>;
}

/// Token issuance and credential verification.
pub trait AuthProvider: Send + Sync {
    /// Issue a signed bearer token for the user.
    fn issue_token(&self, user: &User) -> Result<String, AppError>;

    /// Verify a bearer token and extract its claims.
    fn verify_token(&self, token: &str) -> Result<TokenClaims, AppError>;

    /// Whether the plaintext password matches the user's stored hash.
    fn verify_password(&self, user: &User, password: &str) -> bool;

    /// Hash a plaintext password with a fresh salt; returns `(hash, salt)`.
    fn compute_password_hash(&self, password: &str) -> (String, String);
}
