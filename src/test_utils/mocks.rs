//! Mock implementations for testing.
//!
//! These mocks provide in-memory implementations of the collaborator traits
//! with the same staging discipline as the Postgres store: writes become
//! visible only after `commit`. Failure modes are configurable to simulate
//! collaborator outages.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use crate::domain::{
    AppError, AuthError, AuthProvider, DatabaseError, Sneaker, SneakerId, SneakerStore,
    TokenClaims, UnitOfWork, User, UserId, UserStore,
};

/// Configuration for mock behavior.
#[derive(Debug, Clone, Default)]
pub struct MockConfig {
    /// If true, operations will fail.
    pub should_fail: bool,
    /// Custom error message for failures.
    pub error_message: Option<String>,
}

impl MockConfig {
    /// Creates a config that always succeeds.
    #[must_use]
    pub fn success() -> Self {
        Self::default()
    }

    /// Creates a config that always fails.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            should_fail: true,
            error_message: Some(message.into()),
        }
    }
}

/// One staged write, applied on commit.
#[derive(Debug, Clone)]
enum StagedChange {
    InsertUser(User),
    InsertSneaker(Sneaker),
    UpdateSneaker(Sneaker),
    DeleteSneaker(SneakerId),
}

/// In-memory user store, sneaker store and unit of work in one struct.
///
/// A single instance plays all three persistence roles, exactly like the
/// Postgres implementation; clone the `Arc` into each collaborator slot.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use kickstash::test_utils::InMemoryStore;
///
/// let store = Arc::new(InMemoryStore::new());
/// let failing = Arc::new(InMemoryStore::failing("store down"));
/// ```
pub struct InMemoryStore {
    users: Mutex<HashMap<UserId, User>>,
    sneakers: Mutex<HashMap<SneakerId, Sneaker>>,
    staged: Mutex<Vec<StagedChange>>,
    config: MockConfig,
    call_count: AtomicU64,
    is_healthy: AtomicBool,
}

impl InMemoryStore {
    /// Creates a new store with default (success) configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(MockConfig::success())
    }

    /// Creates a new store with the given configuration.
    #[must_use]
    pub fn with_config(config: MockConfig) -> Self {
        Self {
            users: Mutex::new(HashMap::new()),
            sneakers: Mutex::new(HashMap::new()),
            staged: Mutex::new(Vec::new()),
            config,
            call_count: AtomicU64::new(0),
            is_healthy: AtomicBool::new(true),
        }
    }

    /// Creates a store whose every operation fails.
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_config(MockConfig::failure(message))
    }

    /// Number of times any store method was called.
    pub fn call_count(&self) -> u64 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Sets the health status reported by `health_check`.
    pub fn set_healthy(&self, healthy: bool) {
        self.is_healthy.store(healthy, Ordering::Relaxed);
    }

    /// Inserts a committed user directly (test setup).
    pub fn seed_user(&self, user: User) {
        self.users.lock().unwrap().insert(user.id, user);
    }

    /// Inserts a committed sneaker directly (test setup).
    pub fn seed_sneaker(&self, sneaker: Sneaker) {
        self.sneakers.lock().unwrap().insert(sneaker.id, sneaker);
    }

    /// Number of committed users.
    pub fn user_count(&self) -> usize {
        self.users.lock().unwrap().len()
    }

    /// Number of committed sneakers.
    pub fn sneaker_count(&self) -> usize {
        self.sneakers.lock().unwrap().len()
    }

    /// Number of staged, not yet committed changes.
    pub fn staged_count(&self) -> usize {
        self.staged.lock().unwrap().len()
    }

    /// Committed sneakers of one owner, ordered by name.
    pub fn sneakers_of(&self, user_id: UserId) -> Vec<Sneaker> {
        let mut owned: Vec<Sneaker> = self
            .sneakers
            .lock()
            .unwrap()
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        owned
    }

    fn increment_call_count(&self) {
        self.call_count.fetch_add(1, Ordering::Relaxed);
    }

    fn check_should_fail(&self) -> Result<(), AppError> {
        if self.config.should_fail {
            let msg = self
                .config
                .error_message
                .clone()
                .unwrap_or_else(|| "Mock store error".to_string());
            return Err(AppError::Database(DatabaseError::Query(msg)));
        }
        Ok(())
    }

    fn stage(&self, change: StagedChange) -> Result<(), AppError> {
        self.check_should_fail()?;
        self.staged.lock().unwrap().push(change);
        Ok(())
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, AppError> {
        self.increment_call_count();
        self.check_should_fail()?;
        Ok(self.users.lock().unwrap().get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        self.increment_call_count();
        self.check_should_fail()?;
        let users = self.users.lock().unwrap();
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn exists(&self, id: UserId) -> Result<bool, AppError> {
        self.increment_call_count();
        self.check_should_fail()?;
        Ok(self.users.lock().unwrap().contains_key(&id))
    }

    async fn is_email_unique(&self, email: &str) -> Result<bool, AppError> {
        self.increment_call_count();
        self.check_should_fail()?;
        let users = self.users.lock().unwrap();
        Ok(!users.values().any(|u| u.email == email))
    }

    async fn add(&self, user: &User) -> Result<(), AppError> {
        self.increment_call_count();
        self.stage(StagedChange::InsertUser(user.clone()))
    }
}

#[async_trait]
impl SneakerStore for InMemoryStore {
    async fn list_by_owner(&self, user_id: UserId) -> Result<Vec<Sneaker>, AppError> {
        self.increment_call_count();
        self.check_should_fail()?;
        Ok(self.sneakers_of(user_id))
    }

    async fn find_by_owner_and_id(
        &self,
        user_id: UserId,
        sneaker_id: SneakerId,
    ) -> Result<Option<Sneaker>, AppError> {
        self.increment_call_count();
        self.check_should_fail()?;
        let sneakers = self.sneakers.lock().unwrap();
        Ok(sneakers
            .get(&sneaker_id)
            .filter(|s| s.user_id == user_id)
            .cloned())
    }

    async fn add(&self, sneaker: &Sneaker) -> Result<(), AppError> {
        self.increment_call_count();
        self.stage(StagedChange::InsertSneaker(sneaker.clone()))
    }

    async fn update(&self, sneaker: &Sneaker) -> Result<(), AppError> {
        self.increment_call_count();
        self.stage(StagedChange::UpdateSneaker(sneaker.clone()))
    }

    async fn remove(&self, sneaker: &Sneaker) -> Result<(), AppError> {
        self.increment_call_count();
        self.stage(StagedChange::DeleteSneaker(sneaker.id))
    }
}

#[async_trait]
impl UnitOfWork for InMemoryStore {
    async fn commit(&self) -> Result<(), AppError> {
        self.increment_call_count();
        self.check_should_fail()?;

        let staged = std::mem::take(&mut *self.staged.lock().unwrap());
        for change in staged {
            match change {
                StagedChange::InsertUser(user) => {
                    let mut users = self.users.lock().unwrap();
                    // mirror the unique constraint on email
                    if users.values().any(|u| u.email == user.email) {
                        return Err(AppError::Database(DatabaseError::Duplicate(
                            "users_email_key".to_string(),
                        )));
                    }
                    users.insert(user.id, user);
                }
                StagedChange::InsertSneaker(sneaker) | StagedChange::UpdateSneaker(sneaker) => {
                    self.sneakers.lock().unwrap().insert(sneaker.id, sneaker);
                }
                StagedChange::DeleteSneaker(id) => {
                    self.sneakers.lock().unwrap().remove(&id);
                }
            }
        }
        Ok(())
    }

    async fn health_check(&self) -> Result<(), AppError> {
        self.increment_call_count();
        if !self.is_healthy.load(Ordering::Relaxed) {
            return Err(AppError::Database(DatabaseError::Connection(
                "Mock store unhealthy".to_string(),
            )));
        }
        self.check_should_fail()
    }
}

/// Deterministic [`AuthProvider`] double.
///
/// Tokens are transparent strings (`mock-token:<id>:<email>`) so full HTTP
/// flows work without real signing; password hashes are recomputable from
/// the plaintext and salt.
pub struct MockAuthProvider {
    config: MockConfig,
    call_count: AtomicU64,
}

const TOKEN_PREFIX: &str = "mock-token:";

fn mock_hash(password: &str, salt: &str) -> String {
    format!("mock-hash:{password}:{salt}")
}

impl MockAuthProvider {
    /// Creates a provider that always succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(MockConfig::success())
    }

    /// Creates a provider with the given configuration.
    #[must_use]
    pub fn with_config(config: MockConfig) -> Self {
        Self {
            config,
            call_count: AtomicU64::new(0),
        }
    }

    /// Creates a provider whose token operations fail.
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_config(MockConfig::failure(message))
    }

    /// Number of times any provider method was called.
    pub fn call_count(&self) -> u64 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// The token this provider would issue for a user.
    #[must_use]
    pub fn token_for(user: &User) -> String {
        format!("{TOKEN_PREFIX}{}:{}", user.id, user.email)
    }

    fn increment_call_count(&self) {
        self.call_count.fetch_add(1, Ordering::Relaxed);
    }
}

impl Default for MockAuthProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthProvider for MockAuthProvider {
    fn issue_token(&self, user: &User) -> Result<String, AppError> {
        self.increment_call_count();
        if self.config.should_fail {
            let msg = self
                .config
                .error_message
                .clone()
                .unwrap_or_else(|| "Mock signing error".to_string());
            return Err(AppError::Auth(AuthError::TokenSigning(msg)));
        }
        Ok(Self::token_for(user))
    }

    fn verify_token(&self, token: &str) -> Result<TokenClaims, AppError> {
        self.increment_call_count();
        let rejected = || AppError::Auth(AuthError::InvalidToken("unrecognized token".to_string()));

        let rest = token.strip_prefix(TOKEN_PREFIX).ok_or_else(rejected)?;
        let (id, email) = rest.split_once(':').ok_or_else(rejected)?;
        let user_id: UserId = id.parse().map_err(|_| rejected())?;

        Ok(TokenClaims {
            user_id,
            email: email.to_string(),
        })
    }

    fn verify_password(&self, user: &User, password: &str) -> bool {
        self.increment_call_count();
        user.password_hash == mock_hash(password, &user.salt)
    }

    fn compute_password_hash(&self, password: &str) -> (String, String) {
        self.increment_call_count();
        let salt = format!("mock-salt-{}", self.call_count());
        (mock_hash(password, &salt), salt)
    }
}
