//! PostgreSQL persistence with a staged change journal.
//!
//! `PostgresStore` plays all three persistence roles: reads go straight to
//! the pool, writes only stage a change, and `commit` flushes every staged
//! change inside a single transaction. Nothing is visible to other requests
//! before the commit point.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use tracing::{info, instrument};

use crate::domain::{
    AppError, DatabaseError, Money, ShoeSize, Sneaker, SneakerId, SneakerStore, UnitOfWork, User,
    UserId, UserStore,
};

/// PostgreSQL connection pool configuration
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
    pub max_lifetime: Duration,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 2,
            acquire_timeout: Duration::from_secs(3),
            idle_timeout: Duration::from_secs(600),
            max_lifetime: Duration::from_secs(1800),
        }
    }
}

/// One staged write, applied at commit time.
#[derive(Debug, Clone)]
enum Change {
    InsertUser(User),
    InsertSneaker(Sneaker),
    UpdateSneaker(Sneaker),
    DeleteSneaker(SneakerId),
}

/// Postgres-backed [`UserStore`] + [`SneakerStore`] + [`UnitOfWork`].
pub struct PostgresStore {
    pool: PgPool,
    journal: Mutex<Vec<Change>>,
}

impl PostgresStore {
    /// Connects a new pool with custom configuration.
    ///
    /// # Errors
    ///
    /// Returns a connection fault when the pool cannot be established.
    pub async fn new(database_url: &str, config: PostgresConfig) -> Result<Self, AppError> {
        info!("Connecting to PostgreSQL...");
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.acquire_timeout)
            .idle_timeout(config.idle_timeout)
            .max_lifetime(config.max_lifetime)
            .connect(database_url)
            .await
            .map_err(|e| AppError::Database(DatabaseError::Connection(e.to_string())))?;
        info!("Connected to PostgreSQL");
        Ok(Self {
            pool,
            journal: Mutex::new(Vec::new()),
        })
    }

    /// Connects with default pool configuration.
    ///
    /// # Errors
    ///
    /// Returns a connection fault when the pool cannot be established.
    pub async fn with_defaults(database_url: &str) -> Result<Self, AppError> {
        Self::new(database_url, PostgresConfig::default()).await
    }

    /// Runs the bundled migrations.
    ///
    /// # Errors
    ///
    /// Returns a migration fault when any migration fails to apply.
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations...");
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Database migrations completed successfully");
        Ok(())
    }

    /// The underlying connection pool (for tests).
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn stage(&self, change: Change) {
        self.journal
            .lock()
            .expect("change journal poisoned")
            .push(change);
    }

    fn row_to_user(row: &PgRow) -> User {
        User {
            id: row.get("id"),
            email: row.get("email"),
            password_hash: row.get("password_hash"),
            salt: row.get("salt"),
        }
    }

    fn row_to_sneaker(row: &PgRow) -> Result<Sneaker, AppError> {
        let currency: String = row.get("price_currency");
        let country: String = row.get("size_country");

        Ok(Sneaker {
            id: row.get("id"),
            user_id: row.get("user_id"),
            name: row.get("name"),
            brand: row.get("brand"),
            price: Money {
                currency: currency
                    .parse()
                    .map_err(|e: String| AppError::Database(DatabaseError::Query(e)))?,
                amount: row.get("price_amount"),
            },
            size: ShoeSize {
                country: country
                    .parse()
                    .map_err(|e: String| AppError::Database(DatabaseError::Query(e)))?,
                value: row.get::<i16, _>("size_value") as u8,
            },
            rate: row.get::<i16, _>("rate") as u8,
        })
    }
}

#[async_trait]
impl UserStore for PostgresStore {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, AppError> {
        let row = sqlx::query("SELECT id, email, password_hash, salt FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from)?;

        Ok(row.as_ref().map(Self::row_to_user))
    }

    #[instrument(skip(self, email))]
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query("SELECT id, email, password_hash, salt FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from)?;

        Ok(row.as_ref().map(Self::row_to_user))
    }

    #[instrument(skip(self))]
    async fn exists(&self, id: UserId) -> Result<bool, AppError> {
        let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::from)?;

        Ok(row.get(0))
    }

    #[instrument(skip(self, email))]
    async fn is_email_unique(&self, email: &str) -> Result<bool, AppError> {
        let row = sqlx::query("SELECT NOT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::from)?;

        Ok(row.get(0))
    }

    async fn add(&self, user: &User) -> Result<(), AppError> {
        self.stage(Change::InsertUser(user.clone()));
        Ok(())
    }
}

#[async_trait]
impl SneakerStore for PostgresStore {
    #[instrument(skip(self))]
    async fn list_by_owner(&self, user_id: UserId) -> Result<Vec<Sneaker>, AppError> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, name, brand, price_currency, price_amount,
                   size_country, size_value, rate
            FROM sneakers
            WHERE user_id = $1
            ORDER BY name, id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        rows.iter().map(Self::row_to_sneaker).collect()
    }

    #[instrument(skip(self))]
    async fn find_by_owner_and_id(
        &self,
        user_id: UserId,
        sneaker_id: SneakerId,
    ) -> Result<Option<Sneaker>, AppError> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, name, brand, price_currency, price_amount,
                   size_country, size_value, rate
            FROM sneakers
            WHERE user_id = $1 AND id = $2
            "#,
        )
        .bind(user_id)
        .bind(sneaker_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        row.as_ref().map(Self::row_to_sneaker).transpose()
    }

    async fn add(&self, sneaker: &Sneaker) -> Result<(), AppError> {
        self.stage(Change::InsertSneaker(sneaker.clone()));
        Ok(())
    }

    async fn update(&self, sneaker: &Sneaker) -> Result<(), AppError> {
        self.stage(Change::UpdateSneaker(sneaker.clone()));
        Ok(())
    }

    async fn remove(&self, sneaker: &Sneaker) -> Result<(), AppError> {
        self.stage(Change::DeleteSneaker(sneaker.id));
        Ok(())
    }
}

#[async_trait]
impl UnitOfWork for PostgresStore {
    #[instrument(skip(self))]
    async fn commit(&self) -> Result<(), AppError> {
        let staged = {
            let mut journal = self.journal.lock().expect("change journal poisoned");
            std::mem::take(&mut *journal)
        };
        if staged.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await.map_err(DatabaseError::from)?;
        for change in staged {
            match change {
                Change::InsertUser(user) => {
                    sqlx::query(
                        "INSERT INTO users (id, email, password_hash, salt) VALUES ($1, $2, $3, $4)",
                    )
                    .bind(user.id)
                    .bind(&user.email)
                    .bind(&user.password_hash)
                    .bind(&user.salt)
                    .execute(&mut *tx)
                    .await
                    .map_err(DatabaseError::from)?;
                }
                Change::InsertSneaker(sneaker) => {
                    sqlx::query(
                        r#"
                        INSERT INTO sneakers (id, user_id, name, brand, price_currency,
                                              price_amount, size_country, size_value, rate)
                        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                        "#,
                    )
                    .bind(sneaker.id)
                    .bind(sneaker.user_id)
                    .bind(&sneaker.name)
                    .bind(&sneaker.brand)
                    .bind(sneaker.price.currency.as_str())
                    .bind(sneaker.price.amount)
                    .bind(sneaker.size.country.as_str())
                    .bind(i16::from(sneaker.size.value))
                    .bind(i16::from(sneaker.rate))
                    .execute(&mut *tx)
                    .await
                    .map_err(DatabaseError::from)?;
                }
                Change::UpdateSneaker(sneaker) => {
                    sqlx::query(
                        r#"
                        UPDATE sneakers
                        SET name = $1, brand = $2, price_currency = $3, price_amount = $4,
                            size_country = $5, size_value = $6, rate = $7
                        WHERE id = $8
                        "#,
                    )
                    .bind(&sneaker.name)
                    .bind(&sneaker.brand)
                    .bind(sneaker.price.currency.as_str())
                    .bind(sneaker.price.amount)
                    .bind(sneaker.size.country.as_str())
                    .bind(i16::from(sneaker.size.value))
                    .bind(i16::from(sneaker.rate))
                    .bind(sneaker.id)
                    .execute(&mut *tx)
                    .await
                    .map_err(DatabaseError::from)?;
                }
                Change::DeleteSneaker(id) => {
                    sqlx::query("DELETE FROM sneakers WHERE id = $1")
                        .bind(id)
                        .execute(&mut *tx)
                        .await
                        .map_err(DatabaseError::from)?;
                }
            }
        }
        tx.commit().await.map_err(DatabaseError::from)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(DatabaseError::Connection(e.to_string())))?;
        Ok(())
    }
}
