//! Fault types for unexpected collaborator failures.
//!
//! These are the errors that are *not* part of a use case's expected
//! vocabulary: a lost database connection, a broken configuration, a token
//! that cannot be signed. Use cases let them propagate untouched; the API
//! layer reports a generic internal error without leaking detail.

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum DatabaseError {
    #[error("Connection failed: {0}")]
    Connection(String),
    #[error("Query execution failed: {0}")]
    Query(String),
    #[error("Duplicate record: {0}")]
    Duplicate(String),
    #[error("Pool exhausted: {0}")]
    PoolExhausted(String),
    #[error("Migration failed: {0}")]
    Migration(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Token signing failed: {0}")]
    TokenSigning(String),
    #[error("Invalid token: {0}")]
    InvalidToken(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Database(#[from] DatabaseError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut => DatabaseError::PoolExhausted("Pool timed out".to_string()),
            sqlx::Error::Database(db_err) => {
                // 23505 = Postgres unique constraint violation
                if db_err.code().is_some_and(|code| code == "23505") {
                    return DatabaseError::Duplicate(db_err.message().to_string());
                }
                DatabaseError::Query(db_err.message().to_string())
            }
            _ => DatabaseError::Query(err.to_string()),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(DatabaseError::from(err))
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        AppError::Database(DatabaseError::Migration(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_error_conversions() {
        let pool_timeout = DatabaseError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(pool_timeout, DatabaseError::PoolExhausted(_)));

        // Unknown sqlx errors fall back to Query
        let generic = DatabaseError::from(sqlx::Error::WorkerCrashed);
        assert!(matches!(generic, DatabaseError::Query(_)));
    }

    #[test]
    fn test_database_error_display() {
        let err = DatabaseError::Connection("timeout".to_string());
        assert_eq!(err.to_string(), "Connection failed: timeout");

        let err = DatabaseError::Duplicate("users_email_key".to_string());
        assert_eq!(err.to_string(), "Duplicate record: users_email_key");

        let err = DatabaseError::PoolExhausted("no connections".to_string());
        assert_eq!(err.to_string(), "Pool exhausted: no connections");
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::MissingEnvVar("DATABASE_URL".to_string());
        assert_eq!(err.to_string(), "Missing environment variable: DATABASE_URL");

        let err = ConfigError::InvalidValue {
            key: "PORT".to_string(),
            message: "not a number".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid value for 'PORT': not a number");
    }

    #[test]
    fn test_auth_error_display() {
        let err = AuthError::TokenSigning("bad key".to_string());
        assert_eq!(err.to_string(), "Token signing failed: bad key");

        let err = AuthError::InvalidToken("expired".to_string());
        assert_eq!(err.to_string(), "Invalid token: expired");
    }

    #[test]
    fn test_app_error_from_database_error() {
        let db_err = DatabaseError::Query("syntax".to_string());
        let app_err: AppError = db_err.into();
        assert!(matches!(app_err, AppError::Database(DatabaseError::Query(_))));
    }

    #[test]
    fn test_app_error_from_auth_error() {
        let auth_err = AuthError::InvalidToken("garbage".to_string());
        let app_err: AppError = auth_err.into();
        assert!(matches!(app_err, AppError::Auth(AuthError::InvalidToken(_))));
    }

    #[test]
    fn test_app_error_from_migrate_error() {
        let mig_err = sqlx::migrate::MigrateError::VersionMissing(1);
        let app_err: AppError = mig_err.into();
        assert!(matches!(
            app_err,
            AppError::Database(DatabaseError::Migration(_))
        ));
    }
}
