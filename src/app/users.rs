//! Registration and login use cases.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument, warn};

use crate::domain::{
    AppError, AuthProvider, CommandValidator, Error, FieldErrors, LoginCommand, Outcome,
    RegisterCommand, UnitOfWork, User, UserStore, check_rules,
};

/// Validator for [`RegisterCommand`]: structural rules plus the
/// store-backed email uniqueness check.
pub struct RegisterValidator {
    users: Arc<dyn UserStore>,
}

impl RegisterValidator {
    #[must_use]
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl CommandValidator<RegisterCommand> for RegisterValidator {
    async fn validate(&self, command: &RegisterCommand) -> Result<FieldErrors, AppError> {
        let mut errors = check_rules(command);
        if !command.email.is_empty() && !self.users.is_email_unique(&command.email).await? {
            errors.push("email", "Email is not unique.");
        }
        Ok(errors)
    }
}

/// Use cases around user accounts.
///
/// Holds its collaborators behind trait objects so tests can swap in
/// in-memory implementations.
pub struct UserService {
    users: Arc<dyn UserStore>,
    auth: Arc<dyn AuthProvider>,
    uow: Arc<dyn UnitOfWork>,
    validator: Arc<dyn CommandValidator<RegisterCommand>>,
}

impl UserService {
    #[must_use]
    pub fn new(
        users: Arc<dyn UserStore>,
        auth: Arc<dyn AuthProvider>,
        uow: Arc<dyn UnitOfWork>,
        validator: Arc<dyn CommandValidator<RegisterCommand>>,
    ) -> Self {
        Self {
            users,
            auth,
            uow,
            validator,
        }
    }

    /// Registers a new account.
    ///
    /// Validation covers the structural rules and email uniqueness; any
    /// violation is returned as a validation failure. On success the new
    /// user is staged and committed in one step.
    ///
    /// # Errors
    ///
    /// Returns an `AppError` only for collaborator faults (store outage,
    /// commit failure). Expected rejections are `Outcome` states.
    #[instrument(skip(self, command), fields(email = %command.email))]
    pub async fn register(&self, command: &RegisterCommand) -> Result<Outcome, AppError> {
        let errors = self.validator.validate(command).await?;
        if !errors.is_empty() {
            warn!(fields = errors.len(), "Registration rejected by validation");
            return Ok(Outcome::invalid(errors));
        }

        let (password_hash, salt) = self.auth.compute_password_hash(&command.password);
        let user = User::create(command.email.clone(), password_hash, salt);

        self.users.add(&user).await?;
        self.uow.commit().await?;

        info!(user_id = %user.id, "User registered");
        Ok(Outcome::ok())
    }

    /// Exchanges credentials for a signed bearer token.
    ///
    /// # Errors
    ///
    /// Returns an `AppError` when the store lookup or token signing fails.
    #[instrument(skip(self, command), fields(email = %command.email))]
    pub async fn login(&self, command: &LoginCommand) -> Result<Outcome<String>, AppError> {
        let Some(user) = self.users.find_by_email(&command.email).await? else {
            return Ok(Outcome::failure(Error::bad_request("Incorrect email.")));
        };

        if !self.auth.verify_password(&user, &command.password) {
            warn!(user_id = %user.id, "Login rejected: password mismatch");
            return Ok(Outcome::failure(Error::bad_request("Invalid password.")));
        }

        let token = self.auth.issue_token(&user)?;
        info!(user_id = %user.id, "User logged in");
        Ok(Outcome::success(token))
    }
}
