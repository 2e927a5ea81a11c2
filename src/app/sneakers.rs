//! Ownership-scoped sneaker use cases.
//!
//! Every operation follows the same linear flow and short-circuits on the
//! first failure: existence/ownership check, rule validation, domain
//! operation, one atomic commit.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::domain::{
    AddSneakerCommand, AppError, CommandValidator, DeleteSneakerCommand, EditSneakerCommand,
    Error, GetSneakersQuery, Outcome, Sneaker, SneakerDto, SneakerStore, UnitOfWork, UserStore,
};

/// Use cases around a user's sneaker collection.
pub struct SneakerService {
    users: Arc<dyn UserStore>,
    sneakers: Arc<dyn SneakerStore>,
    uow: Arc<dyn UnitOfWork>,
    add_validator: Arc<dyn CommandValidator<AddSneakerCommand>>,
    edit_validator: Arc<dyn CommandValidator<EditSneakerCommand>>,
}

impl SneakerService {
    #[must_use]
    pub fn new(
        users: Arc<dyn UserStore>,
        sneakers: Arc<dyn SneakerStore>,
        uow: Arc<dyn UnitOfWork>,
        add_validator: Arc<dyn CommandValidator<AddSneakerCommand>>,
        edit_validator: Arc<dyn CommandValidator<EditSneakerCommand>>,
    ) -> Self {
        Self {
            users,
            sneakers,
            uow,
            add_validator,
            edit_validator,
        }
    }

    /// Adds a sneaker to the owner's collection.
    ///
    /// # Errors
    ///
    /// Returns an `AppError` only for collaborator faults.
    #[instrument(skip(self, command), fields(user_id = %command.user_id))]
    pub async fn add(&self, command: &AddSneakerCommand) -> Result<Outcome, AppError> {
        if !self.users.exists(command.user_id).await? {
            return Ok(Outcome::failure(Error::not_found("User is not found.")));
        }

        let errors = self.add_validator.validate(command).await?;
        if !errors.is_empty() {
            return Ok(Outcome::invalid(errors));
        }

        let sneaker = Sneaker::create(
            command.user_id,
            command.name.clone(),
            command.brand.clone(),
            command.price,
            command.size,
            command.rate,
        );
        self.sneakers.add(&sneaker).await?;
        self.uow.commit().await?;

        info!(sneaker_id = %sneaker.id, "Sneaker added");
        Ok(Outcome::ok())
    }

    /// Replaces the mutable fields of an owned sneaker and returns the
    /// updated projection.
    ///
    /// # Errors
    ///
    /// Returns an `AppError` only for collaborator faults.
    #[instrument(skip(self, command), fields(user_id = %command.user_id, sneaker_id = %command.sneaker_id))]
    pub async fn edit(&self, command: &EditSneakerCommand) -> Result<Outcome<SneakerDto>, AppError> {
        let found = self
            .sneakers
            .find_by_owner_and_id(command.user_id, command.sneaker_id)
            .await?;
        let Some(mut sneaker) = found else {
            return Ok(Outcome::failure(Error::not_found("Sneaker is not found.")));
        };

        let errors = self.edit_validator.validate(command).await?;
        if !errors.is_empty() {
            return Ok(Outcome::invalid(errors));
        }

        sneaker.update(
            command.name.clone(),
            command.brand.clone(),
            command.price,
            command.size,
            command.rate,
        );
        self.sneakers.update(&sneaker).await?;
        self.uow.commit().await?;

        info!(sneaker_id = %sneaker.id, "Sneaker updated");
        Ok(Outcome::success(SneakerDto::from(&sneaker)))
    }

    /// Removes an owned sneaker.
    ///
    /// # Errors
    ///
    /// Returns an `AppError` only for collaborator faults.
    #[instrument(skip(self, command), fields(user_id = %command.user_id, sneaker_id = %command.sneaker_id))]
    pub async fn remove(&self, command: &DeleteSneakerCommand) -> Result<Outcome, AppError> {
        let found = self
            .sneakers
            .find_by_owner_and_id(command.user_id, command.sneaker_id)
            .await?;
        let Some(sneaker) = found else {
            return Ok(Outcome::failure(Error::not_found("Sneaker is not found.")));
        };

        self.sneakers.remove(&sneaker).await?;
        self.uow.commit().await?;

        info!(sneaker_id = %sneaker.id, "Sneaker removed");
        Ok(Outcome::ok())
    }

    /// Projects the owner's collection to DTOs. Further filtering and paging
    /// belong to the boundary layer.
    ///
    /// # Errors
    ///
    /// Returns an `AppError` only for collaborator faults.
    #[instrument(skip(self, query), fields(user_id = %query.user_id))]
    pub async fn list(&self, query: &GetSneakersQuery) -> Result<Outcome<Vec<SneakerDto>>, AppError> {
        if !self.users.exists(query.user_id).await? {
            return Ok(Outcome::failure(Error::not_found("User is not found.")));
        }

        let sneakers = self.sneakers.list_by_owner(query.user_id).await?;
        let dtos = sneakers.iter().map(SneakerDto::from).collect();
        Ok(Outcome::success(dtos))
    }
}
