//! Validation pipeline producing field-keyed error maps.
//!
//! Structural rules (lengths, formats, ranges) are declared with the
//! `validator` derive on the command types and collected into a
//! [`FieldErrors`] map. Rules that need a collaborator lookup (email
//! uniqueness) run afterwards through an async [`CommandValidator`].
//! Violations are always reported, never raised as errors.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Serialize;
use validator::Validate;

use super::error::AppError;

/// Field-keyed map of violated-rule messages. An empty map means valid.
///
/// Keys are the serde field names of the command (`email`, `rate`, ...);
/// each entry holds the messages in rule-declaration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a violation message to the given field's entry.
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of fields with at least one violation.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Messages recorded for one field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Vec<String>> {
        self.0.get(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.0.iter()
    }
}

/// Collects the structural rule violations of a command into a [`FieldErrors`].
#[must_use]
pub fn check_rules<C: Validate>(command: &C) -> FieldErrors {
    let mut errors = FieldErrors::new();
    let Err(violations) = command.validate() else {
        return errors;
    };

    for (field, rule_errors) in violations.field_errors() {
        for rule_error in rule_errors {
            let message = rule_error
                .message
                .as_ref()
                .map_or_else(|| rule_error.code.to_string(), ToString::to_string);
            errors.push(field.to_string(), message);
        }
    }
    errors
}

/// Validator attached to one command type.
///
/// Implementations combine the command's structural rules with any
/// collaborator-backed rules. The `Err` channel is reserved for collaborator
/// faults; rule violations are part of the returned map.
#[async_trait]
pub trait CommandValidator<C>: Send + Sync {
    async fn validate(&self, command: &C) -> Result<FieldErrors, AppError>;
}

/// Structural-rules-only validator for commands without collaborator rules.
pub struct RuleValidator;

#[async_trait]
impl<C> CommandValidator<C> for RuleValidator
where
    C: Validate + Send + Sync,
{
    async fn validate(&self, command: &C) -> Result<FieldErrors, AppError> {
        Ok(check_rules(command))
    }
}
