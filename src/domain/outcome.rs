//! Tri-state outcome type used at every use-case boundary.
//!
//! Expected domain failures travel as [`Outcome`] states instead of errors:
//! a use case either succeeds with a payload, fails with a single coded
//! [`Error`], or reports a field-keyed set of validation messages. Only
//! genuinely unexpected faults (a collaborator outage, a broken config) use
//! the `Err` channel of a plain `Result` and bubble up to the boundary.

use serde::Serialize;

use super::validation::FieldErrors;

/// Machine-readable category for a single expected failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorCode {
    /// The targeted aggregate does not exist (or is not visible to the caller).
    NotFound,
    /// The request is well-formed but cannot be honored (bad credentials etc.).
    BadRequest,
    /// Reserved for concurrent-modification conflicts.
    Conflict,
}

/// A single expected failure, created at the failure site.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
}

impl Error {
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::NotFound,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::BadRequest,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Conflict,
            message: message.into(),
        }
    }
}

/// The result of a use case: success with a payload, a coded failure, or a
/// validation report.
///
/// Exactly one state holds at a time; the payload exists only in `Success`,
/// the error only in `Failure` and the field map only in `Invalid`. Callers
/// are expected to pattern-match when consuming:
///
/// ```
/// use kickstash::domain::{Error, Outcome};
///
/// let outcome: Outcome<String> = Outcome::failure(Error::bad_request("nope"));
/// match outcome {
///     Outcome::Success(token) => println!("{token}"),
///     Outcome::Failure(error) => eprintln!("{}", error.message),
///     Outcome::Invalid(errors) => eprintln!("{} invalid fields", errors.len()),
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T = ()> {
    Success(T),
    Failure(Error),
    Invalid(FieldErrors),
}

impl<T> Outcome<T> {
    /// A successful outcome carrying `value`.
    #[must_use]
    pub fn success(value: T) -> Self {
        Self::Success(value)
    }

    /// A failed outcome carrying one coded error.
    #[must_use]
    pub fn failure(error: Error) -> Self {
        Self::Failure(error)
    }

    /// A validation failure carrying the field-keyed violation map.
    #[must_use]
    pub fn invalid(errors: FieldErrors) -> Self {
        Self::Invalid(errors)
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// True for both `Failure` and `Invalid` ("not success").
    #[must_use]
    pub fn is_failure(&self) -> bool {
        !self.is_success()
    }

    #[must_use]
    pub fn is_validation_failure(&self) -> bool {
        matches!(self, Self::Invalid(_))
    }

    /// The success payload, if this outcome is `Success`.
    #[must_use]
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Success(value) => Some(value),
            _ => None,
        }
    }

    /// The coded error, if this outcome is `Failure`.
    #[must_use]
    pub fn error(&self) -> Option<&Error> {
        match self {
            Self::Failure(error) => Some(error),
            _ => None,
        }
    }

    /// The violation map, if this outcome is `Invalid`.
    #[must_use]
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Invalid(errors) => Some(errors),
            _ => None,
        }
    }

    /// Consumes the outcome and returns the success payload.
    ///
    /// # Panics
    ///
    /// Panics when the outcome is not `Success`. Reading the payload of a
    /// failed outcome is a programming error, not a recoverable condition.
    #[must_use]
    pub fn unwrap_value(self) -> T {
        match self {
            Self::Success(value) => value,
            Self::Failure(error) => panic!(
                "called `unwrap_value` on a Failure outcome: {:?} {}",
                error.code, error.message
            ),
            Self::Invalid(errors) => panic!(
                "called `unwrap_value` on an Invalid outcome with {} field(s)",
                errors.len()
            ),
        }
    }
}

impl Outcome<()> {
    /// A successful outcome with no payload.
    #[must_use]
    pub fn ok() -> Self {
        Self::Success(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_state_is_exclusive() {
        let outcome = Outcome::success(42);

        assert!(outcome.is_success());
        assert!(!outcome.is_failure());
        assert!(!outcome.is_validation_failure());
        assert_eq!(outcome.value(), Some(&42));
        assert!(outcome.error().is_none());
        assert!(outcome.field_errors().is_none());
    }

    #[test]
    fn test_failure_state_is_exclusive() {
        let outcome: Outcome<i32> = Outcome::failure(Error::not_found("missing"));

        assert!(!outcome.is_success());
        assert!(outcome.is_failure());
        assert!(!outcome.is_validation_failure());
        assert!(outcome.value().is_none());
        assert_eq!(outcome.error().map(|e| e.code), Some(ErrorCode::NotFound));
    }

    #[test]
    fn test_invalid_state_is_failure_and_validation_failure() {
        let mut errors = FieldErrors::new();
        errors.push("email", "email is invalid");
        let outcome: Outcome<i32> = Outcome::invalid(errors);

        assert!(!outcome.is_success());
        assert!(outcome.is_failure());
        assert!(outcome.is_validation_failure());
        assert!(outcome.error().is_none());
        assert!(outcome.field_errors().is_some_and(|e| e.contains("email")));
    }

    #[test]
    fn test_unit_success_constructor() {
        let outcome = Outcome::ok();
        assert!(outcome.is_success());
        assert_eq!(outcome.value(), Some(&()));
    }

    #[test]
    fn test_unwrap_value_returns_payload() {
        let outcome = Outcome::success("token".to_string());
        assert_eq!(outcome.unwrap_value(), "token");
    }

    #[test]
    #[should_panic(expected = "Failure outcome")]
    fn test_unwrap_value_panics_on_failure() {
        let outcome: Outcome<String> = Outcome::failure(Error::bad_request("nope"));
        let _ = outcome.unwrap_value();
    }

    #[test]
    #[should_panic(expected = "Invalid outcome")]
    fn test_unwrap_value_panics_on_invalid() {
        let mut errors = FieldErrors::new();
        errors.push("rate", "rate must be between 1 and 5");
        let outcome: Outcome<String> = Outcome::invalid(errors);
        let _ = outcome.unwrap_value();
    }

    #[test]
    fn test_error_constructors_set_codes() {
        assert_eq!(Error::not_found("x").code, ErrorCode::NotFound);
        assert_eq!(Error::bad_request("x").code, ErrorCode::BadRequest);
        assert_eq!(Error::conflict("x").code, ErrorCode::Conflict);
        assert_eq!(Error::not_found("User is not found.").message, "User is not found.");
    }
}
