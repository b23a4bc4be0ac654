//! Sign-up form checks.
//!
//! These belong to the form, not the registry: [`UserRegistry::register`]
//! accepts any password.
//!
//! [`UserRegistry::register`]: crate::UserRegistry::register

use aegis_types::ErrorCode;
use thiserror::Error;

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_LEN: usize = 6;

/// A sign-up form field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("name is required")]
    EmptyName,

    #[error("email address is invalid")]
    InvalidEmail,

    #[error("password must be at least {min} characters")]
    PasswordTooShort { min: usize },

    #[error("passwords do not match")]
    PasswordMismatch,
}

impl ErrorCode for ValidationError {
    fn code(&self) -> &'static str {
        match self {
            Self::EmptyName => "VALIDATION_EMPTY_NAME",
            Self::InvalidEmail => "VALIDATION_INVALID_EMAIL",
            Self::PasswordTooShort { .. } => "VALIDATION_PASSWORD_TOO_SHORT",
            Self::PasswordMismatch => "VALIDATION_PASSWORD_MISMATCH",
        }
    }

    fn is_recoverable(&self) -> bool {
        true
    }
}

/// Raw sign-up form input.
///
/// # Example
///
/// ```
/// use aegis_runtime::auth::{SignUpForm, ValidationError};
///
/// let form = SignUpForm::new("Ana", "ana@x.com", "secret1", "secret2");
/// assert_eq!(form.validate(), Err(ValidationError::PasswordMismatch));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct SignUpForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl SignUpForm {
    /// Creates a form from field values.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
        confirm_password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: password.into(),
            confirm_password: confirm_password.into(),
        }
    }

    /// Checks fields in display order and reports the first failure.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if !looks_like_email(self.email.trim()) {
            return Err(ValidationError::InvalidEmail);
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ValidationError::PasswordTooShort {
                min: MIN_PASSWORD_LEN,
            });
        }
        if self.password != self.confirm_password {
            return Err(ValidationError::PasswordMismatch);
        }
        Ok(())
    }
}

impl std::fmt::Debug for SignUpForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignUpForm")
            .field("name", &self.name)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

fn looks_like_email(s: &str) -> bool {
    match s.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !s.chars().any(char::is_whitespace)
        }
        None => false,
    }
}
