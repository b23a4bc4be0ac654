//! Authentication flow.

mod service;
mod validation;

pub use service::AuthService;
pub use validation::{SignUpForm, ValidationError, MIN_PASSWORD_LEN};
