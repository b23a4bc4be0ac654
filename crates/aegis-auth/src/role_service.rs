//! Remote role service contract.
//!
//! Some deployments compose the gate with a remote role authority. Only
//! the method signatures are consumed here; transport is out of scope.
//! The gate treats an error and a `false` answer identically.

use aegis_types::{ErrorCode, Role};
use async_trait::async_trait;
use thiserror::Error;

/// Failure talking to a remote role service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoleServiceError {
    /// The service could not be reached.
    #[error("role service unreachable: {0}")]
    Unreachable(String),

    /// The service answered with a rejection.
    #[error("role service rejected the call: {0}")]
    Rejected(String),
}

impl ErrorCode for RoleServiceError {
    fn code(&self) -> &'static str {
        match self {
            Self::Unreachable(_) => "ROLE_SERVICE_UNREACHABLE",
            Self::Rejected(_) => "ROLE_SERVICE_REJECTED",
        }
    }

    fn is_recoverable(&self) -> bool {
        matches!(self, Self::Unreachable(_))
    }
}

/// Remote authority for the caller's role.
///
/// # Example
///
/// ```
/// use aegis_auth::{Role, RoleService, RoleServiceError};
/// use async_trait::async_trait;
///
/// struct FixedRole(Role);
///
/// #[async_trait]
/// impl RoleService for FixedRole {
///     async fn get_caller_role(&self) -> Result<Role, RoleServiceError> {
///         Ok(self.0)
///     }
///
///     async fn is_admin(&self) -> Result<bool, RoleServiceError> {
///         Ok(self.0.is_admin())
///     }
/// }
/// ```
#[async_trait]
pub trait RoleService: Send + Sync {
    /// Returns the role of the current caller.
    async fn get_caller_role(&self) -> Result<Role, RoleServiceError>;

    /// Returns `true` if the current caller is an administrator.
    async fn is_admin(&self) -> Result<bool, RoleServiceError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use aegis_types::assert_error_codes;

    struct Unreachable;

    #[async_trait]
    impl RoleService for Unreachable {
        async fn get_caller_role(&self) -> Result<Role, RoleServiceError> {
            Err(RoleServiceError::Unreachable("offline".into()))
        }

        async fn is_admin(&self) -> Result<bool, RoleServiceError> {
            Err(RoleServiceError::Unreachable("offline".into()))
        }
    }

    #[tokio::test]
    async fn trait_object_propagates_errors() {
        let service: Box<dyn RoleService> = Box::new(Unreachable);
        assert!(service.is_admin().await.is_err());
        assert!(service.get_caller_role().await.is_err());
    }

    #[test]
    fn error_codes() {
        assert_error_codes(
            &[
                RoleServiceError::Unreachable("x".into()),
                RoleServiceError::Rejected("y".into()),
            ],
            "ROLE_SERVICE_",
        );
        assert!(RoleServiceError::Unreachable("x".into()).is_recoverable());
    }
}
