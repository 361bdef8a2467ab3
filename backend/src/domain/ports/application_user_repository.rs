//! Port for application user identities.

use async_trait::async_trait;

use crate::domain::{AppUserId, ApplicationUser};

use super::define_port_error;

define_port_error! {
    /// Errors raised by application user repository adapters.
    pub enum ApplicationUserRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "application user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "application user repository query failed: {message}",
    }
}

/// Lookup and just-in-time registration of API callers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ApplicationUserRepository: Send + Sync {
    /// Return the user with `email`, creating it on first sight.
    async fn find_or_create_by_email(
        &self,
        email: &str,
    ) -> Result<ApplicationUser, ApplicationUserRepositoryError>;

    /// Fetch a user by identifier.
    async fn find_by_id(
        &self,
        id: &AppUserId,
    ) -> Result<Option<ApplicationUser>, ApplicationUserRepositoryError>;
}
