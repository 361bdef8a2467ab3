//! Driving port for tenant provisioning commands.
//!
//! HTTP handlers (and any other inbound adapter) call [`TenantCommand`] to
//! create, rotate and revoke tenant resources on behalf of an authenticated
//! application user. Ownership is checked by the implementation, so callers
//! only pass the caller's identity along.

use async_trait::async_trait;

use crate::domain::{
    AppUserId, DatabaseId, Error, ManagedDatabase, ManagedPgUser, Password, PermissionLevel,
    PgUserId,
};

/// Request to provision a new tenant database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateDatabaseRequest {
    /// Application user who will own the database.
    pub owner: AppUserId,
    /// Requested name, validated before provisioning.
    pub name: String,
}

/// Request to provision a login inside a tenant database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePgUserRequest {
    /// Application user issuing the request.
    pub owner: AppUserId,
    /// Target tenant database.
    pub database_id: DatabaseId,
    /// Requested login name.
    pub username: String,
    /// Role the login is bound to.
    pub permission_level: PermissionLevel,
}

/// A freshly provisioned login with its one-time password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedPgUser {
    /// Catalog record for the login.
    pub user: ManagedPgUser,
    /// Plaintext password; disclosed once and never stored.
    pub password: Password,
}

/// Result of a soft-delete request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoftDeleteOutcome {
    /// Database record after the request.
    pub database: ManagedDatabase,
    /// True when the database had already been soft-deleted.
    pub already_soft_deleted: bool,
}

/// Driving port for tenant provisioning commands.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TenantCommand: Send + Sync {
    /// Provision a database for `request.owner`.
    ///
    /// # Errors
    /// Invalid names are rejected, taken names conflict, and provisioning
    /// failures are reported without leaking SQL or connection details.
    async fn create_database(
        &self,
        request: CreateDatabaseRequest,
    ) -> Result<ManagedDatabase, Error>;

    /// Revoke all access to an owned database while keeping its data.
    async fn soft_delete_database(
        &self,
        owner: &AppUserId,
        database_id: &DatabaseId,
    ) -> Result<SoftDeleteOutcome, Error>;

    /// Provision a login inside an owned, active database.
    async fn create_user(&self, request: CreatePgUserRequest) -> Result<CreatedPgUser, Error>;

    /// Rotate the password of an active login.
    async fn regenerate_password(
        &self,
        owner: &AppUserId,
        database_id: &DatabaseId,
        user_id: &PgUserId,
    ) -> Result<Password, Error>;

    /// Drop a login and remove its catalog record.
    async fn delete_user(
        &self,
        owner: &AppUserId,
        database_id: &DatabaseId,
        user_id: &PgUserId,
    ) -> Result<(), Error>;
}
