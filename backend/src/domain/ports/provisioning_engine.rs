//! Driven port for privileged PostgreSQL provisioning.
//!
//! The [`ProvisioningEngine`] trait is the boundary between tenant use-cases
//! and the adapter that issues DDL/DCL against the cluster. Implementations
//! own the administrative connection string; callers only pass names.
//!
//! Operations are sagas rather than transactions: `CREATE DATABASE` cannot run
//! inside a transaction block, so adapters compensate on partial failure and
//! report what went wrong through [`ProvisioningError`].

use async_trait::async_trait;

use crate::domain::{Password, PermissionLevel, SqlIdentifier};

use super::define_port_error;

define_port_error! {
    /// Errors raised by provisioning adapters.
    ///
    /// Messages may contain server-side diagnostics and are meant for logs;
    /// the domain translates them into generic client messages.
    pub enum ProvisioningError {
        /// A name could not be turned into a safe SQL identifier.
        InvalidIdentifier { message: String } =>
            "invalid identifier: {message}",
        /// The database, role or login already exists in the cluster.
        AlreadyExists { name: String } =>
            "'{name}' already exists",
        /// The targeted login or database does not exist.
        NotFound { name: String } =>
            "'{name}' does not exist",
        /// The admin or tenant database could not be reached.
        Connection { message: String } =>
            "provisioning connection failed: {message}",
        /// A statement failed mid-sequence.
        Provisioning { intent: String, message: String } =>
            "failed to {intent}: {message}",
        /// Password generation failed.
        Randomness { message: String } =>
            "password generation failed: {message}",
    }
}

/// Port for tenant database and login provisioning.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProvisioningEngine: Send + Sync {
    /// Create and harden a tenant database with its read and write roles.
    ///
    /// Returns the sanitised database name that now exists in the cluster.
    async fn create_database(&self, name: &str) -> Result<SqlIdentifier, ProvisioningError>;

    /// Create a login bound to `{database}_{level}` and return its password.
    async fn create_user(
        &self,
        database: &str,
        username: &str,
        level: PermissionLevel,
    ) -> Result<Password, ProvisioningError>;

    /// Rotate a login's password.
    async fn regenerate_password(
        &self,
        database: &str,
        username: &str,
    ) -> Result<Password, ProvisioningError>;

    /// Drop a login and everything it owns in `database`.
    async fn delete_user(&self, database: &str, username: &str) -> Result<(), ProvisioningError>;

    /// Revoke every listed login's access to `database` without dropping it.
    async fn soft_delete_database(
        &self,
        database: &str,
        usernames: &[String],
    ) -> Result<(), ProvisioningError>;

    /// Whether a role or login with this name exists anywhere in the cluster.
    async fn role_exists(&self, name: &str) -> Result<bool, ProvisioningError>;
}
