//! Port for the tenant catalog.
//!
//! The catalog records which application user owns which tenant database and
//! which logins were provisioned inside it. It never stores credentials.

use async_trait::async_trait;

use crate::domain::{
    AppUserId, DatabaseId, DatabaseStatus, ManagedDatabase, ManagedPgUser, NewManagedDatabase,
    NewManagedPgUser, PgUserId, PgUserStatus,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by catalog repository adapters.
    pub enum CatalogRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "catalog connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "catalog query failed: {message}",
        /// A unique constraint rejected the write.
        Duplicate { message: String } =>
            "catalog record already exists: {message}",
    }
}

/// Persistence contract for tenant databases and their logins.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Insert a database record with status `active`.
    async fn record_database(
        &self,
        record: NewManagedDatabase,
    ) -> Result<ManagedDatabase, CatalogRepositoryError>;

    /// Whether any record already uses this cluster database name.
    async fn database_name_exists(&self, name: &str) -> Result<bool, CatalogRepositoryError>;

    /// All databases owned by `owner`, newest first.
    async fn list_databases_for_owner(
        &self,
        owner: &AppUserId,
    ) -> Result<Vec<ManagedDatabase>, CatalogRepositoryError>;

    /// Fetch a database only when `owner` owns it.
    async fn find_database_for_owner(
        &self,
        id: &DatabaseId,
        owner: &AppUserId,
    ) -> Result<Option<ManagedDatabase>, CatalogRepositoryError>;

    /// Change a database's lifecycle status.
    async fn update_database_status(
        &self,
        id: &DatabaseId,
        status: DatabaseStatus,
    ) -> Result<(), CatalogRepositoryError>;

    /// Insert a login record with status `active`.
    async fn record_user(
        &self,
        record: NewManagedPgUser,
    ) -> Result<ManagedPgUser, CatalogRepositoryError>;

    /// Whether `username` is already recorded for `database`.
    async fn username_exists_in_database(
        &self,
        database: &DatabaseId,
        username: &str,
    ) -> Result<bool, CatalogRepositoryError>;

    /// Logins recorded for `database`, oldest first.
    async fn list_users_for_database(
        &self,
        database: &DatabaseId,
    ) -> Result<Vec<ManagedPgUser>, CatalogRepositoryError>;

    /// Fetch a single login record.
    async fn find_user(
        &self,
        id: &PgUserId,
    ) -> Result<Option<ManagedPgUser>, CatalogRepositoryError>;

    /// Set the status of every login recorded for `database`.
    async fn update_user_status_for_database(
        &self,
        database: &DatabaseId,
        status: PgUserStatus,
    ) -> Result<(), CatalogRepositoryError>;

    /// Remove a login record.
    async fn delete_user(&self, id: &PgUserId) -> Result<(), CatalogRepositoryError>;
}
