//! Driving port for read-only tenant catalog queries.

use async_trait::async_trait;

use crate::domain::{AppUserId, DatabaseId, Error, ManagedDatabase, ManagedPgUser};

/// Read side of the tenant API. Results are always scoped to `owner`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TenantQuery: Send + Sync {
    /// Databases owned by `owner`.
    async fn list_databases(&self, owner: &AppUserId) -> Result<Vec<ManagedDatabase>, Error>;

    /// One owned database; `not_found` when it is missing or owned by someone else.
    async fn get_database(
        &self,
        owner: &AppUserId,
        database_id: &DatabaseId,
    ) -> Result<ManagedDatabase, Error>;

    /// Logins recorded for an owned database.
    async fn list_users(
        &self,
        owner: &AppUserId,
        database_id: &DatabaseId,
    ) -> Result<Vec<ManagedPgUser>, Error>;
}
