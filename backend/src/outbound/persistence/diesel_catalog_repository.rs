//! PostgreSQL-backed `CatalogRepository` implementation using Diesel ORM.
//!
//! Enum columns are stored as text and validated when rows are read back; a
//! row with an unknown status surfaces as a query error rather than being
//! silently coerced.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::{debug, warn};

use crate::domain::ports::{CatalogRepository, CatalogRepositoryError};
use crate::domain::{
    AppUserId, DatabaseId, DatabaseStatus, ManagedDatabase, ManagedPgUser, NewManagedDatabase,
    NewManagedPgUser, PgUserId, PgUserStatus,
};

use super::models::{
    ManagedDatabaseRow, ManagedPgUserRow, NewManagedDatabaseRow, NewManagedPgUserRow,
};
use super::pool::{DbPool, PoolError};
use super::schema::{managed_databases, managed_pg_users};

/// Diesel-backed implementation of the `CatalogRepository` port.
#[derive(Clone)]
pub struct DieselCatalogRepository {
    pool: DbPool,
}

impl DieselCatalogRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> CatalogRepositoryError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            CatalogRepositoryError::connection(message)
        }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> CatalogRepositoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => CatalogRepositoryError::query("record not found"),
        DieselError::QueryBuilderError(_) => CatalogRepositoryError::query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            CatalogRepositoryError::duplicate(info.constraint_name().unwrap_or("unique constraint"))
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            CatalogRepositoryError::connection("database connection error")
        }
        _ => CatalogRepositoryError::query("database error"),
    }
}

fn corrupt_column(column: &str, value: &str) -> CatalogRepositoryError {
    warn!(column, value, "catalog row holds an unrecognised value");
    CatalogRepositoryError::query(format!("unrecognised {column} value"))
}

fn row_to_database(row: ManagedDatabaseRow) -> Result<ManagedDatabase, CatalogRepositoryError> {
    let status = row
        .status
        .parse::<DatabaseStatus>()
        .map_err(|_| corrupt_column("managed_databases.status", &row.status))?;
    Ok(ManagedDatabase {
        id: DatabaseId::from_uuid(row.id),
        owner_user_id: AppUserId::from_uuid(row.owner_user_id),
        pg_database_name: row.pg_database_name,
        status,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn row_to_user(row: ManagedPgUserRow) -> Result<ManagedPgUser, CatalogRepositoryError> {
    let permission_level = row
        .permission_level
        .parse()
        .map_err(|_| corrupt_column("managed_pg_users.permission_level", &row.permission_level))?;
    let status = row
        .status
        .parse::<PgUserStatus>()
        .map_err(|_| corrupt_column("managed_pg_users.status", &row.status))?;
    Ok(ManagedPgUser {
        id: PgUserId::from_uuid(row.id),
        managed_database_id: DatabaseId::from_uuid(row.managed_database_id),
        pg_username: row.pg_username,
        permission_level,
        status,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

#[async_trait]
impl CatalogRepository for DieselCatalogRepository {
    async fn record_database(
        &self,
        record: NewManagedDatabase,
    ) -> Result<ManagedDatabase, CatalogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewManagedDatabaseRow {
            id: *DatabaseId::random().as_uuid(),
            owner_user_id: *record.owner_user_id.as_uuid(),
            pg_database_name: &record.pg_database_name,
            status: DatabaseStatus::Active.as_str(),
        };

        let row = diesel::insert_into(managed_databases::table)
            .values(&new_row)
            .returning(ManagedDatabaseRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        row_to_database(row)
    }

    async fn database_name_exists(&self, name: &str) -> Result<bool, CatalogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::select(diesel::dsl::exists(
            managed_databases::table.filter(managed_databases::pg_database_name.eq(name)),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)
    }

    async fn list_databases_for_owner(
        &self,
        owner: &AppUserId,
    ) -> Result<Vec<ManagedDatabase>, CatalogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<ManagedDatabaseRow> = managed_databases::table
            .filter(managed_databases::owner_user_id.eq(owner.as_uuid()))
            .order((
                managed_databases::created_at.desc(),
                managed_databases::id.asc(),
            ))
            .select(ManagedDatabaseRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_database).collect()
    }

    async fn find_database_for_owner(
        &self,
        id: &DatabaseId,
        owner: &AppUserId,
    ) -> Result<Option<ManagedDatabase>, CatalogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<ManagedDatabaseRow> = managed_databases::table
            .filter(managed_databases::id.eq(id.as_uuid()))
            .filter(managed_databases::owner_user_id.eq(owner.as_uuid()))
            .select(ManagedDatabaseRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_database).transpose()
    }

    async fn update_database_status(
        &self,
        id: &DatabaseId,
        status: DatabaseStatus,
    ) -> Result<(), CatalogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let updated = diesel::update(managed_databases::table.find(id.as_uuid()))
            .set((
                managed_databases::status.eq(status.as_str()),
                managed_databases::updated_at.eq(diesel::dsl::now),
            ))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        if updated == 0 {
            return Err(CatalogRepositoryError::query("database record not found"));
        }
        Ok(())
    }

    async fn record_user(
        &self,
        record: NewManagedPgUser,
    ) -> Result<ManagedPgUser, CatalogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewManagedPgUserRow {
            id: *PgUserId::random().as_uuid(),
            managed_database_id: *record.managed_database_id.as_uuid(),
            pg_username: &record.pg_username,
            permission_level: record.permission_level.as_str(),
            status: PgUserStatus::Active.as_str(),
        };

        let row = diesel::insert_into(managed_pg_users::table)
            .values(&new_row)
            .returning(ManagedPgUserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        row_to_user(row)
    }

    async fn username_exists_in_database(
        &self,
        database: &DatabaseId,
        username: &str,
    ) -> Result<bool, CatalogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::select(diesel::dsl::exists(
            managed_pg_users::table
                .filter(managed_pg_users::managed_database_id.eq(database.as_uuid()))
                .filter(managed_pg_users::pg_username.eq(username)),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)
    }

    async fn list_users_for_database(
        &self,
        database: &DatabaseId,
    ) -> Result<Vec<ManagedPgUser>, CatalogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<ManagedPgUserRow> = managed_pg_users::table
            .filter(managed_pg_users::managed_database_id.eq(database.as_uuid()))
            .order((managed_pg_users::created_at.asc(), managed_pg_users::id.asc()))
            .select(ManagedPgUserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_user).collect()
    }

    async fn find_user(
        &self,
        id: &PgUserId,
    ) -> Result<Option<ManagedPgUser>, CatalogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<ManagedPgUserRow> = managed_pg_users::table
            .find(id.as_uuid())
            .select(ManagedPgUserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_user).transpose()
    }

    async fn update_user_status_for_database(
        &self,
        database: &DatabaseId,
        status: PgUserStatus,
    ) -> Result<(), CatalogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::update(
            managed_pg_users::table
                .filter(managed_pg_users::managed_database_id.eq(database.as_uuid())),
        )
        .set((
            managed_pg_users::status.eq(status.as_str()),
            managed_pg_users::updated_at.eq(diesel::dsl::now),
        ))
        .execute(&mut conn)
        .await
        .map(|_| ())
        .map_err(map_diesel_error)
    }

    async fn delete_user(&self, id: &PgUserId) -> Result<(), CatalogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::delete(managed_pg_users::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }
}
