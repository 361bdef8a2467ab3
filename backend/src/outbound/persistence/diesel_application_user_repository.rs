//! PostgreSQL-backed `ApplicationUserRepository` using Diesel ORM.
//!
//! Registration is just-in-time: the first authenticated request for an
//! email inserts the row, concurrent first requests converge on the same
//! record through `ON CONFLICT DO NOTHING`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::{debug, info};

use crate::domain::ports::{ApplicationUserRepository, ApplicationUserRepositoryError};
use crate::domain::{AppUserId, ApplicationUser};

use super::models::{ApplicationUserRow, NewApplicationUserRow};
use super::pool::{DbPool, PoolError};
use super::schema::application_users;

/// Diesel-backed implementation of the `ApplicationUserRepository` port.
#[derive(Clone)]
pub struct DieselApplicationUserRepository {
    pool: DbPool,
}

impl DieselApplicationUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ApplicationUserRepositoryError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            ApplicationUserRepositoryError::connection(message)
        }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> ApplicationUserRepositoryError {
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
        DieselError::NotFound => ApplicationUserRepositoryError::query("record not found"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            ApplicationUserRepositoryError::connection("database connection error")
        }
        _ => ApplicationUserRepositoryError::query("database error"),
    }
}

fn row_to_user(row: ApplicationUserRow) -> ApplicationUser {
    ApplicationUser {
        id: AppUserId::from_uuid(row.id),
        oidc_sub: row.oidc_sub,
        email: row.email,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

#[async_trait]
impl ApplicationUserRepository for DieselApplicationUserRepository {
    async fn find_or_create_by_email(
        &self,
        email: &str,
    ) -> Result<ApplicationUser, ApplicationUserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewApplicationUserRow {
            id: *AppUserId::random().as_uuid(),
            email,
        };

        let inserted = diesel::insert_into(application_users::table)
            .values(&new_row)
            .on_conflict(application_users::email)
            .do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        if inserted > 0 {
            info!(user_id = %new_row.id, "registered application user");
        }

        application_users::table
            .filter(application_users::email.eq(email))
            .select(ApplicationUserRow::as_select())
            .first(&mut conn)
            .await
            .map(row_to_user)
            .map_err(map_diesel_error)
    }

    async fn find_by_id(
        &self,
        id: &AppUserId,
    ) -> Result<Option<ApplicationUser>, ApplicationUserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<ApplicationUserRow> = application_users::table
            .find(id.as_uuid())
            .select(ApplicationUserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(row_to_user))
    }
}
