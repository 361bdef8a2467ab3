//! Tenant provisioning use-cases.
//!
//! [`TenantService`] implements the driving ports by combining the catalog
//! (who owns what) with the provisioning engine (what exists in the
//! cluster). The engine runs first and the catalog is written afterwards, so a
//! catalog record always describes something that was actually provisioned.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use tracing::{error, info, warn};

use crate::domain::ports::{
    CatalogRepository, CatalogRepositoryError, CreateDatabaseRequest, CreatePgUserRequest,
    CreatedPgUser, ProvisioningEngine, ProvisioningError, SoftDeleteOutcome, TenantCommand,
    TenantQuery,
};
use crate::domain::{
    AppUserId, DatabaseId, DatabaseName, DatabaseStatus, Error, IdentifierError, ManagedDatabase,
    ManagedPgUser, NameValidationError, NewManagedDatabase, NewManagedPgUser, Password, PgUserId,
    PgUserStatus, PgUsername, sanitize_identifier,
};

/// Tenant service implementing [`TenantCommand`] and [`TenantQuery`].
#[derive(Clone)]
pub struct TenantService<C, E> {
    catalog: Arc<C>,
    engine: Arc<E>,
}

impl<C, E> TenantService<C, E> {
    /// Create a new service over the given catalog and engine.
    pub const fn new(catalog: Arc<C>, engine: Arc<E>) -> Self {
        Self { catalog, engine }
    }
}

fn invalid_name(field: &str, error: &NameValidationError) -> Error {
    Error::invalid_request(format!("invalid {field}: {error}")).with_details(json!({
        "field": field,
        "code": error.code(),
    }))
}

fn invalid_identifier(field: &str, error: &IdentifierError) -> Error {
    let code = match error {
        IdentifierError::Empty => "empty",
        IdentifierError::InvalidStart => "invalid_start",
        IdentifierError::TooLong => "too_long",
    };
    Error::invalid_request(format!("invalid {field}: {error}")).with_details(json!({
        "field": field,
        "code": code,
    }))
}

fn map_catalog_error(error: CatalogRepositoryError) -> Error {
    match error {
        CatalogRepositoryError::Connection { message } => {
            warn!(%message, "catalog unavailable");
            Error::service_unavailable("catalog unavailable")
        }
        CatalogRepositoryError::Query { message } => {
            error!(%message, "catalog query failed");
            Error::internal("catalog query failed")
        }
        CatalogRepositoryError::Duplicate { message } => {
            warn!(%message, "catalog uniqueness conflict");
            Error::conflict("resource already exists")
        }
    }
}

fn map_engine_error(error: ProvisioningError) -> Error {
    match &error {
        ProvisioningError::InvalidIdentifier { .. } => {
            warn!(%error, "provisioning rejected identifier");
            Error::invalid_request("name is not a valid identifier")
        }
        ProvisioningError::AlreadyExists { name } => {
            warn!(%error, "provisioning target already exists");
            Error::conflict(format!("'{name}' already exists"))
        }
        ProvisioningError::NotFound { .. } => {
            warn!(%error, "provisioning target missing");
            Error::not_found("login does not exist in the cluster")
        }
        ProvisioningError::Connection { .. } => {
            error!(%error, "provisioning backend unreachable");
            Error::service_unavailable("database cluster unavailable")
        }
        ProvisioningError::Provisioning { .. } | ProvisioningError::Randomness { .. } => {
            error!(%error, "provisioning failed");
            Error::internal("provisioning failed")
        }
    }
}

fn database_not_found() -> Error {
    Error::not_found("database not found")
}

impl<C, E> TenantService<C, E>
where
    C: CatalogRepository,
    E: ProvisioningEngine,
{
    async fn owned_database(
        &self,
        owner: &AppUserId,
        database_id: &DatabaseId,
    ) -> Result<ManagedDatabase, Error> {
        self.catalog
            .find_database_for_owner(database_id, owner)
            .await
            .map_err(map_catalog_error)?
            .ok_or_else(database_not_found)
    }

    /// Resolve a login that must belong to the given owned database.
    async fn owned_user(
        &self,
        owner: &AppUserId,
        database_id: &DatabaseId,
        user_id: &PgUserId,
    ) -> Result<(ManagedDatabase, ManagedPgUser), Error> {
        let database = self.owned_database(owner, database_id).await?;
        let user = self
            .catalog
            .find_user(user_id)
            .await
            .map_err(map_catalog_error)?
            .ok_or_else(|| Error::not_found("database user not found"))?;
        if user.managed_database_id != database.id {
            return Err(
                Error::invalid_request("user does not belong to this database").with_details(
                    json!({ "field": "user_id", "code": "database_mismatch" }),
                ),
            );
        }
        Ok((database, user))
    }

    /// Drop a login whose catalog record could not be written.
    async fn compensate_unrecorded_user(&self, database: &str, username: &str) {
        match self.engine.delete_user(database, username).await {
            Ok(()) => warn!(database, username, "dropped login after catalog write failed"),
            Err(compensation) => error!(
                critical = true,
                database,
                username,
                error = %compensation,
                "login exists without catalog record; manual cleanup required"
            ),
        }
    }
}

#[async_trait]
impl<C, E> TenantCommand for TenantService<C, E>
where
    C: CatalogRepository,
    E: ProvisioningEngine,
{
    async fn create_database(
        &self,
        request: CreateDatabaseRequest,
    ) -> Result<ManagedDatabase, Error> {
        let CreateDatabaseRequest { owner, name } = request;
        let requested = DatabaseName::parse(name).map_err(|err| invalid_name("name", &err))?;
        let sanitized =
            sanitize_identifier(requested.as_str()).map_err(|err| invalid_identifier("name", &err))?;

        if self
            .catalog
            .database_name_exists(sanitized.as_str())
            .await
            .map_err(map_catalog_error)?
        {
            return Err(Error::conflict("database name already taken").with_details(
                json!({ "field": "name", "code": "name_taken" }),
            ));
        }

        let created = self
            .engine
            .create_database(sanitized.as_str())
            .await
            .map_err(map_engine_error)?;

        let record = NewManagedDatabase {
            owner_user_id: owner,
            pg_database_name: created.as_str().to_owned(),
        };
        let database = self.catalog.record_database(record).await.map_err(|err| {
            error!(
                critical = true,
                database = created.as_str(),
                error = %err,
                "database provisioned but catalog write failed; manual cleanup required"
            );
            map_catalog_error(err)
        })?;
        info!(database_id = %database.id, database = %database.pg_database_name, "database provisioned");
        Ok(database)
    }

    async fn soft_delete_database(
        &self,
        owner: &AppUserId,
        database_id: &DatabaseId,
    ) -> Result<SoftDeleteOutcome, Error> {
        let mut database = self.owned_database(owner, database_id).await?;
        if database.status == DatabaseStatus::SoftDeleted {
            return Ok(SoftDeleteOutcome {
                database,
                already_soft_deleted: true,
            });
        }

        let usernames: Vec<String> = self
            .catalog
            .list_users_for_database(&database.id)
            .await
            .map_err(map_catalog_error)?
            .into_iter()
            .map(|user| user.pg_username)
            .collect();

        self.engine
            .soft_delete_database(&database.pg_database_name, &usernames)
            .await
            .map_err(map_engine_error)?;

        self.catalog
            .update_database_status(&database.id, DatabaseStatus::SoftDeleted)
            .await
            .map_err(map_catalog_error)?;
        self.catalog
            .update_user_status_for_database(&database.id, PgUserStatus::DeactivatedDbSoftDeleted)
            .await
            .map_err(map_catalog_error)?;

        database.status = DatabaseStatus::SoftDeleted;
        database.updated_at = Utc::now();
        info!(database_id = %database.id, users = usernames.len(), "database soft-deleted");
        Ok(SoftDeleteOutcome {
            database,
            already_soft_deleted: false,
        })
    }

    async fn create_user(&self, request: CreatePgUserRequest) -> Result<CreatedPgUser, Error> {
        let CreatePgUserRequest {
            owner,
            database_id,
            username,
            permission_level,
        } = request;
        let database = self.owned_database(&owner, &database_id).await?;
        if !database.is_active() {
            return Err(Error::conflict("database is not active").with_details(json!({
                "code": "database_inactive",
                "status": database.status,
            })));
        }

        let username =
            PgUsername::parse(username).map_err(|err| invalid_name("username", &err))?;
        let taken = || {
            Error::conflict("username already taken")
                .with_details(json!({ "field": "username", "code": "username_taken" }))
        };
        if self
            .catalog
            .username_exists_in_database(&database.id, username.as_str())
            .await
            .map_err(map_catalog_error)?
        {
            return Err(taken());
        }
        // Login names are cluster-wide, so another tenant may already hold it.
        if self
            .engine
            .role_exists(username.as_str())
            .await
            .map_err(map_engine_error)?
        {
            return Err(taken());
        }

        let password = self
            .engine
            .create_user(
                &database.pg_database_name,
                username.as_str(),
                permission_level,
            )
            .await
            .map_err(map_engine_error)?;

        let record = NewManagedPgUser {
            managed_database_id: database.id,
            pg_username: username.as_str().to_owned(),
            permission_level,
        };
        match self.catalog.record_user(record).await {
            Ok(user) => {
                info!(
                    database_id = %database.id,
                    pg_user_id = %user.id,
                    level = %permission_level,
                    "database user provisioned"
                );
                Ok(CreatedPgUser { user, password })
            }
            Err(err) => {
                error!(error = %err, username = username.as_str(), "recording database user failed");
                self.compensate_unrecorded_user(&database.pg_database_name, username.as_str())
                    .await;
                Err(map_catalog_error(err))
            }
        }
    }

    async fn regenerate_password(
        &self,
        owner: &AppUserId,
        database_id: &DatabaseId,
        user_id: &PgUserId,
    ) -> Result<Password, Error> {
        let (database, user) = self.owned_user(owner, database_id, user_id).await?;
        if user.status != PgUserStatus::Active {
            return Err(Error::conflict("database user is not active").with_details(json!({
                "code": "user_inactive",
                "status": user.status,
            })));
        }
        let password = self
            .engine
            .regenerate_password(&database.pg_database_name, &user.pg_username)
            .await
            .map_err(map_engine_error)?;
        info!(pg_user_id = %user.id, "database user password rotated");
        Ok(password)
    }

    async fn delete_user(
        &self,
        owner: &AppUserId,
        database_id: &DatabaseId,
        user_id: &PgUserId,
    ) -> Result<(), Error> {
        let (database, user) = self.owned_user(owner, database_id, user_id).await?;
        self.engine
            .delete_user(&database.pg_database_name, &user.pg_username)
            .await
            .map_err(map_engine_error)?;
        self.catalog
            .delete_user(&user.id)
            .await
            .map_err(map_catalog_error)?;
        info!(pg_user_id = %user.id, "database user deleted");
        Ok(())
    }
}

#[async_trait]
impl<C, E> TenantQuery for TenantService<C, E>
where
    C: CatalogRepository,
    E: ProvisioningEngine,
{
    async fn list_databases(&self, owner: &AppUserId) -> Result<Vec<ManagedDatabase>, Error> {
        self.catalog
            .list_databases_for_owner(owner)
            .await
            .map_err(map_catalog_error)
    }

    async fn get_database(
        &self,
        owner: &AppUserId,
        database_id: &DatabaseId,
    ) -> Result<ManagedDatabase, Error> {
        self.owned_database(owner, database_id).await
    }

    async fn list_users(
        &self,
        owner: &AppUserId,
        database_id: &DatabaseId,
    ) -> Result<Vec<ManagedPgUser>, Error> {
        let database = self.owned_database(owner, database_id).await?;
        self.catalog
            .list_users_for_database(&database.id)
            .await
            .map_err(map_catalog_error)
    }
}

#[cfg(test)]
#[path = "tenant_service_tests.rs"]
mod tests;
