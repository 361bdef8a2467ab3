//! Tenant database HTTP handlers.
//!
//! ```text
//! POST   /api/v1/databases
//! GET    /api/v1/databases
//! GET    /api/v1/databases/{database_id}
//! DELETE /api/v1/databases/{database_id}
//! ```

use actix_web::{HttpResponse, delete, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::CreateDatabaseRequest;
use crate::domain::{DatabaseId, DatabaseStatus, Error, ManagedDatabase};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::state::HttpState;

/// Request payload for provisioning a database.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDatabaseBody {
    /// Requested name: 3-63 characters of `a-z`, `0-9`, `_` and `-`.
    #[schema(example = "acme-prod")]
    pub name: String,
}

/// A tenant database as returned to its owner.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseResponse {
    pub id: DatabaseId,
    /// Name of the database inside the cluster.
    #[schema(example = "acme_prod")]
    pub pg_name: String,
    pub status: DatabaseStatus,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ManagedDatabase> for DatabaseResponse {
    fn from(value: ManagedDatabase) -> Self {
        Self {
            id: value.id,
            pg_name: value.pg_database_name,
            status: value.status,
            created_at: value.created_at.to_rfc3339(),
            updated_at: value.updated_at.to_rfc3339(),
        }
    }
}

/// Outcome of a soft-delete request.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SoftDeleteResponse {
    pub database: DatabaseResponse,
    /// True when the database had already been soft-deleted.
    pub already_soft_deleted: bool,
}

/// Provision a new tenant database owned by the caller.
#[utoipa::path(
    post,
    path = "/api/v1/databases",
    request_body = CreateDatabaseBody,
    responses(
        (status = 201, description = "Database provisioned", body = DatabaseResponse),
        (status = 400, description = "Invalid name", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 409, description = "Name already taken", body = Error),
        (status = 500, description = "Provisioning failed", body = Error),
        (status = 503, description = "Cluster unavailable", body = Error)
    ),
    tags = ["databases"],
    operation_id = "createDatabase"
)]
#[post("/databases")]
pub async fn create_database(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    payload: web::Json<CreateDatabaseBody>,
) -> ApiResult<HttpResponse> {
    let database = state
        .tenants
        .create_database(CreateDatabaseRequest {
            owner: *caller.id(),
            name: payload.into_inner().name,
        })
        .await?;
    Ok(HttpResponse::Created().json(DatabaseResponse::from(database)))
}

/// List the caller's databases, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/databases",
    responses(
        (status = 200, description = "Owned databases", body = [DatabaseResponse]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 503, description = "Catalog unavailable", body = Error)
    ),
    tags = ["databases"],
    operation_id = "listDatabases"
)]
#[get("/databases")]
pub async fn list_databases(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
) -> ApiResult<web::Json<Vec<DatabaseResponse>>> {
    let databases = state.tenants_query.list_databases(caller.id()).await?;
    Ok(web::Json(
        databases.into_iter().map(DatabaseResponse::from).collect(),
    ))
}

/// Fetch one of the caller's databases.
#[utoipa::path(
    get,
    path = "/api/v1/databases/{database_id}",
    params(("database_id" = Uuid, Path, description = "Database identifier")),
    responses(
        (status = 200, description = "Database", body = DatabaseResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["databases"],
    operation_id = "getDatabase"
)]
#[get("/databases/{database_id}")]
pub async fn get_database(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<DatabaseId>,
) -> ApiResult<web::Json<DatabaseResponse>> {
    let database = state
        .tenants_query
        .get_database(caller.id(), &path.into_inner())
        .await?;
    Ok(web::Json(DatabaseResponse::from(database)))
}

/// Revoke all access to a database while keeping its data.
#[utoipa::path(
    delete,
    path = "/api/v1/databases/{database_id}",
    params(("database_id" = Uuid, Path, description = "Database identifier")),
    responses(
        (status = 200, description = "Database soft-deleted", body = SoftDeleteResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Revocation failed", body = Error),
        (status = 503, description = "Cluster unavailable", body = Error)
    ),
    tags = ["databases"],
    operation_id = "softDeleteDatabase"
)]
#[delete("/databases/{database_id}")]
pub async fn soft_delete_database(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<DatabaseId>,
) -> ApiResult<web::Json<SoftDeleteResponse>> {
    let outcome = state
        .tenants
        .soft_delete_database(caller.id(), &path.into_inner())
        .await?;
    Ok(web::Json(SoftDeleteResponse {
        database: DatabaseResponse::from(outcome.database),
        already_soft_deleted: outcome.already_soft_deleted,
    }))
}

#[cfg(test)]
#[path = "databases_tests.rs"]
mod tests;
