//! Login user HTTP handlers.
//!
//! ```text
//! POST   /api/v1/databases/{database_id}/pgusers
//! GET    /api/v1/databases/{database_id}/pgusers
//! POST   /api/v1/databases/{database_id}/pgusers/{user_id}/regenerate-password
//! DELETE /api/v1/databases/{database_id}/pgusers/{user_id}
//! ```
//!
//! Passwords appear only in the responses that create or rotate them, and
//! those responses are marked `no-store`.

use actix_web::http::header;
use actix_web::{HttpResponse, delete, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::CreatePgUserRequest;
use crate::domain::{
    DatabaseId, Error, ManagedPgUser, PermissionLevel, PgUserId, PgUserStatus,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::state::HttpState;

/// Request payload for provisioning a login.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePgUserBody {
    /// 3-63 characters, starting with a letter, of `a-z`, `0-9` and `_`.
    #[schema(example = "alice")]
    pub username: String,
    pub permission_level: PermissionLevel,
}

/// A login as recorded in the catalog.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PgUserResponse {
    pub id: PgUserId,
    pub database_id: DatabaseId,
    pub username: String,
    pub permission_level: PermissionLevel,
    pub status: PgUserStatus,
    pub created_at: String,
}

impl From<ManagedPgUser> for PgUserResponse {
    fn from(value: ManagedPgUser) -> Self {
        Self {
            id: value.id,
            database_id: value.managed_database_id,
            username: value.pg_username,
            permission_level: value.permission_level,
            status: value.status,
            created_at: value.created_at.to_rfc3339(),
        }
    }
}

/// A freshly provisioned login with its one-time password.
#[derive(Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatedPgUserResponse {
    pub id: PgUserId,
    pub username: String,
    pub permission_level: PermissionLevel,
    /// Shown once; it is not stored and cannot be retrieved again.
    pub password: String,
}

/// A rotated password.
#[derive(Serialize, Deserialize, ToSchema)]
pub struct PasswordResponse {
    /// Shown once; it is not stored and cannot be retrieved again.
    pub password: String,
}

fn no_store(mut builder: actix_web::HttpResponseBuilder) -> actix_web::HttpResponseBuilder {
    builder.insert_header((header::CACHE_CONTROL, "no-store"));
    builder
}

/// Provision a login bound to the database's read or write role.
#[utoipa::path(
    post,
    path = "/api/v1/databases/{database_id}/pgusers",
    params(("database_id" = Uuid, Path, description = "Database identifier")),
    request_body = CreatePgUserBody,
    responses(
        (status = 201, description = "Login provisioned", body = CreatedPgUserResponse),
        (status = 400, description = "Invalid username", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Database not found", body = Error),
        (status = 409, description = "Username taken or database inactive", body = Error),
        (status = 503, description = "Cluster unavailable", body = Error)
    ),
    tags = ["pgusers"],
    operation_id = "createPgUser"
)]
#[post("/databases/{database_id}/pgusers")]
pub async fn create_pg_user(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<DatabaseId>,
    payload: web::Json<CreatePgUserBody>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let created = state
        .tenants
        .create_user(CreatePgUserRequest {
            owner: *caller.id(),
            database_id: path.into_inner(),
            username: body.username,
            permission_level: body.permission_level,
        })
        .await?;

    Ok(no_store(HttpResponse::Created()).json(CreatedPgUserResponse {
        id: created.user.id,
        username: created.user.pg_username,
        permission_level: created.user.permission_level,
        password: created.password.expose().to_owned(),
    }))
}

/// List the logins of one of the caller's databases.
#[utoipa::path(
    get,
    path = "/api/v1/databases/{database_id}/pgusers",
    params(("database_id" = Uuid, Path, description = "Database identifier")),
    responses(
        (status = 200, description = "Logins, oldest first", body = [PgUserResponse]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Database not found", body = Error)
    ),
    tags = ["pgusers"],
    operation_id = "listPgUsers"
)]
#[get("/databases/{database_id}/pgusers")]
pub async fn list_pg_users(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<DatabaseId>,
) -> ApiResult<web::Json<Vec<PgUserResponse>>> {
    let users = state
        .tenants_query
        .list_users(caller.id(), &path.into_inner())
        .await?;
    Ok(web::Json(users.into_iter().map(PgUserResponse::from).collect()))
}

/// Rotate a login's password.
#[utoipa::path(
    post,
    path = "/api/v1/databases/{database_id}/pgusers/{user_id}/regenerate-password",
    params(
        ("database_id" = Uuid, Path, description = "Database identifier"),
        ("user_id" = Uuid, Path, description = "Login identifier")
    ),
    responses(
        (status = 200, description = "New password", body = PasswordResponse),
        (status = 400, description = "Login belongs to another database", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 409, description = "Login is deactivated", body = Error)
    ),
    tags = ["pgusers"],
    operation_id = "regeneratePgUserPassword"
)]
#[post("/databases/{database_id}/pgusers/{user_id}/regenerate-password")]
pub async fn regenerate_password(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<(DatabaseId, PgUserId)>,
) -> ApiResult<HttpResponse> {
    let (database_id, user_id) = path.into_inner();
    let password = state
        .tenants
        .regenerate_password(caller.id(), &database_id, &user_id)
        .await?;
    Ok(no_store(HttpResponse::Ok()).json(PasswordResponse {
        password: password.expose().to_owned(),
    }))
}

/// Drop a login.
#[utoipa::path(
    delete,
    path = "/api/v1/databases/{database_id}/pgusers/{user_id}",
    params(
        ("database_id" = Uuid, Path, description = "Database identifier"),
        ("user_id" = Uuid, Path, description = "Login identifier")
    ),
    responses(
        (status = 204, description = "Login dropped"),
        (status = 400, description = "Login belongs to another database", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["pgusers"],
    operation_id = "deletePgUser"
)]
#[delete("/databases/{database_id}/pgusers/{user_id}")]
pub async fn delete_pg_user(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<(DatabaseId, PgUserId)>,
) -> ApiResult<HttpResponse> {
    let (database_id, user_id) = path.into_inner();
    state
        .tenants
        .delete_user(caller.id(), &database_id, &user_id)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "pg_users_tests.rs"]
mod tests;
