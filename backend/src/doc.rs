//! OpenAPI documentation for the tenant API.
//!
//! [`ApiDoc`] registers every HTTP endpoint and the two ways a caller can be
//! identified: the session cookie and, behind an authenticating proxy, the
//! trusted identity header. Swagger UI serves it in debug builds and the
//! `openapi-dump` binary exports it for tooling.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{DatabaseStatus, Error, ErrorCode, PermissionLevel, PgUserStatus};
use crate::inbound::http::databases::{CreateDatabaseBody, DatabaseResponse, SoftDeleteResponse};
use crate::inbound::http::me::MeResponse;
use crate::inbound::http::pg_users::{
    CreatePgUserBody, CreatedPgUserResponse, PasswordResponse, PgUserResponse,
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Private session cookie pinned on the first authenticated request.",
            ))),
        );
        components.add_security_scheme(
            "TrustedHeader",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                "X-Forwarded-Email",
                "Caller email asserted by an authenticating proxy; the header name is deployment specific.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "pgtenant API",
        description = "Self-service provisioning of isolated PostgreSQL databases and login users."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = []), ("TrustedHeader" = [])),
    paths(
        crate::inbound::http::me::current_user,
        crate::inbound::http::me::logout,
        crate::inbound::http::databases::create_database,
        crate::inbound::http::databases::list_databases,
        crate::inbound::http::databases::get_database,
        crate::inbound::http::databases::soft_delete_database,
        crate::inbound::http::pg_users::create_pg_user,
        crate::inbound::http::pg_users::list_pg_users,
        crate::inbound::http::pg_users::regenerate_password,
        crate::inbound::http::pg_users::delete_pg_user,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        DatabaseStatus,
        PermissionLevel,
        PgUserStatus,
        CreateDatabaseBody,
        DatabaseResponse,
        SoftDeleteResponse,
        CreatePgUserBody,
        PgUserResponse,
        CreatedPgUserResponse,
        PasswordResponse,
        MeResponse,
    )),
    tags(
        (name = "databases", description = "Tenant database lifecycle"),
        (name = "pgusers", description = "Login users inside tenant databases"),
        (name = "users", description = "The calling application user"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
