//! HTTP inbound adapter exposing the tenant REST API.
//!
//! [`configure`] registers every `/api/v1` route along with the JSON and path
//! extractor settings that turn malformed input into `invalid_request`
//! errors. Health probes are mounted separately at the application root.

use actix_web::web;

pub mod auth;
pub mod databases;
pub mod error;
pub mod health;
pub mod me;
pub mod pg_users;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;

pub use error::ApiResult;

/// Largest accepted JSON body; every request payload is a handful of fields.
const JSON_LIMIT_BYTES: usize = 16 * 1024;

/// Register the API routes on a scope such as `web::scope("/api/v1")`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .limit(JSON_LIMIT_BYTES)
            .error_handler(error::json_error_handler),
    )
    .app_data(web::PathConfig::default().error_handler(error::path_error_handler))
    .service(me::current_user)
    .service(me::logout)
    .service(databases::create_database)
    .service(databases::list_databases)
    .service(databases::get_database)
    .service(databases::soft_delete_database)
    .service(pg_users::create_pg_user)
    .service(pg_users::list_pg_users)
    .service(pg_users::regenerate_password)
    .service(pg_users::delete_pg_user);
}
