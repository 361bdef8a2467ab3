//! Domain primitives, ports and use-cases.
//!
//! Purpose: describe tenants (application users, their databases and the
//! logins inside them) independently of HTTP and PostgreSQL. Inbound adapters
//! call the driving ports; outbound adapters implement the driven ports.
//!
//! Public surface:
//! - Error (alias to `error::Error`): API error response payload.
//! - SqlIdentifier / sanitize_identifier: the only path to DDL identifiers.
//! - Password / generate_password: one-time login credentials.
//! - TenantService: implementation of the tenant command and query ports.

pub mod credentials;
pub mod error;
pub mod identifier;
pub mod names;
pub mod ports;
pub mod tenant;
pub mod tenant_service;
pub mod trace_id;

pub use self::credentials::{
    DEFAULT_PASSWORD_LENGTH, PASSWORD_ALPHABET, Password, PasswordError, generate_password,
};
pub use self::error::{Error, ErrorCode};
pub use self::identifier::{IdentifierError, MAX_IDENTIFIER_LEN, SqlIdentifier, sanitize_identifier};
pub use self::names::{DatabaseName, NAME_MAX, NAME_MIN, NameValidationError, PgUsername};
pub use self::tenant::{
    AppUserId, ApplicationUser, DatabaseId, DatabaseStatus, ManagedDatabase, ManagedPgUser,
    NewManagedDatabase, NewManagedPgUser, ParseEnumError, PermissionLevel, PgUserId, PgUserStatus,
};
pub use self::tenant_service::TenantService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use pgtenant::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
