//! Translate `sqlx` failures into provisioning errors.
//!
//! Descriptions produced here are safe to log: they carry the SQLSTATE and
//! server message but never the statement text or connection string.

use crate::domain::ports::ProvisioningError;

/// `duplicate_database`
pub const DUPLICATE_DATABASE: &str = "42P04";
/// `duplicate_object`, raised for existing roles.
pub const DUPLICATE_OBJECT: &str = "42710";
/// `undefined_object`, raised for missing roles.
pub const UNDEFINED_OBJECT: &str = "42704";
/// `unique_violation`. Concurrent `CREATE DATABASE` or `CREATE ROLE` calls
/// for the same name trip the system catalog indexes with this instead of
/// the duplicate-object states.
pub const UNIQUE_VIOLATION: &str = "23505";

/// SQLSTATE of a server-side error, if any.
pub fn sqlstate(error: &sqlx::Error) -> Option<String> {
    error
        .as_database_error()
        .and_then(|db| db.code().map(|code| code.into_owned()))
}

/// Whether `code` reports that the object named by a `CREATE` already
/// exists, given the state the statement raises outside a race.
pub fn is_duplicate_state(code: Option<&str>, expected: &str) -> bool {
    code.is_some_and(|code| code == expected || code == UNIQUE_VIOLATION)
}

fn is_connection_state(code: &str) -> bool {
    // 08: connection exception, 28: invalid authorization, 57P: operator
    // intervention, 53300: too many connections, 3D000: unknown database.
    code.starts_with("08")
        || code.starts_with("28")
        || code.starts_with("57P")
        || code == "53300"
        || code == "3D000"
}

/// Whether `error` means the server could not be used at all.
pub fn is_connection_failure(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => true,
        sqlx::Error::Database(db) => db.code().is_some_and(|code| is_connection_state(&code)),
        _ => false,
    }
}

/// Loggable description of `error`.
pub fn describe_sqlx_error(error: &sqlx::Error) -> String {
    match error {
        sqlx::Error::Database(db) => match db.code() {
            Some(code) => format!("{} (SQLSTATE {code})", db.message()),
            None => db.message().to_owned(),
        },
        sqlx::Error::Io(io) => format!("i/o error: {io}"),
        sqlx::Error::Tls(_) => "tls negotiation failed".to_owned(),
        sqlx::Error::PoolTimedOut => "timed out waiting for a connection".to_owned(),
        sqlx::Error::PoolClosed => "connection pool closed".to_owned(),
        sqlx::Error::Protocol(message) => format!("protocol error: {message}"),
        sqlx::Error::Configuration(_) => "invalid connection configuration".to_owned(),
        sqlx::Error::RowNotFound => "no rows returned".to_owned(),
        other => other.to_string(),
    }
}

/// Map a failed statement to a connection or provisioning error.
pub fn classify(error: &sqlx::Error, intent: &str) -> ProvisioningError {
    let description = describe_sqlx_error(error);
    if is_connection_failure(error) {
        ProvisioningError::connection(description)
    } else {
        ProvisioningError::provisioning(intent, description)
    }
}
