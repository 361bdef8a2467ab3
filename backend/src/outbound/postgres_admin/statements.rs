//! The DDL/DCL builder for tenant provisioning.
//!
//! PostgreSQL cannot bind identifiers or `CREATE USER` passwords as query
//! parameters, so every provisioning statement is assembled here. Builders
//! only accept [`SqlIdentifier`] and [`Password`]; raw strings never reach
//! the text of a statement. Identifiers are always emitted double-quoted, so
//! reserved words such as `user` or `table` are valid tenant names.

use std::fmt;

use zeroize::Zeroizing;

use crate::domain::{Password, SqlIdentifier};

/// The only schema tenant roles share.
pub const PUBLIC_SCHEMA: &str = "public";

/// A password could not be rendered as a string literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("password contains a NUL byte")]
pub struct LiteralError;

/// An identifier rendered as a quoted SQL identifier.
///
/// Sanitised identifiers never contain `"`, so no escaping is needed.
struct Quoted<'a>(&'a SqlIdentifier);

impl fmt::Display for Quoted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", self.0.as_str())
    }
}

const fn q(identifier: &SqlIdentifier) -> Quoted<'_> {
    Quoted(identifier)
}

/// Schema targeted by default privileges.
#[derive(Debug, Clone, Copy)]
pub enum Schema<'a> {
    /// The shared `public` schema.
    Public,
    /// A login's personal schema.
    Personal(&'a SqlIdentifier),
}

impl fmt::Display for Schema<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public => f.write_str(PUBLIC_SCHEMA),
            Self::Personal(owner) => q(owner).fmt(f),
        }
    }
}

/// Quote `value` as a standard-conforming SQL string literal.
fn quote_literal(value: &str) -> Result<Zeroizing<String>, LiteralError> {
    if value.contains('\0') {
        return Err(LiteralError);
    }
    let mut quoted = Zeroizing::new(String::with_capacity(value.len() + 2));
    quoted.push('\'');
    for ch in value.chars() {
        if ch == '\'' {
            quoted.push('\'');
        }
        quoted.push(ch);
    }
    quoted.push('\'');
    Ok(quoted)
}

fn role_list(roles: &[&SqlIdentifier]) -> String {
    roles
        .iter()
        .map(|role| q(role).to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn database_exists() -> &'static str {
    "SELECT EXISTS (SELECT 1 FROM pg_database WHERE datname = $1)"
}

pub fn role_exists() -> &'static str {
    "SELECT EXISTS (SELECT 1 FROM pg_roles WHERE rolname = $1)"
}

pub fn create_database(database: &SqlIdentifier) -> String {
    format!("CREATE DATABASE {}", q(database))
}

/// Drop a database even when sessions are still attached.
pub fn drop_database(database: &SqlIdentifier) -> String {
    format!("DROP DATABASE IF EXISTS {} WITH (FORCE)", q(database))
}

pub fn revoke_connect_from_public(database: &SqlIdentifier) -> String {
    format!("REVOKE CONNECT ON DATABASE {} FROM PUBLIC", q(database))
}

pub fn revoke_public_schema_from_public() -> String {
    format!("REVOKE ALL ON SCHEMA {PUBLIC_SCHEMA} FROM PUBLIC")
}

pub fn create_extension(extension: &SqlIdentifier) -> String {
    format!("CREATE EXTENSION IF NOT EXISTS {}", q(extension))
}

pub fn create_role(role: &SqlIdentifier) -> String {
    format!("CREATE ROLE {} NOLOGIN", q(role))
}

pub fn drop_role(role: &SqlIdentifier) -> String {
    format!("DROP ROLE IF EXISTS {}", q(role))
}

pub fn grant_connect(database: &SqlIdentifier, roles: &[&SqlIdentifier]) -> String {
    format!(
        "GRANT CONNECT ON DATABASE {} TO {}",
        q(database),
        role_list(roles)
    )
}

pub fn revoke_connect(database: &SqlIdentifier, roles: &[&SqlIdentifier]) -> String {
    format!(
        "REVOKE CONNECT ON DATABASE {} FROM {}",
        q(database),
        role_list(roles)
    )
}

pub fn grant_public_schema_usage(roles: &[&SqlIdentifier]) -> String {
    format!("GRANT USAGE ON SCHEMA {PUBLIC_SCHEMA} TO {}", role_list(roles))
}

pub fn grant_public_schema_create(role: &SqlIdentifier) -> String {
    format!("GRANT CREATE ON SCHEMA {PUBLIC_SCHEMA} TO {}", q(role))
}

/// Grants on objects that already exist in `public` for the read role.
pub fn grant_existing_read(role: &SqlIdentifier) -> [String; 2] {
    let role = q(role);
    [
        format!("GRANT SELECT ON ALL TABLES IN SCHEMA {PUBLIC_SCHEMA} TO {role}"),
        format!("GRANT USAGE, SELECT ON ALL SEQUENCES IN SCHEMA {PUBLIC_SCHEMA} TO {role}"),
    ]
}

/// Grants on objects that already exist in `public` for the write role.
pub fn grant_existing_write(role: &SqlIdentifier) -> [String; 2] {
    let role = q(role);
    [
        format!("GRANT ALL ON ALL TABLES IN SCHEMA {PUBLIC_SCHEMA} TO {role}"),
        format!("GRANT ALL ON ALL SEQUENCES IN SCHEMA {PUBLIC_SCHEMA} TO {role}"),
    ]
}

pub fn grant_membership_to_current_user(role: &SqlIdentifier) -> String {
    format!("GRANT {} TO CURRENT_USER", q(role))
}

pub fn revoke_membership_from_current_user(role: &SqlIdentifier) -> String {
    format!("REVOKE {} FROM CURRENT_USER", q(role))
}

/// Default privileges on objects `creator` makes in `schema`: read access for
/// `reader`, full access for each of `writers`.
pub fn default_privileges(
    creator: &SqlIdentifier,
    schema: Schema<'_>,
    reader: &SqlIdentifier,
    writers: &[&SqlIdentifier],
) -> Vec<String> {
    let prefix = format!(
        "ALTER DEFAULT PRIVILEGES FOR ROLE {} IN SCHEMA {schema}",
        q(creator)
    );
    let reader = q(reader);
    let writers = role_list(writers);
    vec![
        format!("{prefix} GRANT SELECT ON TABLES TO {reader}"),
        format!("{prefix} GRANT USAGE, SELECT ON SEQUENCES TO {reader}"),
        format!("{prefix} GRANT ALL ON TABLES TO {writers}"),
        format!("{prefix} GRANT ALL ON SEQUENCES TO {writers}"),
    ]
}

/// `CREATE USER` with an inline password literal.
///
/// # Errors
/// [`LiteralError`] when the password cannot be quoted.
pub fn create_user(
    user: &SqlIdentifier,
    password: &Password,
) -> Result<Zeroizing<String>, LiteralError> {
    let literal = quote_literal(password.expose())?;
    Ok(Zeroizing::new(format!(
        "CREATE USER {} WITH PASSWORD {}",
        q(user),
        literal.as_str()
    )))
}

/// `ALTER USER` with an inline password literal.
///
/// # Errors
/// [`LiteralError`] when the password cannot be quoted.
pub fn alter_user_password(
    user: &SqlIdentifier,
    password: &Password,
) -> Result<Zeroizing<String>, LiteralError> {
    let literal = quote_literal(password.expose())?;
    Ok(Zeroizing::new(format!(
        "ALTER USER {} WITH PASSWORD {}",
        q(user),
        literal.as_str()
    )))
}

pub fn grant_role(role: &SqlIdentifier, user: &SqlIdentifier) -> String {
    format!("GRANT {} TO {}", q(role), q(user))
}

pub fn revoke_roles(roles: &[&SqlIdentifier], user: &SqlIdentifier) -> String {
    format!("REVOKE {} FROM {}", role_list(roles), q(user))
}

pub fn drop_user(user: &SqlIdentifier) -> String {
    format!("DROP USER IF EXISTS {}", q(user))
}

pub fn drop_owned(user: &SqlIdentifier) -> String {
    format!("DROP OWNED BY {}", q(user))
}

pub fn create_personal_schema(user: &SqlIdentifier) -> String {
    let user = q(user);
    format!("CREATE SCHEMA {user} AUTHORIZATION {user}")
}

pub fn grant_personal_schema(user: &SqlIdentifier) -> String {
    let user = q(user);
    format!("GRANT ALL ON SCHEMA {user} TO {user}")
}

pub fn grant_schema_usage(schema: &SqlIdentifier, roles: &[&SqlIdentifier]) -> String {
    format!("GRANT USAGE ON SCHEMA {} TO {}", q(schema), role_list(roles))
}

pub fn set_search_path(user: &SqlIdentifier, database: &SqlIdentifier) -> String {
    let (user, database) = (q(user), q(database));
    format!(
        "ALTER ROLE {user} IN DATABASE {database} SET search_path TO {user}, {database}, {PUBLIC_SCHEMA}"
    )
}

pub fn revoke_public_tables(user: &SqlIdentifier) -> String {
    format!(
        "REVOKE ALL ON ALL TABLES IN SCHEMA {PUBLIC_SCHEMA} FROM {}",
        q(user)
    )
}

pub fn revoke_public_schema(user: &SqlIdentifier) -> String {
    format!("REVOKE ALL ON SCHEMA {PUBLIC_SCHEMA} FROM {}", q(user))
}
