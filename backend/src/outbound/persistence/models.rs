//! Internal Diesel row structs for the tenant catalog.
//!
//! These types never leave the persistence layer; repositories convert them
//! to domain records, validating enum columns on the way out.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{application_users, managed_databases, managed_pg_users};

/// Row struct for reading from the application_users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = application_users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ApplicationUserRow {
    pub id: Uuid,
    pub oidc_sub: Option<String>,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for registering a caller.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = application_users)]
pub(crate) struct NewApplicationUserRow<'a> {
    pub id: Uuid,
    pub email: &'a str,
}

/// Row struct for reading from the managed_databases table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = managed_databases)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ManagedDatabaseRow {
    pub id: Uuid,
    pub owner_user_id: Uuid,
    pub pg_database_name: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for recording a provisioned database.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = managed_databases)]
pub(crate) struct NewManagedDatabaseRow<'a> {
    pub id: Uuid,
    pub owner_user_id: Uuid,
    pub pg_database_name: &'a str,
    pub status: &'a str,
}

/// Row struct for reading from the managed_pg_users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = managed_pg_users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ManagedPgUserRow {
    pub id: Uuid,
    pub managed_database_id: Uuid,
    pub pg_username: String,
    pub permission_level: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for recording a provisioned login.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = managed_pg_users)]
pub(crate) struct NewManagedPgUserRow<'a> {
    pub id: Uuid,
    pub managed_database_id: Uuid,
    pub pg_username: &'a str,
    pub permission_level: &'a str,
    pub status: &'a str,
}
