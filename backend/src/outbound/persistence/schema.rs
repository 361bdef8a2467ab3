//! Diesel table definitions for the tenant catalog.
//!
//! These definitions must match `migrations/` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Callers of the API, registered on first authenticated request.
    application_users (id) {
        id -> Uuid,
        /// OIDC subject when the identity provider supplied one.
        oidc_sub -> Nullable<Text>,
        email -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Tenant databases provisioned in the cluster.
    managed_databases (id) {
        id -> Uuid,
        owner_user_id -> Uuid,
        /// Sanitised cluster database name (max 63 bytes).
        pg_database_name -> Varchar,
        /// `active` or `soft_deleted`.
        status -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Login users provisioned inside tenant databases.
    managed_pg_users (id) {
        id -> Uuid,
        managed_database_id -> Uuid,
        pg_username -> Varchar,
        /// `read` or `write`.
        permission_level -> Text,
        /// `active` or `deactivated_db_soft_deleted`.
        status -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(managed_databases -> application_users (owner_user_id));
diesel::joinable!(managed_pg_users -> managed_databases (managed_database_id));

diesel::allow_tables_to_appear_in_same_query!(
    application_users,
    managed_databases,
    managed_pg_users,
);
