//! Catalog records describing provisioned tenants.
//!
//! A [`ManagedDatabase`] is one tenant database owned by an
//! [`ApplicationUser`]; each [`ManagedPgUser`] is a login bound to one of the
//! database's two roles. Plaintext credentials are deliberately absent.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Wrap an existing UUID.
            #[must_use]
            pub const fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// Generate a fresh random identifier.
            #[must_use]
            pub fn random() -> Self {
                Self(Uuid::new_v4())
            }

            /// Access the underlying UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }
    };
}

uuid_id!(
    /// Identifier of an [`ApplicationUser`].
    AppUserId
);
uuid_id!(
    /// Identifier of a [`ManagedDatabase`].
    DatabaseId
);
uuid_id!(
    /// Identifier of a [`ManagedPgUser`].
    PgUserId
);

/// Error for unrecognised persisted enum values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognised {kind} value '{value}'")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// Persisted and serialised representation.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $( Self::$variant => $text ),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $text => Ok(Self::$variant), )+
                    other => Err(ParseEnumError {
                        kind: stringify!($name),
                        value: other.to_owned(),
                    }),
                }
            }
        }
    };
}

string_enum!(
    /// Privilege tier a login user is bound to.
    PermissionLevel {
        /// Member of `{db}_read`.
        Read => "read",
        /// Member of `{db}_write`.
        Write => "write",
    }
);

string_enum!(
    /// Lifecycle of a tenant database.
    DatabaseStatus {
        /// Database is reachable by its users.
        Active => "active",
        /// All user access has been revoked; data is retained.
        SoftDeleted => "soft_deleted",
    }
);

string_enum!(
    /// Lifecycle of a login user.
    PgUserStatus {
        /// Login may connect.
        Active => "active",
        /// Access revoked because the owning database was soft-deleted.
        DeactivatedDbSoftDeleted => "deactivated_db_soft_deleted",
    }
);

impl PermissionLevel {
    /// Role suffix used for `{db}_{suffix}`.
    #[must_use]
    pub const fn role_suffix(self) -> &'static str {
        self.as_str()
    }
}

/// Person using the API, identified by email (and OIDC subject when known).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ApplicationUser {
    pub id: AppUserId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oidc_sub: Option<String>,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A provisioned tenant database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ManagedDatabase {
    pub id: DatabaseId,
    pub owner_user_id: AppUserId,
    /// Sanitised name as it exists in the cluster.
    pub pg_database_name: String,
    pub status: DatabaseStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ManagedDatabase {
    /// Whether the database still accepts new users.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == DatabaseStatus::Active
    }
}

/// A login user provisioned inside a tenant database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ManagedPgUser {
    pub id: PgUserId,
    pub managed_database_id: DatabaseId,
    pub pg_username: String,
    pub permission_level: PermissionLevel,
    pub status: PgUserStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for a new database record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewManagedDatabase {
    pub owner_user_id: AppUserId,
    pub pg_database_name: String,
}

/// Insert payload for a new login record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewManagedPgUser {
    pub managed_database_id: DatabaseId,
    pub pg_username: String,
    pub permission_level: PermissionLevel,
}
