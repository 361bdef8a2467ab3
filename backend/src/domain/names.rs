//! Validated names accepted from API callers.
//!
//! These checks run before anything reaches PostgreSQL. The provisioning
//! engine still passes every name through the identifier sanitiser, so the
//! rules here are about giving callers clear feedback, not about SQL safety.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Minimum length for database names and usernames.
pub const NAME_MIN: usize = 3;
/// Maximum length for database names and usernames.
pub const NAME_MAX: usize = 63;

const RESERVED_DATABASE_PREFIXES: [&str; 2] = ["pg_", "postgres"];
const RESERVED_USERNAME_PREFIX: &str = "pg_";
/// Role names PostgreSQL refuses even when quoted, plus schema names a write
/// login's personal schema would collide with.
const RESERVED_USERNAMES: [&str; 6] = [
    "public",
    "none",
    "current_user",
    "current_role",
    "session_user",
    "information_schema",
];

/// Validation errors for [`DatabaseName`] and [`PgUsername`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameValidationError {
    TooShort { min: usize },
    TooLong { max: usize },
    InvalidCharacters,
    InvalidStart,
    InvalidEnd,
    ReservedPrefix { prefix: &'static str },
    ReservedName { name: &'static str },
}

impl NameValidationError {
    /// Machine-readable code used in HTTP error details.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::TooShort { .. } => "too_short",
            Self::TooLong { .. } => "too_long",
            Self::InvalidCharacters => "invalid_characters",
            Self::InvalidStart => "invalid_start",
            Self::InvalidEnd => "invalid_end",
            Self::ReservedPrefix { .. } => "reserved_prefix",
            Self::ReservedName { .. } => "reserved_name",
        }
    }
}

impl fmt::Display for NameValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooShort { min } => write!(f, "name must be at least {min} characters"),
            Self::TooLong { max } => write!(f, "name must be at most {max} characters"),
            Self::InvalidCharacters => write!(f, "name contains characters that are not allowed"),
            Self::InvalidStart => write!(f, "name starts with a character that is not allowed"),
            Self::InvalidEnd => write!(f, "name ends with a character that is not allowed"),
            Self::ReservedPrefix { prefix } => {
                write!(f, "names starting with '{prefix}' are reserved")
            }
            Self::ReservedName { name } => write!(f, "'{name}' is a reserved name"),
        }
    }
}

impl std::error::Error for NameValidationError {}

fn check_length(raw: &str) -> Result<(), NameValidationError> {
    let length = raw.chars().count();
    if length < NAME_MIN {
        return Err(NameValidationError::TooShort { min: NAME_MIN });
    }
    if length > NAME_MAX {
        return Err(NameValidationError::TooLong { max: NAME_MAX });
    }
    Ok(())
}

const fn is_lower_alnum(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit()
}

/// Requested tenant database name.
///
/// Matches `^[a-z0-9][a-z0-9_-]{1,61}[a-z0-9]$` and must not begin with
/// `pg_` or `postgres`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DatabaseName(String);

impl DatabaseName {
    /// Validate a requested database name.
    ///
    /// # Errors
    /// Returns the first rule the name breaks.
    ///
    /// # Examples
    /// ```
    /// use pgtenant::domain::DatabaseName;
    ///
    /// assert!(DatabaseName::parse("acme-prod").is_ok());
    /// assert!(DatabaseName::parse("pg_catalog2").is_err());
    /// ```
    pub fn parse(raw: impl Into<String>) -> Result<Self, NameValidationError> {
        let raw = raw.into();
        check_length(&raw)?;
        if !raw.chars().all(|c| is_lower_alnum(c) || c == '_' || c == '-') {
            return Err(NameValidationError::InvalidCharacters);
        }
        if !raw.starts_with(is_lower_alnum) {
            return Err(NameValidationError::InvalidStart);
        }
        if !raw.ends_with(is_lower_alnum) {
            return Err(NameValidationError::InvalidEnd);
        }
        if let Some(prefix) = RESERVED_DATABASE_PREFIXES
            .into_iter()
            .find(|prefix| raw.starts_with(prefix))
        {
            return Err(NameValidationError::ReservedPrefix { prefix });
        }
        Ok(Self(raw))
    }

    /// Borrow the validated name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DatabaseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for DatabaseName {
    type Error = NameValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<DatabaseName> for String {
    fn from(value: DatabaseName) -> Self {
        value.0
    }
}

/// Requested PostgreSQL login name.
///
/// Matches `^[a-z][a-z0-9_]{2,62}$`, must not begin with `pg_` and must not
/// be a role name PostgreSQL reserves. SQL keywords such as `user` are
/// allowed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PgUsername(String);

impl PgUsername {
    /// Validate a requested login name.
    ///
    /// # Errors
    /// Returns the first rule the name breaks.
    pub fn parse(raw: impl Into<String>) -> Result<Self, NameValidationError> {
        let raw = raw.into();
        check_length(&raw)?;
        if !raw.chars().all(|c| is_lower_alnum(c) || c == '_') {
            return Err(NameValidationError::InvalidCharacters);
        }
        if !raw.starts_with(|c: char| c.is_ascii_lowercase()) {
            return Err(NameValidationError::InvalidStart);
        }
        if raw.starts_with(RESERVED_USERNAME_PREFIX) {
            return Err(NameValidationError::ReservedPrefix {
                prefix: RESERVED_USERNAME_PREFIX,
            });
        }
        if let Some(name) = RESERVED_USERNAMES.into_iter().find(|name| *name == raw) {
            return Err(NameValidationError::ReservedName { name });
        }
        Ok(Self(raw))
    }

    /// Borrow the validated name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PgUsername {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PgUsername {
    type Error = NameValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<PgUsername> for String {
    fn from(value: PgUsername) -> Self {
        value.0
    }
}
