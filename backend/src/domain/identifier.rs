//! Safe SQL identifiers for PostgreSQL DDL.
//!
//! PostgreSQL cannot bind identifiers (database, role, schema names) as query
//! parameters, so every identifier interpolated into DDL must come out of
//! [`sanitize_identifier`]. The resulting [`SqlIdentifier`] is the only type
//! the statement builder accepts.
//!
//! The policy is strict: names whose normalised form does not begin with an
//! ASCII letter are rejected rather than rewritten.

use std::fmt;

/// Maximum identifier length PostgreSQL keeps without truncation (`NAMEDATALEN - 1`).
pub const MAX_IDENTIFIER_LEN: usize = 63;

/// Reasons a raw name cannot become a SQL identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentifierError {
    /// Nothing usable remained after normalisation.
    #[error("identifier is empty after sanitisation")]
    Empty,
    /// The normalised name starts with a digit or underscore.
    #[error("identifier must start with a letter")]
    InvalidStart,
    /// A derived name would exceed the PostgreSQL identifier limit.
    #[error("identifier exceeds {MAX_IDENTIFIER_LEN} bytes")]
    TooLong,
}

/// An identifier matching `^[a-z][a-z0-9_]{0,62}$`.
///
/// Only [`sanitize_identifier`] and [`SqlIdentifier::suffixed`] construct
/// values, so holding one proves the text needs no escaping inside a
/// double-quoted identifier. Reserved words such as `user` pass the
/// sanitiser, so statement builders must always quote it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SqlIdentifier(String);

impl SqlIdentifier {
    /// Borrow the identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Derive `{self}_{suffix}`, e.g. the `_read` and `_write` role names.
    ///
    /// Unlike user input, derived names are never truncated: a name that
    /// would overflow fails instead of colliding with a shorter sibling.
    ///
    /// # Errors
    /// Returns [`IdentifierError::TooLong`] when the composed name exceeds
    /// [`MAX_IDENTIFIER_LEN`], or any sanitiser error for the suffix.
    pub fn suffixed(&self, suffix: &str) -> Result<Self, IdentifierError> {
        let composed = format!("{}_{suffix}", self.0);
        if composed.len() > MAX_IDENTIFIER_LEN {
            return Err(IdentifierError::TooLong);
        }
        let sanitized = sanitize_identifier(&composed)?;
        if sanitized.0 == composed {
            Ok(sanitized)
        } else {
            Err(IdentifierError::InvalidStart)
        }
    }
}

impl fmt::Display for SqlIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SqlIdentifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Normalise arbitrary input into a safe identifier.
///
/// Lowercases, maps `-` and space to `_`, drops anything outside
/// `[a-z0-9_]`, rejects a non-letter start, truncates to 63 bytes and trims
/// trailing underscores.
///
/// # Errors
/// [`IdentifierError::Empty`] when nothing usable remains,
/// [`IdentifierError::InvalidStart`] when the result does not begin with a
/// letter.
///
/// # Examples
/// ```
/// use pgtenant::domain::sanitize_identifier;
///
/// let id = sanitize_identifier("Acme-Prod DB").expect("valid");
/// assert_eq!(id.as_str(), "acme_prod_db");
/// assert!(sanitize_identifier("1st").is_err());
/// ```
pub fn sanitize_identifier(raw: &str) -> Result<SqlIdentifier, IdentifierError> {
    let mut normalised: String = raw
        .chars()
        .flat_map(char::to_lowercase)
        .map(|c| if c == '-' || c == ' ' { '_' } else { c })
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_')
        .collect();

    match normalised.chars().next() {
        None => return Err(IdentifierError::Empty),
        Some(first) if !first.is_ascii_lowercase() => return Err(IdentifierError::InvalidStart),
        Some(_) => {}
    }

    // Only ASCII survives the filter, so byte truncation is char-safe.
    normalised.truncate(MAX_IDENTIFIER_LEN);
    let trimmed_len = normalised.trim_end_matches('_').len();
    normalised.truncate(trimmed_len);

    if is_safe_identifier(&normalised) {
        Ok(SqlIdentifier(normalised))
    } else {
        Err(IdentifierError::Empty)
    }
}

fn is_safe_identifier(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    let starts_with_letter = chars.next().is_some_and(|c| c.is_ascii_lowercase());
    starts_with_letter
        && candidate.len() <= MAX_IDENTIFIER_LEN
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}
