//! Service configuration loaded via OrthoConfig.
//!
//! Values come from `PGTENANT_*` environment variables, matching command-line
//! flags, or a configuration file. Session cookie settings are handled
//! separately by [`crate::inbound::http::session_config`].

use std::net::SocketAddr;

use actix_web::http::header::HeaderName;
use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::DEFAULT_PASSWORD_LENGTH;
use crate::outbound::postgres_admin::{DEFAULT_EXTENSIONS, EngineConfig};

/// Address the HTTP server binds to when none is configured.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Errors raised while validating loaded settings.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required setting: {name}")]
    Missing { name: &'static str },
    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Settings controlling the service and the operator CLI.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "PGTENANT")]
pub struct AppSettings {
    /// Connection string of the privileged login used for provisioning.
    pub admin_dsn: Option<String>,
    /// Connection string of the catalog database. Falls back to `admin_dsn`.
    pub database_url: Option<String>,
    /// Header carrying the caller's email, set by an authenticating proxy.
    pub trusted_header: Option<String>,
    /// Socket address for the HTTP listener.
    pub bind_addr: Option<String>,
    /// Comma-separated extensions created in every new database.
    pub required_extensions: Option<String>,
    /// Length of generated passwords.
    pub password_length: Option<usize>,
}

impl AppSettings {
    /// Return the admin DSN.
    ///
    /// # Errors
    /// [`ConfigError::Missing`] when no admin DSN is configured.
    pub fn admin_dsn(&self) -> Result<&str, ConfigError> {
        self.admin_dsn
            .as_deref()
            .filter(|dsn| !dsn.trim().is_empty())
            .ok_or(ConfigError::Missing {
                name: "PGTENANT_ADMIN_DSN",
            })
    }

    /// Return the catalog DSN, falling back to the admin DSN.
    ///
    /// # Errors
    /// [`ConfigError::Missing`] when neither DSN is configured.
    pub fn database_url(&self) -> Result<&str, ConfigError> {
        match self.database_url.as_deref() {
            Some(url) if !url.trim().is_empty() => Ok(url),
            _ => self.admin_dsn(),
        }
    }

    /// Parse the trusted identity header name, if configured.
    ///
    /// # Errors
    /// [`ConfigError::Invalid`] when the value is not a valid header name.
    pub fn trusted_header(&self) -> Result<Option<HeaderName>, ConfigError> {
        let Some(raw) = self.trusted_header.as_deref().map(str::trim) else {
            return Ok(None);
        };
        if raw.is_empty() {
            return Ok(None);
        }
        HeaderName::try_from(raw)
            .map(Some)
            .map_err(|err| ConfigError::Invalid {
                name: "PGTENANT_TRUSTED_HEADER",
                reason: err.to_string(),
            })
    }

    /// Parse the bind address.
    ///
    /// # Errors
    /// [`ConfigError::Invalid`] when the value is not a socket address.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.trim().parse().map_err(|_| ConfigError::Invalid {
            name: "PGTENANT_BIND_ADDR",
            reason: format!("'{raw}' is not a socket address"),
        })
    }

    /// Extensions to create in new databases. An empty value disables them.
    pub fn required_extensions(&self) -> Vec<String> {
        match self.required_extensions.as_deref() {
            Some(list) => list
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_owned)
                .collect(),
            None => DEFAULT_EXTENSIONS.iter().map(|s| (*s).to_owned()).collect(),
        }
    }

    /// Length of generated passwords.
    ///
    /// # Errors
    /// [`ConfigError::Invalid`] when the configured length is zero.
    pub fn password_length(&self) -> Result<usize, ConfigError> {
        match self.password_length {
            Some(0) => Err(ConfigError::Invalid {
                name: "PGTENANT_PASSWORD_LENGTH",
                reason: "must be at least 1".to_owned(),
            }),
            Some(length) => Ok(length),
            None => Ok(DEFAULT_PASSWORD_LENGTH),
        }
    }

    /// Build the provisioning engine settings.
    ///
    /// # Errors
    /// Propagates [`ConfigError`] from the admin DSN and password length.
    pub fn engine_config(&self) -> Result<EngineConfig, ConfigError> {
        Ok(EngineConfig::new(self.admin_dsn()?)
            .with_required_extensions(self.required_extensions())
            .with_password_length(self.password_length()?))
    }
}
