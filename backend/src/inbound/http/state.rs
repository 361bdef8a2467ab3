//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and only depend on domain ports,
//! so they stay testable without a cluster.

use std::sync::Arc;

use actix_web::http::header::HeaderName;

use crate::domain::ports::{ApplicationUserRepository, TenantCommand, TenantQuery};

/// Parameter object bundling the port implementations handlers use.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub tenants: Arc<dyn TenantCommand>,
    pub tenants_query: Arc<dyn TenantQuery>,
    pub app_users: Arc<dyn ApplicationUserRepository>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub tenants: Arc<dyn TenantCommand>,
    pub tenants_query: Arc<dyn TenantQuery>,
    pub app_users: Arc<dyn ApplicationUserRepository>,
    /// Header set by an authenticating proxy, carrying the caller's email.
    pub trusted_header: Option<HeaderName>,
}

impl HttpState {
    pub fn new(ports: HttpStatePorts) -> Self {
        Self {
            tenants: ports.tenants,
            tenants_query: ports.tenants_query,
            app_users: ports.app_users,
            trusted_header: None,
        }
    }

    /// Accept identities asserted by `header`.
    #[must_use]
    pub fn with_trusted_header(mut self, header: HeaderName) -> Self {
        self.trusted_header = Some(header);
        self
    }
}
