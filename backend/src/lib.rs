//! Self-service PostgreSQL tenant provisioning.
//!
//! Authenticated application users create isolated databases on a shared
//! cluster and manage read or write logins inside them. The crate is laid out
//! hexagonally: [`domain`] holds the types, use-cases and ports, [`inbound`]
//! the HTTP adapter, and [`outbound`] the PostgreSQL adapters for the catalog
//! and for provisioning.

pub mod config;
pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
