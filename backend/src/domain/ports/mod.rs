//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (implemented by outbound adapters): [`CatalogRepository`],
//! [`ApplicationUserRepository`], [`ProvisioningEngine`]. Driving ports
//! (implemented by domain services, called by inbound adapters):
//! [`TenantCommand`], [`TenantQuery`].

mod macros;
pub(crate) use macros::define_port_error;

mod application_user_repository;
mod catalog_repository;
mod provisioning_engine;
mod tenant_command;
mod tenant_query;

#[cfg(test)]
pub use application_user_repository::MockApplicationUserRepository;
pub use application_user_repository::{ApplicationUserRepository, ApplicationUserRepositoryError};
#[cfg(test)]
pub use catalog_repository::MockCatalogRepository;
pub use catalog_repository::{CatalogRepository, CatalogRepositoryError};
#[cfg(test)]
pub use provisioning_engine::MockProvisioningEngine;
pub use provisioning_engine::{ProvisioningEngine, ProvisioningError};
#[cfg(test)]
pub use tenant_command::MockTenantCommand;
pub use tenant_command::{
    CreateDatabaseRequest, CreatePgUserRequest, CreatedPgUser, SoftDeleteOutcome, TenantCommand,
};
#[cfg(test)]
pub use tenant_query::MockTenantQuery;
pub use tenant_query::TenantQuery;
