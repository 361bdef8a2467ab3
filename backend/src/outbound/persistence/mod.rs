//! PostgreSQL persistence adapters for the tenant catalog using Diesel ORM.
//!
//! The catalog lives in its own database, reached through a `diesel-async`
//! connection pool managed by `bb8`. Cluster-level DDL is not issued here;
//! see [`super::postgres_admin`].
//!
//! - **Thin adapters**: repositories only translate between Diesel rows and
//!   domain records.
//! - **Internal models**: `models.rs` and `schema.rs` never leak into the
//!   domain.
//! - **Strongly typed errors**: Diesel failures map onto the port error
//!   enums; raw SQL never appears in them.
//!
//! # Example
//!
//! ```ignore
//! use pgtenant::outbound::persistence::{DbPool, DieselCatalogRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/pgtenant")).await?;
//! let catalog = DieselCatalogRepository::new(pool);
//! ```

mod diesel_application_user_repository;
mod diesel_catalog_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_application_user_repository::DieselApplicationUserRepository;
pub use diesel_catalog_repository::DieselCatalogRepository;
pub use migrations::{MigrationError, run_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
