//! Privileged PostgreSQL adapter for tenant provisioning.
//!
//! Unlike [`super::persistence`], which keeps a long-lived Diesel pool for
//! the catalog, this adapter talks to the cluster through `sqlx` with
//! short-lived administrative sessions, since it issues DDL that cannot run
//! inside transactions (`CREATE DATABASE`) or be parameterised (`CREATE
//! USER ... PASSWORD`).
//!
//! - `connection`: DSN derivation and bounded administrative pools.
//! - `statements`: the single DDL builder; accepts only sanitised identifiers.
//! - `engine`: [`PostgresProvisioningEngine`], the saga-style port
//!   implementation.

mod connection;
mod engine;
mod error_mapping;
mod statements;

pub use connection::{
    ACQUIRE_TIMEOUT, AdminConnection, ConnectionError, MAX_CONNECTIONS, MAX_LIFETIME,
    MIN_CONNECTIONS, derive_dsn,
};
pub use engine::{DEFAULT_EXTENSIONS, EngineConfig, PostgresProvisioningEngine};
