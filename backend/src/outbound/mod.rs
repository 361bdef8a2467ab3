//! Outbound adapters implementing domain ports.
//!
//! - **persistence**: the tenant catalog, stored with Diesel.
//! - **postgres_admin**: privileged cluster DDL through `sqlx`.
//!
//! Adapters translate between domain types and infrastructure
//! representations. They contain no business rules.

pub mod persistence;
pub mod postgres_admin;
