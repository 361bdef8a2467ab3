//! Shared helpers for integration tests against an embedded cluster.
//!
//! Each suite under `backend/tests/` compiles as its own crate and pulls this
//! module in with `mod support;`. Not every suite uses every helper.
#![allow(dead_code, reason = "helpers are shared by several test crates")]

pub mod cluster_skip;
pub mod embedded_postgres;
pub mod pg_embed;

pub use cluster_skip::handle_cluster_setup_failure;
pub use embedded_postgres::EmbeddedCluster;

/// Render a `postgres` error with enough detail to be useful in CI logs.
///
/// The `Display` implementation collapses server errors to `db error`, which
/// hides the message and SQLSTATE.
pub fn format_postgres_error(error: &postgres::Error) -> String {
    let Some(db_error) = error.as_db_error() else {
        return error.to_string();
    };

    let mut summary = format!(
        "postgres error {}: {}",
        db_error.code().code(),
        db_error.message()
    );
    if let Some(detail) = db_error.detail() {
        summary.push_str("; detail: ");
        summary.push_str(detail);
    }
    summary
}

/// SQLSTATE of a failed `postgres` call, if the server reported one.
pub fn sqlstate(error: &postgres::Error) -> Option<&str> {
    error.code().map(postgres::error::SqlState::code)
}
