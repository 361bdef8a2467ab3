//! Operator CLI driving the provisioning engine directly.
//!
//! Bypasses the catalog, so anything created here is invisible to the API.
//! Generated passwords are printed to stdout exactly once.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result, eyre};
use ortho_config::OrthoConfig;
use tokio::runtime::Builder;

use pgtenant::config::AppSettings;
use pgtenant::domain::PermissionLevel;
use pgtenant::domain::ports::ProvisioningEngine;
use pgtenant::outbound::postgres_admin::PostgresProvisioningEngine;

/// `provision` command arguments.
#[derive(Debug, Parser)]
#[command(
    name = "provision",
    about = "Create and retire tenant databases and logins without the HTTP API",
    version
)]
struct CliArgs {
    /// Admin connection string. Falls back to `PGTENANT_ADMIN_DSN`.
    #[arg(long = "admin-dsn", value_name = "dsn")]
    admin_dsn: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create a hardened database with its read and write roles.
    CreateDatabase { name: String },
    /// Create a login bound to the database's read or write role.
    CreateUser {
        database: String,
        username: String,
        #[arg(long, value_enum, default_value_t = Level::Read)]
        level: Level,
    },
    /// Rotate a login's password.
    RegeneratePassword { database: String, username: String },
    /// Drop a login and the objects it owns.
    DeleteUser { database: String, username: String },
    /// Revoke all access to a database while keeping its data.
    SoftDeleteDatabase {
        database: String,
        /// Logins whose access is revoked.
        #[arg(long = "user", value_name = "username")]
        users: Vec<String>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Level {
    Read,
    Write,
}

impl From<Level> for PermissionLevel {
    fn from(value: Level) -> Self {
        match value {
            Level::Read => Self::Read,
            Level::Write => Self::Write,
        }
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = CliArgs::parse();
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("create Tokio runtime")?;
    runtime.block_on(run(args))
}

fn build_engine(admin_dsn: Option<String>) -> Result<PostgresProvisioningEngine> {
    let mut settings = AppSettings::load_from_iter([OsString::from("provision")])
        .map_err(|error| eyre!("invalid configuration: {error}"))?;
    if admin_dsn.is_some() {
        settings.admin_dsn = admin_dsn;
    }
    let config = settings.engine_config().wrap_err("invalid configuration")?;
    PostgresProvisioningEngine::new(config).wrap_err("invalid provisioning settings")
}

async fn run(args: CliArgs) -> Result<()> {
    let engine = build_engine(args.admin_dsn)?;
    match args.command {
        Command::CreateDatabase { name } => {
            let created = engine
                .create_database(&name)
                .await
                .wrap_err("create database")?;
            println!("database={created}");
        }
        Command::CreateUser {
            database,
            username,
            level,
        } => {
            let password = engine
                .create_user(&database, &username, level.into())
                .await
                .wrap_err("create user")?;
            println!("username={username}");
            println!("password={}", password.expose());
        }
        Command::RegeneratePassword { database, username } => {
            let password = engine
                .regenerate_password(&database, &username)
                .await
                .wrap_err("regenerate password")?;
            println!("password={}", password.expose());
        }
        Command::DeleteUser { database, username } => {
            engine
                .delete_user(&database, &username)
                .await
                .wrap_err("delete user")?;
            println!("deleted={username}");
        }
        Command::SoftDeleteDatabase { database, users } => {
            engine
                .soft_delete_database(&database, &users)
                .await
                .wrap_err("soft-delete database")?;
            println!("soft_deleted={database}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    //! Unit tests for CLI parsing.

    use super::*;
    use rstest::rstest;

    #[rstest]
    fn create_user_defaults_to_read() {
        let args = CliArgs::try_parse_from(["provision", "create-user", "acme", "alice"])
            .expect("arguments should parse");
        match args.command {
            Command::CreateUser { level, .. } => {
                assert_eq!(PermissionLevel::from(level), PermissionLevel::Read);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[rstest]
    fn soft_delete_collects_repeated_users() {
        let args = CliArgs::try_parse_from([
            "provision",
            "--admin-dsn",
            "postgres://admin@db/postgres",
            "soft-delete-database",
            "acme",
            "--user",
            "alice",
            "--user",
            "bob",
        ])
        .expect("arguments should parse");
        assert_eq!(args.admin_dsn.as_deref(), Some("postgres://admin@db/postgres"));
        match args.command {
            Command::SoftDeleteDatabase { database, users } => {
                assert_eq!(database, "acme");
                assert_eq!(users, ["alice", "bob"]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[rstest]
    fn unknown_level_is_rejected() {
        let result =
            CliArgs::try_parse_from(["provision", "create-user", "acme", "alice", "--level", "admin"]);
        assert!(result.is_err());
    }
}
