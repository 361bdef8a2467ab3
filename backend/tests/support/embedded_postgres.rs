//! Embedded cluster wrapper shared by the provisioning and catalog suites.
//!
//! Cluster state is inspected with the synchronous `postgres` client so the
//! assertions do not depend on the adapters under test. Call these helpers
//! outside any Tokio runtime.

use std::str::FromStr;

use pg_embedded_setup_unpriv::TestCluster;
use pgtenant::outbound::persistence::run_migrations;
use postgres::{Client, Config, NoTls};
use uuid::Uuid;

use super::format_postgres_error;
use super::pg_embed::test_cluster;

/// A running cluster plus its superuser connection string.
pub struct EmbeddedCluster {
    admin_dsn: String,
    cluster: TestCluster,
}

impl EmbeddedCluster {
    /// Start a fresh cluster.
    pub fn start() -> Result<Self, String> {
        let cluster = test_cluster()?;
        let admin_dsn = cluster.connection().database_url("postgres").to_string();
        Ok(Self {
            admin_dsn,
            cluster,
        })
    }

    /// Superuser DSN targeting the `postgres` maintenance database.
    pub fn admin_dsn(&self) -> &str {
        &self.admin_dsn
    }

    fn config(&self) -> Result<Config, String> {
        Config::from_str(&self.admin_dsn).map_err(|err| format_postgres_error(&err))
    }

    /// Superuser connection to `database`.
    pub fn admin_client(&self, database: &str) -> Result<Client, String> {
        let mut config = self.config()?;
        config.dbname(database);
        config.connect(NoTls).map_err(|err| format_postgres_error(&err))
    }

    /// Connect to `database` as a tenant login.
    pub fn connect_as(
        &self,
        database: &str,
        user: &str,
        password: &str,
    ) -> Result<Client, postgres::Error> {
        let mut config = Config::from_str(&self.admin_dsn)?;
        config.dbname(database).user(user).password(password);
        config.connect(NoTls)
    }

    /// Create an empty database with a unique name and return its DSN.
    pub fn create_database(&self) -> Result<String, String> {
        let name = format!("catalog_{}", Uuid::new_v4().simple());
        let mut client = self.admin_client("postgres")?;
        client
            .batch_execute(&format!("CREATE DATABASE {name}"))
            .map_err(|err| format_postgres_error(&err))?;
        Ok(self.cluster.connection().database_url(&name).to_string())
    }

    /// Create a catalog database with every migration applied.
    pub fn create_catalog(&self) -> Result<String, String> {
        let url = self.create_database()?;
        run_migrations(&url).map_err(|err| err.to_string())?;
        Ok(url)
    }

    /// Whether a database with this exact name exists.
    pub fn database_exists(&self, name: &str) -> Result<bool, String> {
        self.exists("SELECT EXISTS (SELECT 1 FROM pg_database WHERE datname = $1)", name)
    }

    /// Whether a role with this exact name exists.
    pub fn role_exists(&self, name: &str) -> Result<bool, String> {
        self.exists("SELECT EXISTS (SELECT 1 FROM pg_roles WHERE rolname = $1)", name)
    }

    /// Whether the role may log in.
    pub fn role_can_login(&self, name: &str) -> Result<bool, String> {
        let mut client = self.admin_client("postgres")?;
        let row = client
            .query_one("SELECT rolcanlogin FROM pg_roles WHERE rolname = $1", &[&name])
            .map_err(|err| format_postgres_error(&err))?;
        Ok(row.get(0))
    }

    /// Create a login that belongs to no tenant.
    pub fn create_outsider(&self, name: &str, password: &str) -> Result<(), String> {
        let mut client = self.admin_client("postgres")?;
        client
            .batch_execute(&format!("CREATE USER {name} WITH PASSWORD '{password}'"))
            .map_err(|err| format_postgres_error(&err))
    }

    fn exists(&self, sql: &str, name: &str) -> Result<bool, String> {
        let mut client = self.admin_client("postgres")?;
        let row = client
            .query_one(sql, &[&name])
            .map_err(|err| format_postgres_error(&err))?;
        Ok(row.get(0))
    }
}
