use std::sync::{Arc, OnceLock};
use std::time::Duration;

use anyhow::{Context, anyhow};
use serde::Deserialize;
use sqlx::{
    PgPool, Postgres,
    postgres::{PgArguments, PgConnectOptions, PgPoolOptions, PgSslMode},
    query::Query,
    types::Json,
};

use crate::DOCUMENTS_TABLE_NAME;

#[derive(Clone, Debug)]
pub struct Database {
    database_pool: PgPool,
    database_schema: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub db: String,
    pub schema: String,
    pub credentials: DatabaseCredentials,
    pub connection: DatabaseConnection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConnection {
    pub min_connections: u32,
    pub max_connections: u32,
    pub acquire_timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseCredentials {
    pub username: String,
    pub password: String,
}

fn default_port() -> u16 {
    5432
}

static DATABASE: OnceLock<Arc<Database>> = OnceLock::new();

pub async fn connect(settings: &DatabaseSettings) -> Result<&'static Database, anyhow::Error> {
    let database = Database::new(settings).await?;
    DATABASE
        .set(Arc::new(database))
        .map_err(|_| anyhow!("database is already connected"))?;
    DATABASE
        .get()
        .map(Arc::as_ref)
        .ok_or_else(|| anyhow!("database connection is not initialised"))
}

/// One statement of a migration or seed transaction.
#[derive(Debug, Clone)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<SqlParameter>,
}

impl Statement {
    pub fn ddl(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    pub fn with_params(sql: impl Into<String>, params: Vec<SqlParameter>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }
}

// SQL parameter that will be bound to query
#[derive(Debug, Clone)]
pub enum SqlParameter {
    Text(String),
    Json(serde_json::Value),
}

impl SqlParameter {
    /// Bind to sqlx query
    pub fn bind_to_query<'q>(
        self,
        query: Query<'q, Postgres, PgArguments>,
    ) -> Query<'q, Postgres, PgArguments> {
        match self {
            SqlParameter::Text(s) => query.bind(s),
            SqlParameter::Json(v) => query.bind(Json(v)),
        }
    }
}

impl Database {
    async fn new(settings: &DatabaseSettings) -> Result<Self, anyhow::Error> {
        let credentials = &settings.credentials;
        let pg_connect_options = PgConnectOptions::new()
            .host(&settings.host)
            .port(settings.port)
            .username(&credentials.username)
            .password(&credentials.password)
            .database(&settings.db)
            .ssl_mode(PgSslMode::Prefer);

        let connection = &settings.connection;
        let pool = PgPoolOptions::new()
            .min_connections(connection.min_connections)
            .max_connections(connection.max_connections)
            .acquire_timeout(Duration::from_secs(connection.acquire_timeout_seconds))
            .connect_with(pg_connect_options)
            .await
            .with_context(|| {
                format!(
                    "failed to open database at {}/{}",
                    settings.host, settings.db
                )
            })?;

        Ok(Self {
            database_pool: pool,
            database_schema: settings.schema.to_owned(),
        })
    }

    pub async fn execute_in_transaction(
        &self,
        statements: Vec<Statement>,
        ctx: &'static str,
    ) -> Result<(), anyhow::Error> {
        let mut transaction = self
            .database_pool
            .begin()
            .await
            .context(format!("failed to start {} transaction", ctx))?;

        tracing::info!("{}", ctx);

        for statement in statements {
            tracing::debug!("{}", statement.sql);

            let mut query = sqlx::query(&statement.sql);
            for param in statement.params {
                query = param.bind_to_query(query);
            }
            query
                .execute(&mut *transaction)
                .await
                .context(format!("failed to execute {} query", ctx))?;
        }

        transaction
            .commit()
            .await
            .context(format!("failed to commit {} transaction", ctx))?;

        Ok(())
    }

    pub fn database_pool(&self) -> &PgPool {
        &self.database_pool
    }

    pub fn database_schema(&self) -> &str {
        &self.database_schema
    }

    /// Schema-qualified, quoted name of the document table.
    pub fn documents_table(&self) -> String {
        qualified_documents_table(&self.database_schema)
    }
}

pub fn qualified_documents_table(schema: &str) -> String {
    format!("\"{}\".\"{}\"", schema, DOCUMENTS_TABLE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_table_is_schema_qualified() {
        assert_eq!(
            qualified_documents_table("public"),
            "\"public\".\"coursegate_documents\""
        );
    }
}
