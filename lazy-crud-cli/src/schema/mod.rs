//! Database schema introspection
//!
//! The generator only needs three questions answered: which tables exist,
//! whether a given table exists, and what columns a table has. Each backend
//! answers them from its own catalog.

use anyhow::{bail, Context, Result};
use sqlx::mysql::MySqlPoolOptions;
use sqlx::postgres::PgPoolOptions;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{MySqlPool, PgPool, Row, SqlitePool};

/// Tables holding migration bookkeeping rather than application data
pub const MIGRATION_TABLES: [&str; 3] = ["migrations", "_sqlx_migrations", "seaql_migrations"];

/// A column as reported by the database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    /// Column name
    pub name: String,
    /// Raw type name (`varchar(255)`, `INTEGER`, `timestamp with time zone`)
    pub data_type: String,
    /// Accepts NULL
    pub nullable: bool,
    /// Part of the primary key
    pub primary_key: bool,
}

/// A table and its columns, in declaration order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    /// Table name
    pub name: String,
    /// Columns
    pub columns: Vec<ColumnInfo>,
}

impl TableSchema {
    /// Look up a column
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ColumnInfo> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// The primary key column, falling back to `id`
    #[must_use]
    pub fn primary_key(&self) -> Option<&ColumnInfo> {
        self.columns
            .iter()
            .find(|c| c.primary_key)
            .or_else(|| self.column("id"))
    }
}

/// Schema reader over a connection pool
#[derive(Debug, Clone)]
pub enum SchemaInspector {
    /// SQLite
    Sqlite(SqlitePool),
    /// PostgreSQL (current schema)
    Postgres(PgPool),
    /// MySQL or MariaDB (current database)
    MySql(MySqlPool),
}

impl SchemaInspector {
    /// Connect with the backend named by the URL scheme
    pub async fn connect(url: &str) -> Result<Self> {
        let scheme = url.split(':').next().unwrap_or_default();
        let inspector = match scheme {
            "sqlite" => Self::Sqlite(
                SqlitePoolOptions::new()
                    .max_connections(1)
                    .connect(url)
                    .await
                    .context("Failed to connect to SQLite database")?,
            ),
            "postgres" | "postgresql" => Self::Postgres(
                PgPoolOptions::new()
                    .max_connections(1)
                    .connect(url)
                    .await
                    .context("Failed to connect to PostgreSQL database")?,
            ),
            "mysql" | "mariadb" => Self::MySql(
                MySqlPoolOptions::new()
                    .max_connections(1)
                    .connect(url)
                    .await
                    .context("Failed to connect to MySQL database")?,
            ),
            other => bail!("Unsupported database URL scheme '{other}'. Use sqlite:, postgres: or mysql:"),
        };
        tracing::debug!(backend = scheme, "connected for schema inspection");
        Ok(inspector)
    }

    /// All table names, sorted
    pub async fn tables(&self) -> Result<Vec<String>> {
        let names = match self {
            Self::Sqlite(pool) => sqlx::query(
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
            )
            .fetch_all(pool)
            .await?
            .iter()
            .map(|row| row.try_get::<String, _>("name"))
            .collect::<Result<Vec<_>, _>>()?,
            Self::Postgres(pool) => sqlx::query(
                "SELECT table_name::text AS name FROM information_schema.tables \
                 WHERE table_schema = current_schema() AND table_type = 'BASE TABLE' ORDER BY table_name",
            )
            .fetch_all(pool)
            .await?
            .iter()
            .map(|row| row.try_get::<String, _>("name"))
            .collect::<Result<Vec<_>, _>>()?,
            Self::MySql(pool) => sqlx::query(
                "SELECT CAST(TABLE_NAME AS CHAR) AS name FROM information_schema.TABLES \
                 WHERE TABLE_SCHEMA = DATABASE() AND TABLE_TYPE = 'BASE TABLE' ORDER BY TABLE_NAME",
            )
            .fetch_all(pool)
            .await?
            .iter()
            .map(|row| row.try_get::<String, _>("name"))
            .collect::<Result<Vec<_>, _>>()?,
        };
        Ok(names)
    }

    /// Application tables, without migration bookkeeping
    pub async fn application_tables(&self) -> Result<Vec<String>> {
        Ok(self
            .tables()
            .await?
            .into_iter()
            .filter(|name| !MIGRATION_TABLES.contains(&name.as_str()))
            .collect())
    }

    /// Whether a table exists
    pub async fn table_exists(&self, table: &str) -> Result<bool> {
        Ok(self.tables().await?.iter().any(|name| name == table))
    }

    /// Columns of a table in declaration order
    pub async fn columns(&self, table: &str) -> Result<Vec<ColumnInfo>> {
        let columns = match self {
            Self::Sqlite(pool) => sqlx::query(
                "SELECT name, type, \"notnull\", pk FROM pragma_table_info(?1) ORDER BY cid",
            )
            .bind(table)
            .fetch_all(pool)
            .await?
            .iter()
            .map(|row| {
                Ok(ColumnInfo {
                    name: row.try_get("name")?,
                    data_type: row.try_get("type")?,
                    nullable: row.try_get::<i64, _>("notnull")? == 0,
                    primary_key: row.try_get::<i64, _>("pk")? > 0,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()?,
            Self::Postgres(pool) => sqlx::query(
                "SELECT c.column_name::text AS name, c.data_type::text AS data_type, \
                        c.is_nullable = 'YES' AS nullable, \
                        EXISTS ( \
                            SELECT 1 FROM information_schema.table_constraints tc \
                            JOIN information_schema.key_column_usage k \
                              ON k.constraint_name = tc.constraint_name AND k.table_schema = tc.table_schema \
                            WHERE tc.constraint_type = 'PRIMARY KEY' AND tc.table_schema = c.table_schema \
                              AND tc.table_name = c.table_name AND k.column_name = c.column_name \
                        ) AS primary_key \
                 FROM information_schema.columns c \
                 WHERE c.table_schema = current_schema() AND c.table_name = $1 \
                 ORDER BY c.ordinal_position",
            )
            .bind(table)
            .fetch_all(pool)
            .await?
            .iter()
            .map(|row| {
                Ok(ColumnInfo {
                    name: row.try_get("name")?,
                    data_type: row.try_get("data_type")?,
                    nullable: row.try_get("nullable")?,
                    primary_key: row.try_get("primary_key")?,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()?,
            Self::MySql(pool) => sqlx::query(
                "SELECT CAST(COLUMN_NAME AS CHAR) AS name, CAST(COLUMN_TYPE AS CHAR) AS data_type, \
                        CAST(IS_NULLABLE = 'YES' AS SIGNED) AS nullable, \
                        CAST(COLUMN_KEY = 'PRI' AS SIGNED) AS primary_key \
                 FROM information_schema.COLUMNS \
                 WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ? \
                 ORDER BY ORDINAL_POSITION",
            )
            .bind(table)
            .fetch_all(pool)
            .await?
            .iter()
            .map(|row| {
                Ok(ColumnInfo {
                    name: row.try_get("name")?,
                    data_type: row.try_get("data_type")?,
                    nullable: row.try_get::<i64, _>("nullable")? != 0,
                    primary_key: row.try_get::<i64, _>("primary_key")? != 0,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()?,
        };
        Ok(columns)
    }

    /// A table with its columns
    pub async fn table(&self, table: &str) -> Result<TableSchema> {
        let columns = self
            .columns(table)
            .await
            .with_context(|| format!("Failed to read columns of {table}"))?;
        Ok(TableSchema {
            name: table.to_string(),
            columns,
        })
    }

    /// Every application table with its columns
    pub async fn schemas(&self) -> Result<Vec<TableSchema>> {
        let mut schemas = Vec::new();
        for name in self.application_tables().await? {
            schemas.push(self.table(&name).await?);
        }
        Ok(schemas)
    }
}
