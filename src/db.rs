use anyhow::{Context, Result};
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement, TransactionTrait,
};
use sqlx::PgPool;
use std::{path::PathBuf, time::Duration};
use tokio::fs;

pub type OrmConn = DatabaseConnection;

const MIGRATIONS_DIR: &str = "migrations";

pub async fn create_orm_conn(database_url: &str) -> Result<OrmConn> {
    let mut options = ConnectOptions::new(database_url);
    options
        .max_connections(20)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);
    let conn = Database::connect(options)
        .await
        .context("failed to connect to postgres")?;
    Ok(conn)
}

/// The sqlx pool underneath the ORM connection, for raw statements.
pub fn raw_pool(conn: &OrmConn) -> &PgPool {
    conn.get_postgres_connection_pool()
}

/// Applies every `migrations/*.sql` file not yet recorded in `schema_migrations`,
/// in filename order. Concurrent callers serialize on an advisory lock.
pub async fn run_migrations(conn: &OrmConn) -> Result<()> {
    let backend = conn.get_database_backend();
    let txn = conn.begin().await?;
    txn.execute(Statement::from_string(
        backend,
        "SELECT pg_advisory_xact_lock(824401)",
    ))
    .await?;
    txn.execute(Statement::from_string(
        backend,
        "CREATE TABLE IF NOT EXISTS schema_migrations (\
            version TEXT PRIMARY KEY, \
            applied_at TIMESTAMPTZ NOT NULL DEFAULT now())",
    ))
    .await?;

    for file in migration_files().await? {
        let Some(version) = file.file_stem().and_then(|stem| stem.to_str()) else {
            continue;
        };
        let applied = txn
            .query_one(Statement::from_sql_and_values(
                backend,
                "SELECT 1 FROM schema_migrations WHERE version = $1",
                [version.into()],
            ))
            .await?
            .is_some();
        if applied {
            continue;
        }

        let sql = fs::read_to_string(&file).await?;
        // One command per prepared statement.
        for stmt in sql.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            txn.execute(Statement::from_string(backend, format!("{stmt};")))
                .await
                .with_context(|| format!("migration {version} failed"))?;
        }
        txn.execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO schema_migrations (version) VALUES ($1)",
            [version.into()],
        ))
        .await?;
        tracing::info!(version, "migration applied");
    }

    txn.commit().await?;
    Ok(())
}

async fn migration_files() -> Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(MIGRATIONS_DIR)
        .await
        .with_context(|| format!("cannot read {MIGRATIONS_DIR}/"))?;
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "sql") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
