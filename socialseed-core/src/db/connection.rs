use anyhow::{Context, Result};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use std::path::Path;
use uuid::Uuid;

use super::schema::{DROP_ORDER, SCHEMA};

/// SQLite in-memory database identifier
const MEMORY_DB_PATH: &str = ":memory:";

/// Foreign keys are off by default in SQLite; every pooled connection turns them on
const CONNECTION_PRAGMAS: &str = "PRAGMA foreign_keys = ON;";

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConnection = PooledConnection<SqliteConnectionManager>;

/// Database wrapper with connection pooling support
#[derive(Clone)]
pub struct Database {
    pub pool: DbPool,
}

impl Database {
    /// Create a new database connection pool
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let manager = Self::create_connection_manager(path)?
            .with_init(|conn| conn.execute_batch(CONNECTION_PRAGMAS));
        let pool = Pool::new(manager).context("Failed to create database connection pool")?;
        Ok(Self { pool })
    }

    /// Create appropriate connection manager based on path
    ///
    /// `:memory:` maps to a uniquely named shared-cache database so every
    /// pooled connection sees the same tables.
    fn create_connection_manager<P: AsRef<Path>>(path: P) -> Result<SqliteConnectionManager> {
        let path_str = path.as_ref().to_string_lossy();
        let trimmed_path = path_str.trim();

        if trimmed_path.eq_ignore_ascii_case(MEMORY_DB_PATH) {
            let uri = format!("file:socialseed-{}?mode=memory&cache=shared", Uuid::new_v4());
            Ok(SqliteConnectionManager::file(uri))
        } else {
            Ok(SqliteConnectionManager::file(path))
        }
    }

    /// Create an in-memory database pool (useful for testing)
    pub fn in_memory() -> Result<Self> {
        Self::new(MEMORY_DB_PATH)
    }

    /// Initialize the database schema
    pub fn initialize(&self) -> Result<()> {
        let conn = self.connection()?;
        conn.execute_batch(SCHEMA)
            .context("Failed to initialize database schema")?;
        Ok(())
    }

    /// Drop every table and recreate the schema. A run is only repeatable
    /// from a clean store.
    pub fn reset(&self) -> Result<()> {
        let conn = self.connection()?;
        for table in DROP_ORDER {
            conn.execute(&format!("DROP TABLE IF EXISTS {}", table), [])
                .with_context(|| format!("Failed to drop table {}", table))?;
        }
        drop(conn);
        self.initialize()
    }

    /// Get a connection from the pool
    pub fn connection(&self) -> Result<DbConnection> {
        self.pool
            .get()
            .context("Failed to get database connection from pool")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_names(db: &Database) -> Vec<String> {
        let conn = db.connection().expect("Failed to get connection");
        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table'")
            .expect("Failed to prepare statement");
        let tables = stmt
            .query_map([], |row| row.get(0))
            .expect("Failed to query tables")
            .collect::<Result<Vec<String>, _>>()
            .expect("Failed to collect tables");
        tables
    }

    #[test]
    fn test_database_creation() {
        let db = Database::in_memory().expect("Failed to create database");
        db.initialize().expect("Failed to initialize schema");

        let tables = table_names(&db);
        for table in DROP_ORDER {
            assert!(tables.contains(&table.to_string()), "missing table {}", table);
        }
    }

    #[test]
    fn test_pooled_connections_share_memory_database() {
        let db = Database::in_memory().expect("Failed to create database");
        db.initialize().expect("Failed to initialize schema");

        let first = db.connection().expect("Failed to get first connection");
        let second = db.connection().expect("Failed to get second connection");
        let count: i64 = second
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='users'",
                [],
                |row| row.get(0),
            )
            .expect("Failed to query second connection");
        assert_eq!(count, 1);
        drop(first);
    }

    #[test]
    fn test_separate_memory_databases_are_isolated() {
        let db1 = Database::in_memory().expect("Failed to create first database");
        db1.initialize().expect("Failed to initialize schema");
        let db2 = Database::in_memory().expect("Failed to create second database");

        assert!(table_names(&db2).is_empty());
    }

    #[test]
    fn test_foreign_keys_enforced() {
        let db = Database::in_memory().expect("Failed to create database");
        db.initialize().expect("Failed to initialize schema");

        let conn = db.connection().expect("Failed to get connection");
        let result = conn.execute(
            "INSERT INTO follows (follower_id, following_id) VALUES ('a', 'b')",
            [],
        );
        assert!(result.is_err(), "dangling follow edge should be rejected");
    }

    #[test]
    fn test_reset_recreates_empty_schema() {
        let db = Database::in_memory().expect("Failed to create database");
        db.initialize().expect("Failed to initialize schema");
        {
            let conn = db.connection().expect("Failed to get connection");
            conn.execute("INSERT INTO tags (id, name) VALUES (1, 'rust')", [])
                .expect("Failed to insert tag");
        }

        db.reset().expect("Failed to reset database");

        let conn = db.connection().expect("Failed to get connection");
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM tags", [], |row| row.get(0))
            .expect("Failed to count tags");
        assert_eq!(count, 0);
    }
}
