//! # Database Pool Management
//!
//! Connection pool creation and configuration for SQLite.
//!
//! The repository itself only ever receives a ready [`SqlitePool`]. This
//! module is the caller-side convenience for getting one: the seed tool and
//! the test suite use it, services with their own pool skip it.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Database Connection Pool                           │
//! │                                                                         │
//! │  DbConfig::new(path) / from_env() / in_memory()                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::new(config).await ← Create pool + provision schema          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────┐                           │
//! │  │            SqlitePool                    │                           │
//! │  │  ┌─────┐ ┌─────┐ ┌─────┐ ┌─────┐       │                           │
//! │  │  │Conn1│ │Conn2│ │Conn3│ │Conn4│ ...   │  (max_connections)        │
//! │  │  └─────┘ └─────┘ └─────┘ └─────┘       │                           │
//! │  └─────────────────────────────────────────┘                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  db.products() ──► SqlProductRepository (clone of the pool handle)     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## WAL Mode
//! File-backed databases are opened in WAL (Write-Ahead Logging) mode so
//! readers don't block writers.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::SqlProductRepository;

const IN_MEMORY: &str = ":memory:";

// =============================================================================
// Configuration
// =============================================================================

/// Where the `products` table lives and how its pool is sized.
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::new("/var/lib/pantry/products.db")
///     .max_connections(2)
///     .run_migrations(false);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// SQLite file, or `:memory:` for a private throwaway database.
    pub database_path: PathBuf,

    /// Pool ceiling (5). In-memory configs pin this to 1 so every
    /// statement sees the same database.
    pub max_connections: u32,

    pub min_connections: u32,

    /// How long `store`, reads and `delete` wait for a free connection (30s).
    /// `update` waits at most until its `OpContext` fires.
    pub connect_timeout: Duration,

    pub idle_timeout: Duration,

    /// Apply `migrations/sqlite` in `Database::new` (true).
    pub run_migrations: bool,
}

impl DbConfig {
    /// Config for a file database, created on first connect.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            run_migrations: true,
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Bounds the pool wait for operations that take no `OpContext`.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Turn off for callers that manage the `products` schema themselves.
    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// A private single-connection database that disappears with its pool.
    ///
    /// Two pools built from this config never share rows.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(IN_MEMORY),
            max_connections: 1,
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(60),
            run_migrations: true,
        }
    }

    /// Loads configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |---|---|
    /// | `PANTRY_DATABASE_PATH` | `./pantry.db` |
    /// | `PANTRY_DB_MAX_CONNECTIONS` | `5` |
    /// | `PANTRY_DB_CONNECT_TIMEOUT_SECS` | `30` |
    pub fn from_env() -> DbResult<Self> {
        let path = env::var("PANTRY_DATABASE_PATH").unwrap_or_else(|_| "./pantry.db".to_string());

        let max_connections: u32 = env::var("PANTRY_DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "5".to_string())
            .parse()
            .map_err(|_| DbError::InvalidConfig("PANTRY_DB_MAX_CONNECTIONS".to_string()))?;

        let connect_timeout_secs: u64 = env::var("PANTRY_DB_CONNECT_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .map_err(|_| DbError::InvalidConfig("PANTRY_DB_CONNECT_TIMEOUT_SECS".to_string()))?;

        Ok(DbConfig::new(path)
            .max_connections(max_connections)
            .connect_timeout(Duration::from_secs(connect_timeout_secs)))
    }

    fn is_in_memory(&self) -> bool {
        self.database_path == Path::new(IN_MEMORY)
    }

    /// Builds SQLite connect options for this config.
    fn connect_options(&self) -> DbResult<SqliteConnectOptions> {
        if self.is_in_memory() {
            return SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| DbError::ConnectionFailed(e.to_string()));
        }

        let connect_url = format!("sqlite://{}?mode=rwc", self.database_path.display());

        let options = SqliteConnectOptions::from_str(&connect_url)
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
            // Readers don't block writers, writers don't block readers
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .create_if_missing(true);

        Ok(options)
    }
}

// =============================================================================
// Database
// =============================================================================

/// Database handle owning the pool.
///
/// ## Usage
/// ```rust,ignore
/// let db = Database::new(DbConfig::from_env()?).await?;
/// let repo = db.products();
/// let all = repo.get_all().await?;
/// ```
#[derive(Debug, Clone)]
pub struct Database {
    /// The SQLite connection pool.
    pool: SqlitePool,
}

impl Database {
    /// Creates a new database connection pool.
    ///
    /// ## What This Does
    /// 1. Creates the database file if it doesn't exist
    /// 2. Opens the pool (WAL mode for file databases)
    /// 3. Provisions the schema (if enabled)
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            "Initializing database connection"
        );

        let connect_options = config.connect_options()?;

        debug!("Connection options configured");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(Some(config.idle_timeout))
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        info!(
            max_connections = config.max_connections,
            "Database pool created"
        );

        let db = Database { pool };

        if config.run_migrations {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    /// Wraps a pool the caller already opened.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Database { pool }
    }

    /// Provisions the `products` table.
    ///
    /// Called by `new()` if `run_migrations` is true.
    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::run_migrations(&self.pool).await
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Returns the product repository over this pool.
    pub fn products(&self) -> SqlProductRepository {
        SqlProductRepository::new(self.pool.clone())
    }

    /// Waits for checked-out connections to return, then closes them.
    ///
    /// Repositories built from this handle share the pool, so their reads
    /// fail with `DbError::Query` and writes with the operation's variant.
    pub async fn close(&self) {
        info!("Closing database connection pool");
        self.pool.close().await;
    }

    /// `true` when a pooled connection answers `SELECT 1`.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::ProductRepository;
    use pantry_core::Product;

    #[tokio::test]
    async fn test_in_memory_database() {
        let config = DbConfig::in_memory();
        let db = Database::new(config).await.unwrap();

        assert!(db.health_check().await);
    }

    #[tokio::test]
    async fn test_config_builder() {
        let config = DbConfig::new("/tmp/test.db")
            .max_connections(10)
            .min_connections(2)
            .run_migrations(false);

        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 2);
        assert!(!config.run_migrations);
        assert!(!config.is_in_memory());
        assert!(DbConfig::in_memory().is_in_memory());
    }

    #[tokio::test]
    async fn test_in_memory_databases_are_isolated() {
        let a = Database::new(DbConfig::in_memory()).await.unwrap();
        let b = Database::new(DbConfig::in_memory()).await.unwrap();

        a.products()
            .store(Product::new("crema", "manos", 10, 40.0))
            .await
            .unwrap();

        assert_eq!(a.products().get_all().await.unwrap().len(), 1);
        assert!(b.products().get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_file_database_persists_across_pools() {
        let path = std::env::temp_dir().join(format!("pantry-pool-{}.db", std::process::id()));
        let _ = std::fs::remove_file(&path);

        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        let stored = db
            .products()
            .store(Product::new("yogurt", "entero", 20, 20.5))
            .await
            .unwrap();
        db.close().await;

        let reopened = Database::new(DbConfig::new(&path)).await.unwrap();
        assert_eq!(reopened.products().get_one(stored.id).await.unwrap(), stored);
        reopened.close().await;

        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{}", path.display(), suffix));
        }
    }

    #[tokio::test]
    async fn test_from_pool_shares_caller_pool() {
        let owner = Database::new(DbConfig::in_memory()).await.unwrap();
        let wrapped = Database::from_pool(owner.pool().clone());

        let stored = owner
            .products()
            .store(Product::new("crema", "manos", 10, 40.0))
            .await
            .unwrap();
        assert_eq!(wrapped.products().get_one(stored.id).await.unwrap(), stored);
    }

    #[tokio::test]
    async fn test_closed_pool_fails_reads() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.close().await;

        assert!(!db.health_check().await);

        let repo = db.products();
        assert!(matches!(repo.get_all().await, Err(DbError::Query(_))));
        assert!(matches!(
            repo.store(pantry_core::Product::new("crema", "manos", 10, 40.0)).await,
            Err(DbError::Insert(_))
        ));
    }
}
