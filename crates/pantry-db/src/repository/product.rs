//! # Product Repository (SQLite)
//!
//! Parameterized statements against the `products` table.
//!
//! ## Statement Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    One Repository Call                                  │
//! │                                                                         │
//! │  get_one(7)                                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  prepare  "SELECT ... WHERE id = ?"   (persistent = false)             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  bind 7 → execute → fetch row(s)      fail here → DbError::Query       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  finalize statement                   (not kept in the cache)          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  decode(row), NULL is an error        fail here → DbError::Scan        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Update and Cancellation
//! `update` races the whole begin / execute / commit sequence against the
//! [`OpContext`], including the wait for a pool connection. If the context
//! fires first the sequence is dropped, the transaction is dropped
//! uncommitted, and SQLite rolls it back.

use async_trait::async_trait;
use sqlx::error::UnexpectedNullError;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::context::OpContext;
use crate::error::{DbError, DbResult};
use crate::repository::ProductRepository;
use pantry_core::Product;

const ENTITY: &str = "Product";

const Q_GET_ONE: &str = "SELECT id, name, type, count, price FROM products WHERE id = ?";
const Q_GET_BY_NAME: &str =
    "SELECT id, name, type, count, price FROM products WHERE name = ? ORDER BY id LIMIT 1";
const Q_GET_ALL: &str = "SELECT id, name, type, count, price FROM products";
const Q_STORE: &str = "INSERT INTO products (name, type, count, price) VALUES (?, ?, ?, ?)";
const Q_UPDATE: &str = "UPDATE products SET name = ?, type = ?, count = ?, price = ? WHERE id = ?";
const Q_DELETE: &str = "DELETE FROM products WHERE id = ?";

/// SQLite-backed [`ProductRepository`].
///
/// Holds a pool handed in by the caller. It never opens, configures or
/// closes connections itself.
///
/// ## Usage
/// ```rust,ignore
/// let repo = SqlProductRepository::new(pool);
///
/// let stored = repo.store(Product::new("crema", "manos", 10, 40.0)).await?;
/// let same = repo.get_by_name("crema").await?;
/// ```
#[derive(Debug, Clone)]
pub struct SqlProductRepository {
    pool: SqlitePool,
}

impl SqlProductRepository {
    /// Creates a repository over an already-open pool.
    pub fn new(pool: SqlitePool) -> Self {
        SqlProductRepository { pool }
    }

    /// Runs a single-row lookup and decodes the row, if any.
    async fn fetch_one_by<'q, T>(&self, sql: &'q str, key: T) -> DbResult<Option<Product>>
    where
        T: 'q + Send + sqlx::Encode<'q, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
    {
        let row = sqlx::query(sql)
            .bind(key)
            .persistent(false)
            .fetch_optional(&self.pool)
            .await
            .map_err(DbError::Query)?;

        row.as_ref().map(decode).transpose()
    }
}

/// Maps one `products` row to the entity.
///
/// Columns are read as `Option<T>`. The SQLite driver decodes NULL into
/// `""` or `0` for plain `String`, `i64` and `f64`.
fn decode(row: &SqliteRow) -> DbResult<Product> {
    Ok(Product {
        id: column(row, "id")?,
        name: column(row, "name")?,
        kind: column(row, "type")?,
        count: column(row, "count")?,
        price: column(row, "price")?,
    })
}

/// Reads one non-null column, failing with `Scan` on NULL or a type mismatch.
fn column<'r, T>(row: &'r SqliteRow, name: &str) -> DbResult<T>
where
    T: sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
{
    row.try_get::<Option<T>, _>(name)
        .map_err(DbError::Scan)?
        .ok_or_else(|| {
            DbError::Scan(sqlx::Error::ColumnDecode {
                index: format!("{name:?}"),
                source: Box::new(UnexpectedNullError),
            })
        })
}

#[async_trait]
impl ProductRepository for SqlProductRepository {
    async fn get_all(&self) -> DbResult<Vec<Product>> {
        let rows = sqlx::query(Q_GET_ALL)
            .persistent(false)
            .fetch_all(&self.pool)
            .await
            .map_err(DbError::Query)?;

        let products = rows.iter().map(decode).collect::<DbResult<Vec<_>>>()?;

        debug!(count = products.len(), "Fetched all products");
        Ok(products)
    }

    async fn get_one(&self, id: i64) -> DbResult<Product> {
        debug!(id = %id, "Fetching product by id");

        self.fetch_one_by(Q_GET_ONE, id)
            .await?
            .ok_or_else(|| DbError::not_found(ENTITY, id))
    }

    async fn get_by_name(&self, name: &str) -> DbResult<Product> {
        debug!(name = %name, "Fetching product by name");

        self.fetch_one_by(Q_GET_BY_NAME, name)
            .await?
            .ok_or_else(|| DbError::not_found(ENTITY, name))
    }

    async fn store(&self, product: Product) -> DbResult<Product> {
        debug!(name = %product.name, "Inserting product");

        let result = sqlx::query(Q_STORE)
            .bind(product.name.as_str())
            .bind(product.kind.as_str())
            .bind(product.count)
            .bind(product.price)
            .persistent(false)
            .execute(&self.pool)
            .await
            .map_err(DbError::Insert)?;

        let id = result.last_insert_rowid();
        debug!(id = %id, "Product inserted");

        Ok(product.with_id(id))
    }

    async fn update(&self, ctx: &OpContext, product: Product) -> DbResult<Product> {
        debug!(id = %product.id, "Updating product");

        let affected = ctx
            .run(async {
                let mut tx = self.pool.begin().await.map_err(DbError::Update)?;

                let result = sqlx::query(Q_UPDATE)
                    .bind(product.name.as_str())
                    .bind(product.kind.as_str())
                    .bind(product.count)
                    .bind(product.price)
                    .bind(product.id)
                    .persistent(false)
                    .execute(&mut *tx)
                    .await
                    .map_err(DbError::Update)?;

                tx.commit().await.map_err(DbError::Update)?;
                Ok(result.rows_affected())
            })
            .await?;

        if affected == 0 {
            debug!(id = %product.id, "Update matched no rows");
        }

        Ok(product)
    }

    async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query(Q_DELETE)
            .bind(id)
            .persistent(false)
            .execute(&self.pool)
            .await
            .map_err(DbError::Delete)?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(ENTITY, id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
//
// Behavior shared with the in-memory repository lives in the contract tests
// in `repository/mod.rs`. These cover driver-level failures only SQLite has.
