//! # Repository Module
//!
//! The product data-access contract and its implementations.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  Caller (HTTP handler, CLI)                                            │
//! │       │                                                                 │
//! │       │  repo.get_by_name("crema")                                     │
//! │       ▼                                                                 │
//! │  dyn ProductRepository                                                 │
//! │  ├── get_all()                                                         │
//! │  ├── get_one(id)                                                       │
//! │  ├── get_by_name(name)                                                 │
//! │  ├── store(product)                                                    │
//! │  ├── update(ctx, product)                                              │
//! │  └── delete(id)                                                        │
//! │       │                                                                 │
//! │       ├──────────────────────────┐                                     │
//! │       ▼                          ▼                                     │
//! │  SqlProductRepository       InMemoryProductRepository                  │
//! │  (SQLite via sqlx)          (BTreeMap, tests / no-DB callers)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Implementations
//!
//! - [`SqlProductRepository`] - parameterized statements against `products`
//! - [`InMemoryProductRepository`] - same contract, no database

use async_trait::async_trait;
use pantry_core::Product;

use crate::context::OpContext;
use crate::error::DbResult;

pub mod memory;
pub mod product;

pub use memory::InMemoryProductRepository;
pub use product::SqlProductRepository;

/// Data-access contract for [`Product`].
///
/// Each call is independent: no transaction spans two calls and nothing is
/// cached between them.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Returns every product in storage order.
    ///
    /// Fails with `Query` if the read fails and `Scan` if any row cannot be
    /// decoded. No partial results.
    async fn get_all(&self) -> DbResult<Vec<Product>>;

    /// Returns the product with the given id, or `NotFound`.
    async fn get_one(&self, id: i64) -> DbResult<Product>;

    /// Returns the lowest-id product with the given name, or `NotFound`.
    async fn get_by_name(&self, name: &str) -> DbResult<Product>;

    /// Inserts `product` (its id is ignored) and returns it with the
    /// storage-assigned id.
    async fn store(&self, product: Product) -> DbResult<Product>;

    /// Overwrites every field except `id` of the row matching `product.id`.
    ///
    /// Honors cancellation and the deadline of `ctx`. An id that matches no
    /// row is not an error. Returns `product` unchanged on success.
    async fn update(&self, ctx: &OpContext, product: Product) -> DbResult<Product>;

    /// Removes the row with the given id. Fails with `NotFound` when nothing
    /// was removed.
    async fn delete(&self, id: i64) -> DbResult<()>;
}

// =============================================================================
// Contract Tests
// =============================================================================
//
// Both implementations run the same scenarios.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};

    async fn sql_repo() -> SqlProductRepository {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.products()
    }

    fn crema() -> Product {
        Product::new("crema", "manos", 10, 40.0)
    }

    async fn store_then_get_one(repo: &dyn ProductRepository) {
        let stored = repo.store(crema()).await.unwrap();
        assert!(stored.id > 0);
        assert_eq!(stored.name, "crema");

        let fetched = repo.get_one(stored.id).await.unwrap();
        assert_eq!(fetched, crema().with_id(stored.id));
    }

    async fn store_then_get_by_name(repo: &dyn ProductRepository) {
        let stored = repo.store(crema()).await.unwrap();
        let fetched = repo.get_by_name("crema").await.unwrap();
        assert_eq!(fetched, stored);
    }

    async fn get_by_name_returns_first_match(repo: &dyn ProductRepository) {
        let first = repo.store(crema()).await.unwrap();
        repo.store(Product::new("crema", "cuerpo", 3, 15.0))
            .await
            .unwrap();

        let fetched = repo.get_by_name("crema").await.unwrap();
        assert_eq!(fetched.id, first.id);
    }

    async fn missing_rows_are_not_found(repo: &dyn ProductRepository) {
        assert!(repo.get_one(999).await.unwrap_err().is_not_found());
        assert!(repo.get_by_name("nada").await.unwrap_err().is_not_found());
        assert!(repo.delete(999).await.unwrap_err().is_not_found());
    }

    async fn store_ignores_caller_id(repo: &dyn ProductRepository) {
        let stored = repo.store(crema().with_id(500)).await.unwrap();
        assert_ne!(stored.id, 500);
        assert!(repo.get_one(500).await.unwrap_err().is_not_found());
    }

    async fn get_all_in_insert_order(repo: &dyn ProductRepository) {
        assert!(repo.get_all().await.unwrap().is_empty());

        let a = repo.store(Product::new("yogurt", "entero", 20, 20.5)).await.unwrap();
        let b = repo.store(crema()).await.unwrap();

        let all = repo.get_all().await.unwrap();
        assert_eq!(all, vec![a, b]);
    }

    async fn delete_shrinks_get_all(repo: &dyn ProductRepository) {
        let a = repo.store(crema()).await.unwrap();
        repo.store(Product::new("jabon", "manos", 5, 12.0)).await.unwrap();
        let before = repo.get_all().await.unwrap().len();

        repo.delete(a.id).await.unwrap();
        assert_eq!(repo.get_all().await.unwrap().len(), before - 1);
        assert!(repo.get_one(a.id).await.unwrap_err().is_not_found());

        assert!(repo.delete(a.id).await.is_err());
        assert_eq!(repo.get_all().await.unwrap().len(), before - 1);
    }

    async fn update_overwrites_fields(repo: &dyn ProductRepository) {
        let stored = repo.store(crema()).await.unwrap();
        let changed = Product::new("crema", "manos", 30, 45.5).with_id(stored.id);

        let returned = repo
            .update(&OpContext::with_timeout(Duration::from_secs(5)), changed.clone())
            .await
            .unwrap();
        assert_eq!(returned, changed);
        assert_eq!(repo.get_one(stored.id).await.unwrap(), changed);
    }

    async fn update_missing_id_is_accepted(repo: &dyn ProductRepository) {
        let ghost = crema().with_id(4242);
        let returned = repo
            .update(&OpContext::background(), ghost.clone())
            .await
            .unwrap();
        assert_eq!(returned, ghost);
        assert!(repo.get_all().await.unwrap().is_empty());
    }

    async fn update_with_expired_deadline(repo: &dyn ProductRepository) {
        let stored = repo.store(crema()).await.unwrap();
        let changed = Product::new("otra", "cosa", 1, 1.0).with_id(stored.id);

        let ctx = OpContext::with_timeout(Duration::ZERO);
        let err = repo.update(&ctx, changed).await.unwrap_err();
        assert!(matches!(err, DbError::Timeout));
        assert_eq!(repo.get_one(stored.id).await.unwrap(), stored);
    }

    async fn update_with_cancelled_context(repo: &dyn ProductRepository) {
        let stored = repo.store(crema()).await.unwrap();
        let changed = Product::new("otra", "cosa", 1, 1.0).with_id(stored.id);

        let ctx = OpContext::background();
        ctx.cancel();
        let err = repo.update(&ctx, changed).await.unwrap_err();
        assert!(matches!(err, DbError::Cancelled));
        assert_eq!(repo.get_one(stored.id).await.unwrap(), stored);
    }

    macro_rules! contract_tests {
        ($($name:ident),* $(,)?) => {
            mod sql {
                use super::*;
                $(
                    #[tokio::test]
                    async fn $name() {
                        let repo = sql_repo().await;
                        super::$name(&repo).await;
                    }
                )*
            }

            mod in_memory {
                use super::*;
                $(
                    #[tokio::test]
                    async fn $name() {
                        let repo = InMemoryProductRepository::new();
                        super::$name(&repo).await;
                    }
                )*
            }
        };
    }

    contract_tests!(
        store_then_get_one,
        store_then_get_by_name,
        get_by_name_returns_first_match,
        missing_rows_are_not_found,
        store_ignores_caller_id,
        get_all_in_insert_order,
        delete_shrinks_get_all,
        update_overwrites_fields,
        update_missing_id_is_accepted,
        update_with_expired_deadline,
        update_with_cancelled_context,
    );

    #[tokio::test]
    async fn test_usable_as_shared_trait_object() {
        let repos: Vec<Arc<dyn ProductRepository>> = vec![
            Arc::new(sql_repo().await),
            Arc::new(InMemoryProductRepository::new()),
        ];

        for repo in repos {
            let stored = repo.store(crema()).await.unwrap();
            assert_eq!(repo.get_one(stored.id).await.unwrap().name, "crema");
        }
    }
}
