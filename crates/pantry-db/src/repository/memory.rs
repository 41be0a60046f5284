//! In-memory product repository.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::context::OpContext;
use crate::error::{DbError, DbResult};
use crate::repository::ProductRepository;
use pantry_core::Product;

/// In-memory storage backend.
///
/// Rows live in a `BTreeMap` keyed by id behind `Arc<RwLock<_>>`, so clones
/// share the same store. Ids come from a counter that never goes backwards,
/// matching an `AUTOINCREMENT` column. Data is lost when the last clone is
/// dropped.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProductRepository {
    state: Arc<RwLock<State>>,
}

#[derive(Debug, Default)]
struct State {
    rows: BTreeMap<i64, Product>,
    last_id: i64,
}

impl InMemoryProductRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn get_all(&self) -> DbResult<Vec<Product>> {
        let state = self.state.read().await;
        Ok(state.rows.values().cloned().collect())
    }

    async fn get_one(&self, id: i64) -> DbResult<Product> {
        let state = self.state.read().await;
        state
            .rows
            .get(&id)
            .cloned()
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    async fn get_by_name(&self, name: &str) -> DbResult<Product> {
        let state = self.state.read().await;
        state
            .rows
            .values()
            .find(|p| p.name == name)
            .cloned()
            .ok_or_else(|| DbError::not_found("Product", name))
    }

    async fn store(&self, product: Product) -> DbResult<Product> {
        let mut state = self.state.write().await;
        state.last_id += 1;

        let product = product.with_id(state.last_id);
        state.rows.insert(product.id, product.clone());

        debug!(id = %product.id, "Product stored in memory");
        Ok(product)
    }

    async fn update(&self, ctx: &OpContext, product: Product) -> DbResult<Product> {
        ctx.run(async {
            let mut state = self.state.write().await;
            match state.rows.get_mut(&product.id) {
                Some(row) => *row = product.clone(),
                None => debug!(id = %product.id, "Update matched no rows"),
            }
            Ok(())
        })
        .await?;

        Ok(product)
    }

    async fn delete(&self, id: i64) -> DbResult<()> {
        let mut state = self.state.write().await;
        state
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| DbError::not_found("Product", id))
    }
}
