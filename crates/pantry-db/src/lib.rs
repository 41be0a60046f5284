//! # pantry-db: Database Layer for Pantry
//!
//! Product persistence behind the [`ProductRepository`] trait, with a
//! SQLite implementation built on sqlx and an in-memory implementation for
//! tests and database-free callers.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Pantry Data Flow                                 │
//! │                                                                         │
//! │  Caller (HTTP handler, CLI)                                            │
//! │       │  repo.store(product)                                           │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     pantry-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ (product.rs)  │    │  (embedded)  │  │   │
//! │  │   │               │    │ (memory.rs)   │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ SqlProductRepo│    │ 001_products │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │  INSERT INTO products(...) VALUES(?, ?, ?, ?)                  │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`repository`] - The repository trait and its implementations
//! - [`context`] - Cancellation and deadlines for a single call
//! - [`error`] - Database error types
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded schema provisioning
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pantry_db::{Database, DbConfig, OpContext, ProductRepository};
//!
//! let db = Database::new(DbConfig::new("path/to/pantry.db")).await?;
//! let repo = db.products();
//!
//! let crema = repo.store(Product::new("crema", "manos", 10, 40.0)).await?;
//! repo.update(&OpContext::with_timeout(Duration::from_secs(5)), crema).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod context;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use context::OpContext;
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::{InMemoryProductRepository, ProductRepository, SqlProductRepository};

pub use pantry_core::Product;
