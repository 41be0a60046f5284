//! # Domain Types
//!
//! The Product entity exchanged between callers and the repository.
//!
//! ## Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           Product                                       │
//! │                                                                         │
//! │   id     i64     assigned by storage on insert (0 = not yet stored)    │
//! │   name   String  human-readable label, used as a lookup key            │
//! │   kind   String  free-form category ("type" in SQL and JSON)           │
//! │   count  i64     quantity on hand                                      │
//! │   price  f64     monetary amount                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! The storage engine owns `id`. Callers build a Product with `id = 0`,
//! hand it to `store`, and get it back with the assigned id.

use serde::{Deserialize, Serialize};

// =============================================================================
// Product
// =============================================================================

/// A product row in the `products` table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Storage-assigned identifier. Zero until stored.
    pub id: i64,

    /// Display name.
    pub name: String,

    /// Category or classification.
    #[serde(rename = "type")]
    pub kind: String,

    /// Quantity.
    pub count: i64,

    /// Unit price.
    pub price: f64,
}

impl Product {
    /// Creates an unsaved product (id = 0).
    ///
    /// ## Example
    /// ```rust
    /// use pantry_core::Product;
    ///
    /// let p = Product::new("crema", "manos", 10, 40.0);
    /// assert!(!p.is_persisted());
    /// ```
    pub fn new(name: impl Into<String>, kind: impl Into<String>, count: i64, price: f64) -> Self {
        Product {
            id: 0,
            name: name.into(),
            kind: kind.into(),
            count,
            price,
        }
    }

    /// Returns a copy of this product carrying the given id.
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = id;
        self
    }

    /// Whether the product has a storage-assigned id.
    #[inline]
    pub fn is_persisted(&self) -> bool {
        self.id > 0
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_product_is_unsaved() {
        let p = Product::new("crema", "manos", 10, 40.0);
        assert_eq!(p.id, 0);
        assert!(!p.is_persisted());
        assert_eq!(p.kind, "manos");
    }

    #[test]
    fn test_with_id_keeps_fields() {
        let p = Product::new("yogurt", "entero", 20, 20.5).with_id(7);
        assert!(p.is_persisted());
        assert_eq!(p.id, 7);
        assert_eq!(p.name, "yogurt");
        assert_eq!(p.count, 20);
    }

    #[test]
    fn test_kind_serializes_as_type() {
        let p = Product::new("crema", "manos", 10, 40.0).with_id(1);
        let json = serde_json::to_value(&p).unwrap();

        assert_eq!(json["type"], "manos");
        assert!(json.get("kind").is_none());

        let back: Product = serde_json::from_value(json).unwrap();
        assert_eq!(back, p);
    }
}
