use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use wholesale_core::{CategoryId, DomainError, DomainResult, ProductId};

/// Catalog product. Stock is not held here; the inventory ledger owns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Default selling price per base unit (pcs).
    pub sell_price_per_unit: Decimal,
    pub category_id: CategoryId,
    pub created_at: DateTime<Utc>,
}

/// Command: CreateProduct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateProduct {
    pub product_id: ProductId,
    pub name: String,
    pub sell_price_per_unit: Decimal,
    pub category_id: CategoryId,
    pub occurred_at: DateTime<Utc>,
}

impl Product {
    /// Validate the command and build the product.
    ///
    /// Names are unique across the catalog (exact match, after trimming).
    pub fn create(cmd: &CreateProduct, existing: &[Product]) -> DomainResult<Product> {
        let name = cmd.name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("product name cannot be empty"));
        }
        if cmd.sell_price_per_unit <= Decimal::ZERO {
            return Err(DomainError::validation("price per unit must be positive"));
        }
        if existing.iter().any(|p| p.name == name) {
            return Err(DomainError::conflict(format!(
                "a product with the name '{name}' already exists"
            )));
        }
        Ok(Product {
            id: cmd.product_id,
            name: name.to_string(),
            sell_price_per_unit: cmd.sell_price_per_unit,
            category_id: cmd.category_id,
            created_at: cmd.occurred_at,
        })
    }
}
