use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use wholesale_core::{BatchId, DomainError, DomainResult, ProductId};

/// One stock receipt of a product at a specific cost and date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryBatch {
    pub id: BatchId,
    pub product_id: ProductId,
    /// Units left in this batch; never negative.
    pub quantity_remaining: i64,
    pub cost_per_unit: Decimal,
    pub purchase_date: NaiveDate,
    /// Tie-breaker between batches purchased on the same day.
    pub created_at: DateTime<Utc>,
}

impl InventoryBatch {
    /// FIFO ordering key.
    pub fn fifo_key(&self) -> (NaiveDate, DateTime<Utc>) {
        (self.purchase_date, self.created_at)
    }
}

/// Command: ReceiveStock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiveStock {
    pub batch_id: BatchId,
    pub product_id: ProductId,
    pub quantity_units: i64,
    pub cost_per_unit: Decimal,
    pub purchase_date: NaiveDate,
    pub occurred_at: DateTime<Utc>,
}

impl ReceiveStock {
    pub fn validate(&self) -> DomainResult<()> {
        if self.quantity_units <= 0 {
            return Err(DomainError::validation("received quantity must be positive"));
        }
        if self.cost_per_unit <= Decimal::ZERO {
            return Err(DomainError::validation("cost per unit must be positive"));
        }
        Ok(())
    }

    pub fn into_batch(self) -> DomainResult<InventoryBatch> {
        self.validate()?;
        Ok(InventoryBatch {
            id: self.batch_id,
            product_id: self.product_id,
            quantity_remaining: self.quantity_units,
            cost_per_unit: self.cost_per_unit,
            purchase_date: self.purchase_date,
            created_at: self.occurred_at,
        })
    }
}
