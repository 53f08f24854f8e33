//! FIFO stock ledger for one product.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use wholesale_core::{
    AggregateRoot, BatchId, DomainError, DomainResult, ProductId, unit_cost_of,
};

use crate::{InventoryBatch, ReceiveStock};

/// Units taken from one batch by a consumption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchDraw {
    pub batch_id: BatchId,
    pub units_taken: i64,
    pub cost_per_unit: Decimal,
    /// The draw emptied the batch, so it is deleted.
    pub drained: bool,
}

impl BatchDraw {
    pub fn cost(&self) -> DomainResult<Decimal> {
        Decimal::from(self.units_taken)
            .checked_mul(self.cost_per_unit)
            .ok_or_else(|| DomainError::validation(format!("cost of draw from batch {} overflows", self.batch_id)))
    }
}

/// Outcome of a FIFO consumption: what was drawn and what it cost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Consumption {
    pub product_id: ProductId,
    pub quantity: i64,
    /// Exact sum of `units_taken * cost_per_unit` over all draws.
    pub total_cost: Decimal,
    /// Oldest batch first.
    pub draws: Vec<BatchDraw>,
}

impl Consumption {
    /// Weighted-average cost per unit, stored on the order line as cost-at-sale.
    pub fn average_unit_cost(&self) -> Decimal {
        unit_cost_of(self.total_cost, self.quantity)
    }
}

/// Persisted-row change produced by consuming from a [`ProductStock`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchChange {
    Deleted(BatchId),
    Decremented { batch_id: BatchId, remaining: i64 },
}

/// Aggregate root: all live batches of one product, in FIFO order.
///
/// The sum of `quantity_remaining` over the batches is the authoritative
/// on-hand stock; nothing else caches it. Batches at zero are removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductStock {
    product_id: ProductId,
    batches: Vec<InventoryBatch>,
    version: u64,
}

impl ProductStock {
    pub fn empty(product_id: ProductId) -> Self {
        Self {
            product_id,
            batches: Vec::new(),
            version: 0,
        }
    }

    /// Rehydrate from stored batch rows.
    ///
    /// Rows of other products and empty rows are ignored. The sort is stable,
    /// so rows with equal `(purchase_date, created_at)` keep their input order.
    pub fn from_batches(
        product_id: ProductId,
        batches: impl IntoIterator<Item = InventoryBatch>,
        version: u64,
    ) -> Self {
        let mut batches: Vec<InventoryBatch> = batches
            .into_iter()
            .filter(|b| b.product_id == product_id && b.quantity_remaining > 0)
            .collect();
        batches.sort_by_key(InventoryBatch::fifo_key);
        Self {
            product_id,
            batches,
            version,
        }
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn batches(&self) -> &[InventoryBatch] {
        &self.batches
    }

    /// Units on hand.
    ///
    /// [`admit`](Self::admit) keeps the total within `i64`; rows loaded from
    /// storage past that bound saturate at `i64::MAX`.
    pub fn on_hand(&self) -> i64 {
        self.batches
            .iter()
            .fold(0i64, |total, b| total.saturating_add(b.quantity_remaining))
    }

    /// Validate a receipt and add its batch to the ledger.
    pub fn receive(&mut self, cmd: ReceiveStock) -> DomainResult<InventoryBatch> {
        if cmd.product_id != self.product_id {
            return Err(DomainError::invariant("product_id mismatch"));
        }
        let batch = cmd.into_batch()?;
        self.admit(batch.clone())?;
        Ok(batch)
    }

    /// Insert a batch at its FIFO position (after any equal keys).
    ///
    /// Refuses a batch that would push the product's total stock past
    /// `i64::MAX`; a refused batch leaves the ledger untouched.
    pub fn admit(&mut self, batch: InventoryBatch) -> DomainResult<()> {
        if batch.product_id != self.product_id {
            return Err(DomainError::invariant("product_id mismatch"));
        }
        if batch.quantity_remaining <= 0 {
            return Err(DomainError::validation("received quantity must be positive"));
        }
        let total = self
            .batches
            .iter()
            .try_fold(batch.quantity_remaining, |total, b| total.checked_add(b.quantity_remaining));
        if total.is_none() {
            return Err(DomainError::validation(format!(
                "receipt of {} units would overflow the stock of product {}",
                batch.quantity_remaining, self.product_id
            )));
        }
        let key = batch.fifo_key();
        let at = self.batches.partition_point(|b| b.fifo_key() <= key);
        self.batches.insert(at, batch);
        self.version += 1;
        Ok(())
    }

    /// Decide a FIFO draw of `quantity` units without touching state.
    ///
    /// Fails with `InsufficientStock` when all batches together hold fewer
    /// units than requested.
    pub fn plan_consumption(&self, quantity: i64) -> DomainResult<Consumption> {
        if quantity <= 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }
        let available = self.on_hand();
        if quantity > available {
            return Err(DomainError::InsufficientStock {
                product_id: self.product_id,
                requested: quantity,
                available,
            });
        }

        let mut remaining = quantity;
        let mut total_cost = Decimal::ZERO;
        let mut draws = Vec::new();

        for batch in &self.batches {
            if remaining == 0 {
                break;
            }
            let take = remaining.min(batch.quantity_remaining);
            let draw = BatchDraw {
                batch_id: batch.id,
                units_taken: take,
                cost_per_unit: batch.cost_per_unit,
                drained: take == batch.quantity_remaining,
            };
            total_cost = total_cost
                .checked_add(draw.cost()?)
                .ok_or_else(|| DomainError::validation(format!("cost of {quantity} units overflows")))?;
            remaining -= take;
            draws.push(draw);
        }

        Ok(Consumption {
            product_id: self.product_id,
            quantity,
            total_cost,
            draws,
        })
    }

    /// Apply a consumption decided by [`plan_consumption`](Self::plan_consumption)
    /// on this same state.
    pub fn apply(&mut self, consumption: &Consumption) -> DomainResult<()> {
        if consumption.product_id != self.product_id {
            return Err(DomainError::invariant("product_id mismatch"));
        }
        // Validate every draw first so a stale plan mutates nothing.
        for draw in &consumption.draws {
            let batch = self
                .batches
                .iter()
                .find(|b| b.id == draw.batch_id)
                .ok_or_else(|| DomainError::invariant(format!("batch {} is gone", draw.batch_id)))?;
            if draw.units_taken <= 0 || draw.units_taken > batch.quantity_remaining {
                return Err(DomainError::invariant(format!(
                    "draw of {} exceeds batch {} remaining {}",
                    draw.units_taken, batch.id, batch.quantity_remaining
                )));
            }
        }

        for draw in &consumption.draws {
            if let Some(batch) = self.batches.iter_mut().find(|b| b.id == draw.batch_id) {
                batch.quantity_remaining -= draw.units_taken;
            }
        }
        self.batches.retain(|b| b.quantity_remaining > 0);
        self.version += 1;
        Ok(())
    }

    /// Plan and apply in one step; all-or-nothing.
    pub fn consume(&mut self, quantity: i64) -> DomainResult<Consumption> {
        let consumption = self.plan_consumption(quantity)?;
        self.apply(&consumption)?;
        Ok(consumption)
    }

    /// Row changes that turn `original` into `self`.
    pub fn changes_since(&self, original: &ProductStock) -> Vec<BatchChange> {
        original
            .batches
            .iter()
            .filter_map(|before| match self.batches.iter().find(|b| b.id == before.id) {
                None => Some(BatchChange::Deleted(before.id)),
                Some(after) if after.quantity_remaining != before.quantity_remaining => {
                    Some(BatchChange::Decremented {
                        batch_id: after.id,
                        remaining: after.quantity_remaining,
                    })
                }
                Some(_) => None,
            })
            .collect()
    }
}

impl AggregateRoot for ProductStock {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.product_id
    }

    fn version(&self) -> u64 {
        self.version
    }
}
