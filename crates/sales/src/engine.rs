//! Order engine: one multi-line order request becomes one invoice, or nothing.

use std::collections::BTreeMap;

use chrono::{DateTime, Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use wholesale_core::{
    CustomerId, DomainError, DomainResult, InvoiceId, OrderLineId, ProductId, UserId,
};
use wholesale_inventory::{Consumption, ProductStock, Unit};

use crate::{OrderLine, PaymentStatus};

/// One requested line as entered by the salesperson.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLineRequest {
    pub product_id: ProductId,
    /// Quantity in `unit`; zero means an empty row and is skipped.
    pub quantity_raw: i64,
    #[serde(default)]
    pub unit: Unit,
    pub sell_price_per_unit: Decimal,
}

/// Command: CreateOrder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOrder {
    pub invoice_id: InvoiceId,
    pub user_id: UserId,
    pub customer_id: CustomerId,
    pub payment_status: PaymentStatus,
    pub lines: Vec<OrderLineRequest>,
    pub occurred_at: DateTime<Utc>,
}

impl CreateOrder {
    /// Distinct products of the non-empty lines, in id order.
    ///
    /// Stores lock ledgers in this order.
    pub fn product_ids(&self) -> Vec<ProductId> {
        let mut ids: Vec<ProductId> = self
            .lines
            .iter()
            .filter(|l| l.quantity_raw != 0)
            .map(|l| l.product_id)
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }
}

/// When a Due invoice must be paid: order date plus a fixed number of days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuePolicy {
    pub days: u32,
}

impl Default for DuePolicy {
    fn default() -> Self {
        Self { days: 1 }
    }
}

impl DuePolicy {
    pub fn new(days: u32) -> Self {
        Self { days }
    }

    pub fn due_date(&self, order_date: DateTime<Utc>) -> DomainResult<NaiveDate> {
        order_date
            .date_naive()
            .checked_add_days(Days::new(u64::from(self.days)))
            .ok_or_else(|| DomainError::validation("due date out of range"))
    }
}

/// A freshly placed invoice together with the stock it consumed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub invoice_id: InvoiceId,
    pub user_id: UserId,
    pub customer_id: CustomerId,
    pub payment_status: PaymentStatus,
    pub due_date: Option<NaiveDate>,
    pub order_date: DateTime<Utc>,
    pub lines: Vec<OrderLine>,
    /// One entry per line, same order as `lines`.
    pub consumptions: Vec<Consumption>,
    pub grand_total: Decimal,
}

/// Validated line in base units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PricedLine {
    product_id: ProductId,
    quantity_units: i64,
    unit_price: Decimal,
}

/// Turns [`CreateOrder`] requests into invoices.
///
/// Does not check category grants: callers pass only products the principal
/// may sell (see `CategoryAccessGate`).
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderEngine {
    due_policy: DuePolicy,
}

impl OrderEngine {
    pub fn new(due_policy: DuePolicy) -> Self {
        Self { due_policy }
    }

    pub fn due_policy(&self) -> DuePolicy {
        self.due_policy
    }

    /// Check the request without touching stock.
    ///
    /// Zero-quantity rows are dropped; anything else non-positive fails the
    /// whole order. An order with nothing left is `EmptyOrder`.
    pub fn validate(&self, cmd: &CreateOrder) -> DomainResult<()> {
        self.priced_lines(cmd).map(|_| ())
    }

    fn priced_lines(&self, cmd: &CreateOrder) -> DomainResult<Vec<PricedLine>> {
        let mut lines = Vec::with_capacity(cmd.lines.len());
        for req in &cmd.lines {
            if req.quantity_raw == 0 {
                continue;
            }
            let quantity_units = req.unit.to_base_units(req.quantity_raw)?;
            if quantity_units <= 0 {
                return Err(DomainError::validation(format!(
                    "quantity for product {} must be positive",
                    req.product_id
                )));
            }
            if req.sell_price_per_unit <= Decimal::ZERO {
                return Err(DomainError::validation(format!(
                    "sell price for product {} must be positive",
                    req.product_id
                )));
            }
            lines.push(PricedLine {
                product_id: req.product_id,
                quantity_units,
                unit_price: req.sell_price_per_unit,
            });
        }
        if lines.is_empty() {
            return Err(DomainError::EmptyOrder);
        }
        Ok(lines)
    }

    /// Allocate every line from `stocks` FIFO and build the invoice.
    ///
    /// All-or-nothing: on error `stocks` is left exactly as it was. Products
    /// missing from `stocks` have no batches.
    pub fn place(
        &self,
        cmd: &CreateOrder,
        stocks: &mut BTreeMap<ProductId, ProductStock>,
    ) -> DomainResult<Invoice> {
        let priced = self.priced_lines(cmd)?;
        let due_date = match cmd.payment_status {
            PaymentStatus::Due => Some(self.due_policy.due_date(cmd.occurred_at)?),
            PaymentStatus::Paid => None,
        };

        let mut working = stocks.clone();
        let mut lines = Vec::with_capacity(priced.len());
        let mut consumptions = Vec::with_capacity(priced.len());

        for line in priced {
            let consumption = working
                .entry(line.product_id)
                .or_insert_with(|| ProductStock::empty(line.product_id))
                .consume(line.quantity_units)?;
            let total_amount = Decimal::from(line.quantity_units)
                .checked_mul(line.unit_price)
                .ok_or_else(|| {
                    DomainError::validation(format!("line total for product {} overflows", line.product_id))
                })?;

            lines.push(OrderLine {
                id: OrderLineId::new(),
                invoice_id: cmd.invoice_id,
                user_id: cmd.user_id,
                customer_id: cmd.customer_id,
                product_id: line.product_id,
                quantity_units: line.quantity_units,
                unit_price: line.unit_price,
                total_amount,
                cost_per_unit_at_sale: consumption.average_unit_cost(),
                payment_status: cmd.payment_status,
                due_date,
                order_date: cmd.occurred_at,
            });
            consumptions.push(consumption);
        }

        let grand_total = lines
            .iter()
            .try_fold(Decimal::ZERO, |total, l| total.checked_add(l.total_amount))
            .ok_or_else(|| DomainError::validation("invoice total overflows"))?;
        *stocks = working;

        Ok(Invoice {
            invoice_id: cmd.invoice_id,
            user_id: cmd.user_id,
            customer_id: cmd.customer_id,
            payment_status: cmd.payment_status,
            due_date,
            order_date: cmd.occurred_at,
            lines,
            consumptions,
            grand_total,
        })
    }
}
