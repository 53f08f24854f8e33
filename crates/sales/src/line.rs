use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use wholesale_core::{CustomerId, InvoiceId, OrderLineId, ProductId, UserId};

/// Payment status shared by every line of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Paid,
    Due,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Paid => "paid",
            PaymentStatus::Due => "due",
        }
    }
}

impl core::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for PaymentStatus {
    type Err = wholesale_core::DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "paid" => Ok(PaymentStatus::Paid),
            "due" => Ok(PaymentStatus::Due),
            other => Err(wholesale_core::DomainError::validation(format!(
                "unknown payment status '{other}'"
            ))),
        }
    }
}

/// One persisted sale of one product, part of an invoice.
///
/// Immutable after creation except for the Due → Paid transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: OrderLineId,
    pub invoice_id: InvoiceId,
    /// Salesperson who placed the order.
    pub user_id: UserId,
    pub customer_id: CustomerId,
    pub product_id: ProductId,
    pub quantity_units: i64,
    pub unit_price: Decimal,
    /// `quantity_units * unit_price`, exact.
    pub total_amount: Decimal,
    /// Weighted-average FIFO cost of the units sold, frozen at sale time.
    pub cost_per_unit_at_sale: Decimal,
    pub payment_status: PaymentStatus,
    /// Set iff `payment_status` is `Due`.
    pub due_date: Option<NaiveDate>,
    pub order_date: DateTime<Utc>,
}

impl OrderLine {
    /// Never above the FIFO cost the average was taken from.
    pub fn cost_of_goods(&self) -> Decimal {
        Decimal::from(self.quantity_units).saturating_mul(self.cost_per_unit_at_sale)
    }

    pub fn profit(&self) -> Decimal {
        self.total_amount.saturating_sub(self.cost_of_goods())
    }

    pub fn is_due(&self) -> bool {
        self.payment_status == PaymentStatus::Due
    }

    /// Due → Paid. Returns whether anything changed.
    pub fn mark_paid(&mut self) -> bool {
        if self.payment_status == PaymentStatus::Paid {
            return false;
        }
        self.payment_status = PaymentStatus::Paid;
        self.due_date = None;
        true
    }
}
