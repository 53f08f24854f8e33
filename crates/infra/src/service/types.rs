//! Inputs and read views of the back-office service.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use wholesale_auth::Role;
use wholesale_core::{CategoryId, CustomerId, DomainError, DomainResult, ProductId, UserId};
use wholesale_inventory::UnitBreakdown;
use wholesale_invoicing::InvoiceView;
use wholesale_org::User;
use wholesale_parties::Customer;
use wholesale_products::Product;
use wholesale_reporting::UserStats;
use wholesale_sales::{OrderLineRequest, PaymentStatus};

/// A stock receipt counted in mixed packaging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockReceipt {
    pub crates: i64,
    pub cartons: i64,
    pub pcs: i64,
    pub cost_per_unit: Decimal,
    pub purchase_date: NaiveDate,
}

impl StockReceipt {
    /// Total in base units; every count must be non-negative.
    pub fn quantity_units(&self) -> DomainResult<i64> {
        if self.crates < 0 || self.cartons < 0 || self.pcs < 0 {
            return Err(DomainError::validation("stock counts cannot be negative"));
        }
        UnitBreakdown {
            crates: self.crates,
            cartons: self.cartons,
            pcs: self.pcs,
        }
        .total_pcs()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub sell_price_per_unit: Decimal,
    pub category_id: CategoryId,
    pub opening_stock: Option<StockReceipt>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub customer_id: CustomerId,
    pub payment_status: PaymentStatus,
    pub lines: Vec<OrderLineRequest>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub full_name: String,
    pub username: String,
    pub role: Role,
    pub reports_to: UserId,
    pub categories: BTreeSet<CategoryId>,
}

/// Catalog row as seen by one principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductListing {
    pub product_id: ProductId,
    pub name: String,
    pub sell_price_per_unit: Decimal,
    pub category_id: CategoryId,
    pub category_name: String,
    pub stock_on_hand: i64,
    pub stock_breakdown: UnitBreakdown,
}

impl ProductListing {
    pub fn new(product: &Product, category_name: String, stock_on_hand: i64) -> Self {
        Self {
            product_id: product.id,
            name: product.name.clone(),
            sell_price_per_unit: product.sell_price_per_unit,
            category_id: product.category_id,
            category_name,
            stock_on_hand,
            stock_breakdown: UnitBreakdown::from_pcs(stock_on_hand),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerProfile {
    pub customer: Customer,
    pub total_sales: Decimal,
    pub total_due: Decimal,
    /// Newest first; only invoices of salespeople the principal may view.
    pub invoices: Vec<InvoiceView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvoiceLineDetail {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity_units: i64,
    pub unit_price: Decimal,
    pub total_amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvoiceDetail {
    pub invoice: InvoiceView,
    pub salesperson: String,
    pub customer_name: String,
    pub items: Vec<InvoiceLineDetail>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub user: User,
    pub manager_name: Option<String>,
    pub categories: BTreeSet<CategoryId>,
    pub stats: UserStats,
    pub invoices: Vec<InvoiceView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamMember {
    pub user: User,
    pub manager_name: Option<String>,
    pub categories: BTreeSet<CategoryId>,
}
