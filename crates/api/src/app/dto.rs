use std::collections::BTreeSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

use wholesale_auth::{Principal, Role};
use wholesale_core::{CategoryId, CustomerId, ProductId, UserId};
use wholesale_infra::service::{NewOrder, NewProduct, NewUser, StockReceipt};
use wholesale_sales::{OrderLineRequest, PaymentStatus};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
}

/// Packaging counts default to zero, so `{ "pcs": 40, ... }` is enough.
#[derive(Debug, Deserialize)]
pub struct StockReceiptRequest {
    #[serde(default)]
    pub crates: i64,
    #[serde(default)]
    pub cartons: i64,
    #[serde(default)]
    pub pcs: i64,
    pub cost_per_unit: Decimal,
    pub purchase_date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub sell_price_per_unit: Decimal,
    pub category_id: CategoryId,
    pub opening_stock: Option<StockReceiptRequest>,
}

#[derive(Debug, Deserialize)]
pub struct ReceiveStockRequest {
    pub product_id: ProductId,
    pub receipt: StockReceiptRequest,
}

#[derive(Debug, Deserialize)]
pub struct CreateCustomerRequest {
    pub name: String,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub customer_id: CustomerId,
    pub payment_status: PaymentStatus,
    pub lines: Vec<OrderLineRequest>,
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub full_name: String,
    pub username: String,
    pub role: Role,
    /// Defaults to the acting user.
    pub reports_to: Option<UserId>,
    #[serde(default)]
    pub categories: BTreeSet<CategoryId>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCategoriesRequest {
    pub categories: BTreeSet<CategoryId>,
}

// -------------------------
// Mapping onto service inputs
// -------------------------

impl From<StockReceiptRequest> for StockReceipt {
    fn from(value: StockReceiptRequest) -> Self {
        StockReceipt {
            crates: value.crates,
            cartons: value.cartons,
            pcs: value.pcs,
            cost_per_unit: value.cost_per_unit,
            purchase_date: value.purchase_date,
        }
    }
}

impl From<CreateProductRequest> for NewProduct {
    fn from(value: CreateProductRequest) -> Self {
        NewProduct {
            name: value.name,
            sell_price_per_unit: value.sell_price_per_unit,
            category_id: value.category_id,
            opening_stock: value.opening_stock.map(StockReceipt::from),
        }
    }
}

impl From<CreateOrderRequest> for NewOrder {
    fn from(value: CreateOrderRequest) -> Self {
        NewOrder {
            customer_id: value.customer_id,
            payment_status: value.payment_status,
            lines: value.lines,
        }
    }
}

impl CreateUserRequest {
    pub fn into_new_user(self, principal: &Principal) -> NewUser {
        NewUser {
            full_name: self.full_name,
            username: self.username,
            role: self.role,
            reports_to: self.reports_to.unwrap_or(principal.user_id),
            categories: self.categories,
        }
    }
}
