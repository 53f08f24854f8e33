//! Persistence boundary for the back office.
//!
//! Domain crates decide; stores load, lock and persist. The one multi-row
//! write that must be atomic is [`BackOfficeStore::commit_order`]: it locks
//! the ledgers of the ordered products, hands working copies to a pure
//! decision, and persists the resulting batch diff together with the new
//! order lines, or nothing at all.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use async_trait::async_trait;
use thiserror::Error;

use wholesale_core::{CategoryId, CustomerId, DomainError, DomainResult, InvoiceId, ProductId, UserId};
use wholesale_inventory::{InventoryBatch, ProductStock};
use wholesale_org::User;
use wholesale_parties::Customer;
use wholesale_products::{Category, Product};
use wholesale_sales::{Invoice, OrderLine};

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryStore;
pub use postgres::PostgresStore;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Deterministic failure raised by the decision or by a store-side constraint.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Backend failure; the transaction (if any) was rolled back.
    #[error("storage error: {0}")]
    Storage(String),

    /// The transaction exceeded its time bound and was rolled back.
    #[error("transaction timed out")]
    Timeout,
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Pure order decision run by [`BackOfficeStore::commit_order`] under lock.
///
/// Receives one working ledger per locked product and returns the invoice to
/// persist. Returning an error discards every change.
pub type OrderDecision =
    Box<dyn FnOnce(&mut BTreeMap<ProductId, ProductStock>) -> DomainResult<Invoice> + Send>;

#[async_trait]
pub trait BackOfficeStore: Send + Sync {
    // Users and grants.
    async fn list_users(&self) -> StoreResult<Vec<User>>;
    async fn get_user(&self, user_id: UserId) -> StoreResult<Option<User>>;
    async fn category_grants(&self, user_id: UserId) -> StoreResult<BTreeSet<CategoryId>>;
    /// Fails with `Conflict` on a duplicate username.
    async fn insert_user(&self, user: &User, grants: &BTreeSet<CategoryId>) -> StoreResult<()>;
    async fn replace_category_grants(
        &self,
        user_id: UserId,
        grants: &BTreeSet<CategoryId>,
    ) -> StoreResult<()>;

    // Catalog.
    async fn list_categories(&self) -> StoreResult<Vec<Category>>;
    async fn insert_category(&self, category: &Category) -> StoreResult<()>;
    async fn list_products(&self) -> StoreResult<Vec<Product>>;
    /// Inserts the product and, atomically with it, an optional opening batch.
    async fn insert_product(
        &self,
        product: &Product,
        opening_stock: Option<&InventoryBatch>,
    ) -> StoreResult<()>;

    // Customers.
    async fn list_customers(&self) -> StoreResult<Vec<Customer>>;
    async fn get_customer(&self, customer_id: CustomerId) -> StoreResult<Option<Customer>>;
    async fn insert_customer(&self, customer: &Customer) -> StoreResult<()>;

    // Inventory.
    async fn insert_batch(&self, batch: &InventoryBatch) -> StoreResult<()>;
    async fn load_stock(&self, product_id: ProductId) -> StoreResult<ProductStock>;
    /// On-hand units per product; products without batches are absent.
    async fn stock_levels(&self) -> StoreResult<HashMap<ProductId, i64>>;

    // Orders.
    /// Lock `product_ids`, run `decide` on working copies, persist atomically.
    async fn commit_order(
        &self,
        product_ids: &[ProductId],
        decide: OrderDecision,
    ) -> StoreResult<Invoice>;
    async fn order_lines_for_users(&self, user_ids: &[UserId]) -> StoreResult<Vec<OrderLine>>;
    async fn order_lines_for_customer(&self, customer_id: CustomerId) -> StoreResult<Vec<OrderLine>>;
    async fn invoice_lines(&self, invoice_id: InvoiceId) -> StoreResult<Vec<OrderLine>>;
    /// Due → Paid on every line of the invoice. Returns the number of lines changed.
    async fn mark_invoice_paid(&self, invoice_id: InvoiceId) -> StoreResult<u64>;
}
