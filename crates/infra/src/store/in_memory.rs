use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use wholesale_core::{
    AggregateRoot, CategoryId, CustomerId, DomainError, InvoiceId, ProductId, UserId,
};
use wholesale_inventory::{InventoryBatch, ProductStock};
use wholesale_org::User;
use wholesale_parties::Customer;
use wholesale_products::{Category, Product};
use wholesale_sales::{Invoice, OrderLine};

use super::{BackOfficeStore, OrderDecision, StoreError, StoreResult};

#[derive(Debug, Default)]
struct State {
    users: BTreeMap<UserId, User>,
    grants: HashMap<UserId, BTreeSet<CategoryId>>,
    categories: Vec<Category>,
    products: Vec<Product>,
    customers: Vec<Customer>,
    stocks: HashMap<ProductId, ProductStock>,
    /// Insertion order.
    lines: Vec<OrderLine>,
}

/// In-memory back-office store.
///
/// Intended for tests/dev. One mutex guards all state; `commit_order` holds
/// it for the whole decision, so concurrent orders are serialized.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| StoreError::Storage("in-memory store lock poisoned".to_string()))
    }
}

fn ensure_product(state: &State, product_id: ProductId) -> StoreResult<()> {
    if state.products.iter().any(|p| p.id == product_id) {
        Ok(())
    } else {
        Err(DomainError::not_found(format!("product {product_id}")).into())
    }
}

#[async_trait]
impl BackOfficeStore for InMemoryStore {
    async fn list_users(&self) -> StoreResult<Vec<User>> {
        Ok(self.lock()?.users.values().cloned().collect())
    }

    async fn get_user(&self, user_id: UserId) -> StoreResult<Option<User>> {
        Ok(self.lock()?.users.get(&user_id).cloned())
    }

    async fn category_grants(&self, user_id: UserId) -> StoreResult<BTreeSet<CategoryId>> {
        Ok(self.lock()?.grants.get(&user_id).cloned().unwrap_or_default())
    }

    async fn insert_user(&self, user: &User, grants: &BTreeSet<CategoryId>) -> StoreResult<()> {
        let mut state = self.lock()?;
        if state.users.values().any(|u| u.username == user.username) {
            return Err(DomainError::conflict(format!("username '{}' is taken", user.username)).into());
        }
        state.users.insert(user.id, user.clone());
        state.grants.insert(user.id, grants.clone());
        Ok(())
    }

    async fn replace_category_grants(
        &self,
        user_id: UserId,
        grants: &BTreeSet<CategoryId>,
    ) -> StoreResult<()> {
        let mut state = self.lock()?;
        if !state.users.contains_key(&user_id) {
            return Err(DomainError::not_found(format!("user {user_id}")).into());
        }
        state.grants.insert(user_id, grants.clone());
        Ok(())
    }

    async fn list_categories(&self) -> StoreResult<Vec<Category>> {
        Ok(self.lock()?.categories.clone())
    }

    async fn insert_category(&self, category: &Category) -> StoreResult<()> {
        let mut state = self.lock()?;
        if state
            .categories
            .iter()
            .any(|c| c.name.eq_ignore_ascii_case(&category.name))
        {
            return Err(DomainError::conflict(format!("category '{}' exists", category.name)).into());
        }
        state.categories.push(category.clone());
        Ok(())
    }

    async fn list_products(&self) -> StoreResult<Vec<Product>> {
        Ok(self.lock()?.products.clone())
    }

    async fn insert_product(
        &self,
        product: &Product,
        opening_stock: Option<&InventoryBatch>,
    ) -> StoreResult<()> {
        let mut state = self.lock()?;
        if state.products.iter().any(|p| p.name == product.name) {
            return Err(DomainError::conflict(format!("product '{}' exists", product.name)).into());
        }
        let stock = match opening_stock {
            Some(batch) => ProductStock::from_batches(product.id, [batch.clone()], 1),
            None => ProductStock::empty(product.id),
        };
        state.products.push(product.clone());
        state.stocks.insert(product.id, stock);
        Ok(())
    }

    async fn list_customers(&self) -> StoreResult<Vec<Customer>> {
        Ok(self.lock()?.customers.clone())
    }

    async fn get_customer(&self, customer_id: CustomerId) -> StoreResult<Option<Customer>> {
        Ok(self
            .lock()?
            .customers
            .iter()
            .find(|c| c.id == customer_id)
            .cloned())
    }

    async fn insert_customer(&self, customer: &Customer) -> StoreResult<()> {
        self.lock()?.customers.push(customer.clone());
        Ok(())
    }

    async fn insert_batch(&self, batch: &InventoryBatch) -> StoreResult<()> {
        let mut state = self.lock()?;
        ensure_product(&state, batch.product_id)?;
        state
            .stocks
            .entry(batch.product_id)
            .or_insert_with(|| ProductStock::empty(batch.product_id))
            .admit(batch.clone())?;
        Ok(())
    }

    async fn load_stock(&self, product_id: ProductId) -> StoreResult<ProductStock> {
        Ok(self
            .lock()?
            .stocks
            .get(&product_id)
            .cloned()
            .unwrap_or_else(|| ProductStock::empty(product_id)))
    }

    async fn stock_levels(&self) -> StoreResult<HashMap<ProductId, i64>> {
        Ok(self
            .lock()?
            .stocks
            .iter()
            .filter(|(_, s)| !s.batches().is_empty())
            .map(|(id, s)| (*id, s.on_hand()))
            .collect())
    }

    async fn commit_order(
        &self,
        product_ids: &[ProductId],
        decide: OrderDecision,
    ) -> StoreResult<Invoice> {
        let mut state = self.lock()?;

        let mut working: BTreeMap<ProductId, ProductStock> = BTreeMap::new();
        for id in product_ids {
            ensure_product(&state, *id)?;
            let stock = state
                .stocks
                .get(id)
                .cloned()
                .unwrap_or_else(|| ProductStock::empty(*id));
            working.insert(*id, stock);
        }

        // Nothing is written unless the decision succeeds.
        let invoice = decide(&mut working)?;

        for (id, stock) in working {
            state.stocks.insert(id, stock);
        }
        state.lines.extend(invoice.lines.iter().cloned());
        Ok(invoice)
    }

    async fn order_lines_for_users(&self, user_ids: &[UserId]) -> StoreResult<Vec<OrderLine>> {
        let wanted: BTreeSet<&UserId> = user_ids.iter().collect();
        Ok(self
            .lock()?
            .lines
            .iter()
            .filter(|l| wanted.contains(&l.user_id))
            .cloned()
            .collect())
    }

    async fn order_lines_for_customer(&self, customer_id: CustomerId) -> StoreResult<Vec<OrderLine>> {
        Ok(self
            .lock()?
            .lines
            .iter()
            .filter(|l| l.customer_id == customer_id)
            .cloned()
            .collect())
    }

    async fn invoice_lines(&self, invoice_id: InvoiceId) -> StoreResult<Vec<OrderLine>> {
        Ok(self
            .lock()?
            .lines
            .iter()
            .filter(|l| l.invoice_id == invoice_id)
            .cloned()
            .collect())
    }

    async fn mark_invoice_paid(&self, invoice_id: InvoiceId) -> StoreResult<u64> {
        let mut state = self.lock()?;
        let mut changed = 0;
        for line in state.lines.iter_mut().filter(|l| l.invoice_id == invoice_id) {
            if line.mark_paid() {
                changed += 1;
            }
        }
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use rust_decimal_macros::dec;
    use wholesale_core::BatchId;
    use wholesale_inventory::Unit;
    use wholesale_sales::{CreateOrder, OrderEngine, OrderLineRequest, PaymentStatus};

    fn product(name: &str) -> Product {
        Product {
            id: ProductId::new(),
            name: name.to_string(),
            sell_price_per_unit: dec!(10),
            category_id: CategoryId::new(),
            created_at: Utc::now(),
        }
    }

    fn batch(product_id: ProductId, qty: i64) -> InventoryBatch {
        InventoryBatch {
            id: BatchId::new(),
            product_id,
            quantity_remaining: qty,
            cost_per_unit: dec!(4),
            purchase_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            created_at: Utc::now(),
        }
    }

    fn order_of(lines: Vec<(ProductId, i64)>) -> CreateOrder {
        CreateOrder {
            invoice_id: InvoiceId::new(),
            user_id: UserId::new(),
            customer_id: CustomerId::new(),
            payment_status: PaymentStatus::Due,
            lines: lines
                .into_iter()
                .map(|(product_id, qty)| OrderLineRequest {
                    product_id,
                    quantity_raw: qty,
                    unit: Unit::Pcs,
                    sell_price_per_unit: dec!(10),
                })
                .collect(),
            occurred_at: Utc::now(),
        }
    }

    async fn stocked(store: &InMemoryStore, name: &str, qty: i64) -> ProductId {
        let p = product(name);
        let b = batch(p.id, qty);
        store.insert_product(&p, Some(&b)).await.unwrap();
        p.id
    }

    #[tokio::test]
    async fn failed_decision_writes_nothing() {
        let store = InMemoryStore::new();
        let (a, b) = (stocked(&store, "tea", 50).await, stocked(&store, "soap", 2).await);

        let cmd = order_of(vec![(a, 10), (b, 5)]);
        let ids = cmd.product_ids();
        let err = store
            .commit_order(&ids, Box::new(move |s| OrderEngine::default().place(&cmd, s)))
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::Domain(DomainError::InsufficientStock { .. })));
        assert_eq!(store.load_stock(a).await.unwrap().on_hand(), 50);
        assert_eq!(store.load_stock(b).await.unwrap().on_hand(), 2);
        assert!(store.order_lines_for_users(&[UserId::new()]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn committed_order_persists_lines_and_stock() {
        let store = InMemoryStore::new();
        let a = stocked(&store, "tea", 50).await;

        let cmd = order_of(vec![(a, 10), (a, 5)]);
        let (ids, invoice_id, seller) = (cmd.product_ids(), cmd.invoice_id, cmd.user_id);
        store
            .commit_order(&ids, Box::new(move |s| OrderEngine::default().place(&cmd, s)))
            .await
            .unwrap();

        assert_eq!(store.load_stock(a).await.unwrap().on_hand(), 35);
        assert_eq!(store.invoice_lines(invoice_id).await.unwrap().len(), 2);
        assert_eq!(store.order_lines_for_users(&[seller]).await.unwrap().len(), 2);

        assert_eq!(store.mark_invoice_paid(invoice_id).await.unwrap(), 2);
        assert_eq!(store.mark_invoice_paid(invoice_id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn unknown_products_and_duplicates_are_refused() {
        let store = InMemoryStore::new();
        let missing = ProductId::new();
        let err = store.insert_batch(&batch(missing, 1)).await.unwrap_err();
        assert!(matches!(err, StoreError::Domain(DomainError::NotFound(_))));

        stocked(&store, "tea", 1).await;
        let err = store.insert_product(&product("tea"), None).await.unwrap_err();
        assert!(matches!(err, StoreError::Domain(DomainError::Conflict(_))));
    }

    #[tokio::test]
    async fn received_batches_join_the_fifo_ledger() {
        let store = InMemoryStore::new();
        let a = stocked(&store, "tea", 5).await;
        store.insert_batch(&batch(a, 7)).await.unwrap();

        let stock = store.load_stock(a).await.unwrap();
        assert_eq!(stock.batches().len(), 2);
        assert_eq!(store.stock_levels().await.unwrap().get(&a), Some(&12));
    }
}
