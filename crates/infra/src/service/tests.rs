use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal_macros::dec;

use wholesale_auth::{Principal, Role};
use wholesale_core::{CategoryId, CustomerId, DomainError, ProductId};
use wholesale_inventory::{InventoryBatch, ProductStock, Unit};
use wholesale_reporting::TeamReportBody;
use wholesale_sales::{OrderLineRequest, PaymentStatus};

use super::*;
use crate::store::{InMemoryStore, StoreResult};

struct Fixture {
    office: BackOffice,
    owner: Principal,
    category: CategoryId,
    product: ProductId,
    customer: CustomerId,
}

fn receipt(pcs: i64, cost: rust_decimal::Decimal, day: u32) -> StockReceipt {
    StockReceipt {
        crates: 0,
        cartons: 0,
        pcs,
        cost_per_unit: cost,
        purchase_date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
    }
}

fn line(product_id: ProductId, quantity_raw: i64, price: rust_decimal::Decimal) -> OrderLineRequest {
    OrderLineRequest {
        product_id,
        quantity_raw,
        unit: Unit::Pcs,
        sell_price_per_unit: price,
    }
}

async fn fixture(opening_units: i64) -> Fixture {
    fixture_on(Arc::new(InMemoryStore::new()), Duration::from_secs(5), opening_units).await
}

async fn fixture_on(store: Arc<dyn BackOfficeStore>, order_timeout: Duration, opening_units: i64) -> Fixture {
    let office = BackOffice::new(store, DuePolicy::default(), order_timeout);
    let owner_user = office.bootstrap_owner("Owner", "owner").await.unwrap().unwrap();
    let owner = office.principal_for(owner_user.id).await.unwrap().unwrap();

    let category = office.create_category(&owner, "Beverages").await.unwrap();
    let product = office
        .create_product(
            &owner,
            NewProduct {
                name: "Mango juice".into(),
                sell_price_per_unit: dec!(8),
                category_id: category.id,
                opening_stock: Some(receipt(opening_units, dec!(5), 1)),
            },
        )
        .await
        .unwrap();
    let customer = office.create_customer(&owner, "Rahim Store", None).await.unwrap();

    Fixture {
        office,
        owner,
        category: category.id,
        product: product.id,
        customer: customer.id,
    }
}

async fn hire(f: &Fixture, boss: &Principal, name: &str, role: Role, grants: &[CategoryId]) -> Principal {
    let user = f
        .office
        .create_user(
            boss,
            NewUser {
                full_name: name.into(),
                username: name.to_lowercase(),
                role,
                reports_to: boss.user_id,
                categories: grants.iter().copied().collect(),
            },
        )
        .await
        .unwrap();
    f.office.principal_for(user.id).await.unwrap().unwrap()
}

fn order(f: &Fixture, quantity: i64, status: PaymentStatus) -> NewOrder {
    NewOrder {
        customer_id: f.customer,
        payment_status: status,
        lines: vec![line(f.product, quantity, dec!(8))],
    }
}

#[tokio::test]
async fn bootstrap_runs_once() {
    let f = fixture(10).await;
    assert!(f.office.bootstrap_owner("Other", "other").await.unwrap().is_none());
}

#[tokio::test]
async fn failed_line_rolls_back_the_whole_order() {
    let f = fixture(10).await;
    let scarce = f
        .office
        .create_product(
            &f.owner,
            NewProduct {
                name: "Lychee juice".into(),
                sell_price_per_unit: dec!(9),
                category_id: f.category,
                opening_stock: Some(receipt(2, dec!(6), 1)),
            },
        )
        .await
        .unwrap();

    let err = f
        .office
        .create_order(
            &f.owner,
            NewOrder {
                customer_id: f.customer,
                payment_status: PaymentStatus::Paid,
                lines: vec![line(f.product, 4, dec!(8)), line(scarce.id, 3, dec!(9))],
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Domain(DomainError::InsufficientStock { requested: 3, available: 2, .. })
    ));

    let listing = f.office.visible_products(&f.owner).await.unwrap();
    let on_hand: Vec<_> = listing.iter().map(|p| (p.name.as_str(), p.stock_on_hand)).collect();
    assert_eq!(on_hand, vec![("Lychee juice", 2), ("Mango juice", 10)]);
    assert!(f.office.my_orders(&f.owner).await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_orders_cannot_oversell_the_last_unit() {
    let f = fixture(1).await;
    let office = f.office.clone();

    let (a, b) = tokio::join!(
        tokio::spawn({
            let office = office.clone();
            let (owner, cmd) = (f.owner.clone(), order(&f, 1, PaymentStatus::Paid));
            async move { office.create_order(&owner, cmd).await }
        }),
        tokio::spawn({
            let office = office.clone();
            let (owner, cmd) = (f.owner.clone(), order(&f, 1, PaymentStatus::Paid));
            async move { office.create_order(&owner, cmd).await }
        }),
    );
    let results = [a.unwrap(), b.unwrap()];

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results.iter().any(|r| matches!(
        r,
        Err(ServiceError::Domain(DomainError::InsufficientStock { available: 0, .. }))
    )));
    let listing = office.visible_products(&f.owner).await.unwrap();
    assert_eq!(listing[0].stock_on_hand, 0);
}

#[tokio::test]
async fn fifo_cost_is_recorded_on_the_line() {
    let f = fixture(500).await;
    f.office.receive_stock(&f.owner, f.product, receipt(300, dec!(6), 2)).await.unwrap();

    let invoice = f.office.create_order(&f.owner, order(&f, 600, PaymentStatus::Paid)).await.unwrap();
    assert_eq!(invoice.lines[0].cost_per_unit_at_sale, dec!(5.166666));
    assert_eq!(invoice.grand_total, dec!(4800));
}

#[tokio::test]
async fn due_invoice_can_be_settled_once() {
    let f = fixture(10).await;
    let invoice = f.office.create_order(&f.owner, order(&f, 3, PaymentStatus::Due)).await.unwrap();
    assert!(invoice.due_date.is_some());

    let profile = f.office.customer_profile(&f.owner, f.customer).await.unwrap();
    assert_eq!(profile.total_due, dec!(24));

    assert!(f.office.mark_invoice_paid(&f.owner, invoice.invoice_id).await.unwrap());
    assert!(!f.office.mark_invoice_paid(&f.owner, invoice.invoice_id).await.unwrap());

    let detail = f.office.invoice(&f.owner, invoice.invoice_id).await.unwrap();
    assert_eq!(detail.invoice.payment_status, PaymentStatus::Paid);
    assert_eq!(detail.invoice.due_date, None);
    assert_eq!(detail.items[0].product_name, "Mango juice");
}

#[tokio::test]
async fn salesperson_is_bound_to_granted_categories() {
    let f = fixture(10).await;
    let manager = hire(&f, &f.owner, "Anwar", Role::Manager, &[f.category]).await;
    let outsider = hire(&f, &manager, "Bilkis", Role::Sales, &[]).await;

    assert!(f.office.visible_products(&outsider).await.unwrap().is_empty());
    let err = f.office.create_order(&outsider, order(&f, 1, PaymentStatus::Paid)).await.unwrap_err();
    assert!(matches!(err, ServiceError::Domain(DomainError::PermissionDenied(_))));

    f.office
        .update_category_grants(&manager, outsider.user_id, BTreeSet::from([f.category]))
        .await
        .unwrap();
    let outsider = f.office.principal_for(outsider.user_id).await.unwrap().unwrap();
    f.office.create_order(&outsider, order(&f, 1, PaymentStatus::Paid)).await.unwrap();
}

#[tokio::test]
async fn manager_cannot_delegate_categories_they_lack() {
    let f = fixture(10).await;
    let manager = hire(&f, &f.owner, "Anwar", Role::Manager, &[]).await;
    let sales = hire(&f, &manager, "Chandan", Role::Sales, &[]).await;

    let err = f
        .office
        .update_category_grants(&manager, sales.user_id, BTreeSet::from([f.category]))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Domain(DomainError::PermissionDenied(_))));
}

#[tokio::test]
async fn reports_are_scoped_to_the_subtree() {
    let f = fixture(20).await;
    let north = hire(&f, &f.owner, "North", Role::Manager, &[f.category]).await;
    let south = hire(&f, &f.owner, "South", Role::Manager, &[f.category]).await;
    let rep = hire(&f, &north, "Rep", Role::Sales, &[f.category]).await;

    let sale = f.office.create_order(&rep, order(&f, 2, PaymentStatus::Due)).await.unwrap();

    let report = f.office.team_report(&north, north.user_id).await.unwrap();
    match report.body {
        TeamReportBody::Members(members) => {
            assert_eq!(members.len(), 1);
            assert_eq!(members[0].total_sales, dec!(16));
        }
        other => panic!("expected member rows, got {other:?}"),
    }

    let err = f.office.team_report(&south, rep.user_id).await.unwrap_err();
    assert!(matches!(err, ServiceError::Domain(DomainError::PermissionDenied(_))));
    let err = f.office.invoice(&south, sale.invoice_id).await.unwrap_err();
    assert!(matches!(err, ServiceError::Domain(DomainError::PermissionDenied(_))));
    let err = f.office.mark_invoice_paid(&south, sale.invoice_id).await.unwrap_err();
    assert!(matches!(err, ServiceError::Domain(DomainError::PermissionDenied(_))));

    let due = f.office.due_summary(&f.owner, f.owner.user_id).await.unwrap();
    assert_eq!(due.team_total_due, dec!(16));

    let profile = f.office.user_profile(&north, rep.user_id).await.unwrap();
    assert_eq!(profile.manager_name.as_deref(), Some("North"));
    assert_eq!(profile.stats.total_due, dec!(16));
}

#[tokio::test]
async fn team_invoices_group_history_by_lead() {
    let f = fixture(20).await;
    let north = hire(&f, &f.owner, "North", Role::Manager, &[f.category]).await;
    let rep = hire(&f, &north, "Rep", Role::Sales, &[f.category]).await;

    let first = f.office.create_order(&rep, order(&f, 2, PaymentStatus::Due)).await.unwrap();
    let second = f.office.create_order(&f.owner, order(&f, 1, PaymentStatus::Paid)).await.unwrap();

    let teams = f.office.team_invoices(&f.owner).await.unwrap();
    assert_eq!(teams.len(), 2);
    assert_eq!(teams[0].leader.user_id, f.owner.user_id);
    let all: BTreeSet<_> = teams[0].invoices.iter().map(|i| i.invoice_id).collect();
    assert_eq!(all, BTreeSet::from([first.invoice_id, second.invoice_id]));
    assert_eq!(teams[1].leader.full_name, "North");
    assert_eq!(teams[1].invoices.len(), 1);
    assert_eq!(teams[1].invoices[0].total, dec!(16));

    let err = f.office.team_invoices(&rep).await.unwrap_err();
    assert!(matches!(err, ServiceError::Domain(DomainError::PermissionDenied(_))));
}

#[tokio::test]
async fn sales_role_cannot_manage_catalog_or_users() {
    let f = fixture(10).await;
    let rep = hire(&f, &f.owner, "Rep", Role::Sales, &[f.category]).await;

    let err = f.office.create_category(&rep, "Snacks").await.unwrap_err();
    assert!(matches!(err, ServiceError::Domain(DomainError::PermissionDenied(_))));
    let err = f.office.team_users(&rep).await.unwrap_err();
    assert!(matches!(err, ServiceError::Domain(DomainError::PermissionDenied(_))));
}

#[tokio::test]
async fn unknown_customer_is_a_validation_error() {
    let f = fixture(10).await;
    let mut cmd = order(&f, 1, PaymentStatus::Paid);
    cmd.customer_id = CustomerId::new();

    let err = f.office.create_order(&f.owner, cmd).await.unwrap_err();
    assert!(matches!(err, ServiceError::Domain(DomainError::Validation(_))));
}

#[tokio::test]
async fn overflowing_order_leaves_the_store_usable() {
    let f = fixture(10).await;
    let bulk = f
        .office
        .create_product(
            &f.owner,
            NewProduct {
                name: "Bulk sugar".into(),
                sell_price_per_unit: dec!(1),
                category_id: f.category,
                opening_stock: Some(receipt(9_000_000_000_000_000_000, dec!(1), 1)),
            },
        )
        .await
        .unwrap();

    let huge = NewOrder {
        customer_id: f.customer,
        payment_status: PaymentStatus::Paid,
        lines: vec![line(bulk.id, 9_000_000_000_000_000_000, dec!(100000000000))],
    };
    let err = f.office.create_order(&f.owner, huge).await.unwrap_err();
    assert!(matches!(err, ServiceError::Domain(DomainError::Validation(_))));

    let invoice = f.office.create_order(&f.owner, order(&f, 1, PaymentStatus::Paid)).await.unwrap();
    assert_eq!(invoice.grand_total, dec!(8));
    let listings = f.office.visible_products(&f.owner).await.unwrap();
    let sugar = listings.iter().find(|p| p.product_id == bulk.id).unwrap();
    assert_eq!(sugar.stock_on_hand, 9_000_000_000_000_000_000);
}

#[tokio::test]
async fn receipts_cannot_push_stock_past_the_counter_range() {
    let f = fixture(10).await;

    let err = f
        .office
        .receive_stock(&f.owner, f.product, receipt(i64::MAX - 5, dec!(1), 2))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Domain(DomainError::Validation(_))));

    let listings = f.office.visible_products(&f.owner).await.unwrap();
    assert_eq!(listings[0].stock_on_hand, 10);

    f.office
        .receive_stock(&f.owner, f.product, receipt(i64::MAX - 10, dec!(1), 2))
        .await
        .unwrap();
    let listings = f.office.visible_products(&f.owner).await.unwrap();
    assert_eq!(listings[0].stock_on_hand, i64::MAX);
}

/// In-memory store whose order commits stall before touching any state.
struct StalledCommits {
    inner: InMemoryStore,
    delay: Duration,
}

#[async_trait]
impl BackOfficeStore for StalledCommits {
    async fn list_users(&self) -> StoreResult<Vec<User>> {
        self.inner.list_users().await
    }
    async fn get_user(&self, user_id: UserId) -> StoreResult<Option<User>> {
        self.inner.get_user(user_id).await
    }
    async fn category_grants(&self, user_id: UserId) -> StoreResult<BTreeSet<CategoryId>> {
        self.inner.category_grants(user_id).await
    }
    async fn insert_user(&self, user: &User, grants: &BTreeSet<CategoryId>) -> StoreResult<()> {
        self.inner.insert_user(user, grants).await
    }
    async fn replace_category_grants(&self, user_id: UserId, grants: &BTreeSet<CategoryId>) -> StoreResult<()> {
        self.inner.replace_category_grants(user_id, grants).await
    }
    async fn list_categories(&self) -> StoreResult<Vec<Category>> {
        self.inner.list_categories().await
    }
    async fn insert_category(&self, category: &Category) -> StoreResult<()> {
        self.inner.insert_category(category).await
    }
    async fn list_products(&self) -> StoreResult<Vec<Product>> {
        self.inner.list_products().await
    }
    async fn insert_product(&self, product: &Product, opening_stock: Option<&InventoryBatch>) -> StoreResult<()> {
        self.inner.insert_product(product, opening_stock).await
    }
    async fn list_customers(&self) -> StoreResult<Vec<Customer>> {
        self.inner.list_customers().await
    }
    async fn get_customer(&self, customer_id: CustomerId) -> StoreResult<Option<Customer>> {
        self.inner.get_customer(customer_id).await
    }
    async fn insert_customer(&self, customer: &Customer) -> StoreResult<()> {
        self.inner.insert_customer(customer).await
    }
    async fn insert_batch(&self, batch: &InventoryBatch) -> StoreResult<()> {
        self.inner.insert_batch(batch).await
    }
    async fn load_stock(&self, product_id: ProductId) -> StoreResult<ProductStock> {
        self.inner.load_stock(product_id).await
    }
    async fn stock_levels(&self) -> StoreResult<HashMap<ProductId, i64>> {
        self.inner.stock_levels().await
    }
    async fn commit_order(&self, product_ids: &[ProductId], decide: OrderDecision) -> StoreResult<Invoice> {
        tokio::time::sleep(self.delay).await;
        self.inner.commit_order(product_ids, decide).await
    }
    async fn order_lines_for_users(&self, user_ids: &[UserId]) -> StoreResult<Vec<OrderLine>> {
        self.inner.order_lines_for_users(user_ids).await
    }
    async fn order_lines_for_customer(&self, customer_id: CustomerId) -> StoreResult<Vec<OrderLine>> {
        self.inner.order_lines_for_customer(customer_id).await
    }
    async fn invoice_lines(&self, invoice_id: InvoiceId) -> StoreResult<Vec<OrderLine>> {
        self.inner.invoice_lines(invoice_id).await
    }
    async fn mark_invoice_paid(&self, invoice_id: InvoiceId) -> StoreResult<u64> {
        self.inner.mark_invoice_paid(invoice_id).await
    }
}

#[tokio::test]
async fn slow_order_commit_times_out_and_persists_nothing() {
    let store = Arc::new(StalledCommits {
        inner: InMemoryStore::new(),
        delay: Duration::from_secs(5),
    });
    let f = fixture_on(store.clone(), Duration::from_millis(50), 10).await;

    let err = f.office.create_order(&f.owner, order(&f, 3, PaymentStatus::Due)).await.unwrap_err();
    assert!(matches!(err, ServiceError::Timeout));
    assert_eq!(err.code(), "timeout");

    assert!(f.office.my_orders(&f.owner).await.unwrap().is_empty());
    assert_eq!(store.load_stock(f.product).await.unwrap().on_hand(), 10);
    let due = f.office.due_summary(&f.owner, f.owner.user_id).await.unwrap();
    assert_eq!(due.team_total_due, dec!(0));
}
