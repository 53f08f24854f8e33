//! Postgres-backed store.
//!
//! ## Order transactions
//!
//! `commit_order` runs in one SQL transaction:
//!
//! 1. `SET LOCAL statement_timeout` bounds every statement of the transaction
//! 2. product rows are locked `FOR UPDATE` in id order (one global lock order)
//! 3. live batch rows are locked and loaded in FIFO order
//! 4. the pure decision runs on the loaded ledgers
//! 5. batch deletions/decrements and the new order lines are written
//! 6. commit
//!
//! Any error returns before commit; dropping the transaction rolls it back.
//! Two concurrent orders for the same product serialize on step 2, so the
//! second one sees the first one's consumption.
//!
//! ## Error mapping
//!
//! | Postgres code | Meaning | StoreError |
//! |---|---|---|
//! | `23505` | unique violation | `Domain(Conflict)` |
//! | `23503` | foreign key violation | `Domain(NotFound)` |
//! | `57014` | statement timeout | `Timeout` |
//! | other | | `Storage` |

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, Row, Transaction};
use tracing::instrument;
use uuid::Uuid;

use wholesale_auth::Role;
use wholesale_core::{
    BatchId, CategoryId, CustomerId, DomainError, InvoiceId, OrderLineId, ProductId, UserId,
};
use wholesale_inventory::{BatchChange, InventoryBatch, ProductStock};
use wholesale_org::User;
use wholesale_parties::Customer;
use wholesale_products::{Category, Product};
use wholesale_sales::{Invoice, OrderLine, PaymentStatus};

use super::{BackOfficeStore, OrderDecision, StoreError, StoreResult};

const SCHEMA: &str = include_str!("schema.sql");

const LINE_COLUMNS: &str = "id, invoice_id, user_id, customer_id, product_id, quantity_units, \
     unit_price, total_amount, cost_per_unit_at_sale, payment_status, due_date, order_date";

#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: Arc<PgPool>,
    /// Applied as `statement_timeout` inside order transactions.
    order_tx_timeout: Duration,
}

impl PostgresStore {
    pub fn new(pool: PgPool, order_tx_timeout: Duration) -> Self {
        Self {
            pool: Arc::new(pool),
            order_tx_timeout,
        }
    }

    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        order_tx_timeout: Duration,
    ) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool, order_tx_timeout))
    }

    /// Create tables and indexes if missing.
    #[instrument(skip(self), err)]
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::raw_sql(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("migrate", e))?;
        Ok(())
    }

    async fn lines_where(&self, operation: &str, filter: &str, id: Uuid) -> StoreResult<Vec<OrderLine>> {
        let sql = format!(
            "SELECT {LINE_COLUMNS} FROM order_lines WHERE {filter} = $1 \
             ORDER BY order_date, invoice_id, line_no"
        );
        let rows = sqlx::query(&sql)
            .bind(id)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error(operation, e))?;
        rows.iter().map(line_from_row).collect()
    }
}

/// Lock products in id order and load their live batches, FIFO.
async fn lock_stocks(
    tx: &mut Transaction<'_, Postgres>,
    product_ids: &[ProductId],
) -> StoreResult<BTreeMap<ProductId, ProductStock>> {
    let mut ids: Vec<Uuid> = product_ids.iter().map(|p| *p.as_uuid()).collect();
    ids.sort();
    ids.dedup();

    let locked = sqlx::query("SELECT id FROM products WHERE id = ANY($1) ORDER BY id FOR UPDATE")
        .bind(&ids)
        .fetch_all(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("lock_products", e))?;
    if locked.len() != ids.len() {
        return Err(DomainError::not_found("one or more ordered products do not exist").into());
    }

    let rows = sqlx::query(
        r#"
        SELECT id, product_id, quantity_remaining, cost_per_unit, purchase_date, created_at
        FROM inventory_batches
        WHERE product_id = ANY($1) AND quantity_remaining > 0
        ORDER BY product_id, purchase_date, created_at, received_seq
        FOR UPDATE
        "#,
    )
    .bind(&ids)
    .fetch_all(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("lock_batches", e))?;

    let mut per_product: BTreeMap<ProductId, Vec<InventoryBatch>> = ids
        .iter()
        .map(|id| (ProductId::from_uuid(*id), Vec::new()))
        .collect();
    for row in &rows {
        let batch = batch_from_row(row)?;
        per_product.entry(batch.product_id).or_default().push(batch);
    }

    Ok(per_product
        .into_iter()
        .map(|(id, batches)| (id, ProductStock::from_batches(id, batches, 0)))
        .collect())
}

async fn write_batch_changes(
    tx: &mut Transaction<'_, Postgres>,
    changes: &[BatchChange],
) -> StoreResult<()> {
    for change in changes {
        match change {
            BatchChange::Deleted(batch_id) => {
                sqlx::query("DELETE FROM inventory_batches WHERE id = $1")
                    .bind(batch_id.as_uuid())
                    .execute(&mut **tx)
                    .await
                    .map_err(|e| map_sqlx_error("delete_batch", e))?;
            }
            BatchChange::Decremented { batch_id, remaining } => {
                sqlx::query("UPDATE inventory_batches SET quantity_remaining = $2 WHERE id = $1")
                    .bind(batch_id.as_uuid())
                    .bind(remaining)
                    .execute(&mut **tx)
                    .await
                    .map_err(|e| map_sqlx_error("decrement_batch", e))?;
            }
        }
    }
    Ok(())
}

async fn insert_lines(tx: &mut Transaction<'_, Postgres>, lines: &[OrderLine]) -> StoreResult<()> {
    for (line_no, line) in lines.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO order_lines (
                id, invoice_id, user_id, customer_id, product_id, quantity_units,
                unit_price, total_amount, cost_per_unit_at_sale, payment_status,
                due_date, order_date, line_no
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(line.id.as_uuid())
        .bind(line.invoice_id.as_uuid())
        .bind(line.user_id.as_uuid())
        .bind(line.customer_id.as_uuid())
        .bind(line.product_id.as_uuid())
        .bind(line.quantity_units)
        .bind(line.unit_price)
        .bind(line.total_amount)
        .bind(line.cost_per_unit_at_sale)
        .bind(line.payment_status.as_str())
        .bind(line.due_date)
        .bind(line.order_date)
        .bind(line_no as i32)
        .execute(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("insert_order_line", e))?;
    }
    Ok(())
}

async fn insert_batch_row(
    executor: &mut sqlx::PgConnection,
    batch: &InventoryBatch,
) -> StoreResult<()> {
    sqlx::query(
        r#"
        INSERT INTO inventory_batches (id, product_id, quantity_remaining, cost_per_unit, purchase_date, created_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(batch.id.as_uuid())
    .bind(batch.product_id.as_uuid())
    .bind(batch.quantity_remaining)
    .bind(batch.cost_per_unit)
    .bind(batch.purchase_date)
    .bind(batch.created_at)
    .execute(executor)
    .await
    .map_err(|e| map_sqlx_error("insert_batch", e))?;
    Ok(())
}

#[async_trait]
impl BackOfficeStore for PostgresStore {
    #[instrument(skip(self), err)]
    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let rows = sqlx::query(
            "SELECT id, full_name, username, role, reports_to, created_at FROM users ORDER BY full_name",
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_users", e))?;
        rows.iter().map(user_from_row).collect()
    }

    #[instrument(skip(self), fields(user_id = %user_id), err)]
    async fn get_user(&self, user_id: UserId) -> StoreResult<Option<User>> {
        let row = sqlx::query(
            "SELECT id, full_name, username, role, reports_to, created_at FROM users WHERE id = $1",
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_user", e))?;
        row.as_ref().map(user_from_row).transpose()
    }

    #[instrument(skip(self), fields(user_id = %user_id), err)]
    async fn category_grants(&self, user_id: UserId) -> StoreResult<BTreeSet<CategoryId>> {
        let rows = sqlx::query("SELECT category_id FROM user_category_grants WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("category_grants", e))?;
        rows.iter()
            .map(|r| Ok(CategoryId::from_uuid(get(r, "category_id")?)))
            .collect()
    }

    #[instrument(skip(self, user, grants), fields(user_id = %user.id), err)]
    async fn insert_user(&self, user: &User, grants: &BTreeSet<CategoryId>) -> StoreResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        sqlx::query(
            r#"
            INSERT INTO users (id, full_name, username, role, reports_to, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(&user.full_name)
        .bind(&user.username)
        .bind(user.role.as_str())
        .bind(user.reports_to.map(|id| *id.as_uuid()))
        .bind(user.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("insert_user", e))?;

        write_grants(&mut tx, user.id, grants).await?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))
    }

    #[instrument(skip(self, grants), fields(user_id = %user_id), err)]
    async fn replace_category_grants(
        &self,
        user_id: UserId,
        grants: &BTreeSet<CategoryId>,
    ) -> StoreResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        sqlx::query("DELETE FROM user_category_grants WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("clear_grants", e))?;
        write_grants(&mut tx, user_id, grants).await?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))
    }

    #[instrument(skip(self), err)]
    async fn list_categories(&self) -> StoreResult<Vec<Category>> {
        let rows = sqlx::query("SELECT id, name, created_at FROM categories ORDER BY name")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_categories", e))?;
        rows.iter()
            .map(|r| {
                Ok(Category {
                    id: CategoryId::from_uuid(get(r, "id")?),
                    name: get(r, "name")?,
                    created_at: get(r, "created_at")?,
                })
            })
            .collect()
    }

    #[instrument(skip(self, category), fields(category_id = %category.id), err)]
    async fn insert_category(&self, category: &Category) -> StoreResult<()> {
        sqlx::query("INSERT INTO categories (id, name, created_at) VALUES ($1, $2, $3)")
            .bind(category.id.as_uuid())
            .bind(&category.name)
            .bind(category.created_at)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert_category", e))?;
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn list_products(&self) -> StoreResult<Vec<Product>> {
        let rows = sqlx::query(
            "SELECT id, name, sell_price_per_unit, category_id, created_at FROM products ORDER BY name",
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_products", e))?;
        rows.iter()
            .map(|r| {
                Ok(Product {
                    id: ProductId::from_uuid(get(r, "id")?),
                    name: get(r, "name")?,
                    sell_price_per_unit: get(r, "sell_price_per_unit")?,
                    category_id: CategoryId::from_uuid(get(r, "category_id")?),
                    created_at: get(r, "created_at")?,
                })
            })
            .collect()
    }

    #[instrument(skip(self, product, opening_stock), fields(product_id = %product.id), err)]
    async fn insert_product(
        &self,
        product: &Product,
        opening_stock: Option<&InventoryBatch>,
    ) -> StoreResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        sqlx::query(
            r#"
            INSERT INTO products (id, name, sell_price_per_unit, category_id, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(product.id.as_uuid())
        .bind(&product.name)
        .bind(product.sell_price_per_unit)
        .bind(product.category_id.as_uuid())
        .bind(product.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("insert_product", e))?;

        if let Some(batch) = opening_stock {
            insert_batch_row(&mut tx, batch).await?;
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))
    }

    #[instrument(skip(self), err)]
    async fn list_customers(&self) -> StoreResult<Vec<Customer>> {
        let rows = sqlx::query(
            "SELECT id, name, phone, created_by, created_at FROM customers ORDER BY name",
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_customers", e))?;
        rows.iter().map(customer_from_row).collect()
    }

    #[instrument(skip(self), fields(customer_id = %customer_id), err)]
    async fn get_customer(&self, customer_id: CustomerId) -> StoreResult<Option<Customer>> {
        let row = sqlx::query(
            "SELECT id, name, phone, created_by, created_at FROM customers WHERE id = $1",
        )
        .bind(customer_id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_customer", e))?;
        row.as_ref().map(customer_from_row).transpose()
    }

    #[instrument(skip(self, customer), fields(customer_id = %customer.id), err)]
    async fn insert_customer(&self, customer: &Customer) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO customers (id, name, phone, created_by, created_at) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(customer.id.as_uuid())
        .bind(&customer.name)
        .bind(customer.phone.as_deref())
        .bind(customer.created_by.as_uuid())
        .bind(customer.created_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_customer", e))?;
        Ok(())
    }

    #[instrument(skip(self, batch), fields(batch_id = %batch.id, product_id = %batch.product_id), err)]
    async fn insert_batch(&self, batch: &InventoryBatch) -> StoreResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        // Receipts serialize on the product row; the admitted total must fit i64.
        let mut stocks = lock_stocks(&mut tx, &[batch.product_id]).await?;
        stocks
            .entry(batch.product_id)
            .or_insert_with(|| ProductStock::empty(batch.product_id))
            .admit(batch.clone())?;
        insert_batch_row(&mut tx, batch).await?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))
    }

    #[instrument(skip(self), fields(product_id = %product_id), err)]
    async fn load_stock(&self, product_id: ProductId) -> StoreResult<ProductStock> {
        let rows = sqlx::query(
            r#"
            SELECT id, product_id, quantity_remaining, cost_per_unit, purchase_date, created_at
            FROM inventory_batches
            WHERE product_id = $1 AND quantity_remaining > 0
            ORDER BY purchase_date, created_at, received_seq
            "#,
        )
        .bind(product_id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("load_stock", e))?;
        let batches = rows.iter().map(batch_from_row).collect::<StoreResult<Vec<_>>>()?;
        Ok(ProductStock::from_batches(product_id, batches, 0))
    }

    #[instrument(skip(self), err)]
    async fn stock_levels(&self) -> StoreResult<HashMap<ProductId, i64>> {
        let rows = sqlx::query(
            r#"
            SELECT product_id, SUM(quantity_remaining)::BIGINT AS on_hand
            FROM inventory_batches
            WHERE quantity_remaining > 0
            GROUP BY product_id
            "#,
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("stock_levels", e))?;
        rows.iter()
            .map(|r| Ok((ProductId::from_uuid(get(r, "product_id")?), get(r, "on_hand")?)))
            .collect()
    }

    #[instrument(skip(self, decide), fields(products = product_ids.len()), err)]
    async fn commit_order(
        &self,
        product_ids: &[ProductId],
        decide: OrderDecision,
    ) -> StoreResult<Invoice> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        // SET cannot take bind parameters; the value is an integer.
        let timeout_ms = self.order_tx_timeout.as_millis();
        sqlx::query(&format!("SET LOCAL statement_timeout = {timeout_ms}"))
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("set_statement_timeout", e))?;

        let original = lock_stocks(&mut tx, product_ids).await?;
        let mut working = original.clone();

        let invoice = decide(&mut working)?;

        for (product_id, stock) in &working {
            if let Some(before) = original.get(product_id) {
                write_batch_changes(&mut tx, &stock.changes_since(before)).await?;
            }
        }
        insert_lines(&mut tx, &invoice.lines).await?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;
        Ok(invoice)
    }

    #[instrument(skip(self, user_ids), fields(users = user_ids.len()), err)]
    async fn order_lines_for_users(&self, user_ids: &[UserId]) -> StoreResult<Vec<OrderLine>> {
        let ids: Vec<Uuid> = user_ids.iter().map(|u| *u.as_uuid()).collect();
        let sql = format!(
            "SELECT {LINE_COLUMNS} FROM order_lines WHERE user_id = ANY($1) \
             ORDER BY order_date, invoice_id, line_no"
        );
        let rows = sqlx::query(&sql)
            .bind(&ids)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("order_lines_for_users", e))?;
        rows.iter().map(line_from_row).collect()
    }

    async fn order_lines_for_customer(&self, customer_id: CustomerId) -> StoreResult<Vec<OrderLine>> {
        self.lines_where("order_lines_for_customer", "customer_id", *customer_id.as_uuid())
            .await
    }

    async fn invoice_lines(&self, invoice_id: InvoiceId) -> StoreResult<Vec<OrderLine>> {
        self.lines_where("invoice_lines", "invoice_id", *invoice_id.as_uuid())
            .await
    }

    #[instrument(skip(self), fields(invoice_id = %invoice_id), err)]
    async fn mark_invoice_paid(&self, invoice_id: InvoiceId) -> StoreResult<u64> {
        // One statement, so every line of the invoice flips together.
        let result = sqlx::query(
            r#"
            UPDATE order_lines
            SET payment_status = 'paid', due_date = NULL
            WHERE invoice_id = $1 AND payment_status = 'due'
            "#,
        )
        .bind(invoice_id.as_uuid())
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("mark_invoice_paid", e))?;
        Ok(result.rows_affected())
    }
}

async fn write_grants(
    tx: &mut Transaction<'_, Postgres>,
    user_id: UserId,
    grants: &BTreeSet<CategoryId>,
) -> StoreResult<()> {
    for category_id in grants {
        sqlx::query("INSERT INTO user_category_grants (user_id, category_id) VALUES ($1, $2)")
            .bind(user_id.as_uuid())
            .bind(category_id.as_uuid())
            .execute(&mut **tx)
            .await
            .map_err(|e| map_sqlx_error("insert_grant", e))?;
    }
    Ok(())
}

// Row decoding.

fn get<'r, T>(row: &'r PgRow, column: &str) -> StoreResult<T>
where
    T: sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
{
    row.try_get(column)
        .map_err(|e| StoreError::Storage(format!("failed to decode column {column}: {e}")))
}

fn user_from_row(row: &PgRow) -> StoreResult<User> {
    let role: String = get(row, "role")?;
    let reports_to: Option<Uuid> = get(row, "reports_to")?;
    Ok(User {
        id: UserId::from_uuid(get(row, "id")?),
        full_name: get(row, "full_name")?,
        username: get(row, "username")?,
        role: Role::from_str(&role)
            .map_err(|e| StoreError::Storage(format!("corrupt user row: {e}")))?,
        reports_to: reports_to.map(UserId::from_uuid),
        created_at: get(row, "created_at")?,
    })
}

fn customer_from_row(row: &PgRow) -> StoreResult<Customer> {
    Ok(Customer {
        id: CustomerId::from_uuid(get(row, "id")?),
        name: get(row, "name")?,
        phone: get(row, "phone")?,
        created_by: UserId::from_uuid(get(row, "created_by")?),
        created_at: get(row, "created_at")?,
    })
}

fn batch_from_row(row: &PgRow) -> StoreResult<InventoryBatch> {
    Ok(InventoryBatch {
        id: BatchId::from_uuid(get(row, "id")?),
        product_id: ProductId::from_uuid(get(row, "product_id")?),
        quantity_remaining: get(row, "quantity_remaining")?,
        cost_per_unit: get(row, "cost_per_unit")?,
        purchase_date: get(row, "purchase_date")?,
        created_at: get(row, "created_at")?,
    })
}

fn line_from_row(row: &PgRow) -> StoreResult<OrderLine> {
    let status: String = get(row, "payment_status")?;
    Ok(OrderLine {
        id: OrderLineId::from_uuid(get(row, "id")?),
        invoice_id: InvoiceId::from_uuid(get(row, "invoice_id")?),
        user_id: UserId::from_uuid(get(row, "user_id")?),
        customer_id: CustomerId::from_uuid(get(row, "customer_id")?),
        product_id: ProductId::from_uuid(get(row, "product_id")?),
        quantity_units: get(row, "quantity_units")?,
        unit_price: get(row, "unit_price")?,
        total_amount: get(row, "total_amount")?,
        cost_per_unit_at_sale: get(row, "cost_per_unit_at_sale")?,
        payment_status: PaymentStatus::from_str(&status)
            .map_err(|e| StoreError::Storage(format!("corrupt order line: {e}")))?,
        due_date: get(row, "due_date")?,
        order_date: get(row, "order_date")?,
    })
}

/// Map SQLx errors to store errors.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => DomainError::conflict(msg).into(),
                Some("23503") => DomainError::not_found(msg).into(),
                Some("57014") => StoreError::Timeout,
                _ => StoreError::Storage(msg),
            }
        }
        sqlx::Error::PoolTimedOut => StoreError::Timeout,
        sqlx::Error::PoolClosed => {
            StoreError::Storage(format!("connection pool closed in {}", operation))
        }
        other => StoreError::Storage(format!("{} failed: {}", operation, other)),
    }
}
