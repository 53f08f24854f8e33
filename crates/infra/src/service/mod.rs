//! Back-office application service.
//!
//! Each operation takes the acting [`Principal`] explicitly, checks
//! permissions and scope, loads what it needs from the store, lets the pure
//! domain crates decide, and persists the outcome.
//!
//! ```text
//! request
//!   ↓
//! 1. authorize (role permission, subtree scope, category grants)
//!   ↓
//! 2. load snapshot (users, catalog, order lines) from the store
//!   ↓
//! 3. decide (domain crates; no IO)
//!   ↓
//! 4. persist (orders: one bounded, all-or-nothing transaction)
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{info, instrument, warn};

use wholesale_auth::{CategoryAccessGate, Permission, Principal, authorize};
use wholesale_core::{
    BatchId, CategoryId, CustomerId, DomainError, InvoiceId, ProductId, UserId, saturating_sum,
};
use wholesale_inventory::ReceiveStock;
use wholesale_invoicing::{InvoiceView, MarkInvoicePaid, group_by_invoice};
use wholesale_org::{CreateUser, OrgHierarchy, User};
use wholesale_parties::{Customer, RegisterCustomer};
use wholesale_products::{Category, CreateCategory, CreateProduct, Product};
use wholesale_reporting::{DueSummary, ReportingAggregator, TeamInvoices, TeamReport};
use wholesale_sales::{CreateOrder, DuePolicy, Invoice, OrderEngine, OrderLine};

use crate::config::AppConfig;
use crate::store::{BackOfficeStore, OrderDecision};

mod error;
mod types;

pub use error::{ServiceError, ServiceResult};
pub use types::{
    CustomerProfile, InvoiceDetail, InvoiceLineDetail, NewOrder, NewProduct, NewUser,
    ProductListing, StockReceipt, TeamMember, UserProfile,
};

#[derive(Clone)]
pub struct BackOffice {
    store: Arc<dyn BackOfficeStore>,
    engine: OrderEngine,
    gate: CategoryAccessGate,
    order_timeout: Duration,
}

impl std::fmt::Debug for BackOffice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackOffice")
            .field("engine", &self.engine)
            .field("order_timeout", &self.order_timeout)
            .finish_non_exhaustive()
    }
}

impl BackOffice {
    pub fn new(store: Arc<dyn BackOfficeStore>, due_policy: DuePolicy, order_timeout: Duration) -> Self {
        Self {
            store,
            engine: OrderEngine::new(due_policy),
            gate: CategoryAccessGate::new(),
            order_timeout,
        }
    }

    pub fn from_config(store: Arc<dyn BackOfficeStore>, config: &AppConfig) -> Self {
        Self::new(store, DuePolicy::new(config.due_days), config.order_tx_timeout)
    }

    async fn org(&self) -> ServiceResult<OrgHierarchy> {
        Ok(OrgHierarchy::from_users(self.store.list_users().await?))
    }

    fn scoped_user<'o>(
        &self,
        org: &'o OrgHierarchy,
        principal: &Principal,
        user_id: UserId,
    ) -> ServiceResult<&'o User> {
        Ok(ReportingAggregator::new(org).ensure_can_view(principal, user_id)?)
    }

    async fn ensure_categories_exist(&self, categories: &BTreeSet<CategoryId>) -> ServiceResult<()> {
        if categories.is_empty() {
            return Ok(());
        }
        let known: BTreeSet<CategoryId> =
            self.store.list_categories().await?.into_iter().map(|c| c.id).collect();
        match categories.iter().find(|c| !known.contains(c)) {
            Some(missing) => Err(DomainError::not_found(format!("category {missing}")).into()),
            None => Ok(()),
        }
    }

    // Identity.

    /// Resolve the principal for a user id, loading role and grants.
    pub async fn principal_for(&self, user_id: UserId) -> ServiceResult<Option<Principal>> {
        let Some(user) = self.store.get_user(user_id).await? else {
            return Ok(None);
        };
        let grants = self.store.category_grants(user_id).await?;
        Ok(Some(Principal::new(user.id, user.role, grants)))
    }

    /// Create the owner account if the organization is empty.
    #[instrument(skip(self), err)]
    pub async fn bootstrap_owner(&self, full_name: &str, username: &str) -> ServiceResult<Option<User>> {
        if !self.store.list_users().await?.is_empty() {
            return Ok(None);
        }
        let owner = User::owner(UserId::new(), full_name, username, Utc::now());
        self.store.insert_user(&owner, &BTreeSet::new()).await?;
        info!(user_id = %owner.id, "owner account created");
        Ok(Some(owner))
    }

    // Catalog and stock.

    #[instrument(skip(self, principal), fields(user_id = %principal.user_id), err)]
    pub async fn create_category(&self, principal: &Principal, name: &str) -> ServiceResult<Category> {
        authorize(principal, Permission::ManageCatalog)?;
        let existing = self.store.list_categories().await?;
        let category = Category::create(
            &CreateCategory {
                category_id: CategoryId::new(),
                name: name.to_string(),
                occurred_at: Utc::now(),
            },
            &existing,
        )?;
        self.store.insert_category(&category).await?;
        Ok(category)
    }

    #[instrument(skip(self, principal, new), fields(user_id = %principal.user_id), err)]
    pub async fn create_product(&self, principal: &Principal, new: NewProduct) -> ServiceResult<Product> {
        authorize(principal, Permission::ManageCatalog)?;
        self.ensure_categories_exist(&BTreeSet::from([new.category_id])).await?;

        let now = Utc::now();
        let existing = self.store.list_products().await?;
        let product = Product::create(
            &CreateProduct {
                product_id: ProductId::new(),
                name: new.name,
                sell_price_per_unit: new.sell_price_per_unit,
                category_id: new.category_id,
                occurred_at: now,
            },
            &existing,
        )?;

        let opening = match new.opening_stock {
            Some(receipt) => {
                let quantity_units = receipt.quantity_units()?;
                // An all-zero opening receipt means "no stock yet".
                (quantity_units > 0)
                    .then(|| {
                        ReceiveStock {
                            batch_id: BatchId::new(),
                            product_id: product.id,
                            quantity_units,
                            cost_per_unit: receipt.cost_per_unit,
                            purchase_date: receipt.purchase_date,
                            occurred_at: now,
                        }
                        .into_batch()
                    })
                    .transpose()?
            }
            None => None,
        };

        self.store.insert_product(&product, opening.as_ref()).await?;
        info!(product_id = %product.id, opening_units = opening.as_ref().map(|b| b.quantity_remaining), "product created");
        Ok(product)
    }

    /// Record a purchase batch for a product.
    #[instrument(skip(self, principal, receipt), fields(user_id = %principal.user_id, product_id = %product_id), err)]
    pub async fn receive_stock(
        &self,
        principal: &Principal,
        product_id: ProductId,
        receipt: StockReceipt,
    ) -> ServiceResult<BatchId> {
        authorize(principal, Permission::ReceiveStock)?;
        if !self.store.list_products().await?.iter().any(|p| p.id == product_id) {
            return Err(DomainError::not_found(format!("product {product_id}")).into());
        }
        let batch = ReceiveStock {
            batch_id: BatchId::new(),
            product_id,
            quantity_units: receipt.quantity_units()?,
            cost_per_unit: receipt.cost_per_unit,
            purchase_date: receipt.purchase_date,
            occurred_at: Utc::now(),
        }
        .into_batch()?;
        self.store.insert_batch(&batch).await?;
        info!(batch_id = %batch.id, units = batch.quantity_remaining, "stock received");
        Ok(batch.id)
    }

    /// Products the principal may sell, with live stock, sorted by name.
    pub async fn visible_products(&self, principal: &Principal) -> ServiceResult<Vec<ProductListing>> {
        let catalog = self.store.list_products().await?;
        let levels = self.store.stock_levels().await?;
        let categories: HashMap<CategoryId, String> = self
            .store
            .list_categories()
            .await?
            .into_iter()
            .map(|c| (c.id, c.name))
            .collect();

        let mut listings: Vec<ProductListing> = self
            .gate
            .visible_products(principal, &catalog)
            .into_iter()
            .map(|p| {
                ProductListing::new(
                    p,
                    categories.get(&p.category_id).cloned().unwrap_or_default(),
                    levels.get(&p.id).copied().unwrap_or(0),
                )
            })
            .collect();
        listings.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(listings)
    }

    // Customers.

    #[instrument(skip(self, principal), fields(user_id = %principal.user_id), err)]
    pub async fn create_customer(
        &self,
        principal: &Principal,
        name: &str,
        phone: Option<&str>,
    ) -> ServiceResult<Customer> {
        authorize(principal, Permission::RegisterCustomer)?;
        let customer = Customer::register(&RegisterCustomer {
            customer_id: CustomerId::new(),
            name: name.to_string(),
            phone: phone.map(str::to_string),
            created_by: principal.user_id,
            occurred_at: Utc::now(),
        })?;
        self.store.insert_customer(&customer).await?;
        Ok(customer)
    }

    pub async fn customers(&self) -> ServiceResult<Vec<Customer>> {
        let mut customers = self.store.list_customers().await?;
        customers.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(customers)
    }

    pub async fn customer_profile(
        &self,
        principal: &Principal,
        customer_id: CustomerId,
    ) -> ServiceResult<CustomerProfile> {
        let customer = self
            .store
            .get_customer(customer_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("customer {customer_id}")))?;
        let org = self.org().await?;
        let lines: Vec<OrderLine> = self
            .store
            .order_lines_for_customer(customer_id)
            .await?
            .into_iter()
            .filter(|l| org.can_view(principal, l.user_id))
            .collect();
        let invoices = group_by_invoice(lines)?;

        Ok(CustomerProfile {
            customer,
            total_sales: saturating_sum(invoices.iter().map(|i| i.total)),
            total_due: saturating_sum(invoices.iter().filter(|i| i.is_due()).map(|i| i.total)),
            invoices,
        })
    }

    // Orders and invoices.

    /// Place a multi-line order as one invoice, all or nothing.
    #[instrument(
        skip(self, principal, order),
        fields(user_id = %principal.user_id, customer_id = %order.customer_id, lines = order.lines.len())
    )]
    pub async fn create_order(&self, principal: &Principal, order: NewOrder) -> ServiceResult<Invoice> {
        let result = self.try_create_order(principal, order).await;
        match &result {
            Ok(invoice) => info!(
                invoice_id = %invoice.invoice_id,
                lines = invoice.lines.len(),
                grand_total = %invoice.grand_total,
                "order committed"
            ),
            Err(e) => warn!(kind = e.code(), error = %e, "order rejected"),
        }
        result
    }

    async fn try_create_order(&self, principal: &Principal, order: NewOrder) -> ServiceResult<Invoice> {
        authorize(principal, Permission::CreateOrder)?;
        if self.store.get_customer(order.customer_id).await?.is_none() {
            return Err(DomainError::validation(format!("unknown customer {}", order.customer_id)).into());
        }

        let cmd = CreateOrder {
            invoice_id: InvoiceId::new(),
            user_id: principal.user_id,
            customer_id: order.customer_id,
            payment_status: order.payment_status,
            lines: order.lines,
            occurred_at: Utc::now(),
        };
        self.engine.validate(&cmd)?;

        // Candidate products must pass the category gate before allocation.
        let catalog = self.store.list_products().await?;
        let product_ids = cmd.product_ids();
        for product_id in &product_ids {
            let product = catalog
                .iter()
                .find(|p| p.id == *product_id)
                .ok_or_else(|| DomainError::not_found(format!("product {product_id}")))?;
            self.gate.ensure_visible(principal, product)?;
        }

        let engine = self.engine;
        let decide: OrderDecision = Box::new(move |stocks| engine.place(&cmd, stocks));

        // Dropping the commit future on timeout drops its transaction, which rolls back.
        match tokio::time::timeout(self.order_timeout, self.store.commit_order(&product_ids, decide)).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(ServiceError::Timeout),
        }
    }

    /// The principal's own order lines, newest first.
    pub async fn my_orders(&self, principal: &Principal) -> ServiceResult<Vec<OrderLine>> {
        let mut lines = self.store.order_lines_for_users(&[principal.user_id]).await?;
        lines.sort_by(|a, b| b.order_date.cmp(&a.order_date));
        Ok(lines)
    }

    pub async fn invoice(&self, principal: &Principal, invoice_id: InvoiceId) -> ServiceResult<InvoiceDetail> {
        let lines = self.store.invoice_lines(invoice_id).await?;
        if lines.is_empty() {
            return Err(DomainError::not_found(format!("invoice {invoice_id}")).into());
        }
        let org = self.org().await?;
        let invoice = InvoiceView::from_lines(lines)?;
        let seller = self.scoped_user(&org, principal, invoice.user_id)?;

        let products: HashMap<ProductId, String> = self
            .store
            .list_products()
            .await?
            .into_iter()
            .map(|p| (p.id, p.name))
            .collect();
        let customer_name = self
            .store
            .get_customer(invoice.customer_id)
            .await?
            .map(|c| c.name)
            .unwrap_or_default();

        let items = invoice
            .lines
            .iter()
            .map(|l| InvoiceLineDetail {
                product_id: l.product_id,
                product_name: products.get(&l.product_id).cloned().unwrap_or_default(),
                quantity_units: l.quantity_units,
                unit_price: l.unit_price,
                total_amount: l.total_amount,
            })
            .collect();

        Ok(InvoiceDetail {
            salesperson: seller.full_name.clone(),
            customer_name,
            items,
            invoice,
        })
    }

    /// Mark every line of an invoice paid. Returns whether anything changed.
    #[instrument(skip(self, principal), fields(user_id = %principal.user_id, invoice_id = %invoice_id), err)]
    pub async fn mark_invoice_paid(&self, principal: &Principal, invoice_id: InvoiceId) -> ServiceResult<bool> {
        authorize(principal, Permission::MarkInvoicePaid)?;
        let mut lines = self.store.invoice_lines(invoice_id).await?;
        let seller = lines
            .first()
            .map(|l| l.user_id)
            .ok_or_else(|| DomainError::not_found(format!("invoice {invoice_id}")))?;
        let org = self.org().await?;
        self.scoped_user(&org, principal, seller)?;

        let changed = MarkInvoicePaid {
            invoice_id,
            occurred_at: Utc::now(),
        }
        .apply(&mut lines)?;
        if changed {
            let rows = self.store.mark_invoice_paid(invoice_id).await?;
            info!(rows, "invoice marked paid");
        }
        Ok(changed)
    }

    // Reports.

    pub async fn team_report(&self, principal: &Principal, view_user: UserId) -> ServiceResult<TeamReport> {
        authorize(principal, Permission::ViewTeamReports)?;
        let org = self.org().await?;
        self.scoped_user(&org, principal, view_user)?;

        let team: Vec<UserId> = org.team_of(view_user).into_iter().collect();
        let lines = self.store.order_lines_for_users(&team).await?;
        Ok(ReportingAggregator::new(&org).team_report(principal, view_user, &lines)?)
    }

    /// Invoice history of the principal's team and of each team lead reporting to them.
    pub async fn team_invoices(&self, principal: &Principal) -> ServiceResult<Vec<TeamInvoices>> {
        authorize(principal, Permission::ViewTeamReports)?;
        let org = self.org().await?;

        let team: Vec<UserId> = org.team_of(principal.user_id).into_iter().collect();
        let lines = self.store.order_lines_for_users(&team).await?;
        Ok(ReportingAggregator::new(&org).team_invoices(principal, &lines)?)
    }

    pub async fn due_summary(&self, principal: &Principal, view_user: UserId) -> ServiceResult<DueSummary> {
        let org = self.org().await?;
        self.scoped_user(&org, principal, view_user)?;

        let team: Vec<UserId> = org.team_of(view_user).into_iter().collect();
        let lines = self.store.order_lines_for_users(&team).await?;
        let names: BTreeMap<CustomerId, String> = self
            .store
            .list_customers()
            .await?
            .into_iter()
            .map(|c| (c.id, c.name))
            .collect();
        Ok(ReportingAggregator::new(&org).due_summary(principal, view_user, &lines, &names)?)
    }

    pub async fn user_profile(&self, principal: &Principal, user_id: UserId) -> ServiceResult<UserProfile> {
        let org = self.org().await?;
        let user = self.scoped_user(&org, principal, user_id)?.clone();

        let lines = self.store.order_lines_for_users(&[user_id]).await?;
        let aggregator = ReportingAggregator::new(&org);

        Ok(UserProfile {
            manager_name: org.manager_of(user_id).map(|m| m.full_name.clone()),
            categories: self.store.category_grants(user_id).await?,
            stats: aggregator.user_stats(user_id, &lines),
            invoices: aggregator.invoices_of(user_id, &lines)?,
            user,
        })
    }

    // User management.

    #[instrument(skip(self, principal, new), fields(user_id = %principal.user_id, role = %new.role), err)]
    pub async fn create_user(&self, principal: &Principal, new: NewUser) -> ServiceResult<User> {
        authorize(principal, Permission::ManageUsers)?;
        self.ensure_categories_exist(&new.categories).await?;
        let org = self.org().await?;

        let cmd = CreateUser {
            user_id: UserId::new(),
            full_name: new.full_name,
            username: new.username,
            role: new.role,
            reports_to: new.reports_to,
            categories: new.categories,
            occurred_at: Utc::now(),
        };
        let user = User::create(principal, &cmd, &org, &self.gate)?;
        self.store.insert_user(&user, &cmd.categories).await?;
        info!(new_user_id = %user.id, "user created");
        Ok(user)
    }

    /// Replace the category grants of a subordinate.
    #[instrument(skip(self, principal, categories), fields(user_id = %principal.user_id, target = %user_id), err)]
    pub async fn update_category_grants(
        &self,
        principal: &Principal,
        user_id: UserId,
        categories: BTreeSet<CategoryId>,
    ) -> ServiceResult<()> {
        authorize(principal, Permission::ManageUsers)?;
        let org = self.org().await?;
        if org.get(user_id).is_none() {
            return Err(DomainError::not_found(format!("user {user_id}")).into());
        }
        if !org.is_subordinate(principal.user_id, user_id) {
            return Err(DomainError::permission_denied("you can only change grants of your own team").into());
        }
        self.ensure_categories_exist(&categories).await?;
        self.gate.ensure_can_grant(principal, &categories)?;
        self.store.replace_category_grants(user_id, &categories).await?;
        Ok(())
    }

    /// Everyone below the principal, ordered by name.
    pub async fn team_users(&self, principal: &Principal) -> ServiceResult<Vec<TeamMember>> {
        authorize(principal, Permission::ManageUsers)?;
        let org = self.org().await?;

        let mut members = Vec::new();
        for id in org.subordinates_of(principal.user_id) {
            let Some(user) = org.get(id) else { continue };
            members.push(TeamMember {
                user: user.clone(),
                manager_name: org.manager_of(id).map(|m| m.full_name.clone()),
                categories: self.store.category_grants(id).await?,
            });
        }
        members.sort_by(|a, b| a.user.full_name.cmp(&b.user.full_name));
        Ok(members)
    }
}

#[cfg(test)]
mod tests;
