use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use wholesale_auth::Role;
use wholesale_core::{CustomerId, UserId};
use wholesale_invoicing::InvoiceView;
use wholesale_org::User;

/// Short reference to a user, for breadcrumbs and rollup rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    pub user_id: UserId,
    pub full_name: String,
    pub role: Role,
}

impl From<&User> for UserRef {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            full_name: user.full_name.clone(),
            role: user.role,
        }
    }
}

/// Sales and profit of one direct report's whole subtree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberSummary {
    pub member_id: UserId,
    pub full_name: String,
    pub role: Role,
    /// The member plus everyone under them.
    pub team_size: usize,
    pub total_sales: Decimal,
    pub total_profit: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamReport {
    pub view_user: UserRef,
    /// From just below the viewer down to the viewed user.
    pub breadcrumbs: Vec<UserRef>,
    pub body: TeamReportBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "items", rename_all = "snake_case")]
pub enum TeamReportBody {
    /// Rollups per direct report of a team lead.
    Members(Vec<MemberSummary>),
    /// Invoices of a salesperson, newest first.
    Invoices(Vec<InvoiceView>),
}

/// Invoice history of one team lead's whole subtree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamInvoices {
    pub leader: UserRef,
    /// The leader plus everyone under them.
    pub team_size: usize,
    /// Newest first.
    pub invoices: Vec<InvoiceView>,
}

/// Due invoices of one customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDue {
    pub customer_id: CustomerId,
    pub customer_name: String,
    pub total_due: Decimal,
    /// Oldest first.
    pub invoices: Vec<InvoiceView>,
}

/// Due totals of one direct report's subtree, drillable per customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberDue {
    pub member_id: UserId,
    pub full_name: String,
    pub role: Role,
    pub total_due: Decimal,
    pub customers: Vec<CustomerDue>,
}

/// Drill-down tree: member → customer → invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DueSummary {
    pub view_user: UserRef,
    pub breadcrumbs: Vec<UserRef>,
    /// Dues on the view user's own sales.
    pub personal_total_due: Decimal,
    pub personal_customers: Vec<CustomerDue>,
    /// Ordered by total due, largest first.
    pub members: Vec<MemberDue>,
    /// Personal plus every member.
    pub team_total_due: Decimal,
}

/// Lifetime figures of one salesperson's own sales.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserStats {
    pub total_sales: Decimal,
    pub total_profit: Decimal,
    pub total_due: Decimal,
    pub invoice_count: usize,
}
