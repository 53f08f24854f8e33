use std::collections::{BTreeMap, HashSet};

use rust_decimal::Decimal;

use wholesale_auth::{Permission, Principal, Role, authorize};
use wholesale_core::{CustomerId, DomainError, DomainResult, UserId, saturating_sum};
use wholesale_invoicing::{InvoiceView, group_by_invoice};
use wholesale_org::{OrgHierarchy, User};
use wholesale_sales::OrderLine;

use crate::{
    CustomerDue, DueSummary, MemberDue, MemberSummary, TeamInvoices, TeamReport, TeamReportBody,
    UserRef, UserStats,
};

/// Read-only aggregation of order lines over hierarchy subtrees.
///
/// Callers hand in the lines of (at least) the viewed subtree; lines of
/// other users are ignored.
#[derive(Debug, Clone, Copy)]
pub struct ReportingAggregator<'a> {
    org: &'a OrgHierarchy,
}

impl<'a> ReportingAggregator<'a> {
    pub fn new(org: &'a OrgHierarchy) -> Self {
        Self { org }
    }

    /// The viewed user, if the principal may see them (self, subtree, or owner).
    pub fn ensure_can_view(&self, principal: &Principal, user_id: UserId) -> DomainResult<&'a User> {
        let user = self
            .org
            .get(user_id)
            .ok_or_else(|| DomainError::not_found(format!("user {user_id}")))?;
        if self.org.can_view(principal, user_id) {
            Ok(user)
        } else {
            Err(DomainError::permission_denied(format!(
                "user {user_id} is outside the acting user's team"
            )))
        }
    }

    fn breadcrumbs(&self, principal: &Principal, user_id: UserId) -> Vec<UserRef> {
        self.org
            .breadcrumbs(user_id, principal.user_id)
            .into_iter()
            .map(UserRef::from)
            .collect()
    }

    /// One rollup per direct report of `view_user`, each covering that
    /// report's whole subtree. Ordered by name.
    pub fn team_summary(&self, view_user: UserId, lines: &[OrderLine]) -> Vec<MemberSummary> {
        self.org
            .direct_reports(view_user)
            .into_iter()
            .map(|member| {
                let team = self.org.team_of(member.id);
                let (total_sales, total_profit) = lines
                    .iter()
                    .filter(|l| team.contains(&l.user_id))
                    .fold((Decimal::ZERO, Decimal::ZERO), |(sales, profit), l| {
                        (sales.saturating_add(l.total_amount), profit.saturating_add(l.profit()))
                    });
                MemberSummary {
                    member_id: member.id,
                    full_name: member.full_name.clone(),
                    role: member.role,
                    team_size: team.len(),
                    total_sales,
                    total_profit,
                }
            })
            .collect()
    }

    /// Team report with drill-down: rollups for a team lead, invoices for a
    /// salesperson.
    pub fn team_report(
        &self,
        principal: &Principal,
        view_user: UserId,
        lines: &[OrderLine],
    ) -> DomainResult<TeamReport> {
        authorize(principal, Permission::ViewTeamReports)?;
        let user = self.ensure_can_view(principal, view_user)?;

        let body = if user.role == Role::Sales {
            TeamReportBody::Invoices(self.invoices_of(view_user, lines)?)
        } else {
            TeamReportBody::Members(self.team_summary(view_user, lines))
        };

        Ok(TeamReport {
            view_user: UserRef::from(user),
            breadcrumbs: self.breadcrumbs(principal, view_user),
            body,
        })
    }

    /// Invoice history per team: the principal's own team first, then one
    /// entry per direct report who leads a team, by name.
    pub fn team_invoices(&self, principal: &Principal, lines: &[OrderLine]) -> DomainResult<Vec<TeamInvoices>> {
        authorize(principal, Permission::ViewTeamReports)?;
        let me = self.ensure_can_view(principal, principal.user_id)?;

        let leads = self
            .org
            .direct_reports(principal.user_id)
            .into_iter()
            .filter(|u| u.role.is_team_lead());
        std::iter::once(me)
            .chain(leads)
            .map(|leader| -> DomainResult<TeamInvoices> {
                let team = self.org.team_of(leader.id);
                Ok(TeamInvoices {
                    leader: UserRef::from(leader),
                    team_size: team.len(),
                    invoices: group_by_invoice(
                        lines.iter().filter(|l| team.contains(&l.user_id)).cloned(),
                    )?,
                })
            })
            .collect()
    }

    /// Due-payment drill-down below `view_user`.
    pub fn due_summary(
        &self,
        principal: &Principal,
        view_user: UserId,
        lines: &[OrderLine],
        customer_names: &BTreeMap<CustomerId, String>,
    ) -> DomainResult<DueSummary> {
        authorize(principal, Permission::ViewDueReports)?;
        let user = self.ensure_can_view(principal, view_user)?;

        let personal_customers = customer_dues(
            lines.iter().filter(|l| l.user_id == view_user && l.is_due()),
            customer_names,
        )?;
        let personal_total_due = saturating_sum(personal_customers.iter().map(|c| c.total_due));

        let mut members = self
            .org
            .direct_reports(view_user)
            .into_iter()
            .map(|member| {
                let team: HashSet<UserId> = self.org.team_of(member.id);
                let customers = customer_dues(
                    lines.iter().filter(|l| team.contains(&l.user_id) && l.is_due()),
                    customer_names,
                )?;
                Ok(MemberDue {
                    member_id: member.id,
                    full_name: member.full_name.clone(),
                    role: member.role,
                    total_due: saturating_sum(customers.iter().map(|c| c.total_due)),
                    customers,
                })
            })
            .collect::<DomainResult<Vec<_>>>()?;
        // Stable, so equal totals keep name order.
        members.sort_by(|a, b| b.total_due.cmp(&a.total_due));

        let team_total_due =
            personal_total_due.saturating_add(saturating_sum(members.iter().map(|m| m.total_due)));

        Ok(DueSummary {
            view_user: UserRef::from(user),
            breadcrumbs: self.breadcrumbs(principal, view_user),
            personal_total_due,
            personal_customers,
            members,
            team_total_due,
        })
    }

    /// Lifetime figures of `user_id`'s own sales.
    pub fn user_stats(&self, user_id: UserId, lines: &[OrderLine]) -> UserStats {
        let own: Vec<&OrderLine> = lines.iter().filter(|l| l.user_id == user_id).collect();
        let invoices: HashSet<_> = own.iter().map(|l| l.invoice_id).collect();
        UserStats {
            total_sales: saturating_sum(own.iter().map(|l| l.total_amount)),
            total_profit: saturating_sum(own.iter().map(|l| l.profit())),
            total_due: saturating_sum(own.iter().filter(|l| l.is_due()).map(|l| l.total_amount)),
            invoice_count: invoices.len(),
        }
    }

    /// Invoices sold by `user_id`, newest first.
    pub fn invoices_of(&self, user_id: UserId, lines: &[OrderLine]) -> DomainResult<Vec<InvoiceView>> {
        group_by_invoice(lines.iter().filter(|l| l.user_id == user_id).cloned())
    }
}

/// Group due lines per customer; customers by total due descending,
/// invoices oldest first.
fn customer_dues<'l>(
    lines: impl Iterator<Item = &'l OrderLine>,
    customer_names: &BTreeMap<CustomerId, String>,
) -> DomainResult<Vec<CustomerDue>> {
    let mut per_customer: BTreeMap<CustomerId, Vec<OrderLine>> = BTreeMap::new();
    for line in lines {
        per_customer.entry(line.customer_id).or_default().push(line.clone());
    }

    let mut customers = per_customer
        .into_iter()
        .map(|(customer_id, lines)| {
            let mut invoices = group_by_invoice(lines)?;
            invoices.reverse();
            Ok(CustomerDue {
                customer_id,
                customer_name: customer_names
                    .get(&customer_id)
                    .cloned()
                    .unwrap_or_else(|| customer_id.to_string()),
                total_due: saturating_sum(invoices.iter().map(|i| i.total)),
                invoices,
            })
        })
        .collect::<DomainResult<Vec<_>>>()?;
    customers.sort_by(|a, b| {
        b.total_due
            .cmp(&a.total_due)
            .then_with(|| a.customer_name.cmp(&b.customer_name))
    });
    Ok(customers)
}
