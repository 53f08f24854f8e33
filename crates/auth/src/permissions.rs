use serde::{Deserialize, Serialize};

use crate::Role;

/// Operations guarded at the service boundary.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    CreateOrder,
    RegisterCustomer,
    ViewDueReports,
    MarkInvoicePaid,
    ViewTeamReports,
    ManageUsers,
    ManageCatalog,
    ReceiveStock,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::CreateOrder => "orders.create",
            Permission::RegisterCustomer => "customers.register",
            Permission::ViewDueReports => "reports.due",
            Permission::MarkInvoicePaid => "invoices.mark_paid",
            Permission::ViewTeamReports => "reports.team",
            Permission::ManageUsers => "users.manage",
            Permission::ManageCatalog => "catalog.manage",
            Permission::ReceiveStock => "inventory.receive",
        }
    }

    /// Role → permission policy.
    pub fn granted_to(&self, role: Role) -> bool {
        match self {
            Permission::CreateOrder
            | Permission::RegisterCustomer
            | Permission::ViewDueReports
            | Permission::MarkInvoicePaid => true,
            Permission::ViewTeamReports | Permission::ManageUsers => role.is_team_lead(),
            Permission::ManageCatalog | Permission::ReceiveStock => role == Role::Owner,
        }
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
