use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use wholesale_core::{CustomerId, DomainError, DomainResult, UserId};

/// A buying customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub phone: Option<String>,
    /// User who registered the customer.
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
}

/// Command: RegisterCustomer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterCustomer {
    pub customer_id: CustomerId,
    pub name: String,
    pub phone: Option<String>,
    pub created_by: UserId,
    pub occurred_at: DateTime<Utc>,
}

impl Customer {
    pub fn register(cmd: &RegisterCustomer) -> DomainResult<Customer> {
        let name = cmd.name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("customer name is required"));
        }
        // Blank phone numbers are stored as absent.
        let phone = cmd
            .phone
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string);

        Ok(Customer {
            id: cmd.customer_id,
            name: name.to_string(),
            phone,
            created_by: cmd.created_by,
            created_at: cmd.occurred_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmd(name: &str, phone: Option<&str>) -> RegisterCustomer {
        RegisterCustomer {
            customer_id: CustomerId::new(),
            name: name.to_string(),
            phone: phone.map(str::to_string),
            created_by: UserId::new(),
            occurred_at: Utc::now(),
        }
    }

    #[test]
    fn register_trims_and_drops_blank_phone() {
        let c = Customer::register(&cmd(" Rahim Store ", Some("  "))).unwrap();
        assert_eq!(c.name, "Rahim Store");
        assert_eq!(c.phone, None);
    }

    #[test]
    fn name_is_required() {
        assert!(matches!(
            Customer::register(&cmd("", Some("0171"))),
            Err(DomainError::Validation(_))
        ));
    }
}
