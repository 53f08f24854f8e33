//! Category access gate: which products a principal may transact against.

use std::collections::BTreeSet;

use wholesale_core::{CategoryId, DomainError, DomainResult};
use wholesale_products::Product;

use crate::Principal;

/// Filters the catalog by category grants and guards grant delegation.
///
/// Stateless: grants travel on the [`Principal`]. Callers must filter the
/// product list through [`CategoryAccessGate::visible_products`] before
/// handing candidates to the order engine; owners bypass filtering.
#[derive(Debug, Default, Clone, Copy)]
pub struct CategoryAccessGate;

impl CategoryAccessGate {
    pub fn new() -> Self {
        Self
    }

    /// Products the principal may see and sell. May be empty.
    pub fn visible_products<'a>(
        &self,
        principal: &Principal,
        catalog: impl IntoIterator<Item = &'a Product>,
    ) -> Vec<&'a Product> {
        catalog
            .into_iter()
            .filter(|p| principal.holds_category(p.category_id))
            .collect()
    }

    /// Whether `manager` may delegate `category_id` to a subordinate.
    ///
    /// Owners may grant anything; everyone else only what they hold.
    pub fn can_grant(&self, manager: &Principal, category_id: CategoryId) -> bool {
        manager.holds_category(category_id)
    }

    /// Check a whole grant set, failing on the first category the manager does not hold.
    pub fn ensure_can_grant(
        &self,
        manager: &Principal,
        categories: &BTreeSet<CategoryId>,
    ) -> DomainResult<()> {
        match categories.iter().find(|c| !self.can_grant(manager, **c)) {
            Some(denied) => Err(DomainError::permission_denied(format!(
                "category {denied} is not granted to the acting user"
            ))),
            None => Ok(()),
        }
    }

    /// Whether the principal may sell this product.
    pub fn ensure_visible(&self, principal: &Principal, product: &Product) -> DomainResult<()> {
        if principal.holds_category(product.category_id) {
            Ok(())
        } else {
            Err(DomainError::permission_denied(format!(
                "product '{}' is outside the categories granted to the acting user",
                product.name
            )))
        }
    }
}
