use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use wholesale_core::{CategoryId, UserId};

use crate::Role;

/// The authenticated actor of one core call.
///
/// Resolved per request by the caller (user id, role, category grants) and
/// passed explicitly; never held as process-wide state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: UserId,
    pub role: Role,
    /// Explicit category grants. Ignored for owners, who implicitly hold all.
    pub category_grants: BTreeSet<CategoryId>,
}

impl Principal {
    pub fn new(user_id: UserId, role: Role, category_grants: BTreeSet<CategoryId>) -> Self {
        Self {
            user_id,
            role,
            category_grants,
        }
    }

    pub fn is_owner(&self) -> bool {
        self.role == Role::Owner
    }

    pub fn holds_category(&self, category_id: CategoryId) -> bool {
        self.is_owner() || self.category_grants.contains(&category_id)
    }
}
