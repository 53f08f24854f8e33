use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use wholesale_auth::{CategoryAccessGate, Principal, Role, authorize_role_creation};
use wholesale_core::{CategoryId, DomainError, DomainResult, UserId};

use crate::OrgHierarchy;

/// A member of the sales organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub full_name: String,
    pub username: String,
    pub role: Role,
    /// Direct manager; `None` only for the owner.
    pub reports_to: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

/// Command: CreateUser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateUser {
    pub user_id: UserId,
    pub full_name: String,
    pub username: String,
    pub role: Role,
    pub reports_to: UserId,
    pub categories: BTreeSet<CategoryId>,
    pub occurred_at: DateTime<Utc>,
}

impl User {
    /// The root of the organization.
    pub fn owner(
        user_id: UserId,
        full_name: impl Into<String>,
        username: impl Into<String>,
        occurred_at: DateTime<Utc>,
    ) -> User {
        User {
            id: user_id,
            full_name: full_name.into(),
            username: username.into(),
            role: Role::Owner,
            reports_to: None,
            created_at: occurred_at,
        }
    }

    /// Validate a user creation requested by `actor`.
    ///
    /// The new user must report to the actor or to someone in the actor's
    /// subordinate closure, and that manager must outrank the new role. A new
    /// user has no reports yet, so this can never close a reporting cycle.
    pub fn create(
        actor: &Principal,
        cmd: &CreateUser,
        org: &OrgHierarchy,
        gate: &CategoryAccessGate,
    ) -> DomainResult<User> {
        let full_name = cmd.full_name.trim();
        let username = cmd.username.trim();
        if full_name.is_empty() || username.is_empty() {
            return Err(DomainError::validation("full name and username are required"));
        }

        authorize_role_creation(actor, cmd.role)?;

        let manager = org
            .get(cmd.reports_to)
            .ok_or_else(|| DomainError::not_found(format!("user {}", cmd.reports_to)))?;
        if !org.can_view(actor, manager.id) {
            return Err(DomainError::permission_denied(
                "new users must report to you or to someone in your team",
            ));
        }
        if manager.role.rank() <= cmd.role.rank() {
            return Err(DomainError::validation(format!(
                "a {} cannot report to a {}",
                cmd.role, manager.role
            )));
        }

        if org.users().any(|u| u.username == username) {
            return Err(DomainError::conflict("this username is already taken"));
        }

        gate.ensure_can_grant(actor, &cmd.categories)?;

        Ok(User {
            id: cmd.user_id,
            full_name: full_name.to_string(),
            username: username.to_string(),
            role: cmd.role,
            reports_to: Some(cmd.reports_to),
            created_at: cmd.occurred_at,
        })
    }
}
