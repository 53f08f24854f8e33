use thiserror::Error;

use wholesale_core::DomainError;

use crate::{Permission, Principal, Role};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: role '{role}' lacks permission '{permission}'")]
    Forbidden { role: Role, permission: Permission },

    #[error("forbidden: role '{actor}' cannot create users with role '{requested}'")]
    RoleNotCreatable { actor: Role, requested: Role },
}

impl From<AuthzError> for DomainError {
    fn from(value: AuthzError) -> Self {
        DomainError::permission_denied(value.to_string())
    }
}

/// Check that the principal's role carries `required`.
///
/// - No IO
/// - No panics
/// - No business logic (pure policy check)
pub fn authorize(principal: &Principal, required: Permission) -> Result<(), AuthzError> {
    if required.granted_to(principal.role) {
        Ok(())
    } else {
        tracing::debug!(
            user_id = %principal.user_id,
            role = %principal.role,
            permission = %required,
            "authorization denied"
        );
        Err(AuthzError::Forbidden {
            role: principal.role,
            permission: required,
        })
    }
}

/// Check that the principal may create a user holding `role`.
pub fn authorize_role_creation(principal: &Principal, role: Role) -> Result<(), AuthzError> {
    authorize(principal, Permission::ManageUsers)?;
    if principal.role.can_create(role) {
        Ok(())
    } else {
        Err(AuthzError::RoleNotCreatable {
            actor: principal.role,
            requested: role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use wholesale_core::UserId;

    fn principal(role: Role) -> Principal {
        Principal::new(UserId::new(), role, BTreeSet::new())
    }

    #[test]
    fn every_role_may_create_orders() {
        for role in Role::ALL {
            assert!(authorize(&principal(role), Permission::CreateOrder).is_ok());
        }
    }

    #[test]
    fn team_reports_require_a_team_lead() {
        assert!(authorize(&principal(Role::Sales), Permission::ViewTeamReports).is_err());
        assert!(authorize(&principal(Role::SalesHead), Permission::ViewTeamReports).is_ok());
    }

    #[test]
    fn only_owner_receives_stock() {
        assert!(authorize(&principal(Role::Owner), Permission::ReceiveStock).is_ok());
        let err = authorize(&principal(Role::Manager), Permission::ReceiveStock).unwrap_err();
        assert!(matches!(
            DomainError::from(err),
            DomainError::PermissionDenied(msg) if msg.contains("inventory.receive")
        ));
    }

    #[test]
    fn supervisor_cannot_create_a_manager() {
        assert!(authorize_role_creation(&principal(Role::Supervisor), Role::Sales).is_ok());
        assert_eq!(
            authorize_role_creation(&principal(Role::Supervisor), Role::Manager),
            Err(AuthzError::RoleNotCreatable {
                actor: Role::Supervisor,
                requested: Role::Manager
            })
        );
    }
}
