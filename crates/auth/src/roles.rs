use core::str::FromStr;

use serde::{Deserialize, Serialize};

use wholesale_core::DomainError;

/// Position of a user in the sales organization, lowest first.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Sales,
    SalesHead,
    Supervisor,
    Manager,
    Owner,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Sales,
        Role::SalesHead,
        Role::Supervisor,
        Role::Manager,
        Role::Owner,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Sales => "sales",
            Role::SalesHead => "sales_head",
            Role::Supervisor => "supervisor",
            Role::Manager => "manager",
            Role::Owner => "owner",
        }
    }

    /// Seniority; a higher rank sits closer to the owner.
    pub fn rank(&self) -> u8 {
        match self {
            Role::Sales => 0,
            Role::SalesHead => 1,
            Role::Supervisor => 2,
            Role::Manager => 3,
            Role::Owner => 4,
        }
    }

    /// Roles a user of this role may create: every role strictly below it,
    /// never another owner.
    pub fn creatable_roles(&self) -> Vec<Role> {
        Role::ALL
            .iter()
            .copied()
            .filter(|r| *r != Role::Owner && r.rank() < self.rank())
            .collect()
    }

    pub fn can_create(&self, role: Role) -> bool {
        self.creatable_roles().contains(&role)
    }

    /// Team leads are every role that can have reports.
    pub fn is_team_lead(&self) -> bool {
        *self != Role::Sales
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .iter()
            .copied()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| DomainError::validation(format!("unknown role '{s}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creatable_roles_follow_the_chain() {
        assert_eq!(
            Role::Owner.creatable_roles(),
            vec![Role::Sales, Role::SalesHead, Role::Supervisor, Role::Manager]
        );
        assert_eq!(
            Role::Manager.creatable_roles(),
            vec![Role::Sales, Role::SalesHead, Role::Supervisor]
        );
        assert_eq!(Role::Supervisor.creatable_roles(), vec![Role::Sales, Role::SalesHead]);
        assert_eq!(Role::SalesHead.creatable_roles(), vec![Role::Sales]);
        assert!(Role::Sales.creatable_roles().is_empty());
    }

    #[test]
    fn roles_parse_from_their_wire_names() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("admin".parse::<Role>().is_err());
    }
}
