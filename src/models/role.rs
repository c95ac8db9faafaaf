//! Role domain model and declared role sets

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Capability label attached to every login account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Hr,
    Manager,
    Employee,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::Hr, Role::Manager, Role::Employee];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Hr => "HR",
            Role::Manager => "MANAGER",
            Role::Employee => "EMPLOYEE",
        }
    }

    /// Roles that see every row without a scope predicate.
    pub fn sees_all_records(&self) -> bool {
        match self {
            Role::Admin | Role::Hr => true,
            Role::Manager | Role::Employee => false,
        }
    }

    const fn bit(self) -> u8 {
        match self {
            Role::Admin => 0b0001,
            Role::Hr => 0b0010,
            Role::Manager => 0b0100,
            Role::Employee => 0b1000,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ADMIN" => Ok(Role::Admin),
            "HR" => Ok(Role::Hr),
            "MANAGER" => Ok(Role::Manager),
            "EMPLOYEE" => Ok(Role::Employee),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// Set of roles a route admits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleSet(u8);

impl RoleSet {
    pub const ADMIN: RoleSet = RoleSet::of(&[Role::Admin]);
    pub const ADMIN_HR: RoleSet = RoleSet::of(&[Role::Admin, Role::Hr]);
    pub const ADMIN_HR_MANAGER: RoleSet = RoleSet::of(&[Role::Admin, Role::Hr, Role::Manager]);
    pub const ANY: RoleSet = RoleSet::of(&Role::ALL);

    pub const fn of(roles: &[Role]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < roles.len() {
            bits |= roles[i].bit();
            i += 1;
        }
        RoleSet(bits)
    }

    pub const fn contains(&self, role: Role) -> bool {
        self.0 & role.bit() != 0
    }

    pub fn roles(&self) -> Vec<Role> {
        Role::ALL.into_iter().filter(|r| self.contains(*r)).collect()
    }
}

impl fmt::Display for RoleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.roles().iter().map(|r| r.as_str()).collect();
        write!(f, "{}", names.join("|"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_set_membership() {
        assert!(RoleSet::ADMIN.contains(Role::Admin));
        assert!(!RoleSet::ADMIN.contains(Role::Hr));

        assert!(RoleSet::ADMIN_HR.contains(Role::Hr));
        assert!(!RoleSet::ADMIN_HR.contains(Role::Manager));

        assert!(RoleSet::ADMIN_HR_MANAGER.contains(Role::Manager));
        assert!(!RoleSet::ADMIN_HR_MANAGER.contains(Role::Employee));

        for role in Role::ALL {
            assert!(RoleSet::ANY.contains(role));
        }
    }

    #[test]
    fn test_role_parse_round_trip() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert_eq!("hr".parse::<Role>().unwrap(), Role::Hr);
        assert!("superuser".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_set_display() {
        assert_eq!(RoleSet::ADMIN_HR.to_string(), "ADMIN|HR");
    }

    #[test]
    fn test_role_serde_uppercase() {
        let json = serde_json::to_string(&Role::Manager).unwrap();
        assert_eq!(json, "\"MANAGER\"");
    }
}
