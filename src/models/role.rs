use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    ContractAdmin,
    Preventionist,
    Supervisor,
    Operational,
}

impl Role {
    /// Single capability check used by the route guard and by in-handler
    /// gating. An empty allow-list means any authenticated role.
    pub fn validate(&self, allowed: &[Role]) -> bool {
        allowed.is_empty() || allowed.contains(self)
    }

    /// Only operational users and supervisors carry per-user checklist
    /// assignments.
    pub fn is_assignable(&self) -> bool {
        matches!(self, Role::Operational | Role::Supervisor)
    }

    pub fn parse(value: &str) -> Option<Role> {
        match value {
            "admin" => Some(Role::Admin),
            "contract_admin" => Some(Role::ContractAdmin),
            "preventionist" => Some(Role::Preventionist),
            "supervisor" => Some(Role::Supervisor),
            "operational" => Some(Role::Operational),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::ContractAdmin => "contract_admin",
            Role::Preventionist => "preventionist",
            Role::Supervisor => "supervisor",
            Role::Operational => "operational",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_allow_list_accepts_any_role() {
        assert!(Role::Operational.validate(&[]));
        assert!(Role::Admin.validate(&[]));
    }

    #[test]
    fn allow_list_rejects_missing_role() {
        assert!(!Role::Operational.validate(&[Role::Admin]));
        assert!(Role::Admin.validate(&[Role::Admin, Role::Preventionist]));
    }

    #[test]
    fn assignable_roles() {
        assert!(Role::Operational.is_assignable());
        assert!(Role::Supervisor.is_assignable());
        assert!(!Role::Admin.is_assignable());
        assert!(!Role::ContractAdmin.is_assignable());
        assert!(!Role::Preventionist.is_assignable());
    }

    #[test]
    fn parse_round_trip() {
        for role in [
            Role::Admin,
            Role::ContractAdmin,
            Role::Preventionist,
            Role::Supervisor,
            Role::Operational,
        ] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("owner"), None);
    }
}
