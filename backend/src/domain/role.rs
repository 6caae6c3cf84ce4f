//! Staff roles recognised by the clinic dashboard.
//!
//! Roles form a closed set. Two of them, [`Role::SuperAdmin`] and
//! [`Role::Admin`], bypass every permission check performed by the access
//! evaluator.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Role tag attached to an authenticated user.
///
/// # Examples
///
/// ```
/// # use clinic_backend::domain::Role;
/// let role: Role = "receptionist".parse().expect("known role");
///
/// assert_eq!(role, Role::Receptionist);
/// assert!(!role.is_bypass());
/// assert!(Role::Admin.is_bypass());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Tenant owner with unrestricted access.
    SuperAdmin,
    /// Clinic administrator with unrestricted access.
    Admin,
    Doctor,
    Nurse,
    Receptionist,
    Accountant,
    LabTechnician,
    Pharmacist,
    /// Generic staff member; relies entirely on granted permissions.
    Staff,
}

impl Role {
    /// Every role, in declaration order.
    pub const ALL: [Self; 9] = [
        Self::SuperAdmin,
        Self::Admin,
        Self::Doctor,
        Self::Nurse,
        Self::Receptionist,
        Self::Accountant,
        Self::LabTechnician,
        Self::Pharmacist,
        Self::Staff,
    ];

    /// Returns the wire representation of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "super_admin",
            Self::Admin => "admin",
            Self::Doctor => "doctor",
            Self::Nurse => "nurse",
            Self::Receptionist => "receptionist",
            Self::Accountant => "accountant",
            Self::LabTechnician => "lab_technician",
            Self::Pharmacist => "pharmacist",
            Self::Staff => "staff",
        }
    }

    /// Whether holders of this role skip every permission check.
    pub fn is_bypass(&self) -> bool {
        matches!(self, Self::SuperAdmin | Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown role tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRoleError {
    /// The unrecognised input value.
    pub input: String,
}

impl fmt::Display for ParseRoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role: {}", self.input)
    }
}

impl std::error::Error for ParseRoleError {}

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| ParseRoleError {
                input: s.to_owned(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::super_admin(Role::SuperAdmin, true)]
    #[case::admin(Role::Admin, true)]
    #[case::doctor(Role::Doctor, false)]
    #[case::receptionist(Role::Receptionist, false)]
    #[case::staff(Role::Staff, false)]
    fn bypass_set_is_super_admin_and_admin(#[case] role: Role, #[case] expected: bool) {
        assert_eq!(role.is_bypass(), expected);
    }

    #[rstest]
    fn as_str_matches_parse_for_every_role() {
        for role in Role::ALL {
            let parsed: Role = role.as_str().parse().expect("round-trip should succeed");
            assert_eq!(parsed, role);
        }
    }

    #[rstest]
    #[case::unknown("janitor")]
    #[case::empty("")]
    #[case::capitalised("Admin")]
    fn rejects_unknown_roles(#[case] input: &str) {
        let result: Result<Role, _> = input.parse();
        assert_eq!(
            result,
            Err(ParseRoleError {
                input: input.to_owned()
            })
        );
    }

    #[rstest]
    fn serde_uses_snake_case_tags() {
        let json = serde_json::to_string(&Role::LabTechnician).expect("serialise");
        assert_eq!(json, "\"lab_technician\"");
    }
}
