/// Session data: the signed-in user, their organization, role and
/// permissions, plus the authorization flags derived from them.
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// The signed-in dashboard user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    #[serde(default)]
    pub firstname: String,
    #[serde(default)]
    pub lastname: String,
    pub email: String,
    #[serde(default)]
    pub full_name: String,
}

impl User {
    /// Full name as sent by the backend, falling back to first + last.
    pub fn display_name(&self) -> String {
        if !self.full_name.trim().is_empty() {
            return self.full_name.clone();
        }
        format!("{} {}", self.firstname, self.lastname)
            .trim()
            .to_string()
    }
}

/// The employer organization the user belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub code: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// Organization-level role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserRole {
    /// Full access: writes, exports, employee management.
    OrganizationAdmin,
    /// Read-only analytics access.
    OrganizationAnalyst,
    /// Any role string the dashboard does not know about.
    Other(String),
}

impl UserRole {
    pub fn parse(role: &str) -> Self {
        match role {
            "ORGANIZATION_ADMIN" => Self::OrganizationAdmin,
            "ORGANIZATION_ANALYST" => Self::OrganizationAnalyst,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::OrganizationAdmin => "ORGANIZATION_ADMIN",
            Self::OrganizationAnalyst => "ORGANIZATION_ANALYST",
            Self::Other(role) => role,
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An authenticated session held client-side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user: User,
    pub organization: Organization,
    /// Raw role string; `None` when the backend or cache had none.
    pub role: Option<String>,
    pub permissions: BTreeSet<String>,
}

impl Session {
    pub fn user_role(&self) -> Option<UserRole> {
        self.role.as_deref().map(UserRole::parse)
    }

    pub fn has_role(&self, role: &UserRole) -> bool {
        self.user_role().as_ref() == Some(role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(&UserRole::OrganizationAdmin)
    }

    pub fn is_analyst(&self) -> bool {
        self.has_role(&UserRole::OrganizationAnalyst)
    }

    // Write, export and employee management are admin-only.

    pub fn can_write(&self) -> bool {
        self.is_admin()
    }

    pub fn can_export(&self) -> bool {
        self.is_admin()
    }

    pub fn can_manage_employees(&self) -> bool {
        self.is_admin()
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }

    pub fn belongs_to_organization(&self, organization_id: u64) -> bool {
        self.organization.id == organization_id
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn session_with_role(role: Option<&str>) -> Session {
        Session {
            token: "t".to_string(),
            user: User {
                id: 1,
                firstname: "Ada".to_string(),
                lastname: "Obi".to_string(),
                email: "ada@acme.test".to_string(),
                full_name: String::new(),
            },
            organization: Organization {
                id: 7,
                name: "Acme".to_string(),
                code: "ACME".to_string(),
                kind: "corporate".to_string(),
            },
            role: role.map(str::to_string),
            permissions: ["view_reports".to_string()].into_iter().collect(),
        }
    }

    #[test]
    fn admin_gets_write_export_and_employee_management() {
        let session = session_with_role(Some("ORGANIZATION_ADMIN"));
        assert!(session.is_admin());
        assert!(!session.is_analyst());
        assert!(session.can_write());
        assert!(session.can_export());
        assert!(session.can_manage_employees());
    }

    #[test]
    fn analyst_is_read_only() {
        let session = session_with_role(Some("ORGANIZATION_ANALYST"));
        assert!(session.is_analyst());
        assert!(!session.can_write());
        assert!(!session.can_export());
        assert!(!session.can_manage_employees());
    }

    #[test]
    fn missing_or_unknown_role_grants_nothing() {
        for role in [None, Some("SUPPORT")] {
            let session = session_with_role(role);
            assert!(!session.is_admin());
            assert!(!session.is_analyst());
            assert!(!session.can_export());
        }
    }

    #[test]
    fn permissions_and_organization_membership() {
        let session = session_with_role(None);
        assert!(session.has_permission("view_reports"));
        assert!(!session.has_permission("export_data"));
        assert!(session.belongs_to_organization(7));
        assert!(!session.belongs_to_organization(8));
    }

    #[test]
    fn display_name_falls_back_to_first_and_last() {
        let session = session_with_role(None);
        assert_eq!(session.user.display_name(), "Ada Obi");
    }

    #[test]
    fn role_round_trips_through_string() {
        assert_eq!(UserRole::parse("ORGANIZATION_ADMIN"), UserRole::OrganizationAdmin);
        assert_eq!(UserRole::OrganizationAnalyst.to_string(), "ORGANIZATION_ANALYST");
        assert_eq!(UserRole::parse("X").as_str(), "X");
    }

    #[test]
    fn organization_type_field_is_renamed() {
        let org: Organization =
            serde_json::from_str(r#"{"id":3,"name":"Beta","code":"B","type":"sme"}"#).unwrap();
        assert_eq!(org.kind, "sme");
    }
}
