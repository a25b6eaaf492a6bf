//! Static role → permission table for admin sessions.
//!
//! Everything here is pure: safe to call from request handlers, extractors
//! and rendering code alike. Lookups fail closed.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::session::SessionRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    Dashboard,
    Posts,
    Payments,
    Applications,
    Guardians,
    Teachers,
    Ads,
    Invoices,
    Notifications,
    Settings,
}

impl Permission {
    pub const ALL: [Permission; 10] = [
        Permission::Dashboard,
        Permission::Posts,
        Permission::Payments,
        Permission::Applications,
        Permission::Guardians,
        Permission::Teachers,
        Permission::Ads,
        Permission::Invoices,
        Permission::Notifications,
        Permission::Settings,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::Dashboard => "dashboard",
            Permission::Posts => "posts",
            Permission::Payments => "payments",
            Permission::Applications => "applications",
            Permission::Guardians => "guardians",
            Permission::Teachers => "teachers",
            Permission::Ads => "ads",
            Permission::Invoices => "invoices",
            Permission::Notifications => "notifications",
            Permission::Settings => "settings",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Permission::ALL
            .into_iter()
            .find(|permission| permission.as_str() == s)
            .ok_or(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
    SuperAdmin,
    Admin,
    SupportAdmin,
    FinanceAdmin,
}

impl AdminRole {
    pub const ALL: [AdminRole; 4] = [
        AdminRole::SuperAdmin,
        AdminRole::Admin,
        AdminRole::SupportAdmin,
        AdminRole::FinanceAdmin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AdminRole::SuperAdmin => "super_admin",
            AdminRole::Admin => "admin",
            AdminRole::SupportAdmin => "support_admin",
            AdminRole::FinanceAdmin => "finance_admin",
        }
    }

    pub fn is_super(&self) -> bool {
        matches!(self, AdminRole::SuperAdmin)
    }

    /// Fixed table entry for this role.
    pub fn grants(&self, permission: Permission) -> bool {
        use Permission::*;

        match self {
            AdminRole::SuperAdmin => true,
            AdminRole::Admin => !matches!(permission, Settings),
            AdminRole::SupportAdmin => matches!(
                permission,
                Dashboard | Posts | Applications | Guardians | Teachers | Notifications
            ),
            AdminRole::FinanceAdmin => matches!(permission, Dashboard | Payments | Invoices),
        }
    }

    pub fn granted(&self) -> Vec<Permission> {
        Permission::ALL
            .into_iter()
            .filter(|permission| self.grants(*permission))
            .collect()
    }
}

impl FromStr for AdminRole {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AdminRole::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or(())
    }
}

/// Whether `role` may use `permission`.
///
/// The super role passes for any permission name, known or not. Every other
/// role needs a table entry, so unknown roles and permissions are denied.
pub fn has_permission(role: &str, permission: &str) -> bool {
    let Ok(role) = role.parse::<AdminRole>() else {
        return false;
    };

    if role.is_super() {
        return true;
    }

    permission
        .parse::<Permission>()
        .map(|permission| role.grants(permission))
        .unwrap_or(false)
}

/// Permission check for a verified session.
///
/// Per-token grants from the `permissions` claim override the role table,
/// except that the super role can never be narrowed.
pub fn session_has_permission(session: &SessionRecord, permission: &str) -> bool {
    if !session.is_admin {
        return false;
    }

    let role = session.role.as_deref().unwrap_or_default();
    if matches!(role.parse::<AdminRole>(), Ok(AdminRole::SuperAdmin)) {
        return true;
    }

    if let Some(explicit) = session
        .permissions
        .as_ref()
        .and_then(|granted| granted.get(permission))
    {
        return *explicit;
    }

    has_permission(role, permission)
}
