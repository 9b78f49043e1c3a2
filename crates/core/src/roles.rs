//! Email allowlists and the route gate built on them.
//!
//! Roles are not stored anywhere. They are resolved on every request by
//! comparing the signed-in email against the lists below, so granting or
//! revoking access means editing this file and redeploying.

use crate::types::{Email, Role};

/// Emails with full access to `/admin/*`.
pub const SUPER_ADMINS: &[&str] = &["admin1@gmail.com"];

/// Emails allowed to manage products under `/staff/*`.
pub const STAFF_USERS: &[&str] = &["staff@mrshopy.com", "staff1@gmail.com"];

/// Protected sections of the site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Area {
    /// `/admin/*`
    Admin,
    /// `/staff/*`
    Staff,
}

impl Area {
    /// URL prefix of the section.
    #[must_use]
    pub const fn base_path(&self) -> &'static str {
        match self {
            Self::Admin => "/admin",
            Self::Staff => "/staff",
        }
    }
}

/// Where a refused principal is sent.
pub const GATE_REDIRECT: &str = "/shop";

fn listed(list: &[&str], email: &Email) -> bool {
    list.iter()
        .any(|entry| entry.trim().eq_ignore_ascii_case(email.as_str()))
}

/// True when the email is on the super-admin list.
#[must_use]
pub fn is_super_admin(email: &Email) -> bool {
    listed(SUPER_ADMINS, email)
}

/// True when the email is on the staff list.
///
/// Super-admins are not implicitly staff.
#[must_use]
pub fn is_staff(email: &Email) -> bool {
    listed(STAFF_USERS, email)
}

/// The role of a signed-in email.
#[must_use]
pub fn role_for(email: &Email) -> Role {
    if is_super_admin(email) {
        Role::SuperAdmin
    } else if is_staff(email) {
        Role::Staff
    } else {
        Role::Customer
    }
}

/// Whether a principal (or an anonymous visitor, `None`) may enter an area.
#[must_use]
pub fn may_enter(area: Area, email: Option<&Email>) -> bool {
    email.is_some_and(|email| match area {
        Area::Admin => is_super_admin(email),
        Area::Staff => is_staff(email),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn email(s: &str) -> Email {
        Email::parse(s).unwrap()
    }

    #[test]
    fn test_roles_resolve_from_lists() {
        assert_eq!(role_for(&email("admin1@gmail.com")), Role::SuperAdmin);
        assert_eq!(role_for(&email("staff1@gmail.com")), Role::Staff);
        assert_eq!(role_for(&email("someone@example.com")), Role::Customer);
    }

    #[test]
    fn test_comparison_ignores_case() {
        assert!(is_super_admin(&email("ADMIN1@gmail.com")));
    }

    #[test]
    fn test_admin_area_requires_super_admin() {
        assert!(may_enter(Area::Admin, Some(&email("admin1@gmail.com"))));
        assert!(!may_enter(Area::Admin, Some(&email("staff1@gmail.com"))));
        assert!(!may_enter(Area::Admin, Some(&email("buyer@example.com"))));
        assert!(!may_enter(Area::Admin, None));
    }

    #[test]
    fn test_staff_area_requires_staff() {
        assert!(may_enter(Area::Staff, Some(&email("staff1@gmail.com"))));
        assert!(!may_enter(Area::Staff, Some(&email("admin1@gmail.com"))));
        assert!(!may_enter(Area::Staff, None));
    }

    #[test]
    fn test_base_paths() {
        assert_eq!(Area::Admin.base_path(), "/admin");
        assert_eq!(Area::Staff.base_path(), "/staff");
    }
}
