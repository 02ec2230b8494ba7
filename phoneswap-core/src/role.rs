//! Roles and role derivation
//!
//! A user's effective roles are never stored as a single field. They are
//! derived at authorization time from two sources that must both agree:
//! the capability flags persisted in the user's auth status, and the
//! role-hash fragments written into the user's token record when a
//! credential asserting that role was last issued. A fragment binds the
//! role to the specific credential artifact: a credential issued under a
//! seller login cannot silently also assert arbiter.

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A role a user may act under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Buyer,
    Seller,
    Arbiter,
    Staff,
    Admin,
}

impl Role {
    /// All roles, in the canonical derivation order
    pub const ALL: [Role; 5] = [Role::Buyer, Role::Seller, Role::Arbiter, Role::Staff, Role::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Buyer => "buyer",
            Role::Seller => "seller",
            Role::Arbiter => "arbiter",
            Role::Staff => "staff",
            Role::Admin => "admin",
        }
    }

    /// Parse a role from its wire name. Unknown names are an explicit
    /// error, never a silent no-op.
    pub fn parse(s: &str) -> Result<Self, Error> {
        match s {
            "buyer" => Ok(Role::Buyer),
            "seller" => Ok(Role::Seller),
            "arbiter" => Ok(Role::Arbiter),
            "staff" => Ok(Role::Staff),
            "admin" => Ok(Role::Admin),
            other => Err(Error::UnknownRole(other.to_string())),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Marker suffix appended to a plaintext password to claim staff standing
pub const STAFF_PASSWORD_MARKER: &str = "#staff";

/// Marker suffix appended to a plaintext password to claim admin standing
pub const ADMIN_PASSWORD_MARKER: &str = "#admin";

/// Which staff-level marker a password carried when it was set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StaffMarker {
    Staff,
    Admin,
}

impl StaffMarker {
    pub fn as_str(&self) -> &'static str {
        match self {
            StaffMarker::Staff => "staff",
            StaffMarker::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "staff" => Some(StaffMarker::Staff),
            "admin" => Some(StaffMarker::Admin),
            _ => None,
        }
    }

    /// The role this marker permits at issuance time
    pub fn role(&self) -> Role {
        match self {
            StaffMarker::Staff => Role::Staff,
            StaffMarker::Admin => Role::Admin,
        }
    }
}

/// Split a plaintext password into its base form and an optional staff
/// marker. The marker is the only role grant gated by password shape
/// rather than purely by a stored flag.
pub fn split_password_marker(password: &str) -> (&str, Option<StaffMarker>) {
    if let Some(base) = password.strip_suffix(ADMIN_PASSWORD_MARKER) {
        (base, Some(StaffMarker::Admin))
    } else if let Some(base) = password.strip_suffix(STAFF_PASSWORD_MARKER) {
        (base, Some(StaffMarker::Staff))
    } else {
        (password, None)
    }
}

/// Capability flags from a user's auth status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuthFlags {
    pub is_seller: bool,
    pub is_arbiter: bool,
    pub is_staff_admin: bool,
}

impl AuthFlags {
    /// Whether the flags permit the given role at all. Every user may act
    /// as a buyer; the other roles require their capability flag.
    pub fn allows(&self, role: Role) -> bool {
        match role {
            Role::Buyer => true,
            Role::Seller => self.is_seller,
            Role::Arbiter => self.is_arbiter,
            Role::Staff | Role::Admin => self.is_staff_admin,
        }
    }
}

/// Per-role hash fragments from a user's token record. `None` or empty
/// means no credential asserting that role has been issued.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleFragments {
    pub buyer: Option<String>,
    pub seller: Option<String>,
    pub arbiter: Option<String>,
    pub staff: Option<String>,
    pub admin: Option<String>,
}

impl RoleFragments {
    pub fn get(&self, role: Role) -> Option<&str> {
        match role {
            Role::Buyer => self.buyer.as_deref(),
            Role::Seller => self.seller.as_deref(),
            Role::Arbiter => self.arbiter.as_deref(),
            Role::Staff => self.staff.as_deref(),
            Role::Admin => self.admin.as_deref(),
        }
    }

    pub fn set(&mut self, role: Role, fragment: String) {
        match role {
            Role::Buyer => self.buyer = Some(fragment),
            Role::Seller => self.seller = Some(fragment),
            Role::Arbiter => self.arbiter = Some(fragment),
            Role::Staff => self.staff = Some(fragment),
            Role::Admin => self.admin = Some(fragment),
        }
    }
}

/// Derive the provable role set for a presented credential.
///
/// A role is granted only if the capability flag permits it AND the stored
/// fragment for that role is non-empty and a literal substring of the
/// credential. The result is ordered and free of duplicates.
pub fn derive_roles(flags: &AuthFlags, fragments: &RoleFragments, credential: &str) -> Vec<Role> {
    Role::ALL
        .iter()
        .copied()
        .filter(|role| flags.allows(*role))
        .filter(|role| {
            fragments
                .get(*role)
                .is_some_and(|f| !f.is_empty() && credential.contains(f))
        })
        .collect()
}

/// Aggregate verification-level code, always derivable from the
/// verification flags. Precedence: all three sources > two sources (in
/// fixed order) > single sources > none.
pub fn user_status_from_flags(verified_email: bool, verified_phone: bool, verified_user_id: bool) -> u8 {
    match (verified_email, verified_phone, verified_user_id) {
        (true, true, true) => 7,
        (true, true, false) => 6,
        (true, false, true) => 5,
        (false, true, true) => 4,
        (true, false, false) => 3,
        (false, true, false) => 2,
        (false, false, true) => 1,
        (false, false, false) => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fragments_for(credential: &str) -> RoleFragments {
        // Slice distinct fragments out of the credential body
        RoleFragments {
            buyer: Some(credential[0..8].to_string()),
            seller: Some(credential[4..12].to_string()),
            arbiter: Some(credential[8..16].to_string()),
            staff: None,
            admin: None,
        }
    }

    #[test]
    fn test_role_granted_requires_both_conditions() {
        let credential = "abcdefghijklmnopqrstuvwxyz012345";
        let fragments = fragments_for(credential);
        let flags = AuthFlags {
            is_seller: true,
            is_arbiter: false,
            is_staff_admin: false,
        };

        let roles = derive_roles(&flags, &fragments, credential);

        // Arbiter fragment matches but flag is off; seller has both
        assert_eq!(roles, vec![Role::Buyer, Role::Seller]);
    }

    #[test]
    fn test_fragment_mismatch_denies_role() {
        let credential = "abcdefghijklmnopqrstuvwxyz012345";
        let mut fragments = fragments_for(credential);
        fragments.seller = Some("ZZZZZZZZ".to_string());
        let flags = AuthFlags {
            is_seller: true,
            is_arbiter: true,
            is_staff_admin: false,
        };

        let roles = derive_roles(&flags, &fragments, credential);
        assert!(!roles.contains(&Role::Seller));
        assert!(roles.contains(&Role::Arbiter));
    }

    #[test]
    fn test_empty_fragment_denies_role() {
        let credential = "abcdefghijklmnopqrstuvwxyz012345";
        let mut fragments = fragments_for(credential);
        fragments.buyer = Some(String::new());
        let flags = AuthFlags::default();

        assert!(derive_roles(&flags, &fragments, credential).is_empty());
    }

    #[test]
    fn test_derivation_order_is_stable() {
        let credential = "abcdefghijklmnopqrstuvwxyz012345";
        let mut fragments = fragments_for(credential);
        fragments.staff = Some(credential[12..20].to_string());
        let flags = AuthFlags {
            is_seller: true,
            is_arbiter: true,
            is_staff_admin: true,
        };

        let roles = derive_roles(&flags, &fragments, credential);
        assert_eq!(roles, vec![Role::Buyer, Role::Seller, Role::Arbiter, Role::Staff]);
    }

    #[test]
    fn test_unknown_role_name_is_explicit_error() {
        assert!(matches!(Role::parse("superuser"), Err(Error::UnknownRole(_))));
        assert_eq!(Role::parse("arbiter").unwrap(), Role::Arbiter);
    }

    #[test]
    fn test_password_marker_split() {
        assert_eq!(split_password_marker("hunter42"), ("hunter42", None));
        assert_eq!(
            split_password_marker("hunter42#admin"),
            ("hunter42", Some(StaffMarker::Admin))
        );
        assert_eq!(
            split_password_marker("hunter42#staff"),
            ("hunter42", Some(StaffMarker::Staff))
        );
    }

    #[test]
    fn test_user_status_precedence_table() {
        assert_eq!(user_status_from_flags(true, true, true), 7);
        assert_eq!(user_status_from_flags(true, true, false), 6);
        assert_eq!(user_status_from_flags(true, false, true), 5);
        assert_eq!(user_status_from_flags(false, true, true), 4);
        assert_eq!(user_status_from_flags(true, false, false), 3);
        assert_eq!(user_status_from_flags(false, true, false), 2);
        assert_eq!(user_status_from_flags(false, false, true), 1);
        assert_eq!(user_status_from_flags(false, false, false), 0);
    }
}
