use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Account role. Every account has exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Customer,
    Vendor,
    Partner,
    Admin,
}

impl Role {
    pub const ALL: [Self; 4] = [Self::Customer, Self::Vendor, Self::Partner, Self::Admin];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Vendor => "vendor",
            Self::Partner => "partner",
            Self::Admin => "admin",
        }
    }

    /// Roles an anonymous visitor may register with.
    #[must_use]
    pub const fn is_self_service(self) -> bool {
        !matches!(self, Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role '{}'", self.0)
    }
}

impl std::error::Error for UnknownRole {}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownRole(s.to_owned()))
    }
}

bitflags! {
    /// A set of roles allowed to perform an action.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RoleSet: u8 {
        const CUSTOMER = 1 << 0;
        const VENDOR = 1 << 1;
        const PARTNER = 1 << 2;
        const ADMIN = 1 << 3;

        const STAFF = Self::VENDOR.bits() | Self::PARTNER.bits();
        const ALL = Self::CUSTOMER.bits() | Self::STAFF.bits() | Self::ADMIN.bits();
    }
}

impl From<Role> for RoleSet {
    fn from(role: Role) -> Self {
        match role {
            Role::Customer => Self::CUSTOMER,
            Role::Vendor => Self::VENDOR,
            Role::Partner => Self::PARTNER,
            Role::Admin => Self::ADMIN,
        }
    }
}

impl RoleSet {
    #[must_use]
    pub fn contains_role(self, role: Role) -> bool {
        self.contains(role.into())
    }
}
