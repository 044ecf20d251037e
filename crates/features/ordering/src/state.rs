//! Order status and who may move an order between statuses.

use platter_domain::roles::Role;
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Placed,
    Accepted,
    Preparing,
    ReadyForPickup,
    OutForDelivery,
    Delivered,
    Cancelled,
    Rejected,
}

impl OrderStatus {
    pub const ALL: [Self; 8] = [
        Self::Placed,
        Self::Accepted,
        Self::Preparing,
        Self::ReadyForPickup,
        Self::OutForDelivery,
        Self::Delivered,
        Self::Cancelled,
        Self::Rejected,
    ];

    /// Statuses a delivery partner may claim an order in.
    pub const ASSIGNABLE: [Self; 3] = [Self::Accepted, Self::Preparing, Self::ReadyForPickup];

    pub const TERMINAL: [Self; 3] = [Self::Delivered, Self::Cancelled, Self::Rejected];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Placed => "placed",
            Self::Accepted => "accepted",
            Self::Preparing => "preparing",
            Self::ReadyForPickup => "ready_for_pickup",
            Self::OutForDelivery => "out_for_delivery",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
            Self::Rejected => "rejected",
        }
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled | Self::Rejected)
    }

    #[must_use]
    pub const fn is_assignable(self) -> bool {
        matches!(self, Self::Accepted | Self::Preparing | Self::ReadyForPickup)
    }

    /// Moves that may carry a reason.
    #[must_use]
    pub const fn takes_reason(self) -> bool {
        matches!(self, Self::Cancelled | Self::Rejected)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The transition table. Ownership (the vendor's storefront, the customer's
/// order, the assigned partner) is checked by the caller.
#[must_use]
pub const fn may_transition(role: Role, from: OrderStatus, to: OrderStatus) -> bool {
    use OrderStatus::{
        Accepted, Cancelled, Delivered, OutForDelivery, Placed, Preparing, ReadyForPickup,
        Rejected,
    };

    match role {
        Role::Vendor => matches!(
            (from, to),
            (Placed, Accepted | Rejected) | (Accepted, Preparing) | (Preparing, ReadyForPickup)
        ),
        Role::Customer => matches!((from, to), (Placed, Cancelled)),
        Role::Partner => {
            matches!((from, to), (ReadyForPickup, OutForDelivery) | (OutForDelivery, Delivered))
        },
        Role::Admin => matches!(to, Cancelled) && !from.is_terminal(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use proptest::sample::select;

    #[test]
    fn happy_path_needs_three_actors() {
        use OrderStatus::*;
        assert!(may_transition(Role::Vendor, Placed, Accepted));
        assert!(may_transition(Role::Vendor, Accepted, Preparing));
        assert!(may_transition(Role::Vendor, Preparing, ReadyForPickup));
        assert!(!may_transition(Role::Vendor, ReadyForPickup, OutForDelivery));
        assert!(may_transition(Role::Partner, ReadyForPickup, OutForDelivery));
        assert!(may_transition(Role::Partner, OutForDelivery, Delivered));
    }

    #[test]
    fn cancellation_rules() {
        use OrderStatus::*;
        assert!(may_transition(Role::Customer, Placed, Cancelled));
        assert!(!may_transition(Role::Customer, Accepted, Cancelled));
        assert!(may_transition(Role::Admin, OutForDelivery, Cancelled));
        assert!(!may_transition(Role::Admin, Placed, Accepted));
        assert!(!may_transition(Role::Vendor, Accepted, Rejected));
    }

    #[test]
    fn status_strings_match_serde() {
        for status in OrderStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{status}\""));
        }
    }

    proptest! {
        #[test]
        fn terminal_orders_never_move(
            role in select(Role::ALL.to_vec()),
            from in select(OrderStatus::TERMINAL.to_vec()),
            to in select(OrderStatus::ALL.to_vec()),
        ) {
            prop_assert!(!may_transition(role, from, to));
        }

        #[test]
        fn no_transition_is_a_self_loop(
            role in select(Role::ALL.to_vec()),
            status in select(OrderStatus::ALL.to_vec()),
        ) {
            prop_assert!(!may_transition(role, status, status));
        }
    }
}
