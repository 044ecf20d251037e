use chrono::{DateTime, Utc};
use platter_derive::api_model;
use platter_domain::roles::Role;
use platter_ordering::model::OrderStatusChanged;
use platter_ordering::state::OrderStatus;

/// One entry of an order's timeline.
#[api_model(deny_unknown_fields = false)]
#[derive(Clone, PartialEq, Eq)]
pub struct OrderEvent {
    pub id: String,
    pub order_id: String,
    /// Empty for the placement entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<OrderStatus>,
    pub to: OrderStatus,
    pub actor_id: String,
    #[schema(value_type = String, example = "vendor")]
    pub actor_role: Role,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    #[schema(value_type = i64)]
    pub at: DateTime<Utc>,
}

impl OrderEvent {
    pub(crate) fn record(id: String, change: &OrderStatusChanged) -> Self {
        Self {
            id,
            order_id: change.order_id.clone(),
            from: change.from,
            to: change.to,
            actor_id: change.actor_id.clone(),
            actor_role: change.actor_role,
            at: change.at,
        }
    }

    /// Valid moves only ever go forward in [`OrderStatus::ALL`], which orders
    /// entries that share a millisecond.
    pub(crate) fn sequence(&self) -> (DateTime<Utc>, usize) {
        let step = OrderStatus::ALL.iter().position(|s| *s == self.to).unwrap_or(usize::MAX);
        (self.at, step)
    }
}
