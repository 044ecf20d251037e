use crate::state::OrderStatus;
use chrono::{DateTime, Utc};
use platter_derive::api_model;
use platter_domain::pincode::Pincode;
use platter_domain::roles::Role;
use serde::Deserialize;
use utoipa::IntoParams;

#[api_model]
#[derive(Clone)]
pub struct OrderLineRequest {
    pub menu_item_id: String,
    pub quantity: u32,
}

#[api_model(deny_unknown_fields = false)]
#[derive(Clone, PartialEq, Eq)]
pub struct DeliveryAddress {
    pub line1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    pub city: String,
    #[schema(value_type = String, example = "560001")]
    pub pincode: Pincode,
    pub phone: String,
}

#[api_model]
pub struct PlaceOrderRequest {
    pub vendor_id: String,
    pub items: Vec<OrderLineRequest>,
    pub delivery_address: DeliveryAddress,
    #[serde(default)]
    pub note: Option<String>,
}

/// A menu item as it was priced when the order was placed.
#[api_model(deny_unknown_fields = false)]
#[derive(Clone, PartialEq, Eq)]
pub struct OrderLine {
    pub menu_item_id: String,
    pub name: String,
    /// Paise.
    pub unit_price: u64,
    pub quantity: u32,
    pub line_total: u64,
}

/// Amounts are in paise.
#[api_model(deny_unknown_fields = false)]
#[derive(Clone, PartialEq, Eq)]
pub struct Order {
    pub id: String,
    pub customer_id: String,
    pub vendor_id: String,
    pub vendor_name: String,
    pub items: Vec<OrderLine>,
    pub subtotal: u64,
    pub delivery_fee: u64,
    pub total: u64,
    pub delivery_address: DeliveryAddress,
    #[schema(value_type = String, example = "560001")]
    pub pincode: Pincode,
    pub status: OrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partner_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Why the order was rejected or cancelled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    #[schema(value_type = i64)]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    #[schema(value_type = i64)]
    pub updated_at: DateTime<Utc>,
}

#[api_model]
pub struct TransitionRequest {
    pub status: OrderStatus,
    /// Only for `rejected` and `cancelled`; at most 200 characters.
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OrdersQuery {
    /// Only orders currently in this status.
    pub status: Option<OrderStatus>,
}

/// Published after an order is placed (`from` is empty) and after every
/// status change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderStatusChanged {
    pub order_id: String,
    pub from: Option<OrderStatus>,
    pub to: OrderStatus,
    pub actor_id: String,
    pub actor_role: Role,
    pub at: DateTime<Utc>,
}
