use chrono::{DateTime, Utc};
use platter_derive::api_model;
use platter_domain::pincode::Pincode;
use platter_ordering::state::OrderStatus;
use serde::{Deserialize, Serialize};
use strum::Display;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Vehicle {
    Bicycle,
    Scooter,
    Motorbike,
    Car,
}

/// A delivery partner. Its id is the partner's account id.
#[api_model(deny_unknown_fields = false)]
#[derive(Clone, PartialEq, Eq)]
pub struct PartnerProfile {
    pub id: String,
    pub vehicle: Vehicle,
    /// The area the partner picks up orders in.
    #[schema(value_type = String, example = "560001")]
    pub pincode: Pincode,
    pub phone: String,
    pub online: bool,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    #[schema(value_type = i64)]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    #[schema(value_type = i64)]
    pub updated_at: DateTime<Utc>,
}

#[api_model]
pub struct UpsertPartnerRequest {
    pub vehicle: Vehicle,
    #[schema(value_type = String, example = "560001")]
    pub pincode: Pincode,
    pub phone: String,
}

#[api_model]
pub struct AvailabilityRequest {
    pub online: bool,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DeliveriesQuery {
    /// Only deliveries currently in this status.
    pub status: Option<OrderStatus>,
}
