use chrono::{DateTime, Utc};
use platter_derive::api_model;
use platter_domain::pincode::Pincode;

/// A pincode the marketplace delivers to.
#[api_model(deny_unknown_fields = false)]
#[derive(Clone, PartialEq, Eq)]
pub struct ServiceArea {
    #[schema(value_type = String, example = "560001")]
    pub code: Pincode,
    pub area: String,
    pub city: String,
    /// Inactive areas are kept for history but refuse new vendors, partners and orders.
    pub active: bool,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    #[schema(value_type = i64)]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    #[schema(value_type = i64)]
    pub updated_at: DateTime<Utc>,
}

/// Creates an area, or renames and reactivates an existing one.
#[api_model]
pub struct UpsertAreaRequest {
    #[schema(value_type = String, example = "560001")]
    pub code: Pincode,
    pub area: String,
    pub city: String,
}
