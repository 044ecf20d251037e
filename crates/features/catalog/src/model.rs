use chrono::{DateTime, Utc};
use platter_derive::api_model;
use platter_domain::pincode::Pincode;
use serde::Serialize;
use utoipa::IntoParams;

/// A vendor's storefront. Its id is the vendor's account id.
#[api_model(deny_unknown_fields = false)]
#[derive(Clone, PartialEq, Eq)]
pub struct VendorProfile {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub cuisines: Vec<String>,
    pub address: String,
    #[schema(value_type = String, example = "560001")]
    pub pincode: Pincode,
    pub is_open: bool,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    #[schema(value_type = i64)]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    #[schema(value_type = i64)]
    pub updated_at: DateTime<Utc>,
}

#[api_model]
pub struct UpsertProfileRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// At most 10 labels such as `south indian`.
    #[serde(default)]
    pub cuisines: Vec<String>,
    pub address: String,
    #[schema(value_type = String, example = "560001")]
    pub pincode: Pincode,
    /// Defaults to open.
    #[serde(default)]
    pub is_open: Option<bool>,
}

/// A dish. Prices are in paise.
#[api_model(deny_unknown_fields = false)]
#[derive(Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub id: String,
    pub vendor_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: u64,
    pub vegetarian: bool,
    pub available: bool,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    #[schema(value_type = i64)]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    #[schema(value_type = i64)]
    pub updated_at: DateTime<Utc>,
}

#[api_model]
pub struct CreateMenuItemRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: u64,
    #[serde(default)]
    pub vegetarian: bool,
    /// Defaults to available.
    #[serde(default)]
    pub available: Option<bool>,
}

/// Absent fields are left unchanged.
#[api_model]
pub struct UpdateMenuItemRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<u64>,
    #[serde(default)]
    pub vegetarian: Option<bool>,
    #[serde(default)]
    pub available: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MenuItemPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vegetarian: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available: Option<bool>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

/// A vendor with the dishes customers can order right now.
#[api_model]
pub struct Storefront {
    pub vendor: VendorProfile,
    pub menu: Vec<MenuItem>,
}

#[derive(Debug, Clone, serde::Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct VendorsQuery {
    /// Delivery pincode.
    pub pincode: String,
}
