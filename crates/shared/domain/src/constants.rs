//! Table names and OpenAPI tags.

pub const ACCOUNT: &str = "account";
pub const VENDOR: &str = "vendor";
pub const MENU_ITEM: &str = "menu_item";
pub const PINCODE: &str = "pincode";
pub const ORDER: &str = "orders";
pub const PARTNER: &str = "partner";
pub const ORDER_EVENT: &str = "order_event";
pub const MIGRATION: &str = "migration";

pub const TAG_SYSTEM: &str = "System";
pub const TAG_AUTH: &str = "Auth";
pub const TAG_COVERAGE: &str = "Coverage";
pub const TAG_CATALOG: &str = "Catalog";
pub const TAG_ORDERS: &str = "Orders";
pub const TAG_DISPATCH: &str = "Dispatch";
